//! Generation orchestrator: solves every day of a snapshot concurrently and
//! reduces the per-day outcomes to either a complete ridecheck collection
//! or a single prioritized failure report.
//!
//! ```text
//! snapshot.days() --build_problem--> [Problem; n]
//!        |                                 |
//!        |                  Solver::solve x n (fan-out, buffered)
//!        |                                 |
//!        +------ zip in dispatch order ----+  (fan-in barrier)
//!                         |
//!            all generated? -- yes --> Generation::Generated
//!                         |
//!                         no --> Generation::Failed(highest category only)
//! ```

use std::fmt;

use futures::StreamExt;
use futures::stream;
use ridecheck_state::{AppState, Ridecheck};

use crate::problem::{Problem, ProblemError, build_problem};
use crate::solver::{ProtocolViolation, SolveOutcome, SolveStatus, Solver, SolverError};

/// Configuration for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerateConfig {
    /// Maximum number of solver calls in flight at once. `None` dispatches
    /// every day immediately.
    pub max_in_flight: Option<usize>,
}

/// Result of a generation run that kept to the solver contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Every day generated; ridechecks are in day-restriction order.
    Generated(Vec<Ridecheck>),
    /// At least one day failed; nothing should be committed.
    Failed(GenerationReport),
}

/// Failure categories, declared in reporting priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureCategory {
    UnexpectedError,
    InvalidData,
    CouldNotGenerate,
}

impl FailureCategory {
    /// Highest priority first.
    pub const PRIORITY: [FailureCategory; 3] = [
        Self::UnexpectedError,
        Self::InvalidData,
        Self::CouldNotGenerate,
    ];

    /// First line of a report for this category.
    pub fn header(self) -> &'static str {
        match self {
            Self::UnexpectedError => {
                "Generating ridechecks for the following days produced unexpected errors:"
            }
            Self::InvalidData => "Invalid data for the following days:",
            Self::CouldNotGenerate => "Could not generate ridechecks for the following days:",
        }
    }

    pub fn status(self) -> SolveStatus {
        match self {
            Self::UnexpectedError => SolveStatus::UnexpectedError,
            Self::InvalidData => SolveStatus::InvalidData,
            Self::CouldNotGenerate => SolveStatus::CouldNotGenerate,
        }
    }
}

/// One failed day and the solver's explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFailure {
    pub day: String,
    pub detail: String,
}

/// The failures of the single highest-priority category present in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub category: FailureCategory,
    /// In dispatch order.
    pub failures: Vec<DayFailure>,
}

impl GenerationReport {
    /// The `"<day>: <detail>"` lines, without the header.
    pub fn lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.day, f.detail))
            .collect()
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.category.header())?;
        for line in self.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Errors that abort a generation run instead of producing a report.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("solver broke protocol for day {day:?}: {violation}")]
    Protocol {
        day: String,
        #[source]
        violation: ProtocolViolation,
    },

    #[error(transparent)]
    Problem(#[from] ProblemError),
}

/// Generate ridechecks for every day restriction in `state`.
///
/// Problems are built from `state` up front; the solver calls then run
/// concurrently and are all awaited before any outcome is decided, whatever
/// their completion order. The caller commits a
/// [`Generation::Generated`] result; a [`Generation::Failed`] result must
/// leave the stored ridechecks untouched.
pub async fn generate_all(
    state: &AppState,
    solver: &dyn Solver,
    config: &GenerateConfig,
) -> Result<Generation, OrchestratorError> {
    let days: Vec<String> = state.days().into_iter().map(str::to_owned).collect();
    let problems = days
        .iter()
        .map(|day| build_problem(state, day))
        .collect::<Result<Vec<Problem>, _>>()?;

    let limit = config.max_in_flight.unwrap_or(days.len()).max(1);
    tracing::info!(
        days = days.len(),
        solver = solver.name(),
        max_in_flight = limit,
        "dispatching ridecheck generation"
    );

    let responses: Vec<_> = stream::iter(problems.iter().map(|p| solver.solve(p)))
        .buffered(limit)
        .collect()
        .await;

    let mut outcomes = Vec::with_capacity(days.len());
    for (day, response) in days.iter().zip(responses) {
        let outcome = match response {
            Ok(envelope) => envelope.classify(),
            Err(SolverError::Transport(message)) => {
                tracing::warn!(day = %day, error = %message, "solver request failed");
                Ok(SolveOutcome::UnexpectedError(message))
            }
            Err(SolverError::Protocol(violation)) => Err(violation),
        };
        match outcome {
            Ok(outcome) => outcomes.push(outcome),
            Err(violation) => {
                tracing::error!(day = %day, error = %violation, "solver protocol violation");
                return Err(OrchestratorError::Protocol {
                    day: day.clone(),
                    violation,
                });
            }
        }
    }

    let generation = reduce_outcomes(&days, outcomes);
    match &generation {
        Generation::Generated(ridechecks) => {
            tracing::info!(days = ridechecks.len(), "all ridechecks generated");
        }
        Generation::Failed(report) => {
            for failure in &report.failures {
                tracing::warn!(
                    day = %failure.day,
                    status = %report.category.status(),
                    detail = %failure.detail,
                    "ridecheck generation failed"
                );
            }
        }
    }
    Ok(generation)
}

/// Reduce per-day outcomes (parallel to `days`) to a [`Generation`].
pub fn reduce_outcomes(days: &[String], outcomes: Vec<SolveOutcome>) -> Generation {
    let mut ridechecks = Vec::with_capacity(days.len());
    let mut failures: Vec<(FailureCategory, DayFailure)> = Vec::new();

    for (day, outcome) in days.iter().zip(outcomes) {
        let (category, detail) = match outcome {
            SolveOutcome::Generated(assignment) => {
                ridechecks.push(Ridecheck::new(day.clone(), assignment));
                continue;
            }
            SolveOutcome::UnexpectedError(detail) => (FailureCategory::UnexpectedError, detail),
            SolveOutcome::InvalidData(detail) => (FailureCategory::InvalidData, detail),
            SolveOutcome::CouldNotGenerate(detail) => (FailureCategory::CouldNotGenerate, detail),
        };
        failures.push((
            category,
            DayFailure {
                day: day.clone(),
                detail,
            },
        ));
    }

    let Some(category) = FailureCategory::PRIORITY
        .into_iter()
        .find(|c| failures.iter().any(|(fc, _)| fc == c))
    else {
        return Generation::Generated(ridechecks);
    };

    Generation::Failed(GenerationReport {
        category,
        failures: failures
            .into_iter()
            .filter(|(fc, _)| *fc == category)
            .map(|(_, failure)| failure)
            .collect(),
    })
}
