//! Solver interface: the response envelope, its classification, and the
//! [`Solver`] trait with an HTTP implementation.
//!
//! ```text
//! Problem --Solver::solve--> SolverResponse { status, result }
//!                                 |
//!                           classify()
//!                                 v
//!          SolveOutcome::{Generated, InvalidData, CouldNotGenerate, UnexpectedError}
//!          or ProtocolViolation (unknown status, wrong result type)
//! ```

pub mod http;
pub mod trait_def;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use http::HttpSolver;
pub use trait_def::Solver;

/// Ride name -> worker name for one day.
pub type Assignment = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// The fixed set of statuses a solver may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    Generated,
    InvalidData,
    CouldNotGenerate,
    UnexpectedError,
}

impl SolveStatus {
    pub const ALL: [SolveStatus; 4] = [
        Self::Generated,
        Self::InvalidData,
        Self::CouldNotGenerate,
        Self::UnexpectedError,
    ];

    /// Canonical wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::InvalidData => "invalid-data",
            Self::CouldNotGenerate => "could-not-generate",
            Self::UnexpectedError => "unexpected-error",
        }
    }

    /// Spelling used by the first version of the solver service.
    fn legacy_str(self) -> &'static str {
        match self {
            Self::Generated => "did generate",
            Self::InvalidData => "invalid data",
            Self::CouldNotGenerate => "could not generate",
            Self::UnexpectedError => "unexpected error",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolveStatus {
    type Err = ProtocolViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| s == status.as_str() || s == status.legacy_str())
            .ok_or_else(|| ProtocolViolation::UnknownStatus(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The raw response body: `{ "status": ..., "result": ... }`.
///
/// `status` is kept as a string so that unknown values can be reported as
/// protocol violations instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResponse {
    pub status: String,
    #[serde(default)]
    pub result: Value,
}

/// A classified solver response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Generated(Assignment),
    InvalidData(String),
    CouldNotGenerate(String),
    UnexpectedError(String),
}

impl SolveOutcome {
    pub fn status(&self) -> SolveStatus {
        match self {
            Self::Generated(_) => SolveStatus::Generated,
            Self::InvalidData(_) => SolveStatus::InvalidData,
            Self::CouldNotGenerate(_) => SolveStatus::CouldNotGenerate,
            Self::UnexpectedError(_) => SolveStatus::UnexpectedError,
        }
    }
}

/// The solver broke its response contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    #[error("unknown solver status {0:?}")]
    UnknownStatus(String),

    #[error("malformed {status} result: {reason}")]
    MalformedResult { status: SolveStatus, reason: String },

    #[error("undecodable solver response: {0}")]
    UndecodableBody(String),
}

/// Errors from a single solver call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// The request did not complete (connection, timeout, non-success HTTP
    /// status). Recoverable: reported as that day's unexpected error.
    #[error("solver request failed: {0}")]
    Transport(String),

    /// A response arrived but violates the contract. Fatal to the run.
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
}

impl SolverResponse {
    pub fn generated(assignment: Assignment) -> Self {
        let result = assignment
            .into_iter()
            .map(|(ride, worker)| (ride, Value::String(worker)))
            .collect();
        Self {
            status: SolveStatus::Generated.as_str().to_owned(),
            result: Value::Object(result),
        }
    }

    pub fn failed(status: SolveStatus, detail: impl Into<String>) -> Self {
        Self {
            status: status.as_str().to_owned(),
            result: Value::String(detail.into()),
        }
    }

    /// Interpret the envelope.
    ///
    /// A `generated` result must be an object of ride -> worker strings
    /// (`null` values mean the ride is left unassigned); every other status
    /// must carry a detail string.
    pub fn classify(&self) -> Result<SolveOutcome, ProtocolViolation> {
        let status: SolveStatus = self.status.parse()?;
        match status {
            SolveStatus::Generated => parse_assignment(&self.result).map(SolveOutcome::Generated),
            other => {
                let detail = self
                    .result
                    .as_str()
                    .ok_or_else(|| ProtocolViolation::MalformedResult {
                        status: other,
                        reason: format!("expected a detail string, got {}", json_kind(&self.result)),
                    })?
                    .to_owned();
                Ok(match other {
                    SolveStatus::InvalidData => SolveOutcome::InvalidData(detail),
                    SolveStatus::CouldNotGenerate => SolveOutcome::CouldNotGenerate(detail),
                    _ => SolveOutcome::UnexpectedError(detail),
                })
            }
        }
    }
}

fn parse_assignment(result: &Value) -> Result<Assignment, ProtocolViolation> {
    let malformed = |reason: String| ProtocolViolation::MalformedResult {
        status: SolveStatus::Generated,
        reason,
    };

    let object = result
        .as_object()
        .ok_or_else(|| malformed(format!("expected an object, got {}", json_kind(result))))?;

    let mut assignment = Assignment::new();
    for (ride, worker) in object {
        match worker {
            Value::String(name) => {
                assignment.insert(ride.clone(), name.clone());
            }
            Value::Null => {}
            other => {
                return Err(malformed(format!(
                    "ride {ride:?} assigned to {} instead of a worker name",
                    json_kind(other)
                )));
            }
        }
    }
    Ok(assignment)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(value: Value) -> SolverResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn status_parses_canonical_and_legacy_spellings() {
        for status in SolveStatus::ALL {
            assert_eq!(status.as_str().parse::<SolveStatus>().unwrap(), status);
            assert_eq!(status.legacy_str().parse::<SolveStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_a_protocol_violation() {
        let err = response(json!({"status": "maybe", "result": "?"})).classify().unwrap_err();
        assert_eq!(err, ProtocolViolation::UnknownStatus("maybe".into()));
    }

    #[test]
    fn generated_result_becomes_assignment() {
        let outcome = response(json!({
            "status": "generated",
            "result": {"Coaster": "Alex", "Flume": null}
        }))
        .classify()
        .unwrap();
        assert_eq!(
            outcome,
            SolveOutcome::Generated(Assignment::from([("Coaster".into(), "Alex".into())]))
        );
    }

    #[test]
    fn failure_statuses_carry_detail() {
        let outcome = response(json!({"status": "could not generate", "result": "no feasible assignment"}))
            .classify()
            .unwrap();
        assert_eq!(outcome, SolveOutcome::CouldNotGenerate("no feasible assignment".into()));
        assert_eq!(outcome.status(), SolveStatus::CouldNotGenerate);
    }

    #[test]
    fn wrong_result_types_are_malformed() {
        let generated = response(json!({"status": "generated", "result": "oops"}));
        assert!(matches!(
            generated.classify(),
            Err(ProtocolViolation::MalformedResult { status: SolveStatus::Generated, .. })
        ));

        let failed = response(json!({"status": "invalid-data", "result": {"a": 1}}));
        assert!(matches!(
            failed.classify(),
            Err(ProtocolViolation::MalformedResult { status: SolveStatus::InvalidData, .. })
        ));

        let bad_worker = response(json!({"status": "generated", "result": {"Coaster": 3}}));
        let err = bad_worker.classify().unwrap_err();
        assert!(err.to_string().contains("\"Coaster\""), "unexpected error: {err}");
    }

    #[test]
    fn missing_result_is_malformed_not_undecodable() {
        let resp = response(json!({"status": "unexpected-error"}));
        assert_eq!(resp.result, Value::Null);
        assert!(resp.classify().is_err());
    }

    #[test]
    fn constructors_classify_back() {
        let assignment = Assignment::from([("Flume".into(), "Gio".into())]);
        assert_eq!(
            SolverResponse::generated(assignment.clone()).classify().unwrap(),
            SolveOutcome::Generated(assignment)
        );
        assert_eq!(
            SolverResponse::failed(SolveStatus::UnexpectedError, "boom").classify().unwrap(),
            SolveOutcome::UnexpectedError("boom".into())
        );
    }
}
