//! End-to-end generation runs against in-process solvers.

use std::time::Duration;

use ridecheck_core::orchestrator::{
    FailureCategory, GenerateConfig, Generation, OrchestratorError, generate_all,
};
use ridecheck_core::solver::{ProtocolViolation, SolveStatus, SolverError, SolverResponse};
use ridecheck_core::store::{Edit, Store};
use ridecheck_state::{AppState, DayRestriction, MemoryRepository, Ride, Ridecheck};
use ridecheck_test_utils::{FnSolver, first_qualified, two_days};

/// Distinguish the fixture days by their open minutes.
fn is_monday(problem: &ridecheck_core::problem::Problem) -> bool {
    problem.total_time_minutes == 60
}

fn week(days: usize) -> AppState {
    let mut state = two_days();
    state.day_restrictions = (0..days)
        .map(|i| DayRestriction::open(format!("Day {i}"), 30 + i as u32))
        .collect();
    state
}

#[tokio::test]
async fn all_generated_in_dispatch_order_despite_completion_order() {
    let state = two_days();
    // Mon answers last.
    let solver = FnSolver::always_generated().with_delay(|p| {
        if is_monday(p) {
            Duration::from_millis(50)
        } else {
            Duration::ZERO
        }
    });

    let generation = generate_all(&state, &solver, &GenerateConfig::default())
        .await
        .unwrap();

    let Generation::Generated(ridechecks) = generation else {
        panic!("expected every day to generate");
    };
    let days: Vec<&str> = ridechecks.iter().map(|r| r.day.as_str()).collect();
    assert_eq!(days, ["Mon", "Tue"]);
    assert_eq!(ridechecks[0].cell("Coaster"), "Alex");
    assert_eq!(ridechecks[0].cell("Flume"), "CLOSED");
    assert_eq!(ridechecks[1].cell("Flume"), "Gio");
    assert_eq!(solver.calls(), 2);
}

#[tokio::test]
async fn calls_run_concurrently() {
    let state = week(4);
    let solver = FnSolver::always_generated().with_delay(|_| Duration::from_millis(30));

    generate_all(&state, &solver, &GenerateConfig::default())
        .await
        .unwrap();

    assert_eq!(solver.max_in_flight(), 4);
}

#[tokio::test]
async fn max_in_flight_bounds_concurrency() {
    let state = week(6);
    let solver = FnSolver::always_generated().with_delay(|_| Duration::from_millis(10));
    let config = GenerateConfig {
        max_in_flight: Some(2),
    };

    let generation = generate_all(&state, &solver, &config).await.unwrap();

    let Generation::Generated(ridechecks) = generation else {
        panic!("expected every day to generate");
    };
    assert_eq!(ridechecks.len(), 6);
    assert_eq!(ridechecks[5].day, "Day 5");
    assert!(solver.max_in_flight() <= 2, "saw {}", solver.max_in_flight());
    assert_eq!(solver.calls(), 6);
}

#[tokio::test]
async fn could_not_generate_report_names_only_failed_day() {
    let state = two_days();
    let solver = FnSolver::new(|p| {
        Ok(if is_monday(p) {
            SolverResponse::generated(first_qualified(p))
        } else {
            SolverResponse::failed(SolveStatus::CouldNotGenerate, "no feasible assignment")
        })
    });

    let generation = generate_all(&state, &solver, &GenerateConfig::default())
        .await
        .unwrap();

    let Generation::Failed(report) = generation else {
        panic!("expected a failure report");
    };
    assert_eq!(report.category, FailureCategory::CouldNotGenerate);
    assert_eq!(
        report.to_string(),
        "Could not generate ridechecks for the following days:\nTue: no feasible assignment\n"
    );
}

#[tokio::test]
async fn highest_priority_category_wins() {
    let mut state = week(3);
    state.day_restrictions[0].day = "Mon".into();
    state.day_restrictions[1].day = "Tue".into();
    state.day_restrictions[2].day = "Wed".into();
    let solver = FnSolver::new(|p| {
        Ok(match p.total_time_minutes {
            30 => SolverResponse::failed(SolveStatus::CouldNotGenerate, "too little time"),
            31 => SolverResponse::failed(SolveStatus::InvalidData, "unknown ride"),
            _ => SolverResponse::failed(SolveStatus::UnexpectedError, "solver crashed"),
        })
    });

    let generation = generate_all(&state, &solver, &GenerateConfig::default())
        .await
        .unwrap();

    let Generation::Failed(report) = generation else {
        panic!("expected a failure report");
    };
    assert_eq!(report.category, FailureCategory::UnexpectedError);
    assert_eq!(report.lines(), vec!["Wed: solver crashed"]);
}

#[tokio::test]
async fn transport_error_reports_unexpected_error() {
    let state = two_days();
    let solver = FnSolver::new(|p| {
        if is_monday(p) {
            Err(SolverError::Transport("connection refused".into()))
        } else {
            Ok(SolverResponse::failed(SolveStatus::InvalidData, "bad minutes"))
        }
    });

    let generation = generate_all(&state, &solver, &GenerateConfig::default())
        .await
        .unwrap();

    let Generation::Failed(report) = generation else {
        panic!("expected a failure report");
    };
    assert_eq!(report.category, FailureCategory::UnexpectedError);
    assert_eq!(report.lines(), vec!["Mon: connection refused"]);
}

#[tokio::test]
async fn protocol_violation_aborts_run() {
    let state = two_days();
    let solver = FnSolver::new(|p| {
        Ok(if is_monday(p) {
            SolverResponse::generated(first_qualified(p))
        } else {
            SolverResponse {
                status: "maybe".into(),
                result: serde_json::Value::Null,
            }
        })
    });

    let err = generate_all(&state, &solver, &GenerateConfig::default())
        .await
        .unwrap_err();

    match err {
        OrchestratorError::Protocol { day, violation } => {
            assert_eq!(day, "Tue");
            assert_eq!(violation, ProtocolViolation::UnknownStatus("maybe".into()));
        }
        other => panic!("unexpected error: {other}"),
    }
    // The barrier still waited for every day.
    assert_eq!(solver.calls(), 2);
}

#[tokio::test]
async fn legacy_status_spellings_are_accepted() {
    let state = two_days();
    let solver = FnSolver::new(|p| {
        Ok(SolverResponse {
            status: "did generate".into(),
            result: serde_json::to_value(first_qualified(p)).unwrap(),
        })
    });

    let generation = generate_all(&state, &solver, &GenerateConfig::default())
        .await
        .unwrap();
    assert!(matches!(generation, Generation::Generated(ref r) if r.len() == 2));
}

#[tokio::test]
async fn no_days_generates_nothing_without_calls() {
    let mut state = two_days();
    state.day_restrictions.clear();
    let solver = FnSolver::always_generated();

    let generation = generate_all(&state, &solver, &GenerateConfig::default())
        .await
        .unwrap();

    assert_eq!(generation, Generation::Generated(vec![]));
    assert_eq!(solver.calls(), 0);
}

#[tokio::test]
async fn failed_run_leaves_stored_ridechecks_untouched() {
    let repo = MemoryRepository::new();
    let mut state = two_days();
    state.ridechecks = vec![Ridecheck::new(
        "Sun",
        [("Coaster".to_string(), "Alex".to_string())].into(),
    )];
    let mut store = Store::with_state(repo.clone(), state);
    store.flush().unwrap();
    let before = repo.stored().unwrap();

    let solver = FnSolver::new(|p| {
        Ok(if is_monday(p) {
            SolverResponse::generated(first_qualified(p))
        } else {
            SolverResponse::failed(SolveStatus::CouldNotGenerate, "no feasible assignment")
        })
    });
    let generation = generate_all(&store.snapshot(), &solver, &GenerateConfig::default())
        .await
        .unwrap();

    if let Generation::Generated(ridechecks) = generation {
        store.commit_ridechecks(ridechecks);
    }
    assert_eq!(repo.stored().unwrap(), before);
    assert_eq!(store.snapshot().ridecheck_days(), ["Sun"]);
}

#[tokio::test]
async fn generation_uses_snapshot_and_commit_keeps_later_edits() {
    let mut store = Store::with_state(MemoryRepository::new(), two_days());
    let snapshot = store.snapshot();
    let solver = FnSolver::always_generated().with_delay(|_| Duration::from_millis(20));
    let config = GenerateConfig::default();

    let (generation, _) = tokio::join!(generate_all(&snapshot, &solver, &config), async {
        // Edited while the solver calls are in flight.
        let mut rides = store.snapshot().rides.clone();
        rides.push(Ride::new("Launcher", 25));
        store.apply(Edit::ReplaceRides(rides))
    });

    let Generation::Generated(ridechecks) = generation.unwrap() else {
        panic!("expected every day to generate");
    };
    assert!(ridechecks.iter().all(|r| !r.assignment.contains_key("Launcher")));

    store.commit_ridechecks(ridechecks);
    let after = store.snapshot();
    assert_eq!(after.ridecheck_days(), ["Mon", "Tue"]);
    assert!(after.ride_names().contains(&"Launcher"));
}
