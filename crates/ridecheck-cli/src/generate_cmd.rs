use anyhow::Context;

use ridecheck_core::orchestrator::{GenerateConfig, Generation, GenerationReport, generate_all};
use ridecheck_core::solver::Solver;
use ridecheck_core::store::Store;
use ridecheck_state::StateRepository;

pub const SUCCESS_MESSAGE: &str = "All ridechecks generated successfully";

/// Generate ridechecks for every day and commit them.
///
/// Returns the failure report when any day failed; the stored ridechecks
/// are then left as they were.
pub async fn run_generate<R: StateRepository>(
    store: &mut Store<R>,
    solver: &dyn Solver,
    config: &GenerateConfig,
) -> anyhow::Result<Option<GenerationReport>> {
    let snapshot = store.snapshot();
    let generation = generate_all(&snapshot, solver, config)
        .await
        .context("ridecheck generation aborted")?;

    match generation {
        Generation::Generated(ridechecks) => {
            let days = ridechecks.len();
            let applied = store.commit_ridechecks(ridechecks);
            println!("{SUCCESS_MESSAGE} ({days} days)");
            if let Some(err) = applied.persist_error {
                eprintln!("warning: ridechecks were not saved: {err}");
            }
            Ok(None)
        }
        Generation::Failed(report) => Ok(Some(report)),
    }
}
