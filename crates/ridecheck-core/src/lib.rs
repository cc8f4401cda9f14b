//! Ride check scheduling core.
//!
//! ```text
//! row edits --views--> Edit --store::apply_edit--> new AppState snapshot
//!                                                      |
//!                         orchestrator::generate_all <-+
//!                              | problem::build_problem (one per day)
//!                              v
//!                         Solver::solve (fan-out, fan-in)
//!                              |
//!              Generated(ridechecks) | Failed(report)
//! ```

pub mod export;
pub mod naming;
pub mod orchestrator;
pub mod problem;
pub mod solver;
pub mod store;
pub mod views;
