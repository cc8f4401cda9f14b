//! The `Solver` trait -- the adapter interface for assignment services.
//!
//! The trait is object-safe so the orchestrator can take `&dyn Solver` and
//! tests can substitute scripted implementations.

use async_trait::async_trait;

use super::{SolverError, SolverResponse};
use crate::problem::Problem;

/// Computes one day's assignment from a [`Problem`].
///
/// Implementations perform exactly one request per call: no retries, no
/// caching. Identical problems may yield different assignments.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Human-readable name used in logs (e.g. "http").
    fn name(&self) -> &str;

    /// Submit `problem` and return the raw response envelope.
    ///
    /// Return [`SolverError::Transport`] when no envelope could be obtained
    /// and [`SolverError::Protocol`] when the reply is not an envelope.
    async fn solve(&self, problem: &Problem) -> Result<SolverResponse, SolverError>;
}
