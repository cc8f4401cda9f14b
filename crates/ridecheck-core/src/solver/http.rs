//! HTTP client for the remote solver endpoint.
//!
//! One `POST <endpoint>` per problem with the JSON [`Problem`] as body. The
//! reply must be a `{ "status", "result" }` envelope.

use async_trait::async_trait;
use tracing::debug;

use super::{ProtocolViolation, Solver, SolverError, SolverResponse};
use crate::problem::Problem;

/// Solver backed by an HTTP endpoint. No authentication, no retries.
#[derive(Debug, Clone)]
pub struct HttpSolver {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSolver {
    /// Create a solver posting to `endpoint`, e.g.
    /// `http://localhost:8080/ridecheck_generator`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Create a solver reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Solver for HttpSolver {
    fn name(&self) -> &str {
        "http"
    }

    async fn solve(&self, problem: &Problem) -> Result<SolverResponse, SolverError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(problem)
            .send()
            .await
            .map_err(|e| SolverError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SolverError::Transport(e.to_string()))?;
        debug!(endpoint = %self.endpoint, status = status.as_u16(), bytes = body.len(), "solver replied");

        if !status.is_success() {
            return Err(SolverError::Transport(format!(
                "solver returned HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProtocolViolation::UndecodableBody(e.to_string()).into())
    }
}
