//! Shared test utilities for ridecheck integration tests.
//!
//! Provides:
//! - small fixture states,
//! - [`FnSolver`], an in-process solver driven by a closure, with optional
//!   per-problem delays and in-flight accounting,
//! - [`FakeSolverServer`], a real HTTP endpoint on an ephemeral local port
//!   for exercising the HTTP solver client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::Value;

use ridecheck_core::problem::Problem;
use ridecheck_core::solver::{Assignment, Solver, SolverError, SolverResponse};
use ridecheck_state::{AppState, DayRestriction, Ride, Worker};

// ===========================================================================
// Fixtures
// ===========================================================================

/// Coaster (20) and Flume (10); Alex qualified on both; "Mon" closes Flume
/// with 60 minutes before opening.
pub fn coaster_and_flume() -> AppState {
    AppState {
        rides: vec![Ride::new("Coaster", 20), Ride::new("Flume", 10)],
        workers: vec![Worker::new("Alex", ["Coaster", "Flume"])],
        day_restrictions: vec![DayRestriction::open("Mon", 60).with_closed(["Flume"])],
        ridechecks: vec![],
    }
}

/// [`coaster_and_flume`] plus a second worker and a "Tue" restriction.
///
/// Each day has a distinct `open_minutes` (Mon 60, Tue 45) so solvers can
/// tell the problems apart.
pub fn two_days() -> AppState {
    let mut state = coaster_and_flume();
    state.workers.push(Worker::new("Gio", ["Flume"]));
    state
        .day_restrictions
        .push(DayRestriction::open("Tue", 45).with_absent(["Alex"]));
    state
}

/// Assign every open ride to the first worker qualified for it.
pub fn first_qualified(problem: &Problem) -> Assignment {
    problem
        .rides
        .iter()
        .filter_map(|ride| {
            problem
                .workers
                .iter()
                .find(|w| w.qualified_rides.contains(&ride.name))
                .map(|w| (ride.name.clone(), w.name.clone()))
        })
        .collect()
}

// ===========================================================================
// FnSolver -- closure-driven in-process solver
// ===========================================================================

type Respond = dyn Fn(&Problem) -> Result<SolverResponse, SolverError> + Send + Sync;
type Delay = dyn Fn(&Problem) -> Duration + Send + Sync;

/// A [`Solver`] whose replies come from a closure.
pub struct FnSolver {
    respond: Box<Respond>,
    delay: Option<Box<Delay>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FnSolver {
    pub fn new(
        respond: impl Fn(&Problem) -> Result<SolverResponse, SolverError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// A solver that generates [`first_qualified`] assignments for every
    /// problem.
    pub fn always_generated() -> Self {
        Self::new(|p| Ok(SolverResponse::generated(first_qualified(p))))
    }

    /// Sleep for `delay(problem)` before answering.
    pub fn with_delay(
        mut self,
        delay: impl Fn(&Problem) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    /// Number of `solve` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Solver for FnSolver {
    fn name(&self) -> &str {
        "fn"
    }

    async fn solve(&self, problem: &Problem) -> Result<SolverResponse, SolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(problem)).await;
        }
        let reply = (self.respond)(problem);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }
}

// ===========================================================================
// FakeSolverServer -- HTTP endpoint on 127.0.0.1
// ===========================================================================

type Handler = dyn Fn(&Value) -> (u16, String) + Send + Sync;

/// An HTTP solver endpoint served from a background task.
///
/// Every request body is recorded; the reply (status code, raw body) comes
/// from the handler closure. The server stops when the runtime shuts down.
pub struct FakeSolverServer {
    url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeSolverServer {
    /// Start serving `POST /solve` on an ephemeral port.
    pub async fn start(handler: impl Fn(&Value) -> (u16, String) + Send + Sync + 'static) -> Self {
        let handler: Arc<Handler> = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let app = Router::new().route(
            "/solve",
            post(move |body: String| {
                let handler = Arc::clone(&handler);
                let recorded = Arc::clone(&recorded);
                async move {
                    let json: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
                    let (code, reply) = handler(&json);
                    recorded.lock().unwrap().push(json);
                    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                    (status, [("content-type", "application/json")], reply)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake solver listener");
        let addr = listener.local_addr().expect("fake solver has no local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake solver server failed");
        });

        Self {
            url: format!("http://{addr}/solve"),
            requests,
        }
    }

    /// Endpoint URL to hand to the HTTP solver.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request bodies received so far, in arrival order.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}
