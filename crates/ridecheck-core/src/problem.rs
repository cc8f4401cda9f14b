//! Day-Problem Builder: the restricted sub-problem for one day.

use ridecheck_state::{AppState, Ride, Worker};
use serde::{Deserialize, Serialize};

/// What the solver is asked to solve for one day. Serializes to the exact
/// request body of the solver endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Rides that are open that day.
    pub rides: Vec<Ride>,
    /// Workers present that day, qualified only for open rides.
    pub workers: Vec<Worker>,
    /// Time each worker has before opening.
    pub total_time_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProblemError {
    #[error("no day restriction named {0:?}")]
    NotFound(String),
}

/// Build the problem for `day` from the first restriction with that name.
pub fn build_problem(state: &AppState, day: &str) -> Result<Problem, ProblemError> {
    let restriction = state
        .day_restriction(day)
        .ok_or_else(|| ProblemError::NotFound(day.to_owned()))?;

    let rides = state
        .rides
        .iter()
        .filter(|r| !restriction.closed_rides.contains(&r.name))
        .cloned()
        .collect();

    let workers = state
        .workers
        .iter()
        .filter(|w| !restriction.absent_workers.contains(&w.name))
        .map(|w| Worker {
            name: w.name.clone(),
            qualified_rides: w
                .qualified_rides
                .difference(&restriction.closed_rides)
                .cloned()
                .collect(),
        })
        .collect();

    Ok(Problem {
        rides,
        workers,
        total_time_minutes: restriction.open_minutes,
    })
}

#[cfg(test)]
mod tests {
    use ridecheck_state::DayRestriction;

    use super::*;

    fn park() -> AppState {
        AppState {
            rides: vec![Ride::new("Coaster", 20), Ride::new("Flume", 10)],
            workers: vec![Worker::new("Alex", ["Coaster", "Flume"])],
            day_restrictions: vec![DayRestriction::open("Mon", 60).with_closed(["Flume"])],
            ridechecks: vec![],
        }
    }

    #[test]
    fn closed_rides_are_removed_everywhere() {
        let problem = build_problem(&park(), "Mon").unwrap();
        assert_eq!(
            problem,
            Problem {
                rides: vec![Ride::new("Coaster", 20)],
                workers: vec![Worker::new("Alex", ["Coaster"])],
                total_time_minutes: 60,
            }
        );
    }

    #[test]
    fn absent_workers_are_excluded() {
        let mut state = park();
        state.workers.push(Worker::new("Gio", ["Coaster"]));
        state.day_restrictions[0].absent_workers.insert("Alex".into());

        let problem = build_problem(&state, "Mon").unwrap();
        assert_eq!(problem.workers, vec![Worker::new("Gio", ["Coaster"])]);
    }

    #[test]
    fn unknown_day_is_not_found() {
        assert_eq!(
            build_problem(&park(), "Fri").unwrap_err(),
            ProblemError::NotFound("Fri".into())
        );
    }

    #[test]
    fn duplicate_day_uses_first_restriction() {
        let mut state = park();
        state.day_restrictions.push(DayRestriction::open("Mon", 5));
        assert_eq!(build_problem(&state, "Mon").unwrap().total_time_minutes, 60);
    }

    #[test]
    fn serializes_solver_request_shape() {
        let json = serde_json::to_value(build_problem(&park(), "Mon").unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "rides": [{"name": "Coaster", "checkMinutes": 20}],
                "workers": [{"name": "Alex", "qualifiedRides": ["Coaster"]}],
                "totalTimeMinutes": 60
            })
        );
    }
}
