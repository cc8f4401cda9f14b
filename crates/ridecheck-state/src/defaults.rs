//! The dataset written to storage the first time the application runs.

use std::collections::BTreeMap;

use crate::models::{AppState, DayRestriction, Ride, Ridecheck, Worker};

/// Built-in starting state.
///
/// The two ridechecks are deliberately out of sync with the day
/// restrictions (Thursday has no restriction): ridechecks only catch up on
/// the next generation.
pub fn default_state() -> AppState {
    let sample_assignment = BTreeMap::from([
        ("Rollercoaster".to_owned(), "Alex".to_owned()),
        ("Flume".to_owned(), "Alexa".to_owned()),
        ("Launcher".to_owned(), "Gio".to_owned()),
        ("Helevator".to_owned(), "Kennedy".to_owned()),
    ]);

    AppState {
        rides: vec![
            Ride::new("Rollercoaster", 22),
            Ride::new("Helevator", 10),
            Ride::new("Flume", 13),
            Ride::new("Launcher", 25),
        ],
        workers: vec![
            Worker::new("Alex", ["Rollercoaster", "Launcher"]),
            Worker::new("Kennedy", ["Flume", "Launcher"]),
            Worker::new("Gio", ["Rollercoaster", "Helevator"]),
            Worker::new("Alexa", ["Flume", "Helevator"]),
        ],
        day_restrictions: vec![
            DayRestriction::open("Monday", 25)
                .with_closed(["Rollercoaster", "Helevator"])
                .with_absent(["Alexa", "Kennedy"]),
            DayRestriction::open("Tuesday", 50).with_absent(["Kennedy"]),
        ],
        ridechecks: vec![
            Ridecheck::new("Thursday", sample_assignment.clone()),
            Ridecheck::new("Tuesday", sample_assignment),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_references_only_known_names() {
        let state = default_state();
        let rides = state.ride_names();
        let workers = state.worker_names();
        for worker in &state.workers {
            assert!(worker.qualified_rides.iter().all(|r| rides.contains(&r.as_str())));
        }
        for day in &state.day_restrictions {
            assert!(day.closed_rides.iter().all(|r| rides.contains(&r.as_str())));
            assert!(day.absent_workers.iter().all(|w| workers.contains(&w.as_str())));
        }
    }

    #[test]
    fn default_ridechecks_are_stale() {
        let state = default_state();
        assert_eq!(state.ridecheck_days(), vec!["Thursday", "Tuesday"]);
        assert_eq!(state.days(), vec!["Monday", "Tuesday"]);
    }
}
