//! The Entity Store: a pure reducer over [`AppState`] snapshots plus the
//! holder that owns the current snapshot.
//!
//! Referential integrity is restored by cascading filters rather than by
//! rejecting edits:
//!
//! ```text
//! ReplaceRides            -> drop unknown rides from Worker.qualified_rides
//!                            and DayRestriction.closed_rides
//! ReplaceWorkers          -> drop unknown workers from DayRestriction.absent_workers
//! ReplaceDayRestrictions  -> verbatim
//! ReplaceRidechecks       -> verbatim (ridechecks may be stale)
//! ReplaceWholeState       -> verbatim (load time only)
//! ```

pub mod holder;

use std::collections::BTreeSet;
use std::fmt;

use ridecheck_state::{AppState, DayRestriction, Ride, Ridecheck, Worker};

pub use holder::{Applied, Store, StoreError};

/// One state transition. Every variant replaces a whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    ReplaceRides(Vec<Ride>),
    ReplaceWorkers(Vec<Worker>),
    ReplaceDayRestrictions(Vec<DayRestriction>),
    ReplaceRidechecks(Vec<Ridecheck>),
    ReplaceWholeState(AppState),
}

impl Edit {
    /// Short name of the edit kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReplaceRides(_) => "replace-rides",
            Self::ReplaceWorkers(_) => "replace-workers",
            Self::ReplaceDayRestrictions(_) => "replace-day-restrictions",
            Self::ReplaceRidechecks(_) => "replace-ridechecks",
            Self::ReplaceWholeState(_) => "replace-whole-state",
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Compute the snapshot that results from applying `edit` to `state`.
///
/// `state` is never modified; collections the edit does not touch are
/// cloned into the new snapshot unchanged.
pub fn apply_edit(state: &AppState, edit: Edit) -> AppState {
    match edit {
        Edit::ReplaceRides(rides) => {
            let known: BTreeSet<&str> = rides.iter().map(|r| r.name.as_str()).collect();
            let workers = state
                .workers
                .iter()
                .map(|w| Worker {
                    name: w.name.clone(),
                    qualified_rides: retain_known(&w.qualified_rides, &known),
                })
                .collect();
            let day_restrictions = state
                .day_restrictions
                .iter()
                .map(|d| DayRestriction {
                    closed_rides: retain_known(&d.closed_rides, &known),
                    ..d.clone()
                })
                .collect();
            AppState {
                rides,
                workers,
                day_restrictions,
                ridechecks: state.ridechecks.clone(),
            }
        }
        Edit::ReplaceWorkers(workers) => {
            let known: BTreeSet<&str> = workers.iter().map(|w| w.name.as_str()).collect();
            let day_restrictions = state
                .day_restrictions
                .iter()
                .map(|d| DayRestriction {
                    absent_workers: retain_known(&d.absent_workers, &known),
                    ..d.clone()
                })
                .collect();
            AppState {
                rides: state.rides.clone(),
                workers,
                day_restrictions,
                ridechecks: state.ridechecks.clone(),
            }
        }
        Edit::ReplaceDayRestrictions(day_restrictions) => AppState {
            day_restrictions,
            ..state.clone()
        },
        Edit::ReplaceRidechecks(ridechecks) => AppState {
            ridechecks,
            ..state.clone()
        },
        Edit::ReplaceWholeState(new_state) => new_state,
    }
}

fn retain_known(names: &BTreeSet<String>, known: &BTreeSet<&str>) -> BTreeSet<String> {
    names
        .iter()
        .filter(|n| known.contains(n.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn sample() -> AppState {
        AppState {
            rides: vec![Ride::new("Coaster", 20), Ride::new("Flume", 10)],
            workers: vec![
                Worker::new("Alex", ["Coaster", "Flume"]),
                Worker::new("Gio", ["Flume"]),
            ],
            day_restrictions: vec![DayRestriction::open("Mon", 60)
                .with_closed(["Flume"])
                .with_absent(["Gio"])],
            ridechecks: vec![Ridecheck::new(
                "Mon",
                BTreeMap::from([("Flume".to_owned(), "Gio".to_owned())]),
            )],
        }
    }

    #[test]
    fn removing_a_ride_cascades_to_workers_and_days() {
        let state = sample();
        let next = apply_edit(&state, Edit::ReplaceRides(vec![Ride::new("Coaster", 20)]));

        assert_eq!(next.workers[0].qualified_rides, BTreeSet::from(["Coaster".to_owned()]));
        assert!(next.workers[1].qualified_rides.is_empty());
        assert!(next.day_restrictions[0].closed_rides.is_empty());
        // Unrelated fields survive the cascade.
        assert_eq!(next.day_restrictions[0].absent_workers, BTreeSet::from(["Gio".to_owned()]));
        assert_eq!(next.day_restrictions[0].open_minutes, 60);
    }

    #[test]
    fn renaming_a_ride_drops_the_old_name_everywhere() {
        let state = sample();
        let next = apply_edit(
            &state,
            Edit::ReplaceRides(vec![Ride::new("Coaster", 20), Ride::new("Log Flume", 10)]),
        );
        assert!(next.workers.iter().all(|w| !w.qualified_rides.contains("Flume")));
        assert!(!next.day_restrictions[0].closed_rides.contains("Flume"));
    }

    #[test]
    fn removing_a_worker_cascades_to_absent_workers() {
        let state = sample();
        let next = apply_edit(
            &state,
            Edit::ReplaceWorkers(vec![Worker::new("Alex", ["Coaster"])]),
        );
        assert!(next.day_restrictions[0].absent_workers.is_empty());
        assert_eq!(next.day_restrictions[0].closed_rides, BTreeSet::from(["Flume".to_owned()]));
        assert_eq!(next.rides, state.rides);
    }

    #[test]
    fn ridechecks_are_never_filtered() {
        let state = sample();
        let next = apply_edit(&state, Edit::ReplaceRides(vec![]));
        let next = apply_edit(&next, Edit::ReplaceWorkers(vec![]));
        assert_eq!(next.ridechecks, state.ridechecks);
    }

    #[test]
    fn day_restrictions_are_replaced_verbatim() {
        let state = sample();
        // References to unknown names are not cleaned up by this edit.
        let days = vec![DayRestriction::open("Tue", 5).with_closed(["Ghost Train"])];
        let next = apply_edit(&state, Edit::ReplaceDayRestrictions(days.clone()));
        assert_eq!(next.day_restrictions, days);
        assert_eq!(next.workers, state.workers);
    }

    #[test]
    fn whole_state_replacement_skips_integrity_checks() {
        let state = sample();
        let mut loaded = AppState::empty();
        loaded.workers.push(Worker::new("Ghost", ["Nowhere"]));
        let next = apply_edit(&state, Edit::ReplaceWholeState(loaded.clone()));
        assert_eq!(next, loaded);
    }

    #[test]
    fn original_snapshot_is_untouched() {
        let state = sample();
        let before = state.clone();
        let _ = apply_edit(&state, Edit::ReplaceRides(vec![]));
        assert_eq!(state, before);
    }

    #[test]
    fn edit_kind_names() {
        assert_eq!(Edit::ReplaceRidechecks(vec![]).to_string(), "replace-ridechecks");
        assert_eq!(Edit::ReplaceWholeState(AppState::empty()).kind(), "replace-whole-state");
    }
}
