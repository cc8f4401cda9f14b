//! Row-oriented views of a snapshot for table editing, and the inverse
//! transforms that turn edited rows back into [`Edit`]s.
//!
//! Nothing here mutates state. The inverse transforms are also where the
//! editing layer rejects rows that would introduce duplicate or empty names;
//! the store itself never deduplicates.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use ridecheck_state::{AppState, DayRestriction, Ride, Worker};
use serde::{Deserialize, Serialize};

use crate::store::Edit;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// `[name, checkMinutes]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRow {
    pub name: String,
    pub check_minutes: u32,
}

/// `[name, isQualified(ride_1), ..., isQualified(ride_n)]`, checkbox `i`
/// referring to ride `i` of the snapshot the row was projected from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRow {
    pub name: String,
    pub qualified: Vec<bool>,
}

/// A subset picker cell: everything selectable plus what is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subset {
    pub universe: Vec<String>,
    pub chosen: BTreeSet<String>,
}

/// `[day, openMinutes, absentWorkers, closedRides]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRestrictionRow {
    pub day: String,
    pub open_minutes: u32,
    pub absent_workers: Subset,
    pub closed_rides: Subset,
}

/// The read-only ridecheck grid: `["Ride", day...]` over one row per ride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RidecheckTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Which table a rejected row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Ride,
    Worker,
    Day,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ride => "ride",
            Self::Worker => "worker",
            Self::Day => "day",
        };
        f.write_str(s)
    }
}

/// Edited rows the editing layer refuses to turn into an [`Edit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("duplicate {kind} name: {name:?}")]
    Duplicate { kind: RowKind, name: String },

    #[error("{0} name must not be empty")]
    EmptyName(RowKind),
}

// ---------------------------------------------------------------------------
// Forward projections
// ---------------------------------------------------------------------------

pub fn ride_rows(state: &AppState) -> Vec<RideRow> {
    state
        .rides
        .iter()
        .map(|r| RideRow {
            name: r.name.clone(),
            check_minutes: r.check_minutes,
        })
        .collect()
}

pub fn worker_rows(state: &AppState) -> Vec<WorkerRow> {
    state
        .workers
        .iter()
        .map(|w| WorkerRow {
            name: w.name.clone(),
            qualified: state
                .rides
                .iter()
                .map(|r| w.qualified_rides.contains(&r.name))
                .collect(),
        })
        .collect()
}

pub fn day_restriction_rows(state: &AppState) -> Vec<DayRestrictionRow> {
    let workers: Vec<String> = state.workers.iter().map(|w| w.name.clone()).collect();
    let rides: Vec<String> = state.rides.iter().map(|r| r.name.clone()).collect();
    state
        .day_restrictions
        .iter()
        .map(|d| DayRestrictionRow {
            day: d.day.clone(),
            open_minutes: d.open_minutes,
            absent_workers: Subset {
                universe: workers.clone(),
                chosen: d.absent_workers.clone(),
            },
            closed_rides: Subset {
                universe: rides.clone(),
                chosen: d.closed_rides.clone(),
            },
        })
        .collect()
}

/// `["Ride", day...]` in ridecheck order, which need not match the
/// day-restriction order.
pub fn ridecheck_header(state: &AppState) -> Vec<String> {
    std::iter::once("Ride".to_owned())
        .chain(state.ridechecks.iter().map(|r| r.day.clone()))
        .collect()
}

/// One row per current ride; each cell is the assignee for that day or
/// `CLOSED`.
pub fn ridecheck_rows(state: &AppState) -> Vec<Vec<String>> {
    let days = state.ridecheck_days();
    state
        .rides
        .iter()
        .map(|ride| {
            let mut row = Vec::with_capacity(days.len() + 1);
            row.push(ride.name.clone());
            for day in &days {
                // Duplicate days render the first ridecheck for that day.
                if let Some(check) = state.ridecheck(day) {
                    row.push(check.cell(&ride.name).to_owned());
                }
            }
            row
        })
        .collect()
}

pub fn ridecheck_table(state: &AppState) -> RidecheckTable {
    RidecheckTable {
        header: ridecheck_header(state),
        rows: ridecheck_rows(state),
    }
}

// ---------------------------------------------------------------------------
// Inverse transforms
// ---------------------------------------------------------------------------

pub fn rides_edit(rows: Vec<RideRow>) -> Result<Edit, RowError> {
    check_names(RowKind::Ride, rows.iter().map(|r| r.name.as_str()))?;
    let rides = rows
        .into_iter()
        .map(|r| Ride::new(r.name, r.check_minutes))
        .collect();
    Ok(Edit::ReplaceRides(rides))
}

/// Checkbox `i` of each row selects ride `i` of `state`. Checkboxes beyond
/// the current ride count are ignored.
pub fn workers_edit(state: &AppState, rows: Vec<WorkerRow>) -> Result<Edit, RowError> {
    check_names(RowKind::Worker, rows.iter().map(|r| r.name.as_str()))?;
    let workers = rows
        .into_iter()
        .map(|row| {
            let qualified = state
                .rides
                .iter()
                .zip(&row.qualified)
                .filter(|(_, checked)| **checked)
                .map(|(ride, _)| ride.name.clone());
            Worker::new(row.name, qualified)
        })
        .collect();
    Ok(Edit::ReplaceWorkers(workers))
}

pub fn day_restrictions_edit(rows: Vec<DayRestrictionRow>) -> Result<Edit, RowError> {
    check_names(RowKind::Day, rows.iter().map(|r| r.day.as_str()))?;
    let days = rows
        .into_iter()
        .map(|row| DayRestriction {
            day: row.day,
            open_minutes: row.open_minutes,
            closed_rides: row.closed_rides.chosen,
            absent_workers: row.absent_workers.chosen,
        })
        .collect();
    Ok(Edit::ReplaceDayRestrictions(days))
}

fn check_names<'a>(kind: RowKind, names: impl Iterator<Item = &'a str>) -> Result<(), RowError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(RowError::EmptyName(kind));
        }
        if !seen.insert(name) {
            return Err(RowError::Duplicate {
                kind,
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}
