//! Row edits for rides, workers and day restrictions.
//!
//! Each command projects the current snapshot to rows, changes the rows and
//! turns them back into an [`Edit`] through the view inverse transforms, so
//! the same name rules apply as for any other edit.

use anyhow::{Result, bail};

use ridecheck_core::naming::next_default;
use ridecheck_core::store::{Edit, Store};
use ridecheck_core::views::{self, DayRestrictionRow, RideRow, Subset, WorkerRow};
use ridecheck_state::{AppState, StateRepository};

/// Check minutes of a ride added without `--minutes`.
pub const DEFAULT_CHECK_MINUTES: u32 = 10;

/// Open minutes of a day added without `--minutes`.
pub const DEFAULT_OPEN_MINUTES: u32 = 100;

/// An edit plus the row name it was about.
#[derive(Debug)]
pub struct RowEdit {
    pub edit: Edit,
    pub name: String,
}

pub fn add_ride(state: &AppState, name: Option<String>, minutes: u32) -> Result<RowEdit> {
    let name = name.unwrap_or_else(|| next_default("Ride", state.ride_names()));
    let mut rows = views::ride_rows(state);
    rows.push(RideRow {
        name: name.clone(),
        check_minutes: minutes,
    });
    Ok(RowEdit {
        edit: views::rides_edit(rows)?,
        name,
    })
}

pub fn remove_ride(state: &AppState, name: &str) -> Result<RowEdit> {
    let mut rows = views::ride_rows(state);
    remove_row(&mut rows, "ride", name, |r| &r.name)?;
    Ok(RowEdit {
        edit: views::rides_edit(rows)?,
        name: name.to_owned(),
    })
}

pub fn add_worker(state: &AppState, name: Option<String>, rides: &[String]) -> Result<RowEdit> {
    require_known("ride", rides, &state.ride_names())?;
    let name = name.unwrap_or_else(|| next_default("Worker", state.worker_names()));
    let mut rows = views::worker_rows(state);
    rows.push(WorkerRow {
        name: name.clone(),
        qualified: state
            .rides
            .iter()
            .map(|r| rides.contains(&r.name))
            .collect(),
    });
    Ok(RowEdit {
        edit: views::workers_edit(state, rows)?,
        name,
    })
}

pub fn remove_worker(state: &AppState, name: &str) -> Result<RowEdit> {
    let mut rows = views::worker_rows(state);
    remove_row(&mut rows, "worker", name, |r| &r.name)?;
    Ok(RowEdit {
        edit: views::workers_edit(state, rows)?,
        name: name.to_owned(),
    })
}

pub fn add_day(
    state: &AppState,
    name: Option<String>,
    minutes: u32,
    closed: &[String],
    absent: &[String],
) -> Result<RowEdit> {
    require_known("ride", closed, &state.ride_names())?;
    require_known("worker", absent, &state.worker_names())?;
    let name = name.unwrap_or_else(|| next_default("Day", state.days()));
    let mut rows = views::day_restriction_rows(state);
    rows.push(DayRestrictionRow {
        day: name.clone(),
        open_minutes: minutes,
        absent_workers: Subset {
            universe: state.worker_names().iter().map(|w| w.to_string()).collect(),
            chosen: absent.iter().cloned().collect(),
        },
        closed_rides: Subset {
            universe: state.ride_names().iter().map(|r| r.to_string()).collect(),
            chosen: closed.iter().cloned().collect(),
        },
    });
    Ok(RowEdit {
        edit: views::day_restrictions_edit(rows)?,
        name,
    })
}

pub fn remove_day(state: &AppState, name: &str) -> Result<RowEdit> {
    let mut rows = views::day_restriction_rows(state);
    remove_row(&mut rows, "day", name, |r| &r.day)?;
    Ok(RowEdit {
        edit: views::day_restrictions_edit(rows)?,
        name: name.to_owned(),
    })
}

/// Apply the edit and report it as `"<action> <name>"`, e.g.
/// `Added ride "Ride5"`. A storage failure is only a warning.
pub fn apply<R: StateRepository>(store: &mut Store<R>, row: RowEdit, action: &str) {
    let applied = store.apply(row.edit);
    println!("{action} {:?}", row.name);
    if let Some(err) = applied.persist_error {
        eprintln!("warning: changes were not saved: {err}");
    }
}

fn remove_row<T>(rows: &mut Vec<T>, kind: &str, name: &str, key: impl Fn(&T) -> &String) -> Result<()> {
    let before = rows.len();
    rows.retain(|r| key(r) != name);
    if rows.len() == before {
        bail!("no {kind} named {name:?}");
    }
    Ok(())
}

fn require_known(kind: &str, wanted: &[String], known: &[&str]) -> Result<()> {
    if let Some(unknown) = wanted.iter().find(|w| !known.contains(&w.as_str())) {
        bail!("unknown {kind} {unknown:?}");
    }
    Ok(())
}
