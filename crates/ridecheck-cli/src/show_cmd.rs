//! Plain-text rendering of the four tables.

use std::fmt::Write;

use clap::ValueEnum;
use ridecheck_core::views;
use ridecheck_state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Table {
    Rides,
    Workers,
    Days,
    Ridechecks,
}

pub fn render(state: &AppState, table: Table) -> String {
    let (header, rows): (Vec<String>, Vec<Vec<String>>) = match table {
        Table::Rides => (
            vec!["Ride".to_owned(), "Check (mins)".to_owned()],
            views::ride_rows(state)
                .into_iter()
                .map(|r| vec![r.name, r.check_minutes.to_string()])
                .collect(),
        ),
        Table::Workers => {
            let header: Vec<String> = std::iter::once("Worker".to_owned())
                .chain(state.rides.iter().map(|r| r.name.clone()))
                .collect();
            let rows = views::worker_rows(state)
                .into_iter()
                .map(|w| {
                    std::iter::once(w.name)
                        .chain(w.qualified.iter().map(|q| if *q { "x" } else { "" }.to_owned()))
                        .collect::<Vec<String>>()
                })
                .collect();
            (header, rows)
        }
        Table::Days => (
            ["Day", "Open (mins)", "Absent workers", "Closed rides"]
                .map(str::to_owned)
                .to_vec(),
            views::day_restriction_rows(state)
                .into_iter()
                .map(|d| {
                    vec![
                        d.day,
                        d.open_minutes.to_string(),
                        join(&d.absent_workers.chosen),
                        join(&d.closed_rides.chosen),
                    ]
                })
                .collect(),
        ),
        Table::Ridechecks => {
            let table = views::ridecheck_table(state);
            (table.header, table.rows)
        }
    };
    format_table(&header, &rows)
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Left-aligned columns separated by two spaces.
fn format_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut out = String::new();
    for line in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", cells.join("  ").trim_end());
    }
    out
}
