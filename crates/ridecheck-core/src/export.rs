//! Delimited-text export of the ridecheck grid.

use ridecheck_state::AppState;

use crate::views;

/// Join `header` and `rows` with commas and newlines.
///
/// Cells are written as-is: embedded commas or newlines are not quoted or
/// escaped, and there is no trailing newline.
pub fn csv_string(header: &[String], rows: &[Vec<String>]) -> String {
    let mut out = header.join(",");
    out.push('\n');
    let body: Vec<String> = rows.iter().map(|row| row.join(",")).collect();
    out.push_str(&body.join("\n"));
    out
}

/// The ridecheck grid of `state` as delimited text.
pub fn ridecheck_csv(state: &AppState) -> String {
    let table = views::ridecheck_table(state);
    csv_string(&table.header, &table.rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn header_and_rows() {
        let csv = csv_string(
            &cells(&["Ride", "Mon"]),
            &[cells(&["Coaster", "Alex"]), cells(&["Flume", "CLOSED"])],
        );
        assert_eq!(csv, "Ride,Mon\nCoaster,Alex\nFlume,CLOSED");
    }

    #[test]
    fn no_rows_keeps_header_line() {
        assert_eq!(csv_string(&cells(&["Ride"]), &[]), "Ride\n");
    }

    #[test]
    fn embedded_delimiters_are_not_escaped() {
        let csv = csv_string(&cells(&["a,b"]), &[cells(&["c,d"])]);
        assert_eq!(csv, "a,b\nc,d");
    }

    #[test]
    fn default_state_export() {
        let csv = ridecheck_csv(&AppState::default());
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Ride,Thursday,Tuesday"));
        assert_eq!(lines.next(), Some("Rollercoaster,Alex,Alex"));
        assert_eq!(csv.lines().count(), 5);
    }
}
