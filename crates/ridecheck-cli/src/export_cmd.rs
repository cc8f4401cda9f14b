use std::io::Write;

use anyhow::Context;
use ridecheck_core::export::ridecheck_csv;
use ridecheck_state::AppState;

/// Export the ridecheck grid as CSV to `output`, or stdout when `None`.
pub fn run_export(state: &AppState, output: Option<&str>) -> anyhow::Result<()> {
    let csv = ridecheck_csv(state);

    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create output file: {path}"))?,
        )
    } else {
        Box::new(std::io::stdout().lock())
    };
    writer.write_all(csv.as_bytes())?;
    writer.flush()?;

    if let Some(path) = output {
        println!("Exported {} ridechecks to {path}", state.ridechecks.len());
    }
    Ok(())
}
