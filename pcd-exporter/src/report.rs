use std::{error::Error, fs::File, io::BufWriter, path::Path};

use bump_detector::DetectionReport;

/// Writes the per-window summary of `report` as pretty-printed JSON.
pub fn write_report(path: &Path, report: &DetectionReport) -> Result<(), Box<dyn Error>> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &report.summary())?;
    log::info!(
        "wrote report of {} windows to {}",
        report.segments.len(),
        path.display()
    );
    Ok(())
}
