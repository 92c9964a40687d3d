//! Persisting reports and normalized rosters.
//!
//! Supports pretty-printing, JSON report files and roster CSV export.

use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use tracing::{debug, info};

use crate::analysis::AnalysisReport;
use crate::model::Dataset;

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &AnalysisReport) {
    debug!("{:#?}", report);
}

/// Writes the report as pretty-printed JSON, replacing any existing file.
pub fn write_report(path: &Path, report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

/// Header of the roster CSV: fixed columns then one per active subject.
pub fn roster_header(dataset: &Dataset) -> Vec<String> {
    let mut header: Vec<String> = [
        "id",
        "name",
        "gender",
        "repeater",
        "source_class",
        "semester_average",
    ]
    .map(String::from)
    .to_vec();
    header.extend(dataset.subjects().iter().cloned());
    header
}

/// Writes the normalized students as CSV. Missing grades are left blank.
pub fn write_roster<W: std::io::Write>(writer: W, dataset: &Dataset) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(roster_header(dataset))?;

    for student in dataset.students() {
        let mut record = vec![
            student.id.clone(),
            student.name.clone(),
            student.gender.clone(),
            student.is_repeater.to_string(),
            student.source_class.clone().unwrap_or_default(),
            student.semester_average.to_string(),
        ];
        record.extend(
            dataset
                .subjects()
                .iter()
                .map(|s| student.grade(s).map(|g| g.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_roster_file(path: &Path, dataset: &Dataset) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_roster(file, dataset)?;
    info!(path = %path.display(), students = dataset.students().len(), "Roster written");
    Ok(())
}
