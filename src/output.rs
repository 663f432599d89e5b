//! Output formatting and persistence for processed course data.
//!
//! Writes the processed JSON artifacts, reads them back, and exports flat CSV.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::filter::FilterOptions;
use crate::join::JoinReport;
use crate::pipeline::ProcessedData;
use crate::records::{JoinedCourse, whole_number, whole_number_opt};
use crate::stats::CourseStats;

pub const COMBINED_FILE: &str = "combined-data.json";
pub const FILTER_OPTIONS_FILE: &str = "filter-options.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Run metadata written next to the processed data.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessedSummary {
    pub generated_at: DateTime<Utc>,
    pub stats: CourseStats,
    pub report: JoinReport,
}

/// Logs course statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &CourseStats) {
    debug!("{:#?}", stats);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Serializes `value` as compact JSON into `path`.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_vec(value)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes the combined data, filter options, and run summary into `dir`.
pub fn write_processed(dir: &Path, data: &ProcessedData) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    write_json(&dir.join(COMBINED_FILE), &data.courses)?;
    write_json(&dir.join(FILTER_OPTIONS_FILE), &data.filter_options)?;
    write_json(
        &dir.join(SUMMARY_FILE),
        &ProcessedSummary {
            generated_at: Utc::now(),
            stats: data.stats.clone(),
            report: data.report.clone(),
        },
    )?;

    info!(
        dir = %dir.display(),
        records = data.courses.len(),
        "Processed data written"
    );
    Ok(())
}

/// Reads the combined data and filter options previously written to `dir`.
pub fn load_processed(dir: &Path) -> Result<(Vec<JoinedCourse>, FilterOptions)> {
    let read = |name: &str| {
        let path = dir.join(name);
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    };

    let courses: Vec<JoinedCourse> =
        serde_json::from_str(&read(COMBINED_FILE)?).context("invalid combined data")?;
    let options: FilterOptions =
        serde_json::from_str(&read(FILTER_OPTIONS_FILE)?).context("invalid filter options")?;

    Ok((courses, options))
}

/// One joined course flattened for spreadsheet export.
#[derive(Debug, Serialize)]
struct CourseRow<'a> {
    academic_year: &'a str,
    term: &'a str,
    course: &'a str,
    department: &'a str,
    course_number: &'a str,
    section: &'a str,
    title: &'a str,
    instructor: &'a str,
    #[serde(serialize_with = "whole_number")]
    students: f64,
    average_gpa: f64,
    #[serde(serialize_with = "whole_number_opt")]
    eval_id: Option<f64>,
    median_global: Option<f64>,
    cei: Option<f64>,
}

impl<'a> From<&'a JoinedCourse> for CourseRow<'a> {
    fn from(c: &'a JoinedCourse) -> Self {
        Self {
            academic_year: &c.grade.academic_year,
            term: &c.grade.term,
            course: &c.grade.course_number,
            department: &c.department,
            course_number: &c.course_number,
            section: &c.section,
            title: &c.grade.course_title,
            instructor: &c.grade.primary_instructor,
            students: c.grade.student_count,
            average_gpa: c.grade.average_gpa,
            eval_id: c.eval_param.as_ref().map(|p| p.eval_id),
            median_global: c.eval_median.as_ref().map(|m| m.median_global),
            cei: c.eval_median.as_ref().map(|m| m.cei),
        }
    }
}

/// Writes `courses` as CSV with a header row, replacing any existing file.
pub fn export_csv<'a>(
    path: &Path,
    courses: impl IntoIterator<Item = &'a JoinedCourse>,
) -> Result<usize> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut written = 0;
    for course in courses {
        writer.serialize(CourseRow::from(course))?;
        written += 1;
    }
    writer.flush()?;

    debug!(path = %path.display(), written, "CSV export written");
    Ok(written)
}
