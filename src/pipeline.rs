//! One full processing run: three raw CSV texts in, joined courses out.

use tracing::info;

use crate::error::{Dataset, PipelineError};
use crate::filter::FilterOptions;
use crate::join::{JoinReport, join};
use crate::parser::parse_table;
use crate::records::JoinedCourse;
use crate::stats::{CourseStats, compute_stats};
use crate::transform::{transform_eval_medians, transform_eval_params, transform_grades};

/// The raw text of the three source tables.
#[derive(Debug, Clone, Default)]
pub struct RawTexts {
    pub grades: String,
    pub eval_params: String,
    pub eval_medians: String,
}

/// Everything a processing run produces.
#[derive(Debug, Default)]
pub struct ProcessedData {
    pub courses: Vec<JoinedCourse>,
    pub filter_options: FilterOptions,
    pub stats: CourseStats,
    pub report: JoinReport,
}

/// Parses, transforms, and joins the three tables.
///
/// # Errors
///
/// Any parse or transform failure aborts the run and names the table it came from.
pub fn process(texts: &RawTexts) -> Result<ProcessedData, PipelineError> {
    let parse = |dataset: Dataset, text: &str| {
        parse_table(text)
            .map(|table| table.rows)
            .map_err(|source| PipelineError::Parse { dataset, source })
    };

    let grades = transform_grades(&parse(Dataset::Grades, &texts.grades)?)?;
    let params = transform_eval_params(&parse(Dataset::EvalParams, &texts.eval_params)?)?;
    let medians = transform_eval_medians(&parse(Dataset::EvalMedians, &texts.eval_medians)?)?;

    let outcome = join(grades, params, medians);
    let filter_options = FilterOptions::from_courses(&outcome.courses);
    let stats = compute_stats(&outcome.courses);

    info!(
        courses = outcome.courses.len(),
        departments = filter_options.departments.len(),
        years = filter_options.years.len(),
        instructors = filter_options.instructors.len(),
        "Processed course records"
    );

    Ok(ProcessedData {
        courses: outcome.courses,
        filter_options,
        stats,
        report: outcome.report,
    })
}
