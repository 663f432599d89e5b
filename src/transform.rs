//! Row transformers: generic parsed rows into the fixed-schema records.
//!
//! Missing, null, empty, and non-numeric cells fall back to defaults. Numeric
//! cells are kept as they are, fractional or not.

use tracing::info;

use crate::error::{Dataset, TransformError};
use crate::parser::{Row, Value, parse_number};
use crate::records::{EvalMedian, EvalParam, GradeRecord};

/// Converts a cell to a trimmed string, or `fallback` when absent or empty.
pub fn safe_string(value: Option<&Value>, fallback: &str) -> String {
    match value {
        None | Some(Value::Empty) => fallback.to_string(),
        Some(v) => v.to_string().trim().to_string(),
    }
}

/// Converts a cell to a number, or `fallback` when absent, empty, or non-numeric.
pub fn safe_number(value: Option<&Value>, fallback: f64) -> f64 {
    match value {
        Some(Value::Int(n)) => *n as f64,
        Some(Value::Float(x)) => *x,
        Some(Value::Text(s)) => match parse_number(s) {
            Some(Value::Int(n)) => n as f64,
            Some(Value::Float(x)) => x,
            _ => fallback,
        },
        None | Some(Value::Empty) => fallback,
    }
}

/// Borrowed view over one row with typed accessors by column name.
struct Fields<'a>(&'a Row);

impl Fields<'_> {
    fn text(&self, name: &str) -> String {
        safe_string(self.0.get(name), "")
    }

    fn number(&self, name: &str) -> f64 {
        safe_number(self.0.get(name), 0.0)
    }
}

fn transform<T>(
    rows: &[Row],
    dataset: Dataset,
    build: impl Fn(&Fields<'_>) -> T,
) -> Result<Vec<T>, TransformError> {
    if rows.is_empty() {
        return Err(TransformError::EmptyDataset(dataset));
    }

    let records: Vec<T> = rows.iter().map(|row| build(&Fields(row))).collect();

    info!(%dataset, records = records.len(), "Transformed records");
    Ok(records)
}

/// Builds [`GradeRecord`]s from parsed grade rows.
///
/// # Errors
///
/// Fails on an empty batch.
pub fn transform_grades(rows: &[Row]) -> Result<Vec<GradeRecord>, TransformError> {
    transform(rows, Dataset::Grades, |f| GradeRecord {
        academic_year: f.text("Academic_Year"),
        term: f.text("Term"),
        course_number: f.text("Course_Number"),
        course_title: f.text("Course_Title"),
        primary_instructor: f.text("Primary_Instructor"),
        student_count: f.number("Student_Count"),
        a: f.number("A"),
        a_minus: f.number("A-"),
        b_plus: f.number("B+"),
        b: f.number("B"),
        b_minus: f.number("B-"),
        c_plus: f.number("C+"),
        c: f.number("C"),
        c_minus: f.number("C-"),
        d_plus: f.number("D+"),
        d: f.number("D"),
        d_minus: f.number("D-"),
        f: f.number("F"),
        w: f.number("W"),
        average_gpa: f.number("Average_GPA"),
    })
}

/// Builds [`EvalParam`]s from parsed evaluation-parameter rows.
///
/// # Errors
///
/// Same contract as [`transform_grades`].
pub fn transform_eval_params(rows: &[Row]) -> Result<Vec<EvalParam>, TransformError> {
    transform(rows, Dataset::EvalParams, |f| EvalParam {
        inst_code: f.text("InstCode"),
        term: f.text("Term"),
        year: f.number("Year"),
        eval_id: f.number("EvalID"),
        form: f.text("Form"),
        course_type: f.text("CourseType"),
        evaluation_type: f.number("EvaluationType"),
        group: f.text("Group"),
        enrollment: f.number("Enrollment"),
        questionnaires: f.number("Questionnaires"),
        cross_list: f.number("CrossList"),
        college_code: f.text("CollegeCode"),
        college_text: f.text("CollegeText"),
        sub_college_code: f.text("SubCollegeCode"),
        sub_college_text: f.text("SubCollegeText"),
        department_code: f.text("DepartmentCode"),
        department_text: f.text("DepartmentText"),
        course_abbrev: f.text("CourseAbbrev"),
        course_number: f.text("CourseNumber"),
        section: f.text("Section"),
        course_title: f.text("CourseTitle"),
        credits: f.number("Credits"),
        mult_inst: f.number("MultInst"),
        last_name: f.text("LastName"),
        first_name: f.text("FirstName"),
        middle_name: f.text("MiddleName"),
        rank: f.number("Rank"),
        eval_url: f.text("EvalURL"),
        assigned_instructor: f.text("AssignedInstructor"),
    })
}

/// Builds [`EvalMedian`]s from parsed evaluation-median rows.
///
/// # Errors
///
/// Same contract as [`transform_grades`].
pub fn transform_eval_medians(rows: &[Row]) -> Result<Vec<EvalMedian>, TransformError> {
    transform(rows, Dataset::EvalMedians, |f| EvalMedian {
        inst_code: f.text("InstCode"),
        term: f.text("Term"),
        year: f.number("Year"),
        eval_id: f.number("EvalID"),
        form: f.text("Form"),
        median_global: f.number("MedianGlobal"),
        median01: f.number("Median01"),
        median02: f.number("Median02"),
        median03: f.number("Median03"),
        median04: f.number("Median04"),
        cei: f.number("CEI"),
        n_global: f.number("NGlobal"),
        n01: f.number("N01"),
        n02: f.number("N02"),
        ncei: f.number("NCEI"),
    })
}
