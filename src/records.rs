//! Typed records for the three source tables and the joined output.
//!
//! Field names serialize with the column names of the source exports so the
//! processed JSON reads the same as the CSVs it came from.

use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Writes integral values without a fractional part, the way the source
/// exports show counts and ids. Other values are written as floats.
pub(crate) fn whole_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

pub(crate) fn whole_number_opt<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => whole_number(v, serializer),
        None => serializer.serialize_none(),
    }
}

/// One course offering's grade distribution for one term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    #[serde(rename = "Academic_Year")]
    pub academic_year: String,
    #[serde(rename = "Term")]
    pub term: String,
    /// Raw course string, e.g. `"C LIT 240 A"`.
    #[serde(rename = "Course_Number")]
    pub course_number: String,
    #[serde(rename = "Course_Title")]
    pub course_title: String,
    /// Usually `"LAST, FIRST"`, sometimes only a last name.
    #[serde(rename = "Primary_Instructor")]
    pub primary_instructor: String,
    #[serde(rename = "Student_Count", serialize_with = "whole_number")]
    pub student_count: f64,

    #[serde(rename = "A", serialize_with = "whole_number")]
    pub a: f64,
    #[serde(rename = "A-", serialize_with = "whole_number")]
    pub a_minus: f64,
    #[serde(rename = "B+", serialize_with = "whole_number")]
    pub b_plus: f64,
    #[serde(rename = "B", serialize_with = "whole_number")]
    pub b: f64,
    #[serde(rename = "B-", serialize_with = "whole_number")]
    pub b_minus: f64,
    #[serde(rename = "C+", serialize_with = "whole_number")]
    pub c_plus: f64,
    #[serde(rename = "C", serialize_with = "whole_number")]
    pub c: f64,
    #[serde(rename = "C-", serialize_with = "whole_number")]
    pub c_minus: f64,
    #[serde(rename = "D+", serialize_with = "whole_number")]
    pub d_plus: f64,
    #[serde(rename = "D", serialize_with = "whole_number")]
    pub d: f64,
    #[serde(rename = "D-", serialize_with = "whole_number")]
    pub d_minus: f64,
    #[serde(rename = "F", serialize_with = "whole_number")]
    pub f: f64,
    #[serde(rename = "W", serialize_with = "whole_number")]
    pub w: f64,

    #[serde(rename = "Average_GPA")]
    pub average_gpa: f64,
}

/// Metadata describing one course evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EvalParam {
    pub inst_code: String,
    pub term: String,
    #[serde(serialize_with = "whole_number")]
    pub year: f64,
    #[serde(rename = "EvalID", serialize_with = "whole_number")]
    pub eval_id: f64,
    pub form: String,
    pub course_type: String,
    #[serde(serialize_with = "whole_number")]
    pub evaluation_type: f64,
    pub group: String,
    #[serde(serialize_with = "whole_number")]
    pub enrollment: f64,
    #[serde(serialize_with = "whole_number")]
    pub questionnaires: f64,
    #[serde(serialize_with = "whole_number")]
    pub cross_list: f64,
    pub college_code: String,
    pub college_text: String,
    pub sub_college_code: String,
    pub sub_college_text: String,
    pub department_code: String,
    pub department_text: String,
    pub course_abbrev: String,
    pub course_number: String,
    pub section: String,
    pub course_title: String,
    pub credits: f64,
    #[serde(serialize_with = "whole_number")]
    pub mult_inst: f64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    #[serde(serialize_with = "whole_number")]
    pub rank: f64,
    #[serde(rename = "EvalURL")]
    pub eval_url: String,
    pub assigned_instructor: String,
}

/// Median survey scores for one evaluation, keyed by `EvalID`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EvalMedian {
    pub inst_code: String,
    pub term: String,
    #[serde(serialize_with = "whole_number")]
    pub year: f64,
    #[serde(rename = "EvalID", serialize_with = "whole_number")]
    pub eval_id: f64,
    pub form: String,
    pub median_global: f64,
    pub median01: f64,
    pub median02: f64,
    pub median03: f64,
    pub median04: f64,
    #[serde(rename = "CEI")]
    pub cei: f64,
    #[serde(serialize_with = "whole_number")]
    pub n_global: f64,
    #[serde(serialize_with = "whole_number")]
    pub n01: f64,
    #[serde(serialize_with = "whole_number")]
    pub n02: f64,
    #[serde(rename = "NCEI", serialize_with = "whole_number")]
    pub ncei: f64,
}

/// A grade record with its parsed course parts and, when found, its evaluation.
///
/// Evaluation data is shared, not copied: many grade rows can point at the
/// same evaluation through the looser join keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedCourse {
    #[serde(flatten)]
    pub grade: GradeRecord,
    pub department: String,
    #[serde(rename = "courseNumber")]
    pub course_number: String,
    pub section: String,
    #[serde(
        rename = "evalParam",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub eval_param: Option<Arc<EvalParam>>,
    #[serde(
        rename = "evalMedian",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub eval_median: Option<Arc<EvalMedian>>,
}

impl JoinedCourse {
    /// The global median rating, when a matched evaluation reports a positive one.
    pub fn rating(&self) -> Option<f64> {
        self.eval_median
            .as_ref()
            .map(|m| m.median_global)
            .filter(|g| *g > 0.0)
    }
}
