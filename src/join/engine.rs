use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::join::course::{parse_course_number, split_instructor, term_guesses};
use crate::join::index::{EvalIndex, EvalMatch};
use crate::join::keys::{KeyLevel, KeyParts};
use crate::records::{EvalMedian, EvalParam, GradeRecord, JoinedCourse};
use crate::stats::pct;

/// Number of leading grades whose match outcome is logged at debug level.
const SAMPLE_LOG_LIMIT: usize = 5;

/// Match counters for one join run. Informational only.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinReport {
    pub total_grades: usize,
    pub matched: usize,
    /// Matched grades whose evaluation reports a positive global median.
    pub with_rating: usize,
    pub by_level: BTreeMap<KeyLevel, usize>,
}

impl JoinReport {
    pub fn match_pct(&self) -> f64 {
        pct(self.matched, self.total_grades)
    }

    pub fn rating_pct(&self) -> f64 {
        pct(self.with_rating, self.total_grades)
    }
}

/// Joined records in grade order, plus the counters gathered on the way.
#[derive(Debug, Default)]
pub struct JoinOutcome {
    pub courses: Vec<JoinedCourse>,
    pub report: JoinReport,
}

/// Builds an [`EvalIndex`] and joins every grade against it.
pub fn join(
    grades: Vec<GradeRecord>,
    params: Vec<EvalParam>,
    medians: Vec<EvalMedian>,
) -> JoinOutcome {
    let index = EvalIndex::build(params, medians);
    join_with_index(grades, &index)
}

/// Joins every grade against a prebuilt index.
///
/// A grade without a match keeps empty evaluation references.
pub fn join_with_index(grades: Vec<GradeRecord>, index: &EvalIndex) -> JoinOutcome {
    let mut report = JoinReport {
        total_grades: grades.len(),
        ..Default::default()
    };

    let courses: Vec<JoinedCourse> = grades
        .into_iter()
        .enumerate()
        .map(|(i, grade)| {
            let parts = parse_course_number(&grade.course_number);
            let found = find_match(index, &grade, &parts.department, &parts.number);

            match &found {
                Some((level, m)) => {
                    report.matched += 1;
                    *report.by_level.entry(*level).or_default() += 1;
                    if m.median.as_ref().is_some_and(|md| md.median_global > 0.0) {
                        report.with_rating += 1;
                    }
                    if i < SAMPLE_LOG_LIMIT {
                        debug!(
                            course = %grade.course_number,
                            instructor = %grade.primary_instructor,
                            level = ?level,
                            eval_id = m.param.eval_id,
                            median_global = m.median.as_ref().map(|md| md.median_global),
                            "Matched grade"
                        );
                    }
                }
                None if i < SAMPLE_LOG_LIMIT => {
                    debug!(
                        course = %grade.course_number,
                        instructor = %grade.primary_instructor,
                        "No match found"
                    );
                }
                None => {}
            }

            let (eval_param, eval_median) = match found {
                Some((_, m)) => (Some(m.param.clone()), m.median.clone()),
                None => (None, None),
            };

            JoinedCourse {
                grade,
                department: parts.department,
                course_number: parts.number,
                section: parts.section,
                eval_param,
                eval_median,
            }
        })
        .collect();

    info!(
        total = report.total_grades,
        matched = report.matched,
        matched_pct = %format!("{:.1}", report.match_pct()),
        with_rating = report.with_rating,
        with_rating_pct = %format!("{:.1}", report.rating_pct()),
        "Matching results"
    );

    JoinOutcome { courses, report }
}

/// Probes the index for one grade: term guesses outer, key levels inner.
///
/// Returns the first hit and the key level it came from.
pub fn find_match<'i>(
    index: &'i EvalIndex,
    grade: &GradeRecord,
    department: &str,
    number: &str,
) -> Option<(KeyLevel, &'i EvalMatch)> {
    let (last_name, first_name) = split_instructor(&grade.primary_instructor);

    term_guesses(&grade.academic_year)
        .into_iter()
        .find_map(|guess| {
            let parts = KeyParts {
                term: guess.term,
                year: guess.year.map(|y| y as f64),
                course_abbrev: department,
                course_number: number,
                last_name: &last_name,
                first_name: &first_name,
            };
            parts
                .cascade()
                .find_map(|(level, key)| index.lookup(&key).map(|m| (level, m)))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(eval_id: i64, term: &str, year: i64, last: &str, first: &str) -> EvalParam {
        EvalParam {
            term: term.to_string(),
            year: year as f64,
            eval_id: eval_id as f64,
            course_abbrev: "CSE".to_string(),
            course_number: "142".to_string(),
            last_name: last.to_string(),
            first_name: first.to_string(),
            ..Default::default()
        }
    }

    fn median(eval_id: i64, global: f64) -> EvalMedian {
        EvalMedian {
            eval_id: eval_id as f64,
            median_global: global,
            ..Default::default()
        }
    }

    fn grade(course: &str, instructor: &str, year: &str) -> GradeRecord {
        GradeRecord {
            academic_year: year.to_string(),
            course_number: course.to_string(),
            primary_instructor: instructor.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_loose_key_does_not_shadow_specific_instructor() {
        let outcome = join(
            vec![grade("CSE 142 A", "REGES, STUART", "2020-2021")],
            vec![
                param(1, "Autumn", 2019, "STEPP", "MARTY"),
                param(2, "Autumn", 2019, "REGES", "STUART"),
            ],
            vec![],
        );

        let course = &outcome.courses[0];
        assert_eq!(course.eval_param.as_ref().unwrap().eval_id, 2.0);
        assert_eq!(outcome.report.by_level[&KeyLevel::LastName], 1);
    }

    #[test]
    fn test_first_term_guess_wins() {
        // Both the Autumn and the Spring evaluation match on the full key;
        // Autumn is probed first.
        let outcome = join(
            vec![grade("CSE 142", "STEPP, MARTY", "2021-2022")],
            vec![
                param(20, "Spring", 2022, "STEPP", "MARTY"),
                param(10, "Autumn", 2021, "STEPP", "MARTY"),
            ],
            vec![median(10, 4.1), median(20, 4.9)],
        );

        let course = &outcome.courses[0];
        assert_eq!(course.eval_param.as_ref().unwrap().eval_id, 10.0);
        assert_eq!(course.eval_median.as_ref().unwrap().median_global, 4.1);
        assert_eq!(outcome.report.by_level[&KeyLevel::TermFullName], 1);
    }

    #[test]
    fn test_term_loose_key_beats_later_term_exact_key() {
        // Spring exact key exists, but Autumn has a term-free hit through
        // the same course, and Autumn is probed first.
        let outcome = join(
            vec![grade("CSE 142", "STEPP, MARTY", "2021-2022")],
            vec![param(5, "Spring", 2022, "STEPP", "MARTY")],
            vec![],
        );

        assert_eq!(outcome.courses[0].eval_param.as_ref().unwrap().eval_id, 5.0);
        assert_eq!(outcome.report.by_level[&KeyLevel::LastName], 1);
        assert!(!outcome.report.by_level.contains_key(&KeyLevel::TermFullName));
    }

    #[test]
    fn test_unmatched_grade_has_no_references() {
        let outcome = join(
            vec![
                grade("MATH 124 B", "SMITH, ANN", "2021-2022"),
                grade("CSE 142", "STEPP, MARTY", "2021-2022"),
            ],
            vec![param(1, "Autumn", 2021, "STEPP", "MARTY")],
            vec![median(1, 0.0)],
        );

        let unmatched = &outcome.courses[0];
        assert_eq!(unmatched.department, "MATH");
        assert_eq!(unmatched.course_number, "124");
        assert_eq!(unmatched.section, "B");
        assert!(unmatched.eval_param.is_none());
        assert!(unmatched.eval_median.is_none());

        assert_eq!(outcome.report.total_grades, 2);
        assert_eq!(outcome.report.matched, 1);
        // The match has a median, but not a positive one.
        assert_eq!(outcome.report.with_rating, 0);
    }

    #[test]
    fn test_name_suffix_still_matches_full_name() {
        let outcome = join(
            vec![grade("CSE 142", "STEPP, MARTY, JR", "2021-2022")],
            vec![param(1, "Autumn", 2021, "STEPP", "MARTY")],
            vec![],
        );

        assert_eq!(outcome.courses[0].eval_param.as_ref().unwrap().eval_id, 1.0);
        assert_eq!(outcome.report.by_level[&KeyLevel::TermFullName], 1);
    }

    #[test]
    fn test_malformed_year_still_matches_term_free_keys() {
        let outcome = join(
            vec![grade("CSE 142", "STEPP, MARTY", "unknown")],
            vec![param(1, "Autumn", 2021, "STEPP", "MARTY")],
            vec![median(1, 4.0)],
        );

        assert_eq!(outcome.courses[0].eval_param.as_ref().unwrap().eval_id, 1.0);
        assert_eq!(outcome.report.with_rating, 1);
        assert_eq!(outcome.report.by_level[&KeyLevel::LastName], 1);
    }

    #[test]
    fn test_matches_share_evaluation_records() {
        let outcome = join(
            vec![
                grade("CSE 142 A", "STEPP, MARTY", "2021-2022"),
                grade("CSE 142 B", "STEPP, MARTY", "2021-2022"),
            ],
            vec![param(1, "Autumn", 2021, "STEPP", "MARTY")],
            vec![median(1, 4.0)],
        );

        let a = outcome.courses[0].eval_param.as_ref().unwrap();
        let b = outcome.courses[1].eval_param.as_ref().unwrap();
        assert!(std::sync::Arc::ptr_eq(a, b));
        assert_eq!(outcome.report.match_pct(), 100.0);
    }

    #[test]
    fn test_empty_grades() {
        let outcome = join(vec![], vec![param(1, "Autumn", 2021, "A", "B")], vec![]);
        assert!(outcome.courses.is_empty());
        assert_eq!(outcome.report.match_pct(), 0.0);
    }
}
