use serde::{Deserialize, Serialize};

use crate::records::{JoinedCourse, whole_number};

/// Summary figures over a set of joined courses.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseStats {
    #[serde(rename = "totalCourses")]
    pub total_courses: usize,
    /// Mean GPA over courses that report a GPA above zero.
    #[serde(rename = "avgGPA")]
    pub avg_gpa: f64,
    /// Mean global median over courses matched to a positive rating.
    #[serde(rename = "avgRating")]
    pub avg_rating: f64,
    #[serde(rename = "totalStudents", serialize_with = "whole_number")]
    pub total_students: f64,
}

impl CourseStats {
    pub fn from_courses<'a>(courses: impl IntoIterator<Item = &'a JoinedCourse>) -> Self {
        let mut s = CourseStats::default();
        let mut gpas = Vec::new();
        let mut ratings = Vec::new();

        for course in courses {
            s.total_courses += 1;
            s.total_students += course.grade.student_count;

            if course.grade.average_gpa > 0.0 {
                gpas.push(course.grade.average_gpa);
            }

            if let Some(rating) = course.rating() {
                ratings.push(rating);
            }
        }

        s.avg_gpa = mean(&gpas);
        s.avg_rating = mean(&ratings);
        s
    }
}

/// Computes [`CourseStats`] over any borrowed collection of courses.
pub fn compute_stats<'a>(courses: impl IntoIterator<Item = &'a JoinedCourse>) -> CourseStats {
    CourseStats::from_courses(courses)
}

/// Arithmetic mean. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{EvalMedian, GradeRecord};
    use std::sync::Arc;

    fn course(gpa: f64, students: f64, rating: Option<f64>) -> JoinedCourse {
        JoinedCourse {
            grade: GradeRecord {
                average_gpa: gpa,
                student_count: students,
                ..Default::default()
            },
            department: "CSE".to_string(),
            course_number: "142".to_string(),
            section: "A".to_string(),
            eval_param: None,
            eval_median: rating.map(|g| {
                Arc::new(EvalMedian {
                    median_global: g,
                    ..Default::default()
                })
            }),
        }
    }

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(pct(10, 0), 0.0);
        assert_eq!(pct(1, 4), 25.0);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_stats_skip_zero_gpa_and_missing_ratings() {
        let courses = vec![
            course(3.0, 100.0, Some(4.0)),
            course(0.0, 50.0, Some(0.0)),
            course(3.5, 24.5, None),
            course(2.5, 0.0, Some(5.0)),
        ];
        let stats = compute_stats(&courses);

        assert_eq!(stats.total_courses, 4);
        assert!((stats.avg_gpa - 3.0).abs() < 1e-9);
        assert!((stats.avg_rating - 4.5).abs() < 1e-9);
        assert_eq!(stats.total_students, 174.5);
    }

    #[test]
    fn test_stats_without_positive_gpa() {
        let courses = vec![course(0.0, 10.0, None), course(0.0, 5.0, None)];
        let stats = compute_stats(&courses);

        assert_eq!(stats.avg_gpa, 0.0);
        assert_eq!(stats.avg_rating, 0.0);
        assert_eq!(stats.total_students, 15.0);
    }

    #[test]
    fn test_stats_empty() {
        let courses: Vec<JoinedCourse> = Vec::new();
        let stats = compute_stats(&courses);
        assert_eq!(stats, CourseStats::default());
    }

    #[test]
    fn test_stats_json_field_names() {
        let json = serde_json::to_value(CourseStats::default()).unwrap();
        assert!(json.get("avgGPA").is_some());
        assert!(json.get("totalStudents").is_some());
    }
}
