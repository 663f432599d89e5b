//! Predicate filtering over joined courses and the option lists behind it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::records::JoinedCourse;

/// Distinct, non-blank string forms of `field` across `items`, sorted ascending.
pub fn unique_values<T, F, S>(items: &[T], field: F) -> Vec<String>
where
    F: Fn(&T) -> S,
    S: ToString,
{
    items
        .iter()
        .map(|item| field(item).to_string())
        .filter(|value| !value.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Constraints on a course listing. Unset or empty fields impose nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFilter {
    pub department: Option<String>,
    pub year: Option<String>,
    pub instructor: Option<String>,
    /// Case-insensitive substring of the course title or raw course number.
    pub search: Option<String>,
}

impl CourseFilter {
    pub fn is_empty(&self) -> bool {
        [&self.department, &self.year, &self.instructor, &self.search]
            .into_iter()
            .all(|f| active(f).is_none())
    }

    /// True when `course` satisfies every active constraint.
    pub fn matches(&self, course: &JoinedCourse) -> bool {
        let exact = |want: &Option<String>, have: &str| active(want).is_none_or(|w| w == have);

        exact(&self.department, &course.department)
            && exact(&self.year, &course.grade.academic_year)
            && exact(&self.instructor, &course.grade.primary_instructor)
            && active(&self.search).is_none_or(|term| {
                let term = term.to_lowercase();
                course.grade.course_title.to_lowercase().contains(&term)
                    || course.grade.course_number.to_lowercase().contains(&term)
            })
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// The courses that satisfy every active constraint of `filter`, in order.
pub fn filter<'a>(courses: &'a [JoinedCourse], filter: &CourseFilter) -> Vec<&'a JoinedCourse> {
    courses.iter().filter(|c| filter.matches(c)).collect()
}

/// Sorted option lists for department, academic year, and instructor pickers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub years: Vec<String>,
    pub instructors: Vec<String>,
}

impl FilterOptions {
    /// Collects the option lists with [`unique_values`].
    ///
    /// Blank values are left out, so a course with no listed instructor adds
    /// no `""` entry. Such a course is still reachable through the other
    /// filters and the unfiltered listing.
    pub fn from_courses(courses: &[JoinedCourse]) -> Self {
        Self {
            departments: unique_values(courses, |c| c.department.clone()),
            years: unique_values(courses, |c| c.grade.academic_year.clone()),
            instructors: unique_values(courses, |c| c.grade.primary_instructor.clone()),
        }
    }
}
