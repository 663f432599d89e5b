//! The composite-key cascade shared by the index and the join engine.

use serde::{Deserialize, Serialize};

/// Specificity of a composite key, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyLevel {
    /// `term|year|abbrev|number|last|first`
    TermFullName,
    /// `term|year|abbrev|number|last`
    TermLastName,
    /// `abbrev|number|last`
    LastName,
    /// `abbrev|number`
    CourseOnly,
}

impl KeyLevel {
    pub const CASCADE: [KeyLevel; 4] = [
        KeyLevel::TermFullName,
        KeyLevel::TermLastName,
        KeyLevel::LastName,
        KeyLevel::CourseOnly,
    ];
}

/// The field values a composite key is built from.
#[derive(Debug, Clone, Copy)]
pub struct KeyParts<'a> {
    pub term: &'a str,
    /// Written the way the source shows it: `2021`, or `2021.5` if fractional.
    pub year: Option<f64>,
    pub course_abbrev: &'a str,
    pub course_number: &'a str,
    pub last_name: &'a str,
    pub first_name: &'a str,
}

impl KeyParts<'_> {
    /// Builds the key for `level`.
    ///
    /// Term-scoped keys need a year; without one they cannot match anything
    /// and are not built.
    pub fn key(&self, level: KeyLevel) -> Option<String> {
        let course = [self.course_abbrev, self.course_number];
        match level {
            KeyLevel::TermFullName | KeyLevel::TermLastName => {
                let year = self.year?.to_string();
                let mut fields = vec![self.term, year.as_str()];
                fields.extend(course);
                fields.push(self.last_name);
                if level == KeyLevel::TermFullName {
                    fields.push(self.first_name);
                }
                Some(fields.join("|"))
            }
            KeyLevel::LastName => {
                Some([self.course_abbrev, self.course_number, self.last_name].join("|"))
            }
            KeyLevel::CourseOnly => Some(course.join("|")),
        }
    }

    /// All buildable keys, most specific first.
    pub fn cascade(&self) -> impl Iterator<Item = (KeyLevel, String)> + '_ {
        KeyLevel::CASCADE
            .into_iter()
            .filter_map(move |level| self.key(level).map(|key| (level, key)))
    }
}
