//! Splitting the free-form grade fields into the parts the join keys need.

/// Department, number, and section parsed from a raw course string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseParts {
    pub department: String,
    pub number: String,
    pub section: String,
}

/// Parses `"C LIT 240 A"` into department `"C LIT"`, number `"240"`, section `"A"`.
///
/// Department is the run of tokens before the first token that starts with a
/// digit. Section defaults to `"A"` when nothing follows the number.
pub fn parse_course_number(raw: &str) -> CourseParts {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let number_at = tokens
        .iter()
        .position(|t| t.starts_with(|c: char| c.is_ascii_digit()));

    let department = tokens[..number_at.unwrap_or(tokens.len())].join(" ");
    let number = number_at.map(|i| tokens[i]).unwrap_or_default();
    let section = number_at
        .and_then(|i| tokens.get(i + 1))
        .copied()
        .unwrap_or("A");

    CourseParts {
        department,
        number: number.to_string(),
        section: section.to_string(),
    }
}

/// Splits `"LAST, FIRST"` into `(last, first)`.
///
/// Without a comma the whole string is the last name. Anything after a
/// second comma is dropped: `"SMITH, JOHN, JR"` gives `("SMITH", "JOHN")`.
pub fn split_instructor(display: &str) -> (String, String) {
    let mut parts = display.split(',').map(str::trim);
    let last = parts.next().filter(|s| !s.is_empty()).unwrap_or(display);
    let first = parts.next().unwrap_or_default();
    (last.to_string(), first.to_string())
}

/// A term name paired with the calendar year it most likely fell in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermGuess {
    pub term: &'static str,
    /// `None` when the academic-year label did not yield a number.
    pub year: Option<i64>,
}

/// Expands `"2021-2022"` into the four term guesses, in probing order.
///
/// Autumn falls in the first calendar year of an academic year; Winter,
/// Spring, and Summer fall in the second.
pub fn term_guesses(academic_year: &str) -> [TermGuess; 4] {
    let mut parts = academic_year.split('-');
    let first = parts.next().and_then(leading_int);
    let second = parts.next().and_then(leading_int);

    [
        TermGuess {
            term: "Autumn",
            year: first,
        },
        TermGuess {
            term: "Winter",
            year: second,
        },
        TermGuess {
            term: "Spring",
            year: second,
        },
        TermGuess {
            term: "Summer",
            year: second,
        },
    ]
}

/// Reads the integer at the start of `s`, ignoring leading whitespace and
/// anything after the digits.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_course_number_full() {
        let parts = parse_course_number("CSE 142 B");
        assert_eq!(parts.department, "CSE");
        assert_eq!(parts.number, "142");
        assert_eq!(parts.section, "B");
    }

    #[test]
    fn test_parse_course_number_multi_word_department() {
        let parts = parse_course_number("  C LIT   240 ");
        assert_eq!(parts.department, "C LIT");
        assert_eq!(parts.number, "240");
        assert_eq!(parts.section, "A");
    }

    #[test]
    fn test_parse_course_number_without_number() {
        let parts = parse_course_number("SEMINAR TBA");
        assert_eq!(parts.department, "SEMINAR TBA");
        assert_eq!(parts.number, "");
        assert_eq!(parts.section, "A");

        let empty = parse_course_number("");
        assert_eq!(empty.department, "");
        assert_eq!(empty.section, "A");
    }

    #[test]
    fn test_split_instructor() {
        assert_eq!(
            split_instructor("STEPP, MARTY"),
            ("STEPP".to_string(), "MARTY".to_string())
        );
        assert_eq!(
            split_instructor("REGES"),
            ("REGES".to_string(), String::new())
        );
        assert_eq!(
            split_instructor("SMITH, JOHN, JR"),
            ("SMITH".to_string(), "JOHN".to_string())
        );
    }

    #[test]
    fn test_term_guesses_order() {
        let guesses = term_guesses("2021-2022");
        let pairs: Vec<(&str, Option<i64>)> = guesses.iter().map(|g| (g.term, g.year)).collect();
        assert_eq!(
            pairs,
            vec![
                ("Autumn", Some(2021)),
                ("Winter", Some(2022)),
                ("Spring", Some(2022)),
                ("Summer", Some(2022)),
            ]
        );
    }

    #[test]
    fn test_term_guesses_malformed_label() {
        let guesses = term_guesses("2021");
        assert_eq!(guesses[0].year, Some(2021));
        assert_eq!(guesses[1].year, None);

        let guesses = term_guesses("unknown");
        assert!(guesses.iter().all(|g| g.year.is_none()));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("2021"), Some(2021));
        assert_eq!(leading_int(" 2022xyz"), Some(2022));
        assert_eq!(leading_int(""), None);
        assert_eq!(leading_int("abc"), None);
    }
}
