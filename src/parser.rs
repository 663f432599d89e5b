//! Tolerant CSV parser for the grade and evaluation exports.
//!
//! The exports are produced by different systems and are not always clean, so
//! parsing isolates failures per row: a malformed line is recorded and skipped
//! unless malformed lines make up more than a tenth of the table.

use std::collections::HashMap;
use std::fmt;

use tracing::{info, warn};

use crate::error::{ParseError, RowError};

/// A single coerced cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty cell, or the literal `NULL` / `null`.
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// One data row keyed by header name.
pub type Row = HashMap<String, Value>;

/// Rows that parsed, plus the lines that were skipped along the way.
#[derive(Debug, Default)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub errors: Vec<RowError>,
}

/// Parses comma-delimited text with a header line into coerced rows.
///
/// # Errors
///
/// Fails when there is no header or data line, when every header token is
/// empty, when more than 10% as many lines were skipped as were parsed, or
/// when no rows survive.
pub fn parse_table(text: &str) -> Result<ParsedTable, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.len() < 2 {
        return Err(ParseError::EmptyInput);
    }

    let (header_fields, _) = split_fields(lines[0]);
    let headers: Vec<String> = header_fields
        .iter()
        .map(|h| strip_quotes(h.trim()).to_string())
        .filter(|h| !h.is_empty())
        .collect();

    if headers.is_empty() {
        return Err(ParseError::NoHeaders);
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (i, raw_line) in lines.iter().enumerate().skip(1) {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_row(line, &headers) {
            Ok(row) => rows.push(row),
            Err(message) => errors.push(RowError {
                line: i + 1,
                message,
            }),
        }
    }

    if !errors.is_empty() && errors.len() * 10 > rows.len() {
        let preview: Vec<String> = errors.iter().take(5).map(ToString::to_string).collect();
        warn!(errors = ?preview, "CSV parsing errors");
        return Err(ParseError::TooManyErrors {
            count: errors.len(),
            first: errors[0].to_string(),
        });
    }

    if rows.is_empty() {
        return Err(ParseError::NoValidRows);
    }

    info!(rows = rows.len(), columns = headers.len(), "Parsed CSV");
    if !errors.is_empty() {
        warn!(
            skipped = errors.len(),
            "CSV parsing completed with minor errors"
        );
    }

    Ok(ParsedTable {
        headers,
        rows,
        errors,
    })
}

fn parse_row(line: &str, headers: &[String]) -> Result<Row, String> {
    let (values, closed) = split_fields(line);
    if !closed {
        return Err("unterminated quoted field".to_string());
    }

    let row = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let raw = values.get(index).map(|v| strip_quotes(v.trim())).unwrap_or("");
            (header.clone(), convert_value(raw))
        })
        .collect();

    Ok(row)
}

/// Splits one line into fields, honoring double-quoted fields and `""` escapes.
///
/// The flag is `false` when the line ends inside an open quoted field.
pub fn split_fields(line: &str) -> (Vec<String>, bool) {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    (fields, !in_quotes)
}

/// Removes exactly one pair of surrounding double quotes, if present.
fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Coerces a trimmed cell into [`Value::Empty`], a number, or text.
pub fn convert_value(value: &str) -> Value {
    if value.is_empty() || value == "NULL" || value == "null" {
        return Value::Empty;
    }

    parse_number(value).unwrap_or_else(|| Value::Text(value.to_string()))
}

/// Parses a plain decimal literal (sign, digits, point, exponent).
///
/// Integral values become [`Value::Int`]. Words such as `inf` or `NaN` that
/// the float parser would otherwise accept stay text.
pub fn parse_number(value: &str) -> Option<Value> {
    let is_literal = value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !is_literal {
        return None;
    }

    if let Ok(n) = value.parse::<i64>() {
        return Some(Value::Int(n));
    }

    let x = value.parse::<f64>().ok().filter(|x| x.is_finite())?;
    if x.fract() == 0.0 && x.abs() < 9_007_199_254_740_992.0 {
        Some(Value::Int(x as i64))
    } else {
        Some(Value::Float(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn test_quoted_field_with_commas() {
        let (fields, closed) = split_fields(r#"a,"b,c",d"#);
        assert!(closed);
        assert_eq!(fields, vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_escaped_quote_and_numeric_coercion() {
        let text = table(&["quote,n", r#""He said ""hi""",2"#]);
        let parsed = parse_table(&text).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert_eq!(row["quote"], Value::Text(r#"He said "hi""#.to_string()));
        assert_eq!(row["n"], Value::Int(2));
    }

    #[test]
    fn test_convert_value_numbers() {
        assert_eq!(convert_value("3"), Value::Int(3));
        assert_eq!(convert_value("3.5"), Value::Float(3.5));
        assert_eq!(convert_value("3.0"), Value::Int(3));
        assert_eq!(convert_value("-12"), Value::Int(-12));
        assert_eq!(convert_value("1e3"), Value::Int(1000));
    }

    #[test]
    fn test_convert_value_empty_markers() {
        assert_eq!(convert_value(""), Value::Empty);
        assert_eq!(convert_value("NULL"), Value::Empty);
        assert_eq!(convert_value("null"), Value::Empty);
        assert_eq!(convert_value("Null"), Value::Text("Null".to_string()));
    }

    #[test]
    fn test_convert_value_keeps_words_as_text() {
        assert_eq!(convert_value("inf"), Value::Text("inf".to_string()));
        assert_eq!(convert_value("NaN"), Value::Text("NaN".to_string()));
        assert_eq!(convert_value("142A"), Value::Text("142A".to_string()));
        assert_eq!(convert_value("-"), Value::Text("-".to_string()));
        assert_eq!(
            convert_value("2021-2022"),
            Value::Text("2021-2022".to_string())
        );
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(parse_table("").unwrap_err(), ParseError::EmptyInput);
        assert_eq!(parse_table("   \n  ").unwrap_err(), ParseError::EmptyInput);
        assert_eq!(parse_table("a,b,c").unwrap_err(), ParseError::EmptyInput);
    }

    #[test]
    fn test_blank_headers_rejected() {
        let err = parse_table(" , ,\n1,2,3").unwrap_err();
        assert_eq!(err, ParseError::NoHeaders);
    }

    #[test]
    fn test_headers_trimmed_and_empty_tokens_dropped() {
        let parsed = parse_table("\" Term \",,Year\r\nAutumn,2021").unwrap();
        assert_eq!(parsed.headers, vec!["Term", "Year"]);
        // The second header is now "Year", which lines up with the second value.
        assert_eq!(parsed.rows[0]["Year"], Value::Int(2021));
    }

    #[test]
    fn test_missing_values_become_empty() {
        let parsed = parse_table("a,b,c\n1").unwrap();
        assert_eq!(parsed.rows[0]["a"], Value::Int(1));
        assert_eq!(parsed.rows[0]["b"], Value::Empty);
        assert_eq!(parsed.rows[0]["c"], Value::Empty);
    }

    #[test]
    fn test_strip_quotes_removes_one_pair_only() {
        assert_eq!(strip_quotes("\"CSE\""), "CSE");
        assert_eq!(strip_quotes("\"\"x\"\""), "\"x\"");
        assert_eq!(strip_quotes("He said \"hi\""), "He said \"hi\"");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let parsed = parse_table("a\n1\n\n   \n2\n").unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_one_bad_row_in_twenty_is_tolerated() {
        let mut lines = vec!["id,name".to_string()];
        for i in 0..20 {
            if i == 7 {
                lines.push(format!("{i},\"unterminated"));
            } else {
                lines.push(format!("{i},row{i}"));
            }
        }
        let parsed = parse_table(&lines.join("\n")).unwrap();

        assert_eq!(parsed.rows.len(), 19);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line, 9);
    }

    #[test]
    fn test_three_bad_rows_in_twenty_fail() {
        let mut lines = vec!["id,name".to_string()];
        for i in 0..20 {
            if i % 7 == 3 {
                lines.push(format!("{i},\"unterminated"));
            } else {
                lines.push(format!("{i},row{i}"));
            }
        }
        let err = parse_table(&lines.join("\n")).unwrap_err();

        match err {
            ParseError::TooManyErrors { count, first } => {
                assert_eq!(count, 3);
                assert!(first.starts_with("line 5:"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_single_malformed_row_fails_rate_check() {
        let err = parse_table("a\n\"x").unwrap_err();
        assert!(matches!(err, ParseError::TooManyErrors { count: 1, .. }));
    }
}
