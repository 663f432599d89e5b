//! Typed failures for the parse, transform, and processing stages.

use std::fmt;

use thiserror::Error;

/// Which of the three source tables a record or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Grades,
    EvalParams,
    EvalMedians,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dataset::Grades => "grades",
            Dataset::EvalParams => "eval params",
            Dataset::EvalMedians => "eval medians",
        };
        f.write_str(name)
    }
}

/// Fatal failures of [`crate::parser::parse_table`].
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("CSV must contain at least a header and one data row")]
    EmptyInput,

    #[error("no valid headers found in CSV")]
    NoHeaders,

    #[error("too many parsing errors ({count}). First error: {first}")]
    TooManyErrors { count: usize, first: String },

    #[error("no valid data rows found in CSV")]
    NoValidRows,
}

/// A single data line that could not be parsed. Recorded and skipped.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("line {line}: {message}")]
pub struct RowError {
    /// 1-based line number in the source text (the header is line 1).
    pub line: usize,
    pub message: String,
}

/// Fatal failures of the row transformers.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("invalid or empty {0} data provided")]
    EmptyDataset(Dataset),
}

/// A failure of the end-to-end processing run, tagged with the table it came from.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to parse {dataset} CSV: {source}")]
    Parse {
        dataset: Dataset,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),
}
