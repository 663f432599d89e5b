pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod join;
pub mod loader;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod records;
pub mod stats;
pub mod transform;

pub use error::{Dataset, ParseError, PipelineError, TransformError};
pub use filter::{CourseFilter, FilterOptions, filter, unique_values};
pub use join::join;
pub use parser::parse_table;
pub use pipeline::{ProcessedData, RawTexts, process};
pub use stats::{CourseStats, compute_stats};
pub use transform::{transform_eval_medians, transform_eval_params, transform_grades};
