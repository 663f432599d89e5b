//! Linking grade records to evaluation records.
//!
//! Grades and evaluations share no identifier, so each grade is matched by
//! probing a cascade of composite keys, from the most specific
//! (term, year, course, full instructor name) down to the course alone, across
//! the terms its academic year could refer to. The first hit wins.

pub mod course;
pub mod engine;
pub mod index;
pub mod keys;

pub use engine::{JoinOutcome, JoinReport, join, join_with_index};
pub use index::{EvalIndex, EvalMatch};
pub use keys::KeyLevel;
