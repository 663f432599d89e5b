//! In-memory lookups over the evaluation tables.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::join::keys::KeyParts;
use crate::records::{EvalMedian, EvalParam};

/// An evaluation and its medians, if any were reported.
#[derive(Debug, Clone)]
pub struct EvalMatch {
    pub param: Arc<EvalParam>,
    pub median: Option<Arc<EvalMedian>>,
}

/// Evaluation lookups by composite key.
#[derive(Debug, Default)]
pub struct EvalIndex {
    by_key: HashMap<String, EvalMatch>,
}

/// Hash key for an `EvalID`. Ids come from the transform and are always finite.
fn id_key(eval_id: f64) -> u64 {
    eval_id.to_bits()
}

impl EvalIndex {
    /// Builds the lookup.
    ///
    /// Medians with a repeated `EvalID` replace the earlier one. Each param is
    /// registered under every key of the cascade; a key already taken by an
    /// earlier param is left alone.
    pub fn build(params: Vec<EvalParam>, medians: Vec<EvalMedian>) -> Self {
        let mut by_eval_id = HashMap::with_capacity(medians.len());
        let mut overwritten = 0usize;
        for median in medians {
            if by_eval_id
                .insert(id_key(median.eval_id), Arc::new(median))
                .is_some()
            {
                overwritten += 1;
            }
        }
        if overwritten > 0 {
            debug!(overwritten, "Duplicate EvalIDs in medians, later rows kept");
        }

        let mut by_key: HashMap<String, EvalMatch> = HashMap::new();
        let mut with_median = 0usize;

        for param in params {
            let median = by_eval_id.get(&id_key(param.eval_id)).cloned();
            if let Some(m) = &median {
                with_median += 1;
                if with_median <= 3 {
                    debug!(
                        eval_id = param.eval_id,
                        course_abbrev = %param.course_abbrev,
                        course_number = %param.course_number,
                        median_global = m.median_global,
                        "Eval param has median data"
                    );
                }
            }

            let entry = EvalMatch {
                param: Arc::new(param),
                median,
            };
            let param = &entry.param;
            let parts = KeyParts {
                term: &param.term,
                year: Some(param.year),
                course_abbrev: &param.course_abbrev,
                course_number: &param.course_number,
                last_name: &param.last_name,
                first_name: &param.first_name,
            };

            for (_, key) in parts.cascade() {
                by_key.entry(key).or_insert_with(|| entry.clone());
            }
        }

        info!(
            keys = by_key.len(),
            medians = by_eval_id.len(),
            params_with_median = with_median,
            "Evaluation index built"
        );

        Self { by_key }
    }

    /// The evaluation registered under a composite key.
    pub fn lookup(&self, key: &str) -> Option<&EvalMatch> {
        self.by_key.get(key)
    }
}
