//! Loading course data: processed JSON first, raw CSV sources as fallback.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::SourceConfig;
use crate::fetch::{HttpClient, load_sources};
use crate::filter::FilterOptions;
use crate::output::load_processed;
use crate::pipeline::process;
use crate::records::JoinedCourse;

/// Joined courses and their filter options, however they were obtained.
#[derive(Debug, Default)]
pub struct LoadedData {
    pub courses: Vec<JoinedCourse>,
    pub filter_options: FilterOptions,
    /// True when the data came from the raw CSV sources.
    pub from_sources: bool,
}

/// Reads processed data from the output directory, or builds it from the
/// configured sources when the processed files are missing or unreadable.
#[tracing::instrument(skip_all, fields(output_dir = %config.output_dir))]
pub async fn load_or_process<C: HttpClient>(client: &C, config: &SourceConfig) -> Result<LoadedData> {
    match load_processed(Path::new(&config.output_dir)) {
        Ok((courses, filter_options)) => {
            info!(records = courses.len(), "Loaded processed data");
            Ok(LoadedData {
                courses,
                filter_options,
                from_sources: false,
            })
        }
        Err(e) => {
            warn!(error = %e, "Processed data unavailable, falling back to CSV sources");
            let texts = load_sources(client, config).await?;
            let data = process(&texts)?;
            Ok(LoadedData {
                courses: data.courses,
                filter_options: data.filter_options,
                from_sources: true,
            })
        }
    }
}
