//! Loading raw source text from local files or over HTTP.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::pipeline::RawTexts;

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let resp = client.get(url.parse()?).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// True for `http://` and `https://` sources.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads one source as UTF-8 text from a URL or a local path.
#[tracing::instrument(skip(client))]
pub async fn load_text<C: HttpClient>(client: &C, source: &str) -> Result<String> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("failed to fetch {source}"))?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");

    String::from_utf8(bytes).with_context(|| format!("{source} is not valid UTF-8"))
}

/// Loads the three source tables concurrently.
pub async fn load_sources<C: HttpClient>(client: &C, config: &SourceConfig) -> Result<RawTexts> {
    let (grades, eval_params, eval_medians) = tokio::try_join!(
        load_text(client, &config.grades),
        load_text(client, &config.eval_params),
        load_text(client, &config.eval_medians),
    )?;

    info!(
        grades_bytes = grades.len(),
        eval_params_bytes = eval_params.len(),
        eval_medians_bytes = eval_medians.len(),
        "Source tables loaded"
    );

    Ok(RawTexts {
        grades,
        eval_params,
        eval_medians,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.edu/grades.csv"));
        assert!(is_remote("http://localhost/grades.csv"));
        assert!(!is_remote("static/data/grades.csv"));
        assert!(!is_remote("/tmp/http-grades.csv"));
    }

    #[tokio::test]
    async fn test_load_sources_from_local_files() {
        let config = SourceConfig {
            grades: temp_path("course_rater_test_grades.csv"),
            eval_params: temp_path("course_rater_test_params.csv"),
            eval_medians: temp_path("course_rater_test_medians.csv"),
            ..Default::default()
        };
        fs::write(&config.grades, "a,b\n1,2").unwrap();
        fs::write(&config.eval_params, "c\n3").unwrap();
        fs::write(&config.eval_medians, "d\n4").unwrap();

        let client = BasicClient::new().unwrap();
        let texts = load_sources(&client, &config).await.unwrap();

        assert_eq!(texts.grades, "a,b\n1,2");
        assert_eq!(texts.eval_params, "c\n3");
        assert_eq!(texts.eval_medians, "d\n4");

        for path in [&config.grades, &config.eval_params, &config.eval_medians] {
            fs::remove_file(path).unwrap();
        }
    }

    #[tokio::test]
    async fn test_load_text_missing_file_names_source() {
        let client = BasicClient::new().unwrap();
        let err = load_text(&client, "/nonexistent/grades.csv")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/grades.csv"));
    }
}
