//! Main-content extraction
//!
//! Isolates the article region of a page with a readability pass and
//! renders it as markdown. Failures never escape as errors to fetch
//! callers: [`extract_content`] turns them into inline `<error>` markers.

use crate::convert::html_to_markdown;
use dom_smoothie::{Config, Readability};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, warn};

/// Reasons main-content extraction can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// Readability found no confident main-content region
    #[error("Failed to extract content from HTML")]
    NoContent,

    /// Parsing or conversion failed
    #[error("Failed to process HTML: {0}")]
    ProcessingFailed(String),
}

impl ExtractionError {
    /// Inline marker shown to callers in place of content
    pub fn marker(&self) -> String {
        format!("<error>{}</error>", self)
    }
}

/// Extract the main content of `html` as markdown
///
/// `base_url` lets the readability pass resolve relative links.
pub fn extract_markdown(html: &str, base_url: Option<&str>) -> Result<String, ExtractionError> {
    run_guarded(html, base_url, isolate_and_convert)
}

/// Run an extraction stage, turning any panic into `ProcessingFailed`
fn run_guarded<F>(html: &str, base_url: Option<&str>, stage: F) -> Result<String, ExtractionError>
where
    F: FnOnce(&str, Option<&str>) -> Result<String, ExtractionError>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| stage(html, base_url)));
    match outcome {
        Ok(result) => result,
        Err(payload) => Err(ExtractionError::ProcessingFailed(panic_message(
            payload.as_ref(),
        ))),
    }
}

/// Extract the main content of `html`, rendering failures as `<error>` markers
pub fn extract_content(html: &str, base_url: Option<&str>) -> String {
    extract_markdown(html, base_url).unwrap_or_else(|err| {
        warn!(error = %err, "HTML extraction failed");
        err.marker()
    })
}

fn isolate_and_convert(html: &str, base_url: Option<&str>) -> Result<String, ExtractionError> {
    let mut readability = Readability::new(html, base_url, Some(Config::default()))
        .map_err(|e| ExtractionError::ProcessingFailed(e.to_string()))?;

    let article = match readability.parse() {
        Ok(article) => article,
        Err(e) => {
            debug!(error = %e, "Readability found no article");
            return Err(ExtractionError::NoContent);
        }
    };

    if article.text_content.trim().is_empty() {
        return Err(ExtractionError::NoContent);
    }

    Ok(html_to_markdown(&article.content.to_string()))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
