//! Core types for PageFetch

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default window size in characters
pub const DEFAULT_MAX_LENGTH: usize = 5000;

/// Request to fetch a URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FetchRequest {
    /// URL to fetch (required, must be http:// or https://)
    pub url: String,

    /// Maximum characters to return (optional, default 5000, must be > 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Starting character index (optional, default 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,

    /// Return raw content instead of extracted markdown (optional, default false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
}

impl FetchRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the window size
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Set the window start
    pub fn start_index(mut self, start_index: usize) -> Self {
        self.start_index = Some(start_index);
        self
    }

    /// Skip main-content extraction and return the body verbatim
    pub fn raw(mut self) -> Self {
        self.raw = Some(true);
        self
    }

    /// Get the effective window size (default 5000)
    pub fn effective_max_length(&self) -> usize {
        self.max_length.unwrap_or(DEFAULT_MAX_LENGTH)
    }

    /// Get the effective window start (default 0)
    pub fn effective_start_index(&self) -> usize {
        self.start_index.unwrap_or(0)
    }

    /// Check if raw content is requested
    pub fn wants_raw(&self) -> bool {
        self.raw.unwrap_or(false)
    }
}

/// Retrieved page content before windowing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Extracted markdown, or the verbatim body for raw/non-HTML content
    pub content: String,
    /// Label prepended to the output; empty for extracted markdown
    pub prefix: String,
}

impl FetchResult {
    /// Result holding extracted markdown
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prefix: String::new(),
        }
    }

    /// Result holding a verbatim body of the given declared type
    pub fn raw(content: impl Into<String>, content_type: &str) -> Self {
        Self {
            content: content.into(),
            prefix: format!("Raw content (type: {}):\n", content_type),
        }
    }
}

/// Content block returned to tool callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TextContent {
    /// Plain text block
    Text { text: String },
}

impl TextContent {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        TextContent::Text { text: text.into() }
    }

    /// Borrow the block's text
    pub fn as_text(&self) -> &str {
        match self {
            TextContent::Text { text } => text,
        }
    }
}

/// Structured tool description advertised to LLM hosts
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolDescription {
    /// What the tool does
    pub description: String,
    /// When a model should call it
    pub use_when: String,
    /// Observable effects of calling it
    pub side_effects: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req = FetchRequest::new("https://example.com");
        assert_eq!(req.effective_max_length(), 5000);
        assert_eq!(req.effective_start_index(), 0);
        assert!(!req.wants_raw());
    }

    #[test]
    fn test_request_builder() {
        let req = FetchRequest::new("https://example.com")
            .max_length(100)
            .start_index(200)
            .raw();

        assert_eq!(req.url, "https://example.com");
        assert_eq!(req.effective_max_length(), 100);
        assert_eq!(req.effective_start_index(), 200);
        assert!(req.wants_raw());
    }

    #[test]
    fn test_request_deserialization_defaults() {
        let req: FetchRequest = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert_eq!(req.max_length, None);
        assert_eq!(req.effective_max_length(), 5000);
    }

    #[test]
    fn test_request_rejects_negative_index() {
        let result: Result<FetchRequest, _> =
            serde_json::from_str(r#"{"url": "https://example.com", "start_index": -1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_serialization() {
        let req = FetchRequest::new("https://example.com").start_index(10);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"url\":\"https://example.com\""));
        assert!(json.contains("\"start_index\":10"));
        // Optional None fields should be omitted
        assert!(!json.contains("max_length"));
        assert!(!json.contains("raw"));
    }

    #[test]
    fn test_fetch_result_prefix() {
        assert_eq!(FetchResult::markdown("# Hi").prefix, "");
        assert_eq!(
            FetchResult::raw("{}", "application/json").prefix,
            "Raw content (type: application/json):\n"
        );
        assert_eq!(FetchResult::raw("x", "").prefix, "Raw content (type: ):\n");
    }

    #[test]
    fn test_text_content_serialization() {
        let block = TextContent::text("hello");
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            serde_json::json!({"type": "text", "text": "hello"})
        );
        assert_eq!(block.as_text(), "hello");
    }
}
