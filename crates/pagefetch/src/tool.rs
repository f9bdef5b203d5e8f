//! Tool builder and contract for PageFetch

use crate::client::{fetch_with_options, FetchOptions};
use crate::error::FetchError;
use crate::types::{FetchRequest, TextContent, ToolDescription};
use crate::{TOOL_LLMTXT, TOOL_NAME};
use schemars::schema_for;
use std::time::Duration;

/// Builder for configuring the PageFetch tool
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    /// Custom User-Agent
    user_agent: Option<String>,
    /// Custom request timeout
    timeout: Option<Duration>,
    /// Window size used when the request does not set one
    default_max_length: Option<usize>,
    /// Allow list of URL prefixes
    allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    block_prefixes: Vec<String>,
}

impl ToolBuilder {
    /// Create a new tool builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the window size applied when a request leaves `max_length` unset
    pub fn default_max_length(mut self, max_length: usize) -> Self {
        self.default_max_length = Some(max_length);
        self
    }

    /// Add URL prefix to allow list
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.allow_prefixes.push(prefix.into());
        self
    }

    /// Add URL prefix to block list
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.block_prefixes.push(prefix.into());
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        Tool {
            options: FetchOptions {
                user_agent: self.user_agent,
                timeout: self.timeout,
                allow_prefixes: self.allow_prefixes,
                block_prefixes: self.block_prefixes,
            },
            default_max_length: self.default_max_length,
        }
    }
}

/// Configured PageFetch tool
#[derive(Debug, Clone, Default)]
pub struct Tool {
    options: FetchOptions,
    default_max_length: Option<usize>,
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Tool name advertised to hosts
    pub fn name(&self) -> &'static str {
        TOOL_NAME
    }

    /// Structured description
    pub fn rich_description(&self) -> ToolDescription {
        ToolDescription {
            description: "Fetch a URL and return its content in markdown format".to_string(),
            use_when: "When the user provides a URL and wants its content".to_string(),
            side_effects: Some("Returns the content of the requested URL".to_string()),
        }
    }

    /// Description as the JSON string handed to LLM hosts
    pub fn description(&self) -> String {
        serde_json::to_string(&self.rich_description()).unwrap_or_default()
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(FetchRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Execute the tool with the given request
    pub async fn execute(&self, mut req: FetchRequest) -> Result<Vec<TextContent>, FetchError> {
        if req.max_length.is_none() {
            req.max_length = self.default_max_length;
        }
        fetch_with_options(req, self.options.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_builder() {
        let tool = Tool::builder()
            .user_agent("TestAgent/1.0")
            .timeout(Duration::from_secs(5))
            .default_max_length(1000)
            .allow_prefix("https://allowed.com")
            .block_prefix("https://blocked.com")
            .build();

        assert_eq!(tool.options.user_agent, Some("TestAgent/1.0".to_string()));
        assert_eq!(tool.options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(tool.default_max_length, Some(1000));
        assert_eq!(tool.options.allow_prefixes, vec!["https://allowed.com"]);
        assert_eq!(tool.options.block_prefixes, vec!["https://blocked.com"]);
    }

    #[test]
    fn test_tool_description() {
        let tool = Tool::default();
        assert_eq!(tool.name(), "fetch");
        assert!(!tool.llmtxt().is_empty());

        let description: serde_json::Value = serde_json::from_str(&tool.description()).unwrap();
        assert_eq!(
            description["description"],
            "Fetch a URL and return its content in markdown format"
        );
        assert!(description["use_when"].is_string());
        assert!(description["side_effects"].is_string());
    }

    #[test]
    fn test_tool_input_schema() {
        let schema = Tool::default().input_schema();
        let props = &schema["properties"];
        assert!(props["url"].is_object());
        assert!(props["max_length"].is_object());
        assert!(props["start_index"].is_object());
        assert!(props["raw"].is_object());
        assert_eq!(schema["required"], serde_json::json!(["url"]));
    }

    #[tokio::test]
    async fn test_execute_validates_before_fetching() {
        let tool = Tool::builder().default_max_length(0).build();
        let result = tool.execute(FetchRequest::new("https://example.com")).await;
        assert!(matches!(result, Err(FetchError::InvalidMaxLength)));
    }
}
