//! PageFetch - readable, paginated web page fetching for LLM tools
//!
//! This crate fetches a URL, reduces HTML pages to their main content as
//! markdown, and returns one window of the result at a time together with
//! the `start_index` of the next window.

mod client;
mod convert;
mod error;
mod extract;
mod tool;
mod types;
mod window;

pub use client::{
    fetch, fetch_url, fetch_with_options, is_html, validate, FetchOptions, DEFAULT_TIMEOUT,
};
pub use convert::html_to_markdown;
pub use error::{ErrorKind, FetchError, INTERNAL_ERROR, INVALID_PARAMS};
pub use extract::{extract_content, extract_markdown, ExtractionError};
pub use tool::{Tool, ToolBuilder};
pub use types::{FetchRequest, FetchResult, TextContent, ToolDescription, DEFAULT_MAX_LENGTH};
pub use window::{window, PageWindow, NO_MORE_CONTENT};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "PageFetch/1.0 (Autonomous)";

/// Name under which the tool is advertised
pub const TOOL_NAME: &str = "fetch";

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# PageFetch Tool

Fetches a URL and returns its content. HTML pages are reduced to their
main article content and converted to markdown.

## Capabilities
- HTTP GET with redirects and a 30 second timeout
- Readability-style main content extraction
- HTML to Markdown conversion (ATX headings)
- Raw mode for non-HTML content or when requested
- Character-based pagination

## Input Parameters
- `url` (required): The URL to fetch (must be http:// or https://)
- `max_length` (optional): Maximum characters to return (default: 5000)
- `start_index` (optional): Starting character index (default: 0)
- `raw` (optional): Return raw content instead of markdown (default: false)

## Output
A single text block:

    <prefix>Content from <url>:
    <content window>

`<prefix>` is empty for extracted markdown and
`Raw content (type: <content-type>):` otherwise.

When more content remains the window ends with:

    <info>Content truncated. Use start_index=<N> to get more content.</info>

## Examples

### Fetch a webpage as markdown
```json
{"url": "https://example.com"}
```

### Fetch the next window
```json
{"url": "https://example.com", "start_index": 5000}
```

### Fetch raw HTML
```json
{"url": "https://example.com", "raw": true}
```

## Error Handling
- Missing or invalid URL, or max_length of 0: invalid params error
- Network failures and HTTP status >= 400: internal error with the URL
- Pages without extractable content return `<error>...</error>` text
- A start_index past the end returns `<error>No more content available</error>`
"#;
