//! HTTP client for PageFetch
//!
//! Retrieves a page, decides whether it is HTML, extracts markdown when it
//! is, and cuts the requested window out of the result.

use crate::error::FetchError;
use crate::extract::extract_content;
use crate::types::{FetchRequest, FetchResult, TextContent};
use crate::window::window;
use crate::DEFAULT_USER_AGENT;
use encoding_rs::{Encoding, UTF_8};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Total request timeout (connect, headers and body)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of redirects followed
const MAX_REDIRECTS: usize = 10;

/// Number of leading body characters inspected for an `<html` tag
const HTML_SNIFF_CHARS: usize = 100;

/// Fetch options that can be configured via tool builder
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Custom timeout (default 30 seconds)
    pub timeout: Option<Duration>,
    /// Allow list of URL prefixes
    pub allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    pub block_prefixes: Vec<String>,
}

/// Fetch a URL and return its windowed content as a single text block
pub async fn fetch(req: FetchRequest) -> Result<Vec<TextContent>, FetchError> {
    fetch_with_options(req, FetchOptions::default()).await
}

/// Fetch a URL with custom options
pub async fn fetch_with_options(
    req: FetchRequest,
    options: FetchOptions,
) -> Result<Vec<TextContent>, FetchError> {
    let url = validate(&req, &options)?;
    let start_index = req.effective_start_index();
    let max_length = req.effective_max_length();

    let result = fetch_url(&url, req.wants_raw(), &options).await?;
    let page = window(&result.content, start_index, max_length);
    debug!(
        url = %url,
        start_index,
        max_length,
        next_start_index = ?page.next_start_index,
        "Windowed content"
    );

    Ok(vec![TextContent::text(format!(
        "{}Content from {}:\n{}",
        result.prefix, url, page
    ))])
}

/// Check request parameters and return the normalized URL
///
/// Runs before any network activity.
pub fn validate(req: &FetchRequest, options: &FetchOptions) -> Result<Url, FetchError> {
    let raw_url = req.url.trim();
    if raw_url.is_empty() {
        return Err(FetchError::MissingUrl);
    }

    if req.effective_max_length() == 0 {
        return Err(FetchError::InvalidMaxLength);
    }

    let url = Url::parse(raw_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrlScheme);
    }

    // Check allow/block lists
    if !options.allow_prefixes.is_empty() {
        let allowed = options
            .allow_prefixes
            .iter()
            .any(|prefix| url.as_str().starts_with(prefix));
        if !allowed {
            return Err(FetchError::BlockedUrl);
        }
    }

    if options
        .block_prefixes
        .iter()
        .any(|prefix| url.as_str().starts_with(prefix))
    {
        return Err(FetchError::BlockedUrl);
    }

    Ok(url)
}

/// Retrieve `url` and produce its content and prefix label
///
/// HTML is reduced to markdown unless `force_raw` is set. Extraction
/// problems are reported inline in the content, never as errors.
pub async fn fetch_url(
    url: &Url,
    force_raw: bool,
    options: &FetchOptions,
) -> Result<FetchResult, FetchError> {
    // Build headers
    let mut headers = HeaderMap::new();
    let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );

    // Build client
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .timeout(options.timeout.unwrap_or(DEFAULT_TIMEOUT))
        .build()
        .map_err(FetchError::ClientBuildError)?;

    debug!(url = %url, force_raw, "Fetching URL");

    // Send request
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(e, url.as_str()))?;

    let status = response.status();
    if status.as_u16() >= 400 {
        warn!(url = %url, status = status.as_u16(), "HTTP error status");
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = read_body(response, url).await?;
    let content = decode_body(&body, &content_type);

    let html = is_html(&content_type, &content);
    debug!(url = %url, content_type = %content_type, html, size = body.len(), "Classified response");

    if html && !force_raw {
        return Ok(FetchResult::markdown(extract_content(
            &content,
            Some(url.as_str()),
        )));
    }

    Ok(FetchResult::raw(content, &content_type))
}

/// Check if content is HTML based on body start and declared content type
///
/// Only the first 100 characters are sniffed, so documents with a long
/// prolog before `<html` are classified by their content type alone.
pub fn is_html(content_type: &str, body: &str) -> bool {
    let head: String = body.chars().take(HTML_SNIFF_CHARS).collect();
    head.to_lowercase().contains("<html") || content_type.contains("text/html")
}

/// Decode a body with the charset declared in `content_type`
///
/// Unknown or missing charsets fall back to UTF-8; a byte order mark
/// overrides the declaration. Malformed sequences become U+FFFD.
fn decode_body(body: &[u8], content_type: &str) -> String {
    let encoding = charset(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

/// Charset parameter of a content type, if any
fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Read the whole response body, failing on any stream error
async fn read_body(response: reqwest::Response, url: &Url) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|e| FetchError::from_reqwest(e, url.as_str()))?;
        body.extend_from_slice(&bytes);
    }

    Ok(body)
}
