//! HTML to markdown conversion
//!
//! A single-pass tag scanner. Headings are always emitted in ATX style
//! (`#` through `######`).

use std::iter::Peekable;
use std::str::Chars;

/// Elements whose content is dropped entirely
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "template", "head",
];

/// Elements that start and end a paragraph-level block
const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "section",
    "article",
    "main",
    "header",
    "footer",
    "aside",
    "nav",
    "figure",
    "figcaption",
    "table",
    "form",
    "details",
    "summary",
    "dl",
    "dt",
    "dd",
];

/// Convert HTML to markdown
pub fn html_to_markdown(html: &str) -> String {
    let mut writer = MarkdownWriter::default();
    let mut chars = html.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '<' => match read_tag(&mut chars) {
                Some(raw) => {
                    let tag = Tag::parse(&raw);
                    if !tag.closing && !tag.self_closing && SKIP_TAGS.contains(&tag.name.as_str()) {
                        skip_until_close(&mut chars, &tag.name);
                    } else {
                        writer.tag(&tag);
                    }
                }
                None => writer.text('<'),
            },
            '&' => {
                let decoded = decode_entity(&mut chars).unwrap_or('&');
                writer.text(decoded);
            }
            _ => writer.text(c),
        }
    }

    clean_whitespace(&writer.out)
}

#[derive(Debug)]
enum ListKind {
    Unordered,
    Ordered(usize),
}

#[derive(Debug, Default)]
struct MarkdownWriter {
    out: String,
    lists: Vec<ListKind>,
    links: Vec<Option<String>>,
    quotes: Vec<usize>,
    in_pre: bool,
}

impl MarkdownWriter {
    fn text(&mut self, c: char) {
        if self.in_pre {
            // Leading newline right after <pre> is not content
            if !(c == '\n' && self.out.ends_with("```\n")) {
                self.out.push(c);
            }
        } else if c.is_whitespace() {
            if !self.out.is_empty() && !self.out.ends_with(|p: char| p == ' ' || p == '\n') {
                self.out.push(' ');
            }
        } else {
            self.out.push(c);
        }
    }

    fn block_break(&mut self) {
        self.out.push_str("\n\n");
    }

    fn tag(&mut self, tag: &Tag<'_>) {
        let name = tag.name.as_str();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.block_break();
                if !tag.closing {
                    let level = usize::from(name.as_bytes()[1] - b'0');
                    self.out.push_str(&"#".repeat(level));
                    self.out.push(' ');
                }
            }
            "br" => self.out.push('\n'),
            "hr" => {
                self.block_break();
                self.out.push_str("---");
                self.block_break();
            }
            "ul" | "ol" => {
                if tag.closing {
                    self.lists.pop();
                    if self.lists.is_empty() {
                        self.block_break();
                    }
                } else {
                    if self.lists.is_empty() {
                        self.block_break();
                    }
                    let kind = if name == "ol" {
                        let start = tag
                            .attribute("start")
                            .and_then(|s| s.trim().parse::<usize>().ok())
                            .unwrap_or(1);
                        ListKind::Ordered(start.saturating_sub(1))
                    } else {
                        ListKind::Unordered
                    };
                    self.lists.push(kind);
                }
            }
            "li" if !tag.closing => {
                let depth = self.lists.len().max(1);
                self.out.push('\n');
                self.out.push_str(&"  ".repeat(depth - 1));
                match self.lists.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        *n += 1;
                        self.out.push_str(&format!("{}. ", n));
                    }
                    _ => self.out.push_str("- "),
                }
            }
            "strong" | "b" if !self.in_pre => self.out.push_str("**"),
            "em" | "i" if !self.in_pre => self.out.push('*'),
            "code" if !self.in_pre => self.out.push('`'),
            "pre" => match (tag.closing, self.in_pre) {
                (false, false) => {
                    self.block_break();
                    self.out.push_str("```\n");
                    self.in_pre = true;
                }
                (true, true) => {
                    if !self.out.ends_with('\n') {
                        self.out.push('\n');
                    }
                    self.out.push_str("```");
                    self.in_pre = false;
                    self.block_break();
                }
                // Stray or nested <pre> tags never open or close a fence
                _ => {}
            },
            "blockquote" => {
                if tag.closing {
                    if let Some(start) = self.quotes.pop() {
                        let inner = self.out.split_off(start);
                        let quoted = clean_whitespace(&inner)
                            .lines()
                            .map(|line| {
                                if line.is_empty() {
                                    ">".to_string()
                                } else {
                                    format!("> {}", line)
                                }
                            })
                            .collect::<Vec<_>>()
                            .join("\n");
                        self.out.push_str(&quoted);
                    }
                    self.block_break();
                } else {
                    self.block_break();
                    self.quotes.push(self.out.len());
                }
            }
            "a" => {
                if tag.closing {
                    if let Some(Some(href)) = self.links.pop() {
                        self.out.push_str(&format!("]({})", href));
                    }
                } else {
                    let href = tag
                        .attribute("href")
                        .filter(|h| !h.is_empty() && !h.starts_with("javascript:"));
                    if href.is_some() {
                        self.out.push('[');
                    }
                    self.links.push(href);
                }
            }
            "img" => {
                if let Some(src) = tag.attribute("src") {
                    let alt = tag.attribute("alt").unwrap_or_default();
                    self.out.push_str(&format!("![{}]({})", alt, src));
                }
            }
            "tr" if tag.closing => self.out.push('\n'),
            "td" | "th" if tag.closing => self.out.push(' '),
            _ if BLOCK_TAGS.contains(&name) => self.block_break(),
            _ => {}
        }
    }
}

/// A parsed start or end tag
#[derive(Debug)]
struct Tag<'a> {
    name: String,
    closing: bool,
    self_closing: bool,
    raw: &'a str,
}

impl<'a> Tag<'a> {
    fn parse(raw: &'a str) -> Self {
        let closing = raw.starts_with('/');
        let name = raw
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        Self {
            name,
            closing,
            self_closing: raw.trim_end().ends_with('/'),
            raw,
        }
    }

    fn attribute(&self, attr: &str) -> Option<String> {
        extract_attribute(self.raw, attr).map(|v| decode_entities(&v))
    }
}

/// Read the inside of a tag after `<`, or `None` if the `<` is literal text
fn read_tag(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    match chars.peek() {
        Some(&c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?') => {}
        _ => return None,
    }

    let mut tag = String::new();
    for c in chars.by_ref() {
        if c == '>' {
            let open_comment = tag.starts_with("!--") && (tag.len() < 5 || !tag.ends_with("--"));
            if !open_comment {
                return Some(tag);
            }
        }
        tag.push(c);
    }
    Some(tag)
}

/// Consume raw text up to and including `</name>`
fn skip_until_close(chars: &mut Peekable<Chars<'_>>, name: &str) {
    let needle = format!("</{}", name);
    let mut seen = String::new();
    for c in chars.by_ref() {
        seen.push(c.to_ascii_lowercase());
        if seen.ends_with(&needle) {
            break;
        }
    }
    for c in chars.by_ref() {
        if c == '>' {
            break;
        }
    }
}

/// Extract attribute value from the inside of a tag
fn extract_attribute(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!("{}=", attr);
    let tag_lower = tag.to_ascii_lowercase();

    let start = tag_lower.match_indices(&pattern).find_map(|(i, _)| {
        tag_lower[..i]
            .ends_with(|c: char| c.is_whitespace())
            .then_some(i)
    })?;

    let rest = tag[start + pattern.len()..].trim_start();
    if let Some(rest) = rest.strip_prefix('"') {
        rest.find('"').map(|end| rest[..end].to_string())
    } else if let Some(rest) = rest.strip_prefix('\'') {
        rest.find('\'').map(|end| rest[..end].to_string())
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(rest.len());
        Some(rest[..end].to_string())
    }
}

/// Decode an entity whose `&` was just consumed. Leaves `chars` untouched
/// if the text is not a recognised entity.
fn decode_entity(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    let mut lookahead = chars.clone();
    let mut name = String::new();

    while let Some(c) = lookahead.next() {
        if c == ';' {
            let decoded = lookup_entity(&name)?;
            for _ in 0..=name.chars().count() {
                chars.next();
            }
            return Some(decoded);
        }
        if !(c.is_ascii_alphanumeric() || c == '#') || name.len() >= 10 {
            return None;
        }
        name.push(c);
    }
    None
}

fn lookup_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "mdash" => '—',
        "ndash" => '–',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "laquo" => '«',
        "raquo" => '»',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "euro" => '€',
        "times" => '×',
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(|c: char| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            return char::from_u32(code);
        }
    };
    Some(c)
}

/// Decode all entities in a string (used for attribute values)
fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '&' {
            out.push(decode_entity(&mut chars).unwrap_or('&'));
        } else {
            out.push(c);
        }
    }
    out
}

/// Clean whitespace: collapse runs, trim line ends, keep at most one blank
/// line in a row. Fenced code blocks are left untouched.
pub fn clean_whitespace(s: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;
    let mut blank_run = 0;

    for line in s.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            blank_run = 0;
            lines.push(line.trim().to_string());
            continue;
        }
        if in_fence {
            lines.push(line.to_string());
            continue;
        }

        let collapsed = collapse_spaces(line);
        if collapsed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(collapsed);
    }

    lines.join("\n").trim().to_string()
}

/// Collapse inner whitespace runs to one space, keeping the indentation
fn collapse_spaces(line: &str) -> String {
    let content = line.trim_start();
    let mut result = line[..line.len() - content.len()].replace('\t', "  ");
    let mut last_was_space = false;

    for c in content.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_atx() {
        let html = "<h1>Title</h1><h2>Subtitle</h2><h6>Deep</h6>";
        let md = html_to_markdown(html);
        assert_eq!(md, "# Title\n\n## Subtitle\n\n###### Deep");
        assert!(!md.contains("==="));
        assert!(!md.contains("---"));
    }

    #[test]
    fn test_paragraphs() {
        let html = "<p>First\n   paragraph</p><p>Second paragraph</p>";
        assert_eq!(
            html_to_markdown(html),
            "First paragraph\n\nSecond paragraph"
        );
    }

    #[test]
    fn test_lists() {
        let html = "<ul><li>One<ul><li>Nested</li></ul></li><li>Two</li></ul>";
        assert_eq!(html_to_markdown(html), "- One\n  - Nested\n- Two");
    }

    #[test]
    fn test_ordered_lists() {
        let html = "<ol><li>First</li><li>Second</li></ol>";
        assert_eq!(html_to_markdown(html), "1. First\n2. Second");

        let html = "<ol start=\"4\"><li>Fourth</li><li>Fifth</li></ol>";
        assert_eq!(html_to_markdown(html), "4. Fourth\n5. Fifth");
    }

    #[test]
    fn test_emphasis() {
        let html = "<p><strong>bold</strong> and <em>italic</em> and <code>x = 1</code></p>";
        assert_eq!(html_to_markdown(html), "**bold** and *italic* and `x = 1`");
    }

    #[test]
    fn test_links_and_images() {
        let html = r#"<p>See <a class="x" href="https://example.com/docs?a=1&amp;b=2">the docs</a>.</p>"#;
        assert_eq!(
            html_to_markdown(html),
            "See [the docs](https://example.com/docs?a=1&b=2)."
        );

        let html = r#"<p><img src="/logo.png" alt="Logo"/></p>"#;
        assert_eq!(html_to_markdown(html), "![Logo](/logo.png)");

        // data-href must not be mistaken for href
        let html = r#"<a data-href="/nope">plain</a>"#;
        assert_eq!(html_to_markdown(html), "plain");
    }

    #[test]
    fn test_code_block_keeps_whitespace() {
        let html = "<pre><code>fn main() {\n    println!(\"hi\");\n}</code></pre>";
        assert_eq!(
            html_to_markdown(html),
            "```\nfn main() {\n    println!(\"hi\");\n}\n```"
        );
    }

    #[test]
    fn test_stray_pre_close_adds_no_fence() {
        let html = "<pre>a</pre></pre><p>x   y</p>";
        assert_eq!(html_to_markdown(html), "```\na\n```\n\nx y");
    }

    #[test]
    fn test_code_block_drops_emphasis_markers() {
        let html = "<pre>let <b>x</b> = <em>1</em>;</pre>";
        assert_eq!(html_to_markdown(html), "```\nlet x = 1;\n```");
    }

    #[test]
    fn test_blockquote() {
        let html = "<blockquote><p>Quoted text</p></blockquote><p>After</p>";
        assert_eq!(html_to_markdown(html), "> Quoted text\n\nAfter");
    }

    #[test]
    fn test_skip_script_and_style() {
        let html = "<p>Before</p><script>if (a < b && c > d) { x = '</p>'; }</script>\
                    <style>p { color: red; }</style><p>After</p>";
        let md = html_to_markdown(html);
        assert_eq!(md, "Before\n\nAfter");
    }

    #[test]
    fn test_comments_and_doctype_dropped() {
        let html = "<!DOCTYPE html><!-- a > b --><p>Text</p>";
        assert_eq!(html_to_markdown(html), "Text");
    }

    #[test]
    fn test_head_dropped() {
        let html = "<html><head><title>Page title</title></head><body><p>Body</p></body></html>";
        assert_eq!(html_to_markdown(html), "Body");
    }

    #[test]
    fn test_entity_decoding() {
        let html = "<p>&amp; &lt; &gt; &quot; &apos; &mdash; &#169; &#x263A; &copy;</p>";
        assert_eq!(html_to_markdown(html), "& < > \" ' — © ☺ ©");
    }

    #[test]
    fn test_unknown_entities_kept() {
        assert_eq!(html_to_markdown("<p>AT&T &bogus; rocks</p>"), "AT&T &bogus; rocks");
    }

    #[test]
    fn test_literal_less_than() {
        assert_eq!(html_to_markdown("<p>1 < 2</p>"), "1 < 2");
    }

    #[test]
    fn test_self_closing_br() {
        assert_eq!(html_to_markdown("<p>one<br/>two</p>"), "one\ntwo");
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        for html in ["<", "<<<>>>", "<a href=", "</", "<!--", "&#xZZZ;", "<p>&", "<pre>"] {
            let _ = html_to_markdown(html);
        }
    }

    #[test]
    fn test_clean_whitespace() {
        let input = "  hello   world  \n\n\n\n  test  ";
        assert_eq!(clean_whitespace(input), "hello world\n\n  test");
    }

    #[test]
    fn test_extract_attribute() {
        assert_eq!(
            extract_attribute("a href=\"https://example.com\" class=\"link\"", "href"),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            extract_attribute("img src='image.png'", "src"),
            Some("image.png".to_string())
        );
        assert_eq!(
            extract_attribute("div class=test", "class"),
            Some("test".to_string())
        );
        assert_eq!(extract_attribute("div", "class"), None);
    }
}
