//! Pagination over fetched content
//!
//! Indices and lengths count characters, not bytes, so a window never
//! splits a multi-byte character.

use std::fmt;

/// Text returned when the requested start lies past the end of the content
pub const NO_MORE_CONTENT: &str = "<error>No more content available</error>";

/// A bounded slice of content plus the index of the following slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Windowed text (or the exhaustion marker)
    pub text: String,
    /// True if content remains past this window
    pub truncated: bool,
    /// Start index of the next window, when `truncated`
    pub next_start_index: Option<usize>,
}

impl PageWindow {
    fn exhausted() -> Self {
        Self {
            text: NO_MORE_CONTENT.to_string(),
            truncated: false,
            next_start_index: None,
        }
    }
}

impl fmt::Display for PageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        if let Some(next) = self.next_start_index {
            write!(
                f,
                "\n\n<info>Content truncated. Use start_index={} to get more content.</info>",
                next
            )?;
        }
        Ok(())
    }
}

/// Cut the window `[start_index, start_index + max_length)` out of `content`
pub fn window(content: &str, start_index: usize, max_length: usize) -> PageWindow {
    let total = content.chars().count();
    if start_index >= total {
        return PageWindow::exhausted();
    }

    let text: String = content.chars().skip(start_index).take(max_length).collect();
    let end = start_index.saturating_add(max_length);
    let truncated = text.chars().count() == max_length && end < total;

    PageWindow {
        text,
        truncated,
        next_start_index: truncated.then_some(end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGITS: &str = "0123456789";

    #[test]
    fn test_first_window_has_notice() {
        let w = window(DIGITS, 0, 5);
        assert_eq!(w.text, "01234");
        assert!(w.truncated);
        assert_eq!(w.next_start_index, Some(5));
        assert_eq!(
            w.to_string(),
            "01234\n\n<info>Content truncated. Use start_index=5 to get more content.</info>"
        );
    }

    #[test]
    fn test_exact_tail_has_no_notice() {
        let w = window(DIGITS, 5, 5);
        assert_eq!(w.text, "56789");
        assert!(!w.truncated);
        assert_eq!(w.next_start_index, None);
        assert_eq!(w.to_string(), "56789");
    }

    #[test]
    fn test_start_at_end_is_exhausted() {
        let w = window(DIGITS, 10, 5);
        assert_eq!(w.to_string(), NO_MORE_CONTENT);
        assert!(!w.truncated);

        assert_eq!(window(DIGITS, 500, 5).to_string(), NO_MORE_CONTENT);
        assert_eq!(window("", 0, 5).to_string(), NO_MORE_CONTENT);
    }

    #[test]
    fn test_short_tail_is_clamped() {
        let w = window(DIGITS, 7, 5);
        assert_eq!(w.text, "789");
        assert_eq!(w.next_start_index, None);
    }

    #[test]
    fn test_window_larger_than_content() {
        let w = window(DIGITS, 0, 5000);
        assert_eq!(w.to_string(), DIGITS);
    }

    #[test]
    fn test_middle_window() {
        let w = window(DIGITS, 3, 4);
        assert_eq!(w.text, "3456");
        assert_eq!(w.next_start_index, Some(7));
    }

    #[test]
    fn test_huge_max_length_does_not_overflow() {
        let w = window(DIGITS, 2, usize::MAX);
        assert_eq!(w.text, "23456789");
        assert!(!w.truncated);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let content = "héllo wörld";
        let w = window(content, 1, 4);
        assert_eq!(w.text, "éllo");
        assert_eq!(w.next_start_index, Some(5));

        let w = window(content, 7, 10);
        assert_eq!(w.text, "örld");
        assert_eq!(window(content, 11, 1).to_string(), NO_MORE_CONTENT);
    }

    #[test]
    fn test_windows_cover_content() {
        let content = "The quick brown fox jumps over the lazy dog";
        let mut start = 0;
        let mut rebuilt = String::new();
        loop {
            let w = window(content, start, 6);
            rebuilt.push_str(&w.text);
            match w.next_start_index {
                Some(next) => start = next,
                None => break,
            }
        }
        assert_eq!(rebuilt, content);
    }
}
