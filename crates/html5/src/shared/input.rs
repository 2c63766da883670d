//! Decoded input for the HTML5 tokenizer.

use super::span::Span;

/// Decoded Unicode scalar input, normalized up front.
///
/// Normalization applied at construction:
/// - a leading U+FEFF byte-order mark is stripped;
/// - CRLF and lone CR become LF;
/// - U+0000 becomes U+FFFD.
///
/// The tokenizer therefore never observes CR or NUL, and spans into the
/// buffer stay valid for the whole parse (the buffer is immutable).
#[derive(Debug)]
pub struct Input {
    buffer: String,
}

impl Input {
    pub fn from_str(text: &str) -> Self {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        if !text.bytes().any(|b| b == b'\r' || b == 0) {
            return Self {
                buffer: text.to_string(),
            };
        }
        let mut buffer = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        let _ = chars.next();
                    }
                    buffer.push('\n');
                }
                '\0' => buffer.push('\u{FFFD}'),
                other => buffer.push(other),
            }
        }
        Self { buffer }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Create a span for the given range.
    pub fn span(&self, start: usize, end: usize) -> Span {
        debug_assert!(
            self.buffer.is_char_boundary(start) && self.buffer.is_char_boundary(end),
            "span must be on UTF-8 boundaries"
        );
        Span::new(start, end)
    }

    /// Resolve a span against the buffer.
    pub fn slice(&self, span: Span) -> &str {
        &self.buffer[span.start..span.end]
    }
}

#[cfg(test)]
mod tests {
    use super::Input;

    #[test]
    fn bom_is_stripped_only_at_position_zero() {
        assert_eq!(Input::from_str("\u{FEFF}abc").as_str(), "abc");
        assert_eq!(Input::from_str("a\u{FEFF}bc").as_str(), "a\u{FEFF}bc");
    }

    #[test]
    fn newlines_are_normalized() {
        assert_eq!(Input::from_str("a\r\nb\rc\nd").as_str(), "a\nb\nc\nd");
        assert_eq!(Input::from_str("\r\r\n").as_str(), "\n\n");
    }

    #[test]
    fn nul_becomes_replacement_character() {
        assert_eq!(Input::from_str("a\0b").as_str(), "a\u{FFFD}b");
        assert_eq!(Input::from_str("\0").as_str(), "\u{FFFD}");
    }

    #[test]
    fn clean_input_round_trips() {
        let text = "plain <p>text</p> π🙂";
        assert_eq!(Input::from_str(text).as_str(), text);
    }
}
