//! HTML5 token model.

use super::{AtomId, Span, TextSpan};

/// Text payload that is either a borrowed span into the decoded input or an
/// owned buffer (after character-reference decoding or literal recovery).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextValue {
    Span(TextSpan),
    Owned(String),
}

/// HTML attribute with interned name and optional value.
///
/// A `None` value means the attribute appeared without `=` in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: AtomId,
    pub value: Option<TextValue>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype {
        name: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        force_quirks: bool,
    },
    StartTag {
        name: AtomId,
        attributes: Vec<Attribute>,
        self_closing: bool,
        span: Span,
    },
    EndTag {
        name: AtomId,
        span: Span,
    },
    Text {
        text: TextValue,
        span: Span,
    },
    Comment {
        text: TextValue,
        span: Span,
    },
    /// End of input. `next_token` keeps returning `Eof` once emitted.
    Eof,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }
}
