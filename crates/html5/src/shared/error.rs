//! Parse errors for tokenization/tree-building.
//!
//! HTML5 parsing has no error return path: every input produces a tree.
//! Everything here is diagnostic, never control flow.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorOrigin {
    Tokenizer,
    TreeBuilder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorCode {
    UnexpectedCharacter,
    UnexpectedEof,
    InvalidCharacterReference,
    ControlCharacterReference,
    NoncharacterCharacterReference,
    MissingSemicolonAfterCharacterReference,
    UnknownNamedCharacterReference,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    NonVoidSelfClosingTag,
    AbruptDoctype,
    NestedComment,
    CdataInHtmlContent,
    UnexpectedToken,
    UnexpectedDoctype,
    MisnestedTag,
    DepthCapExceeded,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub origin: ErrorOrigin,
    pub code: ParseErrorCode,
    /// Byte offset into the decoded input buffer.
    pub position: usize,
    /// Optional detail for diagnostics (debug-only usage recommended).
    pub detail: Option<&'static str>,
}

/// Error tracking policy.
#[derive(Clone, Copy, Debug)]
pub struct ErrorPolicy {
    /// Whether to store parse errors on the context.
    pub track: bool,
    /// Maximum number of stored errors; later errors are dropped.
    pub max_stored: usize,
    /// Always increment counters even if storage is disabled.
    pub track_counters: bool,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            track: true,
            max_stored: 128,
            track_counters: true,
        }
    }
}
