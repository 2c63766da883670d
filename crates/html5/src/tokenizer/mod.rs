//! HTML5 tokenizer public API.
//!
//! A pull-model tokenizer over fully materialized input: `next_token` runs
//! the state machine until a token is available and returns it. The tree
//! constructor nudges the machine between pulls (content model switches,
//! CDATA admissibility in foreign content).
//!
//! Invariants:
//! - Input is normalized before tokenization (`Input::from_str`): no CR, no
//!   NUL, no BOM. Content states therefore never re-check those.
//! - Span tokens borrow the input buffer; a text/comment/attribute payload is
//!   a span exactly when it is byte-identical to its source range, and an
//!   owned buffer otherwise (character references, recovered literals).
//! - Once `Eof` has been emitted, `next_token` returns `Eof` forever.
//! - Tokenizer hot paths are single-pass: content states scan with `memchr`
//!   and never backtrack.

use std::collections::VecDeque;

use memchr::{memchr, memchr2};

use crate::shared::{
    Attribute, DocumentParseContext, ErrorOrigin, Input, ParseErrorCode, Span, TextValue, Token,
};
use states::TokenizerState;

mod charref;
mod states;

#[cfg(test)]
mod tests;

/// Content model the tree constructor can put the tokenizer into after a
/// start tag (raw text elements, RCDATA elements, plaintext).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentModel {
    #[default]
    Data,
    Rcdata,
    RawText,
    ScriptData,
    Plaintext,
}

/// Configuration for the tokenizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenizerConfig {
    /// Initial content model (fragment parsing sets this from the context
    /// element).
    pub initial_content_model: ContentModel,
}

/// Accumulator for a text-like run (character data, comment data, attribute
/// values).
///
/// While `plain` holds, the run content is byte-identical to
/// `input[start..end]` and resolves to a span without copying. The first
/// non-source byte (a decoded character reference) converts the run to an
/// owned buffer.
#[derive(Debug, Default)]
struct RunBuf {
    buf: String,
    start: Option<usize>,
    end: usize,
    plain: bool,
}

impl RunBuf {
    fn begin_if_needed(&mut self, at: usize) {
        if self.start.is_none() {
            debug_assert!(self.buf.is_empty(), "run buffer leaked from a prior run");
            self.start = Some(at);
            self.end = at;
            self.plain = true;
        }
    }

    /// Extend a plain run over source bytes, or append to the owned buffer.
    fn push_slice(&mut self, slice: &str, new_end: usize) {
        debug_assert!(self.start.is_some(), "push into an inactive run");
        if self.plain {
            debug_assert_eq!(
                self.end,
                new_end - slice.len(),
                "plain runs must stay contiguous with the source"
            );
            self.end = new_end;
        } else {
            self.buf.push_str(slice);
            self.end = new_end;
        }
    }

    /// Mark source bytes up to `new_end` as run content (plain runs only;
    /// comments and doctype ids never decode anything).
    fn set_end(&mut self, new_end: usize) {
        debug_assert!(self.plain, "set_end is only valid for plain runs");
        self.end = new_end;
    }

    fn make_owned(&mut self, source: &str) {
        if self.plain {
            if let Some(start) = self.start {
                self.buf.push_str(&source[start..self.end]);
            }
            self.plain = false;
        }
    }

    /// Append decoded (non-source) text.
    fn push_expanded(&mut self, text: &str, source: &str, new_end: usize) {
        debug_assert!(self.start.is_some(), "push into an inactive run");
        self.make_owned(source);
        self.buf.push_str(text);
        self.end = new_end;
    }

    fn content_is_empty(&self) -> bool {
        match self.start {
            None => true,
            Some(start) => {
                if self.plain {
                    start == self.end
                } else {
                    self.buf.is_empty()
                }
            }
        }
    }

    fn take(&mut self) -> Option<(TextValue, Span)> {
        let start = self.start.take()?;
        let span = Span::new(start, self.end.max(start));
        if self.plain {
            Some((TextValue::Span(span), span))
        } else {
            Some((TextValue::Owned(std::mem::take(&mut self.buf)), span))
        }
    }
}

/// HTML5 tokenizer.
pub struct Tokenizer {
    state: TokenizerState,
    return_state: TokenizerState,
    cursor: usize,
    pending: VecDeque<Token>,
    eof_emitted: bool,
    cdata_allowed: bool,
    last_start_tag: Option<String>,

    text: RunBuf,
    comment: RunBuf,

    tag_start: usize,
    tag_name_start: usize,
    tag_name_end: usize,
    tag_is_end: bool,
    tag_self_closing: bool,
    tag_attrs: Vec<Attribute>,
    attr_name_start: usize,
    attr_name_end: usize,
    attr_has_value: bool,
    attr_value: RunBuf,

    doctype_name: Option<String>,
    doctype_name_start: usize,
    doctype_public_id: Option<String>,
    doctype_system_id: Option<String>,
    doctype_force_quirks: bool,
    id_start: usize,

    // Character-reference machinery (charref.rs).
    temp_buf: String,
    charref_start: usize,
    charref_code: u32,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        let state = match config.initial_content_model {
            ContentModel::Data => TokenizerState::Data,
            ContentModel::Rcdata => TokenizerState::Rcdata,
            ContentModel::RawText => TokenizerState::Rawtext,
            ContentModel::ScriptData => TokenizerState::ScriptData,
            ContentModel::Plaintext => TokenizerState::Plaintext,
        };
        Self {
            state,
            return_state: TokenizerState::Data,
            cursor: 0,
            pending: VecDeque::new(),
            eof_emitted: false,
            cdata_allowed: false,
            last_start_tag: None,
            text: RunBuf::default(),
            comment: RunBuf::default(),
            tag_start: 0,
            tag_name_start: 0,
            tag_name_end: 0,
            tag_is_end: false,
            tag_self_closing: false,
            tag_attrs: Vec::new(),
            attr_name_start: 0,
            attr_name_end: 0,
            attr_has_value: false,
            attr_value: RunBuf::default(),
            doctype_name: None,
            doctype_name_start: 0,
            doctype_public_id: None,
            doctype_system_id: None,
            doctype_force_quirks: false,
            id_start: 0,
            temp_buf: String::new(),
            charref_start: 0,
            charref_code: 0,
        }
    }

    /// Return the next token. After end of input this keeps returning `Eof`.
    pub fn next_token(&mut self, input: &Input, ctx: &mut DocumentParseContext) -> Token {
        loop {
            if let Some(token) = self.pending.pop_front() {
                ctx.counters.tokens_emitted = ctx.counters.tokens_emitted.saturating_add(1);
                return token;
            }
            if self.eof_emitted {
                return Token::Eof;
            }
            self.step(input, ctx);
        }
    }

    /// Content-model nudge from the tree constructor. Takes effect on the
    /// next `next_token` call.
    pub fn set_content_model(&mut self, model: ContentModel) {
        self.state = match model {
            ContentModel::Data => TokenizerState::Data,
            ContentModel::Rcdata => TokenizerState::Rcdata,
            ContentModel::RawText => TokenizerState::Rawtext,
            ContentModel::ScriptData => TokenizerState::ScriptData,
            ContentModel::Plaintext => TokenizerState::Plaintext,
        };
    }

    /// Seed the "appropriate end tag" name (fragment parsing; document
    /// parsing maintains it from emitted start tags).
    pub fn set_last_start_tag(&mut self, name: &str) {
        self.last_start_tag = Some(name.to_ascii_lowercase());
    }

    /// Whether `<![CDATA[` opens a CDATA section (adjusted current node is
    /// foreign) or a bogus comment.
    pub fn set_cdata_allowed(&mut self, allowed: bool) {
        self.cdata_allowed = allowed;
    }

    // ----- cursor helpers -----

    fn peek(&self, input: &Input) -> Option<char> {
        input.as_str()[self.cursor..].chars().next()
    }

    fn consume(&mut self, input: &Input) -> Option<char> {
        let ch = self.peek(input)?;
        self.cursor += ch.len_utf8();
        Some(ch)
    }

    fn consume_if(&mut self, input: &Input, expected: char) -> bool {
        if self.peek(input) == Some(expected) {
            self.cursor += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume while the predicate matches; returns consumed byte count.
    fn consume_while<F>(&mut self, input: &Input, mut predicate: F) -> usize
    where
        F: FnMut(char) -> bool,
    {
        let start = self.cursor;
        let text = input.as_str();
        while let Some(ch) = text[self.cursor..].chars().next() {
            if !predicate(ch) {
                break;
            }
            self.cursor += ch.len_utf8();
        }
        self.cursor - start
    }

    fn starts_with(&self, input: &Input, pattern: &[u8]) -> bool {
        input.as_str().as_bytes()[self.cursor..].starts_with(pattern)
    }

    fn starts_with_ci(&self, input: &Input, pattern: &[u8]) -> bool {
        let bytes = &input.as_str().as_bytes()[self.cursor..];
        bytes.len() >= pattern.len() && bytes[..pattern.len()].eq_ignore_ascii_case(pattern)
    }

    fn transition_to(&mut self, next: TokenizerState) {
        if self.state == next {
            return;
        }
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "html5.tokenizer",
            "state {:?} -> {:?} @{}",
            self.state,
            next,
            self.cursor
        );
        self.state = next;
    }

    fn report(&mut self, ctx: &mut DocumentParseContext, code: ParseErrorCode) {
        ctx.report(ErrorOrigin::Tokenizer, code, self.cursor);
    }

    // ----- token emission -----

    fn push_token(&mut self, token: Token) {
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "html5.tokenizer", "emit token: {token:?}");
        self.pending.push_back(token);
    }

    fn flush_text(&mut self) {
        if self.text.content_is_empty() {
            let _ = self.text.take();
            return;
        }
        if let Some((text, span)) = self.text.take() {
            self.push_token(Token::Text { text, span });
        }
    }

    fn emit_token(&mut self, token: Token) {
        if !matches!(token, Token::Text { .. }) {
            self.flush_text();
        }
        self.push_token(token);
    }

    fn emit_eof(&mut self) {
        self.flush_text();
        self.push_token(Token::Eof);
        self.eof_emitted = true;
    }

    /// Turn already-consumed source bytes starting at `from` back into
    /// character data (recovered `<`, `</`, rawtext end-tag near-misses).
    fn text_extend(&mut self, input: &Input, from: usize) {
        self.text.begin_if_needed(from);
        let slice = &input.as_str()[from..self.cursor];
        self.text.push_slice(slice, self.cursor);
    }

    fn emit_current_tag(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        let raw_name = &input.as_str()[self.tag_name_start..self.tag_name_end];
        let name = ctx.atoms.intern_ascii_folded(raw_name);
        let span = Span::new(self.tag_start, self.cursor);
        if self.tag_is_end {
            if !self.tag_attrs.is_empty() {
                self.report(ctx, ParseErrorCode::EndTagWithAttributes);
                self.tag_attrs.clear();
            }
            if self.tag_self_closing {
                self.report(ctx, ParseErrorCode::EndTagWithTrailingSolidus);
            }
            self.emit_token(Token::EndTag { name, span });
        } else {
            self.last_start_tag = Some(ctx.atoms.resolve(name).to_string());
            let attributes = std::mem::take(&mut self.tag_attrs);
            self.emit_token(Token::StartTag {
                name,
                attributes,
                self_closing: self.tag_self_closing,
                span,
            });
        }
    }

    fn begin_tag(&mut self, is_end: bool) {
        self.tag_name_start = self.cursor;
        self.tag_name_end = self.cursor;
        self.tag_is_end = is_end;
        self.tag_self_closing = false;
        self.tag_attrs.clear();
        self.attr_name_start = self.cursor;
        self.attr_name_end = self.cursor;
        self.attr_has_value = false;
        let _ = self.attr_value.take();
        self.attr_value.buf.clear();
    }

    fn start_new_attribute(&mut self) {
        self.attr_name_start = self.cursor;
        self.attr_name_end = self.cursor;
        self.attr_has_value = false;
        let _ = self.attr_value.take();
        self.attr_value.buf.clear();
    }

    fn finalize_current_attribute(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        if self.attr_name_start >= self.attr_name_end {
            let _ = self.attr_value.take();
            self.attr_value.buf.clear();
            return;
        }
        let raw_name = &input.as_str()[self.attr_name_start..self.attr_name_end];
        let name = ctx.atoms.intern_ascii_folded(raw_name);

        // Duplicate attribute policy: first occurrence wins.
        if self.tag_attrs.iter().any(|attr| attr.name == name) {
            self.report(ctx, ParseErrorCode::DuplicateAttribute);
            let _ = self.attr_value.take();
            self.attr_value.buf.clear();
            self.attr_has_value = false;
            self.attr_name_start = self.attr_name_end;
            return;
        }

        let value = if self.attr_has_value {
            Some(
                self.attr_value
                    .take()
                    .map(|(value, _)| value)
                    .unwrap_or(TextValue::Owned(String::new())),
            )
        } else {
            let _ = self.attr_value.take();
            None
        };
        self.attr_value.buf.clear();
        self.attr_has_value = false;
        self.attr_name_start = self.attr_name_end;
        self.tag_attrs.push(Attribute { name, value });
    }

    fn appropriate_end_tag(&self, input: &Input) -> bool {
        let Some(last) = self.last_start_tag.as_deref() else {
            return false;
        };
        input.as_str()[self.tag_name_start..self.cursor].eq_ignore_ascii_case(last)
    }

    // ----- doctype helpers -----

    fn begin_doctype(&mut self) {
        self.doctype_name = None;
        self.doctype_public_id = None;
        self.doctype_system_id = None;
        self.doctype_force_quirks = false;
    }

    fn finalize_doctype_name(&mut self, input: &Input) {
        let raw = &input.as_str()[self.doctype_name_start..self.cursor];
        self.doctype_name = Some(raw.to_ascii_lowercase());
    }

    fn emit_doctype(&mut self) {
        if self.doctype_name.is_none() {
            self.doctype_force_quirks = true;
        }
        let token = Token::Doctype {
            name: self.doctype_name.take(),
            public_id: self.doctype_public_id.take(),
            system_id: self.doctype_system_id.take(),
            force_quirks: self.doctype_force_quirks,
        };
        self.doctype_force_quirks = false;
        self.emit_token(token);
    }

    fn emit_comment(&mut self) {
        let Some((text, span)) = self.comment.take() else {
            return;
        };
        self.emit_token(Token::Comment { text, span });
    }

    // ----- dispatch -----

    fn step(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.state {
            TokenizerState::Data => self.step_data(input),
            TokenizerState::Rcdata => self.step_rcdata(input),
            TokenizerState::Rawtext => self.step_rawtext(input),
            TokenizerState::ScriptData => self.step_script_data(input),
            TokenizerState::Plaintext => self.step_plaintext(input),
            TokenizerState::TagOpen => self.step_tag_open(input, ctx),
            TokenizerState::EndTagOpen => self.step_end_tag_open(input, ctx),
            TokenizerState::TagName => self.step_tag_name(input, ctx),
            TokenizerState::RcdataLessThanSign => {
                self.step_raw_less_than_sign(input, TokenizerState::Rcdata)
            }
            TokenizerState::RcdataEndTagOpen => {
                self.step_raw_end_tag_open(input, TokenizerState::Rcdata)
            }
            TokenizerState::RcdataEndTagName => {
                self.step_raw_end_tag_name(input, ctx, TokenizerState::Rcdata)
            }
            TokenizerState::RawtextLessThanSign => {
                self.step_raw_less_than_sign(input, TokenizerState::Rawtext)
            }
            TokenizerState::RawtextEndTagOpen => {
                self.step_raw_end_tag_open(input, TokenizerState::Rawtext)
            }
            TokenizerState::RawtextEndTagName => {
                self.step_raw_end_tag_name(input, ctx, TokenizerState::Rawtext)
            }
            TokenizerState::ScriptDataLessThanSign => self.step_script_data_less_than_sign(input),
            TokenizerState::ScriptDataEndTagOpen => {
                self.step_raw_end_tag_open(input, TokenizerState::ScriptData)
            }
            TokenizerState::ScriptDataEndTagName => {
                self.step_raw_end_tag_name(input, ctx, TokenizerState::ScriptData)
            }
            TokenizerState::ScriptDataEscapeStart => self.step_script_data_escape_start(input),
            TokenizerState::ScriptDataEscapeStartDash => {
                self.step_script_data_escape_start_dash(input)
            }
            TokenizerState::ScriptDataEscaped => self.step_script_data_escaped(input, ctx),
            TokenizerState::ScriptDataEscapedDash => self.step_script_data_escaped_dash(input, ctx),
            TokenizerState::ScriptDataEscapedDashDash => {
                self.step_script_data_escaped_dash_dash(input, ctx)
            }
            TokenizerState::ScriptDataEscapedLessThanSign => {
                self.step_script_data_escaped_less_than_sign(input)
            }
            TokenizerState::ScriptDataEscapedEndTagOpen => {
                self.step_raw_end_tag_open(input, TokenizerState::ScriptDataEscaped)
            }
            TokenizerState::ScriptDataEscapedEndTagName => {
                self.step_raw_end_tag_name(input, ctx, TokenizerState::ScriptDataEscaped)
            }
            TokenizerState::ScriptDataDoubleEscapeStart => {
                self.step_script_data_double_escape_transition(
                    input,
                    TokenizerState::ScriptDataDoubleEscaped,
                    TokenizerState::ScriptDataEscaped,
                )
            }
            TokenizerState::ScriptDataDoubleEscaped => {
                self.step_script_data_double_escaped(input, ctx)
            }
            TokenizerState::ScriptDataDoubleEscapedDash => {
                self.step_script_data_double_escaped_dash(input, ctx)
            }
            TokenizerState::ScriptDataDoubleEscapedDashDash => {
                self.step_script_data_double_escaped_dash_dash(input, ctx)
            }
            TokenizerState::ScriptDataDoubleEscapedLessThanSign => {
                self.step_script_data_double_escaped_less_than_sign(input)
            }
            TokenizerState::ScriptDataDoubleEscapeEnd => {
                self.step_script_data_double_escape_transition(
                    input,
                    TokenizerState::ScriptDataEscaped,
                    TokenizerState::ScriptDataDoubleEscaped,
                )
            }
            TokenizerState::BeforeAttributeName => self.step_before_attribute_name(input, ctx),
            TokenizerState::AttributeName => self.step_attribute_name(input, ctx),
            TokenizerState::AfterAttributeName => self.step_after_attribute_name(input, ctx),
            TokenizerState::BeforeAttributeValue => self.step_before_attribute_value(input, ctx),
            TokenizerState::AttributeValueDoubleQuoted => {
                self.step_attribute_value_quoted(input, ctx, '"')
            }
            TokenizerState::AttributeValueSingleQuoted => {
                self.step_attribute_value_quoted(input, ctx, '\'')
            }
            TokenizerState::AttributeValueUnquoted => {
                self.step_attribute_value_unquoted(input, ctx)
            }
            TokenizerState::AfterAttributeValueQuoted => {
                self.step_after_attribute_value_quoted(input, ctx)
            }
            TokenizerState::SelfClosingStartTag => self.step_self_closing_start_tag(input, ctx),
            TokenizerState::BogusComment => self.step_bogus_comment(input),
            TokenizerState::MarkupDeclarationOpen => self.step_markup_declaration_open(input, ctx),
            TokenizerState::CommentStart => self.step_comment_start(input, ctx),
            TokenizerState::CommentStartDash => self.step_comment_start_dash(input, ctx),
            TokenizerState::Comment => self.step_comment(input, ctx),
            TokenizerState::CommentLessThanSign => self.step_comment_less_than_sign(input),
            TokenizerState::CommentLessThanSignBang => self.step_comment_less_than_sign_bang(input),
            TokenizerState::CommentLessThanSignBangDash => {
                self.step_comment_less_than_sign_bang_dash(input)
            }
            TokenizerState::CommentLessThanSignBangDashDash => {
                self.step_comment_less_than_sign_bang_dash_dash(input, ctx)
            }
            TokenizerState::CommentEndDash => self.step_comment_end_dash(input, ctx),
            TokenizerState::CommentEnd => self.step_comment_end(input, ctx),
            TokenizerState::CommentEndBang => self.step_comment_end_bang(input, ctx),
            TokenizerState::Doctype => self.step_doctype(input, ctx),
            TokenizerState::BeforeDoctypeName => self.step_before_doctype_name(input, ctx),
            TokenizerState::DoctypeName => self.step_doctype_name(input, ctx),
            TokenizerState::AfterDoctypeName => self.step_after_doctype_name(input, ctx),
            TokenizerState::AfterDoctypePublicKeyword => {
                self.step_after_doctype_id_keyword(input, ctx, IdKind::Public)
            }
            TokenizerState::BeforeDoctypePublicIdentifier => {
                self.step_before_doctype_id(input, ctx, IdKind::Public)
            }
            TokenizerState::DoctypePublicIdentifierDoubleQuoted => {
                self.step_doctype_id_quoted(input, ctx, IdKind::Public, '"')
            }
            TokenizerState::DoctypePublicIdentifierSingleQuoted => {
                self.step_doctype_id_quoted(input, ctx, IdKind::Public, '\'')
            }
            TokenizerState::AfterDoctypePublicIdentifier => {
                self.step_after_doctype_public_identifier(input, ctx)
            }
            TokenizerState::BetweenDoctypePublicAndSystemIdentifiers => {
                self.step_between_doctype_public_and_system(input, ctx)
            }
            TokenizerState::AfterDoctypeSystemKeyword => {
                self.step_after_doctype_id_keyword(input, ctx, IdKind::System)
            }
            TokenizerState::BeforeDoctypeSystemIdentifier => {
                self.step_before_doctype_id(input, ctx, IdKind::System)
            }
            TokenizerState::DoctypeSystemIdentifierDoubleQuoted => {
                self.step_doctype_id_quoted(input, ctx, IdKind::System, '"')
            }
            TokenizerState::DoctypeSystemIdentifierSingleQuoted => {
                self.step_doctype_id_quoted(input, ctx, IdKind::System, '\'')
            }
            TokenizerState::AfterDoctypeSystemIdentifier => {
                self.step_after_doctype_system_identifier(input, ctx)
            }
            TokenizerState::BogusDoctype => self.step_bogus_doctype(input),
            TokenizerState::CdataSection => self.step_cdata_section(input, ctx),
            TokenizerState::CdataSectionBracket => self.step_cdata_section_bracket(input),
            TokenizerState::CdataSectionEnd => self.step_cdata_section_end(input),
            TokenizerState::CharacterReference => self.step_character_reference(input),
            TokenizerState::NamedCharacterReference => {
                self.step_named_character_reference(input, ctx)
            }
            TokenizerState::AmbiguousAmpersand => self.step_ambiguous_ampersand(input, ctx),
            TokenizerState::NumericCharacterReference => {
                self.step_numeric_character_reference(input)
            }
            TokenizerState::HexadecimalCharacterReferenceStart => {
                self.step_numeric_reference_start(input, ctx, true)
            }
            TokenizerState::DecimalCharacterReferenceStart => {
                self.step_numeric_reference_start(input, ctx, false)
            }
            TokenizerState::HexadecimalCharacterReference => {
                self.step_numeric_reference_digits(input, ctx, true)
            }
            TokenizerState::DecimalCharacterReference => {
                self.step_numeric_reference_digits(input, ctx, false)
            }
            TokenizerState::NumericCharacterReferenceEnd => {
                self.step_numeric_character_reference_end(input, ctx)
            }
        }
    }

    // ----- content states -----

    fn step_data(&mut self, input: &Input) {
        match self.peek(input) {
            None => self.emit_eof(),
            Some('&') => {
                self.text.begin_if_needed(self.cursor);
                self.charref_start = self.cursor;
                self.return_state = TokenizerState::Data;
                let _ = self.consume_if(input, '&');
                self.transition_to(TokenizerState::CharacterReference);
            }
            Some('<') => {
                self.tag_start = self.cursor;
                let _ = self.consume_if(input, '<');
                self.transition_to(TokenizerState::TagOpen);
            }
            Some(_) => self.scan_content(input, &[b'<', b'&']),
        }
    }

    fn step_rcdata(&mut self, input: &Input) {
        match self.peek(input) {
            None => self.emit_eof(),
            Some('&') => {
                self.text.begin_if_needed(self.cursor);
                self.charref_start = self.cursor;
                self.return_state = TokenizerState::Rcdata;
                let _ = self.consume_if(input, '&');
                self.transition_to(TokenizerState::CharacterReference);
            }
            Some('<') => {
                self.tag_start = self.cursor;
                let _ = self.consume_if(input, '<');
                self.transition_to(TokenizerState::RcdataLessThanSign);
            }
            Some(_) => self.scan_content(input, &[b'<', b'&']),
        }
    }

    fn step_rawtext(&mut self, input: &Input) {
        match self.peek(input) {
            None => self.emit_eof(),
            Some('<') => {
                self.tag_start = self.cursor;
                let _ = self.consume_if(input, '<');
                self.transition_to(TokenizerState::RawtextLessThanSign);
            }
            Some(_) => self.scan_content(input, &[b'<']),
        }
    }

    fn step_script_data(&mut self, input: &Input) {
        match self.peek(input) {
            None => self.emit_eof(),
            Some('<') => {
                self.tag_start = self.cursor;
                let _ = self.consume_if(input, '<');
                self.transition_to(TokenizerState::ScriptDataLessThanSign);
            }
            Some(_) => self.scan_content(input, &[b'<']),
        }
    }

    fn step_plaintext(&mut self, input: &Input) {
        if self.peek(input).is_none() {
            self.emit_eof();
            return;
        }
        let len = input.len();
        self.text.begin_if_needed(self.cursor);
        let slice = &input.as_str()[self.cursor..];
        self.cursor = len;
        self.text.push_slice(slice, len);
    }

    /// Bulk-scan character data up to the next delimiter (single pass).
    fn scan_content(&mut self, input: &Input, delims: &[u8]) {
        let bytes = input.as_str().as_bytes();
        let haystack = &bytes[self.cursor..];
        let rel = match delims {
            [a] => memchr(*a, haystack),
            [a, b] => memchr2(*a, *b, haystack),
            _ => unreachable!("content scans use one or two delimiters"),
        };
        let stop = rel.map_or(bytes.len(), |r| self.cursor + r);
        debug_assert!(stop > self.cursor, "content scan must make progress");
        self.text.begin_if_needed(self.cursor);
        let slice = &input.as_str()[self.cursor..stop];
        self.cursor = stop;
        self.text.push_slice(slice, stop);
    }

    // ----- tag states -----

    fn step_tag_open(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.text_extend(input, self.tag_start);
                self.emit_eof();
            }
            Some('!') => {
                let _ = self.consume_if(input, '!');
                self.transition_to(TokenizerState::MarkupDeclarationOpen);
            }
            Some('/') => {
                let _ = self.consume_if(input, '/');
                self.transition_to(TokenizerState::EndTagOpen);
            }
            Some(ch) if ch.is_ascii_alphabetic() => {
                self.begin_tag(false);
                self.transition_to(TokenizerState::TagName);
            }
            Some('?') => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.comment.begin_if_needed(self.cursor);
                self.transition_to(TokenizerState::BogusComment);
            }
            Some(_) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.text_extend(input, self.tag_start);
                self.transition_to(TokenizerState::Data);
            }
        }
    }

    fn step_end_tag_open(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.text_extend(input, self.tag_start);
                self.emit_eof();
            }
            Some(ch) if ch.is_ascii_alphabetic() => {
                self.begin_tag(true);
                self.transition_to(TokenizerState::TagName);
            }
            Some('>') => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                let _ = self.consume_if(input, '>');
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.comment.begin_if_needed(self.cursor);
                self.transition_to(TokenizerState::BogusComment);
            }
        }
    }

    fn step_tag_name(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                self.tag_name_end = self.cursor;
                let _ = self.consume(input);
                self.transition_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => {
                self.tag_name_end = self.cursor;
                let _ = self.consume_if(input, '/');
                self.transition_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') => {
                self.tag_name_end = self.cursor;
                let _ = self.consume_if(input, '>');
                self.emit_current_tag(input, ctx);
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                let consumed =
                    self.consume_while(input, |ch| !is_html_space(ch) && ch != '/' && ch != '>');
                debug_assert!(consumed > 0, "tag name state must make progress");
                self.tag_name_end = self.cursor;
            }
        }
    }

    // ----- RCDATA/RAWTEXT/script end-tag machinery -----

    fn step_raw_less_than_sign(&mut self, input: &Input, base: TokenizerState) {
        if self.consume_if(input, '/') {
            self.transition_to(end_tag_open_state(base));
        } else {
            // The `<` stays character data.
            self.text_extend(input, self.tag_start);
            self.transition_to(base);
        }
    }

    fn step_raw_end_tag_open(&mut self, input: &Input, base: TokenizerState) {
        match self.peek(input) {
            Some(ch) if ch.is_ascii_alphabetic() => {
                self.begin_tag(true);
                self.transition_to(end_tag_name_state(base));
            }
            _ => {
                self.text_extend(input, self.tag_start);
                self.transition_to(base);
            }
        }
    }

    fn step_raw_end_tag_name(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
        base: TokenizerState,
    ) {
        let _ = self.consume_while(input, |ch| ch.is_ascii_alphabetic());
        match self.peek(input) {
            Some(ch) if is_html_space(ch) && self.appropriate_end_tag(input) => {
                self.tag_name_end = self.cursor;
                let _ = self.consume(input);
                self.transition_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') if self.appropriate_end_tag(input) => {
                self.tag_name_end = self.cursor;
                let _ = self.consume_if(input, '/');
                self.transition_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') if self.appropriate_end_tag(input) => {
                self.tag_name_end = self.cursor;
                let _ = self.consume_if(input, '>');
                self.emit_current_tag(input, ctx);
                self.transition_to(TokenizerState::Data);
            }
            _ => {
                // Near-miss: everything consumed since `<` is character data.
                self.text_extend(input, self.tag_start);
                self.transition_to(base);
            }
        }
    }

    fn step_script_data_less_than_sign(&mut self, input: &Input) {
        match self.peek(input) {
            Some('/') => {
                let _ = self.consume_if(input, '/');
                self.transition_to(TokenizerState::ScriptDataEndTagOpen);
            }
            Some('!') => {
                let _ = self.consume_if(input, '!');
                self.text_extend(input, self.tag_start);
                self.transition_to(TokenizerState::ScriptDataEscapeStart);
            }
            _ => {
                self.text_extend(input, self.tag_start);
                self.transition_to(TokenizerState::ScriptData);
            }
        }
    }

    fn step_script_data_escape_start(&mut self, input: &Input) {
        if self.peek(input) == Some('-') {
            let from = self.cursor;
            let _ = self.consume_if(input, '-');
            self.text_extend(input, from);
            self.transition_to(TokenizerState::ScriptDataEscapeStartDash);
        } else {
            self.transition_to(TokenizerState::ScriptData);
        }
    }

    fn step_script_data_escape_start_dash(&mut self, input: &Input) {
        if self.peek(input) == Some('-') {
            let from = self.cursor;
            let _ = self.consume_if(input, '-');
            self.text_extend(input, from);
            self.transition_to(TokenizerState::ScriptDataEscapedDashDash);
        } else {
            self.transition_to(TokenizerState::ScriptData);
        }
    }

    fn step_script_data_escaped(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some('-') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '-');
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataEscapedDash);
            }
            Some('<') => {
                self.tag_start = self.cursor;
                let _ = self.consume_if(input, '<');
                self.transition_to(TokenizerState::ScriptDataEscapedLessThanSign);
            }
            Some(_) => self.scan_content(input, &[b'<', b'-']),
        }
    }

    fn step_script_data_escaped_dash(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some('-') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '-');
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataEscapedDashDash);
            }
            Some('<') => {
                self.tag_start = self.cursor;
                let _ = self.consume_if(input, '<');
                self.transition_to(TokenizerState::ScriptDataEscapedLessThanSign);
            }
            Some(_) => {
                let from = self.cursor;
                let _ = self.consume(input);
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataEscaped);
            }
        }
    }

    fn step_script_data_escaped_dash_dash(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some('-') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '-');
                self.text_extend(input, from);
            }
            Some('<') => {
                self.tag_start = self.cursor;
                let _ = self.consume_if(input, '<');
                self.transition_to(TokenizerState::ScriptDataEscapedLessThanSign);
            }
            Some('>') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '>');
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptData);
            }
            Some(_) => {
                let from = self.cursor;
                let _ = self.consume(input);
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataEscaped);
            }
        }
    }

    fn step_script_data_escaped_less_than_sign(&mut self, input: &Input) {
        match self.peek(input) {
            Some('/') => {
                let _ = self.consume_if(input, '/');
                self.temp_buf.clear();
                self.transition_to(TokenizerState::ScriptDataEscapedEndTagOpen);
            }
            Some(ch) if ch.is_ascii_alphabetic() => {
                self.temp_buf.clear();
                self.text_extend(input, self.tag_start);
                self.transition_to(TokenizerState::ScriptDataDoubleEscapeStart);
            }
            _ => {
                self.text_extend(input, self.tag_start);
                self.transition_to(TokenizerState::ScriptDataEscaped);
            }
        }
    }

    /// Shared by ScriptDataDoubleEscapeStart and ScriptDataDoubleEscapeEnd:
    /// buffered name chars are simultaneously character data.
    fn step_script_data_double_escape_transition(
        &mut self,
        input: &Input,
        on_script: TokenizerState,
        otherwise: TokenizerState,
    ) {
        match self.peek(input) {
            Some(ch) if ch.is_ascii_alphabetic() => {
                let from = self.cursor;
                let _ = self.consume(input);
                self.text_extend(input, from);
                self.temp_buf.push(ch.to_ascii_lowercase());
            }
            Some(ch) if is_html_space(ch) || ch == '/' || ch == '>' => {
                let from = self.cursor;
                let _ = self.consume(input);
                self.text_extend(input, from);
                let next = if self.temp_buf == "script" {
                    on_script
                } else {
                    otherwise
                };
                self.transition_to(next);
            }
            _ => self.transition_to(otherwise),
        }
    }

    fn step_script_data_double_escaped(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some('-') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '-');
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataDoubleEscapedDash);
            }
            Some('<') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '<');
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
            }
            Some(_) => self.scan_content(input, &[b'<', b'-']),
        }
    }

    fn step_script_data_double_escaped_dash(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some('-') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '-');
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataDoubleEscapedDashDash);
            }
            Some('<') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '<');
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
            }
            Some(_) => {
                let from = self.cursor;
                let _ = self.consume(input);
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataDoubleEscaped);
            }
        }
    }

    fn step_script_data_double_escaped_dash_dash(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some('-') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '-');
                self.text_extend(input, from);
            }
            Some('<') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '<');
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
            }
            Some('>') => {
                let from = self.cursor;
                let _ = self.consume_if(input, '>');
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptData);
            }
            Some(_) => {
                let from = self.cursor;
                let _ = self.consume(input);
                self.text_extend(input, from);
                self.transition_to(TokenizerState::ScriptDataDoubleEscaped);
            }
        }
    }

    fn step_script_data_double_escaped_less_than_sign(&mut self, input: &Input) {
        if self.peek(input) == Some('/') {
            let from = self.cursor;
            let _ = self.consume_if(input, '/');
            self.text_extend(input, from);
            self.temp_buf.clear();
            self.transition_to(TokenizerState::ScriptDataDoubleEscapeEnd);
        } else {
            self.transition_to(TokenizerState::ScriptDataDoubleEscaped);
        }
    }

    // ----- attribute states -----

    fn step_before_attribute_name(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None | Some('/') | Some('>') => {
                self.transition_to(TokenizerState::AfterAttributeName);
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume_while(input, is_html_space);
            }
            Some('=') => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.start_new_attribute();
                let _ = self.consume_if(input, '=');
                self.transition_to(TokenizerState::AttributeName);
            }
            Some(_) => {
                self.start_new_attribute();
                self.transition_to(TokenizerState::AttributeName);
            }
        }
    }

    fn step_attribute_name(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        loop {
            match self.peek(input) {
                None | Some('/') | Some('>') => {
                    self.attr_name_end = self.cursor;
                    self.transition_to(TokenizerState::AfterAttributeName);
                    return;
                }
                Some(ch) if is_html_space(ch) => {
                    self.attr_name_end = self.cursor;
                    self.transition_to(TokenizerState::AfterAttributeName);
                    return;
                }
                Some('=') => {
                    self.attr_name_end = self.cursor;
                    let _ = self.consume_if(input, '=');
                    self.attr_has_value = true;
                    self.transition_to(TokenizerState::BeforeAttributeValue);
                    return;
                }
                Some(ch) => {
                    if matches!(ch, '"' | '\'' | '<') {
                        self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                    }
                    let _ = self.consume(input);
                }
            }
        }
    }

    fn step_after_attribute_name(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume_while(input, is_html_space);
            }
            Some('/') => {
                self.finalize_current_attribute(input, ctx);
                let _ = self.consume_if(input, '/');
                self.transition_to(TokenizerState::SelfClosingStartTag);
            }
            Some('=') => {
                let _ = self.consume_if(input, '=');
                self.attr_has_value = true;
                self.transition_to(TokenizerState::BeforeAttributeValue);
            }
            Some('>') => {
                self.finalize_current_attribute(input, ctx);
                let _ = self.consume_if(input, '>');
                self.emit_current_tag(input, ctx);
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                self.finalize_current_attribute(input, ctx);
                self.start_new_attribute();
                self.transition_to(TokenizerState::AttributeName);
            }
        }
    }

    fn step_before_attribute_value(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume_while(input, is_html_space);
            }
            Some('"') => {
                let _ = self.consume_if(input, '"');
                self.attr_value.begin_if_needed(self.cursor);
                self.transition_to(TokenizerState::AttributeValueDoubleQuoted);
            }
            Some('\'') => {
                let _ = self.consume_if(input, '\'');
                self.attr_value.begin_if_needed(self.cursor);
                self.transition_to(TokenizerState::AttributeValueSingleQuoted);
            }
            Some('>') => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.finalize_current_attribute(input, ctx);
                let _ = self.consume_if(input, '>');
                self.emit_current_tag(input, ctx);
                self.transition_to(TokenizerState::Data);
            }
            _ => {
                self.attr_value.begin_if_needed(self.cursor);
                self.transition_to(TokenizerState::AttributeValueUnquoted);
            }
        }
    }

    fn step_attribute_value_quoted(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
        quote: char,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some(ch) if ch == quote => {
                let _ = self.consume(input);
                self.transition_to(TokenizerState::AfterAttributeValueQuoted);
            }
            Some('&') => {
                self.charref_start = self.cursor;
                self.return_state = self.state;
                let _ = self.consume_if(input, '&');
                self.transition_to(TokenizerState::CharacterReference);
            }
            Some(_) => {
                let from = self.cursor;
                let _ = self.consume_while(input, |ch| ch != quote && ch != '&');
                let slice = &input.as_str()[from..self.cursor];
                self.attr_value.push_slice(slice, self.cursor);
            }
        }
    }

    fn step_attribute_value_unquoted(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                self.finalize_current_attribute(input, ctx);
                let _ = self.consume(input);
                self.transition_to(TokenizerState::BeforeAttributeName);
            }
            Some('&') => {
                self.charref_start = self.cursor;
                self.return_state = self.state;
                let _ = self.consume_if(input, '&');
                self.transition_to(TokenizerState::CharacterReference);
            }
            Some('>') => {
                self.finalize_current_attribute(input, ctx);
                let _ = self.consume_if(input, '>');
                self.emit_current_tag(input, ctx);
                self.transition_to(TokenizerState::Data);
            }
            Some(ch) if matches!(ch, '"' | '\'' | '<' | '=' | '`') => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                let from = self.cursor;
                let _ = self.consume(input);
                let slice = &input.as_str()[from..self.cursor];
                self.attr_value.push_slice(slice, self.cursor);
            }
            Some(_) => {
                let from = self.cursor;
                let _ = self.consume_while(input, |ch| {
                    !is_html_space(ch) && !matches!(ch, '&' | '>' | '"' | '\'' | '<' | '=' | '`')
                });
                let slice = &input.as_str()[from..self.cursor];
                self.attr_value.push_slice(slice, self.cursor);
            }
        }
    }

    fn step_after_attribute_value_quoted(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                self.finalize_current_attribute(input, ctx);
                let _ = self.consume(input);
                self.transition_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => {
                self.finalize_current_attribute(input, ctx);
                let _ = self.consume_if(input, '/');
                self.transition_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') => {
                self.finalize_current_attribute(input, ctx);
                let _ = self.consume_if(input, '>');
                self.emit_current_tag(input, ctx);
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.finalize_current_attribute(input, ctx);
                self.transition_to(TokenizerState::BeforeAttributeName);
            }
        }
    }

    fn step_self_closing_start_tag(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some('>') => {
                self.tag_self_closing = true;
                let _ = self.consume_if(input, '>');
                self.emit_current_tag(input, ctx);
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.transition_to(TokenizerState::BeforeAttributeName);
            }
        }
    }

    // ----- comment states -----

    fn step_bogus_comment(&mut self, input: &Input) {
        match self.peek(input) {
            None => {
                self.emit_comment();
                self.emit_eof();
            }
            Some('>') => {
                let _ = self.consume_if(input, '>');
                self.emit_comment();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                let _ = self.consume_while(input, |ch| ch != '>');
                self.comment.set_end(self.cursor);
            }
        }
    }

    fn step_markup_declaration_open(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        if self.starts_with(input, b"--") {
            self.cursor += 2;
            self.comment.begin_if_needed(self.cursor);
            self.transition_to(TokenizerState::CommentStart);
            return;
        }
        if self.starts_with_ci(input, b"DOCTYPE") {
            self.cursor += 7;
            self.begin_doctype();
            self.transition_to(TokenizerState::Doctype);
            return;
        }
        if self.starts_with(input, b"[CDATA[") {
            self.cursor += 7;
            if self.cdata_allowed {
                self.transition_to(TokenizerState::CdataSection);
            } else {
                self.report(ctx, ParseErrorCode::CdataInHtmlContent);
                self.comment.begin_if_needed(self.cursor - 7);
                self.comment.set_end(self.cursor);
                self.transition_to(TokenizerState::BogusComment);
            }
            return;
        }
        self.report(ctx, ParseErrorCode::UnexpectedCharacter);
        self.comment.begin_if_needed(self.cursor);
        self.transition_to(TokenizerState::BogusComment);
    }

    fn step_comment_start(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            Some('-') => {
                let _ = self.consume_if(input, '-');
                self.transition_to(TokenizerState::CommentStartDash);
            }
            Some('>') => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                let _ = self.consume_if(input, '>');
                self.emit_comment();
                self.transition_to(TokenizerState::Data);
            }
            _ => self.transition_to(TokenizerState::Comment),
        }
    }

    fn step_comment_start_dash(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_comment();
                self.emit_eof();
            }
            Some('-') => {
                let _ = self.consume_if(input, '-');
                self.transition_to(TokenizerState::CommentEnd);
            }
            Some('>') => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                let _ = self.consume_if(input, '>');
                self.emit_comment();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                // The consumed dash is comment data.
                self.comment.set_end(self.comment.end + 1);
                self.transition_to(TokenizerState::Comment);
            }
        }
    }

    fn step_comment(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_comment();
                self.emit_eof();
            }
            Some('<') => {
                let _ = self.consume_if(input, '<');
                self.comment.set_end(self.cursor);
                self.transition_to(TokenizerState::CommentLessThanSign);
            }
            Some('-') => {
                let _ = self.consume_if(input, '-');
                self.transition_to(TokenizerState::CommentEndDash);
            }
            Some(_) => {
                let _ = self.consume_while(input, |ch| ch != '-' && ch != '<');
                self.comment.set_end(self.cursor);
            }
        }
    }

    fn step_comment_less_than_sign(&mut self, input: &Input) {
        match self.peek(input) {
            Some('!') => {
                let _ = self.consume_if(input, '!');
                self.comment.set_end(self.cursor);
                self.transition_to(TokenizerState::CommentLessThanSignBang);
            }
            Some('<') => {
                let _ = self.consume_if(input, '<');
                self.comment.set_end(self.cursor);
            }
            _ => self.transition_to(TokenizerState::Comment),
        }
    }

    fn step_comment_less_than_sign_bang(&mut self, input: &Input) {
        if self.consume_if(input, '-') {
            self.transition_to(TokenizerState::CommentLessThanSignBangDash);
        } else {
            self.transition_to(TokenizerState::Comment);
        }
    }

    fn step_comment_less_than_sign_bang_dash(&mut self, input: &Input) {
        if self.consume_if(input, '-') {
            self.transition_to(TokenizerState::CommentLessThanSignBangDashDash);
        } else {
            self.transition_to(TokenizerState::CommentEndDash);
        }
    }

    fn step_comment_less_than_sign_bang_dash_dash(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        match self.peek(input) {
            None | Some('>') => self.transition_to(TokenizerState::CommentEnd),
            Some(_) => {
                self.report(ctx, ParseErrorCode::NestedComment);
                self.transition_to(TokenizerState::CommentEnd);
            }
        }
    }

    fn step_comment_end_dash(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_comment();
                self.emit_eof();
            }
            Some('-') => {
                let _ = self.consume_if(input, '-');
                self.transition_to(TokenizerState::CommentEnd);
            }
            Some(_) => {
                // The pending dash is comment data after all.
                self.comment.set_end(self.comment.end + 1);
                self.transition_to(TokenizerState::Comment);
            }
        }
    }

    fn step_comment_end(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_comment();
                self.emit_eof();
            }
            Some('>') => {
                let _ = self.consume_if(input, '>');
                self.emit_comment();
                self.transition_to(TokenizerState::Data);
            }
            Some('!') => {
                let _ = self.consume_if(input, '!');
                self.transition_to(TokenizerState::CommentEndBang);
            }
            Some('-') => {
                // One dash joins the data; two stay pending.
                let _ = self.consume_if(input, '-');
                self.comment.set_end(self.comment.end + 1);
            }
            Some(_) => {
                // Both pending dashes are data.
                self.comment.set_end(self.comment.end + 2);
                self.transition_to(TokenizerState::Comment);
            }
        }
    }

    fn step_comment_end_bang(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_comment();
                self.emit_eof();
            }
            Some('-') => {
                self.comment.set_end(self.comment.end + 3);
                let _ = self.consume_if(input, '-');
                self.transition_to(TokenizerState::CommentEndDash);
            }
            Some('>') => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                let _ = self.consume_if(input, '>');
                self.emit_comment();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                self.comment.set_end(self.comment.end + 3);
                self.transition_to(TokenizerState::Comment);
            }
        }
    }

    // ----- doctype states -----

    fn step_doctype(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume(input);
                self.transition_to(TokenizerState::BeforeDoctypeName);
            }
            Some('>') => self.transition_to(TokenizerState::BeforeDoctypeName),
            Some(_) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.transition_to(TokenizerState::BeforeDoctypeName);
            }
        }
    }

    fn step_before_doctype_name(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume_while(input, is_html_space);
            }
            Some('>') => {
                self.report(ctx, ParseErrorCode::AbruptDoctype);
                self.doctype_force_quirks = true;
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                self.doctype_name_start = self.cursor;
                self.transition_to(TokenizerState::DoctypeName);
            }
        }
    }

    fn step_doctype_name(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.finalize_doctype_name(input);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                self.finalize_doctype_name(input);
                let _ = self.consume(input);
                self.transition_to(TokenizerState::AfterDoctypeName);
            }
            Some('>') => {
                self.finalize_doctype_name(input);
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                let _ = self.consume_while(input, |ch| !is_html_space(ch) && ch != '>');
            }
        }
    }

    fn step_after_doctype_name(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume_while(input, is_html_space);
            }
            Some('>') => {
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                if self.starts_with_ci(input, b"PUBLIC") {
                    self.cursor += 6;
                    self.transition_to(TokenizerState::AfterDoctypePublicKeyword);
                } else if self.starts_with_ci(input, b"SYSTEM") {
                    self.cursor += 6;
                    self.transition_to(TokenizerState::AfterDoctypeSystemKeyword);
                } else {
                    self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                    self.doctype_force_quirks = true;
                    self.transition_to(TokenizerState::BogusDoctype);
                }
            }
        }
    }

    fn step_after_doctype_id_keyword(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
        kind: IdKind,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume(input);
                self.transition_to(match kind {
                    IdKind::Public => TokenizerState::BeforeDoctypePublicIdentifier,
                    IdKind::System => TokenizerState::BeforeDoctypeSystemIdentifier,
                });
            }
            Some(quote @ ('"' | '\'')) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                let _ = self.consume(input);
                self.id_start = self.cursor;
                self.transition_to(doctype_id_state(kind, quote));
            }
            Some('>') => {
                self.report(ctx, ParseErrorCode::AbruptDoctype);
                self.doctype_force_quirks = true;
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.doctype_force_quirks = true;
                self.transition_to(TokenizerState::BogusDoctype);
            }
        }
    }

    fn step_before_doctype_id(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
        kind: IdKind,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume_while(input, is_html_space);
            }
            Some(quote @ ('"' | '\'')) => {
                let _ = self.consume(input);
                self.id_start = self.cursor;
                self.transition_to(doctype_id_state(kind, quote));
            }
            Some('>') => {
                self.report(ctx, ParseErrorCode::AbruptDoctype);
                self.doctype_force_quirks = true;
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.doctype_force_quirks = true;
                self.transition_to(TokenizerState::BogusDoctype);
            }
        }
    }

    fn step_doctype_id_quoted(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
        kind: IdKind,
        quote: char,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.finalize_doctype_id(input, kind);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if ch == quote => {
                self.finalize_doctype_id(input, kind);
                let _ = self.consume(input);
                self.transition_to(match kind {
                    IdKind::Public => TokenizerState::AfterDoctypePublicIdentifier,
                    IdKind::System => TokenizerState::AfterDoctypeSystemIdentifier,
                });
            }
            Some('>') => {
                self.report(ctx, ParseErrorCode::AbruptDoctype);
                self.finalize_doctype_id(input, kind);
                self.doctype_force_quirks = true;
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                let _ = self.consume_while(input, |ch| ch != quote && ch != '>');
            }
        }
    }

    fn finalize_doctype_id(&mut self, input: &Input, kind: IdKind) {
        let value = input.as_str()[self.id_start..self.cursor].to_string();
        match kind {
            IdKind::Public => self.doctype_public_id = Some(value),
            IdKind::System => self.doctype_system_id = Some(value),
        }
    }

    fn step_after_doctype_public_identifier(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume(input);
                self.transition_to(TokenizerState::BetweenDoctypePublicAndSystemIdentifiers);
            }
            Some('>') => {
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(quote @ ('"' | '\'')) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                let _ = self.consume(input);
                self.id_start = self.cursor;
                self.transition_to(doctype_id_state(IdKind::System, quote));
            }
            Some(_) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.doctype_force_quirks = true;
                self.transition_to(TokenizerState::BogusDoctype);
            }
        }
    }

    fn step_between_doctype_public_and_system(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume_while(input, is_html_space);
            }
            Some('>') => {
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(quote @ ('"' | '\'')) => {
                let _ = self.consume(input);
                self.id_start = self.cursor;
                self.transition_to(doctype_id_state(IdKind::System, quote));
            }
            Some(_) => {
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.doctype_force_quirks = true;
                self.transition_to(TokenizerState::BogusDoctype);
            }
        }
    }

    fn step_after_doctype_system_identifier(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.doctype_force_quirks = true;
                self.emit_doctype();
                self.emit_eof();
            }
            Some(ch) if is_html_space(ch) => {
                let _ = self.consume_while(input, is_html_space);
            }
            Some('>') => {
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                // Parse error, but force-quirks is NOT set here.
                self.report(ctx, ParseErrorCode::UnexpectedCharacter);
                self.transition_to(TokenizerState::BogusDoctype);
            }
        }
    }

    fn step_bogus_doctype(&mut self, input: &Input) {
        match self.peek(input) {
            None => {
                self.emit_doctype();
                self.emit_eof();
            }
            Some('>') => {
                let _ = self.consume_if(input, '>');
                self.emit_doctype();
                self.transition_to(TokenizerState::Data);
            }
            Some(_) => {
                let _ = self.consume_while(input, |ch| ch != '>');
            }
        }
    }

    // ----- CDATA states -----

    fn step_cdata_section(&mut self, input: &Input, ctx: &mut DocumentParseContext) {
        match self.peek(input) {
            None => {
                self.report(ctx, ParseErrorCode::UnexpectedEof);
                self.emit_eof();
            }
            Some(']') => {
                let _ = self.consume_if(input, ']');
                self.transition_to(TokenizerState::CdataSectionBracket);
            }
            Some(_) => self.scan_content(input, &[b']']),
        }
    }

    fn step_cdata_section_bracket(&mut self, input: &Input) {
        if self.consume_if(input, ']') {
            self.transition_to(TokenizerState::CdataSectionEnd);
        } else {
            // The consumed bracket is character data.
            self.text.begin_if_needed(self.cursor - 1);
            let slice = &input.as_str()[self.cursor - 1..self.cursor];
            self.text.push_slice(slice, self.cursor);
            self.transition_to(TokenizerState::CdataSection);
        }
    }

    fn step_cdata_section_end(&mut self, input: &Input) {
        match self.peek(input) {
            Some(']') => {
                // One bracket becomes data, one stays pending.
                let data_at = self.cursor - 2;
                self.text.begin_if_needed(data_at);
                let slice = &input.as_str()[data_at..data_at + 1];
                self.text.push_slice(slice, data_at + 1);
                let _ = self.consume_if(input, ']');
            }
            Some('>') => {
                let _ = self.consume_if(input, '>');
                self.transition_to(TokenizerState::Data);
            }
            _ => {
                // Both pending brackets are data.
                let data_at = self.cursor - 2;
                self.text.begin_if_needed(data_at);
                let slice = &input.as_str()[data_at..self.cursor];
                self.text.push_slice(slice, self.cursor);
                self.transition_to(TokenizerState::CdataSection);
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IdKind {
    Public,
    System,
}

fn doctype_id_state(kind: IdKind, quote: char) -> TokenizerState {
    match (kind, quote) {
        (IdKind::Public, '"') => TokenizerState::DoctypePublicIdentifierDoubleQuoted,
        (IdKind::Public, _) => TokenizerState::DoctypePublicIdentifierSingleQuoted,
        (IdKind::System, '"') => TokenizerState::DoctypeSystemIdentifierDoubleQuoted,
        (IdKind::System, _) => TokenizerState::DoctypeSystemIdentifierSingleQuoted,
    }
}

fn end_tag_open_state(base: TokenizerState) -> TokenizerState {
    match base {
        TokenizerState::Rcdata => TokenizerState::RcdataEndTagOpen,
        TokenizerState::Rawtext => TokenizerState::RawtextEndTagOpen,
        TokenizerState::ScriptData => TokenizerState::ScriptDataEndTagOpen,
        TokenizerState::ScriptDataEscaped => TokenizerState::ScriptDataEscapedEndTagOpen,
        _ => unreachable!("not a raw content state"),
    }
}

fn end_tag_name_state(base: TokenizerState) -> TokenizerState {
    match base {
        TokenizerState::Rcdata => TokenizerState::RcdataEndTagName,
        TokenizerState::Rawtext => TokenizerState::RawtextEndTagName,
        TokenizerState::ScriptData => TokenizerState::ScriptDataEndTagName,
        TokenizerState::ScriptDataEscaped => TokenizerState::ScriptDataEscapedEndTagName,
        _ => unreachable!("not a raw content state"),
    }
}

pub(crate) fn is_html_space(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\u{0C}' | ' ')
}
