//! Character-reference sub-machine.
//!
//! Entered from Data, RCDATA and the attribute-value states on `&`. The
//! consumed reference either decodes (named longest match, numeric with the
//! replacement rules) or flushes back literally. Flush targets the attribute
//! value or the character-data run depending on the return state.

use crate::entities::{longest_entity_match, numeric_reference_value};
use crate::shared::{DocumentParseContext, ErrorOrigin, Input, ParseErrorCode};
use crate::tokenizer::states::TokenizerState;
use crate::tokenizer::Tokenizer;

impl Tokenizer {
    /// "Consumed as part of an attribute" check from the character reference
    /// state: true when the return state is an attribute-value state.
    pub(super) fn charref_in_attribute(&self) -> bool {
        matches!(
            self.return_state,
            TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted
                | TokenizerState::AttributeValueUnquoted
        )
    }

    /// Flush everything consumed since the `&` back as literal source text.
    fn charref_flush_source(&mut self, input: &Input) {
        let start = self.charref_start;
        let end = self.cursor;
        let slice = &input.as_str()[start..end];
        if self.charref_in_attribute() {
            self.attr_value.begin_if_needed(start);
            self.attr_value.push_slice(slice, end);
        } else {
            self.text.begin_if_needed(start);
            self.text.push_slice(slice, end);
        }
    }

    fn charref_push_source_char(&mut self, input: &Input, from: usize) {
        let slice = &input.as_str()[from..self.cursor];
        if self.charref_in_attribute() {
            self.attr_value.push_slice(slice, self.cursor);
        } else {
            self.text.push_slice(slice, self.cursor);
        }
    }

    fn charref_flush_replacement(&mut self, input: &Input, replacement: &str) {
        let source = input.as_str();
        if self.charref_in_attribute() {
            self.attr_value.begin_if_needed(self.charref_start);
            self.attr_value
                .push_expanded(replacement, source, self.cursor);
        } else {
            self.text.begin_if_needed(self.charref_start);
            self.text.push_expanded(replacement, source, self.cursor);
        }
    }

    pub(super) fn step_character_reference(&mut self, input: &Input) {
        match self.peek(input) {
            Some(ch) if ch.is_ascii_alphanumeric() => {
                self.transition_to(TokenizerState::NamedCharacterReference);
            }
            Some('#') => {
                let _ = self.consume_if(input, '#');
                self.transition_to(TokenizerState::NumericCharacterReference);
            }
            _ => {
                self.charref_flush_source(input);
                self.transition_to(self.return_state);
            }
        }
    }

    pub(super) fn step_named_character_reference(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        let matched = longest_entity_match(&input.as_str()[self.cursor..]);
        match matched {
            Some(m) => {
                let match_end = self.cursor + m.len;
                let next = input.as_str()[match_end..].chars().next();
                // Legacy rule: a semicolon-less match inside an attribute is
                // taken literally when followed by `=` or an alphanumeric.
                let blocked_in_attribute = !m.has_semicolon
                    && self.charref_in_attribute()
                    && matches!(next, Some(c) if c == '=' || c.is_ascii_alphanumeric());
                self.cursor = match_end;
                if blocked_in_attribute {
                    self.charref_flush_source(input);
                } else {
                    if !m.has_semicolon {
                        ctx.report(
                            ErrorOrigin::Tokenizer,
                            ParseErrorCode::MissingSemicolonAfterCharacterReference,
                            self.charref_start,
                        );
                    }
                    self.charref_flush_replacement(input, m.replacement);
                }
                self.transition_to(self.return_state);
            }
            None => {
                self.charref_flush_source(input);
                self.transition_to(TokenizerState::AmbiguousAmpersand);
            }
        }
    }

    pub(super) fn step_ambiguous_ampersand(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        match self.peek(input) {
            Some(ch) if ch.is_ascii_alphanumeric() => {
                let from = self.cursor;
                let _ = self.consume(input);
                self.charref_push_source_char(input, from);
            }
            Some(';') => {
                ctx.report(
                    ErrorOrigin::Tokenizer,
                    ParseErrorCode::UnknownNamedCharacterReference,
                    self.charref_start,
                );
                self.transition_to(self.return_state);
            }
            _ => self.transition_to(self.return_state),
        }
    }

    pub(super) fn step_numeric_character_reference(&mut self, input: &Input) {
        self.charref_code = 0;
        if self.consume_if(input, 'x') || self.consume_if(input, 'X') {
            self.transition_to(TokenizerState::HexadecimalCharacterReferenceStart);
        } else {
            self.transition_to(TokenizerState::DecimalCharacterReferenceStart);
        }
    }

    pub(super) fn step_numeric_reference_start(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
        hex: bool,
    ) {
        let is_digit = |ch: char| {
            if hex {
                ch.is_ascii_hexdigit()
            } else {
                ch.is_ascii_digit()
            }
        };
        match self.peek(input) {
            Some(ch) if is_digit(ch) => {
                self.transition_to(if hex {
                    TokenizerState::HexadecimalCharacterReference
                } else {
                    TokenizerState::DecimalCharacterReference
                });
            }
            _ => {
                // No digits: `&#`/`&#x` is literal source text.
                ctx.report(
                    ErrorOrigin::Tokenizer,
                    ParseErrorCode::InvalidCharacterReference,
                    self.charref_start,
                );
                self.charref_flush_source(input);
                self.transition_to(self.return_state);
            }
        }
    }

    pub(super) fn step_numeric_reference_digits(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
        hex: bool,
    ) {
        let base = if hex { 16u32 } else { 10u32 };
        match self.peek(input) {
            Some(ch) if (hex && ch.is_ascii_hexdigit()) || (!hex && ch.is_ascii_digit()) => {
                let _ = self.consume(input);
                let digit = ch.to_digit(base).expect("digit checked above");
                // Saturation is fine: anything above 0x10FFFF maps to U+FFFD.
                self.charref_code = self
                    .charref_code
                    .saturating_mul(base)
                    .saturating_add(digit);
            }
            Some(';') => {
                let _ = self.consume_if(input, ';');
                self.transition_to(TokenizerState::NumericCharacterReferenceEnd);
            }
            _ => {
                ctx.report(
                    ErrorOrigin::Tokenizer,
                    ParseErrorCode::MissingSemicolonAfterCharacterReference,
                    self.charref_start,
                );
                self.transition_to(TokenizerState::NumericCharacterReferenceEnd);
            }
        }
    }

    pub(super) fn step_numeric_character_reference_end(
        &mut self,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) {
        let (ch, diagnostic) = numeric_reference_value(self.charref_code);
        if let Some(code) = diagnostic {
            ctx.report(ErrorOrigin::Tokenizer, code, self.charref_start);
        }
        let mut buf = [0u8; 4];
        let encoded = ch.encode_utf8(&mut buf);
        self.charref_flush_replacement(input, encoded);
        self.transition_to(self.return_state);
    }
}
