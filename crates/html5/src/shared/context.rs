//! Document-level parse context (shared resources).

use super::{AtomTable, Counters, ErrorOrigin, ErrorPolicy, ParseError, ParseErrorCode};

/// Document-level parse context shared by tokenizer and tree builder.
///
/// Owns document-lifetime resources such as the atom table, the error
/// policy, and metrics.
#[derive(Debug)]
pub struct DocumentParseContext {
    pub atoms: AtomTable,
    pub counters: Counters,
    pub errors: Vec<ParseError>,
    pub error_policy: ErrorPolicy,
}

impl DocumentParseContext {
    pub fn new() -> Self {
        Self {
            atoms: AtomTable::new(),
            counters: Counters::default(),
            errors: Vec::new(),
            error_policy: ErrorPolicy::default(),
        }
    }

    /// Record a parse error per the active policy.
    pub fn report(&mut self, origin: ErrorOrigin, code: ParseErrorCode, position: usize) {
        self.report_detailed(origin, code, position, None);
    }

    pub fn report_detailed(
        &mut self,
        origin: ErrorOrigin,
        code: ParseErrorCode,
        position: usize,
        detail: Option<&'static str>,
    ) {
        if self.error_policy.track_counters {
            self.counters.parse_errors = self.counters.parse_errors.saturating_add(1);
        }
        if self.error_policy.track && self.errors.len() < self.error_policy.max_stored {
            self.errors.push(ParseError {
                origin,
                code,
                position,
                detail,
            });
        }
    }
}

impl Default for DocumentParseContext {
    fn default() -> Self {
        Self::new()
    }
}
