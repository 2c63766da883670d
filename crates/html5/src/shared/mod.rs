//! Shared data model: atoms, spans, tokens, errors, input, parse context.

mod atom;
mod context;
mod counters;
mod error;
mod input;
mod span;
mod token;

pub use atom::{AtomId, AtomTable};
pub use context::DocumentParseContext;
pub use counters::Counters;
pub use error::{ErrorOrigin, ErrorPolicy, ParseError, ParseErrorCode};
pub use input::Input;
pub use span::{Span, TextSpan};
pub use token::{Attribute, TextValue, Token};
