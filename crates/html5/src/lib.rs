//! Standards-conformant HTML5 parsing: a WHATWG tokenizer and tree
//! constructor producing an arena DOM.
//!
//! The pipeline is two coupled state machines over a shared, fully
//! materialized input: [`Tokenizer`] turns code points into tokens,
//! [`TreeBuilder`] consumes them into a [`dom::Document`]. [`Parser`] wires
//! the two together; [`parse_document`] and [`parse_fragment`] are the
//! one-call entry points.
//!
//! There is no error return path: HTML5 always produces a tree. Parse errors
//! are diagnostics, collected on the parse context under a bounded policy.
//!
//! ```
//! let doc = html5::parse_document("<!doctype html><p>Hi<b>there");
//! assert_eq!(html5::dom::serialize::to_html(&doc),
//!     "<!DOCTYPE html><html><head></head><body><p>Hi<b>there</b></p></body></html>");
//! ```

#![recursion_limit = "512"]

pub mod dom;
mod entities;
mod parser;
pub(crate) mod shared;
pub mod tokenizer;
pub mod tree_builder;

pub use parser::{parse_document, parse_fragment, FragmentContext, Parser};
pub use shared::{
    AtomId, AtomTable, Attribute, Counters, DocumentParseContext, ErrorOrigin, ErrorPolicy, Input,
    ParseError, ParseErrorCode, Span, TextSpan, TextValue, Token,
};
pub use tokenizer::{ContentModel, Tokenizer, TokenizerConfig};
pub use tree_builder::{TreeBuilder, TreeBuilderConfig, TreeBuilderStep};
