//! Parser session: drives the tokenizer and tree builder to completion.
//!
//! The two state machines are coupled synchronously: after every token the
//! session forwards tree-builder directives (content-model switches) and the
//! foreign-content flag (CDATA admissibility) to the tokenizer before the
//! next pull.

use crate::dom::{Document, Namespace};
use crate::shared::{DocumentParseContext, Input, ParseError};
use crate::tokenizer::{ContentModel, Tokenizer, TokenizerConfig};
use crate::tree_builder::{TreeBuilder, TreeBuilderConfig};

/// Context element for fragment parsing.
#[derive(Clone, Debug)]
pub struct FragmentContext {
    pub name: String,
    pub namespace: Namespace,
}

impl FragmentContext {
    /// An HTML-namespace context element.
    pub fn html(name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: Namespace::Html,
        }
    }
}

/// A single-use parser: owns the input buffer, the parse context, and both
/// state machines. Two parsers are fully independent.
pub struct Parser {
    input: Input,
    ctx: DocumentParseContext,
    tokenizer: Tokenizer,
    builder: TreeBuilder,
}

impl Parser {
    pub fn new(text: &str) -> Self {
        Self::with_config(text, TreeBuilderConfig::default())
    }

    pub fn with_config(text: &str, config: TreeBuilderConfig) -> Self {
        Self {
            input: Input::from_str(text),
            ctx: DocumentParseContext::new(),
            tokenizer: Tokenizer::new(TokenizerConfig::default()),
            builder: TreeBuilder::new(config),
        }
    }

    pub fn new_fragment(text: &str, context: FragmentContext) -> Self {
        Self::new_fragment_with_config(text, context, TreeBuilderConfig::default())
    }

    pub fn new_fragment_with_config(
        text: &str,
        context: FragmentContext,
        config: TreeBuilderConfig,
    ) -> Self {
        let mut ctx = DocumentParseContext::new();
        let name = ctx.atoms.intern_ascii_folded(&context.name);
        let model = fragment_content_model(&context, config.scripting_enabled);
        let mut tokenizer = Tokenizer::new(TokenizerConfig {
            initial_content_model: model,
        });
        tokenizer.set_last_start_tag(&context.name);
        let builder = TreeBuilder::new_fragment(config, name, context.namespace, &mut ctx);
        Self {
            input: Input::from_str(text),
            ctx,
            tokenizer,
            builder,
        }
    }

    /// Drive the tokenizer to exhaustion and return the document.
    pub fn run(self) -> Document {
        self.run_with_diagnostics().0
    }

    /// Like `run`, also surfacing the collected parse errors. Diagnostics
    /// never change the produced tree.
    pub fn run_with_diagnostics(self) -> (Document, Vec<ParseError>) {
        let Parser {
            input,
            mut ctx,
            mut tokenizer,
            mut builder,
        } = self;
        loop {
            tokenizer.set_cdata_allowed(builder.adjusted_current_node_is_foreign());
            let token = tokenizer.next_token(&input, &mut ctx);
            let is_eof = token.is_eof();
            let step = builder.process(token, &input, &mut ctx);
            if let Some(model) = step.content_model {
                tokenizer.set_content_model(model);
            }
            if is_eof || step.stopped {
                break;
            }
        }
        let doc = builder.finish(&mut ctx);
        (doc, ctx.errors)
    }
}

/// Initial tokenizer content model for a fragment context element.
fn fragment_content_model(context: &FragmentContext, scripting_enabled: bool) -> ContentModel {
    if context.namespace != Namespace::Html {
        return ContentModel::Data;
    }
    match context.name.to_ascii_lowercase().as_str() {
        "title" | "textarea" => ContentModel::Rcdata,
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => ContentModel::RawText,
        "script" => ContentModel::ScriptData,
        "noscript" if scripting_enabled => ContentModel::RawText,
        "plaintext" => ContentModel::Plaintext,
        _ => ContentModel::Data,
    }
}

/// Parse a complete document.
pub fn parse_document(text: &str) -> Document {
    Parser::new(text).run()
}

/// Parse a fragment against a context element. The result document carries a
/// synthetic `html` root whose children are the parsed fragment nodes.
pub fn parse_fragment(text: &str, context: FragmentContext) -> Document {
    Parser::new_fragment(text, context).run()
}
