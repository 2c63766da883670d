//! HTML5 tree construction.
//!
//! The tree builder consumes tokens and mutates an arena `Document`. It owns
//! the stack of open elements, the list of active formatting elements, the
//! head/form pointers, and the insertion-mode state machine. Reprocessing is
//! an explicit loop in `process`, never recursion.
//!
//! Invariants:
//! - Every DOM insertion goes through `Document::insert`/`insert_text` with
//!   a point computed by `appropriate_insertion_point`, so foster parenting
//!   and the adoption agency share one mutation primitive.
//! - The stack never contains the document node; index 0 is the `html`
//!   element once one exists.
//! - Parse errors are diagnostics; every token path ends in a tree.

mod adoption;
mod foreign;
mod formatting;
mod modes;
mod quirks;
mod stack;
pub(crate) mod tag_sets;

#[cfg(test)]
mod tests;

use std::borrow::Cow;

use crate::dom::{Attr, Document, InsertionPoint, Namespace, NodeId, QuirksMode};
use crate::shared::{
    AtomId, Attribute, DocumentParseContext, ErrorOrigin, Input, ParseErrorCode, Span, TextValue,
    Token,
};
use crate::tokenizer::ContentModel;
use formatting::{ActiveFormattingList, FormattingEntry};
use modes::InsertionMode;
use stack::{OpenElementsStack, OpenEntry, ScopeKind};
use tag_sets::atoms;

/// Configuration for the tree builder.
#[derive(Clone, Copy, Debug)]
pub struct TreeBuilderConfig {
    /// Scripting flag: affects `<noscript>` content model only (no script
    /// ever executes).
    pub scripting_enabled: bool,
    /// Soft cap on the stack of open elements. Start tags that would push
    /// past it are dropped with a diagnostic.
    pub max_depth: usize,
}

impl Default for TreeBuilderConfig {
    fn default() -> Self {
        Self {
            scripting_enabled: false,
            max_depth: 512,
        }
    }
}

/// Result of feeding one token.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeBuilderStep {
    /// Content-model switch the tokenizer must apply before the next token.
    pub content_model: Option<ContentModel>,
    /// The builder has stopped (EOF or frameset end of document).
    pub stopped: bool,
}

/// Tag data with resolved attribute values.
#[derive(Clone, Debug)]
pub(crate) struct TagData {
    pub(crate) name: AtomId,
    pub(crate) attrs: Vec<(AtomId, String)>,
    pub(crate) self_closing: bool,
    pub(crate) span: Span,
}

fn synthetic_tag(name: AtomId) -> TagData {
    TagData {
        name,
        attrs: Vec::new(),
        self_closing: false,
        span: Span::new(0, 0),
    }
}

/// Token with payloads resolved against the input buffer.
#[derive(Clone, Debug)]
pub(crate) enum TbToken<'i> {
    Doctype {
        name: Option<String>,
        public_id: Option<String>,
        system_id: Option<String>,
        force_quirks: bool,
    },
    Start(TagData),
    End(TagData),
    Text(Cow<'i, str>, Span),
    Comment(Cow<'i, str>, Span),
    Eof,
}

pub(crate) enum Control<'i> {
    Done,
    Reprocess(TbToken<'i>),
}

use self::Control::{Done, Reprocess};

fn resolve_text(value: TextValue, input: &Input) -> Cow<'_, str> {
    match value {
        TextValue::Span(span) => Cow::Borrowed(input.slice(span)),
        TextValue::Owned(text) => Cow::Owned(text),
    }
}

fn resolve_attrs(attrs: Vec<Attribute>, input: &Input) -> Vec<(AtomId, String)> {
    attrs
        .into_iter()
        .map(|attr| {
            let value = match attr.value {
                None => String::new(),
                Some(TextValue::Span(span)) => input.slice(span).to_string(),
                Some(TextValue::Owned(text)) => text,
            };
            (attr.name, value)
        })
        .collect()
}

fn resolve_token(token: Token, input: &Input) -> TbToken<'_> {
    match token {
        Token::Doctype {
            name,
            public_id,
            system_id,
            force_quirks,
        } => TbToken::Doctype {
            name,
            public_id,
            system_id,
            force_quirks,
        },
        Token::StartTag {
            name,
            attributes,
            self_closing,
            span,
        } => TbToken::Start(TagData {
            name,
            attrs: resolve_attrs(attributes, input),
            self_closing,
            span,
        }),
        Token::EndTag { name, span } => TbToken::End(TagData {
            name,
            attrs: Vec::new(),
            self_closing: false,
            span,
        }),
        Token::Text { text, span } => TbToken::Text(resolve_text(text, input), span),
        Token::Comment { text, span } => TbToken::Comment(resolve_text(text, input), span),
        Token::Eof => TbToken::Eof,
    }
}

fn is_ws(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\u{0C}' | ' ')
}

fn ws_prefix_len(text: &str) -> usize {
    text.len() - text.trim_start_matches(is_ws).len()
}

fn split_cow_at<'i>(text: Cow<'i, str>, at: usize) -> (Cow<'i, str>, Cow<'i, str>) {
    match text {
        Cow::Borrowed(s) => (Cow::Borrowed(&s[..at]), Cow::Borrowed(&s[at..])),
        Cow::Owned(s) => {
            let tail = s[at..].to_string();
            let mut head = s;
            head.truncate(at);
            (Cow::Owned(head), Cow::Owned(tail))
        }
    }
}

fn span_from(span: Span, offset: usize) -> Span {
    Span::new((span.start + offset).min(span.end), span.end)
}

/// Adjusted current node: the context element in fragment mode when only the
/// synthetic root remains, the current node otherwise.
#[derive(Clone, Copy, Debug)]
struct Acn {
    name: AtomId,
    ns: Namespace,
    node: Option<NodeId>,
}

#[derive(Clone, Copy, Debug)]
struct FragmentCtx {
    name: AtomId,
    ns: Namespace,
}

/// HTML5 tree builder.
pub struct TreeBuilder {
    config: TreeBuilderConfig,
    doc: Document,
    mode: InsertionMode,
    original_mode: InsertionMode,
    stack: OpenElementsStack,
    formatting: ActiveFormattingList,
    head: Option<NodeId>,
    form: Option<NodeId>,
    frameset_ok: bool,
    foster_parenting: bool,
    skip_newline: bool,
    pending_table_text: String,
    pending_table_text_non_ws: bool,
    fragment_ctx: Option<FragmentCtx>,
    html_root: Option<NodeId>,
    stopped: bool,
    directive: Option<ContentModel>,
}

impl TreeBuilder {
    pub fn new(config: TreeBuilderConfig) -> Self {
        Self {
            config,
            doc: Document::new(),
            mode: InsertionMode::Initial,
            original_mode: InsertionMode::Initial,
            stack: OpenElementsStack::default(),
            formatting: ActiveFormattingList::default(),
            head: None,
            form: None,
            frameset_ok: true,
            foster_parenting: false,
            skip_newline: false,
            pending_table_text: String::new(),
            pending_table_text_non_ws: false,
            fragment_ctx: None,
            html_root: None,
            stopped: false,
            directive: None,
        }
    }

    /// Fragment entry: synthesize the `html` root, record the context
    /// element, and reset the insertion mode per the fragment algorithm.
    pub(crate) fn new_fragment(
        config: TreeBuilderConfig,
        context_name: AtomId,
        context_ns: Namespace,
        ctx: &mut DocumentParseContext,
    ) -> Self {
        let mut builder = Self::new(config);
        let root = builder.doc.create_element(
            ctx.atoms.resolve_arc(atoms::HTML),
            Namespace::Html,
            Vec::new(),
        );
        let doc_root = builder.doc.root();
        builder.doc.append(doc_root, root);
        builder.stack.push(OpenEntry {
            node: root,
            name: atoms::HTML,
            ns: Namespace::Html,
        });
        builder.html_root = Some(root);
        builder.fragment_ctx = Some(FragmentCtx {
            name: context_name,
            ns: context_ns,
        });
        builder.reset_insertion_mode();
        builder
    }

    /// Whether `<![CDATA[` should open a CDATA section right now.
    pub fn adjusted_current_node_is_foreign(&self) -> bool {
        self.adjusted_current_node()
            .is_some_and(|acn| acn.ns != Namespace::Html)
    }

    /// Feed one token. Returns tokenizer directives and the stop flag.
    pub fn process(
        &mut self,
        token: Token,
        input: &Input,
        ctx: &mut DocumentParseContext,
    ) -> TreeBuilderStep {
        if self.stopped {
            return TreeBuilderStep {
                content_model: None,
                stopped: true,
            };
        }
        let mut token = resolve_token(token, input);

        // pre/listing/textarea swallow a newline immediately after the tag.
        if self.skip_newline {
            self.skip_newline = false;
            token = match token {
                TbToken::Text(text, span) if text.starts_with('\n') => {
                    if text.len() == 1 {
                        return self.step_result();
                    }
                    let (_, rest) = split_cow_at(text, 1);
                    TbToken::Text(rest, span_from(span, 1))
                }
                other => other,
            };
        }

        if let TbToken::Start(tag) = &token
            && self.stack.len() >= self.config.max_depth
        {
            ctx.report(
                ErrorOrigin::TreeBuilder,
                ParseErrorCode::DepthCapExceeded,
                tag.span.start,
            );
            return self.step_result();
        }

        loop {
            let control = if self.should_use_foreign(&token) {
                self.process_foreign(token, ctx)
            } else {
                self.dispatch(token, ctx)
            };
            match control {
                Done => break,
                Reprocess(next) => token = next,
            }
        }
        self.step_result()
    }

    fn step_result(&mut self) -> TreeBuilderStep {
        TreeBuilderStep {
            content_model: self.directive.take(),
            stopped: self.stopped,
        }
    }

    /// Finish the parse and hand the document over.
    pub fn finish(mut self, ctx: &mut DocumentParseContext) -> Document {
        ctx.counters.max_open_elements_depth = ctx
            .counters
            .max_open_elements_depth
            .max(self.stack.max_depth());
        ctx.counters.max_active_formatting_depth = ctx
            .counters
            .max_active_formatting_depth
            .max(self.formatting.max_depth());
        self.stack.clear();
        self.doc
    }

    // ----- dispatch -----

    fn dispatch<'i>(&mut self, token: TbToken<'i>, ctx: &mut DocumentParseContext) -> Control<'i> {
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "html5.tree", "mode {:?} token {:?}", self.mode, token);
        match self.mode {
            InsertionMode::Initial => self.mode_initial(token, ctx),
            InsertionMode::BeforeHtml => self.mode_before_html(token, ctx),
            InsertionMode::BeforeHead => self.mode_before_head(token, ctx),
            InsertionMode::InHead => self.mode_in_head(token, ctx),
            InsertionMode::InHeadNoscript => self.mode_in_head_noscript(token, ctx),
            InsertionMode::AfterHead => self.mode_after_head(token, ctx),
            InsertionMode::InBody => self.mode_in_body(token, ctx),
            InsertionMode::Text => self.mode_text(token, ctx),
            InsertionMode::InTable => self.mode_in_table(token, ctx),
            InsertionMode::InTableText => self.mode_in_table_text(token, ctx),
            InsertionMode::InCaption => self.mode_in_caption(token, ctx),
            InsertionMode::InColumnGroup => self.mode_in_column_group(token, ctx),
            InsertionMode::InTableBody => self.mode_in_table_body(token, ctx),
            InsertionMode::InRow => self.mode_in_row(token, ctx),
            InsertionMode::InCell => self.mode_in_cell(token, ctx),
            InsertionMode::InSelect => self.mode_in_select(token, ctx),
            InsertionMode::InSelectInTable => self.mode_in_select_in_table(token, ctx),
            InsertionMode::InTemplate => self.mode_in_template(token, ctx),
            InsertionMode::AfterBody => self.mode_after_body(token, ctx),
            InsertionMode::InFrameset => self.mode_in_frameset(token, ctx),
            InsertionMode::AfterFrameset => self.mode_after_frameset(token, ctx),
            InsertionMode::AfterAfterBody => self.mode_after_after_body(token, ctx),
            InsertionMode::AfterAfterFrameset => self.mode_after_after_frameset(token, ctx),
        }
    }

    // ----- adjusted current node / foreign dispatch -----

    fn adjusted_current_node(&self) -> Option<Acn> {
        if let Some(frag) = &self.fragment_ctx
            && self.stack.len() == 1
        {
            return Some(Acn {
                name: frag.name,
                ns: frag.ns,
                node: None,
            });
        }
        self.stack.current().map(|entry| Acn {
            name: entry.name,
            ns: entry.ns,
            node: Some(entry.node),
        })
    }

    fn is_html_integration_point(&self, acn: Acn) -> bool {
        match acn.ns {
            Namespace::Svg => {
                matches!(acn.name, atoms::FOREIGN_OBJECT | atoms::DESC | atoms::TITLE)
            }
            Namespace::MathMl => {
                acn.name == atoms::ANNOTATION_XML
                    && acn.node.is_some_and(|node| {
                        self.doc.attr(node, "encoding").is_some_and(|value| {
                            value.eq_ignore_ascii_case("text/html")
                                || value.eq_ignore_ascii_case("application/xhtml+xml")
                        })
                    })
            }
            Namespace::Html => false,
        }
    }

    fn should_use_foreign(&self, token: &TbToken<'_>) -> bool {
        let Some(acn) = self.adjusted_current_node() else {
            return false;
        };
        if acn.ns == Namespace::Html {
            return false;
        }
        if matches!(token, TbToken::Eof) {
            return false;
        }
        if mathml_text_integration_point(acn.ns, acn.name) {
            match token {
                TbToken::Start(tag)
                    if tag.name != atoms::MGLYPH && tag.name != atoms::MALIGNMARK =>
                {
                    return false;
                }
                TbToken::Text(..) => return false,
                _ => {}
            }
        }
        if acn.ns == Namespace::MathMl
            && acn.name == atoms::ANNOTATION_XML
            && matches!(token, TbToken::Start(tag) if tag.name == atoms::SVG)
        {
            return false;
        }
        if self.is_html_integration_point(acn)
            && matches!(token, TbToken::Start(_) | TbToken::Text(..))
        {
            return false;
        }
        true
    }

    fn process_foreign<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Text(text, _) => {
                if text.chars().any(|ch| !is_ws(ch)) {
                    self.frameset_ok = false;
                }
                self.insert_text(&text);
                Done
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) if is_foreign_breakout(&tag) => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                while let Some(current) = self.stack.current() {
                    if current.ns == Namespace::Html
                        || mathml_text_integration_point(current.ns, current.name)
                        || self.is_html_integration_point(Acn {
                            name: current.name,
                            ns: current.ns,
                            node: Some(current.node),
                        })
                    {
                        break;
                    }
                    self.stack.pop();
                }
                Reprocess(TbToken::Start(tag))
            }
            TbToken::Start(tag) => {
                let ns = self
                    .adjusted_current_node()
                    .map(|acn| acn.ns)
                    .unwrap_or(Namespace::Html);
                self.insert_foreign_element(&tag, ns, ctx);
                if tag.self_closing {
                    self.stack.pop();
                }
                Done
            }
            TbToken::End(tag) => {
                if self.stack.is_empty() {
                    return Done;
                }
                let top = self.stack.get(self.stack.len() - 1);
                if !name_matches_ci(top.name, tag.name, ctx) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                let mut index = self.stack.len() - 1;
                loop {
                    if index == 0 {
                        break;
                    }
                    let entry = self.stack.get(index);
                    if name_matches_ci(entry.name, tag.name, ctx) {
                        self.stack.truncate(index);
                        break;
                    }
                    index -= 1;
                    if self.stack.get(index).ns == Namespace::Html {
                        return self.dispatch(TbToken::End(tag), ctx);
                    }
                }
                Done
            }
            TbToken::Eof => self.dispatch(TbToken::Eof, ctx),
        }
    }

    // ----- insertion primitives -----

    fn target_is_table_like(&self, node: NodeId) -> bool {
        self.stack
            .index_of_node(node)
            .map(|index| self.stack.get(index))
            .is_some_and(|entry| {
                entry.ns == Namespace::Html
                    && matches!(
                        entry.name,
                        atoms::TABLE | atoms::TBODY | atoms::TFOOT | atoms::THEAD | atoms::TR
                    )
            })
    }

    /// The appropriate place for inserting a node: the current node, or the
    /// foster parent when foster parenting is on and the target is a table
    /// context.
    fn appropriate_insertion_point(&self, override_target: Option<NodeId>) -> InsertionPoint {
        let target = override_target.or_else(|| self.stack.current().map(|entry| entry.node));
        let Some(target) = target else {
            return InsertionPoint::append_to(self.doc.root());
        };
        if self.foster_parenting && self.target_is_table_like(target) {
            if let Some(table_index) = self
                .stack
                .last_index_where(|e| e.ns == Namespace::Html && e.name == atoms::TABLE)
            {
                let table_node = self.stack.get(table_index).node;
                if let Some(parent) = self.doc.parent(table_node) {
                    return InsertionPoint {
                        parent,
                        before: Some(table_node),
                    };
                }
                // Fragment case: the element above the table in the stack.
                return InsertionPoint::append_to(self.stack.get(table_index - 1).node);
            }
            return InsertionPoint::append_to(self.stack.get(0).node);
        }
        InsertionPoint::append_to(target)
    }

    fn create_html_element(&mut self, tag: &TagData, ctx: &mut DocumentParseContext) -> NodeId {
        let attrs = tag
            .attrs
            .iter()
            .map(|(name, value)| Attr {
                ns: None,
                name: ctx.atoms.resolve(*name).to_string(),
                value: value.clone(),
            })
            .collect();
        self.doc
            .create_element(ctx.atoms.resolve_arc(tag.name), Namespace::Html, attrs)
    }

    fn insert_html_element(&mut self, tag: &TagData, ctx: &mut DocumentParseContext) -> NodeId {
        let node = self.create_html_element(tag, ctx);
        let point = self.appropriate_insertion_point(None);
        self.doc.insert(node, point);
        self.stack.push(OpenEntry {
            node,
            name: tag.name,
            ns: Namespace::Html,
        });
        node
    }

    fn insert_foreign_element(
        &mut self,
        tag: &TagData,
        ns: Namespace,
        ctx: &mut DocumentParseContext,
    ) -> NodeId {
        let name = if ns == Namespace::Svg {
            let adjusted = foreign::svg_tag_adjustment(ctx.atoms.resolve(tag.name));
            match adjusted {
                Some(adjusted) => ctx.atoms.intern_exact(adjusted),
                None => tag.name,
            }
        } else {
            tag.name
        };
        let attrs = tag
            .attrs
            .iter()
            .map(|(attr_name, value)| {
                let raw = ctx.atoms.resolve(*attr_name);
                if let Some((attr_ns, local)) = foreign::foreign_attr_adjustment(raw) {
                    Attr {
                        ns: Some(attr_ns),
                        name: local.to_string(),
                        value: value.clone(),
                    }
                } else if ns == Namespace::Svg
                    && let Some(adjusted) = foreign::svg_attr_adjustment(raw)
                {
                    Attr {
                        ns: None,
                        name: adjusted.to_string(),
                        value: value.clone(),
                    }
                } else if ns == Namespace::MathMl
                    && let Some(adjusted) = foreign::mathml_attr_adjustment(raw)
                {
                    Attr {
                        ns: None,
                        name: adjusted.to_string(),
                        value: value.clone(),
                    }
                } else {
                    Attr {
                        ns: None,
                        name: raw.to_string(),
                        value: value.clone(),
                    }
                }
            })
            .collect();
        let node = self
            .doc
            .create_element(ctx.atoms.resolve_arc(name), ns, attrs);
        let point = self.appropriate_insertion_point(None);
        self.doc.insert(node, point);
        self.stack.push(OpenEntry { node, name, ns });
        node
    }

    fn insert_text(&mut self, text: &str) {
        let point = self.appropriate_insertion_point(None);
        self.doc.insert_text(point, text);
    }

    fn insert_comment(&mut self, text: &str) {
        let node = self.doc.create_comment(text.to_string());
        let point = self.appropriate_insertion_point(None);
        self.doc.insert(node, point);
    }

    fn insert_comment_in(&mut self, parent: NodeId, text: &str) {
        let node = self.doc.create_comment(text.to_string());
        self.doc.append(parent, node);
    }

    fn generic_parse_element(
        &mut self,
        tag: &TagData,
        model: ContentModel,
        ctx: &mut DocumentParseContext,
    ) {
        self.insert_html_element(tag, ctx);
        self.directive = Some(model);
        self.original_mode = self.mode;
        self.mode = InsertionMode::Text;
    }

    // ----- common algorithms -----

    fn generate_implied_end_tags(&mut self, except: Option<AtomId>) {
        while let Some(current) = self.stack.current() {
            if current.ns == Namespace::Html
                && tag_sets::is_implied_end(current.name)
                && Some(current.name) != except
            {
                self.stack.pop();
            } else {
                return;
            }
        }
    }

    fn generate_implied_end_tags_thoroughly(&mut self) {
        while let Some(current) = self.stack.current() {
            if current.ns == Namespace::Html && tag_sets::is_implied_end_thorough(current.name) {
                self.stack.pop();
            } else {
                return;
            }
        }
    }

    fn close_p_element(&mut self, ctx: &mut DocumentParseContext) {
        self.generate_implied_end_tags(Some(atoms::P));
        if self.stack.current().map(|e| e.name) != Some(atoms::P) {
            ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::MisnestedTag, 0);
        }
        self.stack.pop_until_name_inclusive(atoms::P);
    }

    fn close_p_if_in_button_scope(&mut self, ctx: &mut DocumentParseContext) {
        if self.stack.has_in_scope(atoms::P, ScopeKind::Button) {
            self.close_p_element(ctx);
        }
    }

    /// Reconstruct the active formatting elements.
    fn reconstruct_active_formatting(&mut self, ctx: &mut DocumentParseContext) {
        if self.formatting.is_empty() {
            return;
        }
        let last = self.formatting.len() - 1;
        match self.formatting.get(last) {
            FormattingEntry::Marker => return,
            FormattingEntry::Element { node, .. } if self.stack.contains_node(*node) => return,
            _ => {}
        }
        // Rewind to the entry after the last marker or stack member.
        let mut index = last;
        loop {
            if index == 0 {
                break;
            }
            index -= 1;
            match self.formatting.get(index) {
                FormattingEntry::Marker => {
                    index += 1;
                    break;
                }
                FormattingEntry::Element { node, .. } if self.stack.contains_node(*node) => {
                    index += 1;
                    break;
                }
                _ => {}
            }
        }
        // Create: re-open each remaining entry in order.
        while index < self.formatting.len() {
            let (name, attrs) = match self.formatting.get(index) {
                FormattingEntry::Element { name, attrs, .. } => (*name, attrs.clone()),
                FormattingEntry::Marker => unreachable!("markers were handled by the rewind"),
            };
            let tag = TagData {
                name,
                attrs,
                self_closing: false,
                span: Span::new(0, 0),
            };
            let node = self.insert_html_element(&tag, ctx);
            self.formatting.replace_node_at(index, node);
            index += 1;
        }
    }

    /// The "any other end tag" steps of the in-body mode.
    fn any_other_end_tag(&mut self, tag: &TagData, ctx: &mut DocumentParseContext) {
        for index in (0..self.stack.len()).rev() {
            let entry = self.stack.get(index);
            if entry.ns == Namespace::Html && entry.name == tag.name {
                self.generate_implied_end_tags(Some(tag.name));
                if index != self.stack.len() - 1 {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                self.stack.truncate(index);
                return;
            }
            if tag_sets::is_special(entry.ns, entry.name) {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                return;
            }
        }
    }

    /// Reset the insertion mode appropriately.
    fn reset_insertion_mode(&mut self) {
        for index in (0..self.stack.len()).rev() {
            let last = index == 0;
            let entry = self.stack.get(index);
            let (name, ns) = if last && self.fragment_ctx.is_some() {
                let frag = self.fragment_ctx.as_ref().expect("checked fragment");
                (frag.name, frag.ns)
            } else {
                (entry.name, entry.ns)
            };
            if ns != Namespace::Html {
                if last {
                    break;
                }
                continue;
            }
            match name {
                atoms::SELECT => {
                    if !last {
                        for above in (0..index).rev() {
                            let ancestor = self.stack.get(above);
                            if ancestor.name == atoms::TEMPLATE {
                                break;
                            }
                            if ancestor.name == atoms::TABLE {
                                self.mode = InsertionMode::InSelectInTable;
                                return;
                            }
                        }
                    }
                    self.mode = InsertionMode::InSelect;
                    return;
                }
                atoms::TD | atoms::TH if !last => {
                    self.mode = InsertionMode::InCell;
                    return;
                }
                atoms::TR => {
                    self.mode = InsertionMode::InRow;
                    return;
                }
                atoms::TBODY | atoms::THEAD | atoms::TFOOT => {
                    self.mode = InsertionMode::InTableBody;
                    return;
                }
                atoms::CAPTION => {
                    self.mode = InsertionMode::InCaption;
                    return;
                }
                atoms::COLGROUP => {
                    self.mode = InsertionMode::InColumnGroup;
                    return;
                }
                atoms::TABLE => {
                    self.mode = InsertionMode::InTable;
                    return;
                }
                atoms::TEMPLATE => {
                    self.mode = InsertionMode::InTemplate;
                    return;
                }
                atoms::HEAD if !last => {
                    self.mode = InsertionMode::InHead;
                    return;
                }
                atoms::BODY => {
                    self.mode = InsertionMode::InBody;
                    return;
                }
                atoms::FRAMESET => {
                    self.mode = InsertionMode::InFrameset;
                    return;
                }
                atoms::HTML => {
                    self.mode = if self.head.is_none() {
                        InsertionMode::BeforeHead
                    } else {
                        InsertionMode::AfterHead
                    };
                    return;
                }
                _ => {}
            }
            if last {
                break;
            }
        }
        self.mode = InsertionMode::InBody;
    }

    fn clear_stack_to_table_context(&mut self) {
        self.stack
            .pop_to_one_of(&[atoms::TABLE, atoms::TEMPLATE, atoms::HTML]);
    }

    fn clear_stack_to_table_body_context(&mut self) {
        self.stack.pop_to_one_of(&[
            atoms::TBODY,
            atoms::TFOOT,
            atoms::THEAD,
            atoms::TEMPLATE,
            atoms::HTML,
        ]);
    }

    fn clear_stack_to_table_row_context(&mut self) {
        self.stack
            .pop_to_one_of(&[atoms::TR, atoms::TEMPLATE, atoms::HTML]);
    }

    fn close_cell(&mut self, ctx: &mut DocumentParseContext) {
        self.generate_implied_end_tags(None);
        if !matches!(
            self.stack.current().map(|e| e.name),
            Some(atoms::TD) | Some(atoms::TH)
        ) {
            ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::MisnestedTag, 0);
        }
        self.stack.pop_until_any_inclusive(&[atoms::TD, atoms::TH]);
        self.formatting.clear_to_last_marker();
        self.mode = InsertionMode::InRow;
    }

    fn stop_parsing(&mut self) {
        self.stopped = true;
    }

    // ----- insertion modes -----

    fn mode_initial<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    return Done;
                }
                self.doc.set_quirks_mode(QuirksMode::Quirks);
                self.mode = InsertionMode::BeforeHtml;
                let (_, rest) = split_cow_at(text, ws);
                Reprocess(TbToken::Text(rest, span_from(span, ws)))
            }
            TbToken::Comment(text, _) => {
                let root = self.doc.root();
                self.insert_comment_in(root, &text);
                Done
            }
            TbToken::Doctype {
                name,
                public_id,
                system_id,
                force_quirks,
            } => {
                let clean = name.as_deref() == Some("html")
                    && public_id.is_none()
                    && (system_id.is_none() || system_id.as_deref() == Some("about:legacy-compat"));
                if !clean {
                    ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                }
                let node = self.doc.create_doctype(
                    name.clone().unwrap_or_default(),
                    public_id.clone().unwrap_or_default(),
                    system_id.clone().unwrap_or_default(),
                );
                let root = self.doc.root();
                self.doc.append(root, node);
                let quirks = quirks::determine(
                    name.as_deref(),
                    public_id.as_deref(),
                    system_id.as_deref(),
                    force_quirks,
                );
                self.doc.set_quirks_mode(quirks);
                self.mode = InsertionMode::BeforeHtml;
                Done
            }
            other => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                self.doc.set_quirks_mode(QuirksMode::Quirks);
                self.mode = InsertionMode::BeforeHtml;
                Reprocess(other)
            }
        }
    }

    fn append_html_root(&mut self, tag: &TagData, ctx: &mut DocumentParseContext) -> NodeId {
        let node = self.create_html_element(tag, ctx);
        let root = self.doc.root();
        self.doc.append(root, node);
        self.stack.push(OpenEntry {
            node,
            name: atoms::HTML,
            ns: Namespace::Html,
        });
        self.html_root = Some(node);
        node
    }

    fn mode_before_html<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Comment(text, _) => {
                let root = self.doc.root();
                self.insert_comment_in(root, &text);
                Done
            }
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    return Done;
                }
                self.append_html_root(&synthetic_tag(atoms::HTML), ctx);
                self.mode = InsertionMode::BeforeHead;
                let (_, rest) = split_cow_at(text, ws);
                Reprocess(TbToken::Text(rest, span_from(span, ws)))
            }
            TbToken::Start(tag) if tag.name == atoms::HTML => {
                self.append_html_root(&tag, ctx);
                self.mode = InsertionMode::BeforeHead;
                Done
            }
            TbToken::End(tag)
                if !matches!(
                    tag.name,
                    atoms::HEAD | atoms::BODY | atoms::HTML | atoms::BR
                ) =>
            {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            other => {
                self.append_html_root(&synthetic_tag(atoms::HTML), ctx);
                self.mode = InsertionMode::BeforeHead;
                Reprocess(other)
            }
        }
    }

    fn mode_before_head<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    return Done;
                }
                let head = self.insert_html_element(&synthetic_tag(atoms::HEAD), ctx);
                self.head = Some(head);
                self.mode = InsertionMode::InHead;
                let (_, rest) = split_cow_at(text, ws);
                Reprocess(TbToken::Text(rest, span_from(span, ws)))
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) if tag.name == atoms::HTML => {
                self.mode_in_body(TbToken::Start(tag), ctx)
            }
            TbToken::Start(tag) if tag.name == atoms::HEAD => {
                let head = self.insert_html_element(&tag, ctx);
                self.head = Some(head);
                self.mode = InsertionMode::InHead;
                Done
            }
            TbToken::End(tag)
                if !matches!(
                    tag.name,
                    atoms::HEAD | atoms::BODY | atoms::HTML | atoms::BR
                ) =>
            {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            other => {
                let head = self.insert_html_element(&synthetic_tag(atoms::HEAD), ctx);
                self.head = Some(head);
                self.mode = InsertionMode::InHead;
                Reprocess(other)
            }
        }
    }

    fn mode_in_head<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    self.insert_text(&text);
                    return Done;
                }
                let (prefix, rest) = split_cow_at(text, ws);
                if !prefix.is_empty() {
                    self.insert_text(&prefix);
                }
                // Anything else: pop head and fall to AfterHead.
                self.stack.pop();
                self.mode = InsertionMode::AfterHead;
                Reprocess(TbToken::Text(rest, span_from(span, ws)))
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) => match tag.name {
                atoms::HTML => self.mode_in_body(TbToken::Start(tag), ctx),
                atoms::BASE | atoms::BASEFONT | atoms::BGSOUND | atoms::LINK | atoms::META => {
                    self.insert_html_element(&tag, ctx);
                    self.stack.pop();
                    Done
                }
                atoms::TITLE => {
                    self.generic_parse_element(&tag, ContentModel::Rcdata, ctx);
                    Done
                }
                atoms::NOSCRIPT if self.config.scripting_enabled => {
                    self.generic_parse_element(&tag, ContentModel::RawText, ctx);
                    Done
                }
                atoms::NOSCRIPT => {
                    self.insert_html_element(&tag, ctx);
                    self.mode = InsertionMode::InHeadNoscript;
                    Done
                }
                atoms::NOFRAMES | atoms::STYLE => {
                    self.generic_parse_element(&tag, ContentModel::RawText, ctx);
                    Done
                }
                atoms::SCRIPT => {
                    self.generic_parse_element(&tag, ContentModel::ScriptData, ctx);
                    Done
                }
                atoms::TEMPLATE => {
                    self.insert_html_element(&tag, ctx);
                    self.formatting.push_marker();
                    self.frameset_ok = false;
                    self.mode = InsertionMode::InTemplate;
                    Done
                }
                atoms::HEAD => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    Done
                }
                _ => {
                    self.stack.pop();
                    self.mode = InsertionMode::AfterHead;
                    Reprocess(TbToken::Start(tag))
                }
            },
            TbToken::End(tag) => match tag.name {
                atoms::HEAD => {
                    self.stack.pop();
                    self.mode = InsertionMode::AfterHead;
                    Done
                }
                atoms::TEMPLATE => {
                    if !self
                        .stack
                        .items()
                        .iter()
                        .any(|e| e.ns == Namespace::Html && e.name == atoms::TEMPLATE)
                    {
                        ctx.report(
                            ErrorOrigin::TreeBuilder,
                            ParseErrorCode::UnexpectedToken,
                            tag.span.start,
                        );
                        return Done;
                    }
                    self.generate_implied_end_tags_thoroughly();
                    if self.stack.current().map(|e| e.name) != Some(atoms::TEMPLATE) {
                        ctx.report(
                            ErrorOrigin::TreeBuilder,
                            ParseErrorCode::MisnestedTag,
                            tag.span.start,
                        );
                    }
                    self.stack.pop_until_name_inclusive(atoms::TEMPLATE);
                    self.formatting.clear_to_last_marker();
                    self.reset_insertion_mode();
                    Done
                }
                atoms::BODY | atoms::HTML | atoms::BR => {
                    self.stack.pop();
                    self.mode = InsertionMode::AfterHead;
                    Reprocess(TbToken::End(tag))
                }
                _ => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    Done
                }
            },
            TbToken::Eof => {
                self.stack.pop();
                self.mode = InsertionMode::AfterHead;
                Reprocess(TbToken::Eof)
            }
        }
    }

    fn mode_in_head_noscript<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) if tag.name == atoms::HTML => {
                self.mode_in_body(TbToken::Start(tag), ctx)
            }
            TbToken::End(tag) if tag.name == atoms::NOSCRIPT => {
                self.stack.pop();
                self.mode = InsertionMode::InHead;
                Done
            }
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    return self.mode_in_head(TbToken::Text(text, span), ctx);
                }
                let (prefix, rest) = split_cow_at(text, ws);
                if !prefix.is_empty() {
                    self.insert_text(&prefix);
                }
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                self.stack.pop();
                self.mode = InsertionMode::InHead;
                Reprocess(TbToken::Text(rest, span_from(span, ws)))
            }
            TbToken::Comment(text, span) => self.mode_in_head(TbToken::Comment(text, span), ctx),
            TbToken::Start(tag)
                if matches!(
                    tag.name,
                    atoms::BASEFONT
                        | atoms::BGSOUND
                        | atoms::LINK
                        | atoms::META
                        | atoms::NOFRAMES
                        | atoms::STYLE
                ) =>
            {
                self.mode_in_head(TbToken::Start(tag), ctx)
            }
            TbToken::Start(tag) if matches!(tag.name, atoms::HEAD | atoms::NOSCRIPT) => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            TbToken::End(tag) if tag.name != atoms::BR => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            other => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                self.stack.pop();
                self.mode = InsertionMode::InHead;
                Reprocess(other)
            }
        }
    }

    fn mode_after_head<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    self.insert_text(&text);
                    return Done;
                }
                let (prefix, rest) = split_cow_at(text, ws);
                if !prefix.is_empty() {
                    self.insert_text(&prefix);
                }
                self.insert_html_element(&synthetic_tag(atoms::BODY), ctx);
                self.mode = InsertionMode::InBody;
                Reprocess(TbToken::Text(rest, span_from(span, ws)))
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) => match tag.name {
                atoms::HTML => self.mode_in_body(TbToken::Start(tag), ctx),
                atoms::BODY => {
                    self.insert_html_element(&tag, ctx);
                    self.frameset_ok = false;
                    self.mode = InsertionMode::InBody;
                    Done
                }
                atoms::FRAMESET => {
                    self.insert_html_element(&tag, ctx);
                    self.mode = InsertionMode::InFrameset;
                    Done
                }
                atoms::BASE
                | atoms::BASEFONT
                | atoms::BGSOUND
                | atoms::LINK
                | atoms::META
                | atoms::NOFRAMES
                | atoms::SCRIPT
                | atoms::STYLE
                | atoms::TEMPLATE
                | atoms::TITLE => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    let head = self.head.expect("head pointer set before AfterHead");
                    self.stack.push(OpenEntry {
                        node: head,
                        name: atoms::HEAD,
                        ns: Namespace::Html,
                    });
                    let control = self.mode_in_head(TbToken::Start(tag), ctx);
                    self.stack.remove_node(head);
                    control
                }
                atoms::HEAD => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    Done
                }
                _ => {
                    self.insert_html_element(&synthetic_tag(atoms::BODY), ctx);
                    self.mode = InsertionMode::InBody;
                    Reprocess(TbToken::Start(tag))
                }
            },
            TbToken::End(tag) => match tag.name {
                atoms::TEMPLATE => self.mode_in_head(TbToken::End(tag), ctx),
                atoms::BODY | atoms::HTML | atoms::BR => {
                    self.insert_html_element(&synthetic_tag(atoms::BODY), ctx);
                    self.mode = InsertionMode::InBody;
                    Reprocess(TbToken::End(tag))
                }
                _ => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    Done
                }
            },
            TbToken::Eof => {
                self.insert_html_element(&synthetic_tag(atoms::BODY), ctx);
                self.mode = InsertionMode::InBody;
                Reprocess(TbToken::Eof)
            }
        }
    }

    fn mode_in_body<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Text(text, _) => {
                self.reconstruct_active_formatting(ctx);
                if text.chars().any(|ch| !is_ws(ch)) {
                    self.frameset_ok = false;
                }
                self.insert_text(&text);
                Done
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) => self.in_body_start_tag(tag, ctx),
            TbToken::End(tag) => self.in_body_end_tag(tag, ctx),
            TbToken::Eof => {
                let ok_unclosed = [
                    atoms::DD,
                    atoms::DT,
                    atoms::LI,
                    atoms::OPTGROUP,
                    atoms::OPTION,
                    atoms::P,
                    atoms::RB,
                    atoms::RP,
                    atoms::RT,
                    atoms::RTC,
                    atoms::TBODY,
                    atoms::TD,
                    atoms::TFOOT,
                    atoms::TH,
                    atoms::THEAD,
                    atoms::TR,
                    atoms::BODY,
                    atoms::HTML,
                ];
                if self.stack.items().iter().any(|entry| {
                    entry.ns == Namespace::Html && !ok_unclosed.contains(&entry.name)
                }) {
                    ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedEof, 0);
                }
                self.stop_parsing();
                Done
            }
        }
    }

    fn in_body_start_tag<'i>(
        &mut self,
        tag: TagData,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match tag.name {
            HTML => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                let has_template = self
                    .stack
                    .items()
                    .iter()
                    .any(|e| e.ns == Namespace::Html && e.name == TEMPLATE);
                if !has_template && !self.stack.is_empty() {
                    let html = self.stack.get(0).node;
                    let attrs = tag
                        .attrs
                        .iter()
                        .map(|(name, value)| Attr {
                            ns: None,
                            name: ctx.atoms.resolve(*name).to_string(),
                            value: value.clone(),
                        })
                        .collect();
                    self.doc.add_missing_attrs(html, attrs);
                }
                Done
            }
            BASE | BASEFONT | BGSOUND | LINK | META | NOFRAMES | SCRIPT | STYLE | TEMPLATE
            | TITLE => self.mode_in_head(TbToken::Start(tag), ctx),
            BODY => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                let body_is_second = self.stack.len() >= 2 && {
                    let second = self.stack.get(1);
                    second.ns == Namespace::Html && second.name == BODY
                };
                let has_template = self
                    .stack
                    .items()
                    .iter()
                    .any(|e| e.ns == Namespace::Html && e.name == TEMPLATE);
                if body_is_second && !has_template {
                    self.frameset_ok = false;
                    let body = self.stack.get(1).node;
                    let attrs = tag
                        .attrs
                        .iter()
                        .map(|(name, value)| Attr {
                            ns: None,
                            name: ctx.atoms.resolve(*name).to_string(),
                            value: value.clone(),
                        })
                        .collect();
                    self.doc.add_missing_attrs(body, attrs);
                }
                Done
            }
            FRAMESET => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                let body_is_second = self.stack.len() >= 2 && {
                    let second = self.stack.get(1);
                    second.ns == Namespace::Html && second.name == BODY
                };
                if !body_is_second || !self.frameset_ok {
                    return Done;
                }
                let body = self.stack.get(1).node;
                self.doc.detach(body);
                self.stack.truncate(1);
                self.insert_html_element(&tag, ctx);
                self.mode = InsertionMode::InFrameset;
                Done
            }
            ADDRESS | ARTICLE | ASIDE | BLOCKQUOTE | CENTER | DETAILS | DIALOG | DIR | DIV | DL
            | FIELDSET | FIGCAPTION | FIGURE | FOOTER | HEADER | HGROUP | MAIN | MENU | NAV
            | OL | P | SEARCH | SECTION | SUMMARY | UL => {
                self.close_p_if_in_button_scope(ctx);
                self.insert_html_element(&tag, ctx);
                Done
            }
            name if tag_sets::is_heading(name) => {
                self.close_p_if_in_button_scope(ctx);
                if self
                    .stack
                    .current()
                    .is_some_and(|e| e.ns == Namespace::Html && tag_sets::is_heading(e.name))
                {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                    self.stack.pop();
                }
                self.insert_html_element(&tag, ctx);
                Done
            }
            PRE | LISTING => {
                self.close_p_if_in_button_scope(ctx);
                self.insert_html_element(&tag, ctx);
                self.skip_newline = true;
                self.frameset_ok = false;
                Done
            }
            FORM => {
                if self.form.is_some() {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.close_p_if_in_button_scope(ctx);
                let node = self.insert_html_element(&tag, ctx);
                self.form = Some(node);
                Done
            }
            LI => {
                self.frameset_ok = false;
                for index in (0..self.stack.len()).rev() {
                    let entry = self.stack.get(index);
                    if entry.ns == Namespace::Html && entry.name == LI {
                        self.generate_implied_end_tags(Some(LI));
                        if self.stack.current().map(|e| e.name) != Some(LI) {
                            ctx.report(
                                ErrorOrigin::TreeBuilder,
                                ParseErrorCode::MisnestedTag,
                                tag.span.start,
                            );
                        }
                        self.stack.pop_until_name_inclusive(LI);
                        break;
                    }
                    if tag_sets::is_special(entry.ns, entry.name)
                        && !(entry.ns == Namespace::Html
                            && matches!(entry.name, ADDRESS | DIV | P))
                    {
                        break;
                    }
                }
                self.close_p_if_in_button_scope(ctx);
                self.insert_html_element(&tag, ctx);
                Done
            }
            DD | DT => {
                self.frameset_ok = false;
                for index in (0..self.stack.len()).rev() {
                    let entry = self.stack.get(index);
                    if entry.ns == Namespace::Html && matches!(entry.name, DD | DT) {
                        let target = entry.name;
                        self.generate_implied_end_tags(Some(target));
                        if self.stack.current().map(|e| e.name) != Some(target) {
                            ctx.report(
                                ErrorOrigin::TreeBuilder,
                                ParseErrorCode::MisnestedTag,
                                tag.span.start,
                            );
                        }
                        self.stack.pop_until_name_inclusive(target);
                        break;
                    }
                    if tag_sets::is_special(entry.ns, entry.name)
                        && !(entry.ns == Namespace::Html
                            && matches!(entry.name, ADDRESS | DIV | P))
                    {
                        break;
                    }
                }
                self.close_p_if_in_button_scope(ctx);
                self.insert_html_element(&tag, ctx);
                Done
            }
            PLAINTEXT => {
                self.close_p_if_in_button_scope(ctx);
                self.insert_html_element(&tag, ctx);
                self.directive = Some(ContentModel::Plaintext);
                Done
            }
            BUTTON => {
                if self.stack.has_in_scope(BUTTON, ScopeKind::Default) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                    self.generate_implied_end_tags(None);
                    self.stack.pop_until_name_inclusive(BUTTON);
                }
                self.reconstruct_active_formatting(ctx);
                self.insert_html_element(&tag, ctx);
                self.frameset_ok = false;
                Done
            }
            A => {
                if let Some((_, node)) = self.formatting.last_element_with_name_before_marker(A) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                    self.run_adoption_agency(A, ctx);
                    self.formatting.remove_node(node);
                    self.stack.remove_node(node);
                }
                self.reconstruct_active_formatting(ctx);
                let node = self.insert_html_element(&tag, ctx);
                self.formatting
                    .push_element(node, tag.name, Namespace::Html, tag.attrs.clone());
                Done
            }
            B | BIG | CODE | EM | FONT | I | S | SMALL | STRIKE | STRONG | TT | U => {
                self.reconstruct_active_formatting(ctx);
                let node = self.insert_html_element(&tag, ctx);
                self.formatting
                    .push_element(node, tag.name, Namespace::Html, tag.attrs.clone());
                Done
            }
            NOBR => {
                self.reconstruct_active_formatting(ctx);
                if self.stack.has_in_scope(NOBR, ScopeKind::Default) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                    self.run_adoption_agency(NOBR, ctx);
                    self.reconstruct_active_formatting(ctx);
                }
                let node = self.insert_html_element(&tag, ctx);
                self.formatting
                    .push_element(node, tag.name, Namespace::Html, tag.attrs.clone());
                Done
            }
            APPLET | MARQUEE | OBJECT => {
                self.reconstruct_active_formatting(ctx);
                self.insert_html_element(&tag, ctx);
                self.formatting.push_marker();
                self.frameset_ok = false;
                Done
            }
            TABLE => {
                if self.doc.quirks_mode() != QuirksMode::Quirks {
                    self.close_p_if_in_button_scope(ctx);
                }
                self.insert_html_element(&tag, ctx);
                self.frameset_ok = false;
                self.mode = InsertionMode::InTable;
                Done
            }
            AREA | BR | EMBED | IMG | KEYGEN | WBR => {
                self.reconstruct_active_formatting(ctx);
                self.insert_html_element(&tag, ctx);
                self.stack.pop();
                self.frameset_ok = false;
                Done
            }
            INPUT => {
                self.reconstruct_active_formatting(ctx);
                let hidden = tag
                    .attrs
                    .iter()
                    .find(|(name, _)| *name == TYPE)
                    .is_some_and(|(_, value)| value.eq_ignore_ascii_case("hidden"));
                self.insert_html_element(&tag, ctx);
                self.stack.pop();
                if !hidden {
                    self.frameset_ok = false;
                }
                Done
            }
            PARAM | SOURCE | TRACK => {
                self.insert_html_element(&tag, ctx);
                self.stack.pop();
                Done
            }
            HR => {
                self.close_p_if_in_button_scope(ctx);
                self.insert_html_element(&tag, ctx);
                self.stack.pop();
                self.frameset_ok = false;
                Done
            }
            IMAGE => {
                // Tokenizer-era legacy: rewrite to img and reprocess.
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Reprocess(TbToken::Start(TagData { name: IMG, ..tag }))
            }
            TEXTAREA => {
                self.insert_html_element(&tag, ctx);
                self.skip_newline = true;
                self.directive = Some(ContentModel::Rcdata);
                self.original_mode = self.mode;
                self.frameset_ok = false;
                self.mode = InsertionMode::Text;
                Done
            }
            XMP => {
                self.close_p_if_in_button_scope(ctx);
                self.reconstruct_active_formatting(ctx);
                self.frameset_ok = false;
                self.generic_parse_element(&tag, ContentModel::RawText, ctx);
                Done
            }
            IFRAME => {
                self.frameset_ok = false;
                self.generic_parse_element(&tag, ContentModel::RawText, ctx);
                Done
            }
            NOEMBED => {
                self.generic_parse_element(&tag, ContentModel::RawText, ctx);
                Done
            }
            NOSCRIPT if self.config.scripting_enabled => {
                self.generic_parse_element(&tag, ContentModel::RawText, ctx);
                Done
            }
            SELECT => {
                self.reconstruct_active_formatting(ctx);
                self.insert_html_element(&tag, ctx);
                self.frameset_ok = false;
                self.mode = if matches!(
                    self.mode,
                    InsertionMode::InTable
                        | InsertionMode::InCaption
                        | InsertionMode::InTableBody
                        | InsertionMode::InRow
                        | InsertionMode::InCell
                ) {
                    InsertionMode::InSelectInTable
                } else {
                    InsertionMode::InSelect
                };
                Done
            }
            OPTGROUP | OPTION => {
                if self.stack.current().map(|e| e.name) == Some(OPTION) {
                    self.stack.pop();
                }
                self.reconstruct_active_formatting(ctx);
                self.insert_html_element(&tag, ctx);
                Done
            }
            RB | RTC => {
                if self.stack.has_in_scope(RUBY, ScopeKind::Default) {
                    self.generate_implied_end_tags(None);
                    if self.stack.current().map(|e| e.name) != Some(RUBY) {
                        ctx.report(
                            ErrorOrigin::TreeBuilder,
                            ParseErrorCode::MisnestedTag,
                            tag.span.start,
                        );
                    }
                }
                self.insert_html_element(&tag, ctx);
                Done
            }
            RP | RT => {
                if self.stack.has_in_scope(RUBY, ScopeKind::Default) {
                    self.generate_implied_end_tags(Some(RTC));
                    if !matches!(
                        self.stack.current().map(|e| e.name),
                        Some(RTC) | Some(RUBY)
                    ) {
                        ctx.report(
                            ErrorOrigin::TreeBuilder,
                            ParseErrorCode::MisnestedTag,
                            tag.span.start,
                        );
                    }
                }
                self.insert_html_element(&tag, ctx);
                Done
            }
            MATH => {
                self.reconstruct_active_formatting(ctx);
                self.insert_foreign_element(&tag, Namespace::MathMl, ctx);
                if tag.self_closing {
                    self.stack.pop();
                }
                Done
            }
            SVG => {
                self.reconstruct_active_formatting(ctx);
                self.insert_foreign_element(&tag, Namespace::Svg, ctx);
                if tag.self_closing {
                    self.stack.pop();
                }
                Done
            }
            CAPTION | COL | COLGROUP | FRAME | HEAD | TBODY | TD | TFOOT | TH | THEAD | TR => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            _ => {
                self.reconstruct_active_formatting(ctx);
                if tag.self_closing {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::NonVoidSelfClosingTag,
                        tag.span.start,
                    );
                }
                self.insert_html_element(&tag, ctx);
                Done
            }
        }
    }

    fn in_body_end_tag<'i>(
        &mut self,
        tag: TagData,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match tag.name {
            TEMPLATE => self.mode_in_head(TbToken::End(tag), ctx),
            BODY => {
                if !self.stack.has_in_scope(BODY, ScopeKind::Default) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.check_body_end_unclosed(ctx);
                self.mode = InsertionMode::AfterBody;
                Done
            }
            HTML => {
                if !self.stack.has_in_scope(BODY, ScopeKind::Default) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.check_body_end_unclosed(ctx);
                self.mode = InsertionMode::AfterBody;
                Reprocess(TbToken::End(tag))
            }
            ADDRESS | ARTICLE | ASIDE | BLOCKQUOTE | BUTTON | CENTER | DETAILS | DIALOG | DIR
            | DIV | DL | FIELDSET | FIGCAPTION | FIGURE | FOOTER | HEADER | HGROUP | LISTING
            | MAIN | MENU | NAV | OL | PRE | SEARCH | SECTION | SUMMARY | UL => {
                if !self.stack.has_in_scope(tag.name, ScopeKind::Default) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(None);
                if self.stack.current().map(|e| e.name) != Some(tag.name) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                self.stack.pop_until_name_inclusive(tag.name);
                Done
            }
            FORM => {
                let node = self.form.take();
                let Some(node) = node else {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                };
                if !self.stack.has_node_in_scope(node, ScopeKind::Default) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(None);
                if self.stack.current().map(|e| e.node) != Some(node) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                self.stack.remove_node(node);
                Done
            }
            P => {
                if !self.stack.has_in_scope(P, ScopeKind::Button) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    self.insert_html_element(&synthetic_tag(P), ctx);
                }
                self.close_p_element(ctx);
                Done
            }
            LI => {
                if !self.stack.has_in_scope(LI, ScopeKind::ListItem) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(Some(LI));
                if self.stack.current().map(|e| e.name) != Some(LI) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                self.stack.pop_until_name_inclusive(LI);
                Done
            }
            DD | DT => {
                if !self.stack.has_in_scope(tag.name, ScopeKind::Default) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(Some(tag.name));
                if self.stack.current().map(|e| e.name) != Some(tag.name) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                self.stack.pop_until_name_inclusive(tag.name);
                Done
            }
            name if tag_sets::is_heading(name) => {
                let headings = [H1, H2, H3, H4, H5, H6];
                if !self.stack.has_any_in_scope(&headings, ScopeKind::Default) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(None);
                if self.stack.current().map(|e| e.name) != Some(name) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                self.stack.pop_until_any_inclusive(&headings);
                Done
            }
            A | B | BIG | CODE | EM | FONT | I | NOBR | S | SMALL | STRIKE | STRONG | TT | U => {
                self.run_adoption_agency(tag.name, ctx);
                Done
            }
            APPLET | MARQUEE | OBJECT => {
                if !self.stack.has_in_scope(tag.name, ScopeKind::Default) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(None);
                if self.stack.current().map(|e| e.name) != Some(tag.name) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                self.stack.pop_until_name_inclusive(tag.name);
                self.formatting.clear_to_last_marker();
                Done
            }
            BR => {
                // Treated as a br start tag with the attributes dropped.
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                self.reconstruct_active_formatting(ctx);
                self.insert_html_element(&synthetic_tag(BR), ctx);
                self.stack.pop();
                self.frameset_ok = false;
                Done
            }
            _ => {
                self.any_other_end_tag(&tag, ctx);
                Done
            }
        }
    }

    fn check_body_end_unclosed(&mut self, ctx: &mut DocumentParseContext) {
        let ok_unclosed = [
            atoms::DD,
            atoms::DT,
            atoms::LI,
            atoms::OPTGROUP,
            atoms::OPTION,
            atoms::P,
            atoms::RB,
            atoms::RP,
            atoms::RT,
            atoms::RTC,
            atoms::TBODY,
            atoms::TD,
            atoms::TFOOT,
            atoms::TH,
            atoms::THEAD,
            atoms::TR,
            atoms::BODY,
            atoms::HTML,
        ];
        if self
            .stack
            .items()
            .iter()
            .any(|entry| entry.ns == Namespace::Html && !ok_unclosed.contains(&entry.name))
        {
            ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
        }
    }

    fn mode_text<'i>(&mut self, token: TbToken<'i>, ctx: &mut DocumentParseContext) -> Control<'i> {
        match token {
            TbToken::Text(text, _) => {
                self.insert_text(&text);
                Done
            }
            TbToken::Eof => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedEof, 0);
                self.stack.pop();
                self.mode = self.original_mode;
                Reprocess(TbToken::Eof)
            }
            TbToken::End(_) => {
                self.stack.pop();
                self.mode = self.original_mode;
                Done
            }
            // Raw content models cannot produce other tokens.
            _ => Done,
        }
    }

    fn current_is_table_context(&self) -> bool {
        self.stack.current().is_some_and(|entry| {
            entry.ns == Namespace::Html
                && matches!(
                    entry.name,
                    atoms::TABLE | atoms::TBODY | atoms::TFOOT | atoms::THEAD | atoms::TR
                )
        })
    }

    fn mode_in_table<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::Text(text, span) if self.current_is_table_context() => {
                self.pending_table_text.clear();
                self.pending_table_text_non_ws = false;
                self.original_mode = self.mode;
                self.mode = InsertionMode::InTableText;
                Reprocess(TbToken::Text(text, span))
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) => match tag.name {
                CAPTION => {
                    self.clear_stack_to_table_context();
                    self.formatting.push_marker();
                    self.insert_html_element(&tag, ctx);
                    self.mode = InsertionMode::InCaption;
                    Done
                }
                COLGROUP => {
                    self.clear_stack_to_table_context();
                    self.insert_html_element(&tag, ctx);
                    self.mode = InsertionMode::InColumnGroup;
                    Done
                }
                COL => {
                    self.clear_stack_to_table_context();
                    self.insert_html_element(&synthetic_tag(COLGROUP), ctx);
                    self.mode = InsertionMode::InColumnGroup;
                    Reprocess(TbToken::Start(tag))
                }
                TBODY | TFOOT | THEAD => {
                    self.clear_stack_to_table_context();
                    self.insert_html_element(&tag, ctx);
                    self.mode = InsertionMode::InTableBody;
                    Done
                }
                TD | TH | TR => {
                    self.clear_stack_to_table_context();
                    self.insert_html_element(&synthetic_tag(TBODY), ctx);
                    self.mode = InsertionMode::InTableBody;
                    Reprocess(TbToken::Start(tag))
                }
                TABLE => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                    if !self.stack.has_in_scope(TABLE, ScopeKind::Table) {
                        return Done;
                    }
                    self.stack.pop_until_name_inclusive(TABLE);
                    self.reset_insertion_mode();
                    Reprocess(TbToken::Start(tag))
                }
                STYLE | SCRIPT | TEMPLATE => self.mode_in_head(TbToken::Start(tag), ctx),
                INPUT => {
                    let hidden = tag
                        .attrs
                        .iter()
                        .find(|(name, _)| *name == TYPE)
                        .is_some_and(|(_, value)| value.eq_ignore_ascii_case("hidden"));
                    if !hidden {
                        return self.in_table_anything_else(TbToken::Start(tag), ctx);
                    }
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    self.insert_html_element(&tag, ctx);
                    self.stack.pop();
                    Done
                }
                FORM => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    if self.form.is_none() {
                        let node = self.insert_html_element(&tag, ctx);
                        self.form = Some(node);
                        self.stack.pop();
                    }
                    Done
                }
                _ => self.in_table_anything_else(TbToken::Start(tag), ctx),
            },
            TbToken::End(tag) => match tag.name {
                TABLE => {
                    if !self.stack.has_in_scope(TABLE, ScopeKind::Table) {
                        ctx.report(
                            ErrorOrigin::TreeBuilder,
                            ParseErrorCode::UnexpectedToken,
                            tag.span.start,
                        );
                        return Done;
                    }
                    self.stack.pop_until_name_inclusive(TABLE);
                    self.reset_insertion_mode();
                    Done
                }
                BODY | CAPTION | COL | COLGROUP | HTML | TBODY | TD | TFOOT | TH | THEAD | TR => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    Done
                }
                TEMPLATE => self.mode_in_head(TbToken::End(tag), ctx),
                _ => self.in_table_anything_else(TbToken::End(tag), ctx),
            },
            TbToken::Eof => self.mode_in_body(TbToken::Eof, ctx),
            other => self.in_table_anything_else(other, ctx),
        }
    }

    /// InTable "anything else": process via in-body with foster parenting.
    fn in_table_anything_else<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
        self.foster_parenting = true;
        let control = self.mode_in_body(token, ctx);
        self.foster_parenting = false;
        control
    }

    fn mode_in_table_text<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Text(text, _) => {
                if text.chars().any(|ch| !is_ws(ch)) {
                    self.pending_table_text_non_ws = true;
                }
                self.pending_table_text.push_str(&text);
                Done
            }
            other => {
                self.flush_pending_table_text(ctx);
                self.mode = self.original_mode;
                Reprocess(other)
            }
        }
    }

    fn flush_pending_table_text(&mut self, ctx: &mut DocumentParseContext) {
        let text = std::mem::take(&mut self.pending_table_text);
        if text.is_empty() {
            return;
        }
        if self.pending_table_text_non_ws {
            ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
            self.foster_parenting = true;
            self.reconstruct_active_formatting(ctx);
            self.insert_text(&text);
            self.frameset_ok = false;
            self.foster_parenting = false;
        } else {
            self.insert_text(&text);
        }
        self.pending_table_text_non_ws = false;
    }

    fn mode_in_caption<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::End(tag) if tag.name == CAPTION => {
                if !self.stack.has_in_scope(CAPTION, ScopeKind::Table) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(None);
                if self.stack.current().map(|e| e.name) != Some(CAPTION) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                self.stack.pop_until_name_inclusive(CAPTION);
                self.formatting.clear_to_last_marker();
                self.mode = InsertionMode::InTable;
                Done
            }
            TbToken::Start(tag)
                if matches!(
                    tag.name,
                    CAPTION | COL | COLGROUP | TBODY | TD | TFOOT | TH | THEAD | TR
                ) =>
            {
                if !self.stack.has_in_scope(CAPTION, ScopeKind::Table) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(None);
                self.stack.pop_until_name_inclusive(CAPTION);
                self.formatting.clear_to_last_marker();
                self.mode = InsertionMode::InTable;
                Reprocess(TbToken::Start(tag))
            }
            TbToken::End(tag) if tag.name == TABLE => {
                if !self.stack.has_in_scope(CAPTION, ScopeKind::Table) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(None);
                self.stack.pop_until_name_inclusive(CAPTION);
                self.formatting.clear_to_last_marker();
                self.mode = InsertionMode::InTable;
                Reprocess(TbToken::End(tag))
            }
            TbToken::End(tag)
                if matches!(
                    tag.name,
                    BODY | COL | COLGROUP | HTML | TBODY | TD | TFOOT | TH | THEAD | TR
                ) =>
            {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            other => self.mode_in_body(other, ctx),
        }
    }

    fn mode_in_column_group<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    self.insert_text(&text);
                    return Done;
                }
                let (prefix, rest) = split_cow_at(text, ws);
                if !prefix.is_empty() {
                    self.insert_text(&prefix);
                }
                if self.stack.current().map(|e| e.name) != Some(COLGROUP) {
                    ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                    return Done;
                }
                self.stack.pop();
                self.mode = InsertionMode::InTable;
                Reprocess(TbToken::Text(rest, span_from(span, ws)))
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) if tag.name == HTML => self.mode_in_body(TbToken::Start(tag), ctx),
            TbToken::Start(tag) if tag.name == COL => {
                self.insert_html_element(&tag, ctx);
                self.stack.pop();
                Done
            }
            TbToken::End(tag) if tag.name == COLGROUP => {
                if self.stack.current().map(|e| e.name) != Some(COLGROUP) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.stack.pop();
                self.mode = InsertionMode::InTable;
                Done
            }
            TbToken::End(tag) if tag.name == COL => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            TbToken::Start(tag) if tag.name == TEMPLATE => {
                self.mode_in_head(TbToken::Start(tag), ctx)
            }
            TbToken::End(tag) if tag.name == TEMPLATE => {
                self.mode_in_head(TbToken::End(tag), ctx)
            }
            TbToken::Eof => self.mode_in_body(TbToken::Eof, ctx),
            other => {
                if self.stack.current().map(|e| e.name) != Some(COLGROUP) {
                    ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                    return Done;
                }
                self.stack.pop();
                self.mode = InsertionMode::InTable;
                Reprocess(other)
            }
        }
    }

    fn mode_in_table_body<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::Start(tag) if tag.name == TR => {
                self.clear_stack_to_table_body_context();
                self.insert_html_element(&tag, ctx);
                self.mode = InsertionMode::InRow;
                Done
            }
            TbToken::Start(tag) if matches!(tag.name, TH | TD) => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                self.clear_stack_to_table_body_context();
                self.insert_html_element(&synthetic_tag(TR), ctx);
                self.mode = InsertionMode::InRow;
                Reprocess(TbToken::Start(tag))
            }
            TbToken::End(tag) if matches!(tag.name, TBODY | TFOOT | THEAD) => {
                if !self.stack.has_in_scope(tag.name, ScopeKind::Table) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.clear_stack_to_table_body_context();
                self.stack.pop();
                self.mode = InsertionMode::InTable;
                Done
            }
            TbToken::Start(tag)
                if matches!(tag.name, CAPTION | COL | COLGROUP | TBODY | TFOOT | THEAD) =>
            {
                self.table_body_exit(TbToken::Start(tag), ctx)
            }
            TbToken::End(tag) if tag.name == TABLE => {
                self.table_body_exit(TbToken::End(tag), ctx)
            }
            TbToken::End(tag)
                if matches!(
                    tag.name,
                    BODY | CAPTION | COL | COLGROUP | HTML | TD | TH | TR
                ) =>
            {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            other => self.mode_in_table(other, ctx),
        }
    }

    fn table_body_exit<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        if !self
            .stack
            .has_any_in_scope(&[TBODY, THEAD, TFOOT], ScopeKind::Table)
        {
            ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
            return Done;
        }
        self.clear_stack_to_table_body_context();
        self.stack.pop();
        self.mode = InsertionMode::InTable;
        Reprocess(token)
    }

    fn mode_in_row<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::Start(tag) if matches!(tag.name, TD | TH) => {
                self.clear_stack_to_table_row_context();
                self.insert_html_element(&tag, ctx);
                self.mode = InsertionMode::InCell;
                self.formatting.push_marker();
                Done
            }
            TbToken::End(tag) if tag.name == TR => {
                if !self.stack.has_in_scope(TR, ScopeKind::Table) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.clear_stack_to_table_row_context();
                self.stack.pop();
                self.mode = InsertionMode::InTableBody;
                Done
            }
            TbToken::Start(tag)
                if matches!(tag.name, CAPTION | COL | COLGROUP | TBODY | TFOOT | THEAD | TR) =>
            {
                self.row_exit(TbToken::Start(tag), ctx)
            }
            TbToken::End(tag) if tag.name == TABLE => self.row_exit(TbToken::End(tag), ctx),
            TbToken::End(tag) if matches!(tag.name, TBODY | TFOOT | THEAD) => {
                if !self.stack.has_in_scope(tag.name, ScopeKind::Table) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                if !self.stack.has_in_scope(TR, ScopeKind::Table) {
                    return Done;
                }
                self.clear_stack_to_table_row_context();
                self.stack.pop();
                self.mode = InsertionMode::InTableBody;
                Reprocess(TbToken::End(tag))
            }
            TbToken::End(tag)
                if matches!(tag.name, BODY | CAPTION | COL | COLGROUP | HTML | TD | TH) =>
            {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            other => self.mode_in_table(other, ctx),
        }
    }

    fn row_exit<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        if !self.stack.has_in_scope(TR, ScopeKind::Table) {
            ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
            return Done;
        }
        self.clear_stack_to_table_row_context();
        self.stack.pop();
        self.mode = InsertionMode::InTableBody;
        Reprocess(token)
    }

    fn mode_in_cell<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::End(tag) if matches!(tag.name, TD | TH) => {
                if !self.stack.has_in_scope(tag.name, ScopeKind::Table) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.generate_implied_end_tags(None);
                if self.stack.current().map(|e| e.name) != Some(tag.name) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                }
                self.stack.pop_until_name_inclusive(tag.name);
                self.formatting.clear_to_last_marker();
                self.mode = InsertionMode::InRow;
                Done
            }
            TbToken::Start(tag)
                if matches!(
                    tag.name,
                    CAPTION | COL | COLGROUP | TBODY | TD | TFOOT | TH | THEAD | TR
                ) =>
            {
                if !self.stack.has_any_in_scope(&[TD, TH], ScopeKind::Table) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.close_cell(ctx);
                Reprocess(TbToken::Start(tag))
            }
            TbToken::End(tag) if matches!(tag.name, BODY | CAPTION | COL | COLGROUP | HTML) => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            TbToken::End(tag) if matches!(tag.name, TABLE | TBODY | TFOOT | THEAD | TR) => {
                if !self.stack.has_in_scope(tag.name, ScopeKind::Table) {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.close_cell(ctx);
                Reprocess(TbToken::End(tag))
            }
            other => self.mode_in_body(other, ctx),
        }
    }

    fn mode_in_select<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::Text(text, _) => {
                self.insert_text(&text);
                Done
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) => match tag.name {
                HTML => self.mode_in_body(TbToken::Start(tag), ctx),
                OPTION => {
                    if self.stack.current().map(|e| e.name) == Some(OPTION) {
                        self.stack.pop();
                    }
                    self.insert_html_element(&tag, ctx);
                    Done
                }
                OPTGROUP => {
                    if self.stack.current().map(|e| e.name) == Some(OPTION) {
                        self.stack.pop();
                    }
                    if self.stack.current().map(|e| e.name) == Some(OPTGROUP) {
                        self.stack.pop();
                    }
                    self.insert_html_element(&tag, ctx);
                    Done
                }
                HR => {
                    if self.stack.current().map(|e| e.name) == Some(OPTION) {
                        self.stack.pop();
                    }
                    if self.stack.current().map(|e| e.name) == Some(OPTGROUP) {
                        self.stack.pop();
                    }
                    self.insert_html_element(&tag, ctx);
                    self.stack.pop();
                    Done
                }
                SELECT => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                    if self.stack.has_in_scope(SELECT, ScopeKind::Select) {
                        self.stack.pop_until_name_inclusive(SELECT);
                        self.reset_insertion_mode();
                    }
                    Done
                }
                INPUT | KEYGEN | TEXTAREA => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::MisnestedTag,
                        tag.span.start,
                    );
                    if !self.stack.has_in_scope(SELECT, ScopeKind::Select) {
                        return Done;
                    }
                    self.stack.pop_until_name_inclusive(SELECT);
                    self.reset_insertion_mode();
                    Reprocess(TbToken::Start(tag))
                }
                SCRIPT | TEMPLATE => self.mode_in_head(TbToken::Start(tag), ctx),
                _ => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    Done
                }
            },
            TbToken::End(tag) => match tag.name {
                OPTGROUP => {
                    if self.stack.current().map(|e| e.name) == Some(OPTION)
                        && self.stack.len() >= 2
                        && self.stack.get(self.stack.len() - 2).name == OPTGROUP
                    {
                        self.stack.pop();
                    }
                    if self.stack.current().map(|e| e.name) == Some(OPTGROUP) {
                        self.stack.pop();
                    } else {
                        ctx.report(
                            ErrorOrigin::TreeBuilder,
                            ParseErrorCode::UnexpectedToken,
                            tag.span.start,
                        );
                    }
                    Done
                }
                OPTION => {
                    if self.stack.current().map(|e| e.name) == Some(OPTION) {
                        self.stack.pop();
                    } else {
                        ctx.report(
                            ErrorOrigin::TreeBuilder,
                            ParseErrorCode::UnexpectedToken,
                            tag.span.start,
                        );
                    }
                    Done
                }
                SELECT => {
                    if !self.stack.has_in_scope(SELECT, ScopeKind::Select) {
                        ctx.report(
                            ErrorOrigin::TreeBuilder,
                            ParseErrorCode::UnexpectedToken,
                            tag.span.start,
                        );
                        return Done;
                    }
                    self.stack.pop_until_name_inclusive(SELECT);
                    self.reset_insertion_mode();
                    Done
                }
                TEMPLATE => self.mode_in_head(TbToken::End(tag), ctx),
                _ => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    Done
                }
            },
            TbToken::Eof => self.mode_in_body(TbToken::Eof, ctx),
        }
    }

    fn mode_in_select_in_table<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::Start(tag)
                if matches!(
                    tag.name,
                    CAPTION | TABLE | TBODY | TFOOT | THEAD | TR | TD | TH
                ) =>
            {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::MisnestedTag,
                    tag.span.start,
                );
                self.stack.pop_until_name_inclusive(SELECT);
                self.reset_insertion_mode();
                Reprocess(TbToken::Start(tag))
            }
            TbToken::End(tag)
                if matches!(
                    tag.name,
                    CAPTION | TABLE | TBODY | TFOOT | THEAD | TR | TD | TH
                ) =>
            {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::MisnestedTag,
                    tag.span.start,
                );
                if !self.stack.has_in_scope(tag.name, ScopeKind::Table) {
                    return Done;
                }
                self.stack.pop_until_name_inclusive(SELECT);
                self.reset_insertion_mode();
                Reprocess(TbToken::End(tag))
            }
            other => self.mode_in_select(other, ctx),
        }
    }

    /// Structural `<template>` stub: contents parse in place as generic flow.
    fn mode_in_template<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::Start(tag) if tag.name == TEMPLATE => {
                self.mode_in_head(TbToken::Start(tag), ctx)
            }
            TbToken::End(tag) if tag.name == TEMPLATE => self.mode_in_head(TbToken::End(tag), ctx),
            TbToken::Eof => {
                if !self
                    .stack
                    .items()
                    .iter()
                    .any(|e| e.ns == Namespace::Html && e.name == TEMPLATE)
                {
                    self.stop_parsing();
                    return Done;
                }
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedEof, 0);
                self.stack.pop_until_name_inclusive(TEMPLATE);
                self.formatting.clear_to_last_marker();
                self.reset_insertion_mode();
                Reprocess(TbToken::Eof)
            }
            other => self.mode_in_body(other, ctx),
        }
    }

    fn mode_after_body<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    return self.mode_in_body(TbToken::Text(text, span), ctx);
                }
                let (prefix, rest) = split_cow_at(text, ws);
                if !prefix.is_empty() {
                    self.mode_in_body_text_fragment(prefix, ctx);
                }
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                self.mode = InsertionMode::InBody;
                Reprocess(TbToken::Text(rest, span_from(span, ws)))
            }
            TbToken::Comment(text, _) => {
                // As the last child of the html element.
                let root = self
                    .html_root
                    .expect("html root exists by the time AfterBody is reached");
                self.insert_comment_in(root, &text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) if tag.name == atoms::HTML => {
                self.mode_in_body(TbToken::Start(tag), ctx)
            }
            TbToken::End(tag) if tag.name == atoms::HTML => {
                if self.fragment_ctx.is_some() {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.mode = InsertionMode::AfterAfterBody;
                Done
            }
            TbToken::Eof => {
                self.stop_parsing();
                Done
            }
            other => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                self.mode = InsertionMode::InBody;
                Reprocess(other)
            }
        }
    }

    fn mode_in_body_text_fragment(&mut self, text: Cow<'_, str>, ctx: &mut DocumentParseContext) {
        self.reconstruct_active_formatting(ctx);
        self.insert_text(&text);
    }

    fn mode_in_frameset<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::Text(text, _) => {
                let filtered: String = text.chars().filter(|ch| is_ws(*ch)).collect();
                if filtered.len() != text.len() {
                    ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                }
                if !filtered.is_empty() {
                    self.insert_text(&filtered);
                }
                Done
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) => match tag.name {
                HTML => self.mode_in_body(TbToken::Start(tag), ctx),
                FRAMESET => {
                    self.insert_html_element(&tag, ctx);
                    Done
                }
                FRAME => {
                    self.insert_html_element(&tag, ctx);
                    self.stack.pop();
                    Done
                }
                NOFRAMES => self.mode_in_head(TbToken::Start(tag), ctx),
                _ => {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    Done
                }
            },
            TbToken::End(tag) if tag.name == FRAMESET => {
                if self.stack.len() <= 1 {
                    ctx.report(
                        ErrorOrigin::TreeBuilder,
                        ParseErrorCode::UnexpectedToken,
                        tag.span.start,
                    );
                    return Done;
                }
                self.stack.pop();
                if self.fragment_ctx.is_none()
                    && self.stack.current().map(|e| e.name) != Some(FRAMESET)
                {
                    self.mode = InsertionMode::AfterFrameset;
                }
                Done
            }
            TbToken::End(tag) => {
                ctx.report(
                    ErrorOrigin::TreeBuilder,
                    ParseErrorCode::UnexpectedToken,
                    tag.span.start,
                );
                Done
            }
            TbToken::Eof => {
                if self.stack.len() > 1 {
                    ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedEof, 0);
                }
                self.stop_parsing();
                Done
            }
        }
    }

    fn mode_after_frameset<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        use tag_sets::atoms::*;
        match token {
            TbToken::Text(text, _) => {
                let filtered: String = text.chars().filter(|ch| is_ws(*ch)).collect();
                if filtered.len() != text.len() {
                    ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                }
                if !filtered.is_empty() {
                    self.insert_text(&filtered);
                }
                Done
            }
            TbToken::Comment(text, _) => {
                self.insert_comment(&text);
                Done
            }
            TbToken::Doctype { .. } => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedDoctype, 0);
                Done
            }
            TbToken::Start(tag) if tag.name == HTML => self.mode_in_body(TbToken::Start(tag), ctx),
            TbToken::Start(tag) if tag.name == NOFRAMES => {
                self.mode_in_head(TbToken::Start(tag), ctx)
            }
            TbToken::End(tag) if tag.name == HTML => {
                self.mode = InsertionMode::AfterAfterFrameset;
                Done
            }
            TbToken::Eof => {
                self.stop_parsing();
                Done
            }
            other => {
                let _ = other;
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                Done
            }
        }
    }

    fn mode_after_after_body<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Comment(text, _) => {
                let root = self.doc.root();
                self.insert_comment_in(root, &text);
                Done
            }
            TbToken::Doctype { .. } => self.mode_in_body(token, ctx),
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    return self.mode_in_body(TbToken::Text(text, span), ctx);
                }
                let (prefix, rest) = split_cow_at(text, ws);
                if !prefix.is_empty() {
                    self.mode_in_body_text_fragment(prefix, ctx);
                }
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                self.mode = InsertionMode::InBody;
                Reprocess(TbToken::Text(rest, span_from(span, ws)))
            }
            TbToken::Start(tag) if tag.name == atoms::HTML => {
                self.mode_in_body(TbToken::Start(tag), ctx)
            }
            TbToken::Eof => {
                self.stop_parsing();
                Done
            }
            other => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                self.mode = InsertionMode::InBody;
                Reprocess(other)
            }
        }
    }

    fn mode_after_after_frameset<'i>(
        &mut self,
        token: TbToken<'i>,
        ctx: &mut DocumentParseContext,
    ) -> Control<'i> {
        match token {
            TbToken::Comment(text, _) => {
                let root = self.doc.root();
                self.insert_comment_in(root, &text);
                Done
            }
            TbToken::Doctype { .. } => self.mode_in_body(token, ctx),
            TbToken::Text(text, span) => {
                let ws = ws_prefix_len(&text);
                if ws == text.len() {
                    return self.mode_in_body(TbToken::Text(text, span), ctx);
                }
                let (prefix, _) = split_cow_at(text, ws);
                if !prefix.is_empty() {
                    self.mode_in_body_text_fragment(prefix, ctx);
                }
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                Done
            }
            TbToken::Start(tag) if tag.name == atoms::HTML => {
                self.mode_in_body(TbToken::Start(tag), ctx)
            }
            TbToken::Start(tag) if tag.name == atoms::NOFRAMES => {
                self.mode_in_head(TbToken::Start(tag), ctx)
            }
            TbToken::Eof => {
                self.stop_parsing();
                Done
            }
            _ => {
                ctx.report(ErrorOrigin::TreeBuilder, ParseErrorCode::UnexpectedToken, 0);
                Done
            }
        }
    }
}

fn mathml_text_integration_point(ns: Namespace, name: AtomId) -> bool {
    ns == Namespace::MathMl
        && matches!(
            name,
            atoms::MI | atoms::MO | atoms::MN | atoms::MS | atoms::MTEXT
        )
}

fn name_matches_ci(stack_name: AtomId, token_name: AtomId, ctx: &DocumentParseContext) -> bool {
    stack_name == token_name
        || ctx
            .atoms
            .resolve(stack_name)
            .eq_ignore_ascii_case(ctx.atoms.resolve(token_name))
}

/// Start tags that break out of foreign content back into HTML.
fn is_foreign_breakout(tag: &TagData) -> bool {
    use tag_sets::atoms::*;
    if tag.name == FONT {
        return tag
            .attrs
            .iter()
            .any(|(name, _)| matches!(*name, COLOR | FACE | SIZE));
    }
    matches!(
        tag.name,
        B | BIG
            | BLOCKQUOTE
            | BODY
            | BR
            | CENTER
            | CODE
            | DD
            | DIV
            | DL
            | DT
            | EM
            | EMBED
            | H1
            | H2
            | H3
            | H4
            | H5
            | H6
            | HEAD
            | HR
            | I
            | IMG
            | LI
            | LISTING
            | MENU
            | META
            | NOBR
            | OL
            | P
            | PRE
            | RUBY
            | S
            | SMALL
            | SPAN
            | STRONG
            | STRIKE
            | SUB
            | SUP
            | TABLE
            | TT
            | U
            | UL
            | VAR
    )
}
