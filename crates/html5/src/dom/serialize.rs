//! HTML serialization and deterministic tree snapshots.
//!
//! `to_html` follows the HTML fragment serialization rules closely enough
//! for the round-trip property: reparsing the serialization of a parse
//! result reproduces the same tree (up to the well-known HTML5 round-trip
//! exceptions). `snapshot` is a test-facing rendering; not a stable format.

use super::{AttrNamespace, Document, Namespace, NodeId, NodeKind};
use std::fmt::Write;

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "basefont"
            | "bgsound"
            | "br"
            | "col"
            | "embed"
            | "frame"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Children serialize as literal text (no escaping) for these elements.
fn has_raw_children(name: &str, ns: Namespace) -> bool {
    ns == Namespace::Html
        && matches!(
            name,
            "style" | "script" | "xmp" | "iframe" | "noembed" | "noframes" | "plaintext"
        )
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
}

fn attr_serialized_name(ns: Option<AttrNamespace>, name: &str) -> String {
    match ns {
        None => name.to_string(),
        Some(AttrNamespace::Xlink) => format!("xlink:{name}"),
        Some(AttrNamespace::Xml) => format!("xml:{name}"),
        Some(AttrNamespace::Xmlns) => {
            if name == "xmlns" {
                "xmlns".to_string()
            } else {
                format!("xmlns:{name}")
            }
        }
    }
}

/// Serialize the entire document (children of the document node).
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    for child in doc.children(doc.root()) {
        serialize_node(doc, child, &mut out);
    }
    out
}

/// Serialize the children of `id` (inner HTML).
pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    for child in doc.children(id) {
        serialize_node(doc, child, &mut out);
    }
    out
}

fn serialize_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Document => {
            for child in doc.children(id) {
                serialize_node(doc, child, out);
            }
        }
        NodeKind::Doctype { name, .. } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeKind::Comment { text } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Text { text } => {
            let raw = doc.parent(id).is_some_and(|p| {
                match (doc.element_name(p), doc.element_namespace(p)) {
                    (Some(name), Some(ns)) => has_raw_children(name, ns),
                    _ => false,
                }
            });
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeKind::Element { name, ns, attrs } => {
            out.push('<');
            out.push_str(name);
            for attr in attrs {
                out.push(' ');
                out.push_str(&attr_serialized_name(attr.ns, &attr.name));
                out.push_str("=\"");
                escape_attr(&attr.value, out);
                out.push('"');
            }
            out.push('>');
            if *ns == Namespace::Html && is_void(name) {
                return;
            }
            for child in doc.children(id) {
                serialize_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

/// Deterministic indented rendering for test comparisons.
///
/// Not a public stable format; attribute order is source order.
pub fn snapshot(doc: &Document) -> String {
    let mut out = String::new();
    for child in doc.children(doc.root()) {
        snapshot_node(doc, child, 0, &mut out);
    }
    out
}

fn snapshot_node(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    let _ = write!(out, "| {}", "  ".repeat(depth));
    match doc.kind(id) {
        NodeKind::Document => {}
        NodeKind::Doctype { name, .. } => {
            let _ = writeln!(out, "<!DOCTYPE {name}>");
        }
        NodeKind::Comment { text } => {
            let _ = writeln!(out, "<!-- {text} -->");
        }
        NodeKind::Text { text } => {
            let _ = writeln!(out, "\"{text}\"");
        }
        NodeKind::Element { name, ns, attrs } => {
            let prefix = match ns {
                Namespace::Html => "",
                Namespace::Svg => "svg ",
                Namespace::MathMl => "math ",
            };
            let mut line = format!("<{prefix}{name}");
            for attr in attrs {
                let _ = write!(
                    line,
                    " {}=\"{}\"",
                    attr_serialized_name(attr.ns, &attr.name),
                    attr.value
                );
            }
            let _ = writeln!(out, "{line}>");
            for child in doc.children(id) {
                snapshot_node(doc, child, depth + 1, out);
            }
        }
    }
}
