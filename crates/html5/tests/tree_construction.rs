//! Whole-input acceptance for the tree constructor: the end-to-end
//! scenarios, boundary behaviors, and structural invariants.

use html5::dom::serialize::{snapshot, to_html};
use html5::dom::{Document, NodeId, NodeKind, QuirksMode};
use html5::parse_document;

fn assert_tree(input: &str, expected: &[&str]) {
    let doc = parse_document(input);
    doc.assert_subtree_consistent(doc.root());
    let rendered = snapshot(&doc);
    let expected = expected
        .iter()
        .map(|line| format!("{line}\n"))
        .collect::<String>();
    assert_eq!(rendered, expected, "input: {input}");
}

fn find_element(doc: &Document, name: &str) -> Option<NodeId> {
    doc.descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some(name))
}

// ----- end-to-end scenarios -----

#[test]
fn scenario_doctype_and_input_element() {
    assert_tree(
        "<!doctype html><input type=\"button\">",
        &[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <input type=\"button\">",
        ],
    );
}

#[test]
fn scenario_adoption_agency() {
    assert_tree(
        "<p>1<b>2<i>3</b>4</i>5",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       \"1\"",
            "|       <b>",
            "|         \"2\"",
            "|         <i>",
            "|           \"3\"",
            "|       <i>",
            "|         \"4\"",
            "|       \"5\"",
        ],
    );
}

#[test]
fn scenario_table_with_synthesized_tbody() {
    assert_tree(
        "<table><tr><td>x</td></tr></table>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"x\"",
        ],
    );
}

#[test]
fn scenario_svg_namespace_and_case() {
    let doc =
        parse_document("<!doctype html><html><head></head><body><svg><g/></svg></body>");
    let svg = find_element(&doc, "svg").expect("svg element");
    assert_eq!(
        doc.element_namespace(svg),
        Some(html5::dom::Namespace::Svg)
    );
    let g = doc.first_child(svg).expect("g element");
    assert_eq!(doc.element_name(g), Some("g"));
    assert_eq!(doc.element_namespace(g), Some(html5::dom::Namespace::Svg));
}

#[test]
fn scenario_entity_mix_in_body() {
    let doc = parse_document("&amp;&#65;&unknown;");
    let body = find_element(&doc, "body").expect("body");
    assert_eq!(doc.inner_text(body), "&A&unknown;");
}

#[test]
fn scenario_second_anchor_adoption() {
    assert_tree(
        "<a><b><a>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|       <b>",
            "|     <b>",
            "|       <a>",
        ],
    );
}

// ----- boundary behaviors -----

#[test]
fn empty_input_yields_synthesized_wrappers() {
    let doc = parse_document("");
    let html = find_element(&doc, "html").expect("html");
    let children: Vec<_> = doc.children(html).collect();
    assert_eq!(children.len(), 2);
    assert_eq!(doc.element_name(children[0]), Some("head"));
    assert_eq!(doc.element_name(children[1]), Some("body"));
    assert_eq!(doc.children(children[0]).count(), 0);
    assert_eq!(doc.children(children[1]).count(), 0);
}

#[test]
fn single_nul_becomes_replacement_character_text() {
    let doc = parse_document("\0");
    let body = find_element(&doc, "body").expect("body");
    assert_eq!(doc.inner_text(body), "\u{FFFD}");
}

#[test]
fn duplicate_attributes_keep_first_occurrence() {
    let doc = parse_document("<p a=1 a=2>");
    let p = find_element(&doc, "p").expect("p");
    assert_eq!(doc.attrs(p).len(), 1);
    assert_eq!(doc.attr(p, "a"), Some("1"));
}

// ----- structural invariants -----

static INVARIANT_CORPUS: &[&str] = &[
    "",
    "plain text",
    "<!doctype html><p>hello",
    "<p>1<b>2<i>3</b>4</i>5",
    "<table><tr><td>x</td></tr></table>",
    "<table>x<td>y</table>",
    "<ul><li>a<li>b</ul>",
    "<a><b><a>",
    "<b>1<div>2</b>3</div>",
    "<select><option>a<option>b</select>",
    "<!doctype html><frameset><frame></frameset>",
    "<svg><g/><circle></svg>after",
    "<math><mi>x</mi></math>",
    "<button><p><button>",
    "<h1><h2></h3></h1>",
    "<dl><dd>a<dt>b</dl>",
    "<!-- c --><p>x<!-- d -->",
    "&amp;&#65;&unknown;<p>&notit;",
    "<ruby><rb>a<rt>b</ruby>",
    "<table><caption><p>x<td>y</table>",
];

#[test]
fn document_has_at_most_one_doctype_and_one_root() {
    for input in INVARIANT_CORPUS {
        let doc = parse_document(input);
        let mut doctypes = 0;
        let mut roots = 0;
        for child in doc.children(doc.root()) {
            match doc.kind(child) {
                NodeKind::Doctype { .. } => doctypes += 1,
                NodeKind::Element { .. } => roots += 1,
                _ => {}
            }
        }
        assert!(doctypes <= 1, "input {input:?} produced {doctypes} doctypes");
        assert_eq!(roots, 1, "input {input:?} produced {roots} element roots");

        // html contains exactly one head and exactly one body/frameset.
        let html = doc
            .children(doc.root())
            .find(|&n| doc.element_name(n) == Some("html"))
            .expect("html root");
        let heads = doc
            .children(html)
            .filter(|&n| doc.element_name(n) == Some("head"))
            .count();
        let bodies = doc
            .children(html)
            .filter(|&n| matches!(doc.element_name(n), Some("body") | Some("frameset")))
            .count();
        assert_eq!(heads, 1, "input {input:?}");
        assert_eq!(bodies, 1, "input {input:?}");
    }
}

#[test]
fn every_node_is_reachable_exactly_once_through_sibling_links() {
    for input in INVARIANT_CORPUS {
        let doc = parse_document(input);
        doc.assert_subtree_consistent(doc.root());
        // Each descendant appears exactly once in the traversal.
        let nodes: Vec<_> = doc.descendants(doc.root()).collect();
        let unique: std::collections::HashSet<_> = nodes.iter().copied().collect();
        assert_eq!(nodes.len(), unique.len(), "input {input:?}");
    }
}

#[test]
fn reparsing_the_serialization_is_idempotent() {
    for input in INVARIANT_CORPUS {
        let first = parse_document(input);
        let serialized = to_html(&first);
        let second = parse_document(&serialized);
        let reserialized = to_html(&second);
        assert_eq!(
            serialized, reserialized,
            "round-trip diverged for input {input:?}"
        );
    }
}

#[test]
fn quirks_determination_follows_the_doctype_tables() {
    assert_eq!(parse_document("<p>").quirks_mode(), QuirksMode::Quirks);
    assert_eq!(
        parse_document("<!doctype html>").quirks_mode(),
        QuirksMode::NoQuirks
    );
    assert_eq!(
        parse_document("<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2//EN\">").quirks_mode(),
        QuirksMode::Quirks
    );
    assert_eq!(
        parse_document(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
             \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">"
        )
        .quirks_mode(),
        QuirksMode::LimitedQuirks
    );
}

#[test]
fn diagnostics_do_not_change_the_tree() {
    let input = "<p a=1 a=2>1<b>2<i>3</b>4";
    let silent = to_html(&parse_document(input));
    let (doc, errors) = html5::Parser::new(input).run_with_diagnostics();
    assert!(!errors.is_empty());
    assert_eq!(to_html(&doc), silent);
}

#[test]
fn serializer_matches_known_output() {
    let doc = parse_document("<!doctype html><p class=\"x\">a &amp; b</p>");
    assert_eq!(
        to_html(&doc),
        "<!DOCTYPE html><html><head></head><body><p class=\"x\">a &amp; b</p></body></html>"
    );
}
