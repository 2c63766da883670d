//! Fragment-parsing acceptance: context elements configure the initial
//! insertion mode and the tokenizer content model.

use html5::dom::{Document, Namespace, NodeId};
use html5::{parse_fragment, FragmentContext};

/// The synthetic root the fragment algorithm wraps results in.
fn fragment_root(doc: &Document) -> NodeId {
    doc.children(doc.root())
        .find(|&n| doc.element_name(n) == Some("html"))
        .expect("fragment root")
}

#[test]
fn div_context_parses_flow_content() {
    let doc = parse_fragment("<p>a<p>b", FragmentContext::html("div"));
    let root = fragment_root(&doc);
    let children: Vec<_> = doc.children(root).collect();
    assert_eq!(children.len(), 2);
    assert_eq!(doc.element_name(children[0]), Some("p"));
    assert_eq!(doc.element_name(children[1]), Some("p"));
    assert_eq!(doc.inner_text(children[0]), "a");
    assert_eq!(doc.inner_text(children[1]), "b");
}

#[test]
fn empty_fragment_has_no_children() {
    let doc = parse_fragment("", FragmentContext::html("div"));
    let root = fragment_root(&doc);
    assert_eq!(doc.children(root).count(), 0);
}

#[test]
fn body_and_html_wrappers_are_not_resynthesized() {
    let doc = parse_fragment("x<span>y</span>", FragmentContext::html("body"));
    let root = fragment_root(&doc);
    let children: Vec<_> = doc.children(root).collect();
    assert_eq!(children.len(), 2);
    assert_eq!(doc.inner_text(root), "xy");
}

#[test]
fn title_context_starts_in_rcdata() {
    let doc = parse_fragment("a &amp; <b>", FragmentContext::html("title"));
    let root = fragment_root(&doc);
    assert_eq!(doc.inner_text(root), "a & <b>");
    // No element was created for the <b>.
    assert_eq!(doc.children(root).count(), 1);
}

#[test]
fn script_context_starts_in_script_data() {
    let doc = parse_fragment("if (a < b) {}</script>", FragmentContext::html("script"));
    let root = fragment_root(&doc);
    assert_eq!(doc.inner_text(root), "if (a < b) {}");
}

#[test]
fn table_context_synthesizes_row_structure() {
    let doc = parse_fragment("<tr><td>x</td></tr>", FragmentContext::html("table"));
    let root = fragment_root(&doc);
    let tbody = doc.first_child(root).expect("tbody");
    assert_eq!(doc.element_name(tbody), Some("tbody"));
    let tr = doc.first_child(tbody).expect("tr");
    assert_eq!(doc.element_name(tr), Some("tr"));
    let td = doc.first_child(tr).expect("td");
    assert_eq!(doc.element_name(td), Some("td"));
    assert_eq!(doc.inner_text(td), "x");
}

#[test]
fn tr_context_accepts_cells_directly() {
    let doc = parse_fragment("<td>a</td><td>b</td>", FragmentContext::html("tr"));
    let root = fragment_root(&doc);
    let cells: Vec<_> = doc.children(root).collect();
    assert_eq!(cells.len(), 2);
    assert!(cells
        .iter()
        .all(|&c| doc.element_name(c) == Some("td")));
}

#[test]
fn select_context_filters_to_option_content() {
    let doc = parse_fragment(
        "<option>a</option><div>x</div><option>b",
        FragmentContext::html("select"),
    );
    let root = fragment_root(&doc);
    // The div is dropped; its text is not (character tokens are legal in
    // select content).
    let elements: Vec<_> = doc
        .children(root)
        .filter(|&c| doc.element_name(c).is_some())
        .collect();
    assert_eq!(elements.len(), 2);
    assert!(elements
        .iter()
        .all(|&c| doc.element_name(c) == Some("option")));
}

#[test]
fn foreign_context_keeps_the_namespace() {
    let doc = parse_fragment(
        "<circle r=\"1\"/><text>t</text>",
        FragmentContext {
            name: "svg".to_string(),
            namespace: Namespace::Svg,
        },
    );
    let root = fragment_root(&doc);
    let children: Vec<_> = doc.children(root).collect();
    assert_eq!(children.len(), 2);
    assert_eq!(doc.element_name(children[0]), Some("circle"));
    assert_eq!(doc.element_namespace(children[0]), Some(Namespace::Svg));
    assert_eq!(doc.element_namespace(children[1]), Some(Namespace::Svg));
}

#[test]
fn fragment_trees_uphold_link_invariants() {
    let inputs = [
        ("div", "<p>1<b>2<i>3</b>4</i>5"),
        ("td", "<table><tr><td>x</td></tr></table>"),
        ("select", "<optgroup><option>a"),
        ("textarea", "anything <goes>"),
    ];
    for (context, input) in inputs {
        let doc = parse_fragment(input, FragmentContext::html(context));
        doc.assert_subtree_consistent(doc.root());
    }
}
