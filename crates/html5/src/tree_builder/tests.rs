use crate::dom::serialize::snapshot;
use crate::dom::{Namespace, NodeKind, QuirksMode};
use crate::{parse_document, Parser, TreeBuilderConfig};

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

#[test]
fn empty_input_synthesizes_html_head_body() {
    assert_tree("", &["| <html>", "|   <head>", "|   <body>"]);
}

#[test]
fn doctype_and_simple_body_content() {
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
fn missing_doctype_is_quirks_mode() {
    let doc = parse_document("<p>x");
    assert_eq!(doc.quirks_mode(), QuirksMode::Quirks);
    let doc = parse_document("<!doctype html><p>x");
    assert_eq!(doc.quirks_mode(), QuirksMode::NoQuirks);
}

#[test]
fn head_content_goes_to_head() {
    assert_tree(
        "<!doctype html><title>t</title><p>b",
        &[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|     <title>",
            "|       \"t\"",
            "|   <body>",
            "|     <p>",
            "|       \"b\"",
        ],
    );
}

#[test]
fn paragraphs_close_implicitly() {
    assert_tree(
        "<p>1<p>2",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       \"1\"",
            "|     <p>",
            "|       \"2\"",
        ],
    );
}

#[test]
fn list_items_close_implicitly() {
    assert_tree(
        "<ul><li>a<li>b</ul>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <ul>",
            "|       <li>",
            "|         \"a\"",
            "|       <li>",
            "|         \"b\"",
        ],
    );
}

#[test]
fn nested_heading_pops_the_open_one() {
    assert_tree(
        "<h1>a<h2>b",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <h1>",
            "|       \"a\"",
            "|     <h2>",
            "|       \"b\"",
        ],
    );
}

#[test]
fn table_synthesizes_tbody_and_row_structure() {
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
fn table_text_foster_parents_before_the_table() {
    assert_tree(
        "<table>x<td>y</table>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     \"x\"",
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"y\"",
        ],
    );
}

#[test]
fn whitespace_only_table_text_stays_in_the_table() {
    assert_tree(
        "<table>  </table>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       \"  \"",
        ],
    );
}

#[test]
fn adoption_agency_reparents_misnested_formatting() {
    // <p>1<b>2<i>3</b>4</i>5
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
fn adoption_agency_with_furthest_block() {
    // The div is a furthest block: the b clone wraps its contents.
    assert_tree(
        "<b>1<div>2</b>3</div>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       \"1\"",
            "|     <div>",
            "|       <b>",
            "|         \"2\"",
            "|       \"3\"",
        ],
    );
}

#[test]
fn second_anchor_triggers_adoption() {
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

#[test]
fn formatting_reconstructs_across_blocks() {
    assert_tree(
        "<b>1<p>2",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       \"1\"",
            "|     <p>",
            "|       <b>",
            "|         \"2\"",
        ],
    );
}

#[test]
fn duplicate_attributes_drop_later_occurrences() {
    let doc = parse_document("<p a=1 a=2>");
    let p = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("p"))
        .expect("p exists");
    assert_eq!(doc.attrs(p).len(), 1);
    assert_eq!(doc.attr(p, "a"), Some("1"));
}

#[test]
fn html_and_body_merge_missing_attributes() {
    let doc = parse_document("<html lang=en><body class=a><body class=b id=x>");
    let html = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("html"))
        .expect("html");
    assert_eq!(doc.attr(html, "lang"), Some("en"));
    let body = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("body"))
        .expect("body");
    assert_eq!(doc.attr(body, "class"), Some("a"));
    assert_eq!(doc.attr(body, "id"), Some("x"));
}

#[test]
fn textarea_and_pre_swallow_leading_newline() {
    let doc = parse_document("<textarea>\nkeep</textarea>");
    let textarea = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("textarea"))
        .expect("textarea");
    assert_eq!(doc.inner_text(textarea), "keep");

    let doc = parse_document("<pre>\n\nx</pre>");
    let pre = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("pre"))
        .expect("pre");
    assert_eq!(doc.inner_text(pre), "\nx");
}

#[test]
fn select_nests_options_flat() {
    assert_tree(
        "<select><option>a<option>b</select>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <select>",
            "|       <option>",
            "|         \"a\"",
            "|       <option>",
            "|         \"b\"",
        ],
    );
}

#[test]
fn frameset_replaces_body_when_allowed() {
    assert_tree(
        "<!doctype html><frameset><frame></frameset>",
        &[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <frameset>",
            "|     <frame>",
        ],
    );
}

#[test]
fn frameset_after_content_is_ignored() {
    assert_tree(
        "x<frameset>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     \"x\"",
        ],
    );
}

#[test]
fn svg_subtree_is_in_the_svg_namespace() {
    let doc = parse_document("<!doctype html><html><head></head><body><svg><g/></svg></body>");
    let svg = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("svg"))
        .expect("svg");
    assert_eq!(doc.element_namespace(svg), Some(Namespace::Svg));
    let g = doc.first_child(svg).expect("g child");
    assert_eq!(doc.element_name(g), Some("g"));
    assert_eq!(doc.element_namespace(g), Some(Namespace::Svg));
    // Self-closing foreign element has no children.
    assert_eq!(doc.first_child(g), None);
}

#[test]
fn svg_name_and_attribute_case_adjustments() {
    let doc = parse_document("<svg viewbox=\"0 0 1 1\"><foreignobject><p>x</p></foreignobject></svg>");
    let svg = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("svg"))
        .expect("svg");
    assert_eq!(doc.attrs(svg)[0].name, "viewBox");
    let fo = doc.first_child(svg).expect("foreignObject");
    assert_eq!(doc.element_name(fo), Some("foreignObject"));
    // HTML integration point: the p inside is an HTML element.
    let p = doc.first_child(fo).expect("p");
    assert_eq!(doc.element_name(p), Some("p"));
    assert_eq!(doc.element_namespace(p), Some(Namespace::Html));
}

#[test]
fn foreign_breakout_returns_to_html_content() {
    let doc = parse_document("<svg><circle></circle><b>bold</b></svg>");
    let body = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("body"))
        .expect("body");
    let children: Vec<_> = doc.children(body).collect();
    assert_eq!(children.len(), 2);
    assert_eq!(doc.element_name(children[0]), Some("svg"));
    assert_eq!(doc.element_name(children[1]), Some("b"));
    assert_eq!(
        doc.element_namespace(children[1]),
        Some(Namespace::Html)
    );
}

#[test]
fn mathml_text_integration_point_takes_html_text() {
    let doc = parse_document("<math><mi>x</mi></math>");
    let mi = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("mi"))
        .expect("mi");
    assert_eq!(doc.element_namespace(mi), Some(Namespace::MathMl));
    assert_eq!(doc.inner_text(mi), "x");
}

#[test]
fn mathml_definitionurl_is_case_adjusted() {
    let doc = parse_document("<math definitionurl=\"u\"></math>");
    let math = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("math"))
        .expect("math");
    assert_eq!(doc.attrs(math)[0].name, "definitionURL");
}

#[test]
fn xlink_attributes_get_namespaced() {
    let doc = parse_document("<svg><a xlink:href=\"u\"></a></svg>");
    let a = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("a"))
        .expect("a");
    let attr = &doc.attrs(a)[0];
    assert_eq!(attr.name, "href");
    assert_eq!(attr.ns, Some(crate::dom::AttrNamespace::Xlink));
}

#[test]
fn comment_after_body_lands_on_the_html_element() {
    let doc = parse_document("<!doctype html><html><body></body><!--end-->");
    let html = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("html"))
        .expect("html");
    let last = doc.last_child(html).expect("last child");
    assert!(matches!(doc.kind(last), NodeKind::Comment { text } if text == "end"));
}

#[test]
fn depth_cap_drops_start_tags_beyond_the_limit() {
    let input = format!("{}x", "<div>".repeat(20));
    let parser = Parser::with_config(
        &input,
        TreeBuilderConfig {
            scripting_enabled: false,
            max_depth: 8,
        },
    );
    let (doc, errors) = parser.run_with_diagnostics();
    doc.assert_subtree_consistent(doc.root());

    let mut depth = 0usize;
    let mut node = Some(doc.root());
    while let Some(current) = node {
        node = doc.first_child(current);
        depth += 1;
    }
    // document + html + body + 6 divs + text node.
    assert!(depth <= 10, "depth cap not enforced: depth {depth}");
    assert!(errors
        .iter()
        .any(|e| e.code == crate::ParseErrorCode::DepthCapExceeded));
    // The text still lands in the deepest open element.
    let body = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("body"))
        .expect("body");
    assert_eq!(doc.inner_text(body), "x");
}

#[test]
fn button_scope_closes_open_button() {
    assert_tree(
        "<button>a<button>b",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <button>",
            "|       \"a\"",
            "|     <button>",
            "|       \"b\"",
        ],
    );
}

#[test]
fn end_tag_br_acts_like_start_tag() {
    assert_tree(
        "a</br>b",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     \"a\"",
            "|     <br>",
            "|     \"b\"",
        ],
    );
}

#[test]
fn caption_closes_into_table_mode() {
    assert_tree(
        "<table><caption>c</caption><tr><td>x</table>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       <caption>",
            "|         \"c\"",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"x\"",
        ],
    );
}

#[test]
fn colgroup_and_col_structure() {
    assert_tree(
        "<table><col span=2><tr><td>x</table>",
        &[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       <colgroup>",
            "|         <col span=\"2\">",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"x\"",
        ],
    );
}

#[test]
fn plaintext_swallows_the_rest_of_the_input() {
    let doc = parse_document("<plaintext></plaintext><b>");
    let plaintext = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("plaintext"))
        .expect("plaintext");
    assert_eq!(doc.inner_text(plaintext), "</plaintext><b>");
}

#[test]
fn script_content_is_raw_text() {
    let doc = parse_document("<script>if (a < b) {}</script>");
    let script = doc
        .descendants(doc.root())
        .find(|&n| doc.element_name(n) == Some("script"))
        .expect("script");
    assert_eq!(doc.inner_text(script), "if (a < b) {}");
}
