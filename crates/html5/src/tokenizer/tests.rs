use super::{ContentModel, Tokenizer, TokenizerConfig};
use crate::shared::{DocumentParseContext, Input, TextValue, Token};

fn text_value<'a>(value: &'a TextValue, input: &'a Input) -> &'a str {
    match value {
        TextValue::Span(span) => input.slice(*span),
        TextValue::Owned(text) => text,
    }
}

/// Render tokens in a compact single-line format for assertions.
fn render(token: &Token, input: &Input, ctx: &DocumentParseContext) -> String {
    match token {
        Token::Doctype {
            name,
            public_id,
            system_id,
            force_quirks,
        } => {
            let mut out = format!("!{}", name.as_deref().unwrap_or(""));
            if let Some(public) = public_id {
                out.push_str(&format!(" public={public}"));
            }
            if let Some(system) = system_id {
                out.push_str(&format!(" system={system}"));
            }
            if *force_quirks {
                out.push_str(" quirks");
            }
            out
        }
        Token::StartTag {
            name,
            attributes,
            self_closing,
            ..
        } => {
            let mut out = format!("<{}", ctx.atoms.resolve(*name));
            for attr in attributes {
                out.push(' ');
                out.push_str(ctx.atoms.resolve(attr.name));
                if let Some(value) = &attr.value {
                    out.push('=');
                    out.push_str(text_value(value, input));
                }
            }
            if *self_closing {
                out.push('/');
            }
            out.push('>');
            out
        }
        Token::EndTag { name, .. } => format!("</{}>", ctx.atoms.resolve(*name)),
        Token::Text { text, .. } => format!("'{}'", text_value(text, input)),
        Token::Comment { text, .. } => format!("#{}", text_value(text, input)),
        Token::Eof => "eof".to_string(),
    }
}

fn tokenize(input_text: &str) -> Vec<String> {
    let mut ctx = DocumentParseContext::new();
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    let input = Input::from_str(input_text);
    let mut out = Vec::new();
    loop {
        let token = tokenizer.next_token(&input, &mut ctx);
        let done = token.is_eof();
        out.push(render(&token, &input, &ctx));
        if done {
            break;
        }
    }
    out
}

/// Tokenize with the tree-constructor-style content-model nudges applied
/// after each raw-text-family start tag.
fn tokenize_with_nudges(input_text: &str) -> Vec<String> {
    let mut ctx = DocumentParseContext::new();
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    let input = Input::from_str(input_text);
    let mut out = Vec::new();
    loop {
        let token = tokenizer.next_token(&input, &mut ctx);
        let done = token.is_eof();
        if let Token::StartTag { name, .. } = &token {
            match ctx.atoms.resolve(*name) {
                "script" => tokenizer.set_content_model(ContentModel::ScriptData),
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                    tokenizer.set_content_model(ContentModel::RawText)
                }
                "title" | "textarea" => tokenizer.set_content_model(ContentModel::Rcdata),
                "plaintext" => tokenizer.set_content_model(ContentModel::Plaintext),
                _ => {}
            }
        }
        out.push(render(&token, &input, &ctx));
        if done {
            break;
        }
    }
    out
}

#[test]
fn plain_tags_and_text() {
    assert_eq!(
        tokenize("<div>Hello</div>"),
        vec!["<div>", "'Hello'", "</div>", "eof"]
    );
}

#[test]
fn tag_names_fold_to_lowercase() {
    assert_eq!(tokenize("<DiV></DIV>"), vec!["<div>", "</div>", "eof"]);
}

#[test]
fn attributes_quoted_unquoted_and_valueless() {
    assert_eq!(
        tokenize(r#"<input type="button" value='x' disabled checked=yes>"#),
        vec!["<input type=button value=x disabled checked=yes>", "eof"]
    );
}

#[test]
fn duplicate_attributes_keep_the_first() {
    assert_eq!(tokenize("<p a=1 a=2>"), vec!["<p a=1>", "eof"]);
    assert_eq!(tokenize("<p A=1 a=2>"), vec!["<p a=1>", "eof"]);
}

#[test]
fn self_closing_start_tag() {
    assert_eq!(tokenize("<br/>"), vec!["<br/>", "eof"]);
    assert_eq!(tokenize("<img src=x />"), vec!["<img src=x/>", "eof"]);
}

#[test]
fn end_tag_attributes_are_dropped() {
    assert_eq!(tokenize("</div class=x>"), vec!["</div>", "eof"]);
}

#[test]
fn stray_lt_is_text() {
    assert_eq!(tokenize("a < b"), vec!["'a < b'", "eof"]);
    assert_eq!(tokenize("a <"), vec!["'a <'", "eof"]);
    assert_eq!(tokenize("</>x"), vec!["'x'", "eof"]);
}

#[test]
fn named_character_references_decode() {
    assert_eq!(tokenize("&amp;&lt;&gt;"), vec!["'&<>'", "eof"]);
    assert_eq!(tokenize("a&nbsp;b"), vec!["'a\u{00A0}b'", "eof"]);
}

#[test]
fn legacy_named_reference_without_semicolon() {
    assert_eq!(tokenize("&amp stays"), vec!["'& stays'", "eof"]);
    assert_eq!(tokenize("&notit;"), vec!["'\u{00AC}it;'", "eof"]);
    assert_eq!(tokenize("&notin;"), vec!["'\u{2209}'", "eof"]);
}

#[test]
fn unknown_references_pass_through() {
    assert_eq!(tokenize("&unknown;"), vec!["'&unknown;'", "eof"]);
    assert_eq!(tokenize("&"), vec!["'&'", "eof"]);
    assert_eq!(tokenize("&;"), vec!["'&;'", "eof"]);
    assert_eq!(tokenize("&#;"), vec!["'&#;'", "eof"]);
    assert_eq!(tokenize("&#x;"), vec!["'&#x;'", "eof"]);
}

#[test]
fn numeric_references_decode_with_replacement_rules() {
    assert_eq!(tokenize("&#65;&#x41;&#X41;"), vec!["'AAA'", "eof"]);
    // Windows-1252 override range.
    assert_eq!(tokenize("&#x80;"), vec!["'\u{20AC}'", "eof"]);
    assert_eq!(tokenize("&#153;"), vec!["'\u{2122}'", "eof"]);
    // NUL, surrogates and out-of-range map to U+FFFD.
    assert_eq!(tokenize("&#0;"), vec!["'\u{FFFD}'", "eof"]);
    assert_eq!(tokenize("&#xD800;"), vec!["'\u{FFFD}'", "eof"]);
    assert_eq!(tokenize("&#x110000;"), vec!["'\u{FFFD}'", "eof"]);
    // Missing semicolon still decodes (with a diagnostic).
    assert_eq!(tokenize("&#65 x"), vec!["'A x'", "eof"]);
}

#[test]
fn character_references_in_attribute_values() {
    assert_eq!(
        tokenize(r#"<a href="a&amp;b">"#),
        vec!["<a href=a&b>", "eof"]
    );
    // Legacy rule: no expansion when followed by `=` or alphanumeric.
    assert_eq!(
        tokenize(r#"<a href="x&notit">"#),
        vec!["<a href=x&notit>", "eof"]
    );
    assert_eq!(
        tokenize(r#"<a href="x&not=1">"#),
        vec!["<a href=x&not=1>", "eof"]
    );
    // ...but the semicolon form always expands.
    assert_eq!(
        tokenize(r#"<a href="x&not;y">"#),
        vec!["<a href=x\u{00AC}y>", "eof"]
    );
}

#[test]
fn mixed_entity_scenario_from_body_text() {
    assert_eq!(
        tokenize("&amp;&#65;&unknown;"),
        vec!["'&A&unknown;'", "eof"]
    );
}

#[test]
fn comments_basic_and_terminators() {
    assert_eq!(tokenize("<!-- hi -->"), vec!["# hi ", "eof"]);
    assert_eq!(tokenize("<!---->"), vec!["#", "eof"]);
    assert_eq!(tokenize("<!-- a -- b -->"), vec!["# a -- b ", "eof"]);
    assert_eq!(tokenize("<!-- a --!>"), vec!["# a ", "eof"]);
    assert_eq!(tokenize("<!-->"), vec!["#", "eof"]);
    assert_eq!(tokenize("<!--->"), vec!["#", "eof"]);
}

#[test]
fn comment_with_embedded_markup_keeps_raw_data() {
    assert_eq!(tokenize("<!-- <p> & stuff -->"), vec!["# <p> & stuff ", "eof"]);
    assert_eq!(tokenize("<!-- x <!- y -->"), vec!["# x <!- y ", "eof"]);
}

#[test]
fn unterminated_comment_is_emitted_at_eof() {
    assert_eq!(tokenize("<!-- open"), vec!["# open", "eof"]);
    assert_eq!(tokenize("<!-- open -"), vec!["# open ", "eof"]);
    assert_eq!(tokenize("<!-- open --"), vec!["# open ", "eof"]);
}

#[test]
fn bogus_comment_forms() {
    assert_eq!(tokenize("<!x y>"), vec!["#x y", "eof"]);
    assert_eq!(tokenize("<?pi?>"), vec!["#?pi?", "eof"]);
    assert_eq!(tokenize("</%>after"), vec!["#%", "'after'", "eof"]);
}

#[test]
fn doctype_plain() {
    assert_eq!(tokenize("<!DOCTYPE html>"), vec!["!html", "eof"]);
    assert_eq!(tokenize("<!doctype HTML>"), vec!["!html", "eof"]);
}

#[test]
fn doctype_with_public_and_system_ids() {
    assert_eq!(
        tokenize(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#),
        vec![
            "!html public=-//W3C//DTD HTML 4.01//EN system=http://www.w3.org/TR/html4/strict.dtd",
            "eof"
        ]
    );
    assert_eq!(
        tokenize(r#"<!DOCTYPE html SYSTEM 'about:legacy-compat'>"#),
        vec!["!html system=about:legacy-compat", "eof"]
    );
}

#[test]
fn doctype_malformed_forms_force_quirks() {
    assert_eq!(tokenize("<!DOCTYPE>"), vec!["! quirks", "eof"]);
    assert_eq!(tokenize("<!DOCTYPE html PUBLIC>"), vec!["!html quirks", "eof"]);
    assert_eq!(tokenize("<!DOCTYPE html blah>"), vec!["!html quirks", "eof"]);
    assert_eq!(tokenize("<!DOCTYPE html"), vec!["!html quirks", "eof"]);
}

#[test]
fn rawtext_seeks_matching_end_tag_case_insensitively() {
    assert_eq!(
        tokenize_with_nudges("<style>p < q { } </b></StYlE>"),
        vec!["<style>", "'p < q { } </b>'", "</style>", "eof"]
    );
}

#[test]
fn rcdata_decodes_references_but_not_tags() {
    assert_eq!(
        tokenize_with_nudges("<title>a &amp; <b></title>"),
        vec!["<title>", "'a & <b>'", "</title>", "eof"]
    );
}

#[test]
fn script_data_ignores_near_miss_end_tags() {
    assert_eq!(
        tokenize_with_nudges("<script>a</scrip>b</script>"),
        vec!["<script>", "'a</scrip>b'", "</script>", "eof"]
    );
    assert_eq!(
        tokenize_with_nudges("<script>let x = '</scr' + 'ipt>';</script>"),
        vec!["<script>", "'let x = '</scr' + 'ipt>';'", "</script>", "eof"]
    );
}

#[test]
fn script_data_escaped_hides_end_tag_inside_comment() {
    assert_eq!(
        tokenize_with_nudges("<script><!-- </script> --></script>"),
        vec!["<script>", "'<!-- '", "</script>", "' -->'", "eof"]
    );
}

#[test]
fn script_data_double_escaped_swallows_inner_script() {
    assert_eq!(
        tokenize_with_nudges("<script><!--<script></script>--></script>"),
        vec!["<script>", "'<!--<script></script>-->'", "</script>", "eof"]
    );
}

#[test]
fn plaintext_consumes_everything() {
    assert_eq!(
        tokenize_with_nudges("<plaintext></plaintext><div>"),
        vec!["<plaintext>", "'</plaintext><div>'", "eof"]
    );
}

#[test]
fn cdata_is_bogus_comment_in_html_content() {
    assert_eq!(tokenize("<![CDATA[x]]>"), vec!["#[CDATA[x]]", "eof"]);
}

#[test]
fn cdata_is_text_when_allowed() {
    let mut ctx = DocumentParseContext::new();
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    tokenizer.set_cdata_allowed(true);
    let input = Input::from_str("<![CDATA[a ]] b]]>c");
    let mut out = Vec::new();
    loop {
        let token = tokenizer.next_token(&input, &mut ctx);
        let done = token.is_eof();
        out.push(render(&token, &input, &ctx));
        if done {
            break;
        }
    }
    assert_eq!(out, vec!["'a ]] bc'", "eof"]);
}

#[test]
fn bom_is_stripped_and_nul_replaced() {
    assert_eq!(tokenize("\u{FEFF}<p>"), vec!["<p>", "eof"]);
    assert_eq!(tokenize("\0"), vec!["'\u{FFFD}'", "eof"]);
}

#[test]
fn crlf_normalizes_to_lf() {
    assert_eq!(tokenize("a\r\nb\rc"), vec!["'a\nb\nc'", "eof"]);
}

#[test]
fn eof_is_sticky() {
    let mut ctx = DocumentParseContext::new();
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    let input = Input::from_str("x");
    assert!(matches!(
        tokenizer.next_token(&input, &mut ctx),
        Token::Text { .. }
    ));
    assert!(tokenizer.next_token(&input, &mut ctx).is_eof());
    assert!(tokenizer.next_token(&input, &mut ctx).is_eof());
    assert!(tokenizer.next_token(&input, &mut ctx).is_eof());
}

#[test]
fn unterminated_tag_emits_nothing_at_eof() {
    assert_eq!(tokenize("<div"), vec!["eof"]);
    assert_eq!(tokenize("<div class"), vec!["eof"]);
    assert_eq!(tokenize("<div class='x"), vec!["eof"]);
}

#[test]
fn plain_text_tokens_borrow_the_input() {
    let mut ctx = DocumentParseContext::new();
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    let input = Input::from_str("plain run<b>");
    let token = tokenizer.next_token(&input, &mut ctx);
    match token {
        Token::Text { text, .. } => assert!(matches!(text, TextValue::Span(_))),
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn decoded_text_tokens_are_owned() {
    let mut ctx = DocumentParseContext::new();
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    let input = Input::from_str("a&amp;b<i>");
    let token = tokenizer.next_token(&input, &mut ctx);
    match token {
        Token::Text { text, .. } => assert!(matches!(text, TextValue::Owned(_))),
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn token_spans_cover_the_source_range() {
    let mut ctx = DocumentParseContext::new();
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    let input = Input::from_str("ab<div id=x>c");
    let text = tokenizer.next_token(&input, &mut ctx);
    let tag = tokenizer.next_token(&input, &mut ctx);
    match text {
        Token::Text { span, .. } => assert_eq!((span.start, span.end), (0, 2)),
        other => panic!("expected text, got {other:?}"),
    }
    match tag {
        Token::StartTag { span, .. } => assert_eq!((span.start, span.end), (2, 12)),
        other => panic!("expected start tag, got {other:?}"),
    }
}

#[test]
fn tokenizing_adversarial_input_terminates() {
    // No hang on pathological inputs: token count is bounded by input size.
    let samples = [
        "<".repeat(500),
        "&".repeat(500),
        "<!--".repeat(100),
        "</".repeat(300),
        "<a b=".repeat(200),
        "]]>".repeat(100),
    ];
    for sample in &samples {
        let tokens = tokenize(sample);
        assert!(tokens.len() <= sample.len() + 1);
        assert_eq!(tokens.last().map(String::as_str), Some("eof"));
    }
}
