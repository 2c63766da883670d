//! Doctype-driven quirks mode determination.
//!
//! The prefix lists are the exact tables from the tree-construction rules;
//! all comparisons are ASCII case-insensitive.

use crate::dom::QuirksMode;

static QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//Silmaril//dtd html Pro v0r11 19970101//",
    "-//AS//DTD HTML 3.0 asWedit + extensions//",
    "-//AdvaSoft Ltd//DTD HTML 3.0 asWedit + extensions//",
    "-//IETF//DTD HTML 2.0 Level 1//",
    "-//IETF//DTD HTML 2.0 Level 2//",
    "-//IETF//DTD HTML 2.0 Strict Level 1//",
    "-//IETF//DTD HTML 2.0 Strict Level 2//",
    "-//IETF//DTD HTML 2.0 Strict//",
    "-//IETF//DTD HTML 2.0//",
    "-//IETF//DTD HTML 2.1E//",
    "-//IETF//DTD HTML 3.0//",
    "-//IETF//DTD HTML 3.2 Final//",
    "-//IETF//DTD HTML 3.2//",
    "-//IETF//DTD HTML 3//",
    "-//IETF//DTD HTML Level 0//",
    "-//IETF//DTD HTML Level 1//",
    "-//IETF//DTD HTML Level 2//",
    "-//IETF//DTD HTML Level 3//",
    "-//IETF//DTD HTML Strict Level 0//",
    "-//IETF//DTD HTML Strict Level 1//",
    "-//IETF//DTD HTML Strict Level 2//",
    "-//IETF//DTD HTML Strict Level 3//",
    "-//IETF//DTD HTML Strict//",
    "-//IETF//DTD HTML//",
    "-//Metrius//DTD Metrius Presentational//",
    "-//Microsoft//DTD Internet Explorer 2.0 HTML Strict//",
    "-//Microsoft//DTD Internet Explorer 2.0 HTML//",
    "-//Microsoft//DTD Internet Explorer 2.0 Tables//",
    "-//Microsoft//DTD Internet Explorer 3.0 HTML Strict//",
    "-//Microsoft//DTD Internet Explorer 3.0 HTML//",
    "-//Microsoft//DTD Internet Explorer 3.0 Tables//",
    "-//Netscape Comm. Corp.//DTD HTML//",
    "-//Netscape Comm. Corp.//DTD Strict HTML//",
    "-//O'Reilly and Associates//DTD HTML 2.0//",
    "-//O'Reilly and Associates//DTD HTML Extended 1.0//",
    "-//O'Reilly and Associates//DTD HTML Extended Relaxed 1.0//",
    "-//SQ//DTD HTML 2.0 HoTMetaL + extensions//",
    "-//SoftQuad Software//DTD HoTMetaL PRO 6.0::19990601::extensions to HTML 4.0//",
    "-//SoftQuad//DTD HoTMetaL PRO 4.0::19971010::extensions to HTML 4.0//",
    "-//Spyglass//DTD HTML 2.0 Extended//",
    "-//Sun Microsystems Corp.//DTD HotJava HTML//",
    "-//Sun Microsystems Corp.//DTD HotJava Strict HTML//",
    "-//W3C//DTD HTML 3 1995-03-24//",
    "-//W3C//DTD HTML 3.2 Draft//",
    "-//W3C//DTD HTML 3.2 Final//",
    "-//W3C//DTD HTML 3.2//",
    "-//W3C//DTD HTML 3.2S Draft//",
    "-//W3C//DTD HTML 4.0 Frameset//",
    "-//W3C//DTD HTML 4.0 Transitional//",
    "-//W3C//DTD HTML Experimental 19960712//",
    "-//W3C//DTD HTML Experimental 970421//",
    "-//W3C//DTD W3 HTML//",
    "-//W3O//DTD W3 HTML 3.0//",
    "-//WebTechs//DTD Mozilla HTML 2.0//",
    "-//WebTechs//DTD Mozilla HTML//",
];

static QUIRKY_PUBLIC_EXACT: &[&str] = &[
    "-//W3O//DTD W3 HTML Strict 3.0//EN//",
    "-/W3C/DTD HTML 4.0 Transitional/EN",
    "HTML",
];

const QUIRKY_SYSTEM_EXACT: &str = "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd";

static LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//W3C//DTD XHTML 1.0 Frameset//",
    "-//W3C//DTD XHTML 1.0 Transitional//",
];

/// Quirky only when a system identifier is absent.
static QUIRKY_WITHOUT_SYSTEM_PREFIXES: &[&str] = &[
    "-//W3C//DTD HTML 4.01 Frameset//",
    "-//W3C//DTD HTML 4.01 Transitional//",
];

fn ci_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn ci_starts_with(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

pub(crate) fn determine(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> QuirksMode {
    if force_quirks || name != Some("html") {
        return QuirksMode::Quirks;
    }
    if let Some(public) = public_id {
        if QUIRKY_PUBLIC_EXACT.iter().any(|p| ci_eq(public, p)) {
            return QuirksMode::Quirks;
        }
        if QUIRKY_PUBLIC_PREFIXES
            .iter()
            .any(|p| ci_starts_with(public, p))
        {
            return QuirksMode::Quirks;
        }
        if system_id.is_none()
            && QUIRKY_WITHOUT_SYSTEM_PREFIXES
                .iter()
                .any(|p| ci_starts_with(public, p))
        {
            return QuirksMode::Quirks;
        }
        if LIMITED_QUIRKY_PUBLIC_PREFIXES
            .iter()
            .any(|p| ci_starts_with(public, p))
        {
            return QuirksMode::LimitedQuirks;
        }
        if system_id.is_some()
            && QUIRKY_WITHOUT_SYSTEM_PREFIXES
                .iter()
                .any(|p| ci_starts_with(public, p))
        {
            return QuirksMode::LimitedQuirks;
        }
    }
    if let Some(system) = system_id
        && ci_eq(system, QUIRKY_SYSTEM_EXACT)
    {
        return QuirksMode::Quirks;
    }
    QuirksMode::NoQuirks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modern_doctype_is_no_quirks() {
        assert_eq!(determine(Some("html"), None, None, false), QuirksMode::NoQuirks);
        assert_eq!(
            determine(Some("html"), None, Some("about:legacy-compat"), false),
            QuirksMode::NoQuirks
        );
    }

    #[test]
    fn missing_or_wrong_name_is_quirks() {
        assert_eq!(determine(None, None, None, false), QuirksMode::Quirks);
        assert_eq!(determine(Some("xhtml"), None, None, false), QuirksMode::Quirks);
        assert_eq!(determine(Some("html"), None, None, true), QuirksMode::Quirks);
    }

    #[test]
    fn public_prefix_matches_are_case_insensitive() {
        assert_eq!(
            determine(Some("html"), Some("-//w3c//dtd html 3.2//en"), None, false),
            QuirksMode::Quirks
        );
        assert_eq!(
            determine(Some("html"), Some("HTML"), None, false),
            QuirksMode::Quirks
        );
    }

    #[test]
    fn html401_depends_on_system_identifier_presence() {
        let public = Some("-//W3C//DTD HTML 4.01 Transitional//EN");
        assert_eq!(
            determine(Some("html"), public, None, false),
            QuirksMode::Quirks
        );
        assert_eq!(
            determine(
                Some("html"),
                public,
                Some("http://www.w3.org/TR/html4/loose.dtd"),
                false
            ),
            QuirksMode::LimitedQuirks
        );
    }

    #[test]
    fn xhtml_transitional_is_limited_quirks() {
        assert_eq!(
            determine(
                Some("html"),
                Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
                None,
                false
            ),
            QuirksMode::LimitedQuirks
        );
    }

    #[test]
    fn ibm_system_identifier_is_quirks() {
        assert_eq!(
            determine(Some("html"), None, Some(QUIRKY_SYSTEM_EXACT), false),
            QuirksMode::Quirks
        );
    }
}
