//! Named character references and numeric-reference replacement rules.
//!
//! Contract:
//! - `longest_entity_match` implements the longest-match rule as a
//!   binary-search prefix walk: the table is sorted byte-wise (checked by
//!   test), the walk narrows the candidate row range with `partition_point`
//!   as the name grows, and the longest exact hit wins. Semicolon-less
//!   legacy names are present as their own entries, so "&not" inside
//!   "&notanumber" resolves to `¬` exactly when it should.
//! - The table carries the complete legacy (semicolon-optional) name set and
//!   the common semicolon-terminated names. Extending it is purely additive
//!   data (keep it sorted); the lookup does not change.
//! - Numeric references follow the replacement rules: NUL, out-of-range and
//!   surrogate code points become U+FFFD; 0x80–0x9F apply the Windows-1252
//!   override table; control and noncharacter references keep their value
//!   but are flagged as diagnostics.

use crate::shared::ParseErrorCode;

/// Longest named-reference match at the head of `tail` (the text immediately
/// after `&`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityMatch {
    /// Bytes of `tail` consumed by the name (entity names are ASCII).
    pub len: usize,
    pub replacement: &'static str,
    pub has_semicolon: bool,
}

pub fn longest_entity_match(tail: &str) -> Option<EntityMatch> {
    // Candidate names are ASCII alphanumerics with an optional final ';'.
    // Bound the probe so adversarial input cannot make the walk long.
    let bytes = tail.as_bytes();
    let mut probe = 0usize;
    while probe < bytes.len() && probe < MAX_ENTITY_NAME_LEN && bytes[probe].is_ascii_alphanumeric()
    {
        probe += 1;
    }
    if probe == 0 {
        return None;
    }
    let with_semicolon = probe < bytes.len() && bytes[probe] == b';';

    // Prefix walk over the sorted table: `lo..hi` always brackets exactly the
    // rows whose name starts with `tail[..len]`. Extensions of a prefix sort
    // directly after the bare prefix, so the exact legacy hit (if any) is the
    // first row of the range, and the walk stops as soon as the range empties
    // (no longer name can match either).
    let mut lo = 0usize;
    let mut hi = NAMED_ENTITIES.len();
    let mut best: Option<EntityMatch> = None;
    for len in 1..=probe {
        let prefix = &tail[..len];
        lo += NAMED_ENTITIES[lo..hi].partition_point(|&(name, _)| name < prefix);
        hi = lo
            + NAMED_ENTITIES[lo..hi]
                .partition_point(|&(name, _)| name.as_bytes().starts_with(prefix.as_bytes()));
        if lo == hi {
            break;
        }
        let (name, replacement) = NAMED_ENTITIES[lo];
        if name == prefix {
            best = Some(EntityMatch {
                len,
                replacement,
                has_semicolon: false,
            });
        }
        if with_semicolon && len == probe {
            // The semicolon form names the whole run; it beats every legacy
            // candidate on length.
            let full = &tail[..probe + 1];
            if let Ok(offset) =
                NAMED_ENTITIES[lo..hi].binary_search_by_key(&full, |&(name, _)| name)
            {
                best = Some(EntityMatch {
                    len: probe + 1,
                    replacement: NAMED_ENTITIES[lo + offset].1,
                    has_semicolon: true,
                });
            }
        }
    }
    best
}

const MAX_ENTITY_NAME_LEN: usize = 32;

/// Decoded value for a numeric character reference, plus the diagnostic the
/// reference deserves (if any). The returned char is always emitted.
pub fn numeric_reference_value(code: u32) -> (char, Option<ParseErrorCode>) {
    if code == 0 {
        return ('\u{FFFD}', Some(ParseErrorCode::InvalidCharacterReference));
    }
    if code > 0x10FFFF {
        return ('\u{FFFD}', Some(ParseErrorCode::InvalidCharacterReference));
    }
    if (0xD800..=0xDFFF).contains(&code) {
        return ('\u{FFFD}', Some(ParseErrorCode::InvalidCharacterReference));
    }
    if let Some(mapped) = windows_1252_override(code) {
        return (mapped, Some(ParseErrorCode::ControlCharacterReference));
    }
    let ch = char::from_u32(code).expect("non-surrogate in-range code point");
    if is_noncharacter(code) {
        return (ch, Some(ParseErrorCode::NoncharacterCharacterReference));
    }
    if is_flagged_control(code) {
        return (ch, Some(ParseErrorCode::ControlCharacterReference));
    }
    (ch, None)
}

fn is_noncharacter(code: u32) -> bool {
    (0xFDD0..=0xFDEF).contains(&code) || (code & 0xFFFE) == 0xFFFE
}

fn is_flagged_control(code: u32) -> bool {
    let is_c0 = code < 0x20 && !matches!(code, 0x09 | 0x0A | 0x0C | 0x0D);
    let is_c1 = (0x7F..=0x9F).contains(&code);
    is_c0 || is_c1
}

fn windows_1252_override(code: u32) -> Option<char> {
    let mapped = match code {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => return None,
    };
    Some(mapped)
}

/// Named reference table: (name after `&`, replacement).
///
/// Names ending in `;` require the semicolon in the source; the rest are the
/// legacy semicolon-optional set, which by spec always pairs with a `;`
/// entry. Generated data; keep one entry per line.
static NAMED_ENTITIES: &[(&str, &str)] = &[
    ("AElig", "\u{00C6}"),
    ("AElig;", "\u{00C6}"),
    ("AMP", "&"),
    ("AMP;", "&"),
    ("Aacute", "\u{00C1}"),
    ("Aacute;", "\u{00C1}"),
    ("Acirc", "\u{00C2}"),
    ("Acirc;", "\u{00C2}"),
    ("Agrave", "\u{00C0}"),
    ("Agrave;", "\u{00C0}"),
    ("Alpha;", "\u{0391}"),
    ("Aring", "\u{00C5}"),
    ("Aring;", "\u{00C5}"),
    ("Atilde", "\u{00C3}"),
    ("Atilde;", "\u{00C3}"),
    ("Auml", "\u{00C4}"),
    ("Auml;", "\u{00C4}"),
    ("Beta;", "\u{0392}"),
    ("COPY", "\u{00A9}"),
    ("COPY;", "\u{00A9}"),
    ("Ccedil", "\u{00C7}"),
    ("Ccedil;", "\u{00C7}"),
    ("Chi;", "\u{03A7}"),
    ("Dagger;", "\u{2021}"),
    ("Delta;", "\u{0394}"),
    ("ETH", "\u{00D0}"),
    ("ETH;", "\u{00D0}"),
    ("Eacute", "\u{00C9}"),
    ("Eacute;", "\u{00C9}"),
    ("Ecirc", "\u{00CA}"),
    ("Ecirc;", "\u{00CA}"),
    ("Egrave", "\u{00C8}"),
    ("Egrave;", "\u{00C8}"),
    ("Epsilon;", "\u{0395}"),
    ("Eta;", "\u{0397}"),
    ("Euml", "\u{00CB}"),
    ("Euml;", "\u{00CB}"),
    ("GT", ">"),
    ("GT;", ">"),
    ("Gamma;", "\u{0393}"),
    ("Iacute", "\u{00CD}"),
    ("Iacute;", "\u{00CD}"),
    ("Icirc", "\u{00CE}"),
    ("Icirc;", "\u{00CE}"),
    ("Igrave", "\u{00CC}"),
    ("Igrave;", "\u{00CC}"),
    ("Iota;", "\u{0399}"),
    ("Iuml", "\u{00CF}"),
    ("Iuml;", "\u{00CF}"),
    ("Kappa;", "\u{039A}"),
    ("LT", "<"),
    ("LT;", "<"),
    ("Lambda;", "\u{039B}"),
    ("Mu;", "\u{039C}"),
    ("Ntilde", "\u{00D1}"),
    ("Ntilde;", "\u{00D1}"),
    ("Nu;", "\u{039D}"),
    ("OElig;", "\u{0152}"),
    ("Oacute", "\u{00D3}"),
    ("Oacute;", "\u{00D3}"),
    ("Ocirc", "\u{00D4}"),
    ("Ocirc;", "\u{00D4}"),
    ("Ograve", "\u{00D2}"),
    ("Ograve;", "\u{00D2}"),
    ("Omega;", "\u{03A9}"),
    ("Omicron;", "\u{039F}"),
    ("Oslash", "\u{00D8}"),
    ("Oslash;", "\u{00D8}"),
    ("Otilde", "\u{00D5}"),
    ("Otilde;", "\u{00D5}"),
    ("Ouml", "\u{00D6}"),
    ("Ouml;", "\u{00D6}"),
    ("Phi;", "\u{03A6}"),
    ("Pi;", "\u{03A0}"),
    ("Prime;", "\u{2033}"),
    ("Psi;", "\u{03A8}"),
    ("QUOT", "\""),
    ("QUOT;", "\""),
    ("REG", "\u{00AE}"),
    ("REG;", "\u{00AE}"),
    ("Rho;", "\u{03A1}"),
    ("Scaron;", "\u{0160}"),
    ("Sigma;", "\u{03A3}"),
    ("THORN", "\u{00DE}"),
    ("THORN;", "\u{00DE}"),
    ("Tau;", "\u{03A4}"),
    ("Theta;", "\u{0398}"),
    ("Uacute", "\u{00DA}"),
    ("Uacute;", "\u{00DA}"),
    ("Ucirc", "\u{00DB}"),
    ("Ucirc;", "\u{00DB}"),
    ("Ugrave", "\u{00D9}"),
    ("Ugrave;", "\u{00D9}"),
    ("Upsilon;", "\u{03A5}"),
    ("Uuml", "\u{00DC}"),
    ("Uuml;", "\u{00DC}"),
    ("Xi;", "\u{039E}"),
    ("Yacute", "\u{00DD}"),
    ("Yacute;", "\u{00DD}"),
    ("Yuml;", "\u{0178}"),
    ("Zeta;", "\u{0396}"),
    ("aacute", "\u{00E1}"),
    ("aacute;", "\u{00E1}"),
    ("acirc", "\u{00E2}"),
    ("acirc;", "\u{00E2}"),
    ("acute", "\u{00B4}"),
    ("acute;", "\u{00B4}"),
    ("aelig", "\u{00E6}"),
    ("aelig;", "\u{00E6}"),
    ("agrave", "\u{00E0}"),
    ("agrave;", "\u{00E0}"),
    ("alpha;", "\u{03B1}"),
    ("amp", "&"),
    ("amp;", "&"),
    ("and;", "\u{2227}"),
    ("apos;", "'"),
    ("aring", "\u{00E5}"),
    ("aring;", "\u{00E5}"),
    ("asymp;", "\u{2248}"),
    ("atilde", "\u{00E3}"),
    ("atilde;", "\u{00E3}"),
    ("auml", "\u{00E4}"),
    ("auml;", "\u{00E4}"),
    ("bdquo;", "\u{201E}"),
    ("beta;", "\u{03B2}"),
    ("brvbar", "\u{00A6}"),
    ("brvbar;", "\u{00A6}"),
    ("bull;", "\u{2022}"),
    ("cap;", "\u{2229}"),
    ("ccedil", "\u{00E7}"),
    ("ccedil;", "\u{00E7}"),
    ("cedil", "\u{00B8}"),
    ("cedil;", "\u{00B8}"),
    ("cent", "\u{00A2}"),
    ("cent;", "\u{00A2}"),
    ("chi;", "\u{03C7}"),
    ("circ;", "\u{02C6}"),
    ("clubs;", "\u{2663}"),
    ("cong;", "\u{2245}"),
    ("copy", "\u{00A9}"),
    ("copy;", "\u{00A9}"),
    ("crarr;", "\u{21B5}"),
    ("cup;", "\u{222A}"),
    ("curren", "\u{00A4}"),
    ("curren;", "\u{00A4}"),
    ("dagger;", "\u{2020}"),
    ("darr;", "\u{2193}"),
    ("deg", "\u{00B0}"),
    ("deg;", "\u{00B0}"),
    ("delta;", "\u{03B4}"),
    ("diams;", "\u{2666}"),
    ("divide", "\u{00F7}"),
    ("divide;", "\u{00F7}"),
    ("eacute", "\u{00E9}"),
    ("eacute;", "\u{00E9}"),
    ("ecirc", "\u{00EA}"),
    ("ecirc;", "\u{00EA}"),
    ("egrave", "\u{00E8}"),
    ("egrave;", "\u{00E8}"),
    ("empty;", "\u{2205}"),
    ("emsp;", "\u{2003}"),
    ("ensp;", "\u{2002}"),
    ("epsilon;", "\u{03B5}"),
    ("equiv;", "\u{2261}"),
    ("eta;", "\u{03B7}"),
    ("eth", "\u{00F0}"),
    ("eth;", "\u{00F0}"),
    ("euml", "\u{00EB}"),
    ("euml;", "\u{00EB}"),
    ("euro;", "\u{20AC}"),
    ("exist;", "\u{2203}"),
    ("fnof;", "\u{0192}"),
    ("forall;", "\u{2200}"),
    ("frac12", "\u{00BD}"),
    ("frac12;", "\u{00BD}"),
    ("frac14", "\u{00BC}"),
    ("frac14;", "\u{00BC}"),
    ("frac34", "\u{00BE}"),
    ("frac34;", "\u{00BE}"),
    ("frasl;", "\u{2044}"),
    ("gamma;", "\u{03B3}"),
    ("ge;", "\u{2265}"),
    ("gt", ">"),
    ("gt;", ">"),
    ("harr;", "\u{2194}"),
    ("hearts;", "\u{2665}"),
    ("hellip;", "\u{2026}"),
    ("iacute", "\u{00ED}"),
    ("iacute;", "\u{00ED}"),
    ("icirc", "\u{00EE}"),
    ("icirc;", "\u{00EE}"),
    ("iexcl", "\u{00A1}"),
    ("iexcl;", "\u{00A1}"),
    ("igrave", "\u{00EC}"),
    ("igrave;", "\u{00EC}"),
    ("infin;", "\u{221E}"),
    ("iota;", "\u{03B9}"),
    ("iquest", "\u{00BF}"),
    ("iquest;", "\u{00BF}"),
    ("isin;", "\u{2208}"),
    ("iuml", "\u{00EF}"),
    ("iuml;", "\u{00EF}"),
    ("kappa;", "\u{03BA}"),
    ("lambda;", "\u{03BB}"),
    ("lang;", "\u{27E8}"),
    ("laquo", "\u{00AB}"),
    ("laquo;", "\u{00AB}"),
    ("larr;", "\u{2190}"),
    ("lceil;", "\u{2308}"),
    ("ldquo;", "\u{201C}"),
    ("le;", "\u{2264}"),
    ("lfloor;", "\u{230A}"),
    ("loz;", "\u{25CA}"),
    ("lrm;", "\u{200E}"),
    ("lsaquo;", "\u{2039}"),
    ("lsquo;", "\u{2018}"),
    ("lt", "<"),
    ("lt;", "<"),
    ("macr", "\u{00AF}"),
    ("macr;", "\u{00AF}"),
    ("mdash;", "\u{2014}"),
    ("micro", "\u{00B5}"),
    ("micro;", "\u{00B5}"),
    ("middot", "\u{00B7}"),
    ("middot;", "\u{00B7}"),
    ("minus;", "\u{2212}"),
    ("mu;", "\u{03BC}"),
    ("nabla;", "\u{2207}"),
    ("nbsp", "\u{00A0}"),
    ("nbsp;", "\u{00A0}"),
    ("ndash;", "\u{2013}"),
    ("ne;", "\u{2260}"),
    ("ni;", "\u{220B}"),
    ("not", "\u{00AC}"),
    ("not;", "\u{00AC}"),
    ("notin;", "\u{2209}"),
    ("nsub;", "\u{2284}"),
    ("ntilde", "\u{00F1}"),
    ("ntilde;", "\u{00F1}"),
    ("nu;", "\u{03BD}"),
    ("oacute", "\u{00F3}"),
    ("oacute;", "\u{00F3}"),
    ("ocirc", "\u{00F4}"),
    ("ocirc;", "\u{00F4}"),
    ("oelig;", "\u{0153}"),
    ("ograve", "\u{00F2}"),
    ("ograve;", "\u{00F2}"),
    ("oline;", "\u{203E}"),
    ("omega;", "\u{03C9}"),
    ("omicron;", "\u{03BF}"),
    ("or;", "\u{2228}"),
    ("ordf", "\u{00AA}"),
    ("ordf;", "\u{00AA}"),
    ("ordm", "\u{00BA}"),
    ("ordm;", "\u{00BA}"),
    ("oslash", "\u{00F8}"),
    ("oslash;", "\u{00F8}"),
    ("otilde", "\u{00F5}"),
    ("otilde;", "\u{00F5}"),
    ("ouml", "\u{00F6}"),
    ("ouml;", "\u{00F6}"),
    ("para", "\u{00B6}"),
    ("para;", "\u{00B6}"),
    ("part;", "\u{2202}"),
    ("permil;", "\u{2030}"),
    ("perp;", "\u{22A5}"),
    ("phi;", "\u{03C6}"),
    ("pi;", "\u{03C0}"),
    ("plusmn", "\u{00B1}"),
    ("plusmn;", "\u{00B1}"),
    ("pound", "\u{00A3}"),
    ("pound;", "\u{00A3}"),
    ("prime;", "\u{2032}"),
    ("prod;", "\u{220F}"),
    ("prop;", "\u{221D}"),
    ("psi;", "\u{03C8}"),
    ("quot", "\""),
    ("quot;", "\""),
    ("radic;", "\u{221A}"),
    ("rang;", "\u{27E9}"),
    ("raquo", "\u{00BB}"),
    ("raquo;", "\u{00BB}"),
    ("rarr;", "\u{2192}"),
    ("rceil;", "\u{2309}"),
    ("rdquo;", "\u{201D}"),
    ("reg", "\u{00AE}"),
    ("reg;", "\u{00AE}"),
    ("rfloor;", "\u{230B}"),
    ("rho;", "\u{03C1}"),
    ("rlm;", "\u{200F}"),
    ("rsaquo;", "\u{203A}"),
    ("rsquo;", "\u{2019}"),
    ("sbquo;", "\u{201A}"),
    ("scaron;", "\u{0161}"),
    ("sdot;", "\u{22C5}"),
    ("sect", "\u{00A7}"),
    ("sect;", "\u{00A7}"),
    ("shy", "\u{00AD}"),
    ("shy;", "\u{00AD}"),
    ("sigma;", "\u{03C3}"),
    ("sigmaf;", "\u{03C2}"),
    ("sim;", "\u{223C}"),
    ("spades;", "\u{2660}"),
    ("sub;", "\u{2282}"),
    ("sube;", "\u{2286}"),
    ("sum;", "\u{2211}"),
    ("sup1", "\u{00B9}"),
    ("sup1;", "\u{00B9}"),
    ("sup2", "\u{00B2}"),
    ("sup2;", "\u{00B2}"),
    ("sup3", "\u{00B3}"),
    ("sup3;", "\u{00B3}"),
    ("sup;", "\u{2283}"),
    ("supe;", "\u{2287}"),
    ("szlig", "\u{00DF}"),
    ("szlig;", "\u{00DF}"),
    ("tau;", "\u{03C4}"),
    ("there4;", "\u{2234}"),
    ("theta;", "\u{03B8}"),
    ("thinsp;", "\u{2009}"),
    ("thorn", "\u{00FE}"),
    ("thorn;", "\u{00FE}"),
    ("tilde;", "\u{02DC}"),
    ("times", "\u{00D7}"),
    ("times;", "\u{00D7}"),
    ("trade;", "\u{2122}"),
    ("uacute", "\u{00FA}"),
    ("uacute;", "\u{00FA}"),
    ("uarr;", "\u{2191}"),
    ("ucirc", "\u{00FB}"),
    ("ucirc;", "\u{00FB}"),
    ("ugrave", "\u{00F9}"),
    ("ugrave;", "\u{00F9}"),
    ("uml", "\u{00A8}"),
    ("uml;", "\u{00A8}"),
    ("upsilon;", "\u{03C5}"),
    ("uuml", "\u{00FC}"),
    ("uuml;", "\u{00FC}"),
    ("xi;", "\u{03BE}"),
    ("yacute", "\u{00FD}"),
    ("yacute;", "\u{00FD}"),
    ("yen", "\u{00A5}"),
    ("yen;", "\u{00A5}"),
    ("yuml", "\u{00FF}"),
    ("yuml;", "\u{00FF}"),
    ("zeta;", "\u{03B6}"),
    ("zwj;", "\u{200D}"),
    ("zwnj;", "\u{200C}"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_no_duplicate_names() {
        let mut seen = std::collections::HashSet::new();
        for (name, _) in NAMED_ENTITIES {
            assert!(seen.insert(*name), "duplicate entity name: {name}");
        }
    }

    #[test]
    fn table_is_sorted_for_the_prefix_walk() {
        // The lookup bisects with `partition_point`; a single out-of-order
        // row silently breaks longest-match resolution.
        for pair in NAMED_ENTITIES.windows(2) {
            assert!(
                pair[0].0.as_bytes() < pair[1].0.as_bytes(),
                "entity table must stay byte-wise sorted: {:?} is not before {:?}",
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn prefix_walk_matches_a_linear_scan() {
        // Reference oracle: the longest table name that prefixes the tail,
        // honoring the semicolon rule.
        fn oracle(tail: &str) -> Option<(usize, &'static str, bool)> {
            let bytes = tail.as_bytes();
            let mut probe = 0usize;
            while probe < bytes.len()
                && probe < 32
                && bytes[probe].is_ascii_alphanumeric()
            {
                probe += 1;
            }
            let with_semicolon = probe < bytes.len() && bytes[probe] == b';';
            let mut best: Option<(usize, &'static str, bool)> = None;
            for (name, replacement) in NAMED_ENTITIES {
                let len = name.len();
                let matches = if name.ends_with(';') {
                    with_semicolon && len == probe + 1 && &bytes[..len] == name.as_bytes()
                } else {
                    len <= probe && &bytes[..len] == name.as_bytes()
                };
                if matches && best.is_none_or(|b| len > b.0) {
                    best = Some((len, replacement, name.ends_with(';')));
                }
            }
            best
        }

        let samples = [
            "amp;x", "ampersand", "amp", "notit;", "notin;", "nota", "not",
            "apos", "apos;", "unknown;", "n", "zwnj;", "zwj", "AElig-",
            "AElig;", "GT=", "sup3;", "sup3", "sup;", "supe;", "a", ";", "",
            "frac12x", "frac12;", "times", "timesbar;",
        ];
        for sample in samples {
            let got = longest_entity_match(sample)
                .map(|m| (m.len, m.replacement, m.has_semicolon));
            assert_eq!(got, oracle(sample), "mismatch for tail {sample:?}");
        }
    }

    #[test]
    fn every_legacy_name_has_a_semicolon_twin() {
        let names: std::collections::HashSet<&str> =
            NAMED_ENTITIES.iter().map(|(n, _)| *n).collect();
        for (name, _) in NAMED_ENTITIES {
            if !name.ends_with(';') {
                let twin = format!("{name};");
                assert!(
                    names.contains(twin.as_str()),
                    "legacy entity {name} lacks its ';' twin"
                );
            }
        }
    }

    #[test]
    fn longest_match_prefers_the_semicolon_form() {
        let m = longest_entity_match("amp;rest").expect("match");
        assert_eq!(m.replacement, "&");
        assert_eq!(m.len, 4);
        assert!(m.has_semicolon);
    }

    #[test]
    fn legacy_match_applies_without_semicolon() {
        let m = longest_entity_match("ampersand").expect("match");
        assert_eq!(m.replacement, "&");
        assert_eq!(m.len, 3);
        assert!(!m.has_semicolon);

        let m = longest_entity_match("notanumber").expect("match");
        assert_eq!(m.replacement, "\u{00AC}");
        assert_eq!(m.len, 3);
    }

    #[test]
    fn semicolon_only_names_do_not_match_bare() {
        assert!(longest_entity_match("apos ").is_none());
        assert!(longest_entity_match("mdash ").is_none());
        // ...but match with the semicolon present.
        assert!(longest_entity_match("apos;").is_some());
    }

    #[test]
    fn unknown_names_do_not_match() {
        assert!(longest_entity_match("unknown;").is_none());
        assert!(longest_entity_match("").is_none());
        assert!(longest_entity_match(";").is_none());
    }

    #[test]
    fn numeric_replacement_rules() {
        assert_eq!(
            numeric_reference_value(0),
            (
                '\u{FFFD}',
                Some(ParseErrorCode::InvalidCharacterReference)
            )
        );
        assert_eq!(
            numeric_reference_value(0x110000).0,
            '\u{FFFD}',
        );
        assert_eq!(
            numeric_reference_value(0xD800).0,
            '\u{FFFD}',
        );
        assert_eq!(
            numeric_reference_value(0x80),
            (
                '\u{20AC}',
                Some(ParseErrorCode::ControlCharacterReference)
            )
        );
        assert_eq!(
            numeric_reference_value(0x9F),
            (
                '\u{0178}',
                Some(ParseErrorCode::ControlCharacterReference)
            )
        );
        assert_eq!(numeric_reference_value(0x41), ('A', None));
        assert_eq!(numeric_reference_value(0x10FFFF).1.is_some(), true);
        assert_eq!(
            numeric_reference_value(0xFDD0).1,
            Some(ParseErrorCode::NoncharacterCharacterReference)
        );
        assert_eq!(
            numeric_reference_value(0x01).1,
            Some(ParseErrorCode::ControlCharacterReference)
        );
    }
}
