//! Interned tag-name universe and category predicates.
//!
//! Every `AtomTable` preloads `KNOWN_ATOM_TEXTS` at construction, so the
//! constants below are valid in any table and category checks are integer
//! compares. Foreign names that survive case adjustment (`foreignObject`,
//! `annotation-xml`) are preloaded in their adjusted spelling.

use crate::dom::Namespace;
use crate::shared::AtomId;

macro_rules! known_atoms {
    ($( $konst:ident = $text:literal ),+ $(,)?) => {
        /// Names preloaded into every `AtomTable`, in constant order.
        pub(crate) static KNOWN_ATOM_TEXTS: &[&str] = &[ $( $text ),+ ];

        pub(crate) mod atoms {
            use crate::shared::AtomId;
            known_atoms!(@consts 0u32; $( $konst = $text; )+);
        }
    };
    (@consts $idx:expr; $konst:ident = $text:literal; $( $rest:ident = $rtext:literal; )*) => {
        pub(crate) const $konst: AtomId = AtomId($idx);
        known_atoms!(@consts $idx + 1u32; $( $rest = $rtext; )*);
    };
    (@consts $idx:expr;) => {};
}

known_atoms! {
    HTML = "html",
    HEAD = "head",
    BODY = "body",
    BR = "br",
    P = "p",
    TITLE = "title",
    STYLE = "style",
    SCRIPT = "script",
    NOSCRIPT = "noscript",
    TEMPLATE = "template",
    META = "meta",
    LINK = "link",
    BASE = "base",
    BASEFONT = "basefont",
    BGSOUND = "bgsound",
    FORM = "form",
    FRAME = "frame",
    FRAMESET = "frameset",
    NOFRAMES = "noframes",
    IFRAME = "iframe",
    NOEMBED = "noembed",
    EMBED = "embed",
    OBJECT = "object",
    PARAM = "param",
    SOURCE = "source",
    TRACK = "track",
    INPUT = "input",
    TEXTAREA = "textarea",
    SELECT = "select",
    OPTION = "option",
    OPTGROUP = "optgroup",
    KEYGEN = "keygen",
    LABEL = "label",
    BUTTON = "button",
    FIELDSET = "fieldset",
    LI = "li",
    OL = "ol",
    UL = "ul",
    DL = "dl",
    DD = "dd",
    DT = "dt",
    FIGURE = "figure",
    FIGCAPTION = "figcaption",
    MAIN = "main",
    DIV = "div",
    SPAN = "span",
    A = "a",
    B = "b",
    I = "i",
    U = "u",
    S = "s",
    EM = "em",
    STRONG = "strong",
    SMALL = "small",
    STRIKE = "strike",
    BIG = "big",
    CODE = "code",
    FONT = "font",
    NOBR = "nobr",
    TT = "tt",
    ADDRESS = "address",
    ARTICLE = "article",
    ASIDE = "aside",
    BLOCKQUOTE = "blockquote",
    CENTER = "center",
    DETAILS = "details",
    DIALOG = "dialog",
    DIR = "dir",
    FOOTER = "footer",
    HEADER = "header",
    HGROUP = "hgroup",
    LISTING = "listing",
    MARQUEE = "marquee",
    MENU = "menu",
    NAV = "nav",
    PLAINTEXT = "plaintext",
    PRE = "pre",
    SECTION = "section",
    SUMMARY = "summary",
    SEARCH = "search",
    XMP = "xmp",
    H1 = "h1",
    H2 = "h2",
    H3 = "h3",
    H4 = "h4",
    H5 = "h5",
    H6 = "h6",
    TABLE = "table",
    CAPTION = "caption",
    COLGROUP = "colgroup",
    COL = "col",
    TBODY = "tbody",
    THEAD = "thead",
    TFOOT = "tfoot",
    TR = "tr",
    TD = "td",
    TH = "th",
    APPLET = "applet",
    AREA = "area",
    HR = "hr",
    IMG = "img",
    IMAGE = "image",
    WBR = "wbr",
    RUBY = "ruby",
    RB = "rb",
    RP = "rp",
    RT = "rt",
    RTC = "rtc",
    SUB = "sub",
    SUP = "sup",
    VAR = "var",
    SVG = "svg",
    MATH = "math",
    MI = "mi",
    MO = "mo",
    MN = "mn",
    MS = "ms",
    MTEXT = "mtext",
    ANNOTATION_XML = "annotation-xml",
    FOREIGN_OBJECT = "foreignObject",
    DESC = "desc",
    MGLYPH = "mglyph",
    MALIGNMARK = "malignmark",
    TYPE = "type",
    COLOR = "color",
    FACE = "face",
    SIZE = "size",
}

/// The "special" element category of the tree-construction rules.
pub(crate) fn is_special(ns: Namespace, name: AtomId) -> bool {
    use self::atoms::*;
    match ns {
        Namespace::Html => matches!(
            name,
            ADDRESS
                | APPLET
                | AREA
                | ARTICLE
                | ASIDE
                | BASE
                | BASEFONT
                | BGSOUND
                | BLOCKQUOTE
                | BODY
                | BR
                | BUTTON
                | CAPTION
                | CENTER
                | COL
                | COLGROUP
                | DD
                | DETAILS
                | DIR
                | DIV
                | DL
                | DT
                | EMBED
                | FIELDSET
                | FIGCAPTION
                | FIGURE
                | FOOTER
                | FORM
                | FRAME
                | FRAMESET
                | H1
                | H2
                | H3
                | H4
                | H5
                | H6
                | HEAD
                | HEADER
                | HGROUP
                | HR
                | HTML
                | IFRAME
                | IMG
                | INPUT
                | KEYGEN
                | LI
                | LINK
                | LISTING
                | MAIN
                | MARQUEE
                | MENU
                | META
                | NAV
                | NOEMBED
                | NOFRAMES
                | NOSCRIPT
                | OBJECT
                | OL
                | P
                | PARAM
                | PLAINTEXT
                | PRE
                | SCRIPT
                | SEARCH
                | SECTION
                | SELECT
                | SOURCE
                | STYLE
                | SUMMARY
                | TABLE
                | TBODY
                | TD
                | TEMPLATE
                | TEXTAREA
                | TFOOT
                | TH
                | THEAD
                | TITLE
                | TR
                | TRACK
                | UL
                | WBR
                | XMP
        ),
        Namespace::MathMl => matches!(name, MI | MO | MN | MS | MTEXT | ANNOTATION_XML),
        Namespace::Svg => matches!(name, FOREIGN_OBJECT | DESC | TITLE),
    }
}

/// The formatting category (candidates for the active formatting list).
pub(crate) fn is_formatting(name: AtomId) -> bool {
    use self::atoms::*;
    matches!(
        name,
        A | B | BIG | CODE | EM | FONT | I | NOBR | S | SMALL | STRIKE | STRONG | TT | U
    )
}

pub(crate) fn is_heading(name: AtomId) -> bool {
    use self::atoms::*;
    matches!(name, H1 | H2 | H3 | H4 | H5 | H6)
}

/// Elements closed by "generate implied end tags".
pub(crate) fn is_implied_end(name: AtomId) -> bool {
    use self::atoms::*;
    matches!(
        name,
        DD | DT | LI | OPTGROUP | OPTION | P | RB | RP | RT | RTC
    )
}

/// Elements closed by "generate implied end tags, thoroughly".
pub(crate) fn is_implied_end_thorough(name: AtomId) -> bool {
    use self::atoms::*;
    is_implied_end(name)
        || matches!(
            name,
            CAPTION | COLGROUP | TBODY | TD | TFOOT | TH | THEAD | TR
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_atom_texts_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for name in KNOWN_ATOM_TEXTS {
            assert!(seen.insert(*name), "duplicate known atom: {name}");
        }
    }

    #[test]
    fn special_category_is_namespace_sensitive() {
        assert!(is_special(Namespace::Html, atoms::P));
        assert!(!is_special(Namespace::Html, atoms::SPAN));
        assert!(is_special(Namespace::MathMl, atoms::MI));
        assert!(!is_special(Namespace::MathMl, atoms::P));
        assert!(is_special(Namespace::Svg, atoms::FOREIGN_OBJECT));
        assert!(!is_special(Namespace::Svg, atoms::SVG));
    }

    #[test]
    fn formatting_and_implied_sets_match_the_algorithm_tables() {
        assert!(is_formatting(atoms::A));
        assert!(is_formatting(atoms::NOBR));
        assert!(!is_formatting(atoms::SPAN));
        assert!(is_implied_end(atoms::P));
        assert!(!is_implied_end(atoms::DIV));
        assert!(is_implied_end_thorough(atoms::TD));
    }
}
