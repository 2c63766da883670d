//! Foreign-content (SVG and MathML) name and attribute adjustments.
//!
//! The tokenizer lowercases tag and attribute names; SVG and MathML are
//! case-sensitive, so insertion into a foreign namespace restores the
//! canonical spellings from these fixed tables. Namespaced attributes
//! (xlink, xml, xmlns) become properly namespaced on the element.

use crate::dom::AttrNamespace;

/// SVG tag names whose canonical spelling is mixed-case.
static SVG_TAG_ADJUSTMENTS: &[(&str, &str)] = &[
    ("altglyph", "altGlyph"),
    ("altglyphdef", "altGlyphDef"),
    ("altglyphitem", "altGlyphItem"),
    ("animatecolor", "animateColor"),
    ("animatemotion", "animateMotion"),
    ("animatetransform", "animateTransform"),
    ("clippath", "clipPath"),
    ("feblend", "feBlend"),
    ("fecolormatrix", "feColorMatrix"),
    ("fecomponenttransfer", "feComponentTransfer"),
    ("fecomposite", "feComposite"),
    ("feconvolvematrix", "feConvolveMatrix"),
    ("fediffuselighting", "feDiffuseLighting"),
    ("fedisplacementmap", "feDisplacementMap"),
    ("fedistantlight", "feDistantLight"),
    ("fedropshadow", "feDropShadow"),
    ("feflood", "feFlood"),
    ("fefunca", "feFuncA"),
    ("fefuncb", "feFuncB"),
    ("fefuncg", "feFuncG"),
    ("fefuncr", "feFuncR"),
    ("fegaussianblur", "feGaussianBlur"),
    ("feimage", "feImage"),
    ("femerge", "feMerge"),
    ("femergenode", "feMergeNode"),
    ("femorphology", "feMorphology"),
    ("feoffset", "feOffset"),
    ("fepointlight", "fePointLight"),
    ("fespecularlighting", "feSpecularLighting"),
    ("fespotlight", "feSpotLight"),
    ("fetile", "feTile"),
    ("feturbulence", "feTurbulence"),
    ("foreignobject", "foreignObject"),
    ("glyphref", "glyphRef"),
    ("lineargradient", "linearGradient"),
    ("radialgradient", "radialGradient"),
    ("textpath", "textPath"),
];

/// SVG attribute names whose canonical spelling is mixed-case.
static SVG_ATTRIBUTE_ADJUSTMENTS: &[(&str, &str)] = &[
    ("attributename", "attributeName"),
    ("attributetype", "attributeType"),
    ("basefrequency", "baseFrequency"),
    ("baseprofile", "baseProfile"),
    ("calcmode", "calcMode"),
    ("clippathunits", "clipPathUnits"),
    ("diffuseconstant", "diffuseConstant"),
    ("edgemode", "edgeMode"),
    ("filterunits", "filterUnits"),
    ("glyphref", "glyphRef"),
    ("gradienttransform", "gradientTransform"),
    ("gradientunits", "gradientUnits"),
    ("kernelmatrix", "kernelMatrix"),
    ("kernelunitlength", "kernelUnitLength"),
    ("keypoints", "keyPoints"),
    ("keysplines", "keySplines"),
    ("keytimes", "keyTimes"),
    ("lengthadjust", "lengthAdjust"),
    ("limitingconeangle", "limitingConeAngle"),
    ("markerheight", "markerHeight"),
    ("markerunits", "markerUnits"),
    ("markerwidth", "markerWidth"),
    ("maskcontentunits", "maskContentUnits"),
    ("maskunits", "maskUnits"),
    ("numoctaves", "numOctaves"),
    ("pathlength", "pathLength"),
    ("patterncontentunits", "patternContentUnits"),
    ("patterntransform", "patternTransform"),
    ("patternunits", "patternUnits"),
    ("pointsatx", "pointsAtX"),
    ("pointsaty", "pointsAtY"),
    ("pointsatz", "pointsAtZ"),
    ("preservealpha", "preserveAlpha"),
    ("preserveaspectratio", "preserveAspectRatio"),
    ("primitiveunits", "primitiveUnits"),
    ("refx", "refX"),
    ("refy", "refY"),
    ("repeatcount", "repeatCount"),
    ("repeatdur", "repeatDur"),
    ("requiredextensions", "requiredExtensions"),
    ("requiredfeatures", "requiredFeatures"),
    ("specularconstant", "specularConstant"),
    ("specularexponent", "specularExponent"),
    ("spreadmethod", "spreadMethod"),
    ("startoffset", "startOffset"),
    ("stddeviation", "stdDeviation"),
    ("stitchtiles", "stitchTiles"),
    ("surfacescale", "surfaceScale"),
    ("systemlanguage", "systemLanguage"),
    ("tablevalues", "tableValues"),
    ("targetx", "targetX"),
    ("targety", "targetY"),
    ("textlength", "textLength"),
    ("viewbox", "viewBox"),
    ("viewtarget", "viewTarget"),
    ("xchannelselector", "xChannelSelector"),
    ("ychannelselector", "yChannelSelector"),
    ("zoomandpan", "zoomAndPan"),
];

/// Namespaced foreign attributes: (name as tokenized, namespace, local name).
static FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, AttrNamespace, &str)] = &[
    ("xlink:actuate", AttrNamespace::Xlink, "actuate"),
    ("xlink:arcrole", AttrNamespace::Xlink, "arcrole"),
    ("xlink:href", AttrNamespace::Xlink, "href"),
    ("xlink:role", AttrNamespace::Xlink, "role"),
    ("xlink:show", AttrNamespace::Xlink, "show"),
    ("xlink:title", AttrNamespace::Xlink, "title"),
    ("xlink:type", AttrNamespace::Xlink, "type"),
    ("xml:lang", AttrNamespace::Xml, "lang"),
    ("xml:space", AttrNamespace::Xml, "space"),
    ("xmlns", AttrNamespace::Xmlns, "xmlns"),
    ("xmlns:xlink", AttrNamespace::Xmlns, "xlink"),
];

pub(crate) fn svg_tag_adjustment(name: &str) -> Option<&'static str> {
    SVG_TAG_ADJUSTMENTS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
}

pub(crate) fn svg_attr_adjustment(name: &str) -> Option<&'static str> {
    SVG_ATTRIBUTE_ADJUSTMENTS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
}

pub(crate) fn mathml_attr_adjustment(name: &str) -> Option<&'static str> {
    (name == "definitionurl").then_some("definitionURL")
}

pub(crate) fn foreign_attr_adjustment(name: &str) -> Option<(AttrNamespace, &'static str)> {
    FOREIGN_ATTRIBUTE_ADJUSTMENTS
        .iter()
        .find(|(from, _, _)| *from == name)
        .map(|(_, ns, local)| (*ns, *local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_tag_case_is_restored() {
        assert_eq!(svg_tag_adjustment("foreignobject"), Some("foreignObject"));
        assert_eq!(svg_tag_adjustment("lineargradient"), Some("linearGradient"));
        assert_eq!(svg_tag_adjustment("g"), None);
        assert_eq!(svg_tag_adjustment("svg"), None);
    }

    #[test]
    fn svg_attr_case_is_restored() {
        assert_eq!(svg_attr_adjustment("viewbox"), Some("viewBox"));
        assert_eq!(svg_attr_adjustment("width"), None);
    }

    #[test]
    fn mathml_definitionurl_is_adjusted() {
        assert_eq!(mathml_attr_adjustment("definitionurl"), Some("definitionURL"));
        assert_eq!(mathml_attr_adjustment("mathvariant"), None);
    }

    #[test]
    fn namespaced_attributes_split_into_namespace_and_local() {
        assert_eq!(
            foreign_attr_adjustment("xlink:href"),
            Some((AttrNamespace::Xlink, "href"))
        );
        assert_eq!(
            foreign_attr_adjustment("xmlns"),
            Some((AttrNamespace::Xmlns, "xmlns"))
        );
        assert_eq!(foreign_attr_adjustment("href"), None);
    }
}
