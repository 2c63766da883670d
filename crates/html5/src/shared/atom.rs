//! Atom table for canonicalized HTML tag/attribute names.

use std::collections::HashMap;
use std::sync::Arc;

use crate::tree_builder::tag_sets::KNOWN_ATOM_TEXTS;

/// Opaque atom identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(pub u32);

/// Document-level atom table.
///
/// Invariant: HTML-namespace names are stored in canonical lowercase form so
/// that equality on `AtomId` is equality on folded names. Foreign names
/// (SVG `foreignObject` and friends) are interned exactly and therefore get
/// distinct atoms from their folded spellings.
///
/// The well-known HTML/SVG/MathML name universe is preloaded at construction
/// so the constants in `tree_builder::tag_sets` resolve in O(1) without a
/// hash lookup.
#[derive(Debug)]
pub struct AtomTable {
    atoms: Vec<Arc<str>>,
    map: HashMap<String, AtomId>,
}

impl AtomTable {
    pub fn new() -> Self {
        let mut table = Self {
            atoms: Vec::with_capacity(KNOWN_ATOM_TEXTS.len() + 16),
            map: HashMap::with_capacity(KNOWN_ATOM_TEXTS.len() + 16),
        };
        for name in KNOWN_ATOM_TEXTS {
            let id = table.intern_exact(name);
            // Preload order defines the constant ids; a mismatch here means
            // the known-atom list contains a duplicate.
            debug_assert_eq!(
                table.resolve(id),
                *name,
                "known atom list must be duplicate-free"
            );
        }
        table
    }

    fn push_atom(&mut self, name: &str) -> AtomId {
        let idx: u32 = self
            .atoms
            .len()
            .try_into()
            .expect("atom table id space exhausted");
        let id = AtomId(idx);
        self.atoms.push(Arc::<str>::from(name));
        self.map.insert(name.to_string(), id);
        id
    }

    /// Intern a name, applying ASCII-lowercase folding for HTML matching.
    pub fn intern_ascii_folded(&mut self, name: &str) -> AtomId {
        if !name.bytes().any(|b| b.is_ascii_uppercase()) {
            if let Some(id) = self.map.get(name) {
                return *id;
            }
            return self.push_atom(name);
        }
        let folded = name.to_ascii_lowercase();
        if let Some(id) = self.map.get(folded.as_str()) {
            return *id;
        }
        self.push_atom(&folded)
    }

    /// Intern a name exactly as spelled.
    ///
    /// Used for case-adjusted foreign names where the HTML folding policy
    /// must not apply.
    pub fn intern_exact(&mut self, name: &str) -> AtomId {
        if let Some(id) = self.map.get(name) {
            return *id;
        }
        self.push_atom(name)
    }

    pub fn resolve(&self, id: AtomId) -> &str {
        self.atoms
            .get(id.0 as usize)
            .expect("atom id out of range for this table")
    }

    /// Resolve an atom id to a cloned canonical `Arc<str>`.
    ///
    /// This enables zero-reallocation reuse of interned names in the DOM.
    pub fn resolve_arc(&self, id: AtomId) -> Arc<str> {
        Arc::clone(
            self.atoms
                .get(id.0 as usize)
                .expect("atom id out of range for this table"),
        )
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::AtomTable;
    use crate::tree_builder::tag_sets::atoms;

    #[test]
    fn folding_maps_mixed_case_to_the_canonical_atom() {
        let mut table = AtomTable::new();
        let lower = table.intern_ascii_folded("div");
        let upper = table.intern_ascii_folded("DIV");
        let mixed = table.intern_ascii_folded("DiV");
        assert_eq!(lower, upper);
        assert_eq!(lower, mixed);
        assert_eq!(table.resolve(lower), "div");
    }

    #[test]
    fn exact_interning_preserves_case_and_stays_distinct() {
        let mut table = AtomTable::new();
        let adjusted = table.intern_exact("foreignObject");
        let folded = table.intern_ascii_folded("foreignObject");
        assert_ne!(adjusted, folded);
        assert_eq!(table.resolve(adjusted), "foreignObject");
        assert_eq!(table.resolve(folded), "foreignobject");
    }

    #[test]
    fn preloaded_constants_resolve_to_their_names() {
        let table = AtomTable::new();
        assert_eq!(table.resolve(atoms::HTML), "html");
        assert_eq!(table.resolve(atoms::TABLE), "table");
        assert_eq!(table.resolve(atoms::ANNOTATION_XML), "annotation-xml");
        assert_eq!(table.resolve(atoms::FOREIGN_OBJECT), "foreignObject");
    }

    #[test]
    fn non_ascii_names_are_preserved() {
        let mut table = AtomTable::new();
        let id = table.intern_ascii_folded("tagé");
        assert_eq!(table.resolve(id), "tagé");
    }
}
