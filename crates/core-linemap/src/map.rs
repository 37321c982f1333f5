//! Source line -> rendered element table.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use core_document::{ElementId, RenderedDocument, parse_line_annotation};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMap {
    entries: BTreeMap<u32, ElementId>,
}

impl LineMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `document` once for elements carrying `attribute`.
    ///
    /// Annotations that are not plain decimal integers are skipped. When
    /// several elements share a line the first one in scan order is kept.
    pub fn build<D: RenderedDocument + ?Sized>(document: &D, attribute: &str) -> Self {
        let mut map = Self::new();
        let mut skipped = 0usize;
        let mut duplicates = 0usize;
        for (element, raw) in document.annotated_elements(attribute) {
            match parse_line_annotation(&raw) {
                Ok(line) => {
                    if !map.insert_first(line, element) {
                        duplicates += 1;
                    }
                }
                Err(error) => {
                    skipped += 1;
                    debug!(
                        target: "linemap.build",
                        %element,
                        %error,
                        "annotation_skipped"
                    );
                }
            }
        }
        debug!(
            target: "linemap.build",
            attribute,
            lines = map.len(),
            skipped,
            duplicates,
            "line_map_built"
        );
        map
    }

    /// Insert unless `line` is already mapped. Returns whether it was inserted.
    pub fn insert_first(&mut self, line: u32, element: ElementId) -> bool {
        match self.entries.entry(line) {
            Entry::Vacant(slot) => {
                slot.insert(element);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, line: u32) -> Option<ElementId> {
        self.entries.get(&line).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending line order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, ElementId)> + '_ {
        self.entries.iter().map(|(line, el)| (*line, *el))
    }

    /// `(prev, next)`: the largest mapped line strictly below `line` and the
    /// smallest mapped line at or above it.
    pub fn neighbors(&self, line: u32) -> (Option<u32>, Option<u32>) {
        let prev = self.entries.range(..line).next_back().map(|(l, _)| *l);
        let next = self.entries.range(line..).next().map(|(l, _)| *l);
        (prev, next)
    }
}

impl FromIterator<(u32, ElementId)> for LineMap {
    fn from_iter<I: IntoIterator<Item = (u32, ElementId)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (line, element) in iter {
            map.insert_first(line, element);
        }
        map
    }
}
