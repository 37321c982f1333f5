#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_document::{ElementId, ElementRect, RenderedDocument, SnapshotDocument};
use std::cell::Cell;

/// Build a snapshot from `(line annotation, top, bottom)` triples in document coordinates.
pub fn snapshot(entries: &[(&str, f64, f64)]) -> SnapshotDocument {
    let mut doc = SnapshotDocument::new();
    for (line, top, bottom) in entries {
        doc.push_element(&[("data-line", *line)], *top, *bottom);
    }
    doc
}

/// Snapshot wrapper counting document scans and scroll calls.
pub struct CountingDocument {
    pub inner: SnapshotDocument,
    scans: Cell<usize>,
    scrolls: usize,
}

impl CountingDocument {
    pub fn new(inner: SnapshotDocument) -> Self {
        Self {
            inner,
            scans: Cell::new(0),
            scrolls: 0,
        }
    }

    pub fn scans(&self) -> usize {
        self.scans.get()
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls
    }
}

impl RenderedDocument for CountingDocument {
    fn annotated_elements(&self, attribute: &str) -> Vec<(ElementId, String)> {
        self.scans.set(self.scans.get() + 1);
        self.inner.annotated_elements(attribute)
    }

    fn bounding_rect(&self, element: ElementId) -> Option<ElementRect> {
        self.inner.bounding_rect(element)
    }

    fn scroll_y(&self) -> f64 {
        self.inner.scroll_y()
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.scrolls += 1;
        self.inner.scroll_to(x, y);
    }
}
