//! Rendered document boundary.
//!
//! The preview renderer produces a document in which every element that takes
//! part in scroll sync carries a line annotation (by default `data-line="N"`).
//! This crate abstracts the handful of host accessors the line mapper needs:
//!
//! * scan the document for annotated elements (scan order preserved)
//! * per-element bounding rectangle relative to the current viewport
//! * current vertical scroll offset, and a setter for the viewport scroll
//!
//! Invariants:
//! * `ElementId` values are stable for the lifetime of a render; a lookup that
//!   returns the same id refers to the same element.
//! * `bounding_rect` is viewport-relative. Callers obtain document-relative
//!   coordinates through [`measure`], which adds the current scroll offset.
//!
//! `SnapshotDocument` is the in-memory implementation used by the diagnostic
//! binary and the test suites.

pub mod annotation;
pub mod snapshot;

pub use annotation::{AnnotationError, DEFAULT_LINE_ATTRIBUTE, parse_line_annotation};
pub use snapshot::{SnapshotDocument, SnapshotElement};

/// Opaque handle to a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Vertical edge of an element used for measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Edge {
    #[default]
    Top,
    Bottom,
}

/// Vertical extent of an element relative to the current viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementRect {
    pub top: f64,
    pub bottom: f64,
}

impl ElementRect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn edge(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }
}

/// Host accessors over a rendered document.
pub trait RenderedDocument {
    /// Every element carrying `attribute` in document scan order, paired with
    /// the raw attribute value.
    fn annotated_elements(&self, attribute: &str) -> Vec<(ElementId, String)>;

    /// Viewport-relative rectangle, `None` once the element is gone.
    fn bounding_rect(&self, element: ElementId) -> Option<ElementRect>;

    /// Current vertical scroll offset of the viewport.
    fn scroll_y(&self) -> f64;

    /// Move the viewport. No clamping is expected from callers; the host
    /// decides how out-of-range offsets behave.
    fn scroll_to(&mut self, x: f64, y: f64);
}

impl<D: RenderedDocument + ?Sized> RenderedDocument for Box<D> {
    fn annotated_elements(&self, attribute: &str) -> Vec<(ElementId, String)> {
        (**self).annotated_elements(attribute)
    }

    fn bounding_rect(&self, element: ElementId) -> Option<ElementRect> {
        (**self).bounding_rect(element)
    }

    fn scroll_y(&self) -> f64 {
        (**self).scroll_y()
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        (**self).scroll_to(x, y)
    }
}

/// Document-relative position of `element`'s `edge`: current scroll offset
/// plus the viewport-relative edge. Independent of the scroll state at the
/// time of measurement.
pub fn measure<D: RenderedDocument + ?Sized>(
    document: &D,
    element: ElementId,
    edge: Edge,
) -> Option<f64> {
    let rect = document.bounding_rect(element)?;
    Some(document.scroll_y() + rect.edge(edge))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = ElementRect::new(10.0, 42.5);
        assert_eq!(r.edge(Edge::Top), 10.0);
        assert_eq!(r.edge(Edge::Bottom), 42.5);
    }

    #[test]
    fn measure_is_scroll_independent() {
        let mut doc = SnapshotDocument::new();
        let id = doc.push_element(&[("data-line", "3")], 300.0, 340.0);
        assert_eq!(measure(&doc, id, Edge::Top), Some(300.0));
        doc.scroll_to(0.0, 120.0);
        // Viewport-relative rect moved up, document position unchanged.
        assert_eq!(doc.bounding_rect(id).map(|r| r.top), Some(180.0));
        assert_eq!(measure(&doc, id, Edge::Top), Some(300.0));
        assert_eq!(measure(&doc, id, Edge::Bottom), Some(340.0));
    }

    #[test]
    fn measure_missing_element() {
        let doc = SnapshotDocument::new();
        assert_eq!(measure(&doc, ElementId(7), Edge::Top), None);
    }

    #[test]
    fn boxed_document_forwards() {
        let mut inner = SnapshotDocument::new();
        let id = inner.push_element(&[("data-line", "1")], 5.0, 9.0);
        let mut doc: Box<dyn RenderedDocument> = Box::new(inner);
        doc.scroll_to(0.0, 2.0);
        assert_eq!(doc.scroll_y(), 2.0);
        assert_eq!(measure(&*doc, id, Edge::Bottom), Some(9.0));
        assert_eq!(doc.annotated_elements("data-line").len(), 1);
    }
}
