//! In-memory rendered document.
//!
//! A `SnapshotDocument` is a frozen layout pass: every element's vertical
//! extent in document coordinates plus its attributes, and the viewport's
//! scroll offset. `bounding_rect` reports rectangles shifted by the current
//! scroll so callers observe the same viewport-relative semantics a live
//! document would give them.
//!
//! JSON shape:
//!
//! ```json
//! {
//!   "scroll_y": 0.0,
//!   "elements": [
//!     { "attributes": { "data-line": "5" }, "top": 0.0, "bottom": 100.0 }
//!   ]
//! }
//! ```
//!
//! Element ids are indices into `elements`. Removing an element leaves its
//! slot in place so ids handed out earlier never alias a different element.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ElementId, ElementRect, RenderedDocument};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotElement {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Document-relative top edge.
    pub top: f64,
    /// Document-relative bottom edge.
    pub bottom: f64,
    #[serde(skip)]
    removed: bool,
}

impl SnapshotElement {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self {
            attributes: BTreeMap::new(),
            top,
            bottom,
            removed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    scroll_x: f64,
    #[serde(default)]
    scroll_y: f64,
    #[serde(default)]
    elements: Vec<SnapshotElement>,
}

impl SnapshotDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(json).context("malformed layout snapshot")?;
        debug!(
            target: "document.snapshot",
            elements = doc.elements.len(),
            scroll_y = doc.scroll_y,
            "snapshot_parsed"
        );
        Ok(doc)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading layout snapshot {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("parsing layout snapshot {}", path.display()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing layout snapshot")
    }

    /// Append an element (document coordinates) and return its id.
    pub fn push_element(&mut self, attributes: &[(&str, &str)], top: f64, bottom: f64) -> ElementId {
        let mut element = SnapshotElement::new(top, bottom);
        for (name, value) in attributes {
            element
                .attributes
                .insert((*name).to_string(), (*value).to_string());
        }
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    /// Returns false when the element does not exist.
    pub fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) -> bool {
        match self.live_mut(element) {
            Some(el) => {
                el.attributes.insert(name.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    pub fn remove_element(&mut self, element: ElementId) -> bool {
        match self.live_mut(element) {
            Some(el) => {
                el.removed = true;
                true
            }
            None => false,
        }
    }

    pub fn element(&self, element: ElementId) -> Option<&SnapshotElement> {
        self.elements.get(element.0).filter(|el| !el.removed)
    }

    pub fn len(&self) -> usize {
        self.elements.iter().filter(|el| !el.removed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    fn live_mut(&mut self, element: ElementId) -> Option<&mut SnapshotElement> {
        self.elements.get_mut(element.0).filter(|el| !el.removed)
    }
}

impl RenderedDocument for SnapshotDocument {
    fn annotated_elements(&self, attribute: &str) -> Vec<(ElementId, String)> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| !el.removed)
            .filter_map(|(idx, el)| {
                el.attributes
                    .get(attribute)
                    .map(|value| (ElementId(idx), value.clone()))
            })
            .collect()
    }

    fn bounding_rect(&self, element: ElementId) -> Option<ElementRect> {
        self.element(element)
            .map(|el| ElementRect::new(el.top - self.scroll_y, el.bottom - self.scroll_y))
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll_x = x;
        self.scroll_y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "scroll_y": 25.0,
        "elements": [
            { "attributes": { "data-line": "1", "class": "title" }, "top": 0.0, "bottom": 40.0 },
            { "attributes": { "class": "spacer" }, "top": 40.0, "bottom": 60.0 },
            { "attributes": { "data-line": "4" }, "top": 60.0, "bottom": 120.0 }
        ]
    }"#;

    #[test]
    fn parses_json_snapshot() {
        let doc = SnapshotDocument::from_json_str(SAMPLE).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.scroll_y(), 25.0);
        assert_eq!(doc.scroll_x(), 0.0);
        assert_eq!(
            doc.annotated_elements("data-line"),
            vec![(ElementId(0), "1".to_string()), (ElementId(2), "4".to_string())]
        );
    }

    #[test]
    fn bounding_rect_is_viewport_relative() {
        let doc = SnapshotDocument::from_json_str(SAMPLE).unwrap();
        assert_eq!(doc.bounding_rect(ElementId(2)), Some(ElementRect::new(35.0, 95.0)));
        assert_eq!(doc.bounding_rect(ElementId(9)), None);
    }

    #[test]
    fn malformed_snapshot_is_error() {
        let err = SnapshotDocument::from_json_str("{ \"elements\": 3 }").unwrap_err();
        assert!(err.to_string().contains("malformed layout snapshot"));
    }

    #[test]
    fn load_reports_path_in_error() {
        let missing = std::path::PathBuf::from("__no_such_snapshot__.json");
        let err = SnapshotDocument::load(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("__no_such_snapshot__.json"));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), SAMPLE).unwrap();
        let doc = SnapshotDocument::load(tmp.path()).unwrap();
        assert_eq!(doc.annotated_elements("class").len(), 2);
    }

    #[test]
    fn json_round_trip_keeps_layout() {
        let mut doc = SnapshotDocument::new();
        doc.push_element(&[("data-line", "8")], 10.0, 20.0);
        doc.scroll_to(3.0, 4.0);
        let back = SnapshotDocument::from_json_str(&doc.to_json_string().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn removed_elements_disappear_but_keep_ids() {
        let mut doc = SnapshotDocument::new();
        let a = doc.push_element(&[("data-line", "1")], 0.0, 10.0);
        let b = doc.push_element(&[("data-line", "2")], 10.0, 20.0);
        assert!(doc.remove_element(a));
        assert!(!doc.remove_element(a));
        assert_eq!(doc.bounding_rect(a), None);
        assert_eq!(doc.annotated_elements("data-line"), vec![(b, "2".to_string())]);
        let c = doc.push_element(&[], 20.0, 30.0);
        assert_ne!(c, a);
    }

    #[test]
    fn set_attribute_on_live_element() {
        let mut doc = SnapshotDocument::new();
        let a = doc.push_element(&[], 0.0, 10.0);
        assert!(doc.set_attribute(a, "data-line", "12"));
        assert!(!doc.set_attribute(ElementId(5), "data-line", "1"));
        assert_eq!(doc.annotated_elements("data-line"), vec![(a, "12".to_string())]);
    }
}
