//! Line -> scroll offset resolution over a rendered document.
//!
//! Resolution precedence for a requested `line`:
//! 1. Exact: `line` is mapped -> top edge of its element.
//! 2. Interpolation: `prev` = largest mapped line `< line`, `next` = smallest
//!    mapped line `>= line`. With both present and `prev`'s bottom strictly
//!    above `next`'s top, the position is linear between the two edges.
//! 3. Single neighbour: top edge of `prev` if present, else `next`. This also
//!    covers an overlapping or inverted gap between `prev` and `next`.
//! 4. Neither neighbour -> `None`, and scrolling is a no-op.
//!
//! All positions are document-relative (see `core_document::measure`).
//!
//! The line map is built lazily on first use and cached until `invalidate`,
//! `rebuild` or `replace_document`. Mutating the document through
//! `document_mut` does not touch the cache.

use std::cell::OnceCell;

use core_config::Config;
use core_document::{DEFAULT_LINE_ATTRIBUTE, Edge, ElementId, RenderedDocument, measure};
use tracing::{trace, warn};

use crate::LineMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMapperOptions {
    /// Element attribute carrying the source line number.
    pub attribute: String,
    /// Estimate positions between annotated lines.
    pub interpolate: bool,
}

impl Default for LineMapperOptions {
    fn default() -> Self {
        Self {
            attribute: DEFAULT_LINE_ATTRIBUTE.to_string(),
            interpolate: true,
        }
    }
}

impl From<&Config> for LineMapperOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            attribute: cfg.line_attribute().to_string(),
            interpolate: cfg.interpolate(),
        }
    }
}

/// How a position was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    Exact,
    Interpolated { prev: u32, next: u32 },
    Nearest { line: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub position: f64,
    pub kind: ResolutionKind,
}

pub struct LineMapper<D> {
    document: D,
    options: LineMapperOptions,
    map: OnceCell<LineMap>,
}

impl<D: RenderedDocument> LineMapper<D> {
    pub fn new(document: D) -> Self {
        Self::with_options(document, LineMapperOptions::default())
    }

    pub fn with_options(document: D, options: LineMapperOptions) -> Self {
        Self {
            document,
            options,
            map: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &LineMapperOptions {
        &self.options
    }

    /// Cached line map, scanning the document on first call.
    pub fn line_map(&self) -> &LineMap {
        self.map
            .get_or_init(|| LineMap::build(&self.document, &self.options.attribute))
    }

    pub fn is_built(&self) -> bool {
        self.map.get().is_some()
    }

    /// Drop the cached map; the next query scans the document again.
    pub fn invalidate(&mut self) {
        if self.map.take().is_some() {
            trace!(target: "linemap.build", "line_map_invalidated");
        }
    }

    /// Drop the cached map and scan the document now.
    pub fn rebuild(&mut self) -> &LineMap {
        self.invalidate();
        self.line_map()
    }

    pub fn resolve_position(&self, line: u32) -> Option<f64> {
        self.resolve(line).map(|r| r.position)
    }

    pub fn resolve(&self, line: u32) -> Option<Resolution> {
        let map = self.line_map();

        if let Some(element) = map.get(line) {
            let position = self.measure(line, element, Edge::Top)?;
            return Some(Resolution {
                position,
                kind: ResolutionKind::Exact,
            });
        }

        let (prev, next) = map.neighbors(line);
        if self.options.interpolate
            && let (Some(prev), Some(next)) = (prev, next)
            && let Some(position) = self.interpolate(map, line, prev, next)
        {
            return Some(Resolution {
                position,
                kind: ResolutionKind::Interpolated { prev, next },
            });
        }

        // Prefer the previous line even when the next one is closer.
        let nearest = prev.or(next)?;
        let element = map.get(nearest)?;
        let position = self.measure(nearest, element, Edge::Top)?;
        trace!(target: "linemap.resolve", line, nearest, position, "nearest_line");
        Some(Resolution {
            position,
            kind: ResolutionKind::Nearest { line: nearest },
        })
    }

    /// Linear estimate between `prev`'s bottom and `next`'s top. `None` when
    /// the gap is empty or inverted, or an element can't be measured.
    fn interpolate(&self, map: &LineMap, line: u32, prev: u32, next: u32) -> Option<f64> {
        let prev_bottom = self.measure(prev, map.get(prev)?, Edge::Bottom)?;
        let next_top = self.measure(next, map.get(next)?, Edge::Top)?;
        // Only a strictly positive gap interpolates; NaN edges fall through.
        if prev_bottom < next_top {
            let fraction = f64::from(line - prev) / f64::from(next - prev);
            return Some(prev_bottom + (next_top - prev_bottom) * fraction);
        }
        trace!(
            target: "linemap.resolve",
            line,
            prev,
            next,
            prev_bottom,
            next_top,
            "interpolation_gap_degenerate"
        );
        None
    }

    fn measure(&self, line: u32, element: ElementId, edge: Edge) -> Option<f64> {
        let position = measure(&self.document, element, edge);
        if position.is_none() {
            warn!(
                target: "linemap.resolve",
                line,
                %element,
                ?edge,
                "stale_element_in_line_map"
            );
        }
        position
    }

    /// Scroll to the resolved position of `line`. Returns whether a scroll
    /// happened; an unresolvable line leaves the viewport untouched.
    pub fn scroll_to_line(&mut self, line: u32) -> bool {
        match self.resolve_position(line) {
            Some(position) => {
                self.scroll_to_position(position);
                true
            }
            None => {
                trace!(target: "linemap.scroll", line, "line_not_resolved");
                false
            }
        }
    }

    /// Scroll the viewport to `position` (document-relative) at the left
    /// edge. Clamping is left to the host.
    pub fn scroll_to_position(&mut self, position: f64) {
        trace!(target: "linemap.scroll", position, "scroll_to_position");
        self.document.scroll_to(0.0, position);
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable access for the host. The cached map is kept; call
    /// `invalidate` after changing annotated elements.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// Swap in a freshly rendered document, returning the old one.
    pub fn replace_document(&mut self, document: D) -> D {
        self.invalidate();
        std::mem::replace(&mut self.document, document)
    }

    pub fn into_document(self) -> D {
        self.document
    }
}
