//! Source line to preview scroll offset mapping.
//!
//! A `LineMapper` owns a rendered document, lazily builds a [`LineMap`] from
//! the line annotations the renderer left on its elements, and turns a source
//! line into a document-relative vertical scroll offset (exact match, linear
//! interpolation between neighbouring annotated lines, or the nearest single
//! neighbour). Unresolvable lines are `None`; scrolling to them is a no-op.
//!
//! Exposed Components:
//! - `map`: the `LineMap` table and its one-pass builder.
//! - `mapper`: `LineMapper` resolution, scrolling and cache control.

pub mod map;
pub mod mapper;

pub use map::LineMap;
pub use mapper::{LineMapper, LineMapperOptions, Resolution, ResolutionKind};
