//! Erasure of ink strokes
//!
//! An eraser stroke is turned into capsules (segments thickened by the
//! eraser radius), indexed, and used to clip every ink stroke drawn before
//! it. See [`StrokeTimeline`] for the ordering rules.

pub mod capsule;
pub mod index;
pub mod policy;
pub mod splitter;
pub mod timeline;

pub use capsule::{build_capsules, Capsule};
pub use index::{CapsuleIndex, IndexKind, IndexOptions, LinearIndex, UniformGrid};
pub use policy::EraserPolicy;
pub use splitter::{
    EraserField, Probe, SegmentSplitter, SplitOptions, DEFAULT_MAX_BISECTION_ITERATIONS,
};
pub use timeline::{filter_polyline, PageStroke, StrokeTimeline, SurvivingStroke, Tool};
