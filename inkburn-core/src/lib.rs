//! # inkburn
//!
//! Burns on-screen markup into PDF pages: freehand ink strokes, typed text
//! boxes and sticky notes. Eraser strokes are honored in drawing order, so an
//! eraser removes only the ink drawn before it.
//!
//! ## Features
//!
//! - **Exact erasure**: ink is clipped against eraser capsules with
//!   closest-point geometry and bisection, not rasterized
//! - **Spatial index**: a uniform grid prunes capsule candidates for long
//!   eraser strokes
//! - **Timeline semantics**: later ink drawn over an erased area stays intact
//! - **Vector output**: surviving strokes, text boxes and `/Text` notes are
//!   appended to the existing page without touching its content
//! - **Batch processing**: many documents on a pool of worker threads
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inkburn::{parse_records, AnnotationBurner, BurnOptions};
//!
//! # fn main() -> inkburn::Result<()> {
//! let json = std::fs::read_to_string("annotations.json")?;
//! let parsed = parse_records(&json)?;
//!
//! let burner = AnnotationBurner::new(BurnOptions::default());
//! let report = burner.burn_file("submission.pdf", &parsed.records, "submission_annotated.pdf")?;
//! println!("Burned {} page(s)", report.pages_burned());
//! # Ok(())
//! # }
//! ```
//!
//! ## Coordinates
//!
//! Records carry percentages of the page box with the origin at the top-left
//! corner and y growing downward. Everything up to rendering works in page
//! space (the same orientation, in points); [`render::PageFrame`] maps page
//! space into PDF user space.

pub mod annotations;
pub mod batch;
pub mod burn;
#[cfg(feature = "compression")]
pub mod compression;
pub mod erase;
pub mod error;
pub mod geometry;
pub mod graphics;
pub mod pdf;
pub mod record;
pub mod render;
pub mod text;

pub use burn::{burn_annotations_to_pdf, plan_page, AnnotationBurner, BurnOptions, BurnReport, PagePlan, PageReport};
pub use erase::{EraserPolicy, IndexKind, IndexOptions, SplitOptions, StrokeTimeline, SurvivingStroke};
pub use error::{BurnError, Result};
pub use geometry::{PageSize, Point, Rectangle, Segment};
pub use graphics::Color;
pub use pdf::PdfSurface;
pub use record::{parse_records, AnnotationRecord, PageAnnotations, ParsedRecords, SkippedRecord};
pub use render::{RenderOptions, FONT_RESOURCE_NAME};

/// Current version of inkburn
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
