//! Chronological replay of ink and eraser strokes on one page
//!
//! The timeline is a fold: every eraser step consumes the current set of
//! surviving strokes and produces a new one. An eraser only ever sees ink that
//! was accumulated before it, so later ink is never erased retroactively.

use tracing::debug;

use super::capsule::build_capsules;
use super::index::IndexOptions;
use super::splitter::{EraserField, SegmentSplitter, SplitOptions};
use crate::geometry::{PageSize, Point, Segment};
use crate::graphics::Color;

/// Endpoints closer than this on both axes are treated as the same vertex
pub const CONTINUITY_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ink,
    Eraser,
}

impl Tool {
    /// `eraser` and `fine-eraser` erase, every other tag draws.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "eraser" | "fine-eraser" => Tool::Eraser,
            _ => Tool::Ink,
        }
    }
}

/// One stroke in page space, ready for the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct PageStroke {
    pub tool: Tool,
    pub points: Vec<Point>,
    pub color: Color,
    pub width: f64,
}

impl PageStroke {
    pub fn ink(points: Vec<Point>, color: Color, width: f64) -> Self {
        Self {
            tool: Tool::Ink,
            points,
            color,
            width,
        }
    }

    pub fn eraser(points: Vec<Point>) -> Self {
        Self {
            tool: Tool::Eraser,
            points,
            color: Color::default(),
            width: 0.0,
        }
    }
}

/// What is left of one ink stroke after erasure
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivingStroke {
    pub color: Color,
    pub width: f64,
    /// Connected runs, each with at least two points, or a single point for
    /// a dot that was never erased
    pub polylines: Vec<Vec<Point>>,
}

impl SurvivingStroke {
    pub fn segment_count(&self) -> usize {
        self.polylines
            .iter()
            .map(|p| p.len().saturating_sub(1))
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct StrokeTimeline {
    page: PageSize,
    radius: f64,
    split: SplitOptions,
    index: IndexOptions,
    strokes: Vec<SurvivingStroke>,
    erasers_applied: usize,
}

impl StrokeTimeline {
    /// Timeline for a page whose erasers all use `radius`
    pub fn new(page: PageSize, radius: f64) -> Self {
        Self {
            page,
            radius,
            split: SplitOptions::default(),
            index: IndexOptions::default(),
            strokes: Vec::new(),
            erasers_applied: 0,
        }
    }

    pub fn with_split_options(mut self, split: SplitOptions) -> Self {
        self.split = split;
        self
    }

    pub fn with_index_options(mut self, index: IndexOptions) -> Self {
        self.index = index;
        self
    }

    pub fn strokes(&self) -> &[SurvivingStroke] {
        &self.strokes
    }

    pub fn erasers_applied(&self) -> usize {
        self.erasers_applied
    }

    /// Advances the timeline by one stroke
    pub fn apply(mut self, stroke: &PageStroke) -> Self {
        if stroke.points.is_empty() {
            return self;
        }
        match stroke.tool {
            Tool::Ink => {
                self.strokes.push(SurvivingStroke {
                    color: stroke.color,
                    width: stroke.width,
                    polylines: vec![stroke.points.clone()],
                });
                self
            }
            Tool::Eraser => self.erase(&stroke.points),
        }
    }

    /// Replays `strokes` in order and returns the survivors
    pub fn run<'s, I>(self, strokes: I) -> Vec<SurvivingStroke>
    where
        I: IntoIterator<Item = &'s PageStroke>,
    {
        strokes
            .into_iter()
            .fold(self, |timeline, stroke| timeline.apply(stroke))
            .finish()
    }

    pub fn finish(self) -> Vec<SurvivingStroke> {
        self.strokes
    }

    fn erase(self, eraser: &[Point]) -> Self {
        if self.radius.is_nan() || self.radius <= 0.0 {
            debug!("Skipping eraser with non-positive radius {}", self.radius);
            return self;
        }

        let field = EraserField::new(build_capsules(eraser, self.radius), self.page, &self.index);
        let splitter = SegmentSplitter::new(&field, self.split.clone());

        let before = self.strokes.len();
        let strokes: Vec<SurvivingStroke> = self
            .strokes
            .into_iter()
            .filter_map(|stroke| {
                let polylines: Vec<Vec<Point>> = stroke
                    .polylines
                    .iter()
                    .flat_map(|polyline| filter_polyline(polyline, &field, &splitter))
                    .collect();
                if polylines.is_empty() {
                    None
                } else {
                    Some(SurvivingStroke {
                        polylines,
                        ..stroke
                    })
                }
            })
            .collect();

        debug!(
            "Applied eraser with {} capsules, {} of {} strokes remaining",
            field.capsules().len(),
            strokes.len(),
            before
        );

        Self {
            strokes,
            erasers_applied: self.erasers_applied + 1,
            ..self
        }
    }
}

fn continues(last: Point, next: Point) -> bool {
    (last.x - next.x).abs() < CONTINUITY_EPSILON && (last.y - next.y).abs() < CONTINUITY_EPSILON
}

/// Splits one polyline against an eraser and reassembles the surviving
/// pieces into connected runs.
pub fn filter_polyline(
    polyline: &[Point],
    field: &EraserField,
    splitter: &SegmentSplitter<'_>,
) -> Vec<Vec<Point>> {
    match polyline {
        [] => return Vec::new(),
        [dot] => {
            return if field.contains(*dot) {
                Vec::new()
            } else {
                vec![vec![*dot]]
            }
        }
        _ => {}
    }

    let mut runs: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();

    let flush = |current: &mut Vec<Point>, runs: &mut Vec<Vec<Point>>| {
        if current.len() >= 2 {
            runs.push(std::mem::take(current));
        } else {
            current.clear();
        }
    };

    for pair in polyline.windows(2) {
        let pieces = splitter.split(Segment::new(pair[0], pair[1]));
        if pieces.is_empty() {
            flush(&mut current, &mut runs);
            continue;
        }
        for piece in pieces {
            match current.last() {
                Some(&last) if continues(last, piece.p0) => current.push(piece.p1),
                Some(_) => {
                    flush(&mut current, &mut runs);
                    current.extend([piece.p0, piece.p1]);
                }
                None => current.extend([piece.p0, piece.p1]),
            }
        }
    }
    flush(&mut current, &mut runs);
    runs
}
