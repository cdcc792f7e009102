//! Clipping drawn segments against an eraser
//!
//! All clipping happens in parameter space of the original segment, so kept
//! pieces always lie exactly on it and untouched endpoints are preserved
//! bit-for-bit.
//!
//! A capsule is convex, so the part of a segment inside one capsule is a
//! single run of parameters. The eraser as a whole may cover several
//! disjoint runs; each hit capsule's run is localized on its own and the
//! gaps between the merged runs survive.

use serde::{Deserialize, Serialize};

use super::capsule::Capsule;
use super::index::{CapsuleIndex, IndexOptions};
use crate::geometry::{closest_params_segment_to_segment, Aabb, PageSize, Point, Segment};

/// Default cap on bisection steps when localizing a boundary
pub const DEFAULT_MAX_BISECTION_ITERATIONS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    pub max_bisection_iterations: u32,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            max_bisection_iterations: DEFAULT_MAX_BISECTION_ITERATIONS,
        }
    }
}

impl SplitOptions {
    pub fn with_max_bisection_iterations(mut self, iterations: u32) -> Self {
        self.max_bisection_iterations = iterations;
        self
    }
}

/// Result of querying the eraser with a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    /// Smallest `dist2 - r2` seen, or infinity when nothing was near.
    /// The search stops at the first non-positive value.
    pub excess: f64,
    /// Capsule that produced `excess`
    pub capsule: Option<usize>,
}

impl Probe {
    fn miss() -> Self {
        Self {
            excess: f64::INFINITY,
            capsule: None,
        }
    }

    pub fn hit(&self) -> bool {
        self.excess <= 0.0
    }
}

/// All capsules of one eraser stroke plus their index
pub struct EraserField {
    capsules: Vec<Capsule>,
    index: Box<dyn CapsuleIndex>,
    max_radius: f64,
}

impl std::fmt::Debug for EraserField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EraserField")
            .field("capsules", &self.capsules.len())
            .field("max_radius", &self.max_radius)
            .finish()
    }
}

impl EraserField {
    pub fn new(capsules: Vec<Capsule>, page: PageSize, options: &IndexOptions) -> Self {
        let max_radius = capsules.iter().map(|c| c.radius).fold(0.0, f64::max);
        let index = options.build(page, max_radius, capsules.len());
        Self::with_index(capsules, index)
    }

    /// Field backed by an explicit index implementation
    pub fn with_index(capsules: Vec<Capsule>, mut index: Box<dyn CapsuleIndex>) -> Self {
        let max_radius = capsules.iter().map(|c| c.radius).fold(0.0, f64::max);
        for (i, capsule) in capsules.iter().enumerate() {
            index.insert(i, &capsule.aabb);
        }
        Self {
            capsules,
            index,
            max_radius,
        }
    }

    pub fn capsules(&self) -> &[Capsule] {
        &self.capsules
    }

    pub fn is_empty(&self) -> bool {
        self.capsules.is_empty()
    }

    fn near(&self, segment: Segment) -> impl Iterator<Item = usize> + '_ {
        let query: Aabb = segment.aabb().inflate(self.max_radius);
        self.index
            .candidates(&query)
            .into_iter()
            .filter(move |&i| query.overlaps(&self.capsules[i].aabb))
    }

    pub fn probe(&self, segment: Segment) -> Probe {
        let mut best = Probe::miss();
        for i in self.near(segment) {
            let excess = self.capsules[i].excess(segment);
            if excess < best.excess {
                best = Probe {
                    excess,
                    capsule: Some(i),
                };
                if excess <= 0.0 {
                    break;
                }
            }
        }
        best
    }

    /// Every capsule touching `segment`, in index order
    pub fn touching(&self, segment: Segment) -> Vec<usize> {
        self.near(segment)
            .filter(|&i| self.capsules[i].hits(segment))
            .collect()
    }

    pub fn hits(&self, segment: Segment) -> bool {
        self.probe(segment).hit()
    }

    pub fn contains(&self, point: Point) -> bool {
        self.hits(Segment::degenerate(point))
    }
}

/// Splits segments into the pieces that survive an eraser
#[derive(Debug)]
pub struct SegmentSplitter<'a> {
    field: &'a EraserField,
    options: SplitOptions,
}

impl<'a> SegmentSplitter<'a> {
    pub fn new(field: &'a EraserField, options: SplitOptions) -> Self {
        Self { field, options }
    }

    /// Surviving pieces of `segment`, in order from `p0` to `p1`.
    pub fn split(&self, segment: Segment) -> Vec<Segment> {
        let touching = self.field.touching(segment);
        if touching.is_empty() {
            return vec![segment];
        }

        let mut runs: Vec<(f64, f64)> = touching
            .into_iter()
            .filter_map(|i| self.inside_run(segment, &self.field.capsules[i]))
            .collect();
        runs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let mut kept = Vec::new();
        let mut cursor = 0.0;
        for (lo, hi) in runs {
            if lo > cursor {
                keep_piece(segment, cursor, lo, &mut kept);
            }
            cursor = f64::max(cursor, hi);
        }
        if cursor < 1.0 {
            keep_piece(segment, cursor, 1.0, &mut kept);
        }
        kept
    }

    /// Parameters of `segment` covered by `capsule`, widened to the last
    /// points classified outside. `None` for a grazing contact that rounds
    /// to outside.
    fn inside_run(&self, segment: Segment, capsule: &Capsule) -> Option<(f64, f64)> {
        let start_inside = capsule.contains(segment.p0);
        let end_inside = capsule.contains(segment.p1);

        match (start_inside, end_inside) {
            (true, true) => Some((0.0, 1.0)),
            (false, true) => Some((self.bisect(segment, capsule, 0.0, 1.0), 1.0)),
            (true, false) => Some((0.0, self.bisect(segment, capsule, 1.0, 0.0))),
            (false, false) => {
                // The closest point to the centerline is the deepest one,
                // so it separates the entry from the exit.
                let seed = closest_params_segment_to_segment(segment, capsule.centerline()).s;
                if !capsule.contains(segment.point_at(seed)) {
                    return None;
                }
                Some((
                    self.bisect(segment, capsule, 0.0, seed),
                    self.bisect(segment, capsule, 1.0, seed),
                ))
            }
        }
    }

    /// Localizes the boundary of `capsule` between `t_outside` and
    /// `t_inside` and returns the last parameter classified outside.
    fn bisect(&self, segment: Segment, capsule: &Capsule, t_outside: f64, t_inside: f64) -> f64 {
        let mut outside = t_outside;
        let mut inside = t_inside;
        for _ in 0..self.options.max_bisection_iterations {
            let mid = (outside + inside) * 0.5;
            if capsule.contains(segment.point_at(mid)) {
                inside = mid;
            } else {
                outside = mid;
            }
        }
        outside
    }
}

fn keep_piece(segment: Segment, t0: f64, t1: f64, kept: &mut Vec<Segment>) {
    let piece = segment.sub(t0, t1);
    if piece.p0 != piece.p1 || segment.p0 == segment.p1 {
        kept.push(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erase::capsule::build_capsules;
    use crate::erase::index::{IndexKind, LinearIndex};

    fn field(points: &[(f64, f64)], radius: f64) -> EraserField {
        let points: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        EraserField::new(
            build_capsules(&points, radius),
            PageSize::letter(),
            &IndexOptions::default().with_kind(IndexKind::Grid),
        )
    }

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn test_full_exclusion_returns_segment_unchanged() {
        let eraser = field(&[(100.0, 100.0), (100.0, 200.0)], 5.0);
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());
        let s = seg(0.0, 0.0, 50.0, 0.0);
        assert_eq!(splitter.split(s), vec![s]);
    }

    #[test]
    fn test_full_containment_returns_nothing() {
        let eraser = field(&[(0.0, 0.0), (100.0, 0.0)], 10.0);
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());
        assert!(splitter.split(seg(10.0, 2.0, 90.0, -2.0)).is_empty());
    }

    #[test]
    fn test_one_endpoint_inside_is_clipped_outside() {
        // Eraser disk of radius 10 at (100, 0)
        let eraser = field(&[(100.0, 0.0)], 10.0);
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());

        let pieces = splitter.split(seg(0.0, 0.0, 100.0, 0.0));
        assert_eq!(pieces.len(), 1);
        let end = pieces[0].p1;
        assert_eq!(pieces[0].p0, Point::new(0.0, 0.0));
        assert!(!eraser.contains(end));
        assert!((end.x - 90.0).abs() < 100.0 / 2f64.powi(17));

        let pieces = splitter.split(seg(100.0, 0.0, 0.0, 0.0));
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].p1, Point::new(0.0, 0.0));
        assert!(!eraser.contains(pieces[0].p0));
        assert!((pieces[0].p0.x - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_pass_through_splits_in_two() {
        let eraser = field(&[(50.0, -20.0), (50.0, 20.0)], 5.0);
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());

        let pieces = splitter.split(seg(0.0, 0.0, 100.0, 0.0));
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].p0, Point::new(0.0, 0.0));
        assert_eq!(pieces[1].p1, Point::new(100.0, 0.0));
        assert!((pieces[0].p1.x - 45.0).abs() < 1e-3);
        assert!((pieces[1].p0.x - 55.0).abs() < 1e-3);
        assert!(!eraser.contains(pieces[0].p1));
        assert!(!eraser.contains(pieces[1].p0));
    }

    #[test]
    fn test_pass_through_off_center() {
        // The crossing is far from the segment midpoint
        let eraser = field(&[(90.0, -20.0), (90.0, 20.0)], 3.0);
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());

        let pieces = splitter.split(seg(0.0, 0.0, 100.0, 0.0));
        assert_eq!(pieces.len(), 2);
        assert!((pieces[0].p1.x - 87.0).abs() < 1e-3);
        assert!((pieces[1].p0.x - 93.0).abs() < 1e-3);
    }

    #[test]
    fn test_two_crossings_are_both_removed() {
        let eraser = field(
            &[(30.0, -20.0), (30.0, 20.0), (70.0, 20.0), (70.0, -20.0)],
            4.0,
        );
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());

        let pieces = splitter.split(seg(0.0, 0.0, 100.0, 0.0));
        assert_eq!(pieces.len(), 3);
        assert!((pieces[0].p1.x - 26.0).abs() < 1e-3);
        assert!((pieces[1].p0.x - 34.0).abs() < 1e-3);
        assert!((pieces[1].p1.x - 66.0).abs() < 1e-3);
        assert!((pieces[2].p0.x - 74.0).abs() < 1e-3);
    }

    fn assert_pieces(pieces: &[Segment], expected: &[(f64, f64)]) {
        let xs: Vec<(f64, f64)> = pieces.iter().map(|p| (p.p0.x, p.p1.x)).collect();
        assert_eq!(pieces.len(), expected.len(), "pieces: {xs:?}");
        for (&(x0, x1), &(e0, e1)) in xs.iter().zip(expected) {
            assert!((x0 - e0).abs() < 1e-3, "pieces: {xs:?}");
            assert!((x1 - e1).abs() < 1e-3, "pieces: {xs:?}");
        }
    }

    #[test]
    fn test_ink_between_two_arms_of_one_eraser_survives() {
        // U-shaped eraser whose bottom stays clear of the segment
        let eraser = field(
            &[(30.0, 320.0), (30.0, 270.0), (65.0, 270.0), (65.0, 320.0)],
            4.0,
        );
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());

        let pieces = splitter.split(seg(0.0, 300.0, 100.0, 300.0));
        assert_pieces(&pieces, &[(0.0, 26.0), (34.0, 61.0), (69.0, 100.0)]);
        assert!(pieces.iter().all(|p| !eraser.contains(p.p0) && !eraser.contains(p.p1)));
    }

    #[test]
    fn test_end_inside_keeps_ink_before_an_earlier_crossing() {
        let eraser = field(
            &[(50.0, 320.0), (50.0, 270.0), (100.0, 270.0), (100.0, 300.0)],
            5.0,
        );
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());

        let pieces = splitter.split(seg(0.0, 300.0, 100.0, 300.0));
        assert_pieces(&pieces, &[(0.0, 45.0), (55.0, 95.0)]);
    }

    #[test]
    fn test_both_ends_in_different_capsules_keeps_the_gap() {
        let eraser = field(
            &[(0.0, 320.0), (0.0, 270.0), (100.0, 270.0), (100.0, 320.0)],
            5.0,
        );
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());

        let pieces = splitter.split(seg(0.0, 300.0, 100.0, 300.0));
        assert_pieces(&pieces, &[(5.0, 95.0)]);
    }

    #[test]
    fn test_overlapping_capsules_merge() {
        // Zig-zag whose capsules overlap along the segment
        let eraser = field(&[(40.0, -10.0), (45.0, 10.0), (50.0, -10.0)], 3.0);
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());

        let pieces = splitter.split(seg(0.0, 0.0, 100.0, 0.0));
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].p0, Point::new(0.0, 0.0));
        assert_eq!(pieces[1].p1, Point::new(100.0, 0.0));
        assert!(!eraser.contains(pieces[0].p1));
        assert!(!eraser.contains(pieces[1].p0));
    }

    #[test]
    fn test_grazing_segment_terminates() {
        let eraser = field(&[(0.0, 5.0), (100.0, 5.0)], 5.0);
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());
        // Touches the capsule boundary along its whole length
        let pieces = splitter.split(seg(0.0, 0.0, 100.0, 0.0));
        assert!(pieces.len() <= 2);
    }

    #[test]
    fn test_degenerate_segment_is_point_test() {
        let eraser = field(&[(10.0, 10.0)], 3.0);
        let splitter = SegmentSplitter::new(&eraser, SplitOptions::default());

        let inside = Segment::degenerate(Point::new(11.0, 11.0));
        let outside = Segment::degenerate(Point::new(20.0, 20.0));
        assert!(splitter.split(inside).is_empty());
        assert_eq!(splitter.split(outside), vec![outside]);
    }

    #[test]
    fn test_bisection_cap_is_respected() {
        let eraser = field(&[(100.0, 0.0)], 10.0);
        let splitter = SegmentSplitter::new(
            &eraser,
            SplitOptions::default().with_max_bisection_iterations(1),
        );
        // One step: midpoint 50 is outside, so the boundary stays at 50
        let pieces = splitter.split(seg(0.0, 0.0, 100.0, 0.0));
        assert_eq!(pieces, vec![seg(0.0, 0.0, 50.0, 0.0)]);
    }

    #[test]
    fn test_zero_iterations_drops_clipped_piece() {
        let eraser = field(&[(100.0, 0.0)], 10.0);
        let splitter = SegmentSplitter::new(
            &eraser,
            SplitOptions::default().with_max_bisection_iterations(0),
        );
        // No bisection step keeps the outside endpoint as the boundary
        let pieces = splitter.split(seg(0.0, 0.0, 100.0, 0.0));
        assert!(pieces.is_empty());
    }

    #[test]
    fn test_linear_index_matches_grid() {
        let points = [(10.0, 10.0), (60.0, 40.0), (20.0, 80.0)];
        let caps = build_capsules(
            &points.iter().map(|&(x, y)| Point::new(x, y)).collect::<Vec<_>>(),
            6.0,
        );
        let grid = EraserField::new(
            caps.clone(),
            PageSize::letter(),
            &IndexOptions::default().with_kind(IndexKind::Grid),
        );
        let linear = EraserField::with_index(caps, Box::new(LinearIndex::default()));

        let s = seg(0.0, 50.0, 100.0, 30.0);
        let a = SegmentSplitter::new(&grid, SplitOptions::default()).split(s);
        let b = SegmentSplitter::new(&linear, SplitOptions::default()).split(s);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_field_never_hits() {
        let eraser = EraserField::new(Vec::new(), PageSize::letter(), &IndexOptions::default());
        assert!(eraser.is_empty());
        assert!(!eraser.contains(Point::new(0.0, 0.0)));
        let s = seg(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            SegmentSplitter::new(&eraser, SplitOptions::default()).split(s),
            vec![s]
        );
    }
}
