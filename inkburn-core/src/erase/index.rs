//! Candidate pruning for capsule queries

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{Aabb, PageSize};

/// Spatial index over capsule bounding boxes.
///
/// `candidates` may return capsules whose boxes do not overlap the query, but
/// must never omit one that does. Returned indices are ascending and unique.
pub trait CapsuleIndex: Send + Sync {
    fn insert(&mut self, index: usize, aabb: &Aabb);

    fn candidates(&self, aabb: &Aabb) -> Vec<usize>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which index an eraser uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Grid,
    Linear,
    /// Grid once the eraser has at least `grid_threshold` capsules
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    pub kind: IndexKind,
    pub grid_threshold: usize,
    /// Smallest allowed grid cell, in points
    pub min_cell_size: f64,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            kind: IndexKind::Auto,
            grid_threshold: 8,
            min_cell_size: 8.0,
        }
    }
}

impl IndexOptions {
    pub fn with_kind(mut self, kind: IndexKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_grid_threshold(mut self, threshold: usize) -> Self {
        self.grid_threshold = threshold;
        self
    }

    /// Builds an empty index suited to `capsule_count` capsules of `radius`
    /// on a page of `page` size.
    pub fn build(&self, page: PageSize, radius: f64, capsule_count: usize) -> Box<dyn CapsuleIndex> {
        let use_grid = match self.kind {
            IndexKind::Grid => true,
            IndexKind::Linear => false,
            IndexKind::Auto => capsule_count >= self.grid_threshold,
        };
        if use_grid {
            let cell = self.min_cell_size.max(radius);
            let grid = UniformGrid::new(Aabb::new(0.0, 0.0, page.width, page.height), cell);
            let (nx, ny) = grid.dimensions();
            trace!("Grid index of {}x{} cells for {} capsules", nx, ny, capsule_count);
            Box::new(grid)
        } else {
            Box::new(LinearIndex::default())
        }
    }
}

/// Uniform grid over the page rectangle.
///
/// Geometry outside the rectangle is clamped into the edge cells, so off-page
/// strokes are still found.
#[derive(Debug, Clone)]
pub struct UniformGrid {
    min_x: f64,
    min_y: f64,
    cell: f64,
    nx: usize,
    ny: usize,
    buckets: Vec<Vec<usize>>,
    count: usize,
}

impl UniformGrid {
    pub fn new(bounds: Aabb, cell_size: f64) -> Self {
        let cell = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        let span = |extent: f64| -> usize {
            let n = (extent / cell).floor();
            if n.is_finite() && n >= 1.0 {
                n as usize
            } else {
                1
            }
        };
        let nx = span(bounds.max_x - bounds.min_x);
        let ny = span(bounds.max_y - bounds.min_y);

        Self {
            min_x: bounds.min_x,
            min_y: bounds.min_y,
            cell,
            nx,
            ny,
            buckets: vec![Vec::new(); nx * ny],
            count: 0,
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    fn cell_of(&self, x: f64, y: f64) -> (usize, usize) {
        let clamp = |v: f64, n: usize| -> usize {
            let max = (n - 1) as f64;
            // NaN falls through both comparisons and maps to 0
            if v >= max {
                n - 1
            } else if v > 0.0 {
                v as usize
            } else {
                0
            }
        };
        (
            clamp(((x - self.min_x) / self.cell).floor(), self.nx),
            clamp(((y - self.min_y) / self.cell).floor(), self.ny),
        )
    }

    fn cell_range(&self, aabb: &Aabb) -> ((usize, usize), (usize, usize)) {
        (
            self.cell_of(aabb.min_x, aabb.min_y),
            self.cell_of(aabb.max_x, aabb.max_y),
        )
    }
}

impl CapsuleIndex for UniformGrid {
    fn insert(&mut self, index: usize, aabb: &Aabb) {
        let ((ix0, iy0), (ix1, iy1)) = self.cell_range(aabb);
        for iy in iy0..=iy1 {
            for ix in ix0..=ix1 {
                self.buckets[iy * self.nx + ix].push(index);
            }
        }
        self.count += 1;
    }

    fn candidates(&self, aabb: &Aabb) -> Vec<usize> {
        let ((ix0, iy0), (ix1, iy1)) = self.cell_range(aabb);
        let mut found = Vec::new();
        for iy in iy0..=iy1 {
            for ix in ix0..=ix1 {
                found.extend_from_slice(&self.buckets[iy * self.nx + ix]);
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    fn len(&self) -> usize {
        self.count
    }
}

/// No pruning: every capsule is a candidate
#[derive(Debug, Clone, Default)]
pub struct LinearIndex {
    indices: Vec<usize>,
}

impl CapsuleIndex for LinearIndex {
    fn insert(&mut self, index: usize, _aabb: &Aabb) {
        self.indices.push(index);
    }

    fn candidates(&self, _aabb: &Aabb) -> Vec<usize> {
        let mut all = self.indices.clone();
        all.sort_unstable();
        all.dedup();
        all
    }

    fn len(&self) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_grid(cell: f64) -> UniformGrid {
        UniformGrid::new(Aabb::new(0.0, 0.0, 612.0, 792.0), cell)
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = page_grid(8.0);
        assert_eq!(grid.dimensions(), (76, 99));

        let tiny = UniformGrid::new(Aabb::new(0.0, 0.0, 3.0, 3.0), 8.0);
        assert_eq!(tiny.dimensions(), (1, 1));
    }

    #[test]
    fn test_grid_finds_overlapping_capsules() {
        let mut grid = page_grid(10.0);
        grid.insert(0, &Aabb::new(5.0, 5.0, 15.0, 15.0));
        grid.insert(1, &Aabb::new(300.0, 300.0, 320.0, 310.0));
        grid.insert(2, &Aabb::new(12.0, 0.0, 40.0, 8.0));

        assert_eq!(grid.candidates(&Aabb::new(0.0, 0.0, 9.0, 9.0)), vec![0]);
        assert_eq!(grid.candidates(&Aabb::new(10.0, 0.0, 19.0, 9.0)), vec![0, 2]);
        assert_eq!(grid.candidates(&Aabb::new(305.0, 305.0, 306.0, 306.0)), vec![1]);
        assert!(grid.candidates(&Aabb::new(500.0, 500.0, 510.0, 510.0)).is_empty());
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn test_grid_clamps_off_page_geometry() {
        let mut grid = page_grid(10.0);
        grid.insert(7, &Aabb::new(-50.0, -50.0, -40.0, -40.0));
        grid.insert(8, &Aabb::new(700.0, 900.0, 720.0, 920.0));

        assert_eq!(grid.candidates(&Aabb::new(-45.0, -45.0, -44.0, -44.0)), vec![7]);
        assert_eq!(grid.candidates(&Aabb::new(0.0, 0.0, 1.0, 1.0)), vec![7]);
        assert_eq!(grid.candidates(&Aabb::new(800.0, 1000.0, 801.0, 1001.0)), vec![8]);
    }

    #[test]
    fn test_candidates_are_deduplicated() {
        let mut grid = page_grid(8.0);
        grid.insert(3, &Aabb::new(0.0, 0.0, 100.0, 100.0));
        let found = grid.candidates(&Aabb::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(found, vec![3]);
    }

    #[test]
    fn test_degenerate_cell_size_does_not_panic() {
        let mut grid = UniformGrid::new(Aabb::new(0.0, 0.0, 10.0, 10.0), 0.0);
        grid.insert(0, &Aabb::new(f64::NAN, 1.0, 2.0, 2.0));
        assert_eq!(grid.candidates(&Aabb::new(0.0, 0.0, 3.0, 3.0)), vec![0]);
    }

    #[test]
    fn test_linear_index_returns_everything() {
        let mut linear = LinearIndex::default();
        linear.insert(1, &Aabb::new(0.0, 0.0, 1.0, 1.0));
        linear.insert(0, &Aabb::new(100.0, 100.0, 101.0, 101.0));
        assert_eq!(linear.candidates(&Aabb::new(50.0, 50.0, 51.0, 51.0)), vec![0, 1]);
    }

    #[test]
    fn test_auto_kind_respects_threshold() {
        let options = IndexOptions::default().with_grid_threshold(4);
        let page = PageSize::letter();
        for count in [1, 10] {
            let mut index = options.build(page, 12.0, count);
            index.insert(0, &Aabb::new(10.0, 10.0, 20.0, 20.0));
            assert_eq!(index.candidates(&Aabb::new(15.0, 15.0, 16.0, 16.0)), vec![0]);
        }
    }
}
