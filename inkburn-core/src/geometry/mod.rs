//! Basic geometric types for burning
//!
//! Page space has its origin at the top-left corner of the page box with y
//! growing downward, matching the drawing surface the annotations came from.
//! PDF user space (origin bottom-left) only appears in [`Rectangle`] and in the
//! renderer.

mod kernel;
mod normalize;

pub use kernel::{
    closest_param_on_segment, closest_params_segment_to_segment, dist2_point_to_segment,
    dist2_segment_to_segment, ClosestPair, PARALLEL_EPSILON,
};
pub use normalize::{percent_to_page, PageSize};

use std::ops::{Add, Mul, Sub};

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin point (0, 0)
    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Squared distance to another point
    pub fn dist2(self, other: Point) -> f64 {
        let d = self - other;
        d.dot(d)
    }

    /// Linear interpolation that returns `self` exactly at `t == 0` and
    /// `other` exactly at `t == 1`.
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            (1.0 - t) * self.x + t * other.x,
            (1.0 - t) * self.y + t * other.y,
        )
    }

    /// Component-wise equality within `epsilon`
    pub fn approx_eq(self, other: Point, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// A rectangle in PDF user space defined by two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// Lower-left corner
    pub lower_left: Point,
    /// Upper-right corner
    pub upper_right: Point,
}

impl Rectangle {
    /// Create a new rectangle from two points
    pub fn new(lower_left: Point, upper_right: Point) -> Self {
        Self {
            lower_left,
            upper_right,
        }
    }

    /// Create a rectangle from any two opposite corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            lower_left: Point::new(a.x.min(b.x), a.y.min(b.y)),
            upper_right: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Create a rectangle from position and size
    pub fn from_position_and_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            lower_left: Point::new(x, y),
            upper_right: Point::new(x + width, y + height),
        }
    }

    /// Get the width
    pub fn width(&self) -> f64 {
        self.upper_right.x - self.lower_left.x
    }

    /// Get the height
    pub fn height(&self) -> f64 {
        self.upper_right.y - self.lower_left.y
    }
}

/// Axis-aligned bounding box in page space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Aabb {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Grow the box by `r` on every side
    pub fn inflate(self, r: f64) -> Self {
        Self::new(self.min_x - r, self.min_y - r, self.max_x + r, self.max_y + r)
    }

    /// Boxes touching at an edge count as overlapping
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max_x < other.min_x
            || other.max_x < self.min_x
            || self.max_y < other.min_y
            || other.max_y < self.min_y)
    }

    pub fn union(self, other: Aabb) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }
}

/// A single straight piece of a polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p0: Point,
    pub p1: Point,
}

impl Segment {
    pub fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }

    /// Zero-length segment used for point-in-region tests
    pub fn degenerate(p: Point) -> Self {
        Self { p0: p, p1: p }
    }

    pub fn length2(&self) -> f64 {
        self.p0.dist2(self.p1)
    }

    pub fn is_degenerate(&self) -> bool {
        self.p0 == self.p1
    }

    /// Point at parameter `t` along the segment
    pub fn point_at(&self, t: f64) -> Point {
        self.p0.lerp(self.p1, t)
    }

    /// The sub-segment between parameters `t0` and `t1`
    pub fn sub(&self, t0: f64, t1: f64) -> Segment {
        Segment::new(self.point_at(t0), self.point_at(t1))
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.p0.x.min(self.p1.x),
            self.p0.y.min(self.p1.y),
            self.p0.x.max(self.p1.x),
            self.p0.y.max(self.p1.y),
        )
    }
}
