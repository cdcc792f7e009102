use super::Point;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// US Letter (612 x 792 pt)
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// Map a percentage-space point into page space
    pub fn to_page(&self, percent: Point) -> Point {
        Point::new(
            percent_to_page(percent.x, self.width),
            percent_to_page(percent.y, self.height),
        )
    }
}

/// Convert a percentage of `dimension` into an absolute coordinate.
///
/// Values outside `0..=100` pass through unchanged: strokes may legitimately
/// start a little outside the nominal page.
pub fn percent_to_page(percent: f64, dimension: f64) -> f64 {
    (percent / 100.0) * dimension
}
