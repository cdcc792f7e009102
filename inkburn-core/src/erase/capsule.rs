use crate::geometry::{dist2_segment_to_segment, Aabb, Point, Segment};

/// The footprint of one eraser segment: a segment thickened by `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub a: Point,
    pub b: Point,
    pub radius: f64,
    /// Bounding box of the centerline inflated by `radius`
    pub aabb: Aabb,
}

impl Capsule {
    pub fn new(a: Point, b: Point, radius: f64) -> Self {
        Self {
            a,
            b,
            radius,
            aabb: Segment::new(a, b).aabb().inflate(radius),
        }
    }

    pub fn centerline(&self) -> Segment {
        Segment::new(self.a, self.b)
    }

    /// Squared distance from `segment` to the centerline minus the squared
    /// radius. Non-positive means the segment touches the capsule.
    pub fn excess(&self, segment: Segment) -> f64 {
        dist2_segment_to_segment(segment, self.centerline()) - self.radius * self.radius
    }

    pub fn hits(&self, segment: Segment) -> bool {
        self.excess(segment) <= 0.0
    }

    pub fn contains(&self, point: Point) -> bool {
        self.hits(Segment::degenerate(point))
    }
}

/// Builds one capsule per segment of an eraser polyline.
///
/// A single-point eraser yields one zero-length capsule (a dot).
pub fn build_capsules(points: &[Point], radius: f64) -> Vec<Capsule> {
    match points {
        [] => Vec::new(),
        [p] => vec![Capsule::new(*p, *p, radius)],
        _ => points
            .windows(2)
            .map(|pair| Capsule::new(pair[0], pair[1], radius))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capsule_aabb_is_inflated() {
        let cap = Capsule::new(Point::new(10.0, 10.0), Point::new(20.0, 5.0), 2.0);
        assert_eq!(cap.aabb, Aabb::new(8.0, 3.0, 22.0, 12.0));
    }

    #[test]
    fn test_capsule_hit_test() {
        let cap = Capsule::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 3.0);

        assert!(cap.contains(Point::new(5.0, 2.9)));
        assert!(cap.contains(Point::new(5.0, 3.0)));
        assert!(!cap.contains(Point::new(5.0, 3.1)));
        // Round end cap
        assert!(cap.contains(Point::new(12.0, 2.0)));
        assert!(!cap.contains(Point::new(12.5, 2.5)));

        let crossing = Segment::new(Point::new(5.0, -10.0), Point::new(5.0, 10.0));
        assert!(cap.hits(crossing));
        assert!((cap.excess(crossing) + 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_capsules() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        let caps = build_capsules(&points, 1.5);
        assert_eq!(caps.len(), 2);
        assert_eq!(caps[1].a, Point::new(10.0, 0.0));
        assert_eq!(caps[1].b, Point::new(10.0, 10.0));
        assert!(caps.iter().all(|c| c.radius == 1.5));
    }

    #[test]
    fn test_single_point_eraser_is_a_dot() {
        let caps = build_capsules(&[Point::new(4.0, 4.0)], 2.0);
        assert_eq!(caps.len(), 1);
        assert!(caps[0].contains(Point::new(5.0, 5.0)));
        assert!(!caps[0].contains(Point::new(6.0, 6.0)));
    }

    #[test]
    fn test_empty_eraser() {
        assert!(build_capsules(&[], 2.0).is_empty());
    }
}
