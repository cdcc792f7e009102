//! Distance primitives
//!
//! Everything here works on squared distances. Callers compare against a
//! squared radius, so the square root never has to be taken on the hot path.

use super::{Point, Segment};

/// Below this value of `a*c - b*b` two segments are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-12;

/// Squared lengths at or below this are treated as points.
const DEGENERATE_EPSILON: f64 = 1e-24;

/// Closest points between two segments, as parameters along each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPair {
    /// Parameter along the first segment, in `[0, 1]`
    pub s: f64,
    /// Parameter along the second segment, in `[0, 1]`
    pub t: f64,
    /// Squared distance between the two closest points
    pub dist2: f64,
}

fn clamp01(t: f64) -> f64 {
    if t < 0.0 {
        0.0
    } else if t > 1.0 {
        1.0
    } else {
        t
    }
}

/// Parameter `t` in `[0, 1]` of the point on `a..b` closest to `p`.
///
/// A zero-length segment always yields `0`.
pub fn closest_param_on_segment(p: Point, a: Point, b: Point) -> f64 {
    let v = b - a;
    let denom = v.dot(v);
    if denom == 0.0 {
        return 0.0;
    }
    clamp01((p - a).dot(v) / denom)
}

/// Squared distance from `p` to the segment `a..b`
pub fn dist2_point_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let t = closest_param_on_segment(p, a, b);
    p.dist2(a.lerp(b, t))
}

/// Closest pair between two segments.
///
/// The general case follows the classic closest-points-between-segments
/// construction: solve for the unclamped line parameters, clamp `s` to the
/// first segment, recompute `t`, and clamp `t` back onto the second segment
/// with a matching correction of `s`. Point-like inputs are routed to the
/// point/segment primitive first, because the parallel branch of the general
/// construction pins `s` to zero and would miss the closest point when only
/// the second segment has collapsed.
pub fn closest_params_segment_to_segment(first: Segment, second: Segment) -> ClosestPair {
    let u = first.p1 - first.p0;
    let v = second.p1 - second.p0;
    let w = first.p0 - second.p0;

    let a = u.dot(u);
    let c = v.dot(v);

    if a <= DEGENERATE_EPSILON && c <= DEGENERATE_EPSILON {
        return ClosestPair {
            s: 0.0,
            t: 0.0,
            dist2: first.p0.dist2(second.p0),
        };
    }
    if a <= DEGENERATE_EPSILON {
        let t = closest_param_on_segment(first.p0, second.p0, second.p1);
        return ClosestPair {
            s: 0.0,
            t,
            dist2: first.p0.dist2(second.point_at(t)),
        };
    }
    if c <= DEGENERATE_EPSILON {
        let s = closest_param_on_segment(second.p0, first.p0, first.p1);
        return ClosestPair {
            s,
            t: 0.0,
            dist2: first.point_at(s).dist2(second.p0),
        };
    }

    let b = u.dot(v);
    let d = u.dot(w);
    let e = v.dot(w);
    let denom = a * c - b * b;

    let (mut s_num, mut s_den, mut t_num, t_den) = if denom < PARALLEL_EPSILON {
        (0.0, 1.0, e, c)
    } else {
        let s_num = b * e - c * d;
        let t_num = a * e - b * d;
        if s_num < 0.0 {
            (0.0, denom, e, c)
        } else if s_num > denom {
            (denom, denom, e + b, c)
        } else {
            (s_num, denom, t_num, denom)
        }
    };

    if t_num < 0.0 {
        t_num = 0.0;
        if -d < 0.0 {
            s_num = 0.0;
        } else if -d > a {
            s_num = s_den;
        } else {
            s_num = -d;
            s_den = a;
        }
    } else if t_num > t_den {
        t_num = t_den;
        if -d + b < 0.0 {
            s_num = 0.0;
        } else if -d + b > a {
            s_num = s_den;
        } else {
            s_num = -d + b;
            s_den = a;
        }
    }

    let s = if s_num.abs() < PARALLEL_EPSILON {
        0.0
    } else {
        s_num / s_den
    };
    let t = if t_num.abs() < PARALLEL_EPSILON {
        0.0
    } else {
        t_num / t_den
    };

    let closest_first = first.p0 + u * s;
    let closest_second = second.p0 + v * t;
    ClosestPair {
        s,
        t,
        dist2: closest_first.dist2(closest_second),
    }
}

/// Minimum squared distance between two segments
pub fn dist2_segment_to_segment(first: Segment, second: Segment) -> f64 {
    closest_params_segment_to_segment(first, second).dist2
}
