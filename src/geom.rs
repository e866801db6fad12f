//! Geometric primitives, like points and lines.

use crate::num::{approx_eq, cmp_floats};

/// A two-dimensional point.
///
/// Points are sorted by `x` and then by `y`, for the convenience of our sweep-line
/// algorithm (which moves in increasing `x`).
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Horizontal coordinate, the direction of the sweep.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        cmp_floats(self.x, other.x).then_with(|| cmp_floats(self.y, other.y))
    }
}

impl PartialOrd for Point {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Point {}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        debug_assert!(x.is_finite());
        debug_assert!(y.is_finite());
        Point { x, y }
    }

    /// Are the two points within `eps` of each other in both coordinates?
    pub fn approx_eq(&self, other: &Point, eps: f64) -> bool {
        approx_eq(self.x, other.x, eps) && approx_eq(self.y, other.y, eps)
    }

    /// Converts to a `kurbo` point.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// A line segment, in sweep-line order.
///
/// The endpoints are stored so that `left <= right` in the [`Point`] order,
/// regardless of the order they were given in.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// The endpoint that the sweep line reaches first.
    pub left: Point,
    /// The endpoint that the sweep line reaches last.
    pub right: Point,
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.left, self.right)
    }
}

impl Segment {
    /// Create a new segment between two points, in either order.
    pub fn new(p: Point, q: Point) -> Self {
        if q < p {
            Self { left: q, right: p }
        } else {
            Self { left: p, right: q }
        }
    }

    /// Is this segment vertical, up to `eps`?
    ///
    /// Vertical segments occupy a single sweep position, so they never get
    /// ordered against other segments in the sweep line.
    pub fn is_vertical(&self, eps: f64) -> bool {
        (self.right.x - self.left.x).abs() < eps
    }

    /// Is this segment just a point, up to `eps`?
    pub fn is_degenerate(&self, eps: f64) -> bool {
        self.is_vertical(eps) && (self.right.y - self.left.y).abs() < eps
    }

    /// Our `y` coordinate at the given `x` coordinate.
    ///
    /// Vertical segments report the `y` coordinate of their left endpoint.
    /// Outside of our horizontal extent, this extends the supporting line.
    pub fn y_at(&self, x: f64, eps: f64) -> f64 {
        if self.is_vertical(eps) {
            self.left.y
        } else {
            let Segment { left, right } = self;
            left.y + (right.y - left.y) * (x - left.x) / (right.x - left.x)
        }
    }

    /// The slope of this segment, treating vertical segments as flat (just as
    /// [`Segment::y_at`] does).
    pub fn slope(&self, eps: f64) -> f64 {
        if self.is_vertical(eps) {
            0.0
        } else {
            (self.right.y - self.left.y) / (self.right.x - self.left.x)
        }
    }

    /// The smallest and largest `y` coordinates of this segment.
    pub fn y_range(&self) -> (f64, f64) {
        (
            self.left.y.min(self.right.y),
            self.left.y.max(self.right.y),
        )
    }

    /// Do we have an endpoint in common with `other`, up to `eps`?
    ///
    /// Two segments sharing an endpoint touch there, but they never cross.
    pub fn shares_endpoint(&self, other: &Segment, eps: f64) -> bool {
        [self.left, self.right]
            .iter()
            .any(|p| p.approx_eq(&other.left, eps) || p.approx_eq(&other.right, eps))
    }

    /// The point where the lines through `self` and `other` meet, if they
    /// meet within both segments' horizontal extents (or, for vertical
    /// segments, within their vertical extents).
    ///
    /// Nearly parallel lines (including collinear ones) are reported as not
    /// meeting. The horizontal extents are widened by `eps`, so that crossings
    /// at shared sweep positions survive rounding.
    pub fn intersection(&self, other: &Segment, eps: f64) -> Option<Point> {
        let (x1, y1, x2, y2) = (self.left.x, self.left.y, self.right.x, self.right.y);
        let (x3, y3, x4, y4) = (other.left.x, other.left.y, other.right.x, other.right.y);

        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denom.abs() < eps {
            return None;
        }

        let a = x1 * y2 - y1 * x2;
        let b = x3 * y4 - y3 * x4;
        let px = (a * (x3 - x4) - (x1 - x2) * b) / denom;
        if px < x1.max(x3) - eps || px > x2.min(x4) + eps {
            return None;
        }
        let py = (a * (y3 - y4) - (y1 - y2) * b) / denom;
        // A vertical segment's horizontal extent doesn't say anything, so
        // check its vertical extent instead.
        let outside_vertical = |seg: &Segment| {
            let (lo, hi) = seg.y_range();
            seg.is_vertical(eps) && (py < lo - eps || py > hi + eps)
        };
        if outside_vertical(self) || outside_vertical(other) {
            return None;
        }
        Some(Point { x: px, y: py })
    }

    /// The horizontal position of [`Segment::intersection`].
    pub fn intersection_x(&self, other: &Segment, eps: f64) -> Option<f64> {
        self.intersection(other, eps).map(|p| p.x)
    }

    /// Converts to a `kurbo` line.
    pub fn to_kurbo(&self) -> kurbo::Line {
        kurbo::Line::new(self.left.to_kurbo(), self.right.to_kurbo())
    }
}
