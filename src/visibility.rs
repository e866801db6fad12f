//! Deciding which points an observer can see.
//!
//! A [`Scene`] joins every pair of input points with an opaque segment (an
//! "occluder"), and joins the observer to every point with a "ray". A point
//! is hidden if its ray crosses an occluder that doesn't end at that point.
//! The crossings are found with a single sweep, with the rays as targets.

use kurbo::Rect;

use crate::{
    geom::Point,
    segments::{SegIdx, SegVec, Segments},
    sweep::{sweep, Crossings},
    Error,
};

/// What a segment in a [`Scene`] stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum SegmentRole {
    /// The segment joining points `a` and `b`, with `a < b`.
    Occluder {
        /// The index of the first endpoint.
        a: usize,
        /// The index of the second endpoint.
        b: usize,
    },
    /// The segment from the observer to a point.
    Ray {
        /// The index of the point.
        point: usize,
    },
}

/// A set of points and an observer, with all their segments laid out for sweeping.
///
/// Segment indices are assigned deterministically: first the occluders in
/// row-major order (`(0, 1)`, `(0, 2)`, ..., `(1, 2)`, ...), then one ray
/// per point, in point order.
#[derive(Clone, Debug)]
pub struct Scene {
    points: Vec<Point>,
    observer: Point,
    bbox: Rect,
    segments: Segments,
    roles: SegVec<SegmentRole>,
    rays: Vec<SegIdx>,
}

/// Which points of a [`Scene`] are visible, and what blocks the others.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Visibility {
    visible: Vec<bool>,
    blockers: Vec<Vec<SegIdx>>,
    crossings: Crossings,
}

impl Visibility {
    /// Is point `idx` visible from the observer?
    pub fn is_visible(&self, idx: usize) -> bool {
        self.visible[idx]
    }

    /// The visibility of every point, in point order.
    pub fn visible_mask(&self) -> &[bool] {
        &self.visible
    }

    /// The indices of the visible points, in increasing order.
    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(idx, &vis)| vis.then_some(idx))
    }

    /// The occluders that hide point `idx`, in the order they were found.
    ///
    /// This is empty exactly when the point is visible.
    pub fn blockers(&self, idx: usize) -> &[SegIdx] {
        &self.blockers[idx]
    }

    /// Everything the sweep found crossing the rays, including crossings
    /// that were dismissed because they happen at the observer.
    pub fn crossings(&self) -> &Crossings {
        &self.crossings
    }
}

// Checks that everything is finite, and returns the bounding box.
fn bounding_box(points: &[Point], observer: Point) -> Result<Rect, Error> {
    let mut bbox = Rect::from_points(observer.to_kurbo(), observer.to_kurbo());
    for p in points.iter().chain(std::iter::once(&observer)) {
        if p.x.is_nan() || p.y.is_nan() {
            return Err(Error::NaN);
        }
        bbox = bbox.union_pt(p.to_kurbo());
    }
    if [bbox.x0, bbox.y0, bbox.x1, bbox.y1]
        .iter()
        .any(|c| c.is_infinite())
    {
        return Err(Error::Infinity);
    }
    Ok(bbox)
}

impl Scene {
    /// Builds the occluders and rays for a set of points and an observer.
    ///
    /// Fails if any coordinate is infinite or NaN. Duplicate points, and
    /// points that coincide with the observer, are allowed.
    pub fn new(points: Vec<Point>, observer: Point) -> Result<Self, Error> {
        let bbox = bounding_box(&points, observer)?;
        let n = points.len();

        let mut roles = SegVec::default();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2 + n);
        for a in 0..n {
            for b in (a + 1)..n {
                roles.push(SegmentRole::Occluder { a, b });
                pairs.push((points[a], points[b]));
            }
        }
        let mut segments = Segments::default();
        segments.add_segments(pairs);

        let rays = segments.add_segments(points.iter().map(|&p| (observer, p)));
        for point in 0..n {
            roles.push(SegmentRole::Ray { point });
        }
        let rays: Vec<_> = rays.map(SegIdx).collect();

        tracing::debug!(
            points = n,
            segments = segments.len(),
            "built visibility scene"
        );
        Ok(Scene {
            points,
            observer,
            bbox,
            segments,
            roles,
            rays,
        })
    }

    /// The input points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The observer's position.
    pub fn observer(&self) -> Point {
        self.observer
    }

    /// The smallest rectangle containing the points and the observer.
    pub fn bounding_box(&self) -> Rect {
        self.bbox
    }

    /// All the occluders and rays.
    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    /// What the segment `idx` stands for.
    pub fn role(&self, idx: SegIdx) -> SegmentRole {
        self.roles[idx]
    }

    /// The ray from the observer to point `idx`.
    pub fn ray(&self, idx: usize) -> SegIdx {
        self.rays[idx]
    }

    /// Finds the visible points, using tolerance `eps`.
    pub fn compute(&self, eps: f64) -> Visibility {
        let crossings = sweep(&self.segments, self.rays.iter().copied(), eps);

        let blockers: Vec<Vec<SegIdx>> = self
            .rays
            .iter()
            .map(|&ray| {
                let ray_seg = &self.segments[ray];
                crossings
                    .get(ray)
                    .iter()
                    .copied()
                    .filter(|&other| {
                        if !matches!(self.roles[other], SegmentRole::Occluder { .. }) {
                            return false;
                        }
                        // An occluder running through the observer doesn't
                        // hide anything.
                        let at_observer = ray_seg
                            .intersection(&self.segments[other], eps)
                            .is_some_and(|p| p.approx_eq(&self.observer, eps));
                        !at_observer
                    })
                    .collect()
            })
            .collect();
        let visible: Vec<bool> = blockers.iter().map(Vec::is_empty).collect();

        tracing::debug!(
            visible = visible.iter().filter(|&&v| v).count(),
            hidden = visible.iter().filter(|&&v| !v).count(),
            "computed visibility"
        );
        Visibility {
            visible,
            blockers,
            crossings,
        }
    }

    /// The visible points themselves, in input order.
    pub fn visible_points<'a>(
        &'a self,
        vis: &'a Visibility,
    ) -> impl Iterator<Item = Point> + 'a {
        vis.visible_indices().map(|idx| self.points[idx])
    }

    /// Draws the scene: occluders in faint black, rays in green (if the point
    /// is visible) or red (if it isn't).
    #[cfg(feature = "debug-svg")]
    pub fn dump_svg(&self, vis: &Visibility) -> svg::Document {
        use svg::node::element::{path::Data, Circle, Path};

        let size = self.bbox.width().max(self.bbox.height()).max(1.0);
        let pad = size / 16.0;
        let stroke_width = size / 512.0;
        let mut document = svg::Document::new().set(
            "viewBox",
            (
                self.bbox.x0 - pad,
                self.bbox.y0 - pad,
                self.bbox.width() + 2.0 * pad,
                self.bbox.height() + 2.0 * pad,
            ),
        );

        for idx in self.segments.indices() {
            let seg = &self.segments[idx];
            let (color, opacity) = match self.roles[idx] {
                SegmentRole::Occluder { .. } => ("black", 0.2),
                SegmentRole::Ray { point } if vis.is_visible(point) => ("green", 1.0),
                SegmentRole::Ray { .. } => ("red", 1.0),
            };
            let data = Data::new()
                .move_to((seg.left.x, seg.left.y))
                .line_to((seg.right.x, seg.right.y));
            let path = Path::new()
                .set("stroke", color)
                .set("stroke-width", stroke_width)
                .set("stroke-linecap", "round")
                .set("opacity", opacity)
                .set("fill", "none")
                .set("d", data);
            document = document.add(path);
        }

        let dot = |p: Point, color: &str| {
            Circle::new()
                .set("cx", p.x)
                .set("cy", p.y)
                .set("r", 3.0 * stroke_width)
                .set("fill", color)
        };
        for (idx, p) in self.points.iter().enumerate() {
            let color = if vis.is_visible(idx) { "green" } else { "red" };
            document = document.add(dot(*p, color));
        }
        document.add(dot(self.observer, "blue"))
    }
}
