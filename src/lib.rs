#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod typed_vec;

#[cfg(feature = "arbitrary")]
pub mod arbitrary;
mod geom;
pub mod num;
mod segments;
pub mod sweep;
pub mod visibility;

#[cfg(any(test, feature = "generators"))]
pub mod generators;

pub use geom::{Point, Segment};
pub use num::EPS;
pub use segments::{SegIdx, SegVec, Segments};
pub use visibility::{Scene, SegmentRole, Visibility};

/// The input points were faulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// At least one of the inputs was infinite.
    #[error("one of the inputs was infinite")]
    Infinity,
    /// At least one of the inputs was not a number.
    #[error("one of the inputs had a NaN")]
    NaN,
}

/// Returns the points that are visible from `observer`, in input order.
///
/// A point is hidden if the straight path from the observer to it crosses a
/// segment joining two other input points. This uses the default tolerance
/// [`EPS`]; see [`Scene`] for more control.
pub fn visible_points(points: &[Point], observer: Point) -> Result<Vec<Point>, Error> {
    let scene = Scene::new(points.to_vec(), observer)?;
    let vis = scene.compute(EPS);
    Ok(scene.visible_points(&vis).collect())
}
