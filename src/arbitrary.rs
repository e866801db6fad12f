//! Utilities for fuzz and/or property testing using `arbitrary`.

use arbitrary::Unstructured;

use crate::Point;

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

fn float(u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    float_in_range(-1e3, 1e3, u)
}

/// Generate a float in some range, but give it a chance to be close to another float.
fn another_float_in_range(
    orig: f64,
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let close: bool = u.arbitrary()?;
    if close {
        let ulps: i32 = u.int_in_range(-32..=32)?;
        let scale = 1.0f64 + ulps as f64 * f64::EPSILON;
        Ok((orig * scale).clamp(start, end))
    } else {
        float_in_range(start, end, u)
    }
}

/// Generate an arbitrary point.
pub fn point(u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    Ok(Point::new(float(u)?, float(u)?))
}

/// Generate a point that has a chance of being (almost) aligned with `orig`,
/// or even equal to it.
fn another_point(orig: Point, u: &mut Unstructured<'_>) -> Result<Point, arbitrary::Error> {
    match u.int_in_range(0u8..=3)? {
        0 => Ok(orig),
        1 => Ok(Point::new(
            another_float_in_range(orig.x, -1e3, 1e3, u)?,
            float(u)?,
        )),
        2 => Ok(Point::new(
            float(u)?,
            another_float_in_range(orig.y, -1e3, 1e3, u)?,
        )),
        _ => point(u),
    }
}

/// Generate a collection of segments that are likely to share endpoints, be
/// vertical, or meet at awkward angles.
pub fn segments(u: &mut Unstructured<'_>) -> Result<Vec<(Point, Point)>, arbitrary::Error> {
    let len = u.int_in_range(0..=24)?;
    let mut ret: Vec<(Point, Point)> = Vec::with_capacity(len);
    for _ in 0..len {
        let p = match ret.last() {
            Some(&(_, q)) if u.arbitrary()? => another_point(q, u)?,
            _ => point(u)?,
        };
        let q = another_point(p, u)?;
        ret.push((p, q));
    }
    Ok(ret)
}

/// Generate the input of a visibility problem: some points, and an observer.
///
/// The observer has a chance of coinciding with, or being aligned with, one
/// of the points.
pub fn scene_points(u: &mut Unstructured<'_>) -> Result<(Vec<Point>, Point), arbitrary::Error> {
    let len = u.int_in_range(0..=12)?;
    let mut points = Vec::with_capacity(len);
    for _ in 0..len {
        let p = match points.last() {
            Some(&q) if u.arbitrary()? => another_point(q, u)?,
            _ => point(u)?,
        };
        points.push(p);
    }
    let observer = match points.first() {
        Some(&p) => another_point(p, u)?,
        None => point(u)?,
    };
    Ok((points, observer))
}
