//! Utilities for generating examples, benchmarks, and test cases.
//!
//! Most generators return a set of points together with an observer. All of
//! them are deterministic.

use crate::{Point, Segments};

type PointSet = (Vec<Point>, Point);

/// The vertices of a regular `n`-gon of the given radius, seen from its center.
///
/// The first vertex is rotated slightly off the `x` axis, so that no two
/// vertices share an `x` coordinate.
pub fn ring(n: usize, radius: f64) -> PointSet {
    let points = (0..n)
        .map(|i| {
            let theta = 0.1 + std::f64::consts::TAU * i as f64 / n as f64;
            Point::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect();
    (points, Point::new(0.0, 0.0))
}

/// An `n` by `n` grid of points with the given spacing, starting at the origin.
///
/// The observer sits in the middle of the bottom-left cell. Grids have lots
/// of collinear points and vertical segments, so they exercise the
/// degenerate paths of the sweep.
pub fn grid(n: usize, spacing: f64) -> PointSet {
    let mut points = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            points.push(Point::new(i as f64 * spacing, j as f64 * spacing));
        }
    }
    (points, Point::new(spacing / 2.0, spacing / 2.0))
}

/// `n` points along an Archimedean spiral, seen from somewhere near its center.
///
/// The angles are spaced irrationally, so the points are in fairly general
/// position: few of them are collinear, and the inner turns hide many of
/// the outer points.
pub fn spiral(n: usize) -> PointSet {
    let golden = std::f64::consts::PI * (3.0 - 5.0f64.sqrt());
    let points = (0..n)
        .map(|i| {
            let r = 1.0 + i as f64;
            let theta = golden * i as f64;
            Point::new(r * theta.cos(), r * theta.sin())
        })
        .collect();
    (points, Point::new(0.25, -0.125))
}

/// `n` points scattered over `[0, 1000]²`, seen from the middle.
///
/// The points are pseudo-random, and `seed` picks which ones.
pub fn scatter(n: usize, seed: u64) -> PointSet {
    let mut state = seed;
    let points = (0..n)
        .map(|_| {
            let x = 1000.0 * unit_float(&mut state);
            let y = 1000.0 * unit_float(&mut state);
            Point::new(x, y)
        })
        .collect();
    (points, Point::new(500.0, 500.0))
}

/// `n` long, nearly horizontal segments stacked about a unit apart.
///
/// For most of the sweep every one of them is on the sweep line, but each
/// only crosses the two or so strands on either side of it.
pub fn strands(n: usize) -> Segments {
    let mut state = n as u64;
    Segments::from_pairs((0..n).map(|i| {
        let height = i as f64;
        let left = (
            100.0 * unit_float(&mut state),
            height + 2.0 * unit_float(&mut state),
        );
        let right = (
            1000.0 - 100.0 * unit_float(&mut state),
            height + 2.0 * unit_float(&mut state),
        );
        (left, right)
    }))
}

// splitmix64, scaled to [0, 1).
fn unit_float(state: &mut u64) -> f64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}
