//! The sweep line itself: the segments it currently crosses, bottom to top.

use std::{cmp::Ordering, collections::HashSet};

use crate::{
    num::cmp_floats,
    segments::{SegIdx, Segments},
};

/// Compares two segments by their vertical position on the sweep line at `x`.
///
/// Heights within `eps` of each other are tied, and ties are broken by slope
/// and then by segment index. The slope key is the order just past `x`, which
/// is where tied segments have to be in order for the sweep to carry on.
/// Nothing is cached, so the result is only meaningful at the `x` it was
/// asked about.
pub fn order_at(segments: &Segments, a: SegIdx, b: SegIdx, x: f64, eps: f64) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let seg_a = &segments[a];
    let seg_b = &segments[b];
    let ya = seg_a.y_at(x, eps);
    let yb = seg_b.y_at(x, eps);
    if (ya - yb).abs() > eps {
        cmp_floats(ya, yb)
    } else {
        cmp_floats(seg_a.slope(eps), seg_b.slope(eps)).then(a.cmp(&b))
    }
}

/// The ordered collection of segments that currently cross the sweep line.
///
/// The order is only valid near the sweep position it was built at, and the
/// caller passes that position to every query that compares segments.
/// Membership is tracked separately from the order, so asking whether a
/// segment is on the line never looks at the geometry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepStatus {
    segs: Vec<SegIdx>,
    members: HashSet<SegIdx>,
}

// Below this size a linear scan beats searching by height.
const LINEAR_SCAN_LEN: usize = 32;

impl SweepStatus {
    /// The number of segments on the sweep line.
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    /// Is the sweep line empty?
    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// The segments on the sweep line, bottom to top.
    pub fn as_slice(&self) -> &[SegIdx] {
        &self.segs
    }

    /// Iterates over the segments on the sweep line, bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = SegIdx> + '_ {
        self.segs.iter().copied()
    }

    /// Where `seg` would go if it were inserted at `x`.
    ///
    /// `seg` itself shouldn't be on the sweep line.
    pub fn insertion_idx(&self, seg: SegIdx, segments: &Segments, x: f64, eps: f64) -> usize {
        self.segs
            .partition_point(|&other| order_at(segments, other, seg, x, eps) == Ordering::Less)
    }

    /// Inserts a segment at its place on the sweep line at `x`, returning the position.
    pub fn insert(&mut self, seg: SegIdx, segments: &Segments, x: f64, eps: f64) -> usize {
        debug_assert!(!self.contains(seg));
        let pos = self.insertion_idx(seg, segments, x, eps);
        self.segs.insert(pos, seg);
        self.members.insert(seg);
        pos
    }

    /// The position of a segment on the sweep line at `x`.
    ///
    /// The segment is looked for among the ones at about the same height,
    /// so this is a binary search unless the order has drifted by more than
    /// the tolerance. In that case we fall back to scanning everything.
    pub fn position(&self, seg: SegIdx, segments: &Segments, x: f64, eps: f64) -> Option<usize> {
        if !self.contains(seg) {
            return None;
        }
        if self.segs.len() <= LINEAR_SCAN_LEN {
            return self.segs.iter().position(|&s| s == seg);
        }

        let height = |s: SegIdx| segments[s].y_at(x, eps);
        let y = height(seg);
        let slack = 2.0 * eps;
        let start = self.segs.partition_point(|&s| height(s) < y - slack);
        self.segs[start..]
            .iter()
            .take_while(|&&s| height(s) <= y + slack)
            .position(|&s| s == seg)
            .map(|i| i + start)
            .or_else(|| {
                tracing::trace!(?seg, x, "searching the whole sweep line");
                self.segs.iter().position(|&s| s == seg)
            })
    }

    /// Is the segment on the sweep line?
    pub fn contains(&self, seg: SegIdx) -> bool {
        self.members.contains(&seg)
    }

    /// Removes a segment from the sweep line at `x`, returning the position it had.
    pub fn remove(&mut self, seg: SegIdx, segments: &Segments, x: f64, eps: f64) -> Option<usize> {
        let pos = self.position(seg, segments, x, eps)?;
        self.remove_at(pos);
        Some(pos)
    }

    /// Removes the segment at a position on the sweep line.
    pub fn remove_at(&mut self, pos: usize) -> SegIdx {
        let seg = self.segs.remove(pos);
        self.members.remove(&seg);
        seg
    }

    /// Swaps the segments at two positions.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.segs.swap(a, b);
    }

    /// The segment just below position `pos`.
    pub fn prev(&self, pos: usize) -> Option<SegIdx> {
        pos.checked_sub(1).map(|p| self.segs[p])
    }

    /// The segment just above position `pos`.
    pub fn next(&self, pos: usize) -> Option<SegIdx> {
        self.segs.get(pos + 1).copied()
    }

    /// All the segments whose height at `x` lies in `[lo, hi]`.
    pub fn range_within(
        &self,
        lo: f64,
        hi: f64,
        segments: &Segments,
        x: f64,
        eps: f64,
    ) -> &[SegIdx] {
        let height = |seg: SegIdx| segments[seg].y_at(x, eps);
        let start = self.segs.partition_point(|&s| height(s) < lo);
        let end = start + self.segs[start..].partition_point(|&s| height(s) <= hi);
        &self.segs[start..end]
    }

    /// The run of positions around `pos` whose heights at `x` are chained
    /// together by ties, as an inclusive range.
    pub fn tie_block(&self, pos: usize, segments: &Segments, x: f64, eps: f64) -> (usize, usize) {
        let tied = |i: usize, j: usize| {
            let a = segments[self.segs[i]].y_at(x, eps);
            let b = segments[self.segs[j]].y_at(x, eps);
            (a - b).abs() <= eps
        };
        let mut lo = pos;
        while lo > 0 && tied(lo - 1, lo) {
            lo -= 1;
        }
        let mut hi = pos;
        while hi + 1 < self.segs.len() && tied(hi, hi + 1) {
            hi += 1;
        }
        (lo, hi)
    }

    /// Looks for a pair of neighboring segments where the upper one is lower,
    /// by more than `eps`, at `x`.
    pub fn find_invalid_order(
        &self,
        segments: &Segments,
        x: f64,
        eps: f64,
    ) -> Option<(SegIdx, SegIdx)> {
        self.segs.windows(2).find_map(|pair| {
            let lower = segments[pair[0]].y_at(x, eps);
            let upper = segments[pair[1]].y_at(x, eps);
            (upper < lower - eps).then_some((pair[0], pair[1]))
        })
    }
}
