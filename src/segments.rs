use crate::{
    geom::{Point, Segment},
    num::cmp_floats,
};

typed_vec! {
    /// The identity of a segment in a [`Segments`] arena.
    ///
    /// Two segments with the same endpoints are still different segments, and
    /// crossings are reported in terms of these indices. An index only means
    /// something for the arena that handed it out.
    SegIdx,
    /// A vector indexed by [`SegIdx`].
    SegVec,
    "s"
}

/// An arena of line segments.
///
/// Look segments up by indexing with a [`SegIdx`].
/// The arena also keeps the sweep schedule: every segment's entrance and exit
/// position, sorted in the order the sweep visits them.
#[derive(Debug, Clone, Default)]
pub struct Segments {
    segs: SegVec<Segment>,

    /// All the entrance positions of segments, in sweep order.
    enter: Vec<(f64, SegIdx)>,
    /// All the exit positions of segments, in sweep order.
    exit: Vec<(f64, SegIdx)>,
}

impl Segments {
    /// The number of line segments in this arena.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    /// Iterate over all indices that can be used to index into this arena.
    pub fn indices(&self) -> impl Iterator<Item = SegIdx> {
        self.segs.indices()
    }

    /// Iterate over all segments in this arena.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segs.iter().map(|(_, seg)| seg)
    }

    /// Adds a single segment, returning its index.
    pub fn add_segment<P: Into<Point>>(&mut self, p: P, q: P) -> SegIdx {
        let old_len = self.segs.len();
        let idx = self.segs.push(Segment::new(p.into(), q.into()));
        self.update_enter_exit(old_len);
        idx
    }

    /// Adds a collection of segments, each given by its two endpoints.
    ///
    /// This can be much faster than calling `add_segment` repeatedly. The new
    /// segments get consecutive indices, in iteration order; the range of
    /// them is returned.
    pub fn add_segments<P: Into<Point>>(
        &mut self,
        pairs: impl IntoIterator<Item = (P, P)>,
    ) -> std::ops::Range<usize> {
        let old_len = self.segs.len();
        for (p, q) in pairs {
            self.segs.push(Segment::new(p.into(), q.into()));
        }
        self.update_enter_exit(old_len);
        old_len..self.segs.len()
    }

    /// Construct a segment arena from a collection of endpoint pairs.
    pub fn from_pairs<P: Into<Point>>(pairs: impl IntoIterator<Item = (P, P)>) -> Self {
        let mut ret = Self::default();
        ret.add_segments(pairs);
        ret
    }

    fn update_enter_exit(&mut self, old_len: usize) {
        for idx in old_len..self.len() {
            let seg_idx = SegIdx(idx);
            let seg = &self.segs[seg_idx];
            self.enter.push((seg.left.x, seg_idx));
            self.exit.push((seg.right.x, seg_idx));
        }

        // Entrances at the same position are sorted bottom to top, so that
        // they're fairly likely to get inserted in the sweep-line in order.
        let segs = &self.segs;
        self.enter.sort_by(|(x1, seg1), (x2, seg2)| {
            cmp_floats(*x1, *x2)
                .then_with(|| cmp_floats(segs[*seg1].left.y, segs[*seg2].left.y))
                .then(seg1.cmp(seg2))
        });
        // Vertical segments exit first: they look at the sweep line as it was
        // just before anything else leaves it.
        self.exit.sort_by(|(x1, seg1), (x2, seg2)| {
            let vertical = |idx: SegIdx| segs[idx].left.x == segs[idx].right.x;
            cmp_floats(*x1, *x2)
                .then_with(|| vertical(*seg2).cmp(&vertical(*seg1)))
                .then(seg1.cmp(seg2))
        });
    }

    /// All the entrance positions of segments, in sweep order.
    pub fn entrances(&self) -> &[(f64, SegIdx)] {
        &self.enter
    }

    /// All the exit positions of segments, in sweep order.
    pub fn exits(&self) -> &[(f64, SegIdx)] {
        &self.exit
    }
}

impl std::ops::Index<SegIdx> for Segments {
    type Output = Segment;

    fn index(&self, index: SegIdx) -> &Self::Output {
        &self.segs[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_order() {
        let segs = Segments::from_pairs([
            ((2.0, 0.0), (0.0, 1.0)),
            ((0.0, -1.0), (3.0, 0.0)),
            ((3.0, 5.0), (3.0, 0.0)),
        ]);

        let enter: Vec<_> = segs.entrances().iter().map(|(_, idx)| idx.0).collect();
        assert_eq!(enter, vec![1, 0, 2]);

        // The vertical segment exits before the other one at x = 3.
        let exit: Vec<_> = segs.exits().iter().map(|(_, idx)| idx.0).collect();
        assert_eq!(exit, vec![0, 2, 1]);
    }

    #[test]
    fn incremental_adds() {
        let mut segs = Segments::default();
        let a = segs.add_segment((1.0, 0.0), (2.0, 0.0));
        let range = segs.add_segments([((0.0, 0.0), (1.0, 1.0)), ((5.0, 5.0), (4.0, 4.0))]);
        assert_eq!(a, SegIdx(0));
        assert_eq!(range, 1..3);
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[SegIdx(2)].left, Point::new(4.0, 4.0));
        assert_eq!(segs.entrances()[0].1, SegIdx(1));
        assert_eq!(format!("{:?}", SegIdx(7)), "s_7");
    }
}
