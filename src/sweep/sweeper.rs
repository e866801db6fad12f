//! The sweep engine.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
};

use arrayvec::ArrayVec;

use crate::{
    segments::{SegIdx, SegVec, Segments},
    sweep::{
        event::{Event, EventKind, EventQueue},
        status::{order_at, SweepStatus},
    },
};

/// Where a [`Sweeper`] is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SweepState {
    /// No event has been processed yet.
    Idle,
    /// Some events have been processed, and there are more to come.
    Running,
    /// The event schedule is exhausted.
    Done,
}

/// The crossings found by a sweep, for each target segment.
///
/// Only target segments have entries, and only if something crosses them.
/// Each target's crossings are listed in the order they were discovered.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Crossings {
    inner: BTreeMap<SegIdx, Vec<SegIdx>>,
}

impl Crossings {
    /// The segments that were found crossing `seg`.
    pub fn get(&self, seg: SegIdx) -> &[SegIdx] {
        self.inner.get(&seg).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Was anything found crossing `seg`?
    pub fn is_crossed(&self, seg: SegIdx) -> bool {
        !self.get(seg).is_empty()
    }

    /// Iterates over the crossed targets, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SegIdx, &[SegIdx])> + '_ {
        self.inner.iter().map(|(seg, others)| (*seg, others.as_slice()))
    }

    /// The number of crossed targets.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Was nothing crossed at all?
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn push(&mut self, target: SegIdx, other: SegIdx) {
        self.inner.entry(target).or_default().push(other);
    }
}

/// Counters describing the work done by a sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SweepStats {
    /// The number of start events processed.
    pub starts: usize,
    /// The number of end events processed.
    pub ends: usize,
    /// The number of crossing events that were acted on.
    pub crossings: usize,
    /// The number of crossing events that were discarded because they no longer applied.
    pub stale_crossings: usize,
    /// The number of crossing events that were scheduled.
    pub scheduled_crossings: usize,
    /// The number of crossings found by scanning the sweep line at vertical segments.
    pub vertical_hits: usize,
    /// The number of crossings found while putting the sweep line back in
    /// order after several segments met at one position.
    pub settled_crossings: usize,
    /// The number of segments found passing through another segment's endpoint.
    pub endpoint_touches: usize,
    /// The number of sweep-line positions examined while putting the line
    /// back in order.
    pub settle_work: usize,
}

impl SweepStats {
    /// The total number of events processed.
    pub fn events(&self) -> usize {
        self.starts + self.ends + self.crossings + self.stale_crossings
    }
}

fn pair_key(a: SegIdx, b: SegIdx) -> (SegIdx, SegIdx) {
    (a.min(b), a.max(b))
}

/// Encapsulates the state of the sweep-line algorithm and allows stepping through events.
///
/// The sweeper owns the sweep position: it is the only thing that moves it,
/// and it passes it along to every comparison on the sweep line. Independent
/// sweepers don't share any state.
#[derive(Clone, Debug)]
pub struct Sweeper<'a> {
    x: f64,
    eps: f64,
    state: SweepState,
    segments: &'a Segments,
    targets: SegVec<bool>,
    status: SweepStatus,
    events: EventQueue,
    // Two straight segments cross at most once, so once a pair has been
    // handled any further crossing events for it are stale.
    resolved: HashSet<(SegIdx, SegIdx)>,
    // Segments inserted or moved at the current position. Only their tie
    // blocks can be out of order once we move on.
    dirty: Vec<SegIdx>,
    crossings: Crossings,
    stats: SweepStats,
}

impl<'segs> Sweeper<'segs> {
    /// Creates a new sweeper for a collection of segments, with a given tolerance.
    ///
    /// Only crossings involving a segment in `targets` are recorded.
    pub fn new(
        segments: &'segs Segments,
        targets: impl IntoIterator<Item = SegIdx>,
        eps: f64,
    ) -> Self {
        let mut target_set = SegVec::filled(segments.len(), false);
        for t in targets {
            debug_assert!(t.0 < segments.len(), "target {t:?} is not a segment");
            if t.0 < segments.len() {
                target_set[t] = true;
            }
        }

        let events = EventQueue::default();
        let x = events
            .peek(segments, eps)
            .map(|ev| ev.x)
            .unwrap_or(f64::NEG_INFINITY);

        Sweeper {
            x,
            eps,
            state: SweepState::Idle,
            segments,
            targets: target_set,
            status: SweepStatus::default(),
            events,
            resolved: HashSet::new(),
            dirty: Vec::new(),
            crossings: Crossings::default(),
            stats: SweepStats::default(),
        }
    }

    /// The current sweep position.
    pub fn sweep_x(&self) -> f64 {
        self.x
    }

    /// Where we are in the run.
    pub fn state(&self) -> SweepState {
        self.state
    }

    /// The segments currently on the sweep line, bottom to top.
    pub fn status(&self) -> &SweepStatus {
        &self.status
    }

    /// The crossings recorded so far.
    pub fn crossings(&self) -> &Crossings {
        &self.crossings
    }

    /// Counters for the work done so far.
    pub fn stats(&self) -> &SweepStats {
        &self.stats
    }

    /// Consumes the sweeper, returning the crossings recorded so far.
    pub fn into_crossings(self) -> Crossings {
        self.crossings
    }

    /// Processes the next event, and returns it.
    ///
    /// Returns `None` when sweeping is complete.
    pub fn step(&mut self) -> Option<Event> {
        if self.state == SweepState::Done {
            return None;
        }
        if self.state == SweepState::Running {
            let moving_on = self
                .events
                .peek(self.segments, self.eps)
                .map_or(true, |ev| ev.x > self.x + self.eps);
            if moving_on {
                self.settle();
            }
        }
        let Some(event) = self.events.pop(self.segments, self.eps) else {
            self.finish();
            return None;
        };
        if self.state == SweepState::Idle {
            tracing::debug!(
                segments = self.segments.len(),
                x = event.x,
                "starting sweep"
            );
            self.state = SweepState::Running;
        }

        self.x = event.x;
        tracing::trace!(?event, "processing");
        match event.kind {
            EventKind::Start(seg) => self.handle_start(seg),
            EventKind::End(seg) => self.handle_end(seg),
            EventKind::Crossing { lower, upper } => self.handle_crossing(lower, upper),
        }
        self.check_ranges();

        if self.events.is_empty(self.segments) {
            self.finish();
        }
        Some(event)
    }

    /// Processes all remaining events, returning the crossings found.
    pub fn run(mut self) -> Crossings {
        while self.step().is_some() {}
        self.crossings
    }

    fn finish(&mut self) {
        if self.state != SweepState::Done {
            tracing::debug!(
                stats = ?self.stats,
                crossed_targets = self.crossings.len(),
                "sweep finished"
            );
            self.state = SweepState::Done;
        }
    }

    fn handle_start(&mut self, seg_idx: SegIdx) {
        self.stats.starts += 1;
        let seg = &self.segments[seg_idx];
        // Vertical segments never join the sweep line; they're handled all at
        // once when they exit.
        if seg.is_degenerate(self.eps) || seg.is_vertical(self.eps) {
            return;
        }

        let pos = self
            .status
            .insert(seg_idx, self.segments, self.x, self.eps);
        self.dirty.push(seg_idx);
        self.touch_ties(seg_idx);
        self.schedule_around(pos);
    }

    fn handle_end(&mut self, seg_idx: SegIdx) {
        self.stats.ends += 1;
        let seg = &self.segments[seg_idx];
        if seg.is_degenerate(self.eps) {
            return;
        }
        if seg.is_vertical(self.eps) {
            self.scan_vertical(seg_idx);
            return;
        }

        let Some(pos) = self.position(seg_idx) else {
            return;
        };
        self.touch_ties(seg_idx);
        // Removing this segment might make its neighbors adjacent.
        if let (Some(prev), Some(next)) = (self.status.prev(pos), self.status.next(pos)) {
            self.schedule(prev, next);
        }
        self.status.remove_at(pos);
    }

    fn handle_crossing(&mut self, lower: SegIdx, upper: SegIdx) {
        let key = pair_key(lower, upper);
        if self.resolved.contains(&key)
            || !self.status.contains(lower)
            || !self.status.contains(upper)
        {
            self.stats.stale_crossings += 1;
            return;
        }
        self.stats.crossings += 1;
        self.resolved.insert(key);
        self.record(lower, upper);

        let jumped = self.restabilize_past_crossing(lower, upper);
        for (lower, upper) in jumped {
            self.schedule(lower, upper);
        }
        for seg in [lower, upper] {
            if let Some(pos) = self.position(seg) {
                self.schedule_around(pos);
            }
        }
    }

    /// Re-stabilizes the order of two segments past the point where they cross.
    ///
    /// Exactly at the crossing the two segments have the same height, so
    /// their relative order on the sweep line is arbitrary. We take them out,
    /// nudge the sweep position just past the crossing, put them back in (so
    /// that they get compared where they have already swapped) and then move
    /// the sweep position back to where it was.
    ///
    /// If other segments pass through the same point, `a` or `b` might move
    /// past them too. Those pairs are returned (in their old order), because
    /// they also cross here.
    fn restabilize_past_crossing(&mut self, a: SegIdx, b: SegIdx) -> Vec<(SegIdx, SegIdx)> {
        let (Some(pos_a), Some(pos_b)) = (self.position(a), self.position(b)) else {
            return Vec::new();
        };
        self.status.remove_at(pos_a.max(pos_b));
        self.status.remove_at(pos_a.min(pos_b));

        // Positions among the other segments, whose relative order doesn't change.
        let old_a = pos_a - usize::from(pos_b < pos_a);
        let old_b = pos_b - usize::from(pos_a < pos_b);
        let x = self.x;
        self.x = x + self.eps;
        let new_a = self.status.insertion_idx(a, self.segments, self.x, self.eps);
        let new_b = self.status.insertion_idx(b, self.segments, self.x, self.eps);

        let lo = old_a.min(old_b).min(new_a).min(new_b);
        let hi = old_a.max(old_b).max(new_a).max(new_b);
        let window = self.status.as_slice()[lo..hi].to_vec();

        self.status.insert(a, self.segments, self.x, self.eps);
        self.status.insert(b, self.segments, self.x, self.eps);
        self.x = x;
        self.dirty.extend([a, b]);

        let mut jumped = Vec::new();
        for (moved, old, new) in [(a, old_a, new_a), (b, old_b, new_b)] {
            let (old, new) = (old - lo, new - lo);
            if old < new {
                jumped.extend(window[old..new].iter().map(|&other| (moved, other)));
            } else {
                jumped.extend(window[new..old].iter().map(|&other| (other, moved)));
            }
        }
        jumped
    }

    // Puts the sweep line in order just past `x`, once every event at `x` has
    // been processed.
    //
    // When several segments start, end or cross at the same point, the
    // insertions at `x` compare them where they all have the same height, and
    // they can end up out of order. Segments that share an endpoint never get
    // a crossing event to fix that, so we do it here: an insertion sort that
    // records every swapped pair that really crosses.
    //
    // Everything else was in order before `x` and stays that way, so only the
    // tie blocks around segments that were inserted or moved need sorting.
    fn settle(&mut self) {
        let mut positions: Vec<usize> = std::mem::take(&mut self.dirty)
            .into_iter()
            .filter_map(|seg| self.position(seg))
            .collect();
        positions.sort_unstable();
        positions.dedup();

        let mut blocks: Vec<(usize, usize)> = Vec::new();
        for pos in positions {
            if blocks.last().is_some_and(|&(_, hi)| pos <= hi) {
                continue;
            }
            blocks.push(self.status.tie_block(pos, self.segments, self.x, self.eps));
        }
        for (lo, hi) in blocks {
            self.settle_block(lo, hi);
        }
        self.check_order();
    }

    // Insertion-sorts the inclusive range `lo..=hi` of the sweep line.
    fn settle_block(&mut self, lo: usize, hi: usize) {
        let past = self.x + self.eps;
        self.stats.settle_work += hi - lo + 1;
        let mut touched: Option<(usize, usize)> = None;
        for i in lo + 1..=hi {
            let mut j = i;
            while j > lo {
                let lower = self.status.as_slice()[j - 1];
                let upper = self.status.as_slice()[j];
                if order_at(self.segments, upper, lower, past, self.eps) != Ordering::Less {
                    break;
                }
                self.status.swap(j - 1, j);
                self.settle_pair(lower, upper);
                touched = Some(match touched {
                    Some((first, last)) => (first.min(j - 1), last.max(i)),
                    None => (j - 1, i),
                });
                j -= 1;
            }
        }

        if let Some((first, last)) = touched {
            for pos in first.saturating_sub(1)..=last {
                let pair = (self.status.as_slice().get(pos), self.status.next(pos));
                if let (Some(&lower), Some(upper)) = pair {
                    self.schedule(lower, upper);
                }
            }
        }
    }

    fn settle_pair(&mut self, lower: SegIdx, upper: SegIdx) {
        let key = pair_key(lower, upper);
        if self.resolved.contains(&key) {
            return;
        }
        let seg_lower = &self.segments[lower];
        let seg_upper = &self.segments[upper];
        if seg_lower.shares_endpoint(seg_upper, self.eps)
            || seg_lower.intersection_x(seg_upper, self.eps).is_none()
        {
            return;
        }
        self.resolved.insert(key);
        self.stats.settled_crossings += 1;
        self.record(lower, upper);
    }

    // Finds the segments passing through an endpoint of `seg_idx`, which is
    // on the sweep line right now.
    //
    // Everything that meets at that point is tied with `seg_idx` on the sweep
    // line, but other tied segments can sit between them, so they might never
    // become neighbors.
    fn touch_ties(&mut self, seg_idx: SegIdx) {
        let seg = &self.segments[seg_idx];
        let y = seg.y_at(self.x, self.eps);
        let hits: Vec<SegIdx> = self
            .status
            .range_within(y - self.eps, y + self.eps, self.segments, self.x, self.eps)
            .iter()
            .copied()
            .filter(|&other| {
                let other_seg = &self.segments[other];
                other != seg_idx
                    && !self.resolved.contains(&pair_key(seg_idx, other))
                    && !other_seg.shares_endpoint(seg, self.eps)
                    && other_seg
                        .intersection_x(seg, self.eps)
                        .is_some_and(|x| (x - self.x).abs() <= self.eps)
            })
            .collect();

        for other in hits {
            self.resolved.insert(pair_key(seg_idx, other));
            self.stats.endpoint_touches += 1;
            self.record(seg_idx, other);
        }
    }

    // Looks for crossings between a vertical segment and everything on the
    // sweep line that it spans.
    fn scan_vertical(&mut self, seg_idx: SegIdx) {
        let seg = &self.segments[seg_idx];
        let (lo, hi) = seg.y_range();
        let hits: Vec<SegIdx> = self
            .status
            .range_within(lo - self.eps, hi + self.eps, self.segments, self.x, self.eps)
            .iter()
            .copied()
            .filter(|&other| !self.segments[other].shares_endpoint(seg, self.eps))
            .collect();

        for other in hits {
            if self.resolved.insert(pair_key(seg_idx, other)) {
                self.stats.vertical_hits += 1;
                self.record(seg_idx, other);
            }
        }
    }

    fn position(&self, seg: SegIdx) -> Option<usize> {
        self.status.position(seg, self.segments, self.x, self.eps)
    }

    fn record(&mut self, a: SegIdx, b: SegIdx) {
        tracing::trace!(?a, ?b, x = self.x, "crossing");
        if self.targets[a] {
            self.crossings.push(a, b);
        }
        if self.targets[b] {
            self.crossings.push(b, a);
        }
    }

    // Schedules candidate crossings between the segment at `pos` and its neighbors.
    fn schedule_around(&mut self, pos: usize) {
        let seg = self.status.as_slice()[pos];
        let mut pairs = ArrayVec::<(SegIdx, SegIdx), 2>::new();
        if let Some(next) = self.status.next(pos) {
            pairs.push((seg, next));
        }
        if let Some(prev) = self.status.prev(pos) {
            pairs.push((prev, seg));
        }
        for (lower, upper) in pairs {
            self.schedule(lower, upper);
        }
    }

    // Schedules a crossing event between two neighboring segments, if they meet
    // on or ahead of the sweep line.
    //
    // Crossings behind the sweep line are never scheduled. Pairs that meet on
    // the sweep line get an event right here; this is how we find the pairs
    // among three or more segments that meet at a single point, and segments
    // that start in the middle of another one.
    fn schedule(&mut self, lower: SegIdx, upper: SegIdx) {
        if self.resolved.contains(&pair_key(lower, upper)) {
            return;
        }
        let seg_lower = &self.segments[lower];
        let seg_upper = &self.segments[upper];
        if seg_lower.shares_endpoint(seg_upper, self.eps) {
            return;
        }
        let Some(x) = seg_lower.intersection_x(seg_upper, self.eps) else {
            return;
        };

        let at = if x > self.x + self.eps {
            x
        } else if x >= self.x - self.eps {
            self.x
        } else {
            return;
        };
        tracing::trace!(?lower, ?upper, x = at, "scheduling crossing");
        self.stats.scheduled_crossings += 1;
        self.events.push_crossing(at, lower, upper);
    }

    #[cfg(feature = "slow-asserts")]
    fn check_ranges(&self) {
        for seg_idx in self.status.iter() {
            let seg = &self.segments[seg_idx];
            assert!(
                seg.left.x - self.eps <= self.x && self.x <= seg.right.x + self.eps,
                "segment {seg:?} out of range at x={:?}",
                self.x
            );
        }
    }

    #[cfg(feature = "slow-asserts")]
    fn check_order(&self) {
        if let Some((a, b)) = self
            .status
            .find_invalid_order(self.segments, self.x + self.eps, self.eps)
        {
            panic!("segments {a:?} and {b:?} are out of order at x={:?}", self.x);
        }
    }

    #[cfg(not(feature = "slow-asserts"))]
    fn check_ranges(&self) {}

    #[cfg(not(feature = "slow-asserts"))]
    fn check_order(&self) {}
}

/// Runs a sweep over `segments` to completion, recording the crossings of `targets`.
pub fn sweep(
    segments: &Segments,
    targets: impl IntoIterator<Item = SegIdx>,
    eps: f64,
) -> Crossings {
    Sweeper::new(segments, targets, eps).run()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{geom::Segment, num::EPS};

    fn all(segs: &Segments) -> Vec<SegIdx> {
        segs.indices().collect()
    }

    // The crossings of every pair, computed the slow way.
    fn brute_force(segs: &Segments) -> BTreeMap<SegIdx, Vec<SegIdx>> {
        let mut ret = BTreeMap::<SegIdx, Vec<SegIdx>>::new();
        for i in segs.indices() {
            for j in segs.indices() {
                if i != j
                    && !segs[i].shares_endpoint(&segs[j], EPS)
                    && segs[i].intersection_x(&segs[j], EPS).is_some()
                {
                    ret.entry(i).or_default().push(j);
                }
            }
        }
        ret
    }

    fn sorted(crossings: &Crossings) -> BTreeMap<SegIdx, Vec<SegIdx>> {
        crossings
            .iter()
            .map(|(seg, others)| {
                let mut others = others.to_vec();
                others.sort();
                (seg, others)
            })
            .collect()
    }

    #[test]
    fn simple_crossing() {
        let segs = Segments::from_pairs([((0.0, 0.0), (2.0, 2.0)), ((0.0, 2.0), (2.0, 0.0))]);
        let crossings = sweep(&segs, all(&segs), EPS);
        assert_eq!(crossings.get(SegIdx(0)), &[SegIdx(1)]);
        assert_eq!(crossings.get(SegIdx(1)), &[SegIdx(0)]);
    }

    #[test]
    fn only_targets_are_recorded() {
        let segs = Segments::from_pairs([((0.0, 0.0), (2.0, 2.0)), ((0.0, 2.0), (2.0, 0.0))]);
        let crossings = sweep(&segs, [SegIdx(1)], EPS);
        assert_eq!(crossings.len(), 1);
        assert!(!crossings.is_crossed(SegIdx(0)));
        assert_eq!(crossings.get(SegIdx(1)), &[SegIdx(0)]);
    }

    #[test]
    fn disjoint() {
        let segs = Segments::from_pairs([
            ((0.0, 0.0), (2.0, 0.0)),
            ((0.0, 1.0), (2.0, 1.0)),
            ((3.0, -1.0), (4.0, 5.0)),
        ]);
        assert!(sweep(&segs, all(&segs), EPS).is_empty());
    }

    #[test]
    fn touching_segments_do_not_cross() {
        let segs = Segments::from_pairs([
            ((0.0, 0.0), (1.0, 1.0)),
            ((1.0, 1.0), (2.0, 0.0)),
            ((0.0, 2.0), (1.0, 1.0)),
        ]);
        assert!(sweep(&segs, all(&segs), EPS).is_empty());
    }

    #[test]
    fn state_machine() {
        let segs = Segments::from_pairs([((0.0, 0.0), (2.0, 2.0)), ((0.0, 2.0), (2.0, 0.0))]);
        let mut sweeper = Sweeper::new(&segs, all(&segs), EPS);
        assert_eq!(sweeper.state(), SweepState::Idle);

        assert_matches::assert_matches!(
            sweeper.step(),
            Some(Event {
                kind: EventKind::Start(_),
                ..
            })
        );
        assert_eq!(sweeper.state(), SweepState::Running);
        assert_eq!(sweeper.status().len(), 1);

        let mut kinds = Vec::new();
        while let Some(ev) = sweeper.step() {
            kinds.push(ev.kind);
        }
        assert_eq!(sweeper.state(), SweepState::Done);
        assert_eq!(sweeper.step(), None);
        assert!(sweeper.status().is_empty());
        assert_eq!(
            kinds,
            vec![
                EventKind::Start(SegIdx(1)),
                EventKind::Crossing {
                    lower: SegIdx(0),
                    upper: SegIdx(1)
                },
                EventKind::End(SegIdx(0)),
                EventKind::End(SegIdx(1)),
            ]
        );
        assert_eq!(sweeper.stats().events(), 5);
    }

    #[test]
    fn empty() {
        let segs = Segments::default();
        let mut sweeper = Sweeper::new(&segs, [], EPS);
        assert_eq!(sweeper.step(), None);
        assert_eq!(sweeper.state(), SweepState::Done);
        assert!(sweeper.into_crossings().is_empty());
    }

    #[test]
    fn order_repaired_after_crossing() {
        // An X, with a third segment above that the lower arm of the X runs into.
        let segs = Segments::from_pairs([
            ((0.0, 0.0), (4.0, 4.0)),
            ((0.0, 2.0), (4.0, 0.0)),
            ((2.0, 3.0), (4.0, 3.0)),
        ]);
        let crossings = sweep(&segs, all(&segs), EPS);
        assert_eq!(crossings.get(SegIdx(0)), &[SegIdx(1), SegIdx(2)]);
        assert_eq!(crossings.get(SegIdx(1)), &[SegIdx(0)]);
        assert_eq!(crossings.get(SegIdx(2)), &[SegIdx(0)]);
    }

    #[test]
    fn three_through_one_point() {
        let segs = Segments::from_pairs([
            ((0.0, 0.0), (2.0, 2.0)),
            ((0.0, 2.0), (2.0, 0.0)),
            ((0.0, 1.0), (2.0, 1.0)),
        ]);
        let crossings = sweep(&segs, all(&segs), EPS);
        assert_eq!(sorted(&crossings), brute_force(&segs));
        for seg in segs.indices() {
            assert_eq!(crossings.get(seg).len(), 2);
        }
    }

    #[test]
    fn vertical_segments() {
        let segs = Segments::from_pairs([
            ((1.0, -1.0), (1.0, 1.0)),
            ((0.0, 0.0), (2.0, 0.5)),
            ((0.0, 3.0), (2.0, 3.0)),
            // Ends exactly on the vertical segment.
            ((0.0, -2.0), (1.0, -1.0)),
        ]);
        let crossings = sweep(&segs, [SegIdx(0)], EPS);
        assert_eq!(crossings.get(SegIdx(0)), &[SegIdx(1)]);
        assert_eq!(crossings.len(), 1);
    }

    #[test]
    fn crossing_just_past_an_end() {
        let a = ((0.0, 0.0), (1.0, 0.0));
        // The supporting lines cross just past the right end of `a`.
        let b = |offset: f64| ((0.5 + offset, -1.0), (1.5 + offset, 1.0));

        let segs = Segments::from_pairs([a, b(EPS / 2.0)]);
        let crossings = sweep(&segs, all(&segs), EPS);
        assert_eq!(crossings.get(SegIdx(0)), &[SegIdx(1)]);

        let segs = Segments::from_pairs([a, b(2.0 * EPS)]);
        assert!(sweep(&segs, all(&segs), EPS).is_empty());
    }

    #[test]
    fn degenerate_segments_are_ignored() {
        let segs = Segments::from_pairs([
            ((1.0, 1.0), (1.0, 1.0)),
            ((0.0, 0.0), (2.0, 2.0)),
            ((0.0, 2.0), (2.0, 0.0)),
        ]);
        let crossings = sweep(&segs, all(&segs), EPS);
        assert!(!crossings.is_crossed(SegIdx(0)));
        assert_eq!(crossings.get(SegIdx(1)), &[SegIdx(2)]);
    }

    #[test]
    fn fan_through_a_shared_point() {
        // Two segments end at the origin and three start there. None of them
        // cross, but they have to come out of the origin in the right order
        // for the last segment to meet them one at a time.
        let segs = Segments::from_pairs([
            ((-1.0, -1.0), (0.0, 0.0)),
            ((-1.0, 1.0), (0.0, 0.0)),
            ((0.0, 0.0), (2.0, 2.0)),
            ((0.0, 0.0), (2.0, -2.0)),
            ((0.0, 0.0), (2.0, 0.5)),
            ((1.0, 3.0), (2.0, -3.0)),
        ]);
        let crossings = sweep(&segs, all(&segs), EPS);
        assert_eq!(
            crossings.get(SegIdx(5)),
            &[SegIdx(2), SegIdx(4), SegIdx(3)]
        );
        assert!(!crossings.is_crossed(SegIdx(0)));
        assert!(!crossings.is_crossed(SegIdx(1)));
        assert_eq!(crossings.len(), 4);
    }

    #[test]
    fn starts_in_the_middle_of_another() {
        let segs = Segments::from_pairs([((0.0, 0.0), (2.0, 0.0)), ((1.0, 0.0), (2.0, 1.0))]);
        let crossings = sweep(&segs, all(&segs), EPS);
        assert_eq!(crossings.get(SegIdx(0)), &[SegIdx(1)]);
        assert_eq!(sorted(&crossings), brute_force(&segs));
    }

    #[test]
    fn endpoint_hidden_among_ties() {
        // Four segments meet at (1, 2). The one starting there touches the
        // one passing through, but there's always another tie between them.
        let segs = Segments::from_pairs([
            ((3.0, 4.0), (1.0, 2.0)),
            ((0.0, 4.0), (1.0, 2.0)),
            ((1.0, 2.0), (4.0, 4.0)),
            ((2.0, 1.0), (0.0, 3.0)),
            ((2.0, 0.0), (1.0, 3.0)),
        ]);
        let mut sweeper = Sweeper::new(&segs, all(&segs), EPS);
        while sweeper.step().is_some() {}
        assert!(sweeper.stats().endpoint_touches > 0);
        let crossings = sweeper.into_crossings();
        assert!(crossings.get(SegIdx(0)).contains(&SegIdx(3)));
        assert_eq!(sorted(&crossings), brute_force(&segs));
    }

    #[test]
    fn idempotent() {
        let segs = Segments::from_pairs([
            ((0.0, 0.0), (4.0, 4.0)),
            ((0.0, 2.0), (4.0, 0.0)),
            ((2.0, 3.0), (4.0, 3.0)),
            ((1.0, -1.0), (3.0, 5.0)),
        ]);
        let first = sweep(&segs, all(&segs), EPS);
        let second = sweep(&segs, all(&segs), EPS);
        assert_eq!(first, second);
    }

    #[test]
    fn bounded_work_on_a_long_sweep_line() {
        // Thousands of segments are on the sweep line at once, but each one
        // only meets a few neighbors.
        let segs = crate::generators::strands(3000);
        let mut sweeper = Sweeper::new(&segs, all(&segs), EPS);
        let mut longest = 0;
        while sweeper.step().is_some() {
            longest = longest.max(sweeper.status().len());
        }
        let stats = *sweeper.stats();
        assert_eq!(longest, segs.len());
        assert!(stats.crossings > 0);
        // Keeping the line in order only looks near the segments that moved.
        assert!(stats.settle_work <= 4 * stats.events(), "{stats:?}");

        // Strands more than two apart are separated vertically.
        let mut expected = BTreeMap::<SegIdx, Vec<SegIdx>>::new();
        for i in segs.indices() {
            let near = i.0.saturating_sub(2)..(i.0 + 3).min(segs.len());
            for j in near.map(SegIdx) {
                if i != j
                    && !segs[i].shares_endpoint(&segs[j], EPS)
                    && segs[i].intersection_x(&segs[j], EPS).is_some()
                {
                    expected.entry(i).or_default().push(j);
                }
            }
        }
        assert_eq!(sorted(&sweeper.into_crossings()), expected);
    }

    // Random segments with integer-ish endpoints in a small box would hit a lot
    // of degenerate cases, so we sample from a continuous range instead.
    fn segment() -> impl Strategy<Value = ((f64, f64), (f64, f64))> {
        ((-100.0..100.0, -100.0..100.0), (-100.0..100.0, -100.0..100.0))
    }

    // Where the supporting lines cross, unless they're close to parallel.
    fn line_crossing_x(a: &Segment, b: &Segment) -> Option<f64> {
        let (x1, y1, x2, y2) = (a.left.x, a.left.y, a.right.x, a.right.y);
        let (x3, y3, x4, y4) = (b.left.x, b.left.y, b.right.x, b.right.y);
        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        (denom.abs() >= 1e-2).then(|| {
            ((x1 * y2 - y1 * x2) * (x3 - x4) - (x1 - x2) * (x3 * y4 - y3 * x4)) / denom
        })
    }

    // Crossings very close to an endpoint, or between nearly parallel
    // segments, are legitimately sensitive to the tolerance; so are segments
    // that enter or leave the sweep line at almost the same time.
    fn general_position(pairs: &[((f64, f64), (f64, f64))]) -> bool {
        let segs: Vec<_> = pairs
            .iter()
            .map(|&(p, q)| Segment::new(p.into(), q.into()))
            .collect();
        let near = |a: f64, b: f64| (a - b).abs() < 1e-3;
        segs.iter().all(|s| s.right.x - s.left.x > 1e-3)
            && segs.iter().enumerate().all(|(i, a)| {
                segs[i + 1..].iter().all(|b| {
                    let xs = [a.left.x, a.right.x, b.left.x, b.right.x];
                    if xs[..2].iter().any(|&x| near(x, xs[2]) || near(x, xs[3])) {
                        return false;
                    }
                    match line_crossing_x(a, b) {
                        Some(px) => xs.iter().all(|&x| !near(x, px)),
                        None => false,
                    }
                })
            })
    }

    proptest! {
        #[test]
        fn agrees_with_brute_force(pairs in prop::collection::vec(segment(), 1..12)) {
            prop_assume!(general_position(&pairs));
            let segs = Segments::from_pairs(pairs);
            let crossings = sweep(&segs, all(&segs), EPS);
            prop_assert_eq!(sorted(&crossings), brute_force(&segs));
        }

        #[test]
        fn order_independent(pairs in prop::collection::vec(segment(), 1..10)) {
            prop_assume!(general_position(&pairs));
            let n = pairs.len();
            let forward = Segments::from_pairs(pairs.iter().copied());
            let backward = Segments::from_pairs(pairs.iter().rev().copied());
            let forward = sorted(&sweep(&forward, all(&forward), EPS));
            let backward = sorted(&sweep(&backward, all(&backward), EPS));

            let flip = |idx: SegIdx| SegIdx(n - 1 - idx.0);
            let renumbered: BTreeMap<_, _> = backward
                .into_iter()
                .map(|(seg, others)| {
                    let mut others: Vec<_> = others.into_iter().map(flip).collect();
                    others.sort();
                    (flip(seg), others)
                })
                .collect();
            prop_assert_eq!(forward, renumbered);
        }

        #[test]
        fn bounded_work(pairs in prop::collection::vec(segment(), 1..12)) {
            let segs = Segments::from_pairs(pairs);
            let mut sweeper = Sweeper::new(&segs, all(&segs), EPS);
            while sweeper.step().is_some() {}
            let stats = *sweeper.stats();
            let n = segs.len();
            prop_assert_eq!(sweeper.state(), SweepState::Done);
            prop_assert_eq!(stats.starts + stats.ends, 2 * n);
            prop_assert_eq!(
                stats.events(),
                2 * n + stats.scheduled_crossings
            );
            prop_assert!(stats.crossings <= n * (n - 1) / 2);
        }
    }
}
