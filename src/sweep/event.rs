//! The event schedule of the sweep.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use crate::{
    num::{cmp_floats, CheapOrderedFloat},
    segments::{SegIdx, Segments},
};

/// What happens at an [`Event`].
///
/// The variants are listed in the order that they get processed when several
/// events share a sweep position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum EventKind {
    /// The sweep line reaches a segment's left endpoint.
    Start(SegIdx),
    /// Two segments meet.
    Crossing {
        /// The segment that was below the other one when this event was scheduled.
        lower: SegIdx,
        /// The segment that was above the other one when this event was scheduled.
        upper: SegIdx,
    },
    /// The sweep line reaches a segment's right endpoint.
    End(SegIdx),
}

impl EventKind {
    fn rank(&self) -> u8 {
        match self {
            EventKind::Start(_) => 0,
            EventKind::Crossing { .. } => 1,
            EventKind::End(_) => 2,
        }
    }
}

/// A sweep event, scheduled at a horizontal position.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Event {
    /// The sweep position of this event.
    pub x: f64,
    /// What happens here.
    pub kind: EventKind,
}

impl Event {
    /// Compares two events for processing order.
    ///
    /// Events whose positions are within `eps` of one another are considered
    /// simultaneous, and then starts come before crossings, which come before
    /// ends. That way, a segment is in the sweep line before anything at its
    /// starting position gets resolved, and it stays there until every
    /// crossing at its ending position has been recorded.
    pub fn schedule_cmp(&self, other: &Event, eps: f64) -> Ordering {
        if (self.x - other.x).abs() > eps {
            cmp_floats(self.x, other.x)
        } else {
            self.kind.rank().cmp(&other.kind.rank())
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CrossingEvent {
    x: CheapOrderedFloat,
    lower: SegIdx,
    upper: SegIdx,
}

/// The queue of pending sweep events.
///
/// Start and end events are known up front: they are stored (already sorted)
/// in [`Segments`], and we only keep track of how far we've gotten through
/// them. Crossing events are discovered along the way, and they live in a
/// heap.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    /// The index of the first entrance in `Segments` that we haven't processed yet.
    next_enter_idx: usize,
    /// The index of the first exit that we haven't processed yet.
    next_exit_idx: usize,
    crossings: BinaryHeap<Reverse<CrossingEvent>>,
}

impl EventQueue {
    /// Schedules a crossing between two segments.
    pub fn push_crossing(&mut self, x: f64, lower: SegIdx, upper: SegIdx) {
        self.crossings.push(Reverse(CrossingEvent {
            x: x.into(),
            lower,
            upper,
        }));
    }

    /// Returns the next event to process, without removing it.
    pub fn peek(&self, segments: &Segments, eps: f64) -> Option<Event> {
        let enter = segments
            .entrances()
            .get(self.next_enter_idx)
            .map(|&(x, seg)| Event {
                x,
                kind: EventKind::Start(seg),
            });
        let crossing = self.crossings.peek().map(|Reverse(c)| Event {
            x: c.x.into_inner(),
            kind: EventKind::Crossing {
                lower: c.lower,
                upper: c.upper,
            },
        });
        let exit = segments
            .exits()
            .get(self.next_exit_idx)
            .map(|&(x, seg)| Event {
                x,
                kind: EventKind::End(seg),
            });

        [enter, crossing, exit]
            .into_iter()
            .flatten()
            .reduce(|best, ev| {
                if ev.schedule_cmp(&best, eps) == Ordering::Less {
                    ev
                } else {
                    best
                }
            })
    }

    /// Removes and returns the next event to process.
    pub fn pop(&mut self, segments: &Segments, eps: f64) -> Option<Event> {
        let ev = self.peek(segments, eps)?;
        match ev.kind {
            EventKind::Start(_) => self.next_enter_idx += 1,
            EventKind::Crossing { .. } => {
                self.crossings.pop();
            }
            EventKind::End(_) => self.next_exit_idx += 1,
        }
        Some(ev)
    }

    /// The number of events still waiting to be processed.
    pub fn len(&self, segments: &Segments) -> usize {
        (segments.entrances().len() - self.next_enter_idx)
            + (segments.exits().len() - self.next_exit_idx)
            + self.crossings.len()
    }

    /// Is there nothing left to process?
    pub fn is_empty(&self, segments: &Segments) -> bool {
        self.len(segments) == 0
    }
}
