//! The sweep-line implementation.
//!
//! The main entry point is [`Sweeper`], which finds the crossings between a
//! collection of line segments and a designated set of target segments. It
//! can be run to completion, or stepped through one event at a time.

pub mod event;
pub mod status;
mod sweeper;

pub use event::{Event, EventKind, EventQueue};
pub use status::{order_at, SweepStatus};
pub use sweeper::{sweep, Crossings, SweepState, SweepStats, Sweeper};
