//! The Future Event List: a min-priority structure over
//! one Particle Event List (PEL) per particle.
//!
//! Two disciplines are offered behind the same contract — `heap` (a plain
//! binary heap of PEL heads) and `calendar` (a bucketed calendar queue) —
//! rather than unified into one implementation: the calendar discipline's
//! `stream()` rebases stored times by a constant offset, while the heap
//! discipline's `stream()` is a no-op, and callers cannot be made
//! indifferent to that difference.

pub mod calendar;
pub mod heap;

use crate::event::Event;

/// The FEL contract.
pub trait FutureEventList {
    /// Inserts `event` into `owner`'s PEL.
    fn push(&mut self, owner: usize, event: Event);

    /// The globally earliest PEL head, without removing it.
    fn next(&mut self) -> Option<(usize, Event)>;

    /// Removes the head of `owner`'s PEL.
    fn pop_next_pel_event(&mut self, owner: usize);

    /// Empties `owner`'s PEL entirely.
    fn clear_pel(&mut self, owner: usize);

    /// Rebases all scheduled times by `-dt`. Heap implementations may treat
    /// this as a no-op; calendar implementations use it to avoid bucket
    /// index overflow as the simulation clock advances.
    fn stream(&mut self, dt: f64);

    /// Re-derives the global structure from scratch after bulk insertion.
    fn rebuild(&mut self);

    fn is_empty(&self) -> bool;
}

pub use calendar::CalendarFel;
pub use heap::HeapFel;

/// Which FEL discipline a run uses — a configuration choice, not a compile
/// time one, since the tradeoff between the two depends on system size and
/// event rate rather than anything fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SchedulerKind {
    Heap,
    Calendar,
}
