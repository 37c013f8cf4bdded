//! The scheduled-event record.
//!
//! Events are immutable once scheduled; invalidation is expressed entirely by
//! token mismatch (see `particle::Particle::token`), never by mutating or
//! removing an already-pushed event except through the FEL's own pop/clear
//! operations.

use serde::{Deserialize, Serialize};

/// Sentinel secondary-participant index for events with no second particle
/// (cell crossings, thermostat firings, Halt).
pub const NO_PARTNER: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    PairInteraction,
    CellCross,
    Thermostat,
    Compression,
    Halt,
    Recalculate,
}

impl EventKind {
    /// Ordinal used to break exact time ties deterministically.
    pub fn ordinal(self) -> u8 {
        match self {
            EventKind::PairInteraction => 0,
            EventKind::CellCross => 1,
            EventKind::Thermostat => 2,
            EventKind::Compression => 3,
            EventKind::Recalculate => 4,
            EventKind::Halt => 5,
        }
    }
}

/// Kind-specific data carried alongside the event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    /// Pair interaction: the shell boundary being approached, and whether
    /// motion is inward or outward.
    Shell { shell_from: usize, shell_to: usize },
    /// Cell crossing: which of the six faces is being crossed.
    CellFace(CellFace),
    /// No kind-specific payload.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

/// A single scheduled event.
///
/// `a` is always the primary particle (the PEL owner). `b` is a secondary
/// index or `NO_PARTNER`. `token_a`/`token_b` are the freshness tokens
/// captured from the participants at prediction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub t: f64,
    pub kind: EventKind,
    pub a: usize,
    pub b: usize,
    pub token_a: u64,
    pub token_b: u64,
    pub payload: EventPayload,
}

impl Event {
    pub fn pair(
        t: f64,
        a: usize,
        b: usize,
        token_a: u64,
        token_b: u64,
        shell_from: usize,
        shell_to: usize,
    ) -> Self {
        Event {
            t,
            kind: EventKind::PairInteraction,
            a,
            b,
            token_a,
            token_b,
            payload: EventPayload::Shell { shell_from, shell_to },
        }
    }

    pub fn cell_cross(t: f64, a: usize, token_a: u64, face: CellFace) -> Self {
        Event {
            t,
            kind: EventKind::CellCross,
            a,
            b: NO_PARTNER,
            token_a,
            token_b: 0,
            payload: EventPayload::CellFace(face),
        }
    }

    pub fn single(t: f64, kind: EventKind, a: usize, token_a: u64) -> Self {
        Event { t, kind, a, b: NO_PARTNER, token_a, token_b: 0, payload: EventPayload::None }
    }

    /// A `Recalculate` event naming both participants of the pair whose
    /// capture state is being rebuilt from geometry.
    pub fn recalculate(t: f64, a: usize, b: usize, token_a: u64, token_b: u64) -> Self {
        Event { t, kind: EventKind::Recalculate, a, b, token_a, token_b, payload: EventPayload::None }
    }

    pub fn halt(t: f64) -> Self {
        Event { t, kind: EventKind::Halt, a: NO_PARTNER, b: NO_PARTNER, token_a: 0, token_b: 0, payload: EventPayload::None }
    }

    /// Whether this event names a second participating particle.
    pub fn has_partner(&self) -> bool {
        self.b != NO_PARTNER
    }

    /// Tie-break key for deterministic ordering of equal-time events.
    pub fn tie_break_key(&self) -> (usize, u8) {
        (self.a, self.kind.ordinal())
    }
}

/// Total order over events for use in the FEL's heaps: earliest time first,
/// ties broken by `tie_break_key`.
impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.t
            .partial_cmp(&other.t)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| self.tie_break_key().cmp(&other.tie_break_key()))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_by_time_then_tie_break() {
        let e1 = Event::pair(1.0, 0, 1, 0, 0, 0, 1);
        let e2 = Event::pair(1.0, 2, 3, 0, 0, 0, 1);
        let e3 = Event::pair(0.5, 5, 6, 0, 0, 0, 1);
        assert!(e3 < e1);
        assert!(e1 < e2); // same time, a=0 < a=2
    }

    #[test]
    fn halt_has_no_partner() {
        let h = Event::halt(100.0);
        assert!(!h.has_partner());
    }
}
