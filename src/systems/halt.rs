//! The run-length halt: a sentinel event at `t = t_end`, or
//! after a fixed number of executed events, that terminates the event loop.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Halt {
    /// Stop once the simulation clock reaches this absolute time.
    AtTime(f64),
    /// Stop after this many events have been executed.
    AfterEvents(u64),
}

impl Halt {
    pub fn reached(&self, current_time: f64, events_executed: u64) -> bool {
        match self {
            Halt::AtTime(t_end) => current_time >= *t_end,
            Halt::AfterEvents(n) => events_executed >= *n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_time_halts_once_clock_passes_target() {
        let halt = Halt::AtTime(10.0);
        assert!(!halt.reached(9.9, 0));
        assert!(halt.reached(10.0, 0));
    }

    #[test]
    fn after_events_halts_once_count_reached() {
        let halt = Halt::AfterEvents(5);
        assert!(!halt.reached(0.0, 4));
        assert!(halt.reached(0.0, 5));
    }
}
