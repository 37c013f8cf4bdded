//! Binary-heap FEL discipline: one bounded min-heap per particle (the PEL),
//! plus a lazily-pruned global min-heap over current PEL heads.

use super::FutureEventList;
use crate::event::Event;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GlobalEntry {
    event: Event,
    owner: usize,
}

impl Ord for GlobalEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.event.cmp(&other.event).then_with(|| self.owner.cmp(&other.owner))
    }
}

impl PartialOrd for GlobalEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
pub struct HeapFel {
    pels: Vec<BinaryHeap<Reverse<Event>>>,
    /// Lazily-pruned: an entry is valid only if it matches the current head
    /// of its owner's PEL; stale entries (left behind by `pop_next_pel_event`
    /// or `clear_pel`) are discarded when encountered in `next`.
    global: BinaryHeap<Reverse<GlobalEntry>>,
}

impl HeapFel {
    pub fn new(n_particles: usize) -> Self {
        HeapFel { pels: (0..n_particles).map(|_| BinaryHeap::new()).collect(), global: BinaryHeap::new() }
    }

    fn push_head_if_present(&mut self, owner: usize) {
        if let Some(Reverse(event)) = self.pels[owner].peek() {
            self.global.push(Reverse(GlobalEntry { event: *event, owner }));
        }
    }

    fn current_head(&self, owner: usize) -> Option<Event> {
        self.pels[owner].peek().map(|Reverse(e)| *e)
    }
}

impl FutureEventList for HeapFel {
    fn push(&mut self, owner: usize, event: Event) {
        let was_head = self.current_head(owner);
        self.pels[owner].push(Reverse(event));
        let is_head = self.current_head(owner);
        if is_head != was_head {
            self.push_head_if_present(owner);
        }
    }

    fn next(&mut self) -> Option<(usize, Event)> {
        loop {
            let Reverse(top) = self.global.peek()?.clone();
            match self.current_head(top.owner) {
                Some(actual) if actual == top.event => return Some((top.owner, actual)),
                _ => {
                    self.global.pop();
                }
            }
        }
    }

    fn pop_next_pel_event(&mut self, owner: usize) {
        self.pels[owner].pop();
        self.push_head_if_present(owner);
    }

    fn clear_pel(&mut self, owner: usize) {
        self.pels[owner].clear();
    }

    fn stream(&mut self, _dt: f64) {
        // No-op: the heap discipline stores absolute times throughout.
    }

    fn rebuild(&mut self) {
        self.global.clear();
        for owner in 0..self.pels.len() {
            self.push_head_if_present(owner);
        }
    }

    fn is_empty(&self) -> bool {
        self.pels.iter().all(|pel| pel.is_empty())
    }
}
