use crate::messages::{Event, EventKind};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Min-heap over `Event`, ordered by `(timestamp, priority, sequence)`.
///
/// `std::collections::BinaryHeap` is a max-heap, so entries are wrapped in `Reverse` to
/// get min-heap-by-timestamp behaviour out of it. There is no "peek and mutate" path:
/// handlers that want to change an event's effective ordering pop it and push a new one.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Stamps the event with the next sequence number and pushes it.
    pub fn push(&mut self, timestamp: DateTime<Utc>, kind: EventKind) {
        let event = Event {
            timestamp,
            sequence: self.next_sequence,
            kind,
        };
        self.next_sequence += 1;
        self.heap.push(Reverse(event));
    }

    /// Pops the earliest-ordered event, or `None` if the queue is drained.
    pub fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(e)| e)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
