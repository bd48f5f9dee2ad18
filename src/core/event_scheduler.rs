use super::event::Event;
use super::types::{ProcessId, SimTime};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct ScheduledEvent(Event);

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.0.key() == other.0.key()
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .0
            .time
            .cmp(&self.0.time)
            .then_with(|| other.0.sequence_num.cmp(&self.0.sequence_num))
    }
}

/// Time-ordered event queue keyed by `(time, sequence_num)`
#[derive(Debug, Default)]
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventScheduler {
    /// Create a new EventScheduler
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Schedule a wake-up of `process` at absolute `time`
    ///
    /// The caller is responsible for never passing a time before the clock.
    pub fn schedule_at(&mut self, time: SimTime, process: ProcessId) -> Event {
        let event = Event::new(time, self.sequence_counter, process);
        self.event_queue.push(ScheduledEvent(event));
        self.sequence_counter += 1;
        event
    }

    /// Pop the earliest event if it is due at or before `target`
    pub fn pop_due(&mut self, target: SimTime) -> Option<Event> {
        match self.peek_next_time() {
            Some(time) if time <= target => self.pop_next(),
            _ => None,
        }
    }

    /// Pop the earliest event regardless of its time
    pub fn pop_next(&mut self) -> Option<Event> {
        self.event_queue.pop().map(|scheduled| scheduled.0)
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Get the time of the next event without removing it
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|scheduled| scheduled.0.time)
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }
}
