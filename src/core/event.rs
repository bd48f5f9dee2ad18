use super::types::{ProcessId, SimTime};

/// A pending wake-up of one process
///
/// The event only names the process; what the process does when resumed is
/// held by the process state machine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub time: SimTime,
    pub sequence_num: u64,
    pub process: ProcessId,
}

impl Event {
    pub fn new(time: SimTime, sequence_num: u64, process: ProcessId) -> Self {
        Self {
            time,
            sequence_num,
            process,
        }
    }

    /// Ordering key; dispatch always takes the minimum
    pub fn key(&self) -> (SimTime, u64) {
        (self.time, self.sequence_num)
    }
}
