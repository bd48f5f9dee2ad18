use super::errors::SimError;
use super::types::SimTime;

/// Monotonic virtual clock of one simulation
#[derive(Debug, Clone, Default)]
pub struct Clock {
    now: SimTime,
}

impl Clock {
    pub fn new() -> Self {
        Self { now: 0 }
    }

    /// Current simulation time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move the clock to `time`; the clock never runs backwards
    pub fn advance_to(&mut self, time: SimTime) -> Result<(), SimError> {
        if time < self.now {
            return Err(SimError::TimeInPast {
                requested: time,
                now: self.now,
            });
        }
        self.now = time;
        Ok(())
    }

    /// Absolute time `delay` ticks from now
    pub fn after(&self, delay: SimTime) -> SimTime {
        self.now.saturating_add(delay)
    }
}
