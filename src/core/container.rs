use super::errors::SimError;
use super::types::ProcessId;
use std::collections::VecDeque;

/// A process blocked on a container request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    pub amount: u64,
    pub process: ProcessId,
}

/// Outcome of a put/get request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// The level changed and the caller continues synchronously
    Granted,
    /// The caller was appended to the waiter list and must suspend
    Queued,
}

/// Bounded integer resource pool with blocking put/get
///
/// Waiters are served strictly in arrival order: a head request that does
/// not fit blocks every request queued behind it, even smaller ones.
#[derive(Debug, Clone)]
pub struct Container {
    name: String,
    capacity: u64,
    level: u64,
    put_waiters: VecDeque<Waiter>,
    get_waiters: VecDeque<Waiter>,
}

impl Container {
    /// Create a container holding `init` units out of `capacity`
    pub fn new(name: impl Into<String>, capacity: u64, init: u64) -> Result<Self, SimError> {
        let name = name.into();
        if init > capacity {
            return Err(SimError::InitialLevelExceedsCapacity {
                container: name,
                level: init,
                capacity,
            });
        }
        Ok(Self {
            name,
            capacity,
            level: init,
            put_waiters: VecDeque::new(),
            get_waiters: VecDeque::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn level(&self) -> u64 {
        self.level
    }

    /// Room left before the container is full
    pub fn free_space(&self) -> u64 {
        self.capacity - self.level
    }

    /// Pending put requests, oldest first
    pub fn put_waiters(&self) -> impl Iterator<Item = &Waiter> {
        self.put_waiters.iter()
    }

    /// Pending get requests, oldest first
    pub fn get_waiters(&self) -> impl Iterator<Item = &Waiter> {
        self.get_waiters.iter()
    }

    fn check_amount(&self, amount: u64) -> Result<(), SimError> {
        if amount == 0 {
            return Err(SimError::InvalidAmount {
                container: self.name.clone(),
            });
        }
        if amount > self.capacity {
            return Err(SimError::ExceedsCapacity {
                container: self.name.clone(),
                amount,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Deposit `amount` now if it fits and nobody is queued ahead, else queue
    pub(crate) fn request_put(
        &mut self,
        amount: u64,
        process: ProcessId,
    ) -> Result<Request, SimError> {
        self.check_amount(amount)?;
        if self.put_waiters.is_empty() && self.free_space() >= amount {
            self.level += amount;
            return Ok(Request::Granted);
        }
        self.put_waiters.push_back(Waiter { amount, process });
        Ok(Request::Queued)
    }

    /// Withdraw `amount` now if available and nobody is queued ahead, else queue
    pub(crate) fn request_get(
        &mut self,
        amount: u64,
        process: ProcessId,
    ) -> Result<Request, SimError> {
        self.check_amount(amount)?;
        if self.get_waiters.is_empty() && self.level >= amount {
            self.level -= amount;
            return Ok(Request::Granted);
        }
        self.get_waiters.push_back(Waiter { amount, process });
        Ok(Request::Queued)
    }

    /// Take `min(max, level)` without ever queueing; returns the amount taken
    pub(crate) fn take_up_to(&mut self, max: u64) -> u64 {
        let taken = max.min(self.level);
        self.level -= taken;
        taken
    }

    /// Grant head-of-line waiters while they fit, returning the resumed
    /// processes in grant order
    pub(crate) fn dispatch_waiters(&mut self) -> Vec<ProcessId> {
        let mut granted = Vec::new();
        loop {
            let mut progressed = false;

            while let Some(head) = self.get_waiters.front().copied() {
                if head.amount > self.level {
                    break;
                }
                self.level -= head.amount;
                self.get_waiters.pop_front();
                granted.push(head.process);
                progressed = true;
            }

            while let Some(head) = self.put_waiters.front().copied() {
                if head.amount > self.free_space() {
                    break;
                }
                self.level += head.amount;
                self.put_waiters.pop_front();
                granted.push(head.process);
                progressed = true;
            }

            if !progressed {
                break;
            }
        }
        granted
    }
}
