use super::container::Container;
use super::errors::SimError;
use super::types::{ContainerId, ProcessId, SimTime};
use std::collections::VecDeque;

/// What a process waits on after a resumption
pub enum Yield<W> {
    /// Sleep for the given number of ticks
    Timeout(SimTime),
    /// Withdraw from a container, blocking until the amount is available
    Get(ContainerId, u64),
    /// Deposit into a container, blocking until there is room
    Put(ContainerId, u64),
    /// Spawn a child and resume once it finishes
    Await(Box<dyn Process<W>>),
    /// The process ran to completion
    Finish,
}

impl<W> std::fmt::Debug for Yield<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Yield::Timeout(delay) => f.debug_tuple("Timeout").field(delay).finish(),
            Yield::Get(id, amount) => f.debug_tuple("Get").field(id).field(amount).finish(),
            Yield::Put(id, amount) => f.debug_tuple("Put").field(id).field(amount).finish(),
            Yield::Await(child) => f.debug_tuple("Await").field(&child.name()).finish(),
            Yield::Finish => f.write_str("Finish"),
        }
    }
}

/// A resumable unit of simulated activity
///
/// Implementors are explicit state machines: every call to `resume` runs
/// forward from the last suspension point and reports the next one. The
/// engine is the only caller, so at most one process runs at a time.
/// Processes are `Send` so a whole simulation can move between threads.
pub trait Process<W>: Send {
    /// Name used in log lines and errors
    fn name(&self) -> &str;

    /// Run until the next suspension point
    fn resume(&mut self, ctx: &mut Context<'_, W>) -> Result<Yield<W>, SimError>;
}

/// View of the simulation handed to a resumed process
///
/// Gives read access to containers, the non-blocking `take_up_to`, and the
/// shared world state. It has no handle on the scheduler.
pub struct Context<'a, W> {
    now: SimTime,
    process_id: ProcessId,
    containers: &'a mut [Container],
    world: &'a mut W,
    touched: Vec<ContainerId>,
}

impl<'a, W> Context<'a, W> {
    pub(crate) fn new(
        now: SimTime,
        process_id: ProcessId,
        containers: &'a mut [Container],
        world: &'a mut W,
    ) -> Self {
        Self {
            now,
            process_id,
            containers,
            world,
            touched: Vec::new(),
        }
    }

    /// Current simulation time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Id of the running process
    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    pub fn container(&self, id: ContainerId) -> Result<&Container, SimError> {
        self.containers
            .get(id.0)
            .ok_or(SimError::UnknownContainer(id))
    }

    pub fn level(&self, id: ContainerId) -> Result<u64, SimError> {
        self.container(id).map(Container::level)
    }

    /// Take up to `max` units without suspending; returns the amount taken
    pub fn take_up_to(&mut self, id: ContainerId, max: u64) -> Result<u64, SimError> {
        let container = self
            .containers
            .get_mut(id.0)
            .ok_or(SimError::UnknownContainer(id))?;
        let taken = container.take_up_to(max);
        if taken > 0 {
            self.touched.push(id);
        }
        Ok(taken)
    }

    pub fn world(&self) -> &W {
        self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        self.world
    }

    /// Containers whose level changed during the resumption
    pub(crate) fn into_touched(self) -> Vec<ContainerId> {
        self.touched
    }
}

/// Runs child processes one after another, each starting when the previous
/// one finishes
pub struct Sequence<W> {
    name: String,
    steps: VecDeque<Box<dyn Process<W>>>,
}

impl<W> Sequence<W> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: VecDeque::new(),
        }
    }

    /// Append a step to the sequence
    pub fn then(mut self, step: impl Process<W> + 'static) -> Self {
        self.steps.push_back(Box::new(step));
        self
    }
}

impl<W> Process<W> for Sequence<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, _ctx: &mut Context<'_, W>) -> Result<Yield<W>, SimError> {
        Ok(match self.steps.pop_front() {
            Some(step) => Yield::Await(step),
            None => Yield::Finish,
        })
    }
}
