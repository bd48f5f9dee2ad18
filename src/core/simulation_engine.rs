use super::clock::Clock;
use super::container::{Container, Request};
use super::errors::SimError;
use super::event::Event;
use super::event_scheduler::EventScheduler;
use super::process::{Context, Process, Yield};
use super::types::{ContainerId, ProcessId, SimTime};
use log::{debug, trace};
use std::collections::HashMap;

/// Observer trait for simulation events
pub trait SimulationObserver: Send {
    /// Called when the simulation clock advances
    fn on_clock_advance(&mut self, old_time: SimTime, new_time: SimTime);

    /// Called right before the process named by `event` is resumed
    fn on_event_dispatched(&mut self, event: &Event);
}

/// Where a live process is currently suspended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// A wake-up at the current time is queued
    Scheduled,
    Sleeping { until: SimTime },
    WaitingPut(ContainerId),
    WaitingGet(ContainerId),
    /// Waiting for a child spawned through `Yield::Await`
    Joining(ProcessId),
}

struct ProcessSlot<W> {
    process: Box<dyn Process<W>>,
    status: ProcessStatus,
    parent: Option<ProcessId>,
}

/// One self-contained discrete-event simulation
///
/// Owns its clock, event queue, containers, live processes and the world
/// state `W` shared by those processes. Nothing is global, so independent
/// simulations can live side by side in one program.
pub struct Simulation<W> {
    clock: Clock,
    scheduler: EventScheduler,
    processes: HashMap<ProcessId, ProcessSlot<W>>,
    containers: Vec<Container>,
    world: W,
    next_process_id: u64,
    events_dispatched: u64,
    processes_completed: u64,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl<W> Simulation<W> {
    /// Create an empty simulation at time 0 around `world`
    pub fn new(world: W) -> Self {
        Self {
            clock: Clock::new(),
            scheduler: EventScheduler::new(),
            processes: HashMap::new(),
            containers: Vec::new(),
            world,
            next_process_id: 0,
            events_dispatched: 0,
            processes_completed: 0,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the simulation
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Create a container and return its handle
    pub fn add_container(
        &mut self,
        name: impl Into<String>,
        capacity: u64,
        init: u64,
    ) -> Result<ContainerId, SimError> {
        let container = Container::new(name, capacity, init)?;
        let id = ContainerId(self.containers.len());
        debug!(
            "{}: container '{}' created (level {}/{})",
            self.now(),
            container.name(),
            container.level(),
            container.capacity()
        );
        self.containers.push(container);
        Ok(id)
    }

    pub fn container(&self, id: ContainerId) -> Result<&Container, SimError> {
        self.containers
            .get(id.0)
            .ok_or(SimError::UnknownContainer(id))
    }

    pub fn level(&self, id: ContainerId) -> Result<u64, SimError> {
        self.container(id).map(Container::level)
    }

    fn container_mut(&mut self, id: ContainerId) -> Result<&mut Container, SimError> {
        self.containers
            .get_mut(id.0)
            .ok_or(SimError::UnknownContainer(id))
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Get current simulation time
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// Start a process; its first resumption is queued at the current time
    pub fn spawn(&mut self, process: impl Process<W> + 'static) -> ProcessId {
        let id = self.register(Box::new(process), None);
        self.scheduler.schedule_at(self.now(), id);
        id
    }

    /// Start a process at an absolute future time
    pub fn spawn_at(
        &mut self,
        time: SimTime,
        process: impl Process<W> + 'static,
    ) -> Result<ProcessId, SimError> {
        if time < self.now() {
            return Err(SimError::TimeInPast {
                requested: time,
                now: self.now(),
            });
        }
        let id = self.register(Box::new(process), None);
        self.processes
            .get_mut(&id)
            .ok_or(SimError::UnknownProcess(id))?
            .status = ProcessStatus::Sleeping { until: time };
        self.scheduler.schedule_at(time, id);
        Ok(id)
    }

    fn register(&mut self, process: Box<dyn Process<W>>, parent: Option<ProcessId>) -> ProcessId {
        let id = ProcessId(self.next_process_id);
        self.next_process_id += 1;
        trace!("{}: spawned {} '{}'", self.now(), id, process.name());
        self.processes.insert(
            id,
            ProcessSlot {
                process,
                status: ProcessStatus::Scheduled,
                parent,
            },
        );
        id
    }

    /// Dispatch every event due at or before `target`, then set the clock to
    /// `target`
    pub fn run_until(&mut self, target: SimTime) -> Result<(), SimError> {
        if target < self.now() {
            return Err(SimError::TimeInPast {
                requested: target,
                now: self.now(),
            });
        }
        while let Some(event) = self.scheduler.pop_due(target) {
            self.dispatch(event)?;
        }
        self.advance_clock(target)
    }

    /// Dispatch the single earliest event, returns true if events remain
    pub fn step(&mut self) -> Result<bool, SimError> {
        if let Some(event) = self.scheduler.pop_next() {
            self.dispatch(event)?;
        }
        Ok(self.has_pending_events())
    }

    fn advance_clock(&mut self, time: SimTime) -> Result<(), SimError> {
        let old_time = self.clock.now();
        self.clock.advance_to(time)?;
        if old_time != time {
            for observer in &mut self.observers {
                observer.on_clock_advance(old_time, time);
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> Result<(), SimError> {
        self.advance_clock(event.time)?;
        for observer in &mut self.observers {
            observer.on_event_dispatched(&event);
        }
        self.events_dispatched += 1;
        self.resume_process(event.process)
    }

    /// Drive one process from its wake-up to its next suspension point
    fn resume_process(&mut self, id: ProcessId) -> Result<(), SimError> {
        let mut slot = self
            .processes
            .remove(&id)
            .ok_or(SimError::UnknownProcess(id))?;
        trace!("{}: resuming {} '{}'", self.now(), id, slot.process.name());

        loop {
            let now = self.clock.now();
            let mut ctx = Context::new(now, id, &mut self.containers, &mut self.world);
            let outcome = slot.process.resume(&mut ctx);
            for touched in ctx.into_touched() {
                self.wake_waiters(touched)?;
            }

            match outcome? {
                Yield::Timeout(delay) => {
                    let until = self.clock.after(delay);
                    slot.status = ProcessStatus::Sleeping { until };
                    self.scheduler.schedule_at(until, id);
                    break;
                }
                Yield::Get(container, amount) => {
                    match self.container_mut(container)?.request_get(amount, id)? {
                        Request::Granted => {
                            self.wake_waiters(container)?;
                        }
                        Request::Queued => {
                            trace!("{}: {} blocked on get {} from {}", now, id, amount, container);
                            slot.status = ProcessStatus::WaitingGet(container);
                            break;
                        }
                    }
                }
                Yield::Put(container, amount) => {
                    match self.container_mut(container)?.request_put(amount, id)? {
                        Request::Granted => {
                            self.wake_waiters(container)?;
                        }
                        Request::Queued => {
                            trace!("{}: {} blocked on put {} into {}", now, id, amount, container);
                            slot.status = ProcessStatus::WaitingPut(container);
                            break;
                        }
                    }
                }
                Yield::Await(child) => {
                    let child_id = self.register(child, Some(id));
                    self.scheduler.schedule_at(now, child_id);
                    slot.status = ProcessStatus::Joining(child_id);
                    break;
                }
                Yield::Finish => {
                    trace!("{}: {} '{}' finished", now, id, slot.process.name());
                    self.processes_completed += 1;
                    if let Some(parent) = slot.parent {
                        if let Some(parent_slot) = self.processes.get_mut(&parent) {
                            parent_slot.status = ProcessStatus::Scheduled;
                        }
                        self.scheduler.schedule_at(now, parent);
                    }
                    return Ok(());
                }
            }
        }

        self.processes.insert(id, slot);
        Ok(())
    }

    /// Grant satisfiable waiters of a container and queue their resumptions
    /// at the current time, in grant order
    fn wake_waiters(&mut self, container: ContainerId) -> Result<(), SimError> {
        let now = self.now();
        let granted = self.container_mut(container)?.dispatch_waiters();
        for id in granted {
            trace!("{}: {} granted on {}", now, id, container);
            if let Some(slot) = self.processes.get_mut(&id) {
                slot.status = ProcessStatus::Scheduled;
            }
            self.scheduler.schedule_at(now, id);
        }
        Ok(())
    }

    /// Check if there are pending events in the scheduler
    pub fn has_pending_events(&self) -> bool {
        self.scheduler.has_events()
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    /// Number of processes spawned and not yet finished
    pub fn live_processes(&self) -> usize {
        self.processes.len()
    }

    pub fn process_status(&self, id: ProcessId) -> Option<ProcessStatus> {
        self.processes.get(&id).map(|slot| slot.status)
    }

    pub fn events_dispatched(&self) -> u64 {
        self.events_dispatched
    }

    pub fn processes_completed(&self) -> u64 {
        self.processes_completed
    }
}
