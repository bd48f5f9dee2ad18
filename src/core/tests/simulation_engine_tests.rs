// Tests for Simulation scheduling, suspension and resumption
#[cfg(test)]
mod tests {
    use crate::core::{
        errors::SimError,
        event::Event,
        process::{Context, Process, Sequence, Yield},
        simulation_engine::{ProcessStatus, Simulation, SimulationObserver},
        types::{ContainerId, SimTime},
    };
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    type Trace = Vec<(SimTime, &'static str)>;

    enum Op {
        Mark(&'static str),
        Sleep(SimTime),
        Get(ContainerId, u64),
        Put(ContainerId, u64),
    }

    /// Test process that walks through a fixed list of operations
    struct Script {
        label: &'static str,
        ops: VecDeque<Op>,
    }

    impl Script {
        fn new(label: &'static str, ops: Vec<Op>) -> Self {
            Self {
                label,
                ops: ops.into(),
            }
        }
    }

    impl Process<Trace> for Script {
        fn name(&self) -> &str {
            self.label
        }

        fn resume(&mut self, ctx: &mut Context<'_, Trace>) -> Result<Yield<Trace>, SimError> {
            while let Some(op) = self.ops.pop_front() {
                match op {
                    Op::Mark(tag) => {
                        let now = ctx.now();
                        ctx.world_mut().push((now, tag));
                    }
                    Op::Sleep(delay) => return Ok(Yield::Timeout(delay)),
                    Op::Get(container, amount) => return Ok(Yield::Get(container, amount)),
                    Op::Put(container, amount) => return Ok(Yield::Put(container, amount)),
                }
            }
            Ok(Yield::Finish)
        }
    }

    struct DispatchRecorder {
        keys: Arc<Mutex<Vec<(SimTime, u64)>>>,
        advances: Arc<Mutex<Vec<(SimTime, SimTime)>>>,
    }

    impl SimulationObserver for DispatchRecorder {
        fn on_clock_advance(&mut self, old_time: SimTime, new_time: SimTime) {
            self.advances.lock().unwrap().push((old_time, new_time));
        }

        fn on_event_dispatched(&mut self, event: &Event) {
            self.keys.lock().unwrap().push(event.key());
        }
    }

    #[test]
    fn test_fifo_waiters_resume_in_arrival_order() {
        let mut sim = Simulation::new(Trace::new());
        let stock = sim.add_container("stock", 20, 0).unwrap();
        let first = sim.spawn(Script::new("first", vec![Op::Get(stock, 5), Op::Mark("first")]));
        sim.spawn(Script::new("second", vec![Op::Get(stock, 3), Op::Mark("second")]));
        sim.spawn(Script::new(
            "depositor",
            vec![
                Op::Sleep(1),
                Op::Put(stock, 4),
                Op::Mark("deposited 4"),
                Op::Sleep(1),
                Op::Put(stock, 5),
                Op::Mark("deposited 5"),
            ],
        ));

        // Level 4: the head asks for 5, so the 3 behind it must wait too
        sim.run_until(1).unwrap();
        assert_eq!(sim.world(), &vec![(1, "deposited 4")]);
        assert_eq!(sim.level(stock).unwrap(), 4);
        assert_eq!(sim.process_status(first), Some(ProcessStatus::WaitingGet(stock)));

        sim.run_until(2).unwrap();
        assert_eq!(
            sim.world(),
            &vec![
                (1, "deposited 4"),
                (2, "deposited 5"),
                (2, "first"),
                (2, "second"),
            ]
        );
        assert_eq!(sim.level(stock).unwrap(), 1);
        assert_eq!(sim.live_processes(), 0);
    }

    #[test]
    fn test_events_dispatch_in_time_then_sequence_order() {
        let keys = Arc::new(Mutex::new(Vec::new()));
        let advances = Arc::new(Mutex::new(Vec::new()));
        let mut sim = Simulation::new(Trace::new());
        sim.add_observer(Box::new(DispatchRecorder {
            keys: Arc::clone(&keys),
            advances: Arc::clone(&advances),
        }));

        for (label, delay) in [("a", 4), ("b", 1), ("c", 4), ("d", 0), ("e", 2)] {
            sim.spawn(Script::new(label, vec![Op::Sleep(delay), Op::Mark(label)]));
        }
        sim.run_until(10).unwrap();

        let keys = keys.lock().unwrap();
        assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(
            sim.world(),
            &vec![(0, "d"), (1, "b"), (2, "e"), (4, "a"), (4, "c")]
        );
        assert_eq!(&*advances.lock().unwrap(), &vec![(0, 1), (1, 2), (2, 4), (4, 10)]);
        assert_eq!(sim.events_dispatched(), 10);
    }

    #[test]
    fn test_run_until_includes_events_at_target() {
        let mut sim = Simulation::new(Trace::new());
        sim.spawn(Script::new("late", vec![Op::Sleep(5), Op::Mark("late")]));

        sim.run_until(4).unwrap();
        assert!(sim.world().is_empty());
        assert_eq!(sim.now(), 4);

        sim.run_until(5).unwrap();
        assert_eq!(sim.world(), &vec![(5, "late")]);

        // No events left: the clock still moves to the target
        sim.run_until(9).unwrap();
        assert_eq!(sim.now(), 9);
        assert!(!sim.has_pending_events());
    }

    #[test]
    fn test_continuations_inside_window_run_in_same_call() {
        let mut sim = Simulation::new(Trace::new());
        sim.spawn(Script::new(
            "chain",
            vec![
                Op::Sleep(0),
                Op::Mark("zero"),
                Op::Sleep(2),
                Op::Mark("two"),
                Op::Sleep(2),
                Op::Mark("four"),
            ],
        ));

        sim.run_until(3).unwrap();
        assert_eq!(sim.world(), &vec![(0, "zero"), (2, "two")]);
        assert_eq!(sim.pending_events(), 1);
    }

    #[test]
    fn test_running_backwards_is_rejected() {
        let mut sim = Simulation::new(Trace::new());
        sim.run_until(10).unwrap();
        assert_eq!(
            sim.run_until(3),
            Err(SimError::TimeInPast {
                requested: 3,
                now: 10
            })
        );
        assert_eq!(sim.now(), 10);
    }

    #[test]
    fn test_spawn_at_rejects_past_and_honours_future() {
        let mut sim = Simulation::new(Trace::new());
        sim.run_until(10).unwrap();

        let past = sim.spawn_at(3, Script::new("past", vec![Op::Mark("past")]));
        assert!(matches!(past, Err(SimError::TimeInPast { .. })));
        assert_eq!(sim.live_processes(), 0);

        let id = sim
            .spawn_at(12, Script::new("future", vec![Op::Mark("future")]))
            .unwrap();
        assert_eq!(
            sim.process_status(id),
            Some(ProcessStatus::Sleeping { until: 12 })
        );
        sim.run_until(12).unwrap();
        assert_eq!(sim.world(), &vec![(12, "future")]);
    }

    #[test]
    fn test_sequence_runs_children_back_to_back() {
        let mut sim = Simulation::new(Trace::new());
        let parent = sim.spawn(
            Sequence::new("main")
                .then(Script::new("a", vec![Op::Sleep(3), Op::Mark("a")]))
                .then(Script::new("b", vec![Op::Sleep(2), Op::Mark("b")])),
        );

        sim.run_until(1).unwrap();
        assert!(matches!(
            sim.process_status(parent),
            Some(ProcessStatus::Joining(_))
        ));

        sim.run_until(10).unwrap();
        assert_eq!(sim.world(), &vec![(3, "a"), (5, "b")]);
        assert_eq!(sim.live_processes(), 0);
        assert_eq!(sim.processes_completed(), 3);
    }

    #[test]
    fn test_blocked_put_resumes_after_get() {
        let mut sim = Simulation::new(Trace::new());
        let stock = sim.add_container("stock", 10, 8).unwrap();
        let producer = sim.spawn(Script::new("put", vec![Op::Put(stock, 5), Op::Mark("stored")]));
        sim.spawn(Script::new(
            "get",
            vec![Op::Sleep(3), Op::Get(stock, 4), Op::Mark("taken")],
        ));

        sim.run_until(2).unwrap();
        assert_eq!(
            sim.process_status(producer),
            Some(ProcessStatus::WaitingPut(stock))
        );

        sim.run_until(3).unwrap();
        // The getter continues synchronously; the freed producer follows
        assert_eq!(sim.world(), &vec![(3, "taken"), (3, "stored")]);
        assert_eq!(sim.level(stock).unwrap(), 9);
    }

    #[test]
    fn test_contract_violations_fail_fast() {
        let mut sim = Simulation::new(Trace::new());
        let stock = sim.add_container("stock", 10, 0).unwrap();
        sim.spawn(Script::new("zero", vec![Op::Get(stock, 0)]));
        assert!(matches!(
            sim.run_until(1),
            Err(SimError::InvalidAmount { .. })
        ));

        let mut sim = Simulation::new(Trace::new());
        let stock = sim.add_container("stock", 10, 0).unwrap();
        sim.spawn(Script::new("huge", vec![Op::Put(stock, 11)]));
        assert!(matches!(
            sim.run_until(1),
            Err(SimError::ExceedsCapacity { amount: 11, capacity: 10, .. })
        ));

        let mut sim = Simulation::new(Trace::new());
        sim.spawn(Script::new("lost", vec![Op::Get(ContainerId(7), 1)]));
        assert_eq!(
            sim.run_until(1),
            Err(SimError::UnknownContainer(ContainerId(7)))
        );
    }

    #[test]
    fn test_step_dispatches_one_event() {
        let mut sim = Simulation::new(Trace::new());
        sim.spawn(Script::new("a", vec![Op::Sleep(2), Op::Mark("a")]));
        sim.spawn(Script::new("b", vec![Op::Sleep(7), Op::Mark("b")]));

        assert!(sim.step().unwrap());
        assert!(sim.step().unwrap());
        assert_eq!(sim.now(), 0);
        assert!(sim.step().unwrap());
        assert_eq!(sim.world(), &vec![(2, "a")]);
        assert!(!sim.step().unwrap());
        assert_eq!(sim.now(), 7);
    }
}
