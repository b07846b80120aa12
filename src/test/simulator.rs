use crate::sim::{Event, SimTime, Simulator, World};
use std::any::Any;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct DummyWorld;

impl World for DummyWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Push {
    id: u32,
    log: Arc<Mutex<Vec<(u32, SimTime)>>>,
}

impl Event for Push {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) {
        let Push { id, log } = *self;
        log.lock().expect("log lock").push((id, sim.now()));
    }
}

fn push(id: u32, log: &Arc<Mutex<Vec<(u32, SimTime)>>>) -> Push {
    Push {
        id,
        log: Arc::clone(log),
    }
}

#[test]
fn events_run_in_time_then_insertion_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();

    sim.schedule(SimTime(10), push(1, &log));
    sim.schedule(SimTime(5), push(2, &log));
    sim.schedule(SimTime(10), push(3, &log));
    sim.run(&mut world);

    let ids: Vec<u32> = log.lock().expect("log lock").iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![2, 1, 3]);
    assert_eq!(sim.executed(), 3);
    assert_eq!(sim.now(), SimTime(10));
}

#[test]
fn run_until_leaves_later_events_queued() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();

    sim.schedule(SimTime(5), push(1, &log));
    sim.schedule(SimTime(50), push(2, &log));
    sim.run_until(SimTime(20), &mut world);

    assert_eq!(log.lock().expect("log lock").len(), 1);
    assert_eq!(sim.pending(), 1);
    assert_eq!(sim.now(), SimTime(20));
}

#[test]
fn reset_clears_queue_and_rewinds_clock() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();

    sim.schedule(SimTime(5), push(1, &log));
    sim.schedule(SimTime(50), push(2, &log));
    sim.run_until(SimTime(10), &mut world);
    sim.reset();

    assert_eq!(sim.now(), SimTime::ZERO);
    assert_eq!(sim.pending(), 0);
    assert_eq!(sim.executed(), 0);

    sim.run(&mut world);
    assert_eq!(log.lock().expect("log lock").len(), 1);
}

#[test]
fn scheduling_in_the_past_runs_at_now() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();
    let mut world = DummyWorld::default();

    sim.run_until(SimTime(100), &mut world);
    sim.schedule(SimTime(1), push(7, &log));
    sim.run(&mut world);

    assert_eq!(log.lock().expect("log lock").as_slice(), &[(7, SimTime(100))]);
}
