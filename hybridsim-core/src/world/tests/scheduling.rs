//! Clock advancement and update ordering.

use crate::errors::SimError;
use crate::example_models::{Probe, Ramp};
use crate::state::PortValue;
use crate::world::{ModelId, RunStatus, World};
use crate::Time;

/// A ramp updated every 0.25 and a probe reading it every 1.0
fn ramp_and_probe(probe_first: bool) -> (World, ModelId) {
    let mut world = World::new();
    let probe = if probe_first {
        let probe = world.add_model("probe", 1.0, Probe::default()).unwrap();
        world.add_model("ramp", 0.25, Ramp::new(1.0)).unwrap();
        probe
    } else {
        world.add_model("ramp", 0.25, Ramp::new(1.0)).unwrap();
        world.add_model("probe", 1.0, Probe::default()).unwrap()
    };
    world.add_input(probe, "signal", "ramp.y", None).unwrap();
    (world, probe)
}

#[test]
fn clock_advances_to_earliest_deadline() {
    let (mut world, _) = ramp_and_probe(false);

    let mut times = Vec::new();
    for _ in 0..6 {
        times.push(world.cycle().unwrap());
    }

    assert_eq!(times, vec![0.25, 0.5, 0.75, 1.0, 1.25, 1.5]);
    assert_eq!(world.t(), 1.5);
    assert_eq!(world.status(), RunStatus::Running);
}

#[test]
fn proposed_time_is_next_deadline() {
    let mut world = World::new();
    world.add_model("fast", 0.3, Ramp::new(1.0)).unwrap();
    world.add_model("slow", 0.5, Ramp::new(1.0)).unwrap();

    let mut previous = world.t();
    for _ in 0..50 {
        let expected = world.next_deadline().unwrap();
        let t = world.cycle().unwrap();
        assert_eq!(t, expected);
        assert!(t > previous);
        previous = t;
    }
}

#[test]
fn models_are_updated_once_per_period() {
    let (mut world, probe) = ramp_and_probe(false);
    world.run_until(3.0).unwrap();

    let updates = &world.model::<Probe>(probe).unwrap().updates;
    let windows: Vec<(Time, Time)> = updates.iter().map(|(start, end, _)| (*start, *end)).collect();
    assert_eq!(windows, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
    assert_eq!(
        world.read("probe.count", None).unwrap(),
        PortValue::Scalar(3.0)
    );
}

#[test]
fn incommensurate_periods_are_never_early() {
    let mut world = World::new();
    world.add_model("ramp", 0.3, Ramp::new(1.0)).unwrap();
    let probe = world.add_model("probe", 0.7, Probe::default()).unwrap();
    world.add_input(probe, "signal", "ramp.y", None).unwrap();

    world.run_until(20.0).unwrap();

    let updates = &world.model::<Probe>(probe).unwrap().updates;
    assert!(!updates.is_empty());
    for (start, end, _) in updates {
        assert_eq!(*end, *start + 0.7);
    }
}

#[test]
fn same_deadline_follows_registration_order() {
    // Registered after the ramp, so the probe sees the value published in the same cycle
    let (mut world, probe) = ramp_and_probe(false);
    world.run_until(2.0).unwrap();
    let seen: Vec<f64> = world
        .model::<Probe>(probe)
        .unwrap()
        .updates
        .iter()
        .map(|(_, _, signal)| *signal)
        .collect();
    assert_eq!(seen, vec![1.0, 2.0]);

    // Registered before the ramp, so the probe sees the value from the ramp's previous update
    let (mut world, probe) = ramp_and_probe(true);
    world.run_until(2.0).unwrap();
    let seen: Vec<f64> = world
        .model::<Probe>(probe)
        .unwrap()
        .updates
        .iter()
        .map(|(_, _, signal)| *signal)
        .collect();
    assert_eq!(seen, vec![0.75, 1.75]);
}

#[test]
fn ready_at_includes_deadline() {
    let (world, probe) = ramp_and_probe(false);
    let node = world.node(probe).unwrap();

    assert_eq!(node.t(), 0.0);
    assert_eq!(node.t_next(), 1.0);
    assert!(!node.ready_at(0.75));
    assert!(node.ready_at(1.0));
    assert!(node.ready_at(1.5));
}

#[test]
fn empty_world_cannot_advance() {
    let mut world = World::new();
    assert!(matches!(
        world.cycle(),
        Err(SimError::NoEligibleModel { t }) if t == 0.0
    ));
    assert_eq!(world.t(), 0.0);
}

#[test]
fn run_until_counts_cycles() {
    let (mut world, _) = ramp_and_probe(false);

    assert_eq!(world.run_until(1.0).unwrap(), 4);
    assert_eq!(world.run_until(1.0).unwrap(), 0);
    assert_eq!(world.run_for(0.5).unwrap(), 2);
    assert_eq!(world.t(), 1.5);
}

#[test]
fn run_until_may_overshoot() {
    let mut world = World::new();
    world.add_model("ramp", 1.0, Ramp::new(1.0)).unwrap();

    assert_eq!(world.run_until(2.5).unwrap(), 3);
    assert_eq!(world.t(), 3.0);
}

#[test]
fn runs_are_deterministic() {
    let run = || {
        let mut world = World::new();
        world.add_model("ramp", 0.3, Ramp::new(0.1)).unwrap();
        let probe = world.add_model("probe", 0.7, Probe::default()).unwrap();
        world.add_input(probe, "signal", "ramp.y", None).unwrap();
        world.run_until(10.0).unwrap();
        world.model::<Probe>(probe).unwrap().updates.clone()
    };

    assert_eq!(run(), run());
}
