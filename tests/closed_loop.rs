//! A PID controller closing the loop around a mass-spring-damper.
//!
//! The plant is integrated ten times faster than the controller updates, with a noisy
//! position sensor in between and a recorder sampling the loop.

use hybridsim::components::{
    GaussianNoise, MassSpringDamper, MassSpringDamperParameters, PidController, PidParameters,
};
use hybridsim::{PortValue, Recorder, RunStatus, Scenario, SimError, Trace, World};
use is_close::is_close;

const SCENARIO: &str = r#"
duration = 20.0

[[models]]
name = "plant"
dt = 0.01
model = { type = "MassSpringDamper", parameters = { mass = 1.0, stiffness = 1.0, damping = 0.5 } }

[[models]]
name = "sensor"
dt = 0.1
model = { type = "GaussianNoise", sigma = 0.001, source = { type = "GaussianSource", seed = 3 } }

[[models]]
name = "pid"
dt = 0.1
model = { type = "PidController", parameters = { kp = 2.0, ki = 1.0, kd = 0.5, setpoint = 1.0 } }

[[models]]
name = "recorder"
dt = 0.1
model = { type = "Recorder" }

[[connections]]
model = "plant"
input = "force"
source = "pid.u"

[[connections]]
model = "sensor"
input = "process"
source = "plant.x"
index = 0

[[connections]]
model = "pid"
input = "process"
source = "sensor.y"

[[connections]]
model = "recorder"
input = "position"
source = "plant.x"
index = 0

[[connections]]
model = "recorder"
input = "u"
source = "pid.u"
"#;

fn build(sigma: f64) -> World {
    let mut world = World::new();

    let plant = world
        .add_model(
            "plant",
            0.01,
            MassSpringDamper::from_parameters(MassSpringDamperParameters {
                mass: 1.0,
                stiffness: 1.0,
                damping: 0.5,
            }),
        )
        .unwrap();
    let sensor = world
        .add_model("sensor", 0.1, GaussianNoise::from_seed(sigma, 3))
        .unwrap();
    let pid = world
        .add_model(
            "pid",
            0.1,
            PidController::from_parameters(PidParameters {
                kp: 2.0,
                ki: 1.0,
                kd: 0.5,
                setpoint: 1.0,
            }),
        )
        .unwrap();
    let recorder = world.add_model("recorder", 0.1, Recorder::new()).unwrap();

    world.add_input(plant, "force", "pid.u", None).unwrap();
    world.add_input(sensor, "process", "plant.x", Some(0)).unwrap();
    world.add_input(pid, "process", "sensor.y", None).unwrap();
    world.add_input(recorder, "position", "plant.x", Some(0)).unwrap();
    world.add_input(recorder, "u", "pid.u", None).unwrap();
    world
}

fn trace(world: &World) -> &Trace {
    let recorder = world.id("recorder").unwrap();
    world.model::<Recorder>(recorder).unwrap().trace()
}

fn position(world: &World) -> f64 {
    world.read("plant.x", Some(0)).unwrap().as_scalar().unwrap()
}

#[test]
fn settles_at_setpoint() {
    let mut world = build(0.0);
    world.run_until(40.0).unwrap();

    assert!(
        (position(&world) - 1.0).abs() < 1e-2,
        "position was {}",
        position(&world)
    );
    assert_eq!(world.status(), RunStatus::Running);
}

#[test]
fn first_control_output_is_zero() {
    let mut world = build(0.0);
    world.run_until(0.1).unwrap();

    let pid = world.id("pid").unwrap();
    let controller = world.model::<PidController>(pid).unwrap();
    assert_eq!(controller.u(), 0.0);
    assert!(is_close!(controller.error(), 1.0));

    // The plant has not been pushed yet
    assert_eq!(position(&world), 0.0);
    assert_eq!(trace(&world).column("u").unwrap(), &[0.0]);
}

#[test]
fn plant_runs_faster_than_controller() {
    let mut world = build(0.0);
    world.run_until(1.0).unwrap();

    let plant = world.node(world.id("plant").unwrap()).unwrap();
    let pid = world.node(world.id("pid").unwrap()).unwrap();
    assert!(is_close!(plant.t(), world.t(), abs_tol = 1e-9));
    assert!(is_close!(pid.t(), 1.0, abs_tol = 1e-9));

    // Sampled once per controller period
    assert_eq!(trace(&world).len(), 10);
}

#[test]
fn clock_never_runs_backwards() {
    let mut world = build(0.001);
    let mut previous = world.t();

    for _ in 0..500 {
        let deadline = world.next_deadline().unwrap();
        let t = world.cycle().unwrap();
        assert_eq!(t, deadline);
        assert!(t > previous);

        for &id in world.order() {
            let node = world.node(id).unwrap();
            assert!(node.t() <= t);
            assert!(node.t_next() > t);
        }
        previous = t;
    }
}

#[test]
fn runs_are_bit_identical() {
    let mut a = build(0.001);
    let mut b = build(0.001);
    a.run_until(10.0).unwrap();
    b.run_until(10.0).unwrap();

    assert_eq!(trace(&a), trace(&b));
    assert_eq!(position(&a).to_bits(), position(&b).to_bits());
}

#[test]
fn snapshot_resumes_the_same_run() {
    let mut uninterrupted = build(0.001);
    uninterrupted.run_until(10.0).unwrap();

    let mut world = build(0.001);
    world.run_until(5.0).unwrap();
    let snapshot = serde_json::to_string(&world).unwrap();
    let mut resumed: World = serde_json::from_str(&snapshot).unwrap();
    resumed.run_until(10.0).unwrap();

    assert_eq!(resumed.t(), uninterrupted.t());
    assert_eq!(trace(&resumed), trace(&uninterrupted));
    assert_eq!(
        resumed.read("sensor.noise", None).unwrap(),
        uninterrupted.read("sensor.noise", None).unwrap()
    );
}

#[test]
fn scenario_matches_programmatic_world() {
    let mut programmatic = build(0.001);
    programmatic.run_until(20.0).unwrap();

    let from_toml = Scenario::from_toml_str(SCENARIO).unwrap().run().unwrap();

    assert_eq!(from_toml.t(), programmatic.t());
    assert_eq!(trace(&from_toml), trace(&programmatic));
}

#[test]
fn model_failure_aborts_the_run() {
    let mut world = World::new();
    world.add_model("pid", 0.1, PidController::default()).unwrap();
    let plant = world
        .add_model(
            "plant",
            0.01,
            MassSpringDamper::from_parameters(MassSpringDamperParameters {
                mass: 0.0,
                stiffness: 1.0,
                damping: 1.0,
            }),
        )
        .unwrap();
    let pid = world.id("pid").unwrap();
    world.add_input(plant, "force", "pid.u", None).unwrap();
    world.add_input(pid, "process", "plant.x", Some(0)).unwrap();

    assert!(matches!(world.cycle(), Err(SimError::InvalidParameter(_))));
    assert_eq!(world.status(), RunStatus::Aborted);
    assert!(matches!(world.cycle(), Err(SimError::RunAborted { .. })));
    assert_eq!(world.read("plant.u", None).unwrap(), PortValue::Scalar(0.0));
}
