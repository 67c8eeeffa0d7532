//! Light controller against the dispatcher and the single-slot channel.

use std::sync::Arc;
use std::time::Duration;

use gardener::adapters::sim::RecordingActuators;
use gardener::app::dispatcher::Dispatcher;
use gardener::app::light::{LightController, LightMode, LightTier, SharedLightMode};
use gardener::channel::LightChannel;
use gardener::clock::{SharedClock, SimulatedClock, TimeUnit};
use gardener::registry::SensorRegistry;
use gardener::signals::{SignalBus, WaitPolicy};
use gardener::task::TaskControl;

use crate::mock_hw::MockSensors;

struct Rig {
    light: LightController,
    bus: Arc<SignalBus>,
    channel: Arc<LightChannel>,
    clock: Arc<SharedClock>,
    mode: Arc<SharedLightMode>,
    outputs: Arc<RecordingActuators>,
}

fn rig(hour: u8) -> Rig {
    let bus = Arc::new(SignalBus::new());
    let channel = Arc::new(LightChannel::new());
    let clock = Arc::new(SharedClock::new(SimulatedClock::new(hour, 0, 0)));
    let mode = Arc::new(SharedLightMode::default());
    let outputs = Arc::new(RecordingActuators::new());
    let light = LightController::new(
        Arc::clone(&mode),
        Arc::clone(&clock),
        Arc::clone(&bus),
        Arc::clone(&channel),
        outputs.clone(),
        Duration::from_millis(5),
    );
    Rig {
        light,
        bus,
        channel,
        clock,
        mode,
        outputs,
    }
}

/// Run a dispatcher for `steps` sensor events on its own thread.
fn serve_light(r: &Rig, levels: &[i16], steps: usize) -> std::thread::JoinHandle<()> {
    let mut d = Dispatcher::new(
        MockSensors::new([300; 5]).with_light(levels),
        Arc::new(SensorRegistry::new(450)),
        Arc::clone(&r.bus),
        Arc::clone(&r.channel),
        Arc::new(TaskControl::new("moisture")),
        5,
        WaitPolicy::Any,
    );
    std::thread::spawn(move || {
        for _ in 0..steps {
            d.step();
        }
    })
}

#[test]
fn daylight_levels_select_output_count() {
    let mut r = rig(12);
    let server = serve_light(&r, &[15, 75, 150], 3);

    assert_eq!(r.light.step(), Some(LightTier::Full));
    assert_eq!(r.outputs.state().lights, [true, true, true]);

    assert_eq!(r.light.step(), Some(LightTier::Low));
    assert_eq!(r.outputs.state().lights, [true, false, false]);

    assert_eq!(r.light.step(), Some(LightTier::Off));
    assert_eq!(r.outputs.state().lights, [false, false, false]);

    server.join().unwrap();
}

#[test]
fn error_sentinel_leaves_outputs_unchanged() {
    let mut r = rig(12);
    let server = serve_light(&r, &[40, -1], 2);

    assert_eq!(r.light.step(), Some(LightTier::Medium));
    assert_eq!(r.light.step(), None);
    assert_eq!(r.light.current(), Some(LightTier::Medium));
    assert_eq!(r.outputs.state().lights, [true, true, false]);

    server.join().unwrap();
}

#[test]
fn night_forces_off_without_requesting_a_reading() {
    let mut r = rig(20);
    assert_eq!(r.light.step(), Some(LightTier::Off));
    assert_eq!(r.bus.sensor_events.get(), 0);
    assert!(!r.channel.is_full());
}

#[test]
fn manual_mode_follows_the_clock() {
    let mut r = rig(6);
    r.mode.store(LightMode::Manual {
        on_hour: 7,
        off_hour: 21,
    });

    assert_eq!(r.light.step(), Some(LightTier::Off));
    r.clock.advance(TimeUnit::Hour, 1);
    assert_eq!(r.light.step(), Some(LightTier::Full));
    assert_eq!(r.bus.sensor_events.get(), 0, "manual mode never asks for a reading");
    r.clock.set(TimeUnit::Hour, 21);
    assert_eq!(r.light.step(), Some(LightTier::Off));
}
