//! Moisture batch → pump request → pump worker, end to end.

use std::sync::Arc;
use std::time::Duration;

use gardener::app::dispatcher::Dispatcher;
use gardener::app::water::WaterControl;
use gardener::channel::LightChannel;
use gardener::clock::{SharedClock, SimulatedClock};
use gardener::error::SensorError;
use gardener::registry::SensorRegistry;
use gardener::signals::{MOISTURE_READY, SignalBus, WaitPolicy, pump_bit};
use gardener::task::TaskControl;

use crate::mock_hw::{MockHardware, MockSensors};

struct Rig {
    dispatcher: Dispatcher<MockSensors>,
    water: WaterControl,
    registry: Arc<SensorRegistry>,
    bus: Arc<SignalBus>,
    hw: Arc<MockHardware>,
}

fn rig(sensors: MockSensors, hour: u8) -> Rig {
    let registry = Arc::new(SensorRegistry::new(450));
    let bus = Arc::new(SignalBus::new());
    let clock = Arc::new(SharedClock::new(SimulatedClock::new(hour, 0, 0)));
    let hw = MockHardware::new();

    let dispatcher = Dispatcher::new(
        sensors,
        Arc::clone(&registry),
        Arc::clone(&bus),
        Arc::new(LightChannel::new()),
        Arc::new(TaskControl::new("moisture")),
        5,
        WaitPolicy::Any,
    );
    let water = WaterControl::new(
        Arc::clone(&bus),
        clock,
        hw.clone(),
        Duration::from_millis(60),
        WaitPolicy::Any,
        false,
        10,
    );
    Rig {
        dispatcher,
        water,
        registry,
        bus,
        hw,
    }
}

#[test]
fn breach_on_sensor_two_runs_only_pump_two() {
    let mut r = rig(MockSensors::new([300, 310, 470, 320, 330]), 12);

    r.bus.sensor_events.set(MOISTURE_READY);
    r.dispatcher.step();
    assert_eq!(r.bus.pump_events.get(), pump_bit(2));
    assert_eq!(r.registry.read(2).unwrap().last_reading, 470);

    let workers = r.water.step();
    assert_eq!(workers.len(), 1);
    assert_eq!(r.bus.pump_events.get(), 0, "request consumed");

    for w in workers {
        w.join().unwrap();
    }
    assert_eq!(r.hw.pump_calls(), vec![(2, true), (2, false)]);
    assert_eq!(r.water.running(), 0, "worker cleaned up after itself");
}

#[test]
fn pump_stays_on_for_the_run_time() {
    let mut r = rig(MockSensors::new([480, 300, 300, 300, 300]), 9);
    r.bus.sensor_events.set(MOISTURE_READY);
    r.dispatcher.step();

    let workers = r.water.step();
    std::thread::sleep(Duration::from_millis(15));
    assert_eq!(r.hw.pump_calls(), vec![(0, true)], "still running mid-cycle");
    for w in workers {
        w.join().unwrap();
    }
    assert_eq!(r.hw.pump_calls(), vec![(0, true), (0, false)]);
}

#[test]
fn failing_sensor_is_skipped_and_others_still_irrigate() {
    let mut sensors = MockSensors::new([300, 300, 300, 499, 300]);
    sensors.moisture[1] = Err(SensorError::NoResponse(1));
    let mut r = rig(sensors, 12);

    r.dispatcher.populate();
    let outcome = r.dispatcher.read_moisture();
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.updated, 4);
    assert_eq!(r.bus.pump_events.get(), pump_bit(3));
}

#[test]
fn night_request_is_dropped() {
    let mut r = rig(MockSensors::new([490; 5]), 23);
    r.bus.sensor_events.set(MOISTURE_READY);
    r.dispatcher.step();
    assert!(r.water.step().is_empty());
    assert!(r.hw.pump_calls().is_empty());
}
