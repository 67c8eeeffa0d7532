//! Whole-system run with fast timing.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gardener::config::GardenConfig;
use gardener::serial::SerialChannel;
use gardener::system::Garden;

use crate::mock_hw::{Capture, MockHardware, MockSensors, fed_input};

fn fast_config() -> GardenConfig {
    GardenConfig {
        moisture_period_ms: 20,
        light_period_ms: 10,
        clock_tick_ms: 10,
        pump_run_ms: 30,
        report_period_ms: 50,
        ..GardenConfig::default()
    }
}

#[test]
fn garden_irrigates_lights_and_reports() {
    let out = Capture::default();
    let serial = Arc::new(SerialChannel::new(out.clone(), Duration::from_millis(50)));
    let hw = MockHardware::new();
    let (tx, input) = fed_input();

    let garden = Garden::new(fast_config(), serial);
    let handles = garden
        .spawn(
            MockSensors::new([480, 300, 300, 300, 300]).with_light(&[10; 64]),
            hw.clone(),
            input,
        )
        .unwrap();
    assert_eq!(handles.len(), 7);

    // Let the dispatcher register its sensors before editing one.
    thread::sleep(Duration::from_millis(50));
    tx.send("p".into()).unwrap();
    tx.send("2".into()).unwrap();
    tx.send("320".into()).unwrap();

    thread::sleep(Duration::from_millis(400));

    let pumps = hw.pump_calls();
    assert_eq!(pumps.first(), Some(&(0, true)));
    assert!(pumps.iter().all(|&(index, _)| index == 0), "only pump 1 breached");

    assert_eq!(garden.registry.len(), 5);
    assert_eq!(garden.registry.read(1).unwrap().threshold, 320);

    let text = out.text();
    assert!(text.contains("STATUS"));
    assert!(text.contains("Moisture_sensor_4"));
    assert!(hw.last_lights().is_some());
}
