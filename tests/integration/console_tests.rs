//! Operator console against a concurrently running reporter.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use gardener::app::commands::ConsoleCommand;
use gardener::app::console::OperatorConsole;
use gardener::app::light::{LightMode, SharedLightMode};
use gardener::app::reporter::Reporter;
use gardener::app::session::OperatorSession;
use gardener::clock::{SharedClock, SimulatedClock};
use gardener::error::{Error, InputError};
use gardener::registry::SensorRegistry;
use gardener::serial::SerialChannel;

use crate::mock_hw::{Capture, FedInput, fed_input};

struct Rig {
    tx: Sender<String>,
    console: OperatorConsole<FedInput>,
    reporter: Arc<Reporter>,
    registry: Arc<SensorRegistry>,
    mode: Arc<SharedLightMode>,
    out: Capture,
}

fn rig() -> Rig {
    let out = Capture::default();
    let serial = Arc::new(SerialChannel::new(out.clone(), Duration::from_millis(200)));
    let session = Arc::new(OperatorSession::new());
    let registry = Arc::new(SensorRegistry::new(450));
    for i in 0..5u8 {
        registry
            .register_sensor(&format!("Moisture_sensor_{i}"), i, i)
            .unwrap();
    }
    let clock = Arc::new(SharedClock::new(SimulatedClock::new(12, 0, 0)));
    let mode = Arc::new(SharedLightMode::default());
    let (tx, input) = fed_input();

    let console = OperatorConsole::new(
        input,
        Arc::clone(&serial),
        Arc::clone(&session),
        Arc::clone(&registry),
        Arc::clone(&clock),
        Arc::clone(&mode),
    );
    let reporter = Arc::new(Reporter::new(
        serial,
        session,
        Arc::clone(&registry),
        clock,
        Arc::clone(&mode),
        Duration::from_millis(10),
    ));
    Rig {
        tx,
        console,
        reporter,
        registry,
        mode,
        out,
    }
}

fn wait_for_text(out: &Capture, needle: &str) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !out.text().contains(needle) {
        assert!(Instant::now() < deadline, "timed out waiting for {needle:?}");
        thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn threshold_change_holds_off_the_reporter() {
    let Rig {
        tx,
        mut console,
        reporter,
        registry,
        out,
        ..
    } = rig();

    let console_thread = thread::spawn(move || console.step());

    tx.send("p".into()).unwrap();
    wait_for_text(&out, "Pump (1-5):");

    let report_thread = {
        let reporter = Arc::clone(&reporter);
        thread::spawn(move || reporter.report_once())
    };

    thread::sleep(Duration::from_millis(30));
    tx.send("3".into()).unwrap();
    wait_for_text(&out, "New threshold:");
    thread::sleep(Duration::from_millis(30));
    assert!(!out.text().contains("STATUS"), "report printed mid-command");

    tx.send("500".into()).unwrap();
    let result = console_thread.join().unwrap();
    assert_eq!(
        result,
        Some(Ok(ConsoleCommand::SetThreshold {
            pump: 2,
            threshold: 500
        }))
    );

    let snapshot = report_thread.join().unwrap();
    assert_eq!(snapshot.sensors[2].threshold, 500);
    assert_eq!(registry.read(2).unwrap().threshold, 500);

    let text = out.text();
    let confirmed = text.find("Pump 3 threshold set to 500").unwrap();
    let reported = text.find("STATUS").unwrap();
    assert!(confirmed < reported);
}

#[test]
fn unrecognized_input_is_echoed_and_changes_nothing() {
    let Rig {
        tx,
        mut console,
        registry,
        mode,
        out,
        ..
    } = rig();

    tx.send("z".into()).unwrap();
    assert_eq!(console.step(), Some(Err(Error::Input(InputError::Unrecognized))));

    tx.send("l".into()).unwrap();
    tx.send("x".into()).unwrap();
    assert_eq!(console.step(), Some(Err(Error::Input(InputError::Unrecognized))));

    let text = out.text();
    assert!(text.contains("'z' not recognized"));
    assert!(text.contains("'x' not recognized"));
    assert_eq!(mode.load(), LightMode::Automatic);
    assert!(registry.snapshot().iter().all(|r| r.threshold == 450));
}

#[test]
fn console_stops_when_input_closes() {
    let Rig { tx, console, .. } = rig();
    tx.send("l".into()).unwrap();
    tx.send("a".into()).unwrap();
    drop(tx);
    let handle = thread::spawn(move || console.run());
    handle.join().unwrap();
}
