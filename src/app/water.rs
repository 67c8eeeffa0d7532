//! Irrigation: water control and one-shot pump workers.
//!
//! ```text
//!  pumpEvents ──wait_for(Any)──▶ WaterControl ──spawn──▶ PumpWorker(i)
//!                                                          on → run → off
//! ```
//!
//! Each set pump bit spawns one detached [`PumpWorker`] that owns its pump
//! index.  A pump already running ignores further requests until its worker
//! finishes.  At night requests are dropped unless night irrigation is
//! enabled, and each pump gets a fixed number of runs per simulated day.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::app::ports::ActuatorSink;
use crate::clock::SharedClock;
use crate::signals::{EventBits, PUMP_COUNT, PUMP_EVENTS_ALL, SignalBus, WaitPolicy, pump_indices};
use crate::task::{TaskSpec, spawn_task};

const PUMP_TASKS: [TaskSpec; PUMP_COUNT] = [
    TaskSpec::new("pump-1\0", 2, 8),
    TaskSpec::new("pump-2\0", 2, 8),
    TaskSpec::new("pump-3\0", 2, 8),
    TaskSpec::new("pump-4\0", 2, 8),
    TaskSpec::new("pump-5\0", 2, 8),
];

/// One pump activation.  Owns everything it needs; nothing refers back
/// into the spawner.
pub struct PumpWorker {
    index: usize,
    run_time: Duration,
    sink: Arc<dyn ActuatorSink>,
    running: Arc<AtomicU8>,
}

impl PumpWorker {
    pub fn run(self) {
        let _guard = RunningGuard {
            running: Arc::clone(&self.running),
            bit: 1 << self.index,
        };
        info!("Pump {}: on for {}ms", self.index + 1, self.run_time.as_millis());
        self.sink.set_pump(self.index, true);
        std::thread::sleep(self.run_time);
        self.sink.set_pump(self.index, false);
        info!("Pump {}: off", self.index + 1);
    }
}

/// Clears the pump's running bit when the worker ends, however it ends.
struct RunningGuard {
    running: Arc<AtomicU8>,
    bit: u8,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.fetch_and(!self.bit, Ordering::AcqRel);
    }
}

/// Runs granted per pump on one simulated day.
struct DailyRuns {
    day: u32,
    counts: [u8; PUMP_COUNT],
}

pub struct WaterControl {
    bus: Arc<SignalBus>,
    clock: Arc<SharedClock>,
    sink: Arc<dyn ActuatorSink>,
    run_time: Duration,
    policy: WaitPolicy,
    irrigate_at_night: bool,
    max_runs_per_day: u8,
    daily: Mutex<DailyRuns>,
    running: Arc<AtomicU8>,
}

impl WaterControl {
    pub fn new(
        bus: Arc<SignalBus>,
        clock: Arc<SharedClock>,
        sink: Arc<dyn ActuatorSink>,
        run_time: Duration,
        policy: WaitPolicy,
        irrigate_at_night: bool,
        max_runs_per_day: u8,
    ) -> Self {
        if policy == WaitPolicy::All {
            warn!(
                "Water control: waiting for ALL pump bits; pumps are requested \
                 individually and may never all be set together"
            );
        }
        let daily = Mutex::new(DailyRuns {
            day: clock.day(),
            counts: [0; PUMP_COUNT],
        });
        Self {
            bus,
            clock,
            sink,
            run_time,
            policy,
            irrigate_at_night,
            max_runs_per_day,
            daily,
            running: Arc::new(AtomicU8::new(0)),
        }
    }

    /// Bit mask of pumps whose worker is still running.
    pub fn running(&self) -> u8 {
        self.running.load(Ordering::Acquire)
    }

    /// Wait for pump requests and spawn workers for them.
    pub fn step(&self) -> Vec<JoinHandle<()>> {
        let bits = self.bus.pump_events.wait(PUMP_EVENTS_ALL, true, self.policy);
        self.dispatch(bits)
    }

    /// Spawn one worker per requested pump that may run now.
    pub fn dispatch(&self, bits: EventBits) -> Vec<JoinHandle<()>> {
        let now = self.clock.now();
        if !self.irrigate_at_night && now.is_night() {
            warn!("Water control: night, pump request 0b{:05b} dropped", bits);
            return Vec::new();
        }

        let mut daily = self.daily.lock().expect("daily run counter mutex poisoned");
        if daily.day != now.day {
            debug!("Water control: day {} begins, run counters reset", now.day);
            daily.day = now.day;
            daily.counts = [0; PUMP_COUNT];
        }

        let mut workers = Vec::new();
        for index in pump_indices(bits) {
            if daily.counts[index] >= self.max_runs_per_day {
                warn!(
                    "Water control: pump {} used its {} runs today, request dropped",
                    index + 1,
                    self.max_runs_per_day
                );
                continue;
            }

            let bit = 1u8 << index;
            if self.running.fetch_or(bit, Ordering::AcqRel) & bit != 0 {
                info!("Water control: pump {} already running", index + 1);
                continue;
            }

            let worker = PumpWorker {
                index,
                run_time: self.run_time,
                sink: Arc::clone(&self.sink),
                running: Arc::clone(&self.running),
            };
            match spawn_task(PUMP_TASKS[index], move || worker.run()) {
                Ok(handle) => {
                    daily.counts[index] += 1;
                    workers.push(handle);
                }
                Err(e) => {
                    // The closure was dropped with the worker, so no guard ran.
                    self.running.fetch_and(!bit, Ordering::AcqRel);
                    error!("Water control: pump {} not started: {}", index + 1, e);
                }
            }
        }
        workers
    }

    pub fn run(self) {
        info!("Water control started");
        loop {
            // Workers are detached; each clears its own running bit.
            drop(self.step());
        }
    }
}
