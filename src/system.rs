//! System wiring.
//!
//! [`Garden`] owns one instance of every shared component; [`Garden::spawn`]
//! hands each task the handles it needs and starts it.
//!
//! ```text
//!  task          pri   shares
//!  clock          6    clock
//!  dispatcher     5    registry, bus, light channel, moisture control
//!  light          4    clock, bus, light channel, light mode, actuators
//!  water          4    clock, bus, actuators (spawns pump-1..pump-5 at 2)
//!  moisture       3    bus, moisture control
//!  console        2    session, registry, clock, light mode, serial
//!  reporter       1    session, registry, clock, light mode, serial
//! ```

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::info;

use crate::app::console::OperatorConsole;
use crate::app::dispatcher::Dispatcher;
use crate::app::light::{LightController, SharedLightMode};
use crate::app::ports::{ActuatorSink, ConsoleInput, SensorSource};
use crate::app::producers::{ClockTicker, PeriodicProducer};
use crate::app::reporter::Reporter;
use crate::app::session::OperatorSession;
use crate::app::water::WaterControl;
use crate::channel::LightChannel;
use crate::clock::{SharedClock, SimulatedClock};
use crate::config::GardenConfig;
use crate::registry::SensorRegistry;
use crate::serial::SerialChannel;
use crate::signals::{MOISTURE_READY, SignalBus};
use crate::task::{TaskControl, TaskSpec, spawn_task};

const CLOCK_TASK: TaskSpec = TaskSpec::new("clock\0", 6, 8);
const DISPATCHER_TASK: TaskSpec = TaskSpec::new("dispatcher\0", 5, 16);
const LIGHT_TASK: TaskSpec = TaskSpec::new("light\0", 4, 8);
const WATER_TASK: TaskSpec = TaskSpec::new("water\0", 4, 8);
const MOISTURE_TASK: TaskSpec = TaskSpec::new("moisture\0", 3, 8);
const CONSOLE_TASK: TaskSpec = TaskSpec::new("console\0", 2, 16);
const REPORTER_TASK: TaskSpec = TaskSpec::new("reporter\0", 1, 16);

fn millis(ms: u32) -> Duration {
    Duration::from_millis(u64::from(ms))
}

/// Every shared component, created once at start-up.
pub struct Garden {
    pub config: GardenConfig,
    pub clock: Arc<SharedClock>,
    pub registry: Arc<SensorRegistry>,
    pub bus: Arc<SignalBus>,
    pub light_channel: Arc<LightChannel>,
    pub light_mode: Arc<SharedLightMode>,
    pub session: Arc<OperatorSession>,
    pub serial: Arc<SerialChannel>,
    pub moisture_control: Arc<TaskControl>,
}

impl Garden {
    pub fn new(config: GardenConfig, serial: Arc<SerialChannel>) -> Self {
        let start = SimulatedClock::new(
            config.clock_start_hour,
            config.clock_start_minute,
            config.clock_start_second,
        );
        Self {
            clock: Arc::new(SharedClock::new(start)),
            registry: Arc::new(SensorRegistry::new(config.default_threshold)),
            bus: Arc::new(SignalBus::new()),
            light_channel: Arc::new(LightChannel::new()),
            light_mode: Arc::new(SharedLightMode::default()),
            session: Arc::new(OperatorSession::new()),
            serial,
            moisture_control: Arc::new(TaskControl::new("moisture")),
            config,
        }
    }

    /// Start every long-lived task.  Returns their handles; none of them
    /// finishes except the console once its input closes.
    pub fn spawn<S, I>(
        &self,
        source: S,
        actuators: Arc<dyn ActuatorSink>,
        input: I,
    ) -> std::io::Result<Vec<JoinHandle<()>>>
    where
        S: SensorSource + Send + 'static,
        I: ConsoleInput + Send + 'static,
    {
        let c = &self.config;
        let mut handles = Vec::with_capacity(7);

        let ticker = ClockTicker::new(
            Arc::clone(&self.clock),
            c.clock_step_secs,
            millis(c.clock_tick_ms),
        );
        handles.push(spawn_task(CLOCK_TASK, move || ticker.run())?);

        let dispatcher = Dispatcher::new(
            source,
            Arc::clone(&self.registry),
            Arc::clone(&self.bus),
            Arc::clone(&self.light_channel),
            Arc::clone(&self.moisture_control),
            c.sensor_count,
            c.sensor_wait,
        );
        handles.push(spawn_task(DISPATCHER_TASK, move || dispatcher.run())?);

        let light = LightController::new(
            Arc::clone(&self.light_mode),
            Arc::clone(&self.clock),
            Arc::clone(&self.bus),
            Arc::clone(&self.light_channel),
            Arc::clone(&actuators),
            millis(c.light_period_ms),
        );
        handles.push(spawn_task(LIGHT_TASK, move || light.run())?);

        let water = WaterControl::new(
            Arc::clone(&self.bus),
            Arc::clone(&self.clock),
            actuators,
            millis(c.pump_run_ms),
            c.pump_wait,
            c.irrigate_at_night,
            c.max_pump_runs_per_day,
        );
        handles.push(spawn_task(WATER_TASK, move || water.run())?);

        let moisture = PeriodicProducer::new(
            Arc::clone(&self.bus),
            MOISTURE_READY,
            millis(c.moisture_period_ms),
            Arc::clone(&self.moisture_control),
        );
        handles.push(spawn_task(MOISTURE_TASK, move || moisture.run())?);

        let console = OperatorConsole::new(
            input,
            Arc::clone(&self.serial),
            Arc::clone(&self.session),
            Arc::clone(&self.registry),
            Arc::clone(&self.clock),
            Arc::clone(&self.light_mode),
        );
        handles.push(spawn_task(CONSOLE_TASK, move || console.run())?);

        let reporter = Reporter::new(
            Arc::clone(&self.serial),
            Arc::clone(&self.session),
            Arc::clone(&self.registry),
            Arc::clone(&self.clock),
            Arc::clone(&self.light_mode),
            millis(c.report_period_ms),
        );
        handles.push(spawn_task(REPORTER_TASK, move || reporter.run())?);

        info!("Garden: {} tasks running", handles.len());
        Ok(handles)
    }
}
