//! Operator console task.
//!
//! Reads a selector line, then prompts for each field of the command.  The
//! operator session is held from the first prompt until the command is
//! applied or rejected, so a status report never interleaves with a
//! half-entered command.  Bad input is echoed back as
//! `'<input>' not recognized` and leaves every piece of state untouched.

use std::sync::Arc;

use log::{info, warn};

use crate::app::commands::{
    ConsoleCommand, Selector, parse_hour, parse_light_choice, parse_pump, parse_selector,
    parse_threshold, parse_unit, parse_unit_value,
};
use crate::app::light::{LightMode, SharedLightMode};
use crate::app::ports::ConsoleInput;
use crate::app::session::OperatorSession;
use crate::clock::SharedClock;
use crate::error::{Error, InputError};
use crate::registry::SensorRegistry;
use crate::serial::SerialChannel;

pub struct OperatorConsole<I: ConsoleInput> {
    input: I,
    serial: Arc<SerialChannel>,
    session: Arc<OperatorSession>,
    registry: Arc<SensorRegistry>,
    clock: Arc<SharedClock>,
    light_mode: Arc<SharedLightMode>,
}

impl<I: ConsoleInput> OperatorConsole<I> {
    pub fn new(
        input: I,
        serial: Arc<SerialChannel>,
        session: Arc<OperatorSession>,
        registry: Arc<SensorRegistry>,
        clock: Arc<SharedClock>,
        light_mode: Arc<SharedLightMode>,
    ) -> Self {
        Self {
            input,
            serial,
            session,
            registry,
            clock,
            light_mode,
        }
    }

    /// Handle one command.  `None` once the input stream is closed.
    ///
    /// Parse failures come back as [`Error::Input`]; a command the shared
    /// state refused comes back with the refusal itself.
    pub fn step(&mut self) -> Option<Result<ConsoleCommand, Error>> {
        let line = loop {
            let line = self.input.read_line()?;
            if !line.trim().is_empty() {
                break line;
            }
        };

        let selector = match parse_selector(&line) {
            Ok(s) => s,
            Err(e) => {
                self.reject(&line);
                return Some(Err(e.into()));
            }
        };

        let session = Arc::clone(&self.session);
        let _held = session.begin();

        let command = match self.read_command(selector) {
            Ok(c) => c,
            Err(e) => return Some(Err(e.into())),
        };

        match command.apply(&self.registry, &self.clock, &self.light_mode) {
            Ok(()) => {
                info!("Console: applied {:?}", command);
                self.confirm(command);
                Some(Ok(command))
            }
            Err(e) => {
                warn!("Console: {:?} rejected: {}", command, e);
                self.serial.write_line(&format!("rejected: {e}"));
                Some(Err(e))
            }
        }
    }

    fn read_command(&mut self, selector: Selector) -> Result<ConsoleCommand, InputError> {
        match selector {
            Selector::Light => {
                let manual = self.ask("Light mode: (a)utomatic or (m)anual?", parse_light_choice)?;
                if !manual {
                    return Ok(ConsoleCommand::SetLightMode(LightMode::Automatic));
                }
                let on_hour = self.ask("Lights on at hour (0-23):", parse_hour)?;
                let off_hour = self.ask("Lights off at hour (0-23):", parse_hour)?;
                Ok(ConsoleCommand::SetLightMode(LightMode::Manual { on_hour, off_hour }))
            }
            Selector::Pump => {
                let pump = self.ask("Pump (1-5):", parse_pump)?;
                let threshold = self.ask("New threshold:", parse_threshold)?;
                Ok(ConsoleCommand::SetThreshold { pump, threshold })
            }
            Selector::Time => {
                let unit = self.ask("Unit (h/m/s):", parse_unit)?;
                let value = self.ask("Value:", |line| parse_unit_value(unit, line))?;
                Ok(ConsoleCommand::SetTime { unit, value })
            }
        }
    }

    /// Prompt, read one line, and parse it.
    fn ask<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Result<T, InputError>,
    ) -> Result<T, InputError> {
        self.serial.write_line(prompt);
        let line = self.input.read_line().ok_or(InputError::Closed)?;
        parse(&line).inspect_err(|_| self.reject(&line))
    }

    fn reject(&self, line: &str) {
        self.serial
            .write_line(&format!("'{}' {}", line.trim(), InputError::Unrecognized));
    }

    fn confirm(&self, command: ConsoleCommand) {
        let text = match command {
            ConsoleCommand::SetLightMode(mode) => format!("Light mode: {mode}"),
            ConsoleCommand::SetThreshold { pump, threshold } => {
                format!("Pump {} threshold set to {}", pump + 1, threshold)
            }
            ConsoleCommand::SetTime { .. } => format!("Time set to {}", self.clock.now()),
        };
        self.serial.write_line(&text);
    }

    pub fn run(mut self) {
        info!("Operator console started");
        loop {
            match self.step() {
                None | Some(Err(Error::Input(InputError::Closed))) => break,
                Some(_) => {}
            }
        }
        info!("Operator console: input closed");
    }
}
