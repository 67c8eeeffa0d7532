//! Single-writer serial text output.
//!
//! The writer is a token: a task takes it out of the channel, writes its
//! whole message, and puts it back.  Taking the token waits at most the
//! configured timeout; on expiry the message is dropped, which is fine
//! for a diagnostic channel.
//!
//! [`SerialLogger`] routes the `log` facade through the same channel on
//! host builds, so log lines and operator output never interleave
//! mid-line.

use std::io::Write;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

type Writer = Box<dyn Write + Send>;

pub struct SerialChannel {
    slot: Mutex<Option<Writer>>,
    returned: Condvar,
    timeout: Duration,
}

impl SerialChannel {
    pub fn new(writer: impl Write + Send + 'static, timeout: Duration) -> Self {
        Self {
            slot: Mutex::new(Some(Box::new(writer))),
            returned: Condvar::new(),
            timeout,
        }
    }

    /// Serial channel over the process stdout.
    pub fn stdout(timeout: Duration) -> Self {
        Self::new(std::io::stdout(), timeout)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Writer>> {
        self.slot.lock().expect("serial mutex poisoned")
    }

    fn take_writer(&self) -> Option<Writer> {
        let guard = self.lock();
        let (mut guard, _) = self
            .returned
            .wait_timeout_while(guard, self.timeout, |w| w.is_none())
            .expect("serial mutex poisoned");
        guard.take()
    }

    fn give_back(&self, writer: Writer) {
        *self.lock() = Some(writer);
        self.returned.notify_one();
    }

    fn emit(&self, text: &str, newline: bool) -> bool {
        let Some(mut writer) = self.take_writer() else {
            return false;
        };
        let mut ok = writer.write_all(text.as_bytes()).is_ok();
        if newline {
            ok &= writer.write_all(b"\n").is_ok();
        }
        ok &= writer.flush().is_ok();
        self.give_back(writer);
        ok
    }

    /// Write `text` without a newline.  Returns `false` if dropped.
    pub fn write(&self, text: &str) -> bool {
        self.emit(text, false)
    }

    /// Write `text` followed by a newline.  Returns `false` if dropped.
    pub fn write_line(&self, text: &str) -> bool {
        self.emit(text, true)
    }
}

/// `log` backend that prints through a [`SerialChannel`].
pub struct SerialLogger {
    serial: Arc<SerialChannel>,
    level: LevelFilter,
}

impl SerialLogger {
    pub fn new(serial: Arc<SerialChannel>, level: LevelFilter) -> Self {
        Self { serial, level }
    }

    /// Install as the global logger.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        );
        // Dropped on timeout like any other serial output.
        let _ = self.serial.write_line(&line);
    }

    fn flush(&self) {}
}
