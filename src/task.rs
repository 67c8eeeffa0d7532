//! Task spawning and suspend/resume control.
//!
//! Every long-lived actor runs as its own thread.  On ESP-IDF, `std::thread`
//! is a thin wrapper over a FreeRTOS task; `esp_pthread_set_cfg()` sets the
//! priority and stack of the *next* thread created from the calling thread,
//! so the config→spawn pair must not be interleaved with other spawns on
//! the same thread.  On other targets the priority is ignored.
//!
//! [`TaskControl`] is the suspend/resume handle a task polls at its safe
//! points: a suspended task parks at the next [`TaskControl::checkpoint`]
//! until resumed.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;

/// Static description of a task.
///
/// `name` is NUL-terminated (`"pump-1\0"`) so ESP-IDF can point at it
/// directly; [`TaskSpec::display_name`] strips the terminator.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub name: &'static str,
    /// Higher runs first (FreeRTOS convention).
    pub priority: u8,
    pub stack_kb: usize,
}

impl TaskSpec {
    pub const fn new(name: &'static str, priority: u8, stack_kb: usize) -> Self {
        Self {
            name,
            priority,
            stack_kb,
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Spawn a named task with explicit priority and stack.
#[cfg(target_os = "espidf")]
pub fn spawn_task(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> std::io::Result<JoinHandle<()>> {
    if !spec.name.ends_with('\0') {
        return Err(std::io::Error::other(format!(
            "task name '{}' is not NUL-terminated",
            spec.name
        )));
    }
    // SAFETY: `spec.name` is a NUL-terminated static, and the config is
    // consumed by the spawn below on this same thread.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.prio = i32::from(spec.priority);
        cfg.stack_size = (spec.stack_kb * 1024) as i32;
        cfg.thread_name = spec.name.as_ptr().cast();
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK as i32 {
        return Err(std::io::Error::other(format!(
            "esp_pthread_set_cfg failed: {ret}"
        )));
    }

    log::info!(
        "Spawning '{}' (pri={}, stack={}KB)",
        spec.display_name(),
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .spawn(f)
}

/// Smallest stack a host thread gets, whatever the task asks for.
#[cfg(not(target_os = "espidf"))]
const HOST_MIN_STACK_KB: usize = 64;

/// Host fallback; priority is ignored.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_task(
    spec: TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> std::io::Result<JoinHandle<()>> {
    log::debug!(
        "Spawning '{}' (sim, pri={} ignored, stack={}KB)",
        spec.display_name(),
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(spec.display_name().into())
        .stack_size(spec.stack_kb.max(HOST_MIN_STACK_KB) * 1024)
        .spawn(f)
}

/// Suspend/resume gate for one task.
pub struct TaskControl {
    name: &'static str,
    suspended: Mutex<bool>,
    resumed: Condvar,
}

impl TaskControl {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            suspended: Mutex::new(false),
            resumed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.suspended.lock().expect("task control mutex poisoned")
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn suspend(&self) {
        *self.lock() = true;
    }

    pub fn resume(&self) {
        *self.lock() = false;
        self.resumed.notify_all();
    }

    pub fn is_suspended(&self) -> bool {
        *self.lock()
    }

    /// Park while suspended.  Called by the controlled task itself.
    pub fn checkpoint(&self) {
        let guard = self.lock();
        drop(
            self.resumed
                .wait_while(guard, |suspended| *suspended)
                .expect("task control mutex poisoned"),
        );
    }
}
