//! Grow-light control.
//!
//! Each cycle the controller picks a [`LightTier`] for the three light
//! outputs:
//!
//! | mode | clock | source of the tier |
//! |------|-------|--------------------|
//! | Manual { on, off } | any | hour against the off window `[off, on)` |
//! | Automatic | Night | always `Off` |
//! | Automatic | Day | request a reading, block on the light channel, map the level |
//!
//! The mode is written only by the operator console and read here, so it
//! lives in a single atomic word instead of behind a lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use log::{info, warn};

use crate::app::ports::ActuatorSink;
use crate::channel::{LightChannel, LightLevel};
use crate::clock::SharedClock;
use crate::signals::{LIGHT_READY, SignalBus};

/// Number of discrete light outputs.
pub const LIGHT_OUTPUTS: usize = 3;

// ═══════════════════════════════════════════════════════════════
//  Mode
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightMode {
    /// Follow the light sensor by day, dark at night.
    Automatic,
    /// Fixed schedule: on from `on_hour`, off from `off_hour`.
    Manual { on_hour: u8, off_hour: u8 },
}

impl core::fmt::Display for LightMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::Manual { on_hour, off_hour } => {
                write!(f, "manual (on {:02}:00, off {:02}:00)", on_hour, off_hour)
            }
        }
    }
}

const MANUAL_FLAG: u32 = 1 << 16;

/// Single-writer light mode cell.
pub struct SharedLightMode {
    word: AtomicU32,
}

impl SharedLightMode {
    pub fn new(mode: LightMode) -> Self {
        Self {
            word: AtomicU32::new(Self::encode(mode)),
        }
    }

    fn encode(mode: LightMode) -> u32 {
        match mode {
            LightMode::Automatic => 0,
            LightMode::Manual { on_hour, off_hour } => {
                MANUAL_FLAG | u32::from(on_hour) << 8 | u32::from(off_hour)
            }
        }
    }

    fn decode(word: u32) -> LightMode {
        if word & MANUAL_FLAG == 0 {
            LightMode::Automatic
        } else {
            LightMode::Manual {
                on_hour: (word >> 8) as u8,
                off_hour: word as u8,
            }
        }
    }

    pub fn load(&self) -> LightMode {
        Self::decode(self.word.load(Ordering::Acquire))
    }

    pub fn store(&self, mode: LightMode) {
        self.word.store(Self::encode(mode), Ordering::Release);
    }
}

impl Default for SharedLightMode {
    fn default() -> Self {
        Self::new(LightMode::Automatic)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tiers
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightTier {
    Off,
    /// One of three outputs lit.
    Low,
    /// Two of three outputs lit.
    Medium,
    /// All three outputs lit.
    Full,
}

impl LightTier {
    /// Map an ambient level to a tier: darker surroundings, more light.
    ///
    /// Negative levels are the sensor's error sentinel and yield `None`.
    pub fn from_level(level: LightLevel) -> Option<Self> {
        match level {
            l if l < 0 => None,
            0..=19 => Some(Self::Full),
            20..=59 => Some(Self::Medium),
            60..=99 => Some(Self::Low),
            _ => Some(Self::Off),
        }
    }

    pub fn lit_count(self) -> usize {
        match self {
            Self::Off => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::Full => 3,
        }
    }

    /// Per-output on/off pattern, lowest output first.
    pub fn outputs(self) -> [bool; LIGHT_OUTPUTS] {
        let lit = self.lit_count();
        core::array::from_fn(|i| i < lit)
    }
}

/// Manual schedule: lights are off while `hour` is in `[off_hour, on_hour)`,
/// wrapping past midnight, and fully on otherwise.
///
/// `on_hour == off_hour` makes the off window empty.
pub fn manual_tier(hour: u8, on_hour: u8, off_hour: u8) -> LightTier {
    let off = if off_hour <= on_hour {
        hour >= off_hour && hour < on_hour
    } else {
        hour >= off_hour || hour < on_hour
    };
    if off { LightTier::Off } else { LightTier::Full }
}

// ═══════════════════════════════════════════════════════════════
//  Controller task
// ═══════════════════════════════════════════════════════════════

pub struct LightController {
    mode: Arc<SharedLightMode>,
    clock: Arc<SharedClock>,
    bus: Arc<SignalBus>,
    channel: Arc<LightChannel>,
    sink: Arc<dyn ActuatorSink>,
    period: Duration,
    current: Option<LightTier>,
}

impl LightController {
    pub fn new(
        mode: Arc<SharedLightMode>,
        clock: Arc<SharedClock>,
        bus: Arc<SignalBus>,
        channel: Arc<LightChannel>,
        sink: Arc<dyn ActuatorSink>,
        period: Duration,
    ) -> Self {
        Self {
            mode,
            clock,
            bus,
            channel,
            sink,
            period,
            current: None,
        }
    }

    /// Tier most recently driven to the outputs.
    pub fn current(&self) -> Option<LightTier> {
        self.current
    }

    /// One control cycle.  Returns the tier now driven, or `None` when a
    /// sensor error left the outputs unchanged.
    pub fn step(&mut self) -> Option<LightTier> {
        let tier = match self.mode.load() {
            LightMode::Manual { on_hour, off_hour } => {
                manual_tier(self.clock.hour(), on_hour, off_hour)
            }
            LightMode::Automatic if self.clock.now().is_night() => LightTier::Off,
            LightMode::Automatic => {
                self.bus.sensor_events.set(LIGHT_READY);
                let level = self.channel.receive();
                match LightTier::from_level(level) {
                    Some(tier) => tier,
                    None => {
                        warn!("Light: sensor error (level {}), outputs unchanged", level);
                        return None;
                    }
                }
            }
        };

        self.apply(tier);
        Some(tier)
    }

    fn apply(&mut self, tier: LightTier) {
        if self.current != Some(tier) {
            info!("Light: {:?} -> {:?}", self.current, tier);
            self.sink.set_lights(tier);
            self.current = Some(tier);
        }
    }

    pub fn run(mut self) {
        info!("Light controller started ({}ms cycle)", self.period.as_millis());
        loop {
            self.step();
            std::thread::sleep(self.period);
        }
    }
}
