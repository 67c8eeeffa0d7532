//! Sensor/pump association table.
//!
//! Fixed capacity of five records, populated once by the dispatcher and
//! never shrunk.  Every operation holds the table lock for its full
//! duration; [`SensorRegistry::update_all`] keeps it across the whole
//! read-and-evaluate pass so a concurrent reader never sees a half-updated
//! table.

use std::sync::{Mutex, MutexGuard};

use heapless::{String, Vec};
use log::{debug, info};

use crate::error::RegistryError;
use crate::signals::{EventBits, PUMP_COUNT, pump_bit};

/// Number of sensor/pump pairs the controller supports.
pub const SENSOR_CAPACITY: usize = 5;

/// Maximum length of a sensor name.
pub const NAME_LEN: usize = 24;

/// Capacitive sensors read inversely to moisture: ~500 in dry air,
/// ~250 fully submerged.
pub const READING_DRY: u16 = 500;
pub const READING_WET: u16 = 250;

pub const DEFAULT_THRESHOLD: u16 = 450;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorRecord {
    pub name: String<NAME_LEN>,
    pub sensor_address: u8,
    pub pump_address: u8,
    pub threshold: u16,
    pub last_reading: u16,
}

impl SensorRecord {
    /// A reading above the threshold means the soil is too dry.
    pub fn is_breached(&self) -> bool {
        self.last_reading > self.threshold
    }

    pub fn moisture_percent(&self) -> u8 {
        moisture_percent(self.last_reading)
    }
}

/// Map a raw reading onto 0 % (dry) … 100 % (submerged), clamped.
pub fn moisture_percent(reading: u16) -> u8 {
    let clamped = reading.clamp(READING_WET, READING_DRY);
    let span = u32::from(READING_DRY - READING_WET);
    (u32::from(READING_DRY - clamped) * 100 / span) as u8
}

/// Result of one batch pass over every sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// One bit per pump address whose sensor breached its threshold.
    pub pump_mask: EventBits,
    /// Sensors successfully read.
    pub updated: u8,
    /// Sensors whose read failed and were skipped.
    pub failed: u8,
}

pub struct SensorRegistry {
    records: Mutex<Vec<SensorRecord, SENSOR_CAPACITY>>,
    default_threshold: u16,
}

impl SensorRegistry {
    pub fn new(default_threshold: u16) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            default_threshold,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SensorRecord, SENSOR_CAPACITY>> {
        self.records.lock().expect("sensor registry mutex poisoned")
    }

    /// Append a record.  Returns its index, [`RegistryError::Full`], or
    /// [`RegistryError::NoSuchPump`] when the pump address has no relay.
    pub fn register_sensor(
        &self,
        name: &str,
        sensor_address: u8,
        pump_address: u8,
    ) -> Result<usize, RegistryError> {
        if usize::from(pump_address) >= PUMP_COUNT {
            return Err(RegistryError::NoSuchPump(pump_address));
        }

        let mut stored = String::new();
        // Over-long names are truncated at a char boundary.
        for c in name.chars() {
            if stored.push(c).is_err() {
                break;
            }
        }

        let mut records = self.lock();
        let index = records.len();
        records
            .push(SensorRecord {
                name: stored,
                sensor_address,
                pump_address,
                threshold: self.default_threshold,
                last_reading: 0,
            })
            .map_err(|_| RegistryError::Full)?;
        info!(
            "Registry: '{}' at slot {} (sensor {}, pump {})",
            name, index, sensor_address, pump_address
        );
        Ok(index)
    }

    /// Store a new reading for record `index` and return the updated record.
    pub fn snapshot_and_update(
        &self,
        index: usize,
        reading: u16,
    ) -> Result<SensorRecord, RegistryError> {
        let mut records = self.lock();
        let record = records
            .get_mut(index)
            .ok_or(RegistryError::NoSuchSensor(index))?;
        record.last_reading = reading;
        Ok(record.clone())
    }

    pub fn read(&self, index: usize) -> Result<SensorRecord, RegistryError> {
        self.lock()
            .get(index)
            .cloned()
            .ok_or(RegistryError::NoSuchSensor(index))
    }

    pub fn set_threshold(&self, index: usize, threshold: u16) -> Result<(), RegistryError> {
        let mut records = self.lock();
        let record = records
            .get_mut(index)
            .ok_or(RegistryError::NoSuchSensor(index))?;
        info!(
            "Registry: '{}' threshold {} -> {}",
            record.name, record.threshold, threshold
        );
        record.threshold = threshold;
        Ok(())
    }

    /// Consistent copy of the whole table.
    pub fn snapshot(&self) -> Vec<SensorRecord, SENSOR_CAPACITY> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Read every sensor and evaluate its threshold under one lock.
    ///
    /// `read` returns `None` when the sensor failed; that record keeps its
    /// previous reading and the pass continues with the next sensor.
    pub fn update_all<F>(&self, mut read: F) -> BatchOutcome
    where
        F: FnMut(&SensorRecord) -> Option<u16>,
    {
        let mut outcome = BatchOutcome::default();
        let mut records = self.lock();

        for record in records.iter_mut() {
            let Some(reading) = read(record) else {
                outcome.failed += 1;
                continue;
            };
            record.last_reading = reading;
            outcome.updated += 1;

            if record.is_breached() {
                debug!(
                    "Registry: '{}' reading {} above threshold {}",
                    record.name, reading, record.threshold
                );
                outcome.pump_mask |= pump_bit(usize::from(record.pump_address));
            }
        }

        outcome
    }
}
