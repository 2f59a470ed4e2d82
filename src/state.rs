//! Cached sensor state shared between the poller and the accessor reads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::luftdaten::{AirQuality, DecodeError, Measurement, decode_feed_payload};

/// Ticks a sensor may go without a successful decode before it is reported stale.
pub const STALENESS_BUDGET: i32 = 10;

pub const STALE_TEMPERATURE_CELSIUS: f64 = 100.0;
pub const STALE_HUMIDITY_PERCENT: u8 = 100;
pub const STALE_PM_DENSITY: u16 = 1000;

pub type SharedSensorState = Arc<Mutex<SensorState>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureHumidity {
    pub temperature_celsius: f64,
    pub humidity_percent: u8,
}

/// Values reported by an air-quality query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AirQualityReading {
    pub air_quality: AirQuality,
    pub pm2_5: u16,
    pub pm10: u16,
    pub temperature_celsius: f64,
    pub humidity_percent: u8,
}

#[derive(Debug)]
pub struct SensorState {
    measurement: Measurement,
    staleness: i32,
}

impl Default for SensorState {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorState {
    pub fn new() -> Self {
        Self {
            measurement: Measurement::default(),
            staleness: STALENESS_BUDGET,
        }
    }

    pub fn shared() -> SharedSensorState {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    pub fn staleness(&self) -> i32 {
        self.staleness
    }

    pub fn is_stale(&self) -> bool {
        self.staleness <= 0
    }

    /// Charges one tick against the staleness budget. Called at the start of
    /// every poll, before its outcome is known.
    pub fn begin_tick(&mut self) {
        self.staleness = self.staleness.saturating_sub(1);
    }

    /// Decodes a feed body and folds it into the snapshot. On success the
    /// staleness budget is restored; on failure nothing changes.
    pub fn ingest_body(&mut self, body: &str) -> Result<(), DecodeError> {
        let payload = decode_feed_payload(body)?;

        self.measurement.apply(&payload, Utc::now());
        self.staleness = STALENESS_BUDGET;

        Ok(())
    }

    /// Last decoded temperature and humidity. Never overridden by staleness.
    pub fn read_temperature_and_humidity(&self) -> TemperatureHumidity {
        TemperatureHumidity {
            temperature_celsius: self.measurement.temperature_celsius,
            humidity_percent: self.measurement.humidity_percent,
        }
    }

    /// Current air-quality values. Once the staleness budget is used up the
    /// query reports `Unknown` with sentinel readings instead; the stored
    /// snapshot is left as is.
    pub fn read_air_quality(&self) -> AirQualityReading {
        if self.is_stale() {
            debug!("air quality is stale: staleness {}", self.staleness);
            return AirQualityReading {
                air_quality: AirQuality::Unknown,
                pm2_5: STALE_PM_DENSITY,
                pm10: STALE_PM_DENSITY,
                temperature_celsius: STALE_TEMPERATURE_CELSIUS,
                humidity_percent: STALE_HUMIDITY_PERCENT,
            };
        }

        AirQualityReading {
            air_quality: self.measurement.air_quality,
            pm2_5: self.measurement.pm2_5,
            pm10: self.measurement.pm10,
            temperature_celsius: self.measurement.temperature_celsius,
            humidity_percent: self.measurement.humidity_percent,
        }
    }
}

/// Locks the shared state. Every mutation leaves the snapshot consistent, so
/// a poisoned lock is still safe to read and write.
pub fn lock(state: &SharedSensorState) -> MutexGuard<'_, SensorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
