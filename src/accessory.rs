//! Pull interface offered to the hosting smart-home framework.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    luftdaten::AirQuality,
    state::{AirQualityReading, SharedSensorState, TemperatureHumidity, lock},
};

pub const MANUFACTURER: &str = "Luftdaten";
pub const MODEL: &str = "NodeMCU";
pub const DEFAULT_NAME: &str = "Luftdaten";

/// Capabilities exposed by the accessory, with their current characteristic values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum Service {
    AccessoryInformation {
        manufacturer: String,
        model: String,
        name: String,
        serial_number: String,
    },
    TemperatureSensor {
        current_temperature: f64,
    },
    HumiditySensor {
        current_relative_humidity: u8,
    },
    AirQualitySensor {
        air_quality: AirQuality,
        pm2_5_density: u16,
        pm10_density: u16,
    },
}

#[derive(Debug, Clone)]
pub struct LuftdatenAccessory {
    name: String,
    host: String,
    state: SharedSensorState,
}

impl LuftdatenAccessory {
    pub fn new(name: impl Into<String>, host: impl Into<String>, state: SharedSensorState) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            state,
        }
    }

    pub fn identify(&self) {
        info!("{}: identify requested", self.name);
    }

    /// Serial number shown to the host: the firmware version once one has
    /// been reported, the sensor's host address before that.
    pub fn serial_number(&self) -> String {
        let state = lock(&self.state);
        let firmware = &state.measurement().firmware_version;

        if firmware.is_empty() {
            self.host.clone()
        } else {
            firmware.clone()
        }
    }

    pub fn get_current_temperature(&self) -> TemperatureHumidity {
        let reading = lock(&self.state).read_temperature_and_humidity();
        debug!(
            "get temperature/humidity {}/{}",
            reading.temperature_celsius, reading.humidity_percent
        );
        reading
    }

    pub fn get_air_quality(&self) -> AirQualityReading {
        let reading = lock(&self.state).read_air_quality();
        debug!(
            "get air quality {} (pm2.5 {}, pm10 {})",
            reading.air_quality.as_u8(),
            reading.pm2_5,
            reading.pm10
        );
        reading
    }

    pub fn services(&self) -> Vec<Service> {
        let climate = self.get_current_temperature();
        let air = self.get_air_quality();

        vec![
            Service::AccessoryInformation {
                manufacturer: MANUFACTURER.to_string(),
                model: MODEL.to_string(),
                name: self.name.clone(),
                serial_number: self.serial_number(),
            },
            Service::TemperatureSensor {
                current_temperature: climate.temperature_celsius,
            },
            Service::HumiditySensor {
                current_relative_humidity: climate.humidity_percent,
            },
            Service::AirQualitySensor {
                air_quality: air.air_quality,
                pm2_5_density: air.pm2_5,
                pm10_density: air.pm10,
            },
        ]
    }
}
