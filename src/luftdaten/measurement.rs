use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::luftdaten::{AirQuality, FeedPayload, ValueType};

/// Latest known values of a single sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Measurement {
    pub temperature_celsius: f64,

    pub humidity_percent: u8,

    pub pm10: u16,

    pub pm2_5: u16,

    pub air_quality: AirQuality,

    pub firmware_version: String,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Measurement {
    /// Folds a decoded payload into the snapshot.
    ///
    /// Entries are applied in order, so a repeated value type ends up with
    /// its last value. Value types missing from the payload keep their
    /// previous reading. The air-quality category is recomputed afterwards.
    pub fn apply(&mut self, payload: &FeedPayload, received_at: DateTime<Utc>) {
        if let Some(version) = &payload.software_version
            && *version != self.firmware_version
        {
            info!(
                "software_version {:?} -> {:?}",
                self.firmware_version, version
            );
            self.firmware_version = version.clone();
        }

        for entry in &payload.sensordatavalues {
            let Some(value_type) = entry.value_type() else {
                continue;
            };

            let Some(value) = entry.as_f64() else {
                debug!(
                    "ignoring unreadable {} value: {}",
                    value_type.as_str(),
                    entry.value
                );
                continue;
            };

            match value_type {
                ValueType::Temperature => self.temperature_celsius = value,
                ValueType::Humidity => self.humidity_percent = value.round() as u8,
                ValueType::SdsP1 => self.pm10 = value.round() as u16,
                ValueType::SdsP2 => self.pm2_5 = value.round() as u16,
            }
        }

        self.air_quality = AirQuality::classify(self.pm2_5, self.pm10);
        self.updated_at = Some(received_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::luftdaten::decode_feed_payload;

    fn apply(measurement: &mut Measurement, body: &str) {
        let payload = decode_feed_payload(body).unwrap();
        measurement.apply(&payload, Utc::now());
    }

    #[test]
    fn full_payload() {
        let mut m = Measurement::default();
        apply(
            &mut m,
            r#"{"software_version":"1.2","sensordatavalues":[{"value_type":"temperature","value":"21.4"},{"value_type":"humidity","value":"55.6"},{"value_type":"SDS_P1","value":"12.3"},{"value_type":"SDS_P2","value":"8.9"}]}"#,
        );

        assert_eq!(m.temperature_celsius, 21.4);
        assert_eq!(m.humidity_percent, 56);
        assert_eq!(m.pm10, 12);
        assert_eq!(m.pm2_5, 9);
        assert_eq!(m.air_quality, AirQuality::Excellent);
        assert_eq!(m.firmware_version, "1.2");
        assert!(m.updated_at.is_some());
    }

    #[test]
    fn partial_payload_keeps_other_fields() {
        let mut m = Measurement {
            humidity_percent: 40,
            pm10: 60,
            pm2_5: 30,
            firmware_version: "1.2".to_string(),
            ..Default::default()
        };
        apply(
            &mut m,
            r#"{"sensordatavalues":[{"value_type":"temperature","value":"-4.25"}]}"#,
        );

        assert_eq!(m.temperature_celsius, -4.25);
        assert_eq!(m.humidity_percent, 40);
        assert_eq!(m.pm10, 60);
        assert_eq!(m.pm2_5, 30);
        assert_eq!(m.firmware_version, "1.2");
        assert_eq!(m.air_quality, AirQuality::Fair);
    }

    #[test]
    fn last_duplicate_wins() {
        let mut m = Measurement::default();
        apply(
            &mut m,
            r#"{"sensordatavalues":[{"value_type":"SDS_P2","value":"80"},{"value_type":"SDS_P1","value":"10"},{"value_type":"SDS_P2","value":"20.4"}]}"#,
        );

        assert_eq!(m.pm2_5, 20);
        assert_eq!(m.air_quality, AirQuality::Excellent);
    }

    #[test]
    fn unknown_and_unreadable_entries_are_skipped() {
        let mut m = Measurement {
            humidity_percent: 33,
            ..Default::default()
        };
        apply(
            &mut m,
            r#"{"sensordatavalues":[{"value_type":"BME280_pressure","value":"99000"},{"value_type":"humidity","value":"--"},{"value_type":"SDS_P1","value":"130"}]}"#,
        );

        assert_eq!(m.humidity_percent, 33);
        assert_eq!(m.pm10, 130);
        assert_eq!(m.air_quality, AirQuality::Poor);
    }

    #[test]
    fn entries_without_a_usable_tag_are_skipped() {
        let mut m = Measurement::default();
        apply(
            &mut m,
            r#"{"sensordatavalues":[{"value_type":"SDS_P1","value":"30"},{"value":"7"},{"value_type":7,"value":"8"},{"value_type":"SDS_P2","value":"40"}]}"#,
        );

        assert_eq!(m.pm10, 30);
        assert_eq!(m.pm2_5, 40);
        assert_eq!(m.air_quality, AirQuality::Good);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        let mut m = Measurement::default();
        apply(
            &mut m,
            r#"{"sensordatavalues":[{"value_type":"humidity","value":"49.5"},{"value_type":"SDS_P1","value":"25.49"},{"value_type":"SDS_P2","value":"25.5"}]}"#,
        );

        assert_eq!(m.humidity_percent, 50);
        assert_eq!(m.pm10, 25);
        assert_eq!(m.pm2_5, 26);
        assert_eq!(m.air_quality, AirQuality::Good);
    }

    #[test]
    fn empty_payload_still_classifies() {
        let mut m = Measurement::default();
        apply(&mut m, "{}");

        assert_eq!(m.air_quality, AirQuality::Excellent);
        assert_eq!(m.firmware_version, "");
    }
}
