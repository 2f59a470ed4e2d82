use serde::Serialize;

/// Discrete air-quality scale, 0 (unknown) through 5 (worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "u8")]
pub enum AirQuality {
    #[default]
    Unknown,
    Excellent,
    Good,
    Fair,
    Inferior,
    Poor,
}

// Upper bounds (inclusive, µg/m³) that both PM2.5 and PM10 must satisfy.
const THRESHOLDS: [(u16, AirQuality); 4] = [
    (25, AirQuality::Excellent),
    (50, AirQuality::Good),
    (75, AirQuality::Fair),
    (100, AirQuality::Inferior),
];

impl AirQuality {
    /// Buckets a pair of particulate readings. The first threshold met by
    /// both values wins, anything above the last one is `Poor`.
    pub fn classify(pm2_5: u16, pm10: u16) -> Self {
        THRESHOLDS
            .iter()
            .find(|(limit, _)| pm2_5 <= *limit && pm10 <= *limit)
            .map(|(_, quality)| *quality)
            .unwrap_or(AirQuality::Poor)
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            AirQuality::Unknown => 0,
            AirQuality::Excellent => 1,
            AirQuality::Good => 2,
            AirQuality::Fair => 3,
            AirQuality::Inferior => 4,
            AirQuality::Poor => 5,
        }
    }
}

impl From<AirQuality> for u8 {
    fn from(value: AirQuality) -> Self {
        value.as_u8()
    }
}
