use std::str::FromStr;

use anyhow::{Error, bail};

/// Tag of a single entry in the `sensordatavalues` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Temperature,
    Humidity,
    /// SDS011 PM10 channel.
    SdsP1,
    /// SDS011 PM2.5 channel.
    SdsP2,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Temperature => "temperature",
            ValueType::Humidity => "humidity",
            ValueType::SdsP1 => "SDS_P1",
            ValueType::SdsP2 => "SDS_P2",
        }
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(ValueType::Temperature),
            "humidity" => Ok(ValueType::Humidity),
            "SDS_P1" => Ok(ValueType::SdsP1),
            "SDS_P2" => Ok(ValueType::SdsP2),
            _ => bail!("unknown value type: {}", s),
        }
    }
}
