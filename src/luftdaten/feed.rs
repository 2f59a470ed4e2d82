//! Payload served at `/data.json` by the sensor firmware.
//!
//! The firmware is known to leave a trailing comma before the closing `]` of
//! `sensordatavalues`. [`decode_feed_payload`] drops such commas in a
//! string-aware pass before handing the text to `serde_json`.

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::luftdaten::ValueType;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed feed payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedPayload {
    #[serde(default)]
    pub software_version: Option<String>,

    #[serde(default)]
    pub sensordatavalues: Vec<SensorDataValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorDataValue {
    /// Expected to be a string tag; anything else is kept so the entry can
    /// be skipped on its own instead of failing the whole payload.
    #[serde(default)]
    pub value_type: Value,

    /// Either a JSON string (`"21.4"`) or a number, depending on firmware.
    #[serde(default)]
    pub value: Value,
}

impl SensorDataValue {
    /// Recognized tag of this entry, or `None` for missing, non-string or
    /// unknown tags.
    pub fn value_type(&self) -> Option<ValueType> {
        self.value_type.as_str()?.parse().ok()
    }

    /// Numeric reading, or `None` when the value is absent or not a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match &self.value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };

        v.is_finite().then_some(v)
    }
}

pub fn decode_feed_payload(body: &str) -> Result<FeedPayload, DecodeError> {
    let repaired = strip_trailing_commas(body);
    Ok(serde_json::from_str(&repaired)?)
}

fn strip_trailing_commas(body: &str) -> Cow<'_, str> {
    let mut repaired: Option<String> = None;
    let mut copied_up_to = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            ',' if closes_array(&body[i + 1..]) => {
                let out = repaired.get_or_insert_with(|| String::with_capacity(body.len()));
                out.push_str(&body[copied_up_to..i]);
                copied_up_to = i + 1;
            }
            _ => {}
        }
    }

    match repaired {
        Some(mut out) => {
            out.push_str(&body[copied_up_to..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(body),
    }
}

fn closes_array(rest: &str) -> bool {
    rest.trim_start_matches([' ', '\t', '\n', '\r'])
        .starts_with(']')
}
