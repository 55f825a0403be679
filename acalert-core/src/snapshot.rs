//! Aircraft-list documents in the dump1090/readsb `aircraft.json` shape.
//!
//! `{ "now": 1700000000.0, "aircraft": [ { "hex": "a240dc", "flight": "N712JM  ", ... } ] }`
//!
//! Only `aircraft` is required. Unknown fields are ignored, and records with
//! missing or non-string `hex`/`flight` keep an empty value (which never
//! matches a target).

use serde::Serialize;
use serde_json::Value;

use crate::types::FetchError;

/// One entry of the `aircraft` list, as it appeared in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AircraftRecord {
    pub hex: String,
    pub flight: String,
    pub squawk: Option<String>,
    pub alt_baro: Option<i32>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl AircraftRecord {
    pub fn new(hex: &str, flight: &str) -> Self {
        AircraftRecord {
            hex: hex.to_string(),
            flight: flight.to_string(),
            ..Default::default()
        }
    }

    /// Transponder code as compared by the matcher.
    pub fn normalized_hex(&self) -> String {
        self.hex.trim().to_lowercase()
    }

    /// Callsign as compared by the matcher.
    pub fn normalized_flight(&self) -> String {
        self.flight.trim().to_uppercase()
    }

    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let string = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        Some(AircraftRecord {
            hex: string("hex").unwrap_or_default(),
            flight: string("flight").unwrap_or_default(),
            squawk: string("squawk"),
            // "ground" is a legal alt_baro value; only numbers are kept
            alt_baro: obj
                .get("alt_baro")
                .and_then(Value::as_f64)
                .map(|a| a.round() as i32),
            lat: obj.get("lat").and_then(Value::as_f64),
            lon: obj.get("lon").and_then(Value::as_f64),
        })
    }
}

/// The complete aircraft list from one poll cycle, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AircraftSnapshot {
    pub now: Option<f64>,
    pub aircraft: Vec<AircraftRecord>,
}

impl AircraftSnapshot {
    pub fn new(aircraft: Vec<AircraftRecord>) -> Self {
        AircraftSnapshot { now: None, aircraft }
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }
}

/// Parse raw document bytes into a snapshot.
///
/// Fails with `Parse` on malformed JSON and `Schema` when the top level is
/// not an object or has no `aircraft` list.
pub fn parse_snapshot(bytes: &[u8]) -> Result<AircraftSnapshot, FetchError> {
    let doc: Value =
        serde_json::from_slice(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    let obj = doc
        .as_object()
        .ok_or_else(|| FetchError::Schema("top level is not an object".into()))?;

    let list = match obj.get("aircraft") {
        Some(Value::Array(list)) => list,
        Some(_) => return Err(FetchError::Schema("'aircraft' is not a list".into())),
        None => return Err(FetchError::Schema("missing 'aircraft' list".into())),
    };

    Ok(AircraftSnapshot {
        now: obj.get("now").and_then(Value::as_f64),
        aircraft: list.iter().filter_map(AircraftRecord::from_value).collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
