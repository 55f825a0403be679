//! Target matching: find the monitored aircraft in a snapshot.
//!
//! A target names a transponder hex, a callsign, or both. A record matches
//! when either configured field equals the record's normalized value. The
//! scan stops at the first match, so one snapshot raises at most one alert.

use serde::Serialize;

use crate::snapshot::{AircraftRecord, AircraftSnapshot};
use crate::types::{AlertError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const ALERT_SUBJECT: &str = "Aircraft Alert";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The operator-configured aircraft to watch for. Stored normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTarget {
    hex: Option<String>,
    flight: Option<String>,
}

impl AlertTarget {
    /// Build a target. Blank values count as unset; at least one must remain.
    pub fn new(hex: Option<&str>, flight: Option<&str>) -> Result<Self> {
        let hex = hex
            .map(|h| h.trim().to_lowercase())
            .filter(|h| !h.is_empty());
        let flight = flight
            .map(|f| f.trim().to_uppercase())
            .filter(|f| !f.is_empty());

        if hex.is_none() && flight.is_none() {
            return Err(AlertError::Config(
                "no target set: configure a hex or a flight".into(),
            ));
        }
        Ok(AlertTarget { hex, flight })
    }

    pub fn hex(&self) -> Option<&str> {
        self.hex.as_deref()
    }

    pub fn flight(&self) -> Option<&str> {
        self.flight.as_deref()
    }

    /// Name used in alert messages. Hex wins when both are set.
    pub fn label(&self) -> &str {
        self.hex
            .as_deref()
            .or(self.flight.as_deref())
            .unwrap_or_default()
    }

    /// Whether a single record is the target.
    pub fn matches(&self, record: &AircraftRecord) -> bool {
        let hex_hit = self
            .hex
            .as_deref()
            .is_some_and(|h| record.normalized_hex() == h);
        let flight_hit = self
            .flight
            .as_deref()
            .is_some_and(|f| record.normalized_flight() == f);
        hex_hit || flight_hit
    }
}

/// First record in iteration order that matches the target, if any.
pub fn find_match<'a>(
    snapshot: &'a AircraftSnapshot,
    target: &AlertTarget,
) -> Option<&'a AircraftRecord> {
    snapshot.aircraft.iter().find(|ac| target.matches(ac))
}

/// An alert ready for the notifier set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub subject: String,
    pub message: String,
    pub record: AircraftRecord,
}

impl Alert {
    pub fn new(target: &AlertTarget, record: &AircraftRecord) -> Self {
        Alert {
            subject: ALERT_SUBJECT.to_string(),
            message: format!("Aircraft {} detected!", target.label()),
            record: record.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
