//! acalert-core: Aircraft-list parsing and target matching for ac-alert.
//!
//! No async, no network. Just the document model, the matcher, and the
//! config file. This crate is the shared core used by the `ac-alert` binary.

pub mod config;
pub mod matcher;
pub mod snapshot;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use matcher::{find_match, Alert, AlertTarget};
pub use snapshot::{parse_snapshot, AircraftRecord, AircraftSnapshot};
pub use types::*;
