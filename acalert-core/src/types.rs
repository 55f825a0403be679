//! Shared error enums for acalert-core and the watch daemon.

use thiserror::Error;

/// Why a poll cycle could not produce a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("could not read {0}")]
    Io(String),
    #[error("error fetching data from URL: {0}")]
    Network(String),
    #[error("could not decode JSON: {0}")]
    Parse(String),
    #[error("document is not in the expected format: {0}")]
    Schema(String),
}

/// A notifier channel failed to deliver. Always caught by the notifier set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("failed to send email alert: {0}")]
    Email(String),
    #[error("failed to play sound alert: {0}")]
    Sound(String),
    #[error("failed to send Telegram message: {0}")]
    Telegram(String),
}

/// All errors produced by acalert.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AlertError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let e = FetchError::NotFound("aircraft.json".into());
        assert_eq!(e.to_string(), "'aircraft.json' not found");

        let e = FetchError::Schema("missing 'aircraft' list".into());
        assert!(e.to_string().contains("missing 'aircraft' list"));
    }

    #[test]
    fn test_alert_error_from() {
        let e: AlertError = FetchError::Network("connection refused".into()).into();
        assert!(matches!(e, AlertError::Fetch(FetchError::Network(_))));
        assert_eq!(
            e.to_string(),
            "error fetching data from URL: connection refused"
        );

        let e: AlertError = NotifyError::Telegram("status 401".into()).into();
        assert!(matches!(e, AlertError::Notify(_)));
    }
}
