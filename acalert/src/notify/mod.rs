//! Alert delivery channels.
//!
//! Each channel implements `Notifier`. The `NotifierSet` holds the enabled
//! channels in a fixed order (console, email, sound, telegram) and calls
//! every one of them for each alert. A failing channel is logged and
//! never stops the others.

use async_trait::async_trait;
use tracing::{error, info, warn};

use acalert_core::config::Config;
use acalert_core::matcher::Alert;
use acalert_core::types::NotifyError;

pub mod console;
pub mod email;
pub mod sound;
pub mod telegram;

pub use console::ConsoleNotifier;
pub use email::EmailNotifier;
pub use sound::SoundNotifier;
pub use telegram::TelegramNotifier;

/// What a channel did with an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Nothing to deliver with, e.g. no sound file on disk. Reported as a warning.
    Skipped(String),
}

/// A single alert delivery channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, alert: &Alert) -> Result<Delivery, NotifyError>;
}

/// Per-alert tally across all channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The enabled channels, in invocation order.
pub struct NotifierSet {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierSet {
    #[cfg(test)]
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        NotifierSet { notifiers }
    }

    /// Build the channels the config enables. Disabled channels are never constructed.
    pub fn from_config(config: &Config) -> Self {
        let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

        if config.console.alerts && config.console.output {
            notifiers.push(Box::new(ConsoleNotifier::new()));
        }
        if config.email.enabled {
            notifiers.push(Box::new(EmailNotifier::new(config.email.clone())));
        }
        if config.sound.enabled {
            notifiers.push(Box::new(SoundNotifier::new(
                config.sound.mp3.as_deref(),
                config.sound.wav.as_deref(),
            )));
        }
        if config.telegram.enabled {
            if let (Some(token), Some(chat_id)) =
                (&config.telegram.bot_token, &config.telegram.chat_id)
            {
                notifiers.push(Box::new(TelegramNotifier::new(
                    &config.telegram.api_base,
                    token,
                    chat_id,
                )));
            }
        }

        NotifierSet { notifiers }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Deliver `alert` through every channel, one after another.
    pub async fn dispatch(&self, alert: &Alert) -> DispatchReport {
        let mut report = DispatchReport::default();

        for notifier in &self.notifiers {
            match notifier.notify(alert).await {
                Ok(Delivery::Sent) => {
                    report.sent += 1;
                    info!(channel = notifier.name(), "alert sent successfully");
                }
                Ok(Delivery::Skipped(reason)) => {
                    report.skipped += 1;
                    warn!(channel = notifier.name(), "alert skipped: {reason}");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(channel = notifier.name(), "{e}");
                }
            }
        }

        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use acalert_core::matcher::AlertTarget;
    use acalert_core::snapshot::AircraftRecord;

    use crate::test_support::{Deliveries, RecordingNotifier};

    fn alert() -> Alert {
        let target = AlertTarget::new(None, Some("N712JM")).unwrap();
        Alert::new(&target, &AircraftRecord::new("abc123", "N712JM"))
    }

    #[test]
    fn test_from_config_default_channels() {
        let set = NotifierSet::from_config(&Config::default());
        assert_eq!(set.names(), vec!["console", "sound"]);
    }

    #[test]
    fn test_from_config_all_channels_in_order() {
        let mut config = Config::default();
        config.email.enabled = true;
        config.email.server = Some("smtp.example.com".into());
        config.email.sender = Some("a@example.com".into());
        config.email.recipient = Some("b@example.com".into());
        config.telegram.enabled = true;
        config.telegram.bot_token = Some("123abc".into());
        config.telegram.chat_id = Some("42".into());

        let set = NotifierSet::from_config(&config);
        assert_eq!(set.names(), vec!["console", "email", "sound", "telegram"]);
    }

    #[test]
    fn test_console_needs_master_switch() {
        let mut config = Config::default();
        config.console.output = false;
        assert!(!NotifierSet::from_config(&config).names().contains(&"console"));

        let mut config = Config::default();
        config.console.alerts = false;
        assert!(!NotifierSet::from_config(&config).names().contains(&"console"));
    }

    #[test]
    fn test_all_disabled() {
        let mut config = Config::default();
        config.console.alerts = false;
        config.sound.enabled = false;
        let set = NotifierSet::from_config(&config);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_continues_after_failure() {
        let log = Deliveries::default();
        let set = NotifierSet::new(vec![
            Box::new(RecordingNotifier::new("console", &log)),
            Box::new(RecordingNotifier::with_outcome(
                "email",
                &log,
                Err(NotifyError::Email("auth rejected".into())),
            )),
            Box::new(RecordingNotifier::with_outcome(
                "sound",
                &log,
                Ok(Delivery::Skipped("no sound file found".into())),
            )),
            Box::new(RecordingNotifier::new("telegram", &log)),
        ]);

        let report = set.dispatch(&alert()).await;
        assert_eq!(
            report,
            DispatchReport {
                sent: 2,
                skipped: 1,
                failed: 1
            }
        );

        let calls = log.lock().unwrap();
        let order: Vec<&str> = calls.iter().map(|(name, _)| *name).collect();
        assert_eq!(order, vec!["console", "email", "sound", "telegram"]);
        assert!(calls.iter().all(|(_, msg)| msg == "Aircraft N712JM detected!"));
    }
}
