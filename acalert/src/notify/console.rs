//! Colored console alert line.

use async_trait::async_trait;
use colored::Colorize;

use acalert_core::matcher::Alert;
use acalert_core::types::NotifyError;

use super::{Delivery, Notifier};

/// Prints `CONSOLE ALERT: <message>` to stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        ConsoleNotifier
    }

    fn format_line(alert: &Alert) -> String {
        format!("{} {}", "CONSOLE ALERT:".cyan().bold(), alert.message)
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn notify(&self, alert: &Alert) -> Result<Delivery, NotifyError> {
        println!("{}", Self::format_line(alert));
        Ok(Delivery::Sent)
    }
}
