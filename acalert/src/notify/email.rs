//! SMTP email alerts over STARTTLS.
//!
//! A fresh transport is built for every send and dropped afterwards, so each
//! alert opens, authenticates, sends, and closes its own session.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use acalert_core::config::EmailConfig;
use acalert_core::matcher::Alert;
use acalert_core::types::NotifyError;

use super::{Delivery, Notifier};

pub struct EmailNotifier {
    settings: EmailConfig,
}

impl EmailNotifier {
    pub fn new(settings: EmailConfig) -> Self {
        EmailNotifier { settings }
    }

    fn build_message(&self, alert: &Alert) -> Result<Message, NotifyError> {
        let from = parse_mailbox("sender", self.settings.sender.as_deref())?;
        let to = parse_mailbox("recipient", self.settings.recipient.as_deref())?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(alert.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.message.clone())
            .map_err(|e| NotifyError::Email(e.to_string()))
    }
}

fn parse_mailbox(field: &str, value: Option<&str>) -> Result<Mailbox, NotifyError> {
    let value = value.ok_or_else(|| NotifyError::Email(format!("no {field} address configured")))?;
    value
        .parse()
        .map_err(|e| NotifyError::Email(format!("invalid {field} address '{value}': {e}")))
}

/// Open a STARTTLS session, log in, send, and close.
fn send_blocking(settings: &EmailConfig, message: &Message) -> Result<(), NotifyError> {
    let server = settings
        .server
        .as_deref()
        .ok_or_else(|| NotifyError::Email("no SMTP server configured".into()))?;

    let (Some(user), Some(pass)) = (&settings.username, &settings.password) else {
        return Err(NotifyError::Email("no SMTP credentials configured".into()));
    };

    let transport = SmtpTransport::starttls_relay(server)
        .map_err(|e| NotifyError::Email(e.to_string()))?
        .port(settings.port)
        .credentials(Credentials::new(user.clone(), pass.clone()))
        .build();
    transport
        .send(message)
        .map_err(|e| NotifyError::Email(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, alert: &Alert) -> Result<Delivery, NotifyError> {
        let message = self.build_message(alert)?;
        let settings = self.settings.clone();

        tokio::task::spawn_blocking(move || send_blocking(&settings, &message))
            .await
            .map_err(|e| NotifyError::Email(e.to_string()))??;

        Ok(Delivery::Sent)
    }
}
