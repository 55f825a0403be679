//! Telegram bot messages via the Bot API `sendMessage` method.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use acalert_core::matcher::Alert;
use acalert_core::types::NotifyError;

use super::{Delivery, Notifier};

pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(api_base: &str, token: &str, chat_id: &str) -> Self {
        TelegramNotifier {
            client: Client::new(),
            endpoint: format!("{}/bot{token}/sendMessage", api_base.trim_end_matches('/')),
            chat_id: chat_id.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, alert: &Alert) -> Result<Delivery, NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("chat_id", self.chat_id.as_str()), ("text", alert.message.as_str())])
            .send()
            .await
            // The URL carries the bot token; keep it out of logs
            .map_err(|e| NotifyError::Telegram(e.without_url().to_string()))?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(Delivery::Sent)
        } else {
            Err(NotifyError::Telegram(format!(
                "status code {}",
                status.as_u16()
            )))
        }
    }
}
