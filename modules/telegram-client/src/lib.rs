pub mod error;

pub use error::{Result, TelegramError};

use std::time::Duration;

use tracing::debug;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: TELEGRAM_API_URL.to_string(),
            bot_token: bot_token.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Send a plain-text message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let endpoint = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);

        let body = serde_json::json!({ "chat_id": chat_id, "text": text });

        debug!(chat_id, "Telegram sendMessage request");

        let resp = self.client.post(&endpoint).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
