use async_trait::async_trait;

use telegram_client::TelegramClient;

use crate::ports::ChatNotifier;

/// Chat replies via the Telegram Bot API.
pub struct TelegramNotifier {
    telegram: TelegramClient,
}

impl TelegramNotifier {
    pub fn new(telegram: TelegramClient) -> Self {
        Self { telegram }
    }
}

#[async_trait]
impl ChatNotifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.telegram.send_message(chat_id, text).await?;
        Ok(())
    }
}
