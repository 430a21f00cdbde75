//! Trait seams for the four external collaborators, so the pipeline can be
//! exercised with in-memory fakes.

use async_trait::async_trait;

use almoxbot_common::{AlmoxError, Catalog, ExtractedItem, LogRow};

/// Reads the reference table. Re-read on every invocation, never cached.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self) -> Result<Catalog, AlmoxError>;
}

/// Derives structured request items from free text, constrained to the
/// known item names.
#[async_trait]
pub trait ItemExtractor: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        known_names: &[String],
    ) -> Result<Vec<ExtractedItem>, AlmoxError>;
}

/// Appends rows to the append-only log in one batch call.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append(&self, rows: Vec<LogRow>) -> Result<(), AlmoxError>;
}

/// Sends a text reply to a chat. Callers treat failures as best-effort.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;
}
