use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use almoxbot_common::{AlmoxError, ExtractedItem};

use crate::dedup::DedupCache;
use crate::extraction::UNSPECIFIED_SECTOR;
use crate::ledger::{assemble_rows, current_timestamp};
use crate::ports::{CatalogSource, ChatNotifier, ItemExtractor, LogSink};

/// One Telegram webhook delivery. Fields the platform may omit are optional;
/// anything short of `{update_id, message: {chat, text}}` is silently ignored.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: Option<i64>,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    Malformed,
    Duplicate,
}

/// Result of one reply-send attempt. Failures are recorded, never escalated.
#[derive(Debug, PartialEq, Eq)]
pub enum NotifyStatus {
    Sent,
    Failed(String),
}

/// Outcome of one inbound update. Processing and chat notification are two
/// separate stages so both can be asserted on independently; the webhook
/// acknowledges the platform with 200 regardless.
#[derive(Debug)]
pub enum Outcome {
    Ignored(IgnoreReason),
    Processed {
        items: usize,
        reply: String,
        notification: NotifyStatus,
    },
    Failed {
        error: AlmoxError,
        notification: NotifyStatus,
    },
}

/// The per-message pipeline: dedup → catalog → extraction → row assembly →
/// ledger append → chat reply.
pub struct Pipeline {
    catalog: Arc<dyn CatalogSource>,
    extractor: Arc<dyn ItemExtractor>,
    ledger: Arc<dyn LogSink>,
    notifier: Arc<dyn ChatNotifier>,
    dedup: Mutex<DedupCache>,
}

impl Pipeline {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        extractor: Arc<dyn ItemExtractor>,
        ledger: Arc<dyn LogSink>,
        notifier: Arc<dyn ChatNotifier>,
        dedup: DedupCache,
    ) -> Self {
        Self {
            catalog,
            extractor,
            ledger,
            notifier,
            dedup: Mutex::new(dedup),
        }
    }

    pub async fn handle_update(&self, update: &Update) -> Outcome {
        let Some((update_id, chat_id, text)) = request_fields(update) else {
            return Outcome::Ignored(IgnoreReason::Malformed);
        };

        // Record before processing: a crash mid-flight drops the message
        // instead of letting Telegram's retransmission reprocess it.
        {
            let mut seen = self.dedup.lock().await;
            if !seen.check_and_record(update_id) {
                info!(update_id, "Ignoring duplicate update");
                return Outcome::Ignored(IgnoreReason::Duplicate);
            }
            debug!(update_id, seen = seen.len(), "Recorded update id");
        }

        info!(update_id, chat_id, "Processing message");

        match self.process(text).await {
            Ok(items) => {
                let reply = compose_reply(&items);
                let notification = self.notify(chat_id, &reply).await;
                Outcome::Processed {
                    items: items.len(),
                    reply,
                    notification,
                }
            }
            Err(error) => {
                warn!(error = %error, update_id, "Message processing failed");
                let text = format!("❌ Ocorreu um erro no processamento:\n{error}");
                let notification = self.notify(chat_id, &text).await;
                Outcome::Failed {
                    error,
                    notification,
                }
            }
        }
    }

    async fn process(&self, text: &str) -> Result<Vec<ExtractedItem>, AlmoxError> {
        let catalog = self.catalog.load().await?;
        let items = self.extractor.extract(text, catalog.names()).await?;

        let rows = assemble_rows(&items, &catalog, &current_timestamp());
        // The extraction contract forbids an empty list, but guard the append
        // anyway rather than trusting it downstream.
        if !rows.is_empty() {
            self.ledger.append(rows).await?;
        }

        Ok(items)
    }

    async fn notify(&self, chat_id: i64, text: &str) -> NotifyStatus {
        match self.notifier.send(chat_id, text).await {
            Ok(()) => NotifyStatus::Sent,
            Err(e) => {
                warn!(error = %e, chat_id, "Failed to send chat reply");
                NotifyStatus::Failed(e.to_string())
            }
        }
    }
}

fn request_fields(update: &Update) -> Option<(i64, i64, &str)> {
    let update_id = update.update_id?;
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    if text.is_empty() {
        return None;
    }
    Some((update_id, message.chat.id, text))
}

/// Confirmation message: item count, the first item's sector (uniform per
/// message by contract), and one summary line per item.
pub fn compose_reply(items: &[ExtractedItem]) -> String {
    let setor = items
        .first()
        .map(|i| i.setor.as_str())
        .unwrap_or(UNSPECIFIED_SECTOR);

    let lines: Vec<String> = items
        .iter()
        .map(|i| format!("📦 {} (Qtd: {})", i.descricao, i.quantidade))
        .collect();

    format!(
        "✅ Lançados {} itens para o setor \"{}\"!\n\n{}",
        items.len(),
        setor,
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use almoxbot_common::{Catalog, LogRow};

    use super::*;

    fn update(update_id: i64, text: &str) -> Update {
        Update {
            update_id: Some(update_id),
            message: Some(Message {
                chat: Chat { id: 77 },
                text: Some(text.to_string()),
            }),
        }
    }

    fn item(descricao: &str, quantidade: &str, setor: &str) -> ExtractedItem {
        ExtractedItem {
            descricao: descricao.to_string(),
            quantidade: quantidade.to_string(),
            setor: setor.to_string(),
        }
    }

    struct FakeCatalog {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn load(&self) -> Result<Catalog, AlmoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Catalog::from_rows(vec![vec![
                "Luva Nitrílica".to_string(),
                "COD1".to_string(),
                "CC100".to_string(),
                "123".to_string(),
                "Depósito A".to_string(),
            ]]))
        }
    }

    struct FakeExtractor {
        items: Vec<ExtractedItem>,
        no_items: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ItemExtractor for FakeExtractor {
        async fn extract(
            &self,
            _text: &str,
            _known_names: &[String],
        ) -> Result<Vec<ExtractedItem>, AlmoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.no_items {
                return Err(AlmoxError::NoItemsFound);
            }
            Ok(self.items.clone())
        }
    }

    struct FakeLedger {
        batches: Mutex<Vec<Vec<LogRow>>>,
    }

    #[async_trait]
    impl LogSink for FakeLedger {
        async fn append(&self, rows: Vec<LogRow>) -> Result<(), AlmoxError> {
            self.batches.lock().await.push(rows);
            Ok(())
        }
    }

    struct FakeNotifier {
        sent: Mutex<Vec<(i64, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatNotifier for FakeNotifier {
        async fn send(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("chat unreachable");
            }
            self.sent.lock().await.push((chat_id, text.to_string()));
            Ok(())
        }
    }

    struct Harness {
        catalog: Arc<FakeCatalog>,
        extractor: Arc<FakeExtractor>,
        ledger: Arc<FakeLedger>,
        notifier: Arc<FakeNotifier>,
        pipeline: Pipeline,
    }

    fn harness(items: Vec<ExtractedItem>, no_items: bool, notifier_fails: bool) -> Harness {
        let catalog = Arc::new(FakeCatalog {
            calls: AtomicUsize::new(0),
        });
        let extractor = Arc::new(FakeExtractor {
            items,
            no_items,
            calls: AtomicUsize::new(0),
        });
        let ledger = Arc::new(FakeLedger {
            batches: Mutex::new(Vec::new()),
        });
        let notifier = Arc::new(FakeNotifier {
            sent: Mutex::new(Vec::new()),
            fail: notifier_fails,
        });
        let pipeline = Pipeline::new(
            catalog.clone(),
            extractor.clone(),
            ledger.clone(),
            notifier.clone(),
            DedupCache::new(1000),
        );
        Harness {
            catalog,
            extractor,
            ledger,
            notifier,
            pipeline,
        }
    }

    #[tokio::test]
    async fn happy_path_appends_and_confirms() {
        let h = harness(
            vec![item("Luva Nitrílica", "5", "clínica veterinária")],
            false,
            false,
        );

        let outcome = h
            .pipeline
            .handle_update(&update(1, "preciso de 5 luvas para a clínica veterinária"))
            .await;

        let Outcome::Processed {
            items,
            reply,
            notification,
        } = outcome
        else {
            panic!("expected Processed outcome");
        };
        assert_eq!(items, 1);
        assert!(reply.contains("Lançados 1 itens"));
        assert!(reply.contains("setor \"clínica veterinária\""));
        assert!(reply.contains("📦 Luva Nitrílica (Qtd: 5)"));
        assert_eq!(notification, NotifyStatus::Sent);

        let batches = h.ledger.batches.lock().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        let row = batches[0][0].clone().into_cells();
        assert_eq!(&row[1..], [
            "Luva Nitrílica",
            "5",
            "clínica veterinária",
            "Depósito A",
            "CC100",
            "123",
            "COD1"
        ]);

        let sent = h.notifier.sent.lock().await;
        assert_eq!(sent[0].0, 77);
    }

    #[tokio::test]
    async fn duplicate_update_short_circuits() {
        let h = harness(vec![item("Luva Nitrílica", "5", "copa")], false, false);

        h.pipeline.handle_update(&update(9, "5 luvas")).await;
        let second = h.pipeline.handle_update(&update(9, "5 luvas")).await;

        assert!(matches!(
            second,
            Outcome::Ignored(IgnoreReason::Duplicate)
        ));
        assert_eq!(h.catalog.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.ledger.batches.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn malformed_update_is_ignored_without_any_call() {
        let h = harness(vec![], false, false);

        let no_text = Update {
            update_id: Some(3),
            message: Some(Message {
                chat: Chat { id: 77 },
                text: None,
            }),
        };
        let no_message = Update {
            update_id: Some(4),
            message: None,
        };
        let no_id = update_without_id();

        for u in [no_text, no_message, no_id] {
            let outcome = h.pipeline.handle_update(&u).await;
            assert!(matches!(outcome, Outcome::Ignored(IgnoreReason::Malformed)));
        }
        assert_eq!(h.catalog.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    }

    fn update_without_id() -> Update {
        Update {
            update_id: None,
            message: Some(Message {
                chat: Chat { id: 77 },
                text: Some("oi".to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn empty_text_is_ignored() {
        let h = harness(vec![], false, false);
        let outcome = h.pipeline.handle_update(&update(5, "")).await;
        assert!(matches!(outcome, Outcome::Ignored(IgnoreReason::Malformed)));
    }

    #[tokio::test]
    async fn no_items_found_reports_error_and_skips_append() {
        let h = harness(vec![], true, false);

        let outcome = h.pipeline.handle_update(&update(6, "bom dia")).await;

        let Outcome::Failed {
            error,
            notification,
        } = outcome
        else {
            panic!("expected Failed outcome");
        };
        assert!(matches!(error, AlmoxError::NoItemsFound));
        assert_eq!(notification, NotifyStatus::Sent);
        assert!(h.ledger.batches.lock().await.is_empty());

        let sent = h.notifier.sent.lock().await;
        assert_eq!(
            sent[0].1,
            "❌ Ocorreu um erro no processamento:\nNenhum produto da lista foi encontrado na sua mensagem."
        );
    }

    #[tokio::test]
    async fn notifier_failure_is_captured_not_escalated() {
        let h = harness(vec![], true, true);

        let outcome = h.pipeline.handle_update(&update(7, "bom dia")).await;

        let Outcome::Failed { notification, .. } = outcome else {
            panic!("expected Failed outcome");
        };
        assert!(matches!(notification, NotifyStatus::Failed(_)));
    }

    #[tokio::test]
    async fn every_row_shares_the_first_item_sector() {
        let h = harness(
            vec![
                item("Luva Nitrílica", "5", "NPJ"),
                item("Papel Toalha", "2", "NPJ"),
            ],
            false,
            false,
        );

        h.pipeline.handle_update(&update(8, "5 luvas e 2 papéis para o NPJ")).await;

        let batches = h.ledger.batches.lock().await;
        assert!(batches[0].iter().all(|r| r.setor == "NPJ"));
    }

    #[test]
    fn reply_lists_every_item() {
        let reply = compose_reply(&[
            item("Luva Nitrílica", "5", "copa"),
            item("Papel Toalha", "2", "copa"),
        ]);
        assert!(reply.starts_with("✅ Lançados 2 itens para o setor \"copa\"!\n\n"));
        assert!(reply.contains("📦 Luva Nitrílica (Qtd: 5)\n📦 Papel Toalha (Qtd: 2)"));
    }
}
