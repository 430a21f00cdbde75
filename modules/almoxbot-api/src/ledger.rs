use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use almoxbot_common::{AlmoxError, Catalog, ExtractedItem, LogRow};
use sheets_client::SheetsClient;

use crate::ports::LogSink;

const HISTORY_RANGE: &str = "Histórico!A:H";

/// Display timestamp shared by every row of one batch.
pub fn current_timestamp() -> String {
    chrono::Local::now().format("%d/%m/%Y %H:%M").to_string()
}

/// Join extracted items with the catalog into log rows. Unmatched names get
/// empty attributes, not an error.
pub fn assemble_rows(items: &[ExtractedItem], catalog: &Catalog, timestamp: &str) -> Vec<LogRow> {
    items
        .iter()
        .map(|item| {
            let attrs = catalog.get(&item.descricao).cloned().unwrap_or_default();
            LogRow {
                timestamp: timestamp.to_string(),
                descricao: item.descricao.clone(),
                quantidade: item.quantidade.clone(),
                setor: item.setor.clone(),
                deposito: attrs.deposito,
                conta: attrs.conta,
                num_conta: attrs.num_conta,
                material: attrs.material,
            }
        })
        .collect()
}

/// Append-only log backed by the Histórico worksheet.
pub struct SheetLedger {
    sheets: Arc<SheetsClient>,
    spreadsheet_id: String,
}

impl SheetLedger {
    pub fn new(sheets: Arc<SheetsClient>, spreadsheet_id: String) -> Self {
        Self {
            sheets,
            spreadsheet_id,
        }
    }
}

#[async_trait]
impl LogSink for SheetLedger {
    async fn append(&self, rows: Vec<LogRow>) -> Result<(), AlmoxError> {
        let count = rows.len();
        let cells: Vec<Vec<String>> = rows.into_iter().map(LogRow::into_cells).collect();

        self.sheets
            .append_rows(&self.spreadsheet_id, HISTORY_RANGE, &cells)
            .await
            .map_err(|e| AlmoxError::Ledger(e.to_string()))?;

        info!(rows = count, "Appended rows to the history sheet");
        Ok(())
    }
}
