use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use almoxbot_common::{AlmoxError, Catalog};
use sheets_client::SheetsClient;

use crate::ports::CatalogSource;

/// Columns A–E of the reference worksheet: name, material code, account,
/// account number, storage location.
const PRODUCTS_RANGE: &str = "Produtos!A:E";

/// Reference-table loader backed by the Produtos worksheet.
pub struct SheetCatalog {
    sheets: Arc<SheetsClient>,
    spreadsheet_id: String,
}

impl SheetCatalog {
    pub fn new(sheets: Arc<SheetsClient>, spreadsheet_id: String) -> Self {
        Self {
            sheets,
            spreadsheet_id,
        }
    }
}

#[async_trait]
impl CatalogSource for SheetCatalog {
    async fn load(&self) -> Result<Catalog, AlmoxError> {
        let mut rows = self
            .sheets
            .get_values(&self.spreadsheet_id, PRODUCTS_RANGE)
            .await
            .map_err(|e| AlmoxError::Catalog(e.to_string()))?;

        // First row is the header.
        if !rows.is_empty() {
            rows.remove(0);
        }

        let catalog = Catalog::from_rows(rows);
        debug!(products = catalog.len(), "Loaded product catalog");
        Ok(catalog)
    }
}
