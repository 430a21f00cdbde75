pub mod error;

pub use error::{Result, SheetsError};

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsClient {
    pub fn new(access_token: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: SHEETS_API_URL.to_string(),
            access_token: access_token.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Percent-encode the range as a path segment; worksheet names may carry
    /// spaces, `!` and non-ASCII characters (e.g. `Histórico!A:H`).
    fn values_url(&self, spreadsheet_id: &str, last_segment: &str) -> reqwest::Url {
        let mut url = reqwest::Url::parse(&self.base_url).expect("base URL must be valid");
        url.path_segments_mut()
            .expect("base URL cannot be opaque")
            .push(spreadsheet_id)
            .push("values")
            .push(last_segment);
        url
    }

    /// Read all rows of a range. Returns an empty vector for an empty range.
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(spreadsheet_id, range);

        debug!(range, "Sheets values.get request");

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value_range: ValueRange = resp.json().await?;
        Ok(value_range.values)
    }

    /// Append rows to a range in a single batch call, preserving input order.
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<()> {
        let mut url = self.values_url(spreadsheet_id, &format!("{range}:append"));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = serde_json::json!({ "values": rows });

        debug!(range, rows = rows.len(), "Sheets values.append request");

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
