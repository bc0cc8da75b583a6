use async_trait::async_trait;
use contracts::domain::a002_sheet_connection::ServiceAccountKey;
use serde_json::json;
use std::collections::HashMap;

use super::auth::TokenProvider;
use super::SheetsError;

/// Widest range the tool ever addresses; an unqualified range targets the
/// spreadsheet's first visible sheet.
const FULL_RANGE: &str = "A1:ZZ";

/// Operations the tool performs against a worksheet.
///
/// The reconciler and importer depend on this trait rather than on the
/// HTTP client so they can run against an in-memory fake in tests.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Every cell of the sheet as a row-major grid of strings
    async fn get_all_values(&self) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Primary write: replace the values of an A1 range
    async fn update_range(
        &self,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetsError>;

    /// Fallback write: set a single cell through the batch endpoint
    async fn update_cell(&self, cell: &str, value: &str) -> Result<(), SheetsError>;

    /// Append a row after the sheet's data region
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError>;

    /// Clear every cell of the sheet
    async fn clear(&self) -> Result<(), SheetsError>;

    /// The sheet as header-keyed records, taking row 1 as the header row.
    /// Empty headers are skipped; for duplicate headers the first column
    /// wins and a warning is logged.
    async fn get_all_records(&self) -> Result<Vec<HashMap<String, String>>, SheetsError> {
        let mut rows = self.get_all_values().await?.into_iter();
        let headers = rows.next().unwrap_or_default();

        let mut records = Vec::new();
        for row in rows {
            let mut record: HashMap<String, String> = HashMap::new();
            for (i, header) in headers.iter().enumerate() {
                let header = header.trim();
                if header.is_empty() {
                    continue;
                }
                let value = row.get(i).cloned().unwrap_or_default();
                if record.contains_key(header) {
                    tracing::warn!("Duplicate header '{}', keeping the first column", header);
                    continue;
                }
                record.insert(header.to_string(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// HTTP client for the Google Sheets v4 API
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    auth: TokenProvider,
    spreadsheet_id: String,
}

impl GoogleSheetsClient {
    pub fn new(key: ServiceAccountKey, spreadsheet_id: String) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            auth: TokenProvider::new(key, http.clone()),
            http,
            spreadsheet_id,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn service_account(&self) -> &str {
        self.auth.client_email()
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}{}",
            self.spreadsheet_id,
            urlencoding::encode(range),
            suffix
        )
    }

    /// Map an error response, distinguishing "not found / not shared"
    /// so the caller can surface a descriptive message.
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Sheets API request failed with status {}: {}", status, body);
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SheetsError::SpreadsheetNotFound(self.spreadsheet_id.clone()));
        }
        Err(SheetsError::Api { status, body })
    }
}

#[derive(Debug, serde::Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Cells arrive as JSON strings under FORMATTED_VALUE rendering, but the
/// grid is normalized defensively anyway.
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn get_all_values(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(self.values_url(FULL_RANGE, ""))
            .bearer_auth(&token)
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let body = response.text().await?;
        let range: ValueRange = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(500).collect();
            tracing::error!("Failed to parse values response: {}. Body: {}", e, preview);
            SheetsError::Parse(format!("{e}"))
        })?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn update_range(
        &self,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetsError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .put(self.values_url(range, "?valueInputOption=RAW"))
            .bearer_auth(&token)
            .json(&json!({ "range": range, "values": values }))
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }

    async fn update_cell(&self, cell: &str, value: &str) -> Result<(), SheetsError> {
        let token = self.auth.access_token().await?;
        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values:batchUpdate",
            self.spreadsheet_id
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(&token)
            .json(&json!({
                "valueInputOption": "RAW",
                "data": [{ "range": cell, "values": [[value]] }],
            }))
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }

    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(self.values_url("A1", ":append?valueInputOption=USER_ENTERED"))
            .bearer_auth(&token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SheetsError> {
        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(self.values_url(FULL_RANGE, ":clear"))
            .bearer_auth(&token)
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }
}
