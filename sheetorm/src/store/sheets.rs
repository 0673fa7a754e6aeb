use super::RangeStore;
use crate::error::{Result, SheetOrmError};
use crate::record::Grid;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Values written with this option are stored as given, never parsed as formulas.
const VALUE_INPUT_OPTION: &str = "RAW";

/// A [`RangeStore`] backed by the Google Sheets v4 REST API.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Grid,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl SheetsClient {
    pub fn new(http: reqwest::Client, access_token: String) -> Self {
        Self::with_base_url(http, access_token, SHEETS_API_BASE)
    }

    /// Point the client at a different API root (e.g. a local emulator).
    pub fn with_base_url(http: reqwest::Client, access_token: String, base_url: &str) -> Self {
        SheetsClient {
            http,
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build `{base}/{spreadsheet_id}/values/{range}{suffix}` with each segment encoded.
    fn values_url(&self, spreadsheet_id: &str, range: &str, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| {
                SheetOrmError::Configuration(format!("Invalid API base URL: {}", self.base_url))
            })?
            .push(spreadsheet_id)
            .push("values")
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }
}

#[async_trait]
impl RangeStore for SheetsClient {
    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Grid> {
        let url = self.values_url(spreadsheet_id, range, "")?;
        log::debug!("GET values {spreadsheet_id}/{range}");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body: ValueRange = check_status(response).await?.json().await?;

        log::debug!("Read {} rows from {range}", body.values.len());
        Ok(body.values)
    }

    async fn append_rows(&self, spreadsheet_id: &str, range: &str, rows: Grid) -> Result<()> {
        let mut url = self.values_url(spreadsheet_id, range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);
        log::debug!("APPEND {} rows to {spreadsheet_id}/{range}", rows.len());

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn write_range(&self, spreadsheet_id: &str, range: &str, rows: Grid) -> Result<()> {
        let mut url = self.values_url(spreadsheet_id, range, "")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);
        log::debug!("PUT {} rows to {spreadsheet_id}/{range}", rows.len());

        let response = self
            .http
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Pass successful responses through; turn anything else into a `Remote` error,
/// using the API's own message when the body carries one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SheetOrmError::Remote {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.to_string(),
    }
}
