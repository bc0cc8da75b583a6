use thiserror::Error;

/// Errors from the spreadsheet service and the reconciliation layer.
///
/// None of these are fatal to the session: callers surface the message and
/// return control to the interactive loop, with the in-memory store staying
/// authoritative.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("No credentials configured")]
    CredentialsMissing,

    #[error("No spreadsheet connected")]
    NotConnected,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Could not obtain an access token: {0}")]
    Token(String),

    #[error("Spreadsheet '{0}' not found or not shared with the service account")]
    SpreadsheetNotFound(String),

    #[error("No valid header row found in the sheet")]
    HeadersNotFound,

    #[error("Required column '{0}' not found in the header row")]
    ColumnNotFound(&'static str),

    #[error("Sheets API request failed with status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse Sheets API response: {0}")]
    Parse(String),
}
