//! Sheets gateway module configuration.

use serde::{Deserialize, Serialize};

pub use crate::domain::model::ValueInputOption;

/// Sheets gateway module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsConfig {
    /// Environment variable holding the base64 service-account key file.
    pub credentials_env: String,
    /// Sheets API v4 base URL.
    pub sheets_base_url: String,
    /// Drive API v3 base URL, used to list spreadsheets.
    pub drive_base_url: String,
    /// Overrides the key file's `token_uri`.
    pub token_uri: Option<String>,
    /// OAuth scopes requested for the service account.
    pub scopes: Vec<String>,
    /// Last column included in worksheet pages.
    pub page_last_column: String,
    /// How single-cell writes are interpreted. Row and column writes are
    /// always stored verbatim.
    pub cell_value_input_option: ValueInputOption,
    /// Timeout for each provider request, in seconds.
    pub request_timeout_secs: u64,
    /// Upper bound on provider response bodies.
    pub max_body_bytes: usize,
    /// Permit `http://` provider URLs. Only for mock servers.
    pub allow_insecure_http: bool,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            credentials_env: "SERVICE_ACCOUNT_B64".to_owned(),
            sheets_base_url: "https://sheets.googleapis.com".to_owned(),
            drive_base_url: "https://www.googleapis.com".to_owned(),
            token_uri: None,
            scopes: vec![
                "https://www.googleapis.com/auth/spreadsheets".to_owned(),
                "https://www.googleapis.com/auth/drive".to_owned(),
            ],
            page_last_column: "Z".to_owned(),
            cell_value_input_option: ValueInputOption::UserEntered,
            request_timeout_secs: 30,
            max_body_bytes: 10 * 1024 * 1024,
            allow_insecure_http: false,
        }
    }
}
