//! Wire types for the Drive v3 and Sheets v4 REST APIs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::model::{SpreadsheetSummary, WorksheetInfo};

/// `files.list` page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl From<DriveFile> for SpreadsheetSummary {
    fn from(file: DriveFile) -> Self {
        Self {
            id: file.id,
            title: file.name,
        }
    }
}

/// `spreadsheets.get` restricted to `sheets.properties`.
#[derive(Debug, Deserialize)]
pub struct Spreadsheet {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    /// Omitted by the API for the first sheet, whose id is 0.
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub grid_properties: GridProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default)]
    pub row_count: u32,
    #[serde(default)]
    pub column_count: u32,
}

impl From<Sheet> for WorksheetInfo {
    fn from(sheet: Sheet) -> Self {
        let p = sheet.properties;
        Self {
            id: p.sheet_id,
            title: p.title,
            rows: p.grid_properties.row_count,
            cols: p.grid_properties.column_count,
        }
    }
}

/// `values.get` response. `values` is absent when the range is empty.
#[derive(Debug, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    #[must_use]
    pub fn into_strings(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|line| line.into_iter().map(cell_text).collect())
            .collect()
    }
}

/// Render a cell as text. Formatted reads already return strings; other
/// JSON scalars can appear with unformatted render options.
#[must_use]
pub fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_owned(),
        Value::Bool(false) => "FALSE".to_owned(),
        other => other.to_string(),
    }
}

/// `values.update` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRangeUpdate<'a> {
    pub range: &'a str,
    pub major_dimension: &'static str,
    pub values: &'a [Vec<String>],
}

/// `spreadsheets.batchUpdate` body carrying one `deleteDimension` request.
#[derive(Debug, Serialize)]
pub struct BatchUpdate {
    pub requests: Vec<BatchRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub delete_dimension: DeleteDimension,
}

#[derive(Debug, Serialize)]
pub struct DeleteDimension {
    pub range: DimensionRange,
}

/// Half-open, 0-based index range.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i64,
    pub dimension: &'static str,
    pub start_index: u32,
    pub end_index: u32,
}

/// Error envelope shared by Google APIs.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
