//! REST DTOs for the sheets gateway.
//!
//! Field names are part of the public contract and stay `snake_case`.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::model::{SpreadsheetSummary, WorksheetInfo};
use crate::domain::service::WorksheetPage;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpreadsheetDto {
    pub title: String,
    pub id: String,
}

impl From<SpreadsheetSummary> for SpreadsheetDto {
    fn from(s: SpreadsheetSummary) -> Self {
        Self {
            title: s.title,
            id: s.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpreadsheetListResponse {
    pub spreadsheets: Vec<SpreadsheetDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorksheetDto {
    pub title: String,
    /// Provider sheet id.
    pub id: i64,
    /// Grid size, including empty rows.
    pub rows: u32,
    pub cols: u32,
}

impl From<WorksheetInfo> for WorksheetDto {
    fn from(w: WorksheetInfo) -> Self {
        Self {
            title: w.title,
            id: w.id,
            rows: w.rows,
            cols: w.cols,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorksheetListResponse {
    pub worksheets: Vec<WorksheetDto>,
}

/// Query string of the worksheet page endpoint. Both bounds are 1-based and
/// inclusive.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// First row, default 1.
    pub start_row: Option<i64>,
    /// Last row, default 10.
    pub end_row: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorksheetPageResponse {
    pub worksheet: String,
    /// A1 range that was read, e.g. `A1:Z10`.
    pub range: String,
    pub data: Vec<Vec<String>>,
}

impl From<WorksheetPage> for WorksheetPageResponse {
    fn from(p: WorksheetPage) -> Self {
        Self {
            worksheet: p.worksheet,
            range: p.range,
            data: p.data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CellResponse {
    pub cell: String,
    /// Formatted value; empty for an empty cell.
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RowResponse {
    pub row: u32,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ColumnResponse {
    pub column: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValuesUpdatedResponse {
    pub message: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCellRequest {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateValuesRequest {
    /// Written in order from column A (row update) or row 1 (column update).
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
