//! Output ports (interfaces) for the domain service.

use async_trait::async_trait;

use super::error::DomainError;
use super::model::{Dimension, Grid, SpreadsheetSummary, ValueInputOption, WorksheetInfo};

/// Remote spreadsheet backend.
///
/// Ranges are A1 strings already qualified with the quoted sheet title
/// (`'Sheet1'!A1:C3`). Implementations map every provider failure to a
/// [`DomainError`]; none of them retry.
#[async_trait]
pub trait SpreadsheetProvider: Send + Sync {
    async fn list_spreadsheets(&self) -> Result<Vec<SpreadsheetSummary>, DomainError>;

    async fn list_worksheets(&self, spreadsheet_id: &str) -> Result<Vec<WorksheetInfo>, DomainError>;

    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        major: Dimension,
    ) -> Result<Grid, DomainError>;

    /// Overwrite `range` with row-major `values`, interpreted per `input`.
    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Grid,
        input: ValueInputOption,
    ) -> Result<(), DomainError>;

    async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<(), DomainError>;

    /// Remove one row or column, shifting the rest up or left.
    /// `index` is 0-based.
    async fn delete_dimension(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        dimension: Dimension,
        index: u32,
    ) -> Result<(), DomainError>;
}
