use std::sync::Arc;

use tracing::{debug, instrument};

use super::address::{
    CellAddress, ColumnLetter, RowNumber, RowWindow, column_span, row_span, sheet_range,
    whole_column, whole_row,
};
use super::error::DomainError;
use super::model::{Dimension, Grid, SpreadsheetSummary, ValueInputOption, WorksheetInfo};
use super::ports::SpreadsheetProvider;

/// One page of worksheet rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetPage {
    pub worksheet: String,
    /// The A1 range that was read, without the sheet prefix.
    pub range: String,
    pub data: Grid,
}

/// Validates requests and forwards them to the spreadsheet provider.
///
/// Worksheets are looked up by title on every call; nothing is cached.
/// Row and column writes are always sent as [`ValueInputOption::Raw`].
#[derive(Clone)]
pub struct SheetsService {
    provider: Arc<dyn SpreadsheetProvider>,
    page_last_column: ColumnLetter,
    cell_input: ValueInputOption,
}

impl SheetsService {
    #[must_use]
    pub fn new(provider: Arc<dyn SpreadsheetProvider>, page_last_column: ColumnLetter) -> Self {
        Self {
            provider,
            page_last_column,
            cell_input: ValueInputOption::UserEntered,
        }
    }

    /// Interpretation of single-cell writes; `UserEntered` unless set.
    #[must_use]
    pub fn with_cell_input(mut self, input: ValueInputOption) -> Self {
        self.cell_input = input;
        self
    }

    /// # Errors
    /// Provider failures.
    #[instrument(skip(self))]
    pub async fn list_spreadsheets(&self) -> Result<Vec<SpreadsheetSummary>, DomainError> {
        let spreadsheets = self.provider.list_spreadsheets().await?;
        debug!(count = spreadsheets.len(), "listed spreadsheets");
        Ok(spreadsheets)
    }

    /// # Errors
    /// Provider failures, including an unknown spreadsheet.
    #[instrument(skip(self))]
    pub async fn list_worksheets(
        &self,
        spreadsheet_id: &str,
    ) -> Result<Vec<WorksheetInfo>, DomainError> {
        self.provider.list_worksheets(spreadsheet_id).await
    }

    /// Rows `window.start()..=window.end()` from column A to the configured
    /// last column. Rows past the end of the data are simply absent.
    ///
    /// # Errors
    /// `WorksheetNotFound` or provider failures.
    #[instrument(skip(self), fields(start = %window.start(), end = %window.end()))]
    pub async fn get_page(
        &self,
        spreadsheet_id: &str,
        title: &str,
        window: RowWindow,
    ) -> Result<WorksheetPage, DomainError> {
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        let range = window.a1(&self.page_last_column);
        let data = self
            .provider
            .read_range(
                spreadsheet_id,
                &sheet_range(&worksheet.title, &range),
                Dimension::Rows,
            )
            .await?;
        Ok(WorksheetPage {
            worksheet: worksheet.title,
            range,
            data,
        })
    }

    /// The cell's formatted value; `""` for an empty cell.
    ///
    /// # Errors
    /// `WorksheetNotFound` or provider failures.
    #[instrument(skip(self), fields(cell = %cell))]
    pub async fn get_cell(
        &self,
        spreadsheet_id: &str,
        title: &str,
        cell: &CellAddress,
    ) -> Result<String, DomainError> {
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        let grid = self
            .provider
            .read_range(
                spreadsheet_id,
                &sheet_range(&worksheet.title, &cell.to_string()),
                Dimension::Rows,
            )
            .await?;
        Ok(first_line(grid).into_iter().next().unwrap_or_default())
    }

    /// # Errors
    /// `WorksheetNotFound` or provider failures.
    #[instrument(skip(self, value), fields(cell = %cell))]
    pub async fn update_cell(
        &self,
        spreadsheet_id: &str,
        title: &str,
        cell: &CellAddress,
        value: String,
    ) -> Result<(), DomainError> {
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        self.provider
            .write_range(
                spreadsheet_id,
                &sheet_range(&worksheet.title, &cell.to_string()),
                vec![vec![value]],
                self.cell_input,
            )
            .await
    }

    /// # Errors
    /// `WorksheetNotFound` or provider failures.
    #[instrument(skip(self), fields(cell = %cell))]
    pub async fn clear_cell(
        &self,
        spreadsheet_id: &str,
        title: &str,
        cell: &CellAddress,
    ) -> Result<(), DomainError> {
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        self.provider
            .clear_range(
                spreadsheet_id,
                &sheet_range(&worksheet.title, &cell.to_string()),
            )
            .await
    }

    /// Values of the whole row, up to its last non-empty cell.
    ///
    /// # Errors
    /// `WorksheetNotFound` or provider failures.
    #[instrument(skip(self), fields(row = %row))]
    pub async fn get_row(
        &self,
        spreadsheet_id: &str,
        title: &str,
        row: RowNumber,
    ) -> Result<Vec<String>, DomainError> {
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        let grid = self
            .provider
            .read_range(
                spreadsheet_id,
                &sheet_range(&worksheet.title, &whole_row(row)),
                Dimension::Rows,
            )
            .await?;
        Ok(first_line(grid))
    }

    /// Write `values` into the row starting at column A. Cells past the end
    /// of `values` keep their contents.
    ///
    /// # Errors
    /// `Validation` for an empty or over-wide `values`; otherwise
    /// `WorksheetNotFound` or provider failures.
    #[instrument(skip(self, values), fields(row = %row, len = values.len()))]
    pub async fn update_row(
        &self,
        spreadsheet_id: &str,
        title: &str,
        row: RowNumber,
        values: Vec<String>,
    ) -> Result<Vec<String>, DomainError> {
        if values.is_empty() {
            return Err(DomainError::validation(
                "values",
                "No values provided for the row update.",
            ));
        }
        let span = row_span(row, values.len()).ok_or_else(|| {
            DomainError::validation("values", "Too many values for a single row.")
        })?;
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        self.provider
            .write_range(
                spreadsheet_id,
                &sheet_range(&worksheet.title, &span),
                vec![values.clone()],
                ValueInputOption::Raw,
            )
            .await?;
        Ok(values)
    }

    /// Remove the row; rows below move up.
    ///
    /// # Errors
    /// `WorksheetNotFound` or provider failures, including a row outside the
    /// sheet.
    #[instrument(skip(self), fields(row = %row))]
    pub async fn delete_row(
        &self,
        spreadsheet_id: &str,
        title: &str,
        row: RowNumber,
    ) -> Result<(), DomainError> {
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        self.provider
            .delete_dimension(
                spreadsheet_id,
                worksheet.id,
                Dimension::Rows,
                row.zero_based(),
            )
            .await
    }

    /// Values of the whole column, up to its last non-empty cell.
    ///
    /// # Errors
    /// `WorksheetNotFound` or provider failures.
    #[instrument(skip(self), fields(column = %column))]
    pub async fn get_column(
        &self,
        spreadsheet_id: &str,
        title: &str,
        column: &ColumnLetter,
    ) -> Result<Vec<String>, DomainError> {
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        let grid = self
            .provider
            .read_range(
                spreadsheet_id,
                &sheet_range(&worksheet.title, &whole_column(column)),
                Dimension::Columns,
            )
            .await?;
        Ok(first_line(grid))
    }

    /// Write `values` down the column starting at row 1.
    ///
    /// # Errors
    /// `Validation` for an empty `values`; otherwise `WorksheetNotFound` or
    /// provider failures.
    #[instrument(skip(self, values), fields(column = %column, len = values.len()))]
    pub async fn update_column(
        &self,
        spreadsheet_id: &str,
        title: &str,
        column: &ColumnLetter,
        values: Vec<String>,
    ) -> Result<Vec<String>, DomainError> {
        if values.is_empty() {
            return Err(DomainError::validation(
                "values",
                "No values provided for the column update.",
            ));
        }
        let span = column_span(column, values.len()).ok_or_else(|| {
            DomainError::validation("values", "Too many values for a single column.")
        })?;
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        let grid = values.iter().map(|v| vec![v.clone()]).collect();
        self.provider
            .write_range(
                spreadsheet_id,
                &sheet_range(&worksheet.title, &span),
                grid,
                ValueInputOption::Raw,
            )
            .await?;
        Ok(values)
    }

    /// Remove the column; columns to the right move left.
    ///
    /// # Errors
    /// `WorksheetNotFound` or provider failures, including a column outside
    /// the sheet.
    #[instrument(skip(self), fields(column = %column))]
    pub async fn delete_column(
        &self,
        spreadsheet_id: &str,
        title: &str,
        column: &ColumnLetter,
    ) -> Result<(), DomainError> {
        let worksheet = self.resolve(spreadsheet_id, title).await?;
        self.provider
            .delete_dimension(
                spreadsheet_id,
                worksheet.id,
                Dimension::Columns,
                column.zero_based(),
            )
            .await
    }

    async fn resolve(&self, spreadsheet_id: &str, title: &str) -> Result<WorksheetInfo, DomainError> {
        self.provider
            .list_worksheets(spreadsheet_id)
            .await?
            .into_iter()
            .find(|w| w.title == title)
            .ok_or_else(|| DomainError::WorksheetNotFound {
                title: title.to_owned(),
            })
    }
}

fn first_line(grid: Grid) -> Vec<String> {
    grid.into_iter().next().unwrap_or_default()
}
