//! In-memory [`SpreadsheetProvider`] for tests.
//!
//! Understands the range shapes the service produces and mimics the
//! provider's read behaviour: trailing empty cells and rows are dropped.

use std::sync::Mutex;

use async_trait::async_trait;

use super::address::ColumnLetter;
use super::error::{DomainError, UpstreamKind};
use super::model::{Dimension, Grid, SpreadsheetSummary, ValueInputOption, WorksheetInfo};
use super::ports::SpreadsheetProvider;

const SHEET_ROWS: u32 = 1000;
const SHEET_COLS: u32 = 26;

struct Sheet {
    info: WorksheetInfo,
    cells: Grid,
}

struct Book {
    id: String,
    title: String,
    sheets: Vec<Sheet>,
}

#[derive(Default)]
struct State {
    books: Vec<Book>,
    calls: usize,
    last_read: Option<String>,
    last_write: Option<String>,
    last_input: Option<ValueInputOption>,
    failure: Option<(UpstreamKind, String)>,
}

#[derive(Default)]
pub struct InMemoryProvider {
    state: Mutex<State>,
}

/// Inclusive, 1-based bounds; `None` means unbounded.
struct Bounds {
    first_col: Option<u32>,
    first_row: Option<u32>,
    last_col: Option<u32>,
    last_row: Option<u32>,
}

impl InMemoryProvider {
    pub fn with_sheet(spreadsheet_id: &str, title: &str, rows: &[&[&str]]) -> Self {
        let provider = Self::default();
        provider.state.lock().unwrap().books.push(Book {
            id: spreadsheet_id.to_owned(),
            title: format!("{title} book"),
            sheets: vec![Sheet {
                info: WorksheetInfo {
                    id: 0,
                    title: title.to_owned(),
                    rows: SHEET_ROWS,
                    cols: SHEET_COLS,
                },
                cells: rows
                    .iter()
                    .map(|r| r.iter().map(|v| (*v).to_owned()).collect())
                    .collect(),
            }],
        });
        provider
    }

    /// Every subsequent call fails with this provider error.
    pub fn fail_with(&self, kind: UpstreamKind, message: &str) {
        self.state.lock().unwrap().failure = Some((kind, message.to_owned()));
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn last_read(&self) -> Option<String> {
        self.state.lock().unwrap().last_read.clone()
    }

    pub fn last_write(&self) -> Option<String> {
        self.state.lock().unwrap().last_write.clone()
    }

    pub fn last_input(&self) -> Option<ValueInputOption> {
        self.state.lock().unwrap().last_input
    }

    fn with_sheet_mut<T>(
        &self,
        spreadsheet_id: &str,
        range: &str,
        f: impl FnOnce(&mut Sheet, &Bounds) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut state = self.enter()?;
        let (title, a1) = split_range(range);
        let bounds = parse_bounds(a1);
        let sheet = book_mut(&mut state, spreadsheet_id)?
            .sheets
            .iter_mut()
            .find(|s| s.info.title == title)
            .ok_or_else(|| {
                DomainError::upstream(
                    UpstreamKind::InvalidRequest,
                    format!("Unable to parse range: {range}"),
                )
            })?;
        f(sheet, &bounds)
    }

    fn enter(&self) -> Result<std::sync::MutexGuard<'_, State>, DomainError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if let Some((kind, message)) = state.failure.clone() {
            return Err(DomainError::upstream(kind, message));
        }
        Ok(state)
    }
}

fn book_mut<'a>(state: &'a mut State, spreadsheet_id: &str) -> Result<&'a mut Book, DomainError> {
    state
        .books
        .iter_mut()
        .find(|b| b.id == spreadsheet_id)
        .ok_or_else(|| {
            DomainError::upstream(UpstreamKind::NotFound, "Requested entity was not found.")
        })
}

fn split_range(range: &str) -> (String, &str) {
    match range.rsplit_once("'!") {
        Some((quoted, a1)) => (quoted.trim_start_matches('\'').replace("''", "'"), a1),
        None => (String::new(), range),
    }
}

fn parse_bounds(a1: &str) -> Bounds {
    let (from, to) = a1.split_once(':').unwrap_or((a1, a1));
    let (first_col, first_row) = parse_corner(from);
    let (last_col, last_row) = parse_corner(to);
    Bounds {
        first_col,
        first_row,
        last_col,
        last_row,
    }
}

fn parse_corner(corner: &str) -> (Option<u32>, Option<u32>) {
    let split = corner
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(corner.len());
    let (letters, digits) = corner.split_at(split);
    let col = (!letters.is_empty()).then(|| ColumnLetter::parse(letters).unwrap().index());
    let row = (!digits.is_empty()).then(|| digits.parse().unwrap());
    (col, row)
}

fn trim_trailing(mut line: Vec<String>) -> Vec<String> {
    while line.last().is_some_and(String::is_empty) {
        line.pop();
    }
    line
}

fn trim_grid(grid: Grid) -> Grid {
    let mut grid: Grid = grid.into_iter().map(trim_trailing).collect();
    while grid.last().is_some_and(Vec::is_empty) {
        grid.pop();
    }
    grid
}

fn cell(cells: &Grid, row: u32, col: u32) -> String {
    cells
        .get(row as usize - 1)
        .and_then(|r| r.get(col as usize - 1))
        .cloned()
        .unwrap_or_default()
}

fn set_cell(cells: &mut Grid, row: u32, col: u32, value: String) {
    let (r, c) = (row as usize - 1, col as usize - 1);
    if cells.len() <= r {
        cells.resize(r + 1, Vec::new());
    }
    if cells[r].len() <= c {
        cells[r].resize(c + 1, String::new());
    }
    cells[r][c] = value;
}

#[async_trait]
impl SpreadsheetProvider for InMemoryProvider {
    async fn list_spreadsheets(&self) -> Result<Vec<SpreadsheetSummary>, DomainError> {
        let state = self.enter()?;
        Ok(state
            .books
            .iter()
            .map(|b| SpreadsheetSummary {
                id: b.id.clone(),
                title: b.title.clone(),
            })
            .collect())
    }

    async fn list_worksheets(&self, spreadsheet_id: &str) -> Result<Vec<WorksheetInfo>, DomainError> {
        let mut state = self.enter()?;
        Ok(book_mut(&mut state, spreadsheet_id)?
            .sheets
            .iter()
            .map(|s| s.info.clone())
            .collect())
    }

    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        major: Dimension,
    ) -> Result<Grid, DomainError> {
        let grid = self.with_sheet_mut(spreadsheet_id, range, |sheet, b| {
            let data_rows = u32::try_from(sheet.cells.len()).unwrap();
            let data_cols = sheet
                .cells
                .iter()
                .map(Vec::len)
                .max()
                .map_or(0, |n| u32::try_from(n).unwrap());
            let rows = b.first_row.unwrap_or(1)..=b.last_row.unwrap_or(data_rows).min(data_rows);
            let cols = b.first_col.unwrap_or(1)..=b.last_col.unwrap_or(data_cols).min(data_cols);
            let grid: Grid = match major {
                Dimension::Rows => rows
                    .map(|r| cols.clone().map(|c| cell(&sheet.cells, r, c)).collect())
                    .collect(),
                Dimension::Columns => cols
                    .map(|c| rows.clone().map(|r| cell(&sheet.cells, r, c)).collect())
                    .collect(),
            };
            Ok(trim_grid(grid))
        })?;
        self.state.lock().unwrap().last_read = Some(range.to_owned());
        Ok(grid)
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Grid,
        input: ValueInputOption,
    ) -> Result<(), DomainError> {
        self.with_sheet_mut(spreadsheet_id, range, |sheet, b| {
            let (top, left) = (b.first_row.unwrap_or(1), b.first_col.unwrap_or(1));
            for (dr, line) in (0u32..).zip(values) {
                for (dc, value) in (0u32..).zip(line) {
                    set_cell(&mut sheet.cells, top + dr, left + dc, value);
                }
            }
            Ok(())
        })?;
        let mut state = self.state.lock().unwrap();
        state.last_write = Some(range.to_owned());
        state.last_input = Some(input);
        Ok(())
    }

    async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<(), DomainError> {
        self.with_sheet_mut(spreadsheet_id, range, |sheet, b| {
            let last_row = b.last_row.unwrap_or(SHEET_ROWS);
            let last_col = b.last_col.unwrap_or(SHEET_COLS);
            for (r, line) in (1u32..).zip(sheet.cells.iter_mut()) {
                if r < b.first_row.unwrap_or(1) || r > last_row {
                    continue;
                }
                for (c, value) in (1u32..).zip(line.iter_mut()) {
                    if c >= b.first_col.unwrap_or(1) && c <= last_col {
                        value.clear();
                    }
                }
            }
            Ok(())
        })
    }

    async fn delete_dimension(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        dimension: Dimension,
        index: u32,
    ) -> Result<(), DomainError> {
        let mut state = self.enter()?;
        let sheet = book_mut(&mut state, spreadsheet_id)?
            .sheets
            .iter_mut()
            .find(|s| s.info.id == sheet_id)
            .ok_or_else(|| {
                DomainError::upstream(UpstreamKind::InvalidRequest, "No grid with id")
            })?;
        let i = index as usize;
        match dimension {
            Dimension::Rows => {
                if index >= sheet.info.rows {
                    return Err(DomainError::upstream(
                        UpstreamKind::InvalidRequest,
                        "Invalid requests[0].deleteDimension: Cannot delete a row that doesn't exist.",
                    ));
                }
                if i < sheet.cells.len() {
                    sheet.cells.remove(i);
                }
                sheet.info.rows -= 1;
            }
            Dimension::Columns => {
                if index >= sheet.info.cols {
                    return Err(DomainError::upstream(
                        UpstreamKind::InvalidRequest,
                        "Invalid requests[0].deleteDimension: Cannot delete a column that doesn't exist.",
                    ));
                }
                for line in &mut sheet.cells {
                    if i < line.len() {
                        line.remove(i);
                    }
                }
                sheet.info.cols -= 1;
            }
        }
        Ok(())
    }
}
