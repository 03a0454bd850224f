//! A1-notation coordinates: row numbers, column letters, cell addresses and
//! the range strings built from them.
//!
//! Input is upper-cased before validation, so `b7` and `B7` address the same
//! cell. Everything here is 1-based, matching what users type.

use std::fmt;

use super::error::DomainError;

/// Widest column the provider supports (`ZZZ`).
pub const MAX_COLUMN_LETTERS: usize = 3;

/// Default first and last row of a worksheet page.
pub const DEFAULT_PAGE_START: u32 = 1;
pub const DEFAULT_PAGE_END: u32 = 10;

/// A 1-based row number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowNumber(u32);

impl RowNumber {
    /// # Errors
    /// `Validation` when `n` is zero.
    pub fn new(n: u32) -> Result<Self, DomainError> {
        if n == 0 {
            return Err(DomainError::validation(
                "row_number",
                "Row number must be 1 or greater",
            ));
        }
        Ok(Self(n))
    }

    /// Parse a path segment such as `"5"`.
    ///
    /// # Errors
    /// `Validation` unless `raw` is a positive integer.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        raw.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .map(Self)
            .ok_or_else(|| {
                DomainError::validation(
                    "row_number",
                    format!("Invalid row number '{raw}': must be a positive integer"),
                )
            })
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Index as counted by the provider's structural requests.
    #[must_use]
    pub fn zero_based(self) -> u32 {
        self.0 - 1
    }
}

impl fmt::Display for RowNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Column letters (`A`, `Z`, `AA`, ...) together with their 1-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLetter {
    letters: String,
    index: u32,
}

impl ColumnLetter {
    /// # Errors
    /// `Validation` unless `raw` is one to three ASCII letters.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let letters = raw.trim().to_ascii_uppercase();
        let index = letters_to_index(&letters).ok_or_else(|| {
            DomainError::validation(
                "column_letter",
                format!("Invalid column letter '{raw}': expected letters such as 'B' or 'AA'"),
            )
        })?;
        Ok(Self { letters, index })
    }

    /// Column for a 1-based index; `None` for zero or past `ZZZ`.
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        let letters = index_to_letters(index)?;
        Some(Self { letters, index })
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub fn zero_based(&self) -> u32 {
        self.index - 1
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.letters
    }
}

impl fmt::Display for ColumnLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters)
    }
}

/// A single cell such as `B7`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAddress {
    column: ColumnLetter,
    row: RowNumber,
}

impl CellAddress {
    /// Parse `[A-Z]+[0-9]+` (case-insensitive) with a row of at least 1.
    ///
    /// # Errors
    /// `Validation` for anything else, e.g. `1A`, `AA`, `A0` or `B7C`.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let invalid = || {
            DomainError::validation(
                "cell_address",
                format!(
                    "Invalid cell address '{raw}': expected column letters followed by a row number, e.g. 'B7'"
                ),
            )
        };

        let upper = raw.trim().to_ascii_uppercase();
        let split = upper
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = upper.split_at(split);
        if letters.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let index = letters_to_index(letters).ok_or_else(invalid)?;
        let row = digits
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .map(RowNumber)
            .ok_or_else(invalid)?;

        Ok(Self {
            column: ColumnLetter {
                letters: letters.to_owned(),
                index,
            },
            row,
        })
    }

    #[must_use]
    pub fn column(&self) -> &ColumnLetter {
        &self.column
    }

    #[must_use]
    pub fn row(&self) -> RowNumber {
        self.row
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// An inclusive row range used to page through a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    start: RowNumber,
    end: RowNumber,
}

impl RowWindow {
    /// Build from optional query values, defaulting to rows 1 to 10.
    ///
    /// # Errors
    /// `Validation` when either bound is below 1 or `start > end`.
    pub fn new(start: Option<i64>, end: Option<i64>) -> Result<Self, DomainError> {
        let start = bound("start_row", start, DEFAULT_PAGE_START)?;
        let end = bound("end_row", end, DEFAULT_PAGE_END)?;
        if start > end {
            return Err(DomainError::validation(
                "start_row",
                format!("start_row ({start}) must not be greater than end_row ({end})"),
            ));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(self) -> RowNumber {
        self.start
    }

    #[must_use]
    pub fn end(self) -> RowNumber {
        self.end
    }

    /// `A{start}:{last}{end}`.
    #[must_use]
    pub fn a1(self, last_column: &ColumnLetter) -> String {
        format!("A{}:{last_column}{}", self.start, self.end)
    }
}

fn bound(field: &'static str, value: Option<i64>, default: u32) -> Result<RowNumber, DomainError> {
    let Some(value) = value else {
        return Ok(RowNumber(default));
    };
    u32::try_from(value)
        .ok()
        .filter(|n| *n > 0)
        .map(RowNumber)
        .ok_or_else(|| DomainError::validation(field, format!("{field} must be 1 or greater")))
}

/// `A{row}:{last}{row}` covering `width` cells from column A.
#[must_use]
pub fn row_span(row: RowNumber, width: usize) -> Option<String> {
    let last = ColumnLetter::from_index(u32::try_from(width).ok()?)?;
    Some(format!("A{row}:{last}{row}"))
}

/// `{col}1:{col}{height}` covering `height` cells from row 1.
#[must_use]
pub fn column_span(column: &ColumnLetter, height: usize) -> Option<String> {
    let height = u32::try_from(height).ok().filter(|h| *h > 0)?;
    Some(format!("{column}1:{column}{height}"))
}

/// `{row}:{row}`: the whole row.
#[must_use]
pub fn whole_row(row: RowNumber) -> String {
    format!("{row}:{row}")
}

/// `{col}:{col}`: the whole column.
#[must_use]
pub fn whole_column(column: &ColumnLetter) -> String {
    format!("{column}:{column}")
}

/// Prefix an A1 range with a quoted sheet title: `'My ''Q3'' sheet'!A1:B2`.
#[must_use]
pub fn sheet_range(title: &str, a1: &str) -> String {
    format!("'{}'!{a1}", title.replace('\'', "''"))
}

fn letters_to_index(letters: &str) -> Option<u32> {
    if letters.is_empty()
        || letters.len() > MAX_COLUMN_LETTERS
        || !letters.bytes().all(|b| b.is_ascii_uppercase())
    {
        return None;
    }
    Some(
        letters
            .bytes()
            .fold(0, |acc, b| acc * 26 + u32::from(b - b'A') + 1),
    )
}

fn index_to_letters(index: u32) -> Option<String> {
    if index == 0 {
        return None;
    }
    let mut n = index;
    let mut letters = Vec::with_capacity(MAX_COLUMN_LETTERS);
    while n > 0 {
        let rem = u8::try_from((n - 1) % 26).ok()?;
        letters.push(b'A' + rem);
        n = (n - 1).div_euclid(26);
    }
    if letters.len() > MAX_COLUMN_LETTERS {
        return None;
    }
    letters.reverse();
    String::from_utf8(letters).ok()
}
