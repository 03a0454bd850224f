//! Transient shapes passed between the service and the provider.

use serde::{Deserialize, Serialize};

/// A spreadsheet visible to the service account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetSummary {
    pub id: String,
    pub title: String,
}

/// One tab of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetInfo {
    /// Provider sheet id; stable across renames.
    pub id: i64,
    pub title: String,
    pub rows: u32,
    pub cols: u32,
}

/// Orientation of a read or a structural delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Rows,
    Columns,
}

impl Dimension {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rows => "ROWS",
            Self::Columns => "COLUMNS",
        }
    }
}

/// How the provider interprets written values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// Parsed as if typed into the UI: formulas, numbers and dates are recognised.
    #[default]
    UserEntered,
    /// Stored verbatim as strings.
    Raw,
}

impl ValueInputOption {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserEntered => "USER_ENTERED",
            Self::Raw => "RAW",
        }
    }
}

/// Cell values in provider order; inner vectors are rows or columns
/// depending on the requested [`Dimension`]. Trailing empty cells are omitted.
pub type Grid = Vec<Vec<String>>;
