#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! REST gateway over Google Sheets.
//!
//! ```text
//!   HTTP client
//!       │
//!       ▼
//! ┌──────────────────────────────┐
//! │  REST API (axum + utoipa)    │  validation, Problem mapping
//! └──────────────────────────────┘
//!       │
//!       ▼
//! ┌──────────────────────────────┐
//! │  SheetsService               │  worksheet resolution, A1 ranges
//! └──────────────────────────────┘
//!       │ SpreadsheetProvider
//!       ▼
//! ┌──────────────────────────────┐
//! │  GoogleSheetsProvider        │  Sheets v4 / Drive v3 over sheets-http
//! └──────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod module;

pub use config::{SheetsConfig, ValueInputOption};
pub use module::SheetsGateway;
