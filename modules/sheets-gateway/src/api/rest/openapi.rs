//! `OpenAPI` document for the REST surface.

use sheets_errors::Problem;
use utoipa::OpenApi;

use super::dto::{
    CellResponse, ColumnResponse, HealthResponse, MessageResponse, RowResponse, SpreadsheetDto,
    SpreadsheetListResponse, UpdateCellRequest, UpdateValuesRequest, ValuesUpdatedResponse,
    WorksheetDto, WorksheetListResponse, WorksheetPageResponse,
};
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sheets Gateway",
        description = "REST facade over Google Sheets"
    ),
    paths(
        handlers::health,
        handlers::list_spreadsheets,
        handlers::list_worksheets,
        handlers::get_worksheet_page,
        handlers::get_cell,
        handlers::update_cell,
        handlers::clear_cell,
        handlers::get_row,
        handlers::update_row,
        handlers::delete_row,
        handlers::get_column,
        handlers::update_column,
        handlers::delete_column,
    ),
    components(schemas(
        Problem,
        SpreadsheetDto,
        SpreadsheetListResponse,
        WorksheetDto,
        WorksheetListResponse,
        WorksheetPageResponse,
        CellResponse,
        RowResponse,
        ColumnResponse,
        MessageResponse,
        ValuesUpdatedResponse,
        UpdateCellRequest,
        UpdateValuesRequest,
        HealthResponse,
    )),
    tags(
        (name = "spreadsheets", description = "Spreadsheets visible to the service account"),
        (name = "worksheets", description = "Worksheet listing and paging"),
        (name = "cells", description = "Single-cell access"),
        (name = "rows", description = "Whole-row access"),
        (name = "columns", description = "Whole-column access"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// Build the document with the crate version stamped in.
#[must_use]
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    env!("CARGO_PKG_VERSION").clone_into(&mut doc.info.version);
    doc
}
