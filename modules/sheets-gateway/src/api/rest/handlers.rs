use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Path, Query};
use sheets_errors::Problem;
use tracing::{field::Empty, info};

use super::dto::{
    CellResponse, ColumnResponse, HealthResponse, MessageResponse, PageQuery, RowResponse,
    SpreadsheetDto, SpreadsheetListResponse, UpdateCellRequest, UpdateValuesRequest,
    ValuesUpdatedResponse, WorksheetDto, WorksheetListResponse, WorksheetPageResponse,
};
use super::error::{
    ProblemContext, domain_error_to_problem, json_rejection_to_problem, query_rejection_to_problem,
};
use crate::domain::address::{CellAddress, ColumnLetter, RowNumber, RowWindow};
use crate::domain::error::DomainError;
use crate::domain::service::SheetsService;

type ApiResult<T> = Result<Json<T>, Problem>;

fn problem(ctx: &ProblemContext) -> impl Fn(DomainError) -> Problem + '_ {
    move |e| domain_error_to_problem(&e, &ctx.instance, ctx.trace_id.clone())
}

/// GET /health - liveness probe; never touches the provider.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
    })
}

/// GET /spreadsheets - spreadsheets visible to the service account.
#[utoipa::path(
    get,
    path = "/spreadsheets",
    tag = "spreadsheets",
    responses(
        (status = 200, description = "Spreadsheets", body = SpreadsheetListResponse),
        (status = 401, description = "Provider authentication failed", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Permission denied", body = Problem, content_type = "application/problem+json"),
        (status = 502, description = "Provider failure", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_spreadsheets(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
) -> ApiResult<SpreadsheetListResponse> {
    let spreadsheets = svc.list_spreadsheets().await.map_err(problem(&ctx))?;
    Ok(Json(SpreadsheetListResponse {
        spreadsheets: spreadsheets.into_iter().map(SpreadsheetDto::from).collect(),
    }))
}

/// GET /spreadsheets/{spreadsheet_id}/worksheets - tabs of a spreadsheet.
#[utoipa::path(
    get,
    path = "/spreadsheets/{spreadsheet_id}/worksheets",
    tag = "worksheets",
    params(("spreadsheet_id" = String, Path, description = "Spreadsheet id")),
    responses(
        (status = 200, description = "Worksheets", body = WorksheetListResponse),
        (status = 404, description = "Unknown spreadsheet", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id))]
pub async fn list_worksheets(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path(spreadsheet_id): Path<String>,
) -> ApiResult<WorksheetListResponse> {
    let worksheets = svc
        .list_worksheets(&spreadsheet_id)
        .await
        .map_err(problem(&ctx))?;
    Ok(Json(WorksheetListResponse {
        worksheets: worksheets.into_iter().map(WorksheetDto::from).collect(),
    }))
}

/// GET /spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title} - one page of rows.
#[utoipa::path(
    get,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}",
    tag = "worksheets",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Rows start_row..=end_row", body = WorksheetPageResponse),
        (status = 400, description = "Invalid page bounds", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Unknown worksheet", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, start_row = Empty, end_row = Empty))]
pub async fn get_worksheet_page(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title)): Path<(String, String)>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<WorksheetPageResponse> {
    let Query(query) = query.map_err(|r| query_rejection_to_problem(&r, &ctx))?;
    let window = RowWindow::new(query.start_row, query.end_row).map_err(problem(&ctx))?;
    let span = tracing::Span::current();
    span.record("start_row", window.start().get());
    span.record("end_row", window.end().get());

    let page = svc
        .get_page(&spreadsheet_id, &title, window)
        .await
        .map_err(problem(&ctx))?;
    Ok(Json(page.into()))
}

/// GET .../cell/{cell_address} - value of one cell.
#[utoipa::path(
    get,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}/cell/{cell_address}",
    tag = "cells",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        ("cell_address" = String, Path, description = "A1 address such as B7")
    ),
    responses(
        (status = 200, description = "Cell value", body = CellResponse),
        (status = 400, description = "Malformed address", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Unknown worksheet", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, cell = %raw))]
pub async fn get_cell(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title, raw)): Path<(String, String, String)>,
) -> ApiResult<CellResponse> {
    let cell = CellAddress::parse(&raw).map_err(problem(&ctx))?;
    let value = svc
        .get_cell(&spreadsheet_id, &title, &cell)
        .await
        .map_err(problem(&ctx))?;
    Ok(Json(CellResponse {
        cell: cell.to_string(),
        value,
    }))
}

/// PATCH .../cell/{cell_address} - overwrite one cell.
#[utoipa::path(
    patch,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}/cell/{cell_address}",
    tag = "cells",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        ("cell_address" = String, Path, description = "A1 address such as B7")
    ),
    request_body = UpdateCellRequest,
    responses(
        (status = 200, description = "Cell updated", body = MessageResponse),
        (status = 400, description = "Malformed address or body", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, cell = %raw))]
pub async fn update_cell(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title, raw)): Path<(String, String, String)>,
    payload: Result<Json<UpdateCellRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let cell = CellAddress::parse(&raw).map_err(problem(&ctx))?;
    let Json(req) = payload.map_err(|r| json_rejection_to_problem(&r, &ctx))?;
    let message = format!("Cell {cell} updated with value '{}'.", req.value);
    svc.update_cell(&spreadsheet_id, &title, &cell, req.value)
        .await
        .map_err(problem(&ctx))?;
    info!("cell updated");
    Ok(Json(MessageResponse { message }))
}

/// DELETE .../cell/{cell_address} - clear one cell.
#[utoipa::path(
    delete,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}/cell/{cell_address}",
    tag = "cells",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        ("cell_address" = String, Path, description = "A1 address such as B7")
    ),
    responses(
        (status = 200, description = "Cell cleared", body = MessageResponse),
        (status = 400, description = "Malformed address", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, cell = %raw))]
pub async fn clear_cell(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title, raw)): Path<(String, String, String)>,
) -> ApiResult<MessageResponse> {
    let cell = CellAddress::parse(&raw).map_err(problem(&ctx))?;
    svc.clear_cell(&spreadsheet_id, &title, &cell)
        .await
        .map_err(problem(&ctx))?;
    info!("cell cleared");
    Ok(Json(MessageResponse {
        message: format!("Cell {cell} cleared."),
    }))
}

/// GET .../row/{row_number} - values of one row.
#[utoipa::path(
    get,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}/row/{row_number}",
    tag = "rows",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        ("row_number" = u32, Path, description = "1-based row number")
    ),
    responses(
        (status = 200, description = "Row values", body = RowResponse),
        (status = 400, description = "Invalid row number", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, row = %raw))]
pub async fn get_row(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title, raw)): Path<(String, String, String)>,
) -> ApiResult<RowResponse> {
    let row = RowNumber::parse(&raw).map_err(problem(&ctx))?;
    let values = svc
        .get_row(&spreadsheet_id, &title, row)
        .await
        .map_err(problem(&ctx))?;
    Ok(Json(RowResponse {
        row: row.get(),
        values,
    }))
}

/// PATCH .../row/{row_number} - write values from column A.
#[utoipa::path(
    patch,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}/row/{row_number}",
    tag = "rows",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        ("row_number" = u32, Path, description = "1-based row number")
    ),
    request_body = UpdateValuesRequest,
    responses(
        (status = 200, description = "Row updated", body = ValuesUpdatedResponse),
        (status = 400, description = "Invalid row number or empty values", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, row = %raw))]
pub async fn update_row(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title, raw)): Path<(String, String, String)>,
    payload: Result<Json<UpdateValuesRequest>, JsonRejection>,
) -> ApiResult<ValuesUpdatedResponse> {
    let row = RowNumber::parse(&raw).map_err(problem(&ctx))?;
    let Json(req) = payload.map_err(|r| json_rejection_to_problem(&r, &ctx))?;
    let values = svc
        .update_row(&spreadsheet_id, &title, row, req.values)
        .await
        .map_err(problem(&ctx))?;
    info!(len = values.len(), "row updated");
    Ok(Json(ValuesUpdatedResponse {
        message: format!("Row {row} updated."),
        values,
    }))
}

/// DELETE .../row/{row_number} - remove a row; rows below shift up.
#[utoipa::path(
    delete,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}/row/{row_number}",
    tag = "rows",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        ("row_number" = u32, Path, description = "1-based row number")
    ),
    responses(
        (status = 200, description = "Row deleted", body = MessageResponse),
        (status = 400, description = "Invalid row number or row outside the sheet", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, row = %raw))]
pub async fn delete_row(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title, raw)): Path<(String, String, String)>,
) -> ApiResult<MessageResponse> {
    let row = RowNumber::parse(&raw).map_err(problem(&ctx))?;
    svc.delete_row(&spreadsheet_id, &title, row)
        .await
        .map_err(problem(&ctx))?;
    info!("row deleted");
    Ok(Json(MessageResponse {
        message: format!("Row {row} deleted."),
    }))
}

/// GET .../column/{column_letter} - values of one column.
#[utoipa::path(
    get,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}/column/{column_letter}",
    tag = "columns",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        ("column_letter" = String, Path, description = "Column letters such as B or AA")
    ),
    responses(
        (status = 200, description = "Column values", body = ColumnResponse),
        (status = 400, description = "Invalid column letter", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, column = %raw))]
pub async fn get_column(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title, raw)): Path<(String, String, String)>,
) -> ApiResult<ColumnResponse> {
    let column = ColumnLetter::parse(&raw).map_err(problem(&ctx))?;
    let values = svc
        .get_column(&spreadsheet_id, &title, &column)
        .await
        .map_err(problem(&ctx))?;
    Ok(Json(ColumnResponse {
        column: column.to_string(),
        values,
    }))
}

/// PATCH .../column/{column_letter} - write values from row 1.
#[utoipa::path(
    patch,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}/column/{column_letter}",
    tag = "columns",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        ("column_letter" = String, Path, description = "Column letters such as B or AA")
    ),
    request_body = UpdateValuesRequest,
    responses(
        (status = 200, description = "Column updated", body = ValuesUpdatedResponse),
        (status = 400, description = "Invalid column letter or empty values", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, column = %raw))]
pub async fn update_column(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title, raw)): Path<(String, String, String)>,
    payload: Result<Json<UpdateValuesRequest>, JsonRejection>,
) -> ApiResult<ValuesUpdatedResponse> {
    let column = ColumnLetter::parse(&raw).map_err(problem(&ctx))?;
    let Json(req) = payload.map_err(|r| json_rejection_to_problem(&r, &ctx))?;
    let values = svc
        .update_column(&spreadsheet_id, &title, &column, req.values)
        .await
        .map_err(problem(&ctx))?;
    info!(len = values.len(), "column updated");
    Ok(Json(ValuesUpdatedResponse {
        message: format!("Column {column} updated."),
        values,
    }))
}

/// DELETE .../column/{column_letter} - remove a column; columns to the right shift left.
#[utoipa::path(
    delete,
    path = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}/column/{column_letter}",
    tag = "columns",
    params(
        ("spreadsheet_id" = String, Path, description = "Spreadsheet id"),
        ("worksheet_title" = String, Path, description = "Worksheet title"),
        ("column_letter" = String, Path, description = "Column letters such as B or AA")
    ),
    responses(
        (status = 200, description = "Column deleted", body = MessageResponse),
        (status = 400, description = "Invalid column letter or column outside the sheet", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(skip_all, fields(spreadsheet_id = %spreadsheet_id, worksheet = %title, column = %raw))]
pub async fn delete_column(
    Extension(svc): Extension<Arc<SheetsService>>,
    ctx: ProblemContext,
    Path((spreadsheet_id, title, raw)): Path<(String, String, String)>,
) -> ApiResult<MessageResponse> {
    let column = ColumnLetter::parse(&raw).map_err(problem(&ctx))?;
    svc.delete_column(&spreadsheet_id, &title, &column)
        .await
        .map_err(problem(&ctx))?;
    info!("column deleted");
    Ok(Json(MessageResponse {
        message: format!("Column {column} deleted."),
    }))
}
