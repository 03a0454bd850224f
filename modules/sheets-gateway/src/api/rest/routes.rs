use std::sync::Arc;

use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};

use super::handlers;
use super::openapi::build_openapi;
use crate::domain::service::SheetsService;

const WORKSHEET: &str = "/spreadsheets/{spreadsheet_id}/worksheets/{worksheet_title}";

/// All gateway routes plus `/health` and `/openapi.json`. Middleware is the
/// caller's concern.
pub fn router(service: Arc<SheetsService>) -> Router {
    let doc = Arc::new(build_openapi());

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/openapi.json",
            get(move || {
                let doc = Arc::clone(&doc);
                async move {
                    ([(header::CACHE_CONTROL, "no-store")], Json(doc.as_ref())).into_response()
                }
            }),
        )
        .route("/spreadsheets", get(handlers::list_spreadsheets))
        .route(
            "/spreadsheets/{spreadsheet_id}/worksheets",
            get(handlers::list_worksheets),
        )
        .route(WORKSHEET, get(handlers::get_worksheet_page))
        .route(
            &format!("{WORKSHEET}/cell/{{cell_address}}"),
            get(handlers::get_cell)
                .patch(handlers::update_cell)
                .delete(handlers::clear_cell),
        )
        .route(
            &format!("{WORKSHEET}/row/{{row_number}}"),
            get(handlers::get_row)
                .patch(handlers::update_row)
                .delete(handlers::delete_row),
        )
        .route(
            &format!("{WORKSHEET}/column/{{column_letter}}"),
            get(handlers::get_column)
                .patch(handlers::update_column)
                .delete(handlers::delete_column),
        )
        .layer(Extension(service))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::address::ColumnLetter;
    use crate::domain::error::UpstreamKind;
    use crate::domain::fake::InMemoryProvider;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt as _;

    fn app_with(provider: &Arc<InMemoryProvider>) -> Router {
        let service = SheetsService::new(provider.clone(), ColumnLetter::parse("C").unwrap());
        router(Arc::new(service))
    }

    fn seeded() -> Arc<InMemoryProvider> {
        Arc::new(InMemoryProvider::with_sheet(
            "ss1",
            "Budget",
            &[
                &["Item", "Cost", "Owner"],
                &["Rent", "1200", "Ana"],
                &["Food", "300", "Ben"],
                &["Gas", "80", "Cy"],
            ],
        ))
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value, Option<String>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap().to_owned());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json, content_type)
    }

    #[tokio::test]
    async fn health_is_ok_without_provider() {
        let provider = seeded();
        let (status, body, _) = call(app_with(&provider), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body, _) = call(app_with(&seeded()), "GET", "/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["openapi"].as_str().unwrap().starts_with("3."));
        assert!(body["paths"]["/spreadsheets"].is_object());
    }

    #[tokio::test]
    async fn lists_spreadsheets_and_worksheets() {
        let provider = seeded();
        let (status, body, _) = call(app_with(&provider), "GET", "/spreadsheets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"spreadsheets": [{"title": "Budget book", "id": "ss1"}]})
        );

        let (status, body, _) =
            call(app_with(&provider), "GET", "/spreadsheets/ss1/worksheets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"worksheets": [{"title": "Budget", "id": 0, "rows": 1000, "cols": 26}]})
        );
    }

    #[tokio::test]
    async fn no_spreadsheets_is_empty_array() {
        let provider = Arc::new(InMemoryProvider::default());
        let (status, body, _) = call(app_with(&provider), "GET", "/spreadsheets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"spreadsheets": []}));
    }

    #[tokio::test]
    async fn page_defaults_and_bounds() {
        let provider = seeded();
        let (status, body, _) = call(
            app_with(&provider),
            "GET",
            "/spreadsheets/ss1/worksheets/Budget?start_row=2&end_row=3",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "worksheet": "Budget",
                "range": "A2:C3",
                "data": [["Rent", "1200", "Ana"], ["Food", "300", "Ben"]]
            })
        );

        let (_, body, _) =
            call(app_with(&provider), "GET", "/spreadsheets/ss1/worksheets/Budget", None).await;
        assert_eq!(body["range"], "A1:C10");
        assert_eq!(body["data"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn bad_page_bounds_are_rejected() {
        let provider = seeded();
        for query in ["start_row=0", "start_row=5&end_row=2", "end_row=abc"] {
            let (status, body, content_type) = call(
                app_with(&provider),
                "GET",
                &format!("/spreadsheets/ss1/worksheets/Budget?{query}"),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
            assert_eq!(body["code"], "SHEETS_INVALID_PAGE_BOUNDS", "{query}");
            assert_eq!(content_type.as_deref(), Some("application/problem+json"));
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn cell_round_trip() {
        let provider = seeded();
        let base = "/spreadsheets/ss1/worksheets/Budget/cell";

        let (status, body, _) = call(
            app_with(&provider),
            "PATCH",
            &format!("{base}/b2"),
            Some(json!({"value": "1250"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Cell B2 updated with value '1250'."}));

        let (status, body, _) = call(app_with(&provider), "GET", &format!("{base}/B2"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"cell": "B2", "value": "1250"}));

        let (status, body, _) =
            call(app_with(&provider), "DELETE", &format!("{base}/B2"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Cell B2 cleared."}));

        let (_, body, _) = call(app_with(&provider), "GET", &format!("{base}/B2"), None).await;
        assert_eq!(body, json!({"cell": "B2", "value": ""}));
    }

    #[tokio::test]
    async fn malformed_cell_addresses_never_reach_provider() {
        let provider = seeded();
        for address in ["1A", "AA", "A0", "B7C", "%20"] {
            let (status, body, _) = call(
                app_with(&provider),
                "GET",
                &format!("/spreadsheets/ss1/worksheets/Budget/cell/{address}"),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{address}");
            assert_eq!(body["code"], "SHEETS_INVALID_CELL_ADDRESS");
            assert_eq!(body["status"], 400);
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn cell_update_requires_value_field() {
        let provider = seeded();
        let (status, body, _) = call(
            app_with(&provider),
            "PATCH",
            "/spreadsheets/ss1/worksheets/Budget/cell/A1",
            Some(json!({"values": ["x"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SHEETS_INVALID_REQUEST");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn row_endpoints() {
        let provider = seeded();
        let base = "/spreadsheets/ss1/worksheets/Budget/row";

        let (status, body, _) = call(app_with(&provider), "GET", &format!("{base}/3"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"row": 3, "values": ["Food", "300", "Ben"]}));

        let (status, body, _) = call(
            app_with(&provider),
            "PATCH",
            &format!("{base}/3"),
            Some(json!({"values": ["Groceries"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Row 3 updated.", "values": ["Groceries"]}));

        let (_, body, _) = call(app_with(&provider), "GET", &format!("{base}/3"), None).await;
        assert_eq!(body["values"], json!(["Groceries", "300", "Ben"]));

        let (status, body, _) =
            call(app_with(&provider), "DELETE", &format!("{base}/3"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Row 3 deleted."}));

        let (_, body, _) = call(app_with(&provider), "GET", &format!("{base}/3"), None).await;
        assert_eq!(body["values"], json!(["Gas", "80", "Cy"]));
    }

    #[tokio::test]
    async fn row_validation() {
        let provider = seeded();
        let base = "/spreadsheets/ss1/worksheets/Budget/row";

        let (status, body, _) = call(app_with(&provider), "GET", &format!("{base}/abc"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SHEETS_INVALID_ROW_NUMBER");

        let (status, body, _) = call(app_with(&provider), "GET", &format!("{base}/0"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SHEETS_INVALID_ROW_NUMBER");

        let (status, body, _) = call(
            app_with(&provider),
            "PATCH",
            &format!("{base}/2"),
            Some(json!({"values": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No values provided for the row update.");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn column_endpoints() {
        let provider = seeded();
        let base = "/spreadsheets/ss1/worksheets/Budget/column";

        let (status, body, _) = call(app_with(&provider), "GET", &format!("{base}/c"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"column": "C", "values": ["Owner", "Ana", "Ben", "Cy"]}));

        let (status, body, _) = call(
            app_with(&provider),
            "PATCH",
            &format!("{base}/C"),
            Some(json!({"values": ["Who", "Al"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Column C updated.", "values": ["Who", "Al"]}));

        let (status, body, _) =
            call(app_with(&provider), "DELETE", &format!("{base}/A"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Column A deleted."}));

        let (_, body, _) = call(app_with(&provider), "GET", &format!("{base}/B"), None).await;
        assert_eq!(body["values"], json!(["Who", "Al", "Ben", "Cy"]));

        let (status, body, _) = call(
            app_with(&provider),
            "PATCH",
            &format!("{base}/B"),
            Some(json!({"values": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No values provided for the column update.");

        let (status, body, _) = call(app_with(&provider), "GET", &format!("{base}/A1"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SHEETS_INVALID_COLUMN_LETTER");
    }

    #[tokio::test]
    async fn unknown_worksheet_is_404() {
        let (status, body, content_type) = call(
            app_with(&seeded()),
            "GET",
            "/spreadsheets/ss1/worksheets/Nope/row/1",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(content_type.as_deref(), Some("application/problem+json"));
        assert_eq!(body["detail"], "Worksheet 'Nope' not found");
        assert_eq!(body["code"], "SHEETS_WORKSHEET_NOT_FOUND");
        assert_eq!(body["instance"], "/spreadsheets/ss1/worksheets/Nope/row/1");
    }

    #[tokio::test]
    async fn deleting_row_outside_sheet_surfaces_provider_error() {
        let (status, body, _) = call(
            app_with(&seeded()),
            "DELETE",
            "/spreadsheets/ss1/worksheets/Budget/row/5000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SHEETS_PROVIDER_INVALID_REQUEST");
        assert!(body["detail"].as_str().unwrap().contains("Cannot delete a row"));
    }

    #[tokio::test]
    async fn deleting_column_outside_sheet_surfaces_provider_error() {
        let provider = seeded();
        let (status, body, content_type) = call(
            app_with(&provider),
            "DELETE",
            "/spreadsheets/ss1/worksheets/Budget/column/ZZ",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/problem+json"));
        assert_eq!(body["code"], "SHEETS_PROVIDER_INVALID_REQUEST");
        assert!(body["detail"].as_str().unwrap().contains("Cannot delete a column"));

        let (_, body, _) = call(
            app_with(&provider),
            "GET",
            "/spreadsheets/ss1/worksheets/Budget/column/C",
            None,
        )
        .await;
        assert_eq!(body["values"], json!(["Owner", "Ana", "Ben", "Cy"]));
    }

    #[tokio::test]
    async fn four_letter_columns_are_rejected_locally() {
        let provider = seeded();
        let (status, body, _) = call(
            app_with(&provider),
            "GET",
            "/spreadsheets/ss1/worksheets/Budget/cell/AAAA1",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SHEETS_INVALID_CELL_ADDRESS");

        let (status, body, _) = call(
            app_with(&provider),
            "GET",
            "/spreadsheets/ss1/worksheets/Budget/column/AAAA",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "SHEETS_INVALID_COLUMN_LETTER");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn problem_trace_id_is_the_request_id() {
        let request = Request::builder()
            .method("GET")
            .uri("/spreadsheets/ss1/worksheets/Nope/cell/A1")
            .header("x-request-id", "req-1")
            .body(Body::empty())
            .unwrap();
        let response = app_with(&seeded()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["trace_id"], "req-1");

        let (_, body, _) = call(
            app_with(&seeded()),
            "GET",
            "/spreadsheets/ss1/worksheets/Nope/cell/A1",
            None,
        )
        .await;
        assert!(body.get("trace_id").is_none());
    }

    #[tokio::test]
    async fn provider_errors_keep_their_status() {
        let cases = [
            (UpstreamKind::PermissionDenied, StatusCode::FORBIDDEN),
            (UpstreamKind::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (UpstreamKind::Failed, StatusCode::BAD_GATEWAY),
        ];
        for (kind, expected) in cases {
            let provider = seeded();
            provider.fail_with(kind, "provider message");
            let (status, body, _) = call(app_with(&provider), "GET", "/spreadsheets", None).await;
            assert_eq!(status, expected);
            assert_eq!(body["detail"], "provider message");
        }
    }
}
