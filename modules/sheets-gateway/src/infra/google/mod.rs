//! Google Sheets v4 / Drive v3 implementation of [`SpreadsheetProvider`].

mod dto;
mod error;

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use serde::de::DeserializeOwned;
use sheets_auth::{AccessTokenProvider, SecretString};
use sheets_http::{HttpClient, HttpResponse, RequestBuilder};
use tracing::debug;
use url::Url;

use crate::config::SheetsConfig;
use crate::domain::error::DomainError;
use crate::domain::model::{Dimension, Grid, SpreadsheetSummary, ValueInputOption, WorksheetInfo};
use crate::domain::ports::SpreadsheetProvider;
use dto::{
    BatchRequest, BatchUpdate, DeleteDimension, DimensionRange, FileList, Spreadsheet,
    ValueRange, ValueRangeUpdate,
};
pub use error::{map_http_error, map_token_error};

const SPREADSHEET_FILES_QUERY: &str =
    "mimeType='application/vnd.google-apps.spreadsheet' and trashed=false";
const DRIVE_FILE_FIELDS: &str = "nextPageToken,files(id,name)";
const DRIVE_PAGE_SIZE: &str = "1000";
const SHEET_FIELDS: &str = "sheets.properties";

/// Talks to Google with a bearer token from the configured
/// [`AccessTokenProvider`]. A 401 from Google drops the cached token so the
/// next request fetches a fresh one; the failed request is not retried.
pub struct GoogleSheetsProvider {
    client: HttpClient,
    tokens: Arc<dyn AccessTokenProvider>,
    sheets_base: Url,
    drive_base: Url,
}

impl GoogleSheetsProvider {
    /// # Errors
    /// When either configured base URL is not an absolute hierarchical URL.
    pub fn new(
        client: HttpClient,
        tokens: Arc<dyn AccessTokenProvider>,
        config: &SheetsConfig,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            tokens,
            sheets_base: base_url(&config.sheets_base_url)?,
            drive_base: base_url(&config.drive_base_url)?,
        })
    }

    async fn token(&self) -> Result<SecretString, DomainError> {
        self.tokens
            .access_token()
            .await
            .map_err(|e| map_token_error(&e))
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<HttpResponse, DomainError> {
        let response = request
            .send()
            .await
            .map_err(|e| map_http_error(&e, context))?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate();
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url, context: &str) -> Result<T, DomainError> {
        let token = self.token().await?;
        let request = self.client.get(url.as_str()).bearer_token(token.expose());
        self.send(request, context)
            .await?
            .json()
            .await
            .map_err(|e| map_http_error(&e, context))
    }

    /// Send a request whose success body is not needed.
    async fn execute(&self, request: RequestBuilder, context: &str) -> Result<(), DomainError> {
        self.send(request, context)
            .await?
            .checked_bytes()
            .await
            .map(drop)
            .map_err(|e| map_http_error(&e, context))
    }

    fn sheets_url(&self, segments: &[&str]) -> Result<Url, DomainError> {
        join(&self.sheets_base, segments)
    }
}

fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    let url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`.
fn join(base: &Url, segments: &[&str]) -> Result<Url, DomainError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| DomainError::Internal(format!("base URL '{base}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl SpreadsheetProvider for GoogleSheetsProvider {
    async fn list_spreadsheets(&self) -> Result<Vec<SpreadsheetSummary>, DomainError> {
        let mut spreadsheets = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = join(&self.drive_base, &["drive", "v3", "files"])?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("q", SPREADSHEET_FILES_QUERY)
                    .append_pair("fields", DRIVE_FILE_FIELDS)
                    .append_pair("pageSize", DRIVE_PAGE_SIZE)
                    .append_pair("supportsAllDrives", "true")
                    .append_pair("includeItemsFromAllDrives", "true");
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }
            let page: FileList = self.get_json(&url, "list spreadsheets").await?;
            spreadsheets.extend(page.files.into_iter().map(SpreadsheetSummary::from));
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        debug!(count = spreadsheets.len(), "drive files listed");
        Ok(spreadsheets)
    }

    async fn list_worksheets(&self, spreadsheet_id: &str) -> Result<Vec<WorksheetInfo>, DomainError> {
        let mut url = self.sheets_url(&["v4", "spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut().append_pair("fields", SHEET_FIELDS);
        let doc: Spreadsheet = self.get_json(&url, "get spreadsheet").await?;
        Ok(doc.sheets.into_iter().map(WorksheetInfo::from).collect())
    }

    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        major: Dimension,
    ) -> Result<Grid, DomainError> {
        debug!(range, major = major.as_str(), "reading values");
        let mut url = self.sheets_url(&["v4", "spreadsheets", spreadsheet_id, "values", range])?;
        url.query_pairs_mut()
            .append_pair("majorDimension", major.as_str());
        let values: ValueRange = self.get_json(&url, "read values").await?;
        Ok(values.into_strings())
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Grid,
        input: ValueInputOption,
    ) -> Result<(), DomainError> {
        const CONTEXT: &str = "update values";
        debug!(range, rows = values.len(), input = input.as_str(), "writing values");
        let mut url = self.sheets_url(&["v4", "spreadsheets", spreadsheet_id, "values", range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", input.as_str());
        let body = ValueRangeUpdate {
            range,
            major_dimension: Dimension::Rows.as_str(),
            values: &values,
        };
        let token = self.token().await?;
        let request = self
            .client
            .put(url.as_str())
            .bearer_token(token.expose())
            .json(&body)
            .map_err(|e| map_http_error(&e, CONTEXT))?;
        self.execute(request, CONTEXT).await
    }

    async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<(), DomainError> {
        const CONTEXT: &str = "clear values";
        debug!(range, "clearing values");
        let segment = format!("{range}:clear");
        let url = self.sheets_url(&["v4", "spreadsheets", spreadsheet_id, "values", &segment])?;
        let token = self.token().await?;
        let request = self
            .client
            .post(url.as_str())
            .bearer_token(token.expose())
            .json(&serde_json::json!({}))
            .map_err(|e| map_http_error(&e, CONTEXT))?;
        self.execute(request, CONTEXT).await
    }

    async fn delete_dimension(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        dimension: Dimension,
        index: u32,
    ) -> Result<(), DomainError> {
        const CONTEXT: &str = "delete dimension";
        debug!(sheet_id, dimension = dimension.as_str(), index, "deleting dimension");
        let segment = format!("{spreadsheet_id}:batchUpdate");
        let url = self.sheets_url(&["v4", "spreadsheets", &segment])?;
        let body = BatchUpdate {
            requests: vec![BatchRequest {
                delete_dimension: DeleteDimension {
                    range: DimensionRange {
                        sheet_id,
                        dimension: dimension.as_str(),
                        start_index: index,
                        end_index: index.saturating_add(1),
                    },
                },
            }],
        };
        let token = self.token().await?;
        let request = self
            .client
            .post(url.as_str())
            .bearer_token(token.expose())
            .json(&body)
            .map_err(|e| map_http_error(&e, CONTEXT))?;
        self.execute(request, CONTEXT).await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::address::{ColumnLetter, RowNumber};
    use crate::domain::error::UpstreamKind;
    use crate::domain::service::SheetsService;
    use httpmock::prelude::*;
    use serde_json::json;
    use sheets_auth::StaticTokenProvider;
    use sheets_http::{HttpClientBuilder, HttpClientConfig};

    fn provider(server: &MockServer) -> GoogleSheetsProvider {
        let config = SheetsConfig {
            sheets_base_url: server.base_url(),
            drive_base_url: server.base_url(),
            allow_insecure_http: true,
            ..SheetsConfig::default()
        };
        let client = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        GoogleSheetsProvider::new(
            client,
            Arc::new(StaticTokenProvider::new("tok")),
            &config,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_spreadsheets_across_pages() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/drive/v3/files")
                    .header("authorization", "Bearer tok")
                    .query_param("q", SPREADSHEET_FILES_QUERY)
                    .query_param("fields", DRIVE_FILE_FIELDS)
                    .query_param("pageSize", "1000")
                    .query_param("supportsAllDrives", "true")
                    .query_param_missing("pageToken");
                then.status(200).json_body(json!({
                    "files": [{"id": "a1", "name": "Budget"}],
                    "nextPageToken": "p2"
                }));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/drive/v3/files")
                    .query_param("pageToken", "p2");
                then.status(200)
                    .json_body(json!({"files": [{"id": "b2", "name": "Roster"}]}));
            })
            .await;

        let listed = provider(&server).list_spreadsheets().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(
            listed,
            vec![
                SpreadsheetSummary {
                    id: "a1".to_owned(),
                    title: "Budget".to_owned()
                },
                SpreadsheetSummary {
                    id: "b2".to_owned(),
                    title: "Roster".to_owned()
                },
            ]
        );
    }

    #[tokio::test]
    async fn no_files_means_empty_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/drive/v3/files");
                then.status(200).json_body(json!({}));
            })
            .await;
        assert!(provider(&server).list_spreadsheets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_worksheets() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v4/spreadsheets/ss1")
                    .query_param("fields", "sheets.properties");
                then.status(200).json_body(json!({"sheets": [
                    {"properties": {"sheetId": 0, "title": "Budget",
                        "gridProperties": {"rowCount": 100, "columnCount": 8}}},
                    {"properties": {"sheetId": 991, "title": "Notes",
                        "gridProperties": {"rowCount": 10, "columnCount": 2}}}
                ]}));
            })
            .await;

        let sheets = provider(&server).list_worksheets("ss1").await.unwrap();

        m.assert_async().await;
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[1].id, 991);
        assert_eq!(sheets[1].title, "Notes");
        assert_eq!((sheets[0].rows, sheets[0].cols), (100, 8));
    }

    #[tokio::test]
    async fn reads_column_major_values() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v4/spreadsheets/ss1/values/'Budget'!B:B")
                    .query_param("majorDimension", "COLUMNS");
                then.status(200).json_body(json!({
                    "range": "Budget!B1:B1000",
                    "majorDimension": "COLUMNS",
                    "values": [["Cost", "1200", 3]]
                }));
            })
            .await;

        let grid = provider(&server)
            .read_range("ss1", "'Budget'!B:B", Dimension::Columns)
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(grid, vec![vec!["Cost".to_owned(), "1200".to_owned(), "3".to_owned()]]);
    }

    #[tokio::test]
    async fn writes_row_range_raw() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v4/spreadsheets/ss1/values/'Budget'!A2:B2")
                    .query_param("valueInputOption", "RAW")
                    .json_body(json!({
                        "range": "'Budget'!A2:B2",
                        "majorDimension": "ROWS",
                        "values": [["Lease", "1300"]]
                    }));
                then.status(200).json_body(json!({"updatedCells": 2}));
            })
            .await;

        provider(&server)
            .write_range(
                "ss1",
                "'Budget'!A2:B2",
                vec![vec!["Lease".to_owned(), "1300".to_owned()]],
                ValueInputOption::Raw,
            )
            .await
            .unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn writes_cell_user_entered() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v4/spreadsheets/ss1/values/'Budget'!C2")
                    .query_param("valueInputOption", "USER_ENTERED")
                    .json_body(json!({
                        "range": "'Budget'!C2",
                        "majorDimension": "ROWS",
                        "values": [["=B2*2"]]
                    }));
                then.status(200).json_body(json!({"updatedCells": 1}));
            })
            .await;

        provider(&server)
            .write_range(
                "ss1",
                "'Budget'!C2",
                vec![vec!["=B2*2".to_owned()]],
                ValueInputOption::UserEntered,
            )
            .await
            .unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn row_update_keeps_leading_zeros() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v4/spreadsheets/ss1")
                    .query_param("fields", "sheets.properties");
                then.status(200).json_body(json!({"sheets": [
                    {"properties": {"sheetId": 0, "title": "S",
                        "gridProperties": {"rowCount": 100, "columnCount": 26}}}
                ]}));
            })
            .await;
        let raw = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v4/spreadsheets/ss1/values/'S'!A2:A2")
                    .query_param("valueInputOption", "RAW")
                    .json_body(json!({
                        "range": "'S'!A2:A2",
                        "majorDimension": "ROWS",
                        "values": [["007"]]
                    }));
                then.status(200).json_body(json!({"updatedCells": 1}));
            })
            .await;
        let user_entered = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/v4/spreadsheets/ss1/values/'S'!A2:A2")
                    .query_param("valueInputOption", "USER_ENTERED");
                then.status(200).json_body(json!({"updatedCells": 1}));
            })
            .await;

        let service = SheetsService::new(
            Arc::new(provider(&server)),
            ColumnLetter::parse("Z").unwrap(),
        );
        let echoed = service
            .update_row("ss1", "S", RowNumber::new(2).unwrap(), vec!["007".to_owned()])
            .await
            .unwrap();

        assert_eq!(echoed, vec!["007".to_owned()]);
        assert_eq!(raw.calls(), 1);
        assert_eq!(user_entered.calls(), 0);
    }

    #[tokio::test]
    async fn clears_range() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v4/spreadsheets/ss1/values/'Budget'!C7:clear")
                    .json_body(json!({}));
                then.status(200)
                    .json_body(json!({"clearedRange": "Budget!C7"}));
            })
            .await;

        provider(&server)
            .clear_range("ss1", "'Budget'!C7")
            .await
            .unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn deletes_row_by_sheet_id() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v4/spreadsheets/ss1:batchUpdate")
                    .json_body(json!({"requests": [{"deleteDimension": {"range": {
                        "sheetId": 991, "dimension": "ROWS", "startIndex": 4, "endIndex": 5
                    }}}]}));
                then.status(200).json_body(json!({"replies": [{}]}));
            })
            .await;

        provider(&server)
            .delete_dimension("ss1", 991, Dimension::Rows, 4)
            .await
            .unwrap();

        m.assert_async().await;
    }

    #[tokio::test]
    async fn provider_error_message_surfaces() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v4/spreadsheets/ss1:batchUpdate");
                then.status(400).json_body(json!({"error": {
                    "code": 400,
                    "message": "Invalid requests[0].deleteDimension: Cannot delete a row that doesn't exist.",
                    "status": "INVALID_ARGUMENT"
                }}));
            })
            .await;

        let err = provider(&server)
            .delete_dimension("ss1", 0, Dimension::Rows, 5000)
            .await
            .unwrap_err();

        match err {
            DomainError::Upstream { kind, message } => {
                assert_eq!(kind, UpstreamKind::InvalidRequest);
                assert!(message.contains("Cannot delete a row"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_spreadsheet_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v4/spreadsheets/nope");
                then.status(404).json_body(json!({"error": {
                    "code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"
                }}));
            })
            .await;

        let err = provider(&server).list_worksheets("nope").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Upstream {
                kind: UpstreamKind::NotFound,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Requested entity was not found.");
    }

    #[tokio::test]
    async fn undecodable_success_body_is_malformed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v4/spreadsheets/ss1");
                then.status(200).body("<html>captive portal</html>");
            })
            .await;

        let err = provider(&server).list_worksheets("ss1").await.unwrap_err();
        assert!(matches!(err, DomainError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn token_failure_skips_provider_call() {
        struct Broken;

        #[async_trait]
        impl AccessTokenProvider for Broken {
            async fn access_token(&self) -> Result<SecretString, sheets_auth::TokenError> {
                Err(sheets_auth::TokenError::Http(
                    "token exchange HTTP 400 Bad Request".to_owned(),
                ))
            }
        }

        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|_when, then| {
                then.status(200).json_body(json!({}));
            })
            .await;
        let config = SheetsConfig {
            sheets_base_url: server.base_url(),
            drive_base_url: server.base_url(),
            ..SheetsConfig::default()
        };
        let client = HttpClientBuilder::with_config(HttpClientConfig::for_testing())
            .build()
            .unwrap();
        let provider = GoogleSheetsProvider::new(client, Arc::new(Broken), &config).unwrap();

        let err = provider.list_spreadsheets().await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(_)));
        assert_eq!(m.calls(), 0);
    }

    #[test]
    fn rejects_non_hierarchical_base_url() {
        assert!(base_url("mailto:someone@example.com").is_err());
        assert!(base_url("not a url").is_err());
    }

    #[test]
    fn path_segments_are_encoded() {
        let base = Url::parse("https://sheets.googleapis.com").unwrap();
        let url = join(&base, &["v4", "spreadsheets", "id", "values", "'Q3 / Q4'!A1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/id/values/'Q3%20%2F%20Q4'!A1"
        );
    }
}
