//! HTTP serving: middleware stack, CORS and the accept loop.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Request, Response, StatusCode, header};
use axum::middleware::{Next, from_fn};
use axum::response::IntoResponse;
use sheets_gateway::api::rest::error::{REQUEST_ID_HEADER, request_trace_id};
use sheets_gateway::errors::ErrorCode;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;
use tracing::warn;

use crate::config::ServerConfig;

/// Build a CORS layer allowing the configured origins with any method and
/// header.
pub fn build_cors_layer(cfg: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if cfg.cors_allowed_origins.iter().any(|o| o == "*") {
        warn!(
            "CORS is configured with allowed_origins=['*']. \
             Any website can make cross-origin requests to the API."
        );
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cfg
        .cors_allowed_origins
        .iter()
        .filter_map(|s| match HeaderValue::from_str(s) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %s, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                let rid = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(|res: &Response<Body>, latency: Duration, span: &tracing::Span| {
                span.record("status", res.status().as_u16());
                span.record("latency_ms", latency.as_millis());
            }),
    )
}

fn is_problem_response(response: &Response<Body>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/problem+json"))
}

/// Give middleware-generated timeout and body-limit rejections a Problem
/// body. Handler Problems pass through untouched.
async fn error_mapping_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let instance = request.uri().path().to_owned();
    let trace_id = request_trace_id(request.headers());

    let response = next.run(request).await;
    if response.status().is_success() || is_problem_response(&response) {
        return response;
    }

    let (code, detail) = match response.status() {
        StatusCode::GATEWAY_TIMEOUT => (
            ErrorCode::RequestTimeout,
            "The request did not complete within the server deadline",
        ),
        StatusCode::PAYLOAD_TOO_LARGE => (
            ErrorCode::PayloadTooLarge,
            "The request body exceeds the configured limit",
        ),
        _ => return response,
    };
    warn!(
        status = response.status().as_u16(),
        path = %instance,
        "request rejected by middleware"
    );
    code.with_context(detail, &instance, trace_id).into_response()
}

/// Wrap `router` in the server middleware.
///
/// Runtime order, outermost first: `SetRequestId` -> `PropagateRequestId` ->
/// Trace -> `ErrorMapping` -> Timeout -> `BodyLimit` -> CORS -> router.
pub fn apply_middleware_stack(mut router: Router, cfg: &ServerConfig) -> Router {
    // Layers are registered innermost first.
    if cfg.cors_enabled {
        router = router.layer(build_cors_layer(cfg));
    }

    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
    router = router.layer(DefaultBodyLimit::max(cfg.body_limit_bytes));

    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        Duration::from_secs(cfg.request_timeout_secs),
    ));

    router = router.layer(from_fn(error_mapping_middleware));

    router = apply_trace_layer(router);

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}

/// Bind `addr` and serve until `shutdown` resolves, then drain in-flight
/// requests.
///
/// # Errors
/// Bind failure or a fatal accept-loop error.
pub async fn serve<F>(addr: SocketAddr, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
