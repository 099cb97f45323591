use axum::{
    Router,
    body::Body,
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
    middleware,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use std::any::Any;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tracing::{error, info};

use super::AppState;
use super::context::{REQUEST_ID_HEADER, RequestContext};
use super::error::error_response;
use super::handlers::{activity, cron, health, logs, status};
use super::static_files::static_file_handler;

const ALLOWED_METHODS: &str = "GET, OPTIONS";

fn build_open_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(cors::Any)
}

/// API routes plus the static fallback.
///
/// Layer order, outermost first: request context, preflight short-circuit,
/// CORS headers, panic boundary.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status::get_status))
        .route("/api/cron", get(cron::get_cron_jobs))
        .route("/api/activity", get(activity::get_activity))
        .route("/api/logs", get(logs::get_logs))
        .route("/api/sessions", get(status::get_sessions))
        .route("/api/health", get(health::get_health))
        .fallback(static_file_handler)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(build_open_cors())
        .layer(middleware::from_fn(preflight))
        .layer(middleware::from_fn(request_context))
}

async fn request_context(req: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::generate();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let mut response = ctx.clone().scope(next.run(req)).await;

    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        error!(request_id = %ctx.request_id, method = %method, path = %path, status, elapsed_ms, "request failed");
    } else {
        info!(request_id = %ctx.request_id, method = %method, path = %path, status, elapsed_ms, "request completed");
    }
    response
}

/// Any `OPTIONS` request is answered here and never reaches a handler.
async fn preflight(req: Request<Body>, next: Next) -> Response {
    if req.method() != Method::OPTIONS {
        return next.run(req).await;
    }
    let mut response = StatusCode::NO_CONTENT.into_response();
    apply_preflight_headers(response.headers_mut());
    response
}

fn apply_preflight_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(
        request_id = %RequestContext::current_id(),
        panic = %detail,
        "handler panicked"
    );
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
