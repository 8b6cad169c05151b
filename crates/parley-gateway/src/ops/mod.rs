//! Operational and discovery HTTP endpoints.
//!
//! - `/get-ws-endpoint` : where clients should open their socket
//! - `/healthz`         : liveness
//! - `/metrics`         : Prometheus text format

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::app_state::AppState;

pub async fn ws_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "endpoint": state.cfg().gateway.ws_endpoint() }))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics().render(),
    )
        .into_response()
}
