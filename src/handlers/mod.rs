// handlers/mod.rs - page placeholder, health and session endpoints
//
// Pages themselves are rendered elsewhere; this service only decides whether
// a navigation request may reach one. The page handler stands in for the
// renderer so the gate has something to pass requests through to.

pub mod auth;

use axum::{http::Uri, Extension};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::gate::{canonical_path, Principal};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /health - liveness probe, outside the gate's matcher
pub async fn health() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}

/// Fallback for every path without its own route.
///
/// Unknown `/api/*` paths are 404s; anything else is treated as a page the
/// gate already let through.
pub async fn page(uri: Uri, principal: Option<Extension<Principal>>) -> ApiResult<Value> {
    // Same form of the path the gate decided on
    let path = canonical_path(uri.path());
    if path == "/api" || path.starts_with("/api/") {
        return Err(ApiError::not_found(format!("No API endpoint at {}", path)));
    }

    let principal = principal.map(|Extension(p)| p).unwrap_or_default();
    Ok(ApiResponse::success(json!({
        "page": path,
        "principal": principal,
    })))
}
