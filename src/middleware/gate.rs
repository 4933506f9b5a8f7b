use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::response::redirect_found;
use crate::app::AppState;
use crate::gate::{Decision, Principal};

/// Applies the route gate to navigation requests.
///
/// Paths outside the matcher pass straight through. Matched paths either
/// continue to the page or get a 302 to wherever the rules send them.
pub async fn gate_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    // Missing principal means the session layer did not run: treat as anonymous
    let principal = request
        .extensions()
        .get::<Principal>()
        .cloned()
        .unwrap_or_default();

    let Some(verdict) = state.gate.check(&path, &principal) else {
        return next.run(request).await;
    };

    match verdict.decision {
        Decision::Continue => next.run(request).await,
        Decision::RedirectTo(target) => {
            tracing::debug!(
                path = %path,
                principal = %principal,
                rule = %verdict.rule,
                "Redirecting to {}",
                target
            );
            redirect_found(&target)
        }
    }
}
