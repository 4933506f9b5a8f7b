use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::resolve_session;

/// Resolves the caller's session and stores both the `Session` and its
/// `Principal` in the request extensions.
///
/// A missing or invalid token is not an error here; the request simply
/// carries an anonymous session.
pub async fn session_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = resolve_session(request.headers(), &state.signer, &state.cookie.name);
    let principal = session.principal();

    request.extensions_mut().insert(principal);
    request.extensions_mut().insert(session);

    next.run(request).await
}
