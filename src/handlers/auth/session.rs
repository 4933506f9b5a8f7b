use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};

use super::{attach_cookie, expired_cookie};
use crate::app::AppState;
use crate::auth::Session;
use crate::middleware::redirect_found;

/// GET /api/auth/session - the session as the session layer resolved it
pub async fn session_get(session: Option<Extension<Session>>) -> Json<Session> {
    Json(session.map(|Extension(s)| s).unwrap_or_default())
}

/// POST /api/auth/logout - drop the session cookie and go back to the storefront
pub async fn logout_post(State(state): State<AppState>, session: Option<Extension<Session>>) -> Response {
    if let Some(Extension(session)) = &session {
        if session.is_authenticated() {
            tracing::info!(principal = %session.principal(), "Session ended");
        }
    }

    let response = redirect_found(&state.gate.table().storefront_home);
    attach_cookie(response, &expired_cookie(&state.cookie)).unwrap_or_else(|e| e.into_response())
}
