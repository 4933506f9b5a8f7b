use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenSigner;
use crate::backend::CredentialsProvider;
use crate::config::AppConfig;
use crate::gate::RouteGate;
use crate::handlers;
use crate::middleware::{gate_middleware, session_middleware};

/// How the session cookie is written.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

/// Shared state handed to middleware and handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<RouteGate>,
    pub signer: Arc<TokenSigner>,
    pub credentials: Arc<dyn CredentialsProvider>,
    pub cookie: CookieSettings,
}

impl AppState {
    pub fn new(gate: RouteGate, signer: TokenSigner, credentials: Arc<dyn CredentialsProvider>, cookie: CookieSettings) -> Self {
        Self {
            gate: Arc::new(gate),
            signer: Arc::new(signer),
            credentials,
            cookie,
        }
    }
}

/// Router with the session and gate middleware in place.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(auth_routes())
        // Everything else is a page; the gate decides whether it renders
        .fallback(handlers::page)
        // Layers run bottom-up: the session is resolved before the gate looks at it
        .layer(from_fn_with_state(state.clone(), gate_middleware))
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .with_state(state)
}

/// Outer layers that depend on deployment configuration.
pub fn with_http_layers(router: Router, config: &AppConfig) -> Router {
    let router = if config.security.enable_cors {
        router.layer(cors_layer(&config.security.cors_origins))
    } else {
        router
    };
    router.layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/session", get(auth::session_get))
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/logout", post(auth::logout_post))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
}
