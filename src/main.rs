use std::sync::Arc;

use anyhow::Context;
use hiimart_store::{
    app::{self, AppState, CookieSettings},
    auth::TokenSigner,
    backend::BackendClient,
    config,
    gate::RouteGate,
    is_production, telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up AUTH_SECRET, BACKEND_URL, etc.
    let _ = dotenvy::dotenv();

    telemetry::init();

    let config = config::config();
    tracing::info!("Starting Hiimart Store gate in {:?} mode", config.environment);

    let table = config.route_table().context("failed to load route tables")?;
    for gap in table.coverage_gaps() {
        tracing::warn!("Served page {} is not in any route table; signed-in visitors will be redirected", gap);
    }
    let gate = RouteGate::new(table).context("invalid route tables")?;

    let signer = TokenSigner::from_config(&config.security);
    if !signer.has_secret() {
        tracing::warn!("AUTH_SECRET is not set; every request will be treated as anonymous");
    }
    if is_production!() && !config.security.secure_cookies {
        tracing::warn!("Session cookies are not marked Secure in production");
    }

    let backend = BackendClient::from_config(&config.backend).context("invalid backend configuration")?;

    let state = AppState::new(
        gate,
        signer,
        Arc::new(backend),
        CookieSettings {
            name: config.security.session_cookie.clone(),
            secure: config.security.secure_cookies,
        },
    );
    let app = app::with_http_layers(app::router(state), config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Hiimart Store gate listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
