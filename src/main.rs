mod config;
mod plaid;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use config::AppConfig;
use plaid::{PlaidClient, PlaidConfig};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid app config");
    let plaid_config = PlaidConfig::from_env().expect("invalid plaid config");

    if config.uses_default_secret() {
        tracing::warn!("SESSION_SECRET not set; cookies are signed with the built-in default");
    }
    if config.app_password.is_empty() {
        tracing::warn!("APP_PASSWORD not set; every login will fail");
    }
    if plaid_config.is_configured() {
        tracing::info!(env = plaid_config.environment.as_str(), "plaid client initialized");
    } else {
        tracing::warn!("PLAID_CLIENT_ID or PLAID_SECRET missing; bank linking disabled");
    }

    let plaid = PlaidClient::new(&plaid_config).expect("plaid http client build failed");
    let port = config.port;
    let state = state::AppState::new(config, plaid_config, Arc::new(plaid));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "moneyhub listening");
    axum::serve(listener, app).await.expect("server failed");
}
