use crate::api::client::ApiClient;
use crate::auth::TokenManager;
use crate::config::Settings;
use crate::errors::AppError;
use crate::server::{self, AppState};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Runs the bridge until the process is stopped.
pub async fn execute(
    settings: &Settings,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), AppError> {
    let host = host.unwrap_or_else(|| settings.host.clone());
    let ip: IpAddr = host
        .parse()
        .map_err(|e| AppError::Other(format!("Invalid host `{host}`: {e}")))?;
    let addr = SocketAddr::new(ip, port.unwrap_or(settings.port));

    let state = build_state(settings)?;
    if state.seeded_refresh_token {
        tracing::info!("refresh token loaded from configuration");
    } else {
        tracing::info!("no refresh token configured; visit /login to authorize");
    }

    server::serve(addr, state).await?;
    Ok(())
}

fn build_state(settings: &Settings) -> Result<AppState, AppError> {
    let accounts = ApiClient::new(&settings.accounts_url, settings.request_timeout)?;
    let player = ApiClient::new(&settings.api_url, settings.request_timeout)?;

    let tokens = TokenManager::new(
        accounts,
        settings.client_credentials(),
        settings.refresh_token.clone(),
    );

    Ok(AppState {
        tokens: Arc::new(tokens),
        player,
        accounts_url: settings.accounts_url.clone(),
        scope: settings.scope.clone(),
        seeded_refresh_token: settings.refresh_token.is_some(),
    })
}
