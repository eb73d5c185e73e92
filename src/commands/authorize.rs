use crate::api::client::ApiClient;
use crate::api::endpoints::authorize_url;
use crate::auth::callback_server;
use crate::auth::TokenManager;
use crate::config::Settings;
use crate::errors::AppError;
use crate::utils::spinner::Spinner;
use colored::*;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::oneshot;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the authorization-code flow against a local callback and prints the
/// refresh token to store in `SPOTIFY_REFRESH_TOKEN`.
pub async fn execute(settings: &Settings, port: u16) -> Result<(), AppError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let mut client = settings.client_credentials();
    client.redirect_uri = format!("http://{addr}/callback");

    // spawn callback server
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = callback_server::start_callback_server(addr, tx).await {
            eprintln!("Callback server error: {e}");
        }
    });

    let url = authorize_url(&settings.accounts_url, &client, &settings.scope)
        .map_err(|e| AppError::Other(format!("Invalid accounts_url: {e}")))?;

    println!("\nOpening your browser to authorize with Spotify.");
    println!("If it does not open, visit:\n  {}\n", url.as_str().underline());
    if webbrowser::open(url.as_str()).is_err() {
        tracing::warn!("could not open a browser");
    }

    // wait for callback
    let code = Spinner::new()
        .wait_for(rx, CALLBACK_TIMEOUT)
        .await
        .ok_or(AppError::Callback)?
        .map_err(|e| AppError::Other(format!("Spotify returned error: {e}")))?;

    // exchange for token
    let accounts = ApiClient::new(&settings.accounts_url, settings.request_timeout)?;
    let tokens = TokenManager::new(accounts, client, None);
    let credential = tokens.exchange_code_for_token(&code).await?;

    let Some(refresh_token) = credential.refresh_token else {
        return Err(AppError::Other(
            "Spotify did not return a refresh token".into(),
        ));
    };

    println!("{}", "Authentication successful!".green().bold());
    println!("\nStore this refresh token as SPOTIFY_REFRESH_TOKEN:\n");
    println!("{refresh_token}");
    Ok(())
}
