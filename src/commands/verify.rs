use crate::api::client::ApiClient;
use crate::auth::TokenManager;
use crate::config::Settings;
use crate::errors::{AppError, NotAuthenticatedError};
use crate::now_playing::fetch_playback_snapshot;
use colored::*;

/// Refreshes once with the configured refresh token and reports the result.
pub async fn execute(settings: &Settings) -> Result<(), AppError> {
    let Some(refresh_token) = settings.refresh_token.clone() else {
        return Err(NotAuthenticatedError::no_refresh_token().into());
    };

    let accounts = ApiClient::new(&settings.accounts_url, settings.request_timeout)?;
    let tokens = TokenManager::new(accounts, settings.client_credentials(), None);

    let credential = match tokens.refresh_access_token(&refresh_token).await {
        Ok(credential) => credential,
        Err(e) => {
            println!();
            println!("{} {}", "Refresh failed:".red().bold(), e);
            return Err(e.into());
        }
    };

    println!();
    println!("{}", "Refresh token is valid.".green().bold());
    if let Some(expires_at) = credential.expires_at {
        println!("Access token expires at {}", expires_at.to_rfc3339());
    }
    if credential.refresh_token.as_deref() != Some(refresh_token.as_str()) {
        println!(
            "{} Spotify rotated the refresh token; update SPOTIFY_REFRESH_TOKEN:",
            "note:".yellow().bold()
        );
        println!("{}", credential.refresh_token.unwrap_or_default());
    }

    // Exercise the player scope too
    let player = ApiClient::new(&settings.api_url, settings.request_timeout)?;
    let access_token = credential.access_token.unwrap_or_default();
    let snapshot = fetch_playback_snapshot(&player, &access_token).await?;
    match snapshot.song {
        Some(ref song) => println!(
            "Now playing: {} ({}/{}){}",
            song,
            snapshot.progress(),
            snapshot.duration(),
            if snapshot.is_playing { "" } else { " [paused]" }
        ),
        None => println!("Nothing is playing right now."),
    }

    Ok(())
}
