use crate::api::client::ApiClient;
use crate::api::endpoints::authorize_url;
use crate::auth::callback_server::CallbackParams;
use crate::auth::{TokenManager, TokenState};
use crate::now_playing::{fetch_playback_snapshot, PlaybackSnapshot};
use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{net::SocketAddr, sync::Arc};

/// Everything the bridge routes need, shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenManager>,
    /// Client for the Web API (`api_url`), not the accounts service.
    pub player: ApiClient,
    pub accounts_url: String,
    pub scope: String,
    /// A refresh token came from configuration, so the operator already has it.
    pub seeded_refresh_token: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/nowplaying", get(now_playing))
        .route("/health", get(health))
        .layer(Extension(state))
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "bridge listening");
    axum::serve(listener, router(state)).await
}

#[derive(Serialize, Debug)]
struct NowPlayingBody {
    is_playing: bool,
    song: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<String>,
}

impl From<&PlaybackSnapshot> for NowPlayingBody {
    fn from(snapshot: &PlaybackSnapshot) -> Self {
        let timing = snapshot.song.is_some();
        NowPlayingBody {
            is_playing: snapshot.is_playing,
            song: snapshot.song.clone(),
            progress: timing.then(|| snapshot.progress()),
            duration: timing.then(|| snapshot.duration()),
        }
    }
}

#[derive(Serialize, Debug)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

fn error_response(status: StatusCode, error: &'static str, detail: String) -> Response {
    (status, Json(ErrorBody { error, detail })).into_response()
}

async fn index() -> Html<&'static str> {
    Html(
        "<h3>Spotify Bridge</h3>\
         <ul>\
         <li><a href='/login'>Login with Spotify</a> (one-time, to get a refresh token)</li>\
         <li><a href='/nowplaying'>/nowplaying</a> (JSON output)</li>\
         </ul>\
         <p>If SPOTIFY_REFRESH_TOKEN is already set for this service, you don't need to log in.</p>",
    )
}

async fn login(Extension(state): Extension<AppState>) -> Response {
    match authorize_url(&state.accounts_url, state.tokens.client(), &state.scope) {
        Ok(url) => Redirect::temporary(url.as_str()).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "could not build authorize URL");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Invalid accounts_url: {e}"),
            )
                .into_response()
        }
    }
}

async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<AppState>,
) -> Response {
    if let Some(error) = params.error {
        return (
            StatusCode::BAD_REQUEST,
            Html(format!("Spotify returned error: {}", escape_html(&error))),
        )
            .into_response();
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "No code in callback").into_response();
    };

    match state.tokens.exchange_code_for_token(&code).await {
        Ok(credential) if !state.seeded_refresh_token => {
            let refresh_token = credential.refresh_token.unwrap_or_default();
            Html(format!(
                "<h3>Authenticated. Save this refresh token in the \
                 <code>SPOTIFY_REFRESH_TOKEN</code> environment variable</h3>\
                 <pre>{}</pre>\
                 <p>Restart the service afterwards so it survives redeploys.</p>",
                escape_html(&refresh_token)
            ))
            .into_response()
        }
        Ok(_) => Html(
            "<h3>Authenticated.</h3>\
             <p>A refresh token is already configured for this service.</p>",
        )
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("Token exchange failed: {}", escape_html(&e.body))),
        )
            .into_response(),
    }
}

async fn now_playing(Extension(state): Extension<AppState>) -> Response {
    let access_token = match state.tokens.ensure_valid_access_token().await {
        Ok(token) => token,
        Err(e) => {
            return error_response(StatusCode::UNAUTHORIZED, "not_authenticated", e.to_string())
        }
    };

    match fetch_playback_snapshot(&state.player, &access_token).await {
        Ok(snapshot) => Json(NowPlayingBody::from(&snapshot)).into_response(),
        Err(e) => {
            tracing::warn!(status = ?e.status, "currently-playing call failed");
            let status = e
                .status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            error_response(status, "spotify_api_error", e.body)
        }
    }
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
    token_state: &'static str,
    has_refresh_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

async fn health(Extension(state): Extension<AppState>) -> Json<HealthBody> {
    let credential = state.tokens.credential().await;
    let token_state = credential.state_at(Utc::now());
    let expires_at = match &token_state {
        TokenState::Valid { expires_at, .. } => Some(*expires_at),
        _ => None,
    };

    Json(HealthBody {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        token_state: token_state.label(),
        has_refresh_token: credential.refresh_token.is_some(),
        expires_at,
    })
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
