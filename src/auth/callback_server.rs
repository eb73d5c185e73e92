use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::{oneshot, Mutex};

/// What the authorization server put on the redirect.
pub type CallbackOutcome = Result<String, String>;

#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Serves `/callback` on `addr` and forwards the first outcome to `tx`.
pub async fn start_callback_server(
    addr: SocketAddr,
    tx: oneshot::Sender<CallbackOutcome>,
) -> Result<(), std::io::Error> {
    // Wrap the Sender in an Arc<Mutex<Option<Sender>>> for safe sharing and ownership transfer
    let shared_tx = Arc::new(Mutex::new(Some(tx)));

    let app = Router::new().route(
        "/callback",
        get({
            let shared_tx = Arc::clone(&shared_tx);
            move |Query(params): Query<CallbackParams>| handle_callback(params, shared_tx)
        }),
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::debug!(%addr, "callback server listening");
    axum::serve(listener, app).await
}

async fn handle_callback(
    params: CallbackParams,
    shared_tx: Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>,
) -> impl IntoResponse {
    let (status, outcome, heading) = match (params.code, params.error) {
        (_, Some(error)) => (
            StatusCode::BAD_REQUEST,
            Err(error),
            "Spotify denied the authorization request",
        ),
        (Some(code), None) if !code.is_empty() => (
            StatusCode::OK,
            Ok(code),
            "Authorization received",
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Err("no code in callback".to_string()),
            "No code provided",
        ),
    };

    if let Some(tx) = shared_tx.lock().await.take() {
        let _ = tx.send(outcome);
    }

    (status, Html(page(heading)))
}

fn page(heading: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>nowplaying-bridge</title>
    <style type="text/css">
        body {{
            color: #1B1F23;
            background: #F6F8FA;
            font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif;
            max-width: 620px;
            margin: 28px auto;
            text-align: center;
        }}
        .box {{ border: 1px solid #E1E4E8; background: white; padding: 24px; }}
    </style>
</head>
<body>
    <div class="box">
        <h1>{heading}</h1>
        <p>You may now close this tab and return to the terminal.</p>
    </div>
</body>
</html>"#
    )
}
