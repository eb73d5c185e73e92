use crate::api::client::ApiClient;
use crate::api::models::{CurrentlyPlayingResponse, TokenGrant, TokenResponse};
use crate::config::ClientCredentials;
use crate::errors::{AuthExchangeError, UpstreamApiError};
use url::Url;

pub const AUTHORIZE_PATH: &str = "authorize";
pub const TOKEN_PATH: &str = "api/token";
pub const CURRENTLY_PLAYING_PATH: &str = "v1/me/player/currently-playing";

/// Builds the page the user is sent to in order to grant access.
pub fn authorize_url(
    accounts_url: &str,
    client: &ClientCredentials,
    scope: &str,
) -> Result<Url, url::ParseError> {
    let base = format!("{}/{}", accounts_url.trim_end_matches('/'), AUTHORIZE_PATH);
    Url::parse_with_params(
        &base,
        &[
            ("response_type", "code"),
            ("client_id", client.client_id.as_str()),
            ("scope", scope),
            ("redirect_uri", client.redirect_uri.as_str()),
        ],
    )
}

/// Exchanges an authorization code for an access/refresh token pair.
pub async fn exchange_authorization_code(
    api_client: &ApiClient,
    client: &ClientCredentials,
    code: &str,
) -> Result<TokenGrant, AuthExchangeError> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", client.redirect_uri.as_str()),
        ("client_id", client.client_id.as_str()),
        ("client_secret", client.client_secret.as_str()),
    ];

    request_grant(api_client, &form).await
}

/// Mints a new access token from a refresh token.
pub async fn exchange_refresh_token(
    api_client: &ApiClient,
    client: &ClientCredentials,
    refresh_token: &str,
) -> Result<TokenGrant, AuthExchangeError> {
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client.client_id.as_str()),
        ("client_secret", client.client_secret.as_str()),
    ];

    request_grant(api_client, &form).await
}

async fn request_grant(
    api_client: &ApiClient,
    form: &[(&str, &str)],
) -> Result<TokenGrant, AuthExchangeError> {
    let response: TokenResponse = api_client.post_form(TOKEN_PATH, form).await?;

    response.into_grant().map_err(|body| AuthExchangeError {
        status: Some(200),
        body,
    })
}

/// Fetches the user's current playback. `Ok(None)` means nothing is playing.
pub async fn fetch_currently_playing(
    api_client: &ApiClient,
    access_token: &str,
) -> Result<Option<CurrentlyPlayingResponse>, UpstreamApiError> {
    let playing = api_client
        .get_with_bearer(CURRENTLY_PLAYING_PATH, access_token)
        .await?;
    Ok(playing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{mock, Matcher};
    use serde_json::json;
    use serial_test::serial;
    use std::time::Duration;

    fn creds() -> ClientCredentials {
        ClientCredentials {
            client_id: "test-client-id".into(),
            client_secret: "test-secret".into(),
            redirect_uri: "http://127.0.0.1:5000/callback".into(),
        }
    }

    fn api_client() -> ApiClient {
        ApiClient::new(&mockito::server_url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_authorize_url_encodes_params() {
        let url = authorize_url(
            "https://accounts.example.com/",
            &creds(),
            "user-read-playback-state user-read-currently-playing",
        )
        .unwrap();

        assert_eq!(url.path(), "/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("client_id".into(), "test-client-id".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://127.0.0.1:5000/callback".into()
        )));
        assert!(pairs.contains(&(
            "scope".into(),
            "user-read-playback-state user-read-currently-playing".into()
        )));
    }

    #[tokio::test]
    #[serial]
    async fn test_exchange_authorization_code() {
        let m = mock("POST", "/api/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "code_123".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "http://127.0.0.1:5000/callback".into(),
                ),
                Matcher::UrlEncoded("client_id".into(), "test-client-id".into()),
                Matcher::UrlEncoded("client_secret".into(), "test-secret".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "access_token": "access_789",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "refresh_token": "refresh_101",
                    "scope": "user-read-currently-playing"
                })
                .to_string(),
            )
            .create();

        let grant = exchange_authorization_code(&api_client(), &creds(), "code_123")
            .await
            .expect("Expected Ok");

        assert_eq!(
            grant,
            TokenGrant {
                access_token: "access_789".into(),
                expires_in: 3600,
                refresh_token: Some("refresh_101".into()),
            }
        );
        m.assert();
    }

    #[tokio::test]
    #[serial]
    async fn test_exchange_refresh_token_without_rotation() {
        let _m = mock("POST", "/api/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "refresh_101".into()),
            ]))
            .with_status(200)
            .with_body(json!({ "access_token": "fresh", "expires_in": 1800 }).to_string())
            .create();

        let grant = exchange_refresh_token(&api_client(), &creds(), "refresh_101")
            .await
            .expect("Expected Ok");

        assert_eq!(grant.access_token, "fresh");
        assert_eq!(grant.expires_in, 1800);
        assert!(grant.refresh_token.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_expires_in_defaults_to_an_hour() {
        let _m = mock("POST", "/api/token")
            .with_status(200)
            .with_body(json!({ "access_token": "fresh" }).to_string())
            .create();

        let grant = exchange_refresh_token(&api_client(), &creds(), "r")
            .await
            .unwrap();
        assert_eq!(grant.expires_in, 3600);
    }

    #[tokio::test]
    #[serial]
    async fn test_rejected_exchange_carries_body() {
        let _m = mock("POST", "/api/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#)
            .create();

        let err = exchange_authorization_code(&api_client(), &creds(), "bad")
            .await
            .expect_err("Expected Err");

        assert_eq!(err.status, Some(400));
        assert!(err.body.contains("invalid_grant"));
    }

    #[tokio::test]
    #[serial]
    async fn test_response_without_access_token_is_rejected() {
        let _m = mock("POST", "/api/token")
            .with_status(200)
            .with_body(json!({ "expires_in": 3600, "refresh_token": "r2" }).to_string())
            .create();

        let err = exchange_refresh_token(&api_client(), &creds(), "r")
            .await
            .expect_err("Expected Err");

        assert_eq!(err.status, Some(200));
        assert!(err.body.contains("access_token"));
    }

    #[tokio::test]
    #[serial]
    async fn test_fetch_currently_playing_sends_bearer() {
        let m = mock("GET", "/v1/me/player/currently-playing")
            .match_header("authorization", "Bearer access_789")
            .with_status(200)
            .with_body(
                json!({
                    "is_playing": true,
                    "progress_ms": 1000,
                    "item": { "name": "Song", "artists": [{ "name": "A" }], "duration_ms": 2000 }
                })
                .to_string(),
            )
            .create();

        let playing = fetch_currently_playing(&api_client(), "access_789")
            .await
            .expect("Expected Ok")
            .expect("Expected content");

        assert!(playing.is_playing);
        assert_eq!(playing.progress_ms, Some(1000));
        assert_eq!(playing.item.unwrap().name, "Song");
        m.assert();
    }

    #[tokio::test]
    #[serial]
    async fn test_fetch_currently_playing_maps_errors() {
        let _m = mock("GET", "/v1/me/player/currently-playing")
            .with_status(401)
            .with_body(r#"{"error":{"status":401,"message":"The access token expired"}}"#)
            .create();

        let err = fetch_currently_playing(&api_client(), "stale")
            .await
            .expect_err("Expected Err");

        assert_eq!(err.status, Some(401));
        assert!(err.body.contains("access token expired"));
    }
}
