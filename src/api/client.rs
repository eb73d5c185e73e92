use crate::api::errors::ApiError;
use crate::user_agent::generate_user_agent;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin wrapper over a reqwest client bound to one base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(generate_user_agent())
            .timeout(timeout)
            .build()
            .map_err(ApiError::from_reqwest)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// POSTs a form-encoded body and decodes a JSON success response.
    pub async fn post_form<T>(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(endpoint))
            .form(form)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        if response.status().is_success() {
            response.json::<T>().await.map_err(ApiError::from_reqwest)
        } else {
            Err(status_error(response).await)
        }
    }

    /// GETs with a bearer token. `204 No Content` yields `Ok(None)`; any other
    /// status than 200 is an error.
    pub async fn get_with_bearer<T>(&self, endpoint: &str, token: &str) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.url(endpoint))
            .bearer_auth(token)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(ApiError::from_reqwest),
            _ => Err(status_error(response).await),
        }
    }
}

async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| {
        status
            .canonical_reason()
            .unwrap_or("Unexpected Error")
            .to_string()
    });

    ApiError::Status {
        status: status.as_u16(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{mock, Matcher};
    use serde_json::{json, Value};
    use serial_test::serial;

    fn client() -> ApiClient {
        ApiClient::new(&mockito::server_url(), Duration::from_secs(5)).expect("client")
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let api_client = ApiClient::new("http://localhost:9/", Duration::from_secs(1)).unwrap();
        assert_eq!(api_client.base_url, "http://localhost:9");
        assert_eq!(api_client.url("/api/token"), "http://localhost:9/api/token");
        assert_eq!(api_client.url("api/token"), "http://localhost:9/api/token");
    }

    #[tokio::test]
    #[serial]
    async fn test_post_form_sends_urlencoded_body() {
        let m = mock("POST", "/form")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("a".into(), "1".into()),
                Matcher::UrlEncoded("b".into(), "two words".into()),
            ]))
            .with_status(200)
            .with_body(json!({ "ok": true }).to_string())
            .create();

        let got: Value = client()
            .post_form("form", &[("a", "1"), ("b", "two words")])
            .await
            .expect("Expected Ok");

        assert_eq!(got["ok"], true);
        m.assert();
    }

    #[tokio::test]
    #[serial]
    async fn test_post_form_maps_error_status_with_body() {
        let _m = mock("POST", "/form")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create();

        let err = client()
            .post_form::<Value>("form", &[])
            .await
            .expect_err("Expected Err");

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.into_detail(), r#"{"error":"invalid_grant"}"#);
    }

    #[tokio::test]
    #[serial]
    async fn test_get_with_bearer_no_content() {
        let _m = mock("GET", "/thing")
            .match_header("authorization", "Bearer tok")
            .with_status(204)
            .create();

        let got: Option<Value> = client().get_with_bearer("thing", "tok").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_get_with_bearer_rejects_other_success_codes() {
        let _m = mock("GET", "/thing").with_status(202).with_body("queued").create();

        let err = client()
            .get_with_bearer::<Value>("thing", "tok")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(202));
    }

    #[tokio::test]
    #[serial]
    async fn test_decode_failure_is_reported() {
        let _m = mock("GET", "/thing")
            .with_status(200)
            .with_body("not json")
            .create();

        let err = client()
            .get_with_bearer::<Value>("thing", "tok")
            .await
            .unwrap_err();
        assert!(err.status().is_none());
    }
}
