use crate::api::client::ApiClient;
use crate::api::endpoints::{exchange_authorization_code, exchange_refresh_token};
use crate::api::models::TokenGrant;
use crate::auth::{Credential, TokenState};
use crate::config::ClientCredentials;
use crate::errors::{AuthExchangeError, NotAuthenticatedError};
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

/// Owns the OAuth credential and keeps the access token fresh.
///
/// Readers take a snapshot under the read lock; exchanges build the next
/// `Credential` and swap it in whole, so nobody sees a token paired with
/// another token's expiry.
pub struct TokenManager {
    api_client: ApiClient,
    client: ClientCredentials,
    credential: RwLock<Credential>,
    // Serializes refreshes so concurrent callers share one in-flight exchange.
    refresh_gate: Mutex<()>,
}

impl TokenManager {
    /// `api_client` must point at the accounts service.
    pub fn new(
        api_client: ApiClient,
        client: ClientCredentials,
        refresh_token: Option<String>,
    ) -> Self {
        Self::from_credential(api_client, client, Credential::seeded(refresh_token))
    }

    pub fn from_credential(
        api_client: ApiClient,
        client: ClientCredentials,
        credential: Credential,
    ) -> Self {
        TokenManager {
            api_client,
            client,
            credential: RwLock::new(credential),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &ClientCredentials {
        &self.client
    }

    pub async fn credential(&self) -> Credential {
        self.credential.read().await.clone()
    }

    pub async fn state(&self) -> TokenState {
        self.credential.read().await.state_at(Utc::now())
    }

    /// Exchanges an authorization code and stores the resulting tokens.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<Credential, AuthExchangeError> {
        let grant = exchange_authorization_code(&self.api_client, &self.client, code)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "authorization code exchange failed"))?;

        let credential = self.store(grant).await;
        tracing::info!("authorization code exchanged for a new token pair");
        Ok(credential)
    }

    /// Mints a new access token. The stored refresh token changes only when
    /// the server rotates it.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<Credential, AuthExchangeError> {
        let grant = exchange_refresh_token(&self.api_client, &self.client, refresh_token)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "access token refresh failed"))?;

        let rotated = grant.refresh_token.is_some();
        let credential = self.store(grant).await;
        tracing::info!(rotated, expires_at = ?credential.expires_at, "access token refreshed");
        Ok(credential)
    }

    /// Returns a usable access token, refreshing it first when needed.
    pub async fn ensure_valid_access_token(&self) -> Result<String, NotAuthenticatedError> {
        if let TokenState::Valid { access_token, .. } = self.state().await {
            tracing::debug!("using cached access token");
            return Ok(access_token);
        }

        let _gate = self.refresh_gate.lock().await;

        // Whoever held the gate before us may already have refreshed
        match self.state().await {
            TokenState::Valid { access_token, .. } => Ok(access_token),
            TokenState::Expired { refresh_token } => self
                .refresh_access_token(&refresh_token)
                .await
                .map(|credential| credential.access_token.unwrap_or_default())
                .map_err(NotAuthenticatedError::refresh_failed),
            TokenState::Unauthenticated => Err(NotAuthenticatedError::no_refresh_token()),
        }
    }

    async fn store(&self, grant: TokenGrant) -> Credential {
        let mut guard = self.credential.write().await;
        let next = guard.with_grant(grant, Utc::now());
        *guard = next.clone();
        next
    }
}
