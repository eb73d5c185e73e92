use crate::api::models::TokenGrant;
use chrono::{DateTime, Duration, Utc};

/// Access tokens are treated as expired this many seconds before their
/// declared expiry.
pub const EXPIRY_MARGIN_SECS: i64 = 5;

/// The process-wide OAuth credential.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credential {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// What a credential is good for at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenState {
    Unauthenticated,
    Valid {
        access_token: String,
        expires_at: DateTime<Utc>,
    },
    /// The access token is missing or stale but a refresh token is known.
    Expired { refresh_token: String },
}

impl TokenState {
    pub fn label(&self) -> &'static str {
        match self {
            TokenState::Unauthenticated => "unauthenticated",
            TokenState::Valid { .. } => "valid",
            TokenState::Expired { .. } => "expired",
        }
    }
}

impl Credential {
    pub fn seeded(refresh_token: Option<String>) -> Self {
        Credential {
            refresh_token,
            ..Credential::default()
        }
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if let (Some(token), Some(expires_at)) = (&self.access_token, self.expires_at) {
            if now < expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) {
                return TokenState::Valid {
                    access_token: token.clone(),
                    expires_at,
                };
            }
        }

        match &self.refresh_token {
            Some(refresh_token) => TokenState::Expired {
                refresh_token: refresh_token.clone(),
            },
            None => TokenState::Unauthenticated,
        }
    }

    /// The credential that results from applying `grant` at `now`. A grant
    /// without a refresh token keeps the current one. A lifetime that cannot
    /// be represented expires immediately.
    pub fn with_grant(&self, grant: TokenGrant, now: DateTime<Utc>) -> Credential {
        let expires_at = Duration::try_seconds(grant.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(now);

        Credential {
            access_token: Some(grant.access_token),
            refresh_token: grant.refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: Some(expires_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(refresh: Option<&str>) -> TokenGrant {
        TokenGrant {
            access_token: "new-access".into(),
            expires_in: 3600,
            refresh_token: refresh.map(String::from),
        }
    }

    #[test]
    fn test_empty_credential_is_unauthenticated() {
        assert_eq!(
            Credential::default().state_at(Utc::now()),
            TokenState::Unauthenticated
        );
    }

    #[test]
    fn test_seeded_credential_needs_refresh() {
        let credential = Credential::seeded(Some("seed".into()));
        assert_eq!(
            credential.state_at(Utc::now()),
            TokenState::Expired {
                refresh_token: "seed".into()
            }
        );
    }

    #[test]
    fn test_valid_until_safety_margin() {
        let now = Utc::now();
        let credential = Credential {
            access_token: Some("a".into()),
            refresh_token: Some("r".into()),
            expires_at: Some(now + Duration::seconds(60)),
        };

        assert_eq!(credential.state_at(now).label(), "valid");
        // inside the margin
        assert_eq!(
            credential.state_at(now + Duration::seconds(56)).label(),
            "expired"
        );
        assert_eq!(
            credential.state_at(now + Duration::seconds(54)).label(),
            "valid"
        );
    }

    #[test]
    fn test_expired_without_refresh_token_is_unauthenticated() {
        let now = Utc::now();
        let credential = Credential {
            access_token: Some("a".into()),
            refresh_token: None,
            expires_at: Some(now - Duration::seconds(1)),
        };
        assert_eq!(credential.state_at(now), TokenState::Unauthenticated);
    }

    #[test]
    fn test_grant_rotates_refresh_token_when_present() {
        let now = Utc::now();
        let next = Credential::seeded(Some("old".into())).with_grant(grant(Some("rotated")), now);

        assert_eq!(next.access_token.as_deref(), Some("new-access"));
        assert_eq!(next.refresh_token.as_deref(), Some("rotated"));
        assert_eq!(next.expires_at, Some(now + Duration::seconds(3600)));
    }

    #[test]
    fn test_unrepresentable_lifetime_expires_immediately() {
        let now = Utc::now();
        let huge = TokenGrant {
            expires_in: i64::MAX,
            ..grant(None)
        };
        let next = Credential::default().with_grant(huge, now);
        assert_eq!(next.expires_at, Some(now));
    }

    #[test]
    fn test_grant_keeps_refresh_token_when_absent() {
        let next = Credential::seeded(Some("old".into())).with_grant(grant(None), Utc::now());
        assert_eq!(next.refresh_token.as_deref(), Some("old"));
    }
}
