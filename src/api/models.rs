use serde::Deserialize;

/// Token endpoint response. Every field is optional on the wire; validation
/// happens when it is turned into a `TokenGrant`.
#[derive(Deserialize, Debug)]
#[allow(unused)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

// Spotify sends `null` for fields it has no value for, so everything here is
// optional and defaulted by the reader.
#[derive(Deserialize, Debug)]
pub struct CurrentlyPlayingResponse {
    pub is_playing: Option<bool>,
    pub progress_ms: Option<u64>,
    pub item: Option<Track>,
}

#[derive(Deserialize, Debug)]
pub struct Track {
    pub name: Option<String>,
    pub artists: Option<Vec<Artist>>,
    pub duration_ms: Option<u64>,
}

#[derive(Deserialize, Debug)]
pub struct Artist {
    pub name: Option<String>,
}

/// A token response that carried everything we need.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Spotify omits `expires_in` only in malformed responses; one hour is its
    /// documented lifetime.
    pub const DEFAULT_EXPIRES_IN: i64 = 3600;

    /// Longest token lifetime accepted from the server.
    pub const MAX_EXPIRES_IN: i64 = 86_400;

    /// Validates the response. The error names what was wrong with it.
    pub fn into_grant(self) -> Result<TokenGrant, String> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or("token response did not include an access_token")?;

        let expires_in = self.expires_in.unwrap_or(Self::DEFAULT_EXPIRES_IN);
        if !(1..=Self::MAX_EXPIRES_IN).contains(&expires_in) {
            return Err(format!(
                "token response has an invalid expires_in: {expires_in}"
            ));
        }

        Ok(TokenGrant {
            access_token,
            expires_in,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
        })
    }
}
