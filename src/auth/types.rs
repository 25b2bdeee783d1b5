// Authentication types

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;

use crate::error::AuthError;

/// Number of token characters shown in logs and status output
const TOKEN_PREVIEW_CHARS: usize = 20;

/// HTTP Basic credentials presented to the STS server
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token held by the token manager
///
/// Replaced wholesale on every refresh.
#[derive(Clone)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime reported by STS, in seconds
    pub expires_in: i64,
    /// `issued + expires_in - threshold`
    pub refresh_at: DateTime<Utc>,
}

impl Token {
    /// Build a token from an STS response received at `now`
    ///
    /// Fails when `expires_in` does not fit a representable refresh time.
    pub fn from_response(
        response: StsTokenResponse,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> Result<Self, AuthError> {
        let refresh_at = Duration::try_seconds(response.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .and_then(|expiry| expiry.checked_sub_signed(threshold))
            .ok_or_else(|| {
                AuthError::InvalidResponse(format!(
                    "expires_in out of range: {}",
                    response.expires_in
                ))
            })?;

        Ok(Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            refresh_at,
        })
    }

    /// Whether the refresh time has been reached
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now >= self.refresh_at
    }

    /// Value for the `Authorization` header
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// Leading characters of the access token, for display
    pub fn preview(&self) -> String {
        let shown: String = self.access_token.chars().take(TOKEN_PREVIEW_CHARS).collect();
        if shown.len() < self.access_token.len() {
            format!("{}...", shown)
        } else {
            shown
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &self.preview())
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_at", &self.refresh_at)
            .finish()
    }
}

/// STS token response
#[derive(Deserialize)]
pub struct StsTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// STS error response
#[derive(Debug, Deserialize)]
pub struct StsErrorResponse {
    pub error: Option<String>,
    pub error_description: Option<String>,
}
