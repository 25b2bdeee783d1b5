use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use std::cell::RefCell;
use std::fmt;

use super::sts;
use super::types::{Credentials, Token};
use crate::error::AuthError;

/// Default token refresh threshold in seconds (5 minutes)
pub const DEFAULT_REFRESH_THRESHOLD_SECS: u64 = 300;

/// QNXT environment id header
pub const ENV_ID_HEADER: HeaderName = HeaderName::from_static("x-tz-envid");

/// Source of request headers for QNXT resource calls
pub trait HeaderProvider {
    /// Headers for the next request, authorization included
    fn headers(&self) -> Result<HeaderMap, AuthError>;
}

/// Time source used for expiry checks
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Token manager
/// Owns a single STS token and lazily refreshes it before expiry
///
/// Single-threaded: the token sits in a `RefCell`, so the manager is `!Sync`
/// and is shared between resource clients through an `Rc`.
pub struct TokenManager {
    /// Full STS token URL
    sts_url: String,

    /// Credentials presented to STS
    credentials: Credentials,

    /// Seconds subtracted from the token lifetime
    refresh_threshold: Duration,

    /// `Accept` and `x-TZ-EnvId`, sent to STS and on every API call
    base_headers: HeaderMap,

    /// HTTP client for token requests
    client: Client,

    clock: Box<dyn Clock>,

    /// Current token, `None` until the first request
    token: RefCell<Option<Token>>,
}

impl TokenManager {
    /// Create a token manager for an STS server and QNXT environment
    ///
    /// No request is made until headers are first asked for.
    pub fn new(
        sts_server: &str,
        env_id: &str,
        credentials: Credentials,
        refresh_threshold_secs: u64,
    ) -> Result<Self, AuthError> {
        let mut base_headers = HeaderMap::new();
        base_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        base_headers.insert(
            ENV_ID_HEADER,
            HeaderValue::from_str(env_id)
                .map_err(|_| AuthError::InvalidHeader(format!("x-TZ-EnvId: {:?}", env_id)))?,
        );

        let refresh_threshold = i64::try_from(refresh_threshold_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or(AuthError::InvalidThreshold(refresh_threshold_secs))?;

        let client = Client::builder().build().map_err(AuthError::Transport)?;

        Ok(Self {
            sts_url: sts::sts_url(sts_server),
            credentials,
            refresh_threshold,
            base_headers,
            client,
            clock: Box::new(SystemClock),
            token: RefCell::new(None),
        })
    }

    /// Use a specific HTTP client for token requests
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Use a specific time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn sts_url(&self) -> &str {
        &self.sts_url
    }

    pub fn refresh_threshold(&self) -> Duration {
        self.refresh_threshold
    }

    /// Check if a token must be fetched before the next request
    pub fn needs_refresh(&self) -> bool {
        match self.token.borrow().as_ref() {
            None => true,
            Some(token) => token.needs_refresh(self.clock.now()),
        }
    }

    /// Fetch a new token from STS and replace the current one
    pub fn refresh(&self) -> Result<(), AuthError> {
        tracing::debug!("Refreshing QNXT access token...");

        let response = sts::request_token(
            &self.client,
            &self.sts_url,
            &self.base_headers,
            &self.credentials,
        )?;

        let token = Token::from_response(response, self.clock.now(), self.refresh_threshold)?;

        if token.expires_in <= self.refresh_threshold.num_seconds() {
            tracing::warn!(
                expires_in = token.expires_in,
                threshold = self.refresh_threshold.num_seconds(),
                "Token lifetime does not exceed the refresh threshold; every request will refresh"
            );
        }

        tracing::info!(
            "Token acquired from STS, refreshes on: {}",
            token.refresh_at.to_rfc3339()
        );

        *self.token.borrow_mut() = Some(token);
        Ok(())
    }

    /// Snapshot of the manager and its current token
    pub fn status(&self) -> TokenStatus {
        let now = self.clock.now();
        let token = self.token.borrow();

        TokenStatus {
            sts_url: self.sts_url.clone(),
            username: self.credentials.username.clone(),
            refresh_threshold_secs: self.refresh_threshold.num_seconds(),
            refreshes_on: token.as_ref().map(|t| t.refresh_at),
            seconds_remaining: token.as_ref().map(|t| (t.refresh_at - now).num_seconds()),
            token_type: token.as_ref().map(|t| t.token_type.clone()),
            access_token_preview: token.as_ref().map(|t| t.preview()),
        }
    }
}

impl HeaderProvider for TokenManager {
    fn headers(&self) -> Result<HeaderMap, AuthError> {
        if self.needs_refresh() {
            self.refresh()?;
        }

        let token = self.token.borrow();
        let token = token
            .as_ref()
            .ok_or_else(|| AuthError::InvalidResponse("No access token available".to_string()))?;

        let mut authorization = HeaderValue::from_str(&token.authorization_value())
            .map_err(|_| AuthError::InvalidHeader("Authorization".to_string()))?;
        authorization.set_sensitive(true);

        let mut headers = self.base_headers.clone();
        headers.insert(AUTHORIZATION, authorization);
        Ok(headers)
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("sts_url", &self.sts_url)
            .field("credentials", &self.credentials)
            .field("refresh_threshold", &self.refresh_threshold.num_seconds())
            .field("token", &self.token.borrow())
            .finish()
    }
}

/// Point-in-time view of a token manager
#[derive(Debug, Clone, PartialEq)]
pub struct TokenStatus {
    pub sts_url: String,
    pub username: String,
    pub refresh_threshold_secs: i64,
    pub refreshes_on: Option<DateTime<Utc>>,
    pub seconds_remaining: Option<i64>,
    pub token_type: Option<String>,
    pub access_token_preview: Option<String>,
}

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "STS Server: {}", self.sts_url)?;
        writeln!(f, "Authentication Type: Basic")?;
        writeln!(f, "Authentication User: {}", self.username)?;
        writeln!(
            f,
            "Refresh Threshold: {} seconds ({:.2} minutes)",
            self.refresh_threshold_secs,
            self.refresh_threshold_secs as f64 / 60.0
        )?;

        match (self.refreshes_on, self.seconds_remaining) {
            (Some(on), Some(remaining)) => writeln!(
                f,
                "Refreshes On: {} ({:.2} minutes)",
                on.to_rfc3339(),
                remaining as f64 / 60.0
            )?,
            _ => writeln!(f, "Refreshes On: no token acquired")?,
        }

        writeln!(
            f,
            "Token Type: {}",
            self.token_type.as_deref().unwrap_or("-")
        )?;
        write!(
            f,
            "Access Token: {}",
            self.access_token_preview.as_deref().unwrap_or("-")
        )
    }
}
