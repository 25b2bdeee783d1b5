use anyhow::{Context, Result};
use clap::Args;
use reqwest::Url;

use crate::auth::DEFAULT_REFRESH_THRESHOLD_SECS;

/// Upper bound for the token refresh threshold (one day)
const MAX_REFRESH_THRESHOLD_SECS: u64 = 86_400;

/// Connection options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// QNXT STS server URL
    #[arg(long, env = "QNXT_STS_SERVER")]
    pub sts_server: Option<String>,

    /// QNXT application server URL
    #[arg(long, env = "QNXT_APP_SERVER")]
    pub app_server: Option<String>,

    /// QNXT environment id (sent as x-TZ-EnvId)
    #[arg(short = 'e', long, env = "QNXT_ENV_ID")]
    pub env_id: Option<String>,

    /// Service account user name
    #[arg(short = 'u', long, env = "QNXT_USERNAME")]
    pub username: Option<String>,

    /// Service account password
    #[arg(long, env = "QNXT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Seconds before token expiry at which a new token is requested
    #[arg(long, env = "TOKEN_REFRESH_THRESHOLD", default_value_t = DEFAULT_REFRESH_THRESHOLD_SECS)]
    pub refresh_threshold: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

#[derive(Clone)]
pub struct Config {
    // Servers
    pub sts_server: String,
    pub app_server: String,
    pub env_id: String,

    // Authentication
    pub username: String,
    pub password: String,
    pub token_refresh_threshold: u64,

    // Logging
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    /// Resolve configuration from parsed arguments (CLI > ENV > defaults)
    pub fn from_args(args: &ConnectionArgs) -> Result<Self> {
        let config = Config {
            sts_server: args
                .sts_server
                .clone()
                .context("QNXT_STS_SERVER is required (use --sts-server or set QNXT_STS_SERVER env var)")?,
            app_server: args
                .app_server
                .clone()
                .context("QNXT_APP_SERVER is required (use --app-server or set QNXT_APP_SERVER env var)")?,
            env_id: args
                .env_id
                .clone()
                .context("QNXT_ENV_ID is required (use -e or set QNXT_ENV_ID env var)")?,
            username: args
                .username
                .clone()
                .context("QNXT_USERNAME is required (use -u or set QNXT_USERNAME env var)")?,
            password: args
                .password
                .clone()
                .context("QNXT_PASSWORD is required (use --password or set QNXT_PASSWORD env var)")?,
            token_refresh_threshold: args.refresh_threshold,
            log_level: args.log_level.clone(),
            log_format: parse_log_format(&args.log_format),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_server_url("QNXT_STS_SERVER", &self.sts_server)?;
        validate_server_url("QNXT_APP_SERVER", &self.app_server)?;

        if self.env_id.trim().is_empty() {
            anyhow::bail!("QNXT_ENV_ID must not be empty");
        }
        if self.username.trim().is_empty() {
            anyhow::bail!("QNXT_USERNAME must not be empty");
        }
        if self.token_refresh_threshold > MAX_REFRESH_THRESHOLD_SECS {
            anyhow::bail!(
                "TOKEN_REFRESH_THRESHOLD must be at most {} seconds, got {}",
                MAX_REFRESH_THRESHOLD_SECS,
                self.token_refresh_threshold
            );
        }

        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("sts_server", &self.sts_server)
            .field("app_server", &self.app_server)
            .field("env_id", &self.env_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token_refresh_threshold", &self.token_refresh_threshold)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn validate_server_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("{} is not a valid URL: {}", name, value))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => anyhow::bail!("{} must use http or https, got {}", name, other),
    }
}

fn parse_log_format(s: &str) -> LogFormat {
    match s.to_lowercase().as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

/// Parse a `key=value` call-time parameter
///
/// An empty value (`key=`) is kept and later treated as an explicit unset.
pub fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}
