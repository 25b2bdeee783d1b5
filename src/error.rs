// Error handling module
// Defines the authentication and API error types

use thiserror::Error;

/// Maximum length for response bodies embedded in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Errors raised while acquiring a token from the STS server
#[derive(Error, Debug)]
pub enum AuthError {
    /// STS answered with a non-success status
    #[error("STS rejected token request: {status} - {description}")]
    Rejected { status: u16, description: String },

    /// STS could not be reached or the body could not be read
    #[error("Failed to reach STS server: {0}")]
    Transport(#[source] reqwest::Error),

    /// STS answered 2xx but the body is not a token
    #[error("Invalid STS response: {0}")]
    InvalidResponse(String),

    /// Token or environment id cannot be encoded as a header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// Refresh threshold does not fit a time span
    #[error("Refresh threshold out of range: {0} seconds")]
    InvalidThreshold(u64),
}

/// Errors that can occur while calling a QNXT resource
#[derive(Error, Debug)]
pub enum ApiError {
    /// Could not obtain request headers
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Transport-level failure from the HTTP client
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body is not JSON
    #[error("Invalid JSON response from {url}: {message}")]
    InvalidJson { url: String, message: String },

    /// Resource URL could not be built
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Non-success status, raised by `Response::error_for_status`
    #[error("QNXT API error: {status} - {message}")]
    Status { status: u16, message: String },
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Truncate a response body to avoid logging excessive data
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }

    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}
