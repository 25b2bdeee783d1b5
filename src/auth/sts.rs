// Token requests against the QNXT Security Token Service

use reqwest::blocking::Client;
use reqwest::header::HeaderMap;

use super::types::{Credentials, StsErrorResponse, StsTokenResponse};
use crate::error::{truncate_body, AuthError};
use crate::utils::join_url;

/// STS endpoint path, relative to the STS server
pub const STS_ENDPOINT: &str = "QnxtSTS";

/// Token URL for an STS server
pub fn sts_url(sts_server: &str) -> String {
    join_url(sts_server, STS_ENDPOINT)
}

/// Request a new access token
///
/// Sends `GET {sts_url}` with the base headers and HTTP Basic credentials.
pub fn request_token(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
    credentials: &Credentials,
) -> Result<StsTokenResponse, AuthError> {
    tracing::debug!(url = %url, user = %credentials.username, "Requesting token from STS");

    let response = client
        .get(url)
        .headers(headers.clone())
        .basic_auth(&credentials.username, Some(credentials.password()))
        .send()
        .map_err(AuthError::Transport)?;

    let status = response.status();
    tracing::debug!(
        "{}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );

    let body = response.text().map_err(AuthError::Transport)?;

    if !status.is_success() {
        let description = serde_json::from_str::<StsErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error_description.or(e.error))
            .unwrap_or_else(|| truncate_body(&body));

        tracing::error!(
            status = status.as_u16(),
            description = %description,
            "STS token request failed"
        );

        return Err(AuthError::Rejected {
            status: status.as_u16(),
            description,
        });
    }

    let data: StsTokenResponse = serde_json::from_str(&body)
        .map_err(|e| AuthError::InvalidResponse(format!("{} (body: {})", e, truncate_body(&body))))?;

    if data.access_token.is_empty() {
        return Err(AuthError::InvalidResponse(
            "STS response does not contain access_token".to_string(),
        ));
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sts_url() {
        assert_eq!(sts_url("http://sts.example.com"), "http://sts.example.com/QnxtSTS");
        assert_eq!(sts_url("http://sts.example.com/"), "http://sts.example.com/QnxtSTS");
    }

    #[test]
    fn test_request_token_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/QnxtSTS")
            .match_header("authorization", "Basic c3ZjOnNlY3JldA==")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"tok-1","token_type":"Bearer","expires_in":3600}"#)
            .create();

        let token = request_token(
            &Client::new(),
            &sts_url(&server.url()),
            &HeaderMap::new(),
            &Credentials::new("svc", "secret"),
        )
        .unwrap();

        mock.assert();
        assert_eq!(token.access_token, "tok-1");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn test_request_token_rejected_uses_error_description() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/QnxtSTS")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"The user name or password is incorrect."}"#)
            .create();

        let err = request_token(
            &Client::new(),
            &sts_url(&server.url()),
            &HeaderMap::new(),
            &Credentials::new("svc", "wrong"),
        )
        .err()
        .expect("token request should fail");

        match err {
            AuthError::Rejected { status, description } => {
                assert_eq!(status, 400);
                assert_eq!(description, "The user name or password is incorrect.");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_request_token_rejected_with_plain_body() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/QnxtSTS")
            .with_status(401)
            .with_body("Unauthorized")
            .create();

        let err = request_token(
            &Client::new(),
            &sts_url(&server.url()),
            &HeaderMap::new(),
            &Credentials::new("svc", "secret"),
        )
        .err()
        .expect("token request should fail");

        assert!(matches!(
            err,
            AuthError::Rejected { status: 401, ref description } if description == "Unauthorized"
        ));
    }

    #[test]
    fn test_request_token_invalid_body() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/QnxtSTS")
            .with_status(200)
            .with_body(r#"{"token":"missing-fields"}"#)
            .create();

        let err = request_token(
            &Client::new(),
            &sts_url(&server.url()),
            &HeaderMap::new(),
            &Credentials::new("svc", "secret"),
        )
        .err()
        .expect("token request should fail");

        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }
}
