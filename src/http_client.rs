use reqwest::blocking::Client;
use reqwest::Method;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

use crate::auth::HeaderProvider;
use crate::error::Result;
use crate::params::Params;
use crate::response::Response;
use crate::utils::join_url;

/// HTTP client for a QNXT app server
///
/// Cheap to clone: every resource client holds one, all sharing the same
/// reqwest client and header provider.
#[derive(Clone)]
pub struct QnxtHttpClient {
    /// Shared reqwest client
    client: Client,

    /// App server root, e.g. `https://qnxt-app.example.com`
    app_server: String,

    /// Supplies fresh auth headers for each request
    header_provider: Rc<dyn HeaderProvider>,
}

impl QnxtHttpClient {
    /// Create a client for an app server
    pub fn new(app_server: &str, header_provider: Rc<dyn HeaderProvider>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, app_server, header_provider))
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_client(
        client: Client,
        app_server: &str,
        header_provider: Rc<dyn HeaderProvider>,
    ) -> Self {
        Self {
            client,
            app_server: app_server.to_string(),
            header_provider,
        }
    }

    pub fn app_server(&self) -> &str {
        &self.app_server
    }

    /// Base URI for a resource path such as `QNXTApi/Benefit`
    pub fn resource_uri(&self, base_path: &str) -> String {
        join_url(&self.app_server, base_path)
    }

    pub fn get(&self, uri: &str, params: &Params) -> Result<Response> {
        self.execute(Method::GET, uri, params, None::<&()>)
    }

    pub fn post<B: Serialize + ?Sized>(&self, uri: &str, params: &Params, body: &B) -> Result<Response> {
        self.execute(Method::POST, uri, params, Some(body))
    }

    pub fn put<B: Serialize + ?Sized>(&self, uri: &str, params: &Params, body: &B) -> Result<Response> {
        self.execute(Method::PUT, uri, params, Some(body))
    }

    /// Send one request with fresh headers and wrap the response
    fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        uri: &str,
        params: &Params,
        body: Option<&B>,
    ) -> Result<Response> {
        let headers = self.header_provider.headers()?;

        tracing::debug!(
            method = %method,
            url = %uri,
            params = params.to_query().len(),
            "Sending QNXT request"
        );

        let mut request = self
            .client
            .request(method, uri)
            .headers(headers)
            .query(&params.to_query());

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().map_err(|e| {
            tracing::warn!(error = %e, url = %uri, "QNXT request failed");
            e
        })?;

        Response::from_http(response)
    }
}

impl fmt::Debug for QnxtHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QnxtHttpClient")
            .field("app_server", &self.app_server)
            .finish_non_exhaustive()
    }
}
