// QNXT client - library root

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod http_client;
pub mod params;
pub mod response;
pub mod utils;

pub use auth::{Credentials, HeaderProvider, TokenManager};
pub use error::{ApiError, AuthError, Result};
pub use http_client::QnxtHttpClient;
pub use params::{Paging, ParamValue, Params};
pub use response::Response;
