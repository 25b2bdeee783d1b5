// Authentication module
// Manages the STS token lifecycle and builds request headers

mod manager;
mod sts;
mod types;

pub use manager::{
    Clock, HeaderProvider, SystemClock, TokenManager, TokenStatus, DEFAULT_REFRESH_THRESHOLD_SECS,
    ENV_ID_HEADER,
};
pub use sts::{sts_url, STS_ENDPOINT};
pub use types::{Credentials, Token};
