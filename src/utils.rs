// URL helpers shared by the STS and resource clients

use reqwest::Url;

use crate::error::{ApiError, Result};

/// Join a server URL and a path with exactly one `/` between them
///
/// - `http://host` + `QNXTApi/Benefit` → `http://host/QNXTApi/Benefit`
/// - `http://host/` + `QNXTApi/Benefit` → `http://host/QNXTApi/Benefit`
/// - `http://host/` + `/QnxtSTS` → `http://host/QnxtSTS`
/// - empty path returns the base without its trailing slash
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

/// Append path segments to `base`, percent-encoding each one
///
/// Identifiers containing `/`, `?` or `#` stay inside their own segment.
pub fn join_segments(base: &str, segments: &[&str]) -> Result<String> {
    let invalid = |message: String| ApiError::InvalidUrl {
        url: base.to_string(),
        message,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("URL cannot have path segments".to_string()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url.to_string())
}
