use reqwest::Url;

use crate::error::HttpTransportError;

/// Validate and normalize a configured endpoint URL.
///
/// Rules:
/// 1) surrounding whitespace is ignored
/// 2) the URL must parse and use `http` or `https`
/// 3) a fragment is dropped, everything else is kept verbatim
pub fn normalize_endpoint_url(input: &str) -> Result<Url, HttpTransportError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(HttpTransportError::InvalidUrl(
            "endpoint URL is empty".to_owned(),
        ));
    }

    let mut url = Url::parse(trimmed)
        .map_err(|error| HttpTransportError::InvalidUrl(format!("{trimmed}: {error}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(HttpTransportError::InvalidUrl(format!(
            "{trimmed}: unsupported scheme '{}'",
            url.scheme()
        )));
    }

    url.set_fragment(None);
    Ok(url)
}
