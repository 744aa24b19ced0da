use std::collections::BTreeMap;

use chat_transport::{TransportRequest, CONTENT_TYPE_JSON, HEADER_CONTENT_TYPE};
use serde_json::Value;

use crate::config::{InitialFetch, SessionConfig};

pub(crate) fn initial_request(config: &SessionConfig, fetch: &InitialFetch) -> TransportRequest {
    TransportRequest::get(fetch.url.clone())
        .with_headers(config.headers.clone())
        .with_body(fetch.body.clone())
}

pub(crate) fn send_request(config: &SessionConfig, body: Value) -> TransportRequest {
    TransportRequest::post(config.send_url.clone(), body).with_headers(send_headers(&config.headers))
}

/// Caller headers with the fixed JSON content type layered on top.
pub(crate) fn send_headers(caller: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = caller
        .iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(HEADER_CONTENT_TYPE))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    headers.insert(HEADER_CONTENT_TYPE.to_owned(), CONTENT_TYPE_JSON.to_owned());
    headers
}

#[cfg(test)]
mod tests {
    use chat_transport::Method;
    use serde_json::json;

    use super::{initial_request, send_request};
    use crate::config::{InitialFetch, SessionConfig};

    #[test]
    fn fixed_content_type_replaces_caller_value() {
        let config = SessionConfig::new("https://bot.test/chat")
            .with_header("content-type", "text/plain")
            .with_header("Authorization", "Bearer t");

        let request = send_request(&config, json!({"message": "hi"}));
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("authorization"), Some("Bearer t"));
    }

    #[test]
    fn initial_request_is_a_get_with_caller_headers_and_optional_body() {
        let config = SessionConfig::new("https://bot.test/chat").with_header("X-Tenant", "acme");
        let fetch = InitialFetch::new("https://bot.test/history").with_body(json!({"limit": 20}));

        let request = initial_request(&config, &fetch);
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "https://bot.test/history");
        assert_eq!(request.header("x-tenant"), Some("acme"));
        assert_eq!(request.header("content-type"), None);
        assert_eq!(request.body, Some(json!({"limit": 20})));
    }
}
