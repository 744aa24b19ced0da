use std::collections::BTreeMap;

use chat_transport_http::headers::{build_headers, to_header_map, HEADER_ACCEPT, HEADER_USER_AGENT};
use chat_transport_http::HttpTransportConfig;

#[test]
fn header_map_contains_transport_defaults() {
    let headers = build_headers(&HttpTransportConfig::new(), &BTreeMap::new());

    assert_eq!(
        headers.get(HEADER_ACCEPT).expect("accept"),
        &"application/json".to_owned()
    );
    assert!(headers
        .get(HEADER_USER_AGENT)
        .expect("user-agent")
        .starts_with("chat-session/"));
}

#[test]
fn request_headers_override_configured_defaults_case_insensitively() {
    let config = HttpTransportConfig::new()
        .with_user_agent("widget-test")
        .insert_header("X-Tenant", "default")
        .insert_header("Authorization", "Bearer config-token");
    let mut request_headers = BTreeMap::new();
    request_headers.insert("authorization".to_owned(), " Bearer request-token ".to_owned());
    request_headers.insert("Content-Type".to_owned(), "application/json".to_owned());

    let headers = build_headers(&config, &request_headers);

    assert_eq!(headers.get("user-agent").expect("ua"), "widget-test");
    assert_eq!(headers.get("x-tenant").expect("tenant"), "default");
    assert_eq!(
        headers.get("authorization").expect("authorization"),
        "Bearer request-token"
    );
    assert_eq!(
        headers.get("content-type").expect("content-type"),
        "application/json"
    );
    assert!(!headers.contains_key("Authorization"));
}

#[test]
fn header_map_conversion_rejects_invalid_values() {
    let mut headers = BTreeMap::new();
    headers.insert("x-bad".to_owned(), "line\nbreak".to_owned());

    let error = to_header_map(&headers).expect_err("newline is not a valid header value");
    assert!(error.to_string().contains("x-bad"));
}
