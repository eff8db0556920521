use super::*;

fn test_client(base_url: &str) -> GeminiClient {
    GeminiClient::with_base_url(Some("test-key"), "gemini-2.5-flash", 30, base_url)
        .expect("client construction should not fail")
}

#[test]
fn endpoint_includes_model_and_method() {
    let client = test_client("https://generativelanguage.googleapis.com");
    assert_eq!(
        client.endpoint.as_str(),
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
    );
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let client = test_client("http://127.0.0.1:8080/proxy/");
    assert_eq!(
        client.endpoint.as_str(),
        "http://127.0.0.1:8080/proxy/v1beta/models/gemini-2.5-flash:generateContent"
    );
}

#[test]
fn invalid_base_url_is_a_configuration_error() {
    let result = GeminiClient::with_base_url(Some("k"), "gemini-2.5-flash", 30, "not a url");
    assert!(matches!(result, Err(GatewayError::Configuration(_))));
}

#[test]
fn blank_api_key_counts_as_missing() {
    let client = GeminiClient::with_base_url(Some("  "), "m", 30, "http://localhost")
        .expect("client construction should not fail");
    assert!(!client.has_credential());
    assert!(client.credential().unwrap_err().is_configuration());
}

#[test]
fn extract_postal_code_finds_first_token() {
    assert_eq!(extract_postal_code("The postal code is 560001."), "560001");
    assert_eq!(extract_postal_code("94103"), "94103");
    assert_eq!(extract_postal_code("560001 or 560002"), "560001");
}

#[test]
fn extract_postal_code_ignores_longer_digit_runs() {
    assert_eq!(extract_postal_code("call 9876543210"), "call 9876543210");
}

#[test]
fn extract_postal_code_returns_trimmed_text_without_match() {
    assert_eq!(extract_postal_code("  no data \n"), "no data");
    assert_eq!(extract_postal_code(""), "");
}

#[test]
fn api_error_prefers_envelope_message() {
    let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
    let err = GeminiClient::api_error(StatusCode::FORBIDDEN, body);
    assert!(
        matches!(err, GatewayError::Api { status: 403, ref message } if message == "PERMISSION_DENIED: API key not valid"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn api_error_falls_back_to_raw_body() {
    let err = GeminiClient::api_error(StatusCode::BAD_GATEWAY, "upstream timeout\n");
    assert!(
        matches!(err, GatewayError::Api { status: 502, ref message } if message == "upstream timeout"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn api_error_uses_status_text_for_empty_body() {
    let err = GeminiClient::api_error(StatusCode::SERVICE_UNAVAILABLE, "");
    assert!(
        matches!(err, GatewayError::Api { status: 503, ref message } if message.contains("503")),
        "unexpected error: {err:?}"
    );
}
