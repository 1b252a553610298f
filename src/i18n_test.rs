use super::*;

use std::sync::Mutex;

use crate::error::ErrorCode;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn client() -> TranslationClient {
    TranslationClient::new("key-123", "https://i18n.test/").unwrap()
}

#[test]
fn endpoint_prefixes_projects_path() {
    assert_eq!(client().endpoint("/42/translations"), "https://i18n.test/v2/projects/42/translations");
}

#[test]
fn default_headers_carry_key_and_json() {
    let request = client()
        .request(reqwest::Method::GET, "/42/languages")
        .build()
        .unwrap();
    assert_eq!(request.url().as_str(), "https://i18n.test/v2/projects/42/languages");
    assert_eq!(request.headers().get(API_KEY_HEADER).unwrap(), "key-123");
    assert_eq!(request.headers().get(CONTENT_TYPE).unwrap(), "application/json");
}

#[test]
fn caller_headers_replace_defaults() {
    let mut headers = HeaderMap::new();
    headers.insert("X-Trace", HeaderValue::from_static("abc"));
    let request = client()
        .request_with_headers(reqwest::Method::POST, "/42/keys", Some(headers))
        .build()
        .unwrap();
    assert_eq!(request.method(), reqwest::Method::POST);
    assert_eq!(request.headers().get("X-Trace").unwrap(), "abc");
    assert!(request.headers().get(API_KEY_HEADER).is_none());
    assert!(request.headers().get(CONTENT_TYPE).is_none());
}

#[test]
fn invalid_key_is_rejected() {
    assert!(matches!(TranslationClient::new("bad\nkey", TRANSLATION_API_URL), Err(I18nError::InvalidApiKey)));
}

#[test]
fn from_env_requires_api_key() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe { std::env::remove_var(API_KEY_ENV) };
    let err = TranslationClient::from_env().err().unwrap();
    assert!(matches!(err, I18nError::MissingApiKey));
    assert_eq!(err.to_string(), "please set \"TOLGEE_API_KEY\" as environment variable");

    unsafe { std::env::set_var(API_KEY_ENV, "") };
    assert!(matches!(TranslationClient::from_env(), Err(I18nError::MissingApiKey)));

    unsafe { std::env::set_var(API_KEY_ENV, "live-key") };
    let client = TranslationClient::from_env().unwrap();
    assert_eq!(client.endpoint(""), "https://i18n.compose.pro/v2/projects");

    unsafe { std::env::remove_var(API_KEY_ENV) };
}

#[test]
fn status_errors_are_coded() {
    let err = I18nError::Status { status: 502, body: String::new() };
    assert_eq!(err.error_code(), "E_TRANSLATION_STATUS");
    assert!(err.retryable());
    assert!(!I18nError::Parse("x".into()).retryable());
}
