use super::*;

use crate::provider::config::{LlmConfig, LlmTimeouts};

fn config() -> LlmConfig {
    LlmConfig {
        api_key: "k".into(),
        model: "claude-test".into(),
        base_url: "https://example.test/v1".into(),
        max_tokens: 256,
        timeouts: LlmTimeouts { request_secs: 5, connect_secs: 1 },
    }
}

#[test]
fn from_config_builds_messages_url() {
    let backend = AnthropicBackend::from_config(config()).unwrap();
    assert_eq!(backend.model(), "claude-test");
    assert_eq!(backend.messages_url, "https://example.test/v1/messages");
    assert_eq!(backend.max_tokens, 256);
}

#[test]
fn parse_response_joins_text_blocks() {
    let json = r#"{
        "content": [
            { "type": "text", "text": "first" },
            { "type": "tool_use", "id": "t1", "name": "x", "input": {} },
            { "type": "text", "text": "second" }
        ],
        "stop_reason": "end_turn"
    }"#;
    assert_eq!(parse_response(json).unwrap(), "first\nsecond");
}

#[test]
fn parse_response_without_text_is_empty() {
    assert_eq!(parse_response(r#"{"content": []}"#).unwrap(), "");
}

#[test]
fn parse_response_rejects_bad_json() {
    assert!(matches!(parse_response("not json"), Err(ProviderError::ApiParse(_))));
    assert!(matches!(parse_response(r#"{"id": "x"}"#), Err(ProviderError::ApiParse(_))));
}

#[test]
fn instruction_mentions_variants() {
    let variants = ActionVariants {
        lang: Some("German".into()),
        tone: Some("friendly".into()),
        ..ActionVariants::default()
    };
    let text = instruction(AiAction::Translate, &variants);
    assert!(text.starts_with("Translate the following content."));
    assert!(text.contains("Target language: German."));
    assert!(text.contains("Tone: friendly."));
    assert!(!text.contains("Style:"));
}

#[test]
fn every_action_has_an_instruction() {
    for action in AiAction::ALL {
        let text = instruction(action, &ActionVariants::default());
        assert!(text.ends_with("Reply in markdown unless told otherwise."), "{action}");
    }
}

#[test]
fn request_body_shape() {
    let messages = [Message { role: "user", content: "hello" }];
    let body = ApiRequest { model: "m", max_tokens: 10, system: "sys", messages: &messages };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "model": "m",
            "max_tokens": 10,
            "system": "sys",
            "messages": [{ "role": "user", "content": "hello" }]
        })
    );
}
