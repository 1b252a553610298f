use super::*;

fn session(action: AiAction) -> PanelSession {
    PanelSession {
        action,
        input: "input".into(),
        ctx: ActionContext::for_action(action),
        variants: ActionVariants::default(),
    }
}

#[test]
fn new_panel_is_hidden_and_empty() {
    let panel = AiPanel::new();
    assert_eq!(panel.state(), &PanelState::Hidden);
    assert!(!panel.is_visible());
    assert!(panel.answer().is_none());
    assert!(panel.session().is_none());
}

#[test]
fn begin_then_complete_finishes() {
    let mut panel = AiPanel::new();
    let token = panel.begin(session(AiAction::Summary));
    assert_eq!(panel.state(), &PanelState::Generating);
    assert!(panel.is_visible());

    assert!(panel.complete(token, Answer::Text("done".into())));
    assert_eq!(panel.state(), &PanelState::Finished);
    assert_eq!(panel.answer(), Some(&Answer::Text("done".into())));
    assert_eq!(panel.session().unwrap().action, AiAction::Summary);
}

#[test]
fn stale_token_is_dropped_after_new_request() {
    let mut panel = AiPanel::new();
    let old = panel.begin(session(AiAction::Summary));
    let new = panel.begin(session(AiAction::Translate));

    assert!(!panel.complete(old, Answer::Text("late".into())));
    assert_eq!(panel.state(), &PanelState::Generating);
    assert!(panel.answer().is_none());

    assert!(panel.complete(new, Answer::Text("fresh".into())));
    assert_eq!(panel.answer().and_then(Answer::as_text), Some("fresh"));
}

#[test]
fn completion_after_hide_is_dropped() {
    let mut panel = AiPanel::new();
    let token = panel.begin(session(AiAction::Summary));
    panel.hide();
    assert!(!panel.complete(token, Answer::Text("late".into())));
    assert_eq!(panel.state(), &PanelState::Hidden);
    assert!(panel.answer().is_none());
}

#[test]
fn second_completion_for_same_token_is_dropped() {
    let mut panel = AiPanel::new();
    let token = panel.begin(session(AiAction::Summary));
    assert!(panel.complete(token, Answer::Text("first".into())));
    assert!(!panel.complete(token, Answer::Text("second".into())));
    assert_eq!(panel.answer().and_then(Answer::as_text), Some("first"));
}

#[test]
fn fail_records_error_state() {
    let mut panel = AiPanel::new();
    let token = panel.begin(session(AiAction::Summary));
    assert!(panel.fail(token, "E_UNAUTHORIZED", "login required"));
    assert_eq!(
        panel.state(),
        &PanelState::Error { code: "E_UNAUTHORIZED".into(), message: "login required".into() }
    );
    assert!(panel.answer().is_none());
    assert!(!panel.fail(token, "E_OTHER", "again"));
}

#[test]
fn regenerate_reissues_current_session() {
    let mut panel = AiPanel::new();
    assert!(panel.regenerate().is_none());

    let first = panel.begin(session(AiAction::MakeLonger));
    panel.complete(first, Answer::Text("a".into()));
    let (token, again) = panel.regenerate().unwrap();
    assert_ne!(token, first);
    assert_eq!(again.action, AiAction::MakeLonger);
    assert_eq!(panel.state(), &PanelState::Generating);
    assert!(panel.answer().is_none());
}

#[test]
fn hide_consumes_answer_but_keeps_session() {
    let mut panel = AiPanel::new();
    let token = panel.begin(session(AiAction::Summary));
    panel.complete(token, Answer::Text("x".into()));
    panel.discard();
    assert_eq!(panel.state(), &PanelState::Hidden);
    assert!(panel.answer().is_none());
    assert!(panel.session().is_some());
}

#[test]
fn answer_text_accessor() {
    assert_eq!(Answer::Url("http://x".into()).as_text(), Some("http://x"));
    assert_eq!(Answer::Tree(crate::doc::MindmapNode::default()).as_text(), None);
}

#[test]
fn panel_state_serializes_with_tag() {
    let json = serde_json::to_value(PanelState::Error { code: "E".into(), message: "m".into() }).unwrap();
    assert_eq!(json, serde_json::json!({ "state": "error", "code": "E", "message": "m" }));
    let json = serde_json::to_value(Answer::Text("hi".into())).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "text", "value": "hi" }));
}
