use super::*;

#[test]
fn action_names_match_serde() {
    for action in AiAction::ALL {
        let json = serde_json::to_value(action).unwrap();
        assert_eq!(json, action.as_str(), "serde name for {action:?}");
        let back: AiAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }
}

#[test]
fn answer_kinds() {
    assert_eq!(AiAction::CreateImage.answer_kind(), AnswerKind::Url);
    assert_eq!(AiAction::FilterImage.answer_kind(), AnswerKind::Url);
    assert_eq!(AiAction::BrainstormMindmap.answer_kind(), AnswerKind::Tree);
    assert_eq!(AiAction::Summary.answer_kind(), AnswerKind::Text);
}

#[test]
fn only_caption_excludes_insert() {
    let excluded: Vec<AiAction> = AiAction::ALL
        .into_iter()
        .filter(|a| a.excludes_insert())
        .collect();
    assert_eq!(excluded, [AiAction::GenerateCaption]);
}

#[test]
fn context_round_trips_its_action() {
    for action in AiAction::ALL {
        assert_eq!(ActionContext::for_action(action).action(), action);
    }
}

#[test]
fn for_action_picks_payload_shape() {
    assert_eq!(ActionContext::for_action(AiAction::Summary), ActionContext::Text { action: AiAction::Summary });
    assert_eq!(ActionContext::for_action(AiAction::GenerateCaption), ActionContext::Caption);
    assert_eq!(
        ActionContext::for_action(AiAction::ProcessImage),
        ActionContext::Image { action: AiAction::ProcessImage }
    );
    assert!(matches!(
        ActionContext::for_action(AiAction::MakeItReal),
        ActionContext::MakeItReal { width: None, height: None }
    ));
}

#[test]
fn selection_only_sticks_to_mindmap_payloads() {
    let id = Uuid::new_v4();
    let ctx = ActionContext::for_action(AiAction::ExpandMindmap).with_selection(&[id]);
    assert!(matches!(ctx, ActionContext::ExpandMindmap { selected, .. } if selected == vec![id]));

    let ctx = ActionContext::for_action(AiAction::Summary).with_selection(&[id]);
    assert_eq!(ctx, ActionContext::Text { action: AiAction::Summary });
}

#[test]
fn absorb_answer_parses_markdown_outline() {
    let mut ctx = ActionContext::for_action(AiAction::BrainstormMindmap);
    ctx.absorb_answer(&Answer::Text("- Topic\n  - A\n  - B".into()));
    let ActionContext::BrainstormMindmap { node: Some(node), .. } = ctx else {
        panic!("expected a tree");
    };
    assert_eq!(node.text, "Topic");
    assert_eq!(node.children.len(), 2);
}

#[test]
fn absorb_answer_keeps_existing_tree() {
    let preset = MindmapNode::new("preset", Vec::new());
    let mut ctx = ActionContext::ExpandMindmap { selected: Vec::new(), node: Some(preset.clone()) };
    ctx.absorb_answer(&Answer::Tree(MindmapNode::new("other", Vec::new())));
    assert!(matches!(ctx, ActionContext::ExpandMindmap { node: Some(n), .. } if n == preset));
}

#[test]
fn absorb_answer_builds_slide_deck() {
    let mut ctx = ActionContext::for_action(AiAction::CreateSlides);
    ctx.absorb_answer(&Answer::Text("# Deck\n\n- Slide one\n- Slide two\n- Slide three".into()));
    let ActionContext::CreateSlides { contents, images } = ctx else {
        panic!("expected slides");
    };
    assert_eq!(contents.len(), 5);
    assert_eq!(images.len(), contents.len());
}

#[test]
fn absorb_answer_keeps_prefilled_slides() {
    let preset = slides::TemplateContent::default();
    let mut ctx = ActionContext::CreateSlides { contents: vec![preset.clone()], images: Vec::new() };
    ctx.absorb_answer(&Answer::Text("- a\n- b".into()));
    assert!(matches!(ctx, ActionContext::CreateSlides { contents, .. } if contents == vec![preset]));
}

#[test]
fn absorb_answer_ignores_other_payloads() {
    let mut ctx = ActionContext::for_action(AiAction::Summary);
    ctx.absorb_answer(&Answer::Text("- a".into()));
    assert_eq!(ctx, ActionContext::Text { action: AiAction::Summary });
}

#[test]
fn context_deserializes_from_tagged_json() {
    let ctx: ActionContext = serde_json::from_value(serde_json::json!({
        "kind": "brainstormMindmap",
        "selected": [],
        "node": null
    }))
    .unwrap();
    assert_eq!(
        ctx,
        ActionContext::BrainstormMindmap { selected: Vec::new(), node: None, style: MindmapStyle::One }
    );
}

#[test]
fn variants_default_when_absent() {
    let v: ActionVariants = serde_json::from_str("{}").unwrap();
    assert_eq!(v, ActionVariants::default());
    let v: ActionVariants = serde_json::from_str(r#"{"lang":"French"}"#).unwrap();
    assert_eq!(v.lang.as_deref(), Some("French"));
    assert!(!v.regenerate);
}
