use super::test_helpers::{MockBackend, MockFetcher, PNG_BYTES, test_host, test_host_with};
use super::*;

use crate::actions::ResponseHandler;
use crate::actions::responses::{ResponseItem, execute};
use crate::doc::{BlockProps, Bound, EMBED_HTML_FLAVOUR, IMAGE_FLAVOUR, MindmapNode, MindmapStyle, NOTE_FLAVOUR};
use crate::panel::Answer;
use crate::provider::ProviderError;

#[tokio::test]
async fn trigger_finishes_with_answer() {
    let t = test_host_with(MockBackend::answering(&["Short summary."]), MockFetcher::new());
    let state = t
        .host
        .trigger(AiAction::Summary, "long text".into(), ActionVariants::default())
        .await;

    assert_eq!(state, PanelState::Finished);
    let editor = t.host.editor.read().await;
    assert_eq!(editor.panel.answer(), Some(&Answer::Text("Short summary.".into())));
    let session = editor.panel.session().unwrap();
    assert_eq!(session.ctx, ActionContext::Text { action: AiAction::Summary });
    assert_eq!(t.backend.requests.lock().unwrap()[0].input, "long text");
}

#[tokio::test]
async fn trigger_falls_back_to_selected_shape_text() {
    let t = test_host_with(MockBackend::answering(&["ok"]), MockFetcher::new());
    {
        let mut editor = t.host.editor.write().await;
        let a = editor.doc.add_shape(Bound::default(), "alpha");
        let b = editor.doc.add_shape(Bound::default(), "beta");
        editor.set_selection(vec![a, b], false);
    }
    t.host.trigger(AiAction::Chat, "  ".into(), ActionVariants::default()).await;
    assert_eq!(t.backend.requests.lock().unwrap()[0].input, "alpha\nbeta");
}

#[tokio::test]
async fn trigger_captures_mindmap_selection() {
    let t = test_host_with(MockBackend::answering(&["- x\n  - y"]), MockFetcher::new());
    let root = {
        let mut editor = t.host.editor.write().await;
        let m = editor.doc.add_mindmap(&MindmapNode::new("x", Vec::new()), MindmapStyle::One);
        let root = editor.doc.mindmap(m).unwrap().tree.element;
        editor.set_selection(vec![root], false);
        root
    };
    t.host
        .trigger(AiAction::ExpandMindmap, "x".into(), ActionVariants::default())
        .await;
    let editor = t.host.editor.read().await;
    assert_eq!(
        editor.panel.session().unwrap().ctx,
        ActionContext::ExpandMindmap { selected: vec![root], node: None }
    );
}

#[tokio::test]
async fn make_it_real_captures_selection_size() {
    let t = test_host_with(MockBackend::answering(&["<p/>"]), MockFetcher::new());
    {
        let mut editor = t.host.editor.write().await;
        let a = editor.doc.add_shape(Bound::new(0.0, 0.0, 100.0, 50.0), "a");
        let b = editor.doc.add_shape(Bound::new(200.0, 0.0, 100.0, 150.0), "b");
        editor.set_selection(vec![a, b], false);
    }
    t.host
        .trigger(AiAction::MakeItReal, String::new(), ActionVariants::default())
        .await;
    let editor = t.host.editor.read().await;
    assert_eq!(
        editor.panel.session().unwrap().ctx,
        ActionContext::MakeItReal { width: Some(300.0), height: Some(150.0) }
    );
}

#[tokio::test]
async fn provider_failure_puts_panel_in_error_state() {
    let t = test_host_with(MockBackend::new(vec![Err(ProviderError::Unauthorized)]), MockFetcher::new());
    let state = t
        .host
        .trigger(AiAction::Summary, "x".into(), ActionVariants::default())
        .await;
    assert_eq!(state, PanelState::Error { code: "E_UNAUTHORIZED".into(), message: "login required".into() });
    assert!(t.host.editor.read().await.panel.answer().is_none());
}

#[tokio::test]
async fn unconfigured_provider_reports_error() {
    let t = test_host();
    let host = HostContext { provider: Arc::new(AiProvider::new(None)), ..t.host.clone() };
    let state = host
        .trigger(AiAction::Summary, "x".into(), ActionVariants::default())
        .await;
    assert!(matches!(state, PanelState::Error { ref code, .. } if code == "E_NOT_CONFIGURED"));
}

#[tokio::test]
async fn retry_without_session_is_none() {
    let t = test_host();
    assert!(t.host.retry().await.is_none());
}

#[tokio::test]
async fn retry_replaces_previous_answer() {
    let t = test_host_with(MockBackend::answering(&["one", "two"]), MockFetcher::new());
    t.host
        .trigger(AiAction::MakeLonger, "text".into(), ActionVariants::default())
        .await;
    let state = t.host.retry().await.unwrap();
    assert_eq!(state, PanelState::Finished);
    assert_eq!(t.backend.request_count(), 2);
    assert_eq!(t.host.editor.read().await.panel.answer(), Some(&Answer::Text("two".into())));
}

#[test]
fn image_proxy_is_optional() {
    let t = test_host();
    assert!(t.host.image_proxy.is_none());
    let host = t.host.with_image_proxy(Some("https://proxy.test".into()));
    assert_eq!(host.image_proxy.as_deref(), Some("https://proxy.test"));
}

// =============================================================================
// TRIGGER TO INSERT
// =============================================================================

#[tokio::test]
async fn slides_answer_is_laid_out_and_inserted() {
    let t = test_host_with(
        MockBackend::answering(&["# Deck\n\n- Slide one\n- Slide two\n- Slide three"]),
        MockFetcher::new(),
    );
    let state = t
        .host
        .trigger(AiAction::CreateSlides, "pets".into(), ActionVariants::default())
        .await;
    assert_eq!(state, PanelState::Finished);

    let out = execute(&t.host, ResponseItem::Insert).await.unwrap();
    assert_eq!(out.handler, ResponseHandler::CreateSlides);
    out.background.unwrap().await.unwrap();

    let editor = t.host.editor.read().await;
    // Cover plus three slides; the closing group is never inserted.
    assert_eq!(editor.doc.element_count(), 4);
    assert_eq!(editor.surface_refreshes(), 4);
    assert_eq!(editor.panel.state(), &PanelState::Hidden);
}

#[tokio::test]
async fn slides_answer_fetches_section_images() {
    let fetcher = MockFetcher::new().with_body("https://img.test/cat.png", PNG_BYTES);
    let answer = "# Pets\n\n## Cats\n![cat](https://img.test/cat.png)\n\n## Dogs\nLoyal.\n";
    let t = test_host_with(MockBackend::answering(&[answer]), fetcher);
    t.host
        .trigger(AiAction::CreateSlides, "pets".into(), ActionVariants::default())
        .await;

    let out = execute(&t.host, ResponseItem::Insert).await.unwrap();
    out.background.unwrap().await.unwrap();

    assert_eq!(t.fetcher.requested(), vec!["https://img.test/cat.png".to_owned()]);
    let editor = t.host.editor.read().await;
    assert_eq!(editor.doc.element_count(), 3);
    assert_eq!(editor.doc.blocks_by_flavour(IMAGE_FLAVOUR).len(), 1);
    assert_eq!(editor.doc.blocks_by_flavour(NOTE_FLAVOUR).len(), 1);
    assert_eq!(editor.assets.len(), 1);
}

#[tokio::test]
async fn make_it_real_embed_takes_selection_size() {
    let t = test_host_with(MockBackend::answering(&["```html\n<p>hi</p>\n```"]), MockFetcher::new());
    {
        let mut editor = t.host.editor.write().await;
        let a = editor.doc.add_shape(Bound::new(0.0, 0.0, 100.0, 50.0), "a");
        let b = editor.doc.add_shape(Bound::new(200.0, 0.0, 100.0, 150.0), "b");
        editor.set_selection(vec![a, b], false);
    }
    t.host
        .trigger(AiAction::MakeItReal, String::new(), ActionVariants::default())
        .await;

    let out = execute(&t.host, ResponseItem::Insert).await.unwrap();
    assert_eq!(out.handler, ResponseHandler::MakeItReal);

    let editor = t.host.editor.read().await;
    let embeds = editor.doc.blocks_by_flavour(EMBED_HTML_FLAVOUR);
    assert_eq!(embeds.len(), 1);
    let BlockProps::EmbedHtml { html, xywh, .. } = &embeds[0].props else {
        panic!("expected embed");
    };
    assert_eq!(html, "<p>hi</p>");
    assert_eq!((xywh.w, xywh.h), (300.0, 150.0));
}

#[tokio::test]
async fn expand_answer_grows_selected_node() {
    let t = test_host_with(MockBackend::answering(&["- x\n  - a\n  - b"]), MockFetcher::new());
    let mindmap = {
        let mut editor = t.host.editor.write().await;
        let m = editor.doc.add_mindmap(&MindmapNode::new("x", Vec::new()), MindmapStyle::One);
        let root = editor.doc.mindmap(m).unwrap().tree.element;
        editor.set_selection(vec![root], false);
        m
    };
    t.host
        .trigger(AiAction::ExpandMindmap, "x".into(), ActionVariants::default())
        .await;

    let out = execute(&t.host, ResponseItem::Insert).await.unwrap();
    assert_eq!(out.handler, ResponseHandler::ExpandMindmap);

    let editor = t.host.editor.read().await;
    let tree = &editor.doc.mindmap(mindmap).unwrap().tree;
    assert_eq!(tree.children.len(), 2);
    assert_eq!(editor.panel.state(), &PanelState::Hidden);
}

#[tokio::test]
async fn image_answer_is_fetched_and_inserted() {
    let fetcher = MockFetcher::new().with_body("https://img.test/gen.png", PNG_BYTES);
    let t = test_host_with(MockBackend::answering(&["https://img.test/gen.png"]), fetcher);
    t.host
        .trigger(AiAction::CreateImage, "a cat".into(), ActionVariants::default())
        .await;

    let out = execute(&t.host, ResponseItem::Insert).await.unwrap();
    assert_eq!(out.handler, ResponseHandler::Image);
    out.background.unwrap().await.unwrap();

    let editor = t.host.editor.read().await;
    let images = editor.doc.blocks_by_flavour(IMAGE_FLAVOUR);
    assert_eq!(images.len(), 1);
    assert_eq!(editor.selection.elements, vec![images[0].id]);
    assert_eq!(editor.assets.len(), 1);
}
