//! Menu rendering routes.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;

use crate::editor::EditorMode;
use crate::host::HostContext;
use crate::menu::{MenuContext, MenuEntryView, ai_item_groups, slash, toolbar};

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    /// Overrides the editor's current mode.
    pub mode: Option<EditorMode>,
    /// Whether the caret sits in text (slash menu only).
    #[serde(default)]
    pub text: bool,
}

async fn menu_context(host: &HostContext, query: &MenuQuery) -> MenuContext {
    let editor = host.editor.read().await;
    let mut ctx = MenuContext::from_editor(&editor, query.text);
    if let Some(mode) = query.mode {
        ctx.mode = mode;
    }
    ctx
}

/// `GET /api/menu/slash`: slash menu with AI entries, filtered for the
/// current editor state.
pub async fn slash_menu(State(host): State<HostContext>, Query(query): Query<MenuQuery>) -> Json<Vec<MenuEntryView>> {
    let ctx = menu_context(&host, &query).await;
    let menu = slash::setup_slash_menu(&slash::default_slash_menu(), &ai_item_groups());
    Json(slash::visible_items(&menu, &ctx))
}

/// `GET /api/menu/toolbar`: element toolbar with the AI group.
pub async fn element_toolbar(
    State(host): State<HostContext>,
    Query(query): Query<MenuQuery>,
) -> Json<Vec<MenuEntryView>> {
    let ctx = menu_context(&host, &query).await;
    let bar = toolbar::setup_toolbar(&toolbar::default_element_toolbar(), &ai_item_groups());
    Json(toolbar::visible_entries(&bar, &ctx))
}

#[cfg(test)]
#[path = "menu_test.rs"]
mod tests;
