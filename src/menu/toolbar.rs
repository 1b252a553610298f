//! Edgeless element toolbar adapter.
//!
//! Wraps the canvas-oriented AI actions as toolbar items and inserts them as
//! an "AI" group right after the "Edit" group. Items only show in edgeless
//! mode with a non-empty selection and a mounted AI panel.

use std::sync::Arc;

use super::{AiItemConfig, AiItemGroup, Icon, MenuCommand, MenuContext, MenuEntryView, ShowWhen};
use crate::editor::EditorMode;

pub const AI_GROUP: &str = "AI";
const INSERT_AFTER_GROUP: &str = "Edit";

const EDGELESS_ITEMS: [&str; 8] = [
    "Expand from this mind map node",
    "Brainstorm ideas with mind map",
    "Make it real",
    "Generate a presentation",
    "Generate an image",
    "Image processing",
    "AI image filter",
    "Generate caption",
];

#[derive(Clone)]
pub enum ToolbarEntry {
    Group { name: String },
    Item(ToolbarItem),
}

#[derive(Clone)]
pub struct ToolbarItem {
    pub name: String,
    pub icon: Icon,
    pub show_when: Option<ShowWhen>,
    pub command: MenuCommand,
    pub sub_items: Vec<ToolbarItem>,
}

impl ToolbarEntry {
    #[must_use]
    pub fn is_group(&self, name: &str) -> bool {
        matches!(self, Self::Group { name: n } if n == name)
    }

    fn group(name: &str) -> Self {
        Self::Group { name: name.to_owned() }
    }

    fn builtin(name: &str, id: &'static str, icon: Icon) -> Self {
        Self::Item(ToolbarItem {
            name: name.to_owned(),
            icon,
            show_when: None,
            command: MenuCommand::Builtin { id },
            sub_items: Vec::new(),
        })
    }
}

/// Host element toolbar without AI entries.
#[must_use]
pub fn default_element_toolbar() -> Vec<ToolbarEntry> {
    vec![
        ToolbarEntry::group("Align"),
        ToolbarEntry::builtin("Align objects", "align", "align-left"),
        ToolbarEntry::group("Style"),
        ToolbarEntry::builtin("Fill color", "fill", "fill"),
        ToolbarEntry::builtin("Stroke style", "stroke", "stroke"),
        ToolbarEntry::group(INSERT_AFTER_GROUP),
        ToolbarEntry::builtin("Duplicate", "duplicate", "duplicate"),
        ToolbarEntry::builtin("Delete", "delete", "delete"),
        ToolbarEntry::group("More"),
        ToolbarEntry::builtin("Lock", "lock", "lock"),
    ]
}

fn edgeless_visibility(item: &AiItemConfig) -> ShowWhen {
    let inner = item.show_when.clone();
    Arc::new(move |ctx: &MenuContext| {
        ctx.mode == EditorMode::Edgeless
            && ctx.ai_panel_mounted
            && !ctx.selection.is_empty()
            && inner.as_ref().is_none_or(|p| p(ctx))
    })
}

fn toolbar_item(item: &AiItemConfig) -> ToolbarItem {
    let sub_items = item
        .sub_items
        .iter()
        .map(|sub| ToolbarItem {
            name: sub.label.to_owned(),
            icon: item.icon,
            show_when: None,
            command: sub.command(item.action),
            sub_items: Vec::new(),
        })
        .collect();
    ToolbarItem {
        name: item.name.to_owned(),
        icon: item.icon,
        show_when: Some(edgeless_visibility(item)),
        command: item.command(),
        sub_items,
    }
}

/// The host `toolbar` with the AI group inserted after "Edit", or appended
/// when there is no such group.
#[must_use]
pub fn setup_toolbar(toolbar: &[ToolbarEntry], groups: &[AiItemGroup]) -> Vec<ToolbarEntry> {
    let mut ai_entries = vec![ToolbarEntry::group(AI_GROUP)];
    ai_entries.extend(
        groups
            .iter()
            .flat_map(|g| g.items.iter())
            .filter(|i| EDGELESS_ITEMS.contains(&i.name))
            .map(|i| ToolbarEntry::Item(toolbar_item(i))),
    );

    let mut out = toolbar.to_vec();
    let at = out.iter().position(|e| e.is_group(INSERT_AFTER_GROUP)).map(|edit| {
        out.iter()
            .skip(edit + 1)
            .position(|e| matches!(e, ToolbarEntry::Group { .. }))
            .map_or(out.len(), |offset| edit + 1 + offset)
    });
    match at {
        Some(at) => {
            let tail = out.split_off(at);
            out.extend(ai_entries);
            out.extend(tail);
        }
        None => out.extend(ai_entries),
    }
    out
}

fn item_view(item: &ToolbarItem) -> MenuEntryView {
    if item.sub_items.is_empty() {
        MenuEntryView::Action {
            name: item.name.clone(),
            icon: Some(item.icon),
            alias: Vec::new(),
            command: item.command.clone(),
        }
    } else {
        MenuEntryView::SubMenu {
            name: item.name.clone(),
            icon: Some(item.icon),
            alias: Vec::new(),
            items: item.sub_items.iter().map(item_view).collect(),
        }
    }
}

/// Visible entries for `ctx`. Groups left without items are dropped.
#[must_use]
pub fn visible_entries(toolbar: &[ToolbarEntry], ctx: &MenuContext) -> Vec<MenuEntryView> {
    let mut out: Vec<MenuEntryView> = Vec::new();
    let mut pending_group: Option<&str> = None;
    for entry in toolbar {
        match entry {
            ToolbarEntry::Group { name } => pending_group = Some(name),
            ToolbarEntry::Item(item) => {
                if !item.show_when.as_ref().is_none_or(|p| p(ctx)) {
                    continue;
                }
                if let Some(name) = pending_group.take() {
                    out.push(MenuEntryView::Group { name: name.to_owned() });
                }
                out.push(item_view(item));
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "toolbar_test.rs"]
mod tests;
