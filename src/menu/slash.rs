//! Slash menu adapter.
//!
//! Prepends "Ask Zebra" and splices a "Zebra AI" group of curated catalog
//! items into the host slash menu at the start of the "List" group, i.e.
//! right after the basic group.

use std::sync::Arc;

use super::{AiItemConfig, AiItemGroup, Icon, MenuCommand, MenuContext, MenuEntryView, ShowWhen};

pub const AI_GROUP: &str = "Zebra AI";
pub const ASK_AI: &str = "Ask Zebra";
pub const ACTION_WITH_ABOVE: &str = "Action with above";
const INSERT_BEFORE_GROUP: &str = "List";
const AI_ALIAS: &str = "ai";
const AI_STAR_ICON: Icon = "ai-star";
const MORE_ICON: Icon = "more-horizontal";

const RENAMED_ITEMS: [&str; 2] = ["Fix spelling", "Fix grammar"];
const TOP_ITEMS: [&str; 2] = ["Summarize", "Continue writing"];
const SUB_MENU_ITEMS: [&str; 2] = ["Translate to", "Change tone to"];
const NESTED_ITEMS: [&str; 5] = ["Improve writing", "Make it longer", "Make it shorter", "Generate outline", "Find actions"];

#[derive(Clone)]
pub enum SlashMenuItem {
    Group { name: String },
    Action(SlashAction),
    SubMenu(SlashSubMenu),
}

#[derive(Clone)]
pub struct SlashAction {
    pub name: String,
    pub icon: Option<Icon>,
    pub alias: Vec<String>,
    pub show_when: Option<ShowWhen>,
    pub command: MenuCommand,
}

#[derive(Clone)]
pub struct SlashSubMenu {
    pub name: String,
    pub icon: Option<Icon>,
    pub alias: Vec<String>,
    pub show_when: Option<ShowWhen>,
    pub items: Vec<SlashMenuItem>,
}

impl SlashMenuItem {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Group { name } => name,
            Self::Action(a) => &a.name,
            Self::SubMenu(s) => &s.name,
        }
    }

    #[must_use]
    pub fn is_group(&self, name: &str) -> bool {
        matches!(self, Self::Group { name: n } if n == name)
    }

    fn group(name: &str) -> Self {
        Self::Group { name: name.to_owned() }
    }

    fn builtin(name: &str, id: &'static str, icon: Icon) -> Self {
        Self::Action(SlashAction {
            name: name.to_owned(),
            icon: Some(icon),
            alias: Vec::new(),
            show_when: None,
            command: MenuCommand::Builtin { id },
        })
    }
}

/// Host slash menu without AI entries.
#[must_use]
pub fn default_slash_menu() -> Vec<SlashMenuItem> {
    vec![
        SlashMenuItem::group("Basic"),
        SlashMenuItem::builtin("Text", "text", "text"),
        SlashMenuItem::builtin("Heading 1", "h1", "heading-1"),
        SlashMenuItem::builtin("Heading 2", "h2", "heading-2"),
        SlashMenuItem::builtin("Heading 3", "h3", "heading-3"),
        SlashMenuItem::builtin("Quote", "quote", "quote"),
        SlashMenuItem::group(INSERT_BEFORE_GROUP),
        SlashMenuItem::builtin("Bulleted List", "bulleted-list", "bulleted-list"),
        SlashMenuItem::builtin("Numbered List", "numbered-list", "numbered-list"),
        SlashMenuItem::builtin("To-do List", "todo-list", "checkbox"),
        SlashMenuItem::group("Content & Media"),
        SlashMenuItem::builtin("Code Block", "code", "code"),
        SlashMenuItem::builtin("Divider", "divider", "divider"),
        SlashMenuItem::builtin("Image", "image", "image"),
    ]
}

/// Hidden without a mounted AI panel; otherwise the item's own predicate.
fn ai_visibility(item: Option<&AiItemConfig>) -> ShowWhen {
    let inner = item.and_then(|i| i.show_when.clone());
    Arc::new(move |ctx: &MenuContext| ctx.ai_panel_mounted && inner.as_ref().is_none_or(|p| p(ctx)))
}

fn action_item(item: &AiItemConfig) -> SlashMenuItem {
    SlashMenuItem::Action(SlashAction {
        name: item.name.to_owned(),
        icon: Some(item.icon),
        alias: vec![AI_ALIAS.to_owned()],
        show_when: Some(ai_visibility(Some(item))),
        command: item.command(),
    })
}

fn sub_menu_item(item: &AiItemConfig) -> SlashMenuItem {
    let items = item
        .sub_items
        .iter()
        .map(|sub| {
            SlashMenuItem::Action(SlashAction {
                name: sub.label.to_owned(),
                icon: None,
                alias: Vec::new(),
                show_when: None,
                command: sub.command(item.action),
            })
        })
        .collect();
    SlashMenuItem::SubMenu(SlashSubMenu {
        name: item.name.to_owned(),
        icon: Some(item.icon),
        alias: vec![AI_ALIAS.to_owned()],
        show_when: Some(ai_visibility(Some(item))),
        items,
    })
}

/// Catalog items whose name is in `names`, in catalog order.
fn pick<'a>(items: &'a [AiItemConfig], names: &'a [&str]) -> impl Iterator<Item = &'a AiItemConfig> {
    items.iter().filter(move |i| names.contains(&i.name))
}

/// The host `menu` with the AI entries added.
#[must_use]
pub fn setup_slash_menu(menu: &[SlashMenuItem], groups: &[AiItemGroup]) -> Vec<SlashMenuItem> {
    let all: Vec<AiItemConfig> = groups
        .iter()
        .flat_map(|g| g.items.iter().cloned())
        .collect();

    let mut out = Vec::with_capacity(menu.len() + 8);
    out.push(SlashMenuItem::Action(SlashAction {
        name: ASK_AI.to_owned(),
        icon: Some(AI_STAR_ICON),
        alias: Vec::new(),
        show_when: Some(ai_visibility(None)),
        command: MenuCommand::AskAi,
    }));
    out.extend(menu.iter().cloned());

    let mut ai_items = vec![SlashMenuItem::group(AI_GROUP)];
    ai_items.extend(pick(&all, &RENAMED_ITEMS).map(|item| match action_item(item) {
        SlashMenuItem::Action(mut a) => {
            a.name = format!("{} from above", item.name);
            SlashMenuItem::Action(a)
        }
        other => other,
    }));
    ai_items.extend(pick(&all, &TOP_ITEMS).map(action_item));

    let mut nested = vec![SlashMenuItem::group(ACTION_WITH_ABOVE)];
    nested.extend(pick(&all, &SUB_MENU_ITEMS).map(sub_menu_item));
    nested.extend(pick(&all, &NESTED_ITEMS).map(action_item));
    ai_items.push(SlashMenuItem::SubMenu(SlashSubMenu {
        name: ACTION_WITH_ABOVE.to_owned(),
        icon: Some(MORE_ICON),
        alias: Vec::new(),
        show_when: None,
        items: nested,
    }));

    match out.iter().position(|i| i.is_group(INSERT_BEFORE_GROUP)) {
        Some(at) => {
            let tail = out.split_off(at);
            out.extend(ai_items);
            out.extend(tail);
        }
        None => out.extend(ai_items),
    }
    out
}

/// Visible entries for `ctx`. Groups are always kept.
#[must_use]
pub fn visible_items(menu: &[SlashMenuItem], ctx: &MenuContext) -> Vec<MenuEntryView> {
    menu.iter()
        .filter_map(|item| match item {
            SlashMenuItem::Group { name } => Some(MenuEntryView::Group { name: name.clone() }),
            SlashMenuItem::Action(a) => a.show_when.as_ref().is_none_or(|p| p(ctx)).then(|| MenuEntryView::Action {
                name: a.name.clone(),
                icon: a.icon,
                alias: a.alias.clone(),
                command: a.command.clone(),
            }),
            SlashMenuItem::SubMenu(s) => s.show_when.as_ref().is_none_or(|p| p(ctx)).then(|| MenuEntryView::SubMenu {
                name: s.name.clone(),
                icon: s.icon,
                alias: s.alias.clone(),
                items: visible_items(&s.items, ctx),
            }),
        })
        .collect()
}

#[cfg(test)]
#[path = "slash_test.rs"]
mod tests;
