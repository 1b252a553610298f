//! AI item catalog and the menu adapters that splice it into editor menus.
//!
//! DESIGN
//! ======
//! `ai_item_groups` is the single source of AI item descriptors. The slash
//! and toolbar adapters pick curated subsets by name, rewrap them in their
//! own item shapes, and insert them after a named group of an existing menu.
//! Descriptors are rebuilt per call and never persisted. Visibility is a
//! predicate over a `MenuContext` snapshot of the editor.

pub mod slash;
pub mod toolbar;

use std::sync::Arc;

use serde::Serialize;

use crate::actions::{ActionVariants, AiAction};
use crate::doc::{BlockProps, SurfaceElement};
use crate::editor::{Editor, EditorMode};

pub type Icon = &'static str;

/// Visibility predicate.
pub type ShowWhen = Arc<dyn Fn(&MenuContext) -> bool + Send + Sync>;

// =============================================================================
// CONTEXT
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionSummary {
    /// The caret or a text range is inside a block (page mode).
    pub has_text: bool,
    pub blocks: usize,
    pub images: usize,
    pub shapes: usize,
    pub mindmap_nodes: usize,
}

impl SelectionSummary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks == 0 && self.shapes == 0
    }
}

/// Editor state a visibility predicate may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuContext {
    pub mode: EditorMode,
    pub ai_panel_mounted: bool,
    pub selection: SelectionSummary,
}

impl MenuContext {
    #[must_use]
    pub fn from_editor(editor: &Editor, has_text: bool) -> Self {
        let mut selection = SelectionSummary { has_text, ..SelectionSummary::default() };
        for id in &editor.selection.elements {
            if let Some(block) = editor.doc.block(*id) {
                selection.blocks += 1;
                if matches!(block.props, BlockProps::Image { .. }) {
                    selection.images += 1;
                }
            } else if let Some(SurfaceElement::Shape(shape)) = editor.doc.element(*id) {
                selection.shapes += 1;
                if shape.group.is_some_and(|g| editor.doc.mindmap(g).is_some()) {
                    selection.mindmap_nodes += 1;
                }
            }
        }
        Self { mode: editor.mode, ai_panel_mounted: editor.ai_panel_mounted, selection }
    }
}

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// What activating a menu item does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MenuCommand {
    /// Open the inline ask-AI prompt.
    AskAi,
    Run { action: AiAction, variants: ActionVariants },
    /// A non-AI entry of the host menu.
    Builtin { id: &'static str },
}

/// A variant choice under an AI item (`Translate to` → `French`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSubItem {
    pub label: &'static str,
    pub variants: ActionVariants,
}

#[derive(Clone)]
pub struct AiItemConfig {
    pub name: &'static str,
    pub icon: Icon,
    pub action: AiAction,
    pub show_when: Option<ShowWhen>,
    pub sub_items: Vec<AiSubItem>,
}

impl AiItemConfig {
    fn new(name: &'static str, icon: Icon, action: AiAction) -> Self {
        Self { name, icon, action, show_when: None, sub_items: Vec::new() }
    }

    fn when(mut self, predicate: impl Fn(&MenuContext) -> bool + Send + Sync + 'static) -> Self {
        self.show_when = Some(Arc::new(predicate));
        self
    }

    fn with_sub_items(mut self, sub_items: Vec<AiSubItem>) -> Self {
        self.sub_items = sub_items;
        self
    }

    #[must_use]
    pub fn command(&self) -> MenuCommand {
        MenuCommand::Run { action: self.action, variants: ActionVariants::default() }
    }

    /// The item's own predicate; `true` when it has none.
    #[must_use]
    pub fn is_visible(&self, ctx: &MenuContext) -> bool {
        self.show_when.as_ref().is_none_or(|p| p(ctx))
    }
}

impl AiSubItem {
    #[must_use]
    pub fn command(&self, action: AiAction) -> MenuCommand {
        MenuCommand::Run { action, variants: self.variants.clone() }
    }
}

#[derive(Clone)]
pub struct AiItemGroup {
    pub name: &'static str,
    pub items: Vec<AiItemConfig>,
}

// =============================================================================
// CATALOG
// =============================================================================

pub const TRANSLATE_LANGUAGES: [&str; 10] = [
    "English",
    "Spanish",
    "German",
    "French",
    "Italian",
    "Simplified Chinese",
    "Traditional Chinese",
    "Japanese",
    "Russian",
    "Korean",
];

pub const TEXT_TONES: [&str; 5] = ["Professional", "Informal", "Friendly", "Critical", "Humorous"];

pub const IMAGE_FILTER_STYLES: [&str; 4] = ["Clay style", "Sketch style", "Anime style", "Pixel style"];

pub const IMAGE_PROCESSING_TYPES: [&str; 3] = ["Clearer", "Remove background", "Convert to sticker"];

fn text_selected(ctx: &MenuContext) -> bool {
    ctx.selection.has_text || ctx.selection.blocks > 0
}

fn single_image(ctx: &MenuContext) -> bool {
    ctx.selection.images == 1 && ctx.selection.blocks == 1 && ctx.selection.shapes == 0
}

fn variants_for(items: &[&'static str], build: impl Fn(&str) -> ActionVariants) -> Vec<AiSubItem> {
    items
        .iter()
        .map(|&label| AiSubItem { label, variants: build(label) })
        .collect()
}

/// Every AI item, grouped as the panel presents them.
#[must_use]
pub fn ai_item_groups() -> Vec<AiItemGroup> {
    let translate = variants_for(&TRANSLATE_LANGUAGES, |lang| ActionVariants {
        lang: Some(lang.to_owned()),
        ..ActionVariants::default()
    });
    let tones = variants_for(&TEXT_TONES, |tone| ActionVariants {
        tone: Some(tone.to_lowercase()),
        ..ActionVariants::default()
    });
    let filters = variants_for(&IMAGE_FILTER_STYLES, |style| ActionVariants {
        style: Some(style.to_owned()),
        ..ActionVariants::default()
    });
    let processing = variants_for(&IMAGE_PROCESSING_TYPES, |kind| ActionVariants {
        style: Some(kind.to_owned()),
        ..ActionVariants::default()
    });

    vec![
        AiItemGroup {
            name: "edit with AI",
            items: vec![
                AiItemConfig::new("Translate to", "language", AiAction::Translate)
                    .when(text_selected)
                    .with_sub_items(translate),
                AiItemConfig::new("Change tone to", "ai-tone", AiAction::ChangeTone)
                    .when(text_selected)
                    .with_sub_items(tones),
                AiItemConfig::new("Improve writing", "ai-pen", AiAction::ImproveWriting).when(text_selected),
                AiItemConfig::new("Make it longer", "ai-expand", AiAction::MakeLonger).when(text_selected),
                AiItemConfig::new("Make it shorter", "ai-shrink", AiAction::MakeShorter).when(text_selected),
                AiItemConfig::new("Continue writing", "ai-pen", AiAction::ContinueWriting).when(text_selected),
            ],
        },
        AiItemGroup {
            name: "review with AI",
            items: vec![
                AiItemConfig::new("Fix spelling", "ai-spell", AiAction::FixSpelling).when(text_selected),
                AiItemConfig::new("Fix grammar", "ai-grammar", AiAction::ImproveGrammar).when(text_selected),
            ],
        },
        AiItemGroup {
            name: "generate from text",
            items: vec![
                AiItemConfig::new("Summarize", "ai-summary", AiAction::Summary).when(text_selected),
                AiItemConfig::new("Generate outline", "ai-outline", AiAction::WriteOutline).when(text_selected),
                AiItemConfig::new("Find actions", "ai-todo", AiAction::FindActions).when(text_selected),
            ],
        },
        AiItemGroup {
            name: "generate with AI",
            items: vec![
                AiItemConfig::new("Expand from this mind map node", "ai-mindmap", AiAction::ExpandMindmap)
                    .when(|ctx| ctx.selection.mindmap_nodes == 1 && ctx.selection.shapes == 1),
                AiItemConfig::new("Brainstorm ideas with mind map", "ai-mindmap", AiAction::BrainstormMindmap)
                    .when(|ctx| !ctx.selection.is_empty()),
                AiItemConfig::new("Make it real", "ai-make-real", AiAction::MakeItReal)
                    .when(|ctx| !ctx.selection.is_empty()),
                AiItemConfig::new("Generate a presentation", "ai-presentation", AiAction::CreateSlides)
                    .when(|ctx| !ctx.selection.is_empty()),
                AiItemConfig::new("Generate an image", "ai-image", AiAction::CreateImage),
                AiItemConfig::new("Image processing", "ai-image-process", AiAction::ProcessImage)
                    .when(single_image)
                    .with_sub_items(processing),
                AiItemConfig::new("AI image filter", "ai-image-filter", AiAction::FilterImage)
                    .when(single_image)
                    .with_sub_items(filters),
                AiItemConfig::new("Generate caption", "ai-caption", AiAction::GenerateCaption).when(single_image),
            ],
        },
    ]
}

// =============================================================================
// VIEW
// =============================================================================

/// Serializable, visibility-filtered menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuEntryView {
    Group {
        name: String,
    },
    Action {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<Icon>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        alias: Vec<String>,
        #[serde(flatten)]
        command: MenuCommand,
    },
    SubMenu {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<Icon>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        alias: Vec<String>,
        items: Vec<MenuEntryView>,
    },
}

impl MenuEntryView {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Group { name } | Self::Action { name, .. } | Self::SubMenu { name, .. } => name,
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
