//! AI actions: identifiers, typed context payloads, and response dispatch.
//!
//! DESIGN
//! ======
//! `AiAction` names every supported action. `ActionContext` is the typed
//! parameter payload for one in-flight action: one variant per handler
//! family, so a handler can only ever see the fields it needs. Dispatch is an
//! exhaustive match over the context (see `dispatch.rs`); actions without a
//! specialized handler share the `Text` variant and the default note
//! insertion.

pub mod dispatch;
pub mod handlers;
pub mod html;
pub mod responses;
pub mod slides;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::doc::{MindmapNode, MindmapStyle};
use crate::panel::Answer;

pub use dispatch::{Dispatched, ResponseHandler, dispatch, dispatch_if_current, response_handler};
pub use slides::{SlideImage, TemplateContent, TemplateElement};

// =============================================================================
// ACTION IDENTIFIER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AiAction {
    Chat,
    Summary,
    Translate,
    ChangeTone,
    ImproveWriting,
    ImproveGrammar,
    FixSpelling,
    MakeLonger,
    MakeShorter,
    ContinueWriting,
    WriteOutline,
    FindActions,
    ExpandMindmap,
    BrainstormMindmap,
    MakeItReal,
    CreateSlides,
    CreateImage,
    ProcessImage,
    FilterImage,
    GenerateCaption,
}

/// Shape of the answer an action produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    Text,
    Url,
    Tree,
}

impl AiAction {
    pub const ALL: [AiAction; 20] = [
        Self::Chat,
        Self::Summary,
        Self::Translate,
        Self::ChangeTone,
        Self::ImproveWriting,
        Self::ImproveGrammar,
        Self::FixSpelling,
        Self::MakeLonger,
        Self::MakeShorter,
        Self::ContinueWriting,
        Self::WriteOutline,
        Self::FindActions,
        Self::ExpandMindmap,
        Self::BrainstormMindmap,
        Self::MakeItReal,
        Self::CreateSlides,
        Self::CreateImage,
        Self::ProcessImage,
        Self::FilterImage,
        Self::GenerateCaption,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Summary => "summary",
            Self::Translate => "translate",
            Self::ChangeTone => "changeTone",
            Self::ImproveWriting => "improveWriting",
            Self::ImproveGrammar => "improveGrammar",
            Self::FixSpelling => "fixSpelling",
            Self::MakeLonger => "makeLonger",
            Self::MakeShorter => "makeShorter",
            Self::ContinueWriting => "continueWriting",
            Self::WriteOutline => "writeOutline",
            Self::FindActions => "findActions",
            Self::ExpandMindmap => "expandMindmap",
            Self::BrainstormMindmap => "brainstormMindmap",
            Self::MakeItReal => "makeItReal",
            Self::CreateSlides => "createSlides",
            Self::CreateImage => "createImage",
            Self::ProcessImage => "processImage",
            Self::FilterImage => "filterImage",
            Self::GenerateCaption => "generateCaption",
        }
    }

    #[must_use]
    pub fn answer_kind(self) -> AnswerKind {
        match self {
            Self::CreateImage | Self::ProcessImage | Self::FilterImage => AnswerKind::Url,
            Self::ExpandMindmap | Self::BrainstormMindmap => AnswerKind::Tree,
            _ => AnswerKind::Text,
        }
    }

    /// Actions whose answer is never inserted as a block.
    #[must_use]
    pub fn excludes_insert(self) -> bool {
        matches!(self, Self::GenerateCaption)
    }
}

impl std::fmt::Display for AiAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra options picked from a menu sub-item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionVariants {
    #[serde(default)]
    pub regenerate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

// =============================================================================
// CONTEXT RECORD
// =============================================================================

/// Typed parameters for one in-flight action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionContext {
    Text {
        action: AiAction,
    },
    Caption,
    ExpandMindmap {
        selected: Vec<Uuid>,
        node: Option<MindmapNode>,
    },
    BrainstormMindmap {
        selected: Vec<Uuid>,
        node: Option<MindmapNode>,
        #[serde(default)]
        style: MindmapStyle,
    },
    MakeItReal {
        width: Option<f64>,
        height: Option<f64>,
    },
    CreateSlides {
        contents: Vec<TemplateContent>,
        images: Vec<Vec<SlideImage>>,
    },
    Image {
        action: AiAction,
    },
}

impl ActionContext {
    /// Empty payload of the right shape for `action`.
    #[must_use]
    pub fn for_action(action: AiAction) -> Self {
        match action {
            AiAction::ExpandMindmap => Self::ExpandMindmap { selected: Vec::new(), node: None },
            AiAction::BrainstormMindmap => {
                Self::BrainstormMindmap { selected: Vec::new(), node: None, style: MindmapStyle::default() }
            }
            AiAction::MakeItReal => Self::MakeItReal { width: None, height: None },
            AiAction::CreateSlides => Self::CreateSlides { contents: Vec::new(), images: Vec::new() },
            AiAction::CreateImage | AiAction::ProcessImage | AiAction::FilterImage => Self::Image { action },
            AiAction::GenerateCaption => Self::Caption,
            AiAction::Chat
            | AiAction::Summary
            | AiAction::Translate
            | AiAction::ChangeTone
            | AiAction::ImproveWriting
            | AiAction::ImproveGrammar
            | AiAction::FixSpelling
            | AiAction::MakeLonger
            | AiAction::MakeShorter
            | AiAction::ContinueWriting
            | AiAction::WriteOutline
            | AiAction::FindActions => Self::Text { action },
        }
    }

    #[must_use]
    pub fn action(&self) -> AiAction {
        match self {
            Self::Text { action } | Self::Image { action } => *action,
            Self::Caption => AiAction::GenerateCaption,
            Self::ExpandMindmap { .. } => AiAction::ExpandMindmap,
            Self::BrainstormMindmap { .. } => AiAction::BrainstormMindmap,
            Self::MakeItReal { .. } => AiAction::MakeItReal,
            Self::CreateSlides { .. } => AiAction::CreateSlides,
        }
    }

    /// Attach the selection the action was triggered on.
    #[must_use]
    pub fn with_selection(mut self, ids: &[Uuid]) -> Self {
        match &mut self {
            Self::ExpandMindmap { selected, .. } | Self::BrainstormMindmap { selected, .. } => {
                *selected = ids.to_vec();
            }
            _ => {}
        }
        self
    }

    /// Fill payload fields derived from a completed answer. Mindmap actions
    /// take their tree from a tree answer or from a markdown outline; slides
    /// lay out a markdown deck. Fields already set are kept.
    pub fn absorb_answer(&mut self, answer: &Answer) {
        match self {
            Self::ExpandMindmap { node, .. } | Self::BrainstormMindmap { node, .. } => {
                if node.is_none() {
                    *node = match answer {
                        Answer::Tree(tree) => Some(tree.clone()),
                        Answer::Text(text) => MindmapNode::from_markdown(text),
                        Answer::Url(_) => None,
                    };
                }
            }
            Self::CreateSlides { contents, images } => {
                if let (true, Answer::Text(text)) = (contents.is_empty(), answer) {
                    let (deck, groups) = slides::deck_from_markdown(text);
                    *contents = deck;
                    *images = groups;
                }
            }
            Self::Text { .. } | Self::Caption | Self::MakeItReal { .. } | Self::Image { .. } => {}
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
