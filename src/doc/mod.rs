//! Document model: blocks, surface elements, and the transactional scope.
//!
//! DESIGN
//! ======
//! A `Document` owns two stores. Blocks form a tree rooted at the page block
//! (notes, paragraphs, images, HTML embeds). Surface elements are free-floating
//! canvas shapes and the mindmaps that group them. Handlers that materialize
//! AI answers mutate both stores, always inside `transact` so renderers never
//! observe a half-applied batch.
//!
//! `transact` snapshots both stores on entry. An `Err` from the closure
//! restores the snapshot; `Ok` commits and bumps `version`. Nested calls join
//! the outermost scope.

pub mod bound;
pub mod markdown;
pub mod mindmap;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bound::Bound;
pub use mindmap::{MindmapElement, MindmapNode, MindmapStyle, MindmapTree};

pub type BlockId = Uuid;
pub type ElementId = Uuid;

pub const PAGE_FLAVOUR: &str = "affine:page";
pub const SURFACE_FLAVOUR: &str = "affine:surface";
pub const NOTE_FLAVOUR: &str = "affine:note";
pub const PARAGRAPH_FLAVOUR: &str = "affine:paragraph";
pub const LIST_FLAVOUR: &str = "affine:list";
pub const CODE_FLAVOUR: &str = "affine:code";
pub const DIVIDER_FLAVOUR: &str = "affine:divider";
pub const IMAGE_FLAVOUR: &str = "affine:image";
pub const EMBED_HTML_FLAVOUR: &str = "affine:embed-html";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("block not found: {0}")]
    BlockNotFound(BlockId),
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("element {0} is not a mindmap")]
    NotAMindmap(ElementId),
    #[error("node {node} is not part of mindmap {mindmap}")]
    NodeNotInMindmap { mindmap: ElementId, node: ElementId },
    #[error("block {0} cannot hold children")]
    InvalidParent(BlockId),
}

impl crate::error::ErrorCode for DocError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BlockNotFound(_) => "E_BLOCK_NOT_FOUND",
            Self::ElementNotFound(_) => "E_ELEMENT_NOT_FOUND",
            Self::NotAMindmap(_) => "E_NOT_A_MINDMAP",
            Self::NodeNotInMindmap { .. } => "E_NODE_NOT_IN_MINDMAP",
            Self::InvalidParent(_) => "E_INVALID_PARENT",
        }
    }
}

// =============================================================================
// BLOCKS
// =============================================================================

/// Where a note is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteDisplayMode {
    DocAndEdgeless,
    DocOnly,
    EdgelessOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParagraphKind {
    Text,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bulleted,
    Numbered,
    Todo,
}

/// Per-flavour block properties. The tag doubles as the block flavour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flavour")]
pub enum BlockProps {
    #[serde(rename = "affine:page")]
    Page { title: String },
    #[serde(rename = "affine:surface")]
    Surface,
    #[serde(rename = "affine:note")]
    Note { xywh: Bound, display_mode: NoteDisplayMode },
    #[serde(rename = "affine:paragraph")]
    Paragraph { kind: ParagraphKind, text: String },
    #[serde(rename = "affine:list")]
    List { kind: ListKind, text: String, checked: bool },
    #[serde(rename = "affine:code")]
    Code { language: Option<String>, text: String },
    #[serde(rename = "affine:divider")]
    Divider,
    #[serde(rename = "affine:image")]
    Image { source_id: String, xywh: Bound, caption: Option<String> },
    #[serde(rename = "affine:embed-html")]
    EmbedHtml { html: String, design: String, xywh: Bound },
}

impl BlockProps {
    #[must_use]
    pub fn flavour(&self) -> &'static str {
        match self {
            Self::Page { .. } => PAGE_FLAVOUR,
            Self::Surface => SURFACE_FLAVOUR,
            Self::Note { .. } => NOTE_FLAVOUR,
            Self::Paragraph { .. } => PARAGRAPH_FLAVOUR,
            Self::List { .. } => LIST_FLAVOUR,
            Self::Code { .. } => CODE_FLAVOUR,
            Self::Divider => DIVIDER_FLAVOUR,
            Self::Image { .. } => IMAGE_FLAVOUR,
            Self::EmbedHtml { .. } => EMBED_HTML_FLAVOUR,
        }
    }

    /// Canvas bound for blocks that live on the edgeless surface.
    #[must_use]
    pub fn xywh(&self) -> Option<Bound> {
        match self {
            Self::Note { xywh, .. } | Self::Image { xywh, .. } | Self::EmbedHtml { xywh, .. } => Some(*xywh),
            _ => None,
        }
    }

    fn accepts_children(&self) -> bool {
        matches!(self, Self::Page { .. } | Self::Surface | Self::Note { .. } | Self::List { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub parent: Option<BlockId>,
    pub children: Vec<BlockId>,
    pub props: BlockProps,
}

// =============================================================================
// SURFACE ELEMENTS
// =============================================================================

/// A rectangular text shape on the canvas. Mindmap nodes are shapes whose
/// `group` points at the owning mindmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub id: ElementId,
    pub xywh: Bound,
    pub text: String,
    pub font_size: f64,
    pub group: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SurfaceElement {
    Shape(ShapeElement),
    Mindmap(MindmapElement),
}

impl SurfaceElement {
    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Self::Shape(s) => s.id,
            Self::Mindmap(m) => m.id,
        }
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: Uuid,
    root: BlockId,
    surface: BlockId,
    blocks: HashMap<BlockId, Block>,
    elements: HashMap<ElementId, SurfaceElement>,
    version: u64,
    #[serde(skip)]
    depth: usize,
}

impl Document {
    /// Create a document with a page root and a surface block under it.
    #[must_use]
    pub fn new(title: &str) -> Self {
        let root = Uuid::new_v4();
        let surface = Uuid::new_v4();
        let mut blocks = HashMap::new();
        blocks.insert(
            root,
            Block { id: root, parent: None, children: vec![surface], props: BlockProps::Page { title: title.to_owned() } },
        );
        blocks.insert(surface, Block { id: surface, parent: Some(root), children: Vec::new(), props: BlockProps::Surface });
        Self { id: Uuid::new_v4(), root, surface, blocks, elements: HashMap::new(), version: 0, depth: 0 }
    }

    #[must_use]
    pub fn root_id(&self) -> BlockId {
        self.root
    }

    #[must_use]
    pub fn surface_id(&self) -> BlockId {
        self.surface
    }

    /// Number of committed transactions.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Run `f` as one all-or-nothing batch.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error after restoring the pre-batch state.
    pub fn transact<T, E>(&mut self, f: impl FnOnce(&mut Document) -> Result<T, E>) -> Result<T, E> {
        if self.depth > 0 {
            return f(self);
        }
        let blocks = self.blocks.clone();
        let elements = self.elements.clone();
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        match &result {
            Ok(_) => self.version += 1,
            Err(_) => {
                self.blocks = blocks;
                self.elements = elements;
            }
        }
        result
    }

    // -------------------------------------------------------------------------
    // blocks
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks of one flavour, in no particular order.
    #[must_use]
    pub fn blocks_by_flavour(&self, flavour: &str) -> Vec<&Block> {
        self.blocks
            .values()
            .filter(|b| b.props.flavour() == flavour)
            .collect()
    }

    /// Ordered children of a block. Empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: BlockId) -> &[BlockId] {
        self.blocks.get(&id).map_or(&[], |b| b.children.as_slice())
    }

    /// Append a block under `parent`.
    ///
    /// # Errors
    ///
    /// `BlockNotFound` for an unknown parent, `InvalidParent` when the parent
    /// flavour holds no children.
    pub fn add_block(&mut self, props: BlockProps, parent: BlockId) -> Result<BlockId, DocError> {
        let parent_block = self
            .blocks
            .get_mut(&parent)
            .ok_or(DocError::BlockNotFound(parent))?;
        if !parent_block.props.accepts_children() {
            return Err(DocError::InvalidParent(parent));
        }
        let id = Uuid::new_v4();
        parent_block.children.push(id);
        self.blocks
            .insert(id, Block { id, parent: Some(parent), children: Vec::new(), props });
        Ok(id)
    }

    /// Mutate a block's props in place.
    ///
    /// # Errors
    ///
    /// `BlockNotFound` for an unknown id.
    pub fn update_block(&mut self, id: BlockId, update: impl FnOnce(&mut BlockProps)) -> Result<(), DocError> {
        let block = self.blocks.get_mut(&id).ok_or(DocError::BlockNotFound(id))?;
        update(&mut block.props);
        Ok(())
    }

    /// Remove a block and its descendants.
    ///
    /// # Errors
    ///
    /// `BlockNotFound` for an unknown id.
    pub fn remove_block(&mut self, id: BlockId) -> Result<(), DocError> {
        let block = self.blocks.remove(&id).ok_or(DocError::BlockNotFound(id))?;
        if let Some(parent) = block.parent.and_then(|p| self.blocks.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut stack = block.children;
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.blocks.remove(&child) {
                stack.extend(removed.children);
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // surface elements
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&SurfaceElement> {
        self.elements.get(&id)
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> impl Iterator<Item = &SurfaceElement> {
        self.elements.values()
    }

    #[must_use]
    pub fn shape(&self, id: ElementId) -> Option<&ShapeElement> {
        match self.elements.get(&id) {
            Some(SurfaceElement::Shape(s)) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn shape_mut(&mut self, id: ElementId) -> Option<&mut ShapeElement> {
        match self.elements.get_mut(&id) {
            Some(SurfaceElement::Shape(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn mindmap(&self, id: ElementId) -> Option<&MindmapElement> {
        match self.elements.get(&id) {
            Some(SurfaceElement::Mindmap(m)) => Some(m),
            _ => None,
        }
    }

    /// Add a free-standing text shape.
    pub fn add_shape(&mut self, xywh: Bound, text: &str) -> ElementId {
        self.insert_shape(xywh, text, None)
    }

    pub(crate) fn insert_shape(&mut self, xywh: Bound, text: &str, group: Option<ElementId>) -> ElementId {
        let id = Uuid::new_v4();
        let shape = ShapeElement { id, xywh, text: text.to_owned(), font_size: mindmap::DEFAULT_FONT_SIZE, group };
        self.elements.insert(id, SurfaceElement::Shape(shape));
        id
    }

    pub(crate) fn insert_element(&mut self, element: SurfaceElement) {
        self.elements.insert(element.id(), element);
    }

    /// Remove an element. Removing a mindmap also removes every node shape.
    ///
    /// # Errors
    ///
    /// `ElementNotFound` for an unknown id.
    pub fn remove_element(&mut self, id: ElementId) -> Result<(), DocError> {
        let element = self.elements.remove(&id).ok_or(DocError::ElementNotFound(id))?;
        if let SurfaceElement::Mindmap(m) = element {
            for node in m.tree.element_ids() {
                self.elements.remove(&node);
            }
        }
        Ok(())
    }

    /// Canvas bound of a block or element, whichever the id names.
    #[must_use]
    pub fn bound_of(&self, id: Uuid) -> Option<Bound> {
        if let Some(block) = self.blocks.get(&id) {
            return block.props.xywh();
        }
        match self.elements.get(&id)? {
            SurfaceElement::Shape(s) => Some(s.xywh),
            SurfaceElement::Mindmap(m) => self.mindmap_bound(m),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
