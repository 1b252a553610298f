//! Mindmap elements: a tree of node shapes grouped under one surface element.
//!
//! Node shapes are regular `ShapeElement`s whose `group` is the mindmap id.
//! The mindmap element itself only stores the tree topology. Layout is a
//! simple right-growing tree: children sit `H_GAP` to the right of their
//! parent, stacked vertically and centred on it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Bound, DocError, Document, ElementId, SurfaceElement};

pub const DEFAULT_FONT_SIZE: f64 = 16.0;

const CHAR_WIDTH_RATIO: f64 = 0.6;
const LINE_HEIGHT_RATIO: f64 = 1.5;
const NODE_PADDING_X: f64 = 16.0;
const NODE_PADDING_Y: f64 = 8.0;
const MIN_NODE_WIDTH: f64 = 80.0;
const MAX_NODE_WIDTH: f64 = 400.0;
const DEFAULT_NODE_WIDTH: f64 = 120.0;
const DEFAULT_NODE_HEIGHT: f64 = 40.0;
const H_GAP: f64 = 80.0;
const V_GAP: f64 = 20.0;
/// Root text for an outline with several top-level items and no heading.
pub const OUTLINE_ROOT_TEXT: &str = "Ideas";

// =============================================================================
// TYPES
// =============================================================================

/// Input tree as produced by the AI provider. `xywh` pins the root position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MindmapNode {
    pub text: String,
    #[serde(default)]
    pub children: Vec<MindmapNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xywh: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MindmapStyle {
    #[default]
    One,
    Two,
    Three,
    Four,
}

/// Tree topology of a placed mindmap; each node names its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindmapTree {
    pub element: ElementId,
    pub children: Vec<MindmapTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindmapElement {
    pub id: ElementId,
    pub tree: MindmapTree,
    pub style: MindmapStyle,
}

impl MindmapTree {
    /// Every shape id in the tree, pre-order.
    #[must_use]
    pub fn element_ids(&self) -> Vec<ElementId> {
        let mut out = vec![self.element];
        for child in &self.children {
            out.extend(child.element_ids());
        }
        out
    }

    #[must_use]
    pub fn find(&self, element: ElementId) -> Option<&MindmapTree> {
        if self.element == element {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(element))
    }

    fn find_mut(&mut self, element: ElementId) -> Option<&mut MindmapTree> {
        if self.element == element {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(element))
    }
}

impl MindmapNode {
    #[must_use]
    pub fn new(text: &str, children: Vec<MindmapNode>) -> Self {
        Self { text: text.to_owned(), children, xywh: None }
    }

    /// Total node count including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(MindmapNode::node_count).sum::<usize>()
    }

    /// Build a tree from a markdown outline. A leading heading becomes the
    /// root; otherwise a lone top-level list item does. Several top-level
    /// items without a heading hang under a synthetic root. Nesting follows
    /// indentation width.
    #[must_use]
    pub fn from_markdown(text: &str) -> Option<MindmapNode> {
        let mut heading: Option<MindmapNode> = None;
        let mut stack: Vec<(usize, MindmapNode)> = Vec::new();
        let mut tops: Vec<MindmapNode> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let indent = line
                .chars()
                .take_while(|c| c.is_whitespace())
                .map(|c| if c == '\t' { 4 } else { 1 })
                .sum::<usize>();
            let trimmed = line.trim();
            if heading.is_none() && stack.is_empty() && tops.is_empty() {
                if let Some(title) = trimmed.strip_prefix('#') {
                    heading = Some(MindmapNode::new(title.trim_start_matches('#').trim(), Vec::new()));
                    continue;
                }
            }
            let Some(item) = strip_list_marker(trimmed) else {
                continue;
            };

            while stack.last().is_some_and(|(i, _)| *i >= indent) {
                if let Some((_, done)) = stack.pop() {
                    attach(&mut stack, &mut tops, done);
                }
            }
            stack.push((indent, MindmapNode::new(item, Vec::new())));
        }
        while let Some((_, done)) = stack.pop() {
            attach(&mut stack, &mut tops, done);
        }

        match heading {
            Some(mut root) => {
                root.children = tops;
                Some(root)
            }
            None if tops.len() > 1 => Some(MindmapNode::new(OUTLINE_ROOT_TEXT, tops)),
            None => tops.into_iter().next(),
        }
    }
}

fn attach(stack: &mut [(usize, MindmapNode)], tops: &mut Vec<MindmapNode>, node: MindmapNode) {
    match stack.last_mut() {
        Some((_, parent)) => parent.children.push(node),
        None => tops.push(node),
    }
}

fn strip_list_marker(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return Some(rest.trim());
        }
    }
    None
}

/// Bound a shape needs to fit `text` at `font_size`.
#[must_use]
pub fn content_size(text: &str, font_size: f64) -> (f64, f64) {
    let lines: Vec<&str> = if text.is_empty() { vec![""] } else { text.lines().collect() };
    let longest = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let width = (longest as f64 * font_size * CHAR_WIDTH_RATIO + NODE_PADDING_X * 2.0).clamp(MIN_NODE_WIDTH, MAX_NODE_WIDTH);
    #[allow(clippy::cast_precision_loss)]
    let height = lines.len() as f64 * font_size * LINE_HEIGHT_RATIO + NODE_PADDING_Y * 2.0;
    (width, height)
}

// =============================================================================
// DOCUMENT OPERATIONS
// =============================================================================

impl Document {
    /// Place a new mindmap built from `node`. The root is positioned at
    /// `node.xywh` when present, else at the origin.
    pub fn add_mindmap(&mut self, node: &MindmapNode, style: MindmapStyle) -> ElementId {
        let id = Uuid::new_v4();
        let origin = node
            .xywh
            .as_deref()
            .and_then(Bound::deserialize)
            .unwrap_or(Bound::new(0.0, 0.0, DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT));
        let tree = self.spawn_tree(node, id, origin);
        self.insert_element(SurfaceElement::Mindmap(MindmapElement { id, tree, style }));
        self.layout_mindmap_tree(id);
        id
    }

    /// Append `subtree` as a new child of `parent` inside `mindmap`.
    ///
    /// # Errors
    ///
    /// `NotAMindmap` or `NodeNotInMindmap` when the target does not resolve.
    pub fn mindmap_add_tree(
        &mut self,
        mindmap: ElementId,
        parent: ElementId,
        subtree: &MindmapNode,
    ) -> Result<ElementId, DocError> {
        let parent_bound = {
            let m = self.mindmap(mindmap).ok_or(DocError::NotAMindmap(mindmap))?;
            if m.tree.find(parent).is_none() {
                return Err(DocError::NodeNotInMindmap { mindmap, node: parent });
            }
            self.shape(parent)
                .map_or(Bound::default(), |s| s.xywh)
        };
        let origin = Bound::new(parent_bound.max_x() + H_GAP, parent_bound.y, DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT);
        let tree = self.spawn_tree(subtree, mindmap, origin);
        let child = tree.element;

        if let Some(SurfaceElement::Mindmap(m)) = self.elements.get_mut(&mindmap) {
            if let Some(node) = m.tree.find_mut(parent) {
                node.children.push(tree);
            }
        }
        self.layout_mindmap_tree(mindmap);
        Ok(child)
    }

    /// Subtree rooted at `node` within `mindmap`.
    #[must_use]
    pub fn mindmap_subtree(&self, mindmap: ElementId, node: ElementId) -> Option<&MindmapTree> {
        self.mindmap(mindmap)?.tree.find(node)
    }

    /// Mindmap owning the given node shape, if any.
    #[must_use]
    pub fn mindmap_of(&self, shape: ElementId) -> Option<ElementId> {
        let group = self.shape(shape)?.group?;
        self.mindmap(group).map(|m| m.id)
    }

    /// `true` when `element` is the root node shape of a mindmap.
    #[must_use]
    pub fn is_mindmap_root(&self, element: ElementId) -> bool {
        self.mindmap_of(element)
            .and_then(|m| self.mindmap(m))
            .is_some_and(|m| m.tree.element == element)
    }

    /// Resize a shape so its text fits.
    ///
    /// # Errors
    ///
    /// `ElementNotFound` when `shape` is not a shape element.
    pub fn fit_content(&mut self, shape: ElementId) -> Result<(), DocError> {
        let s = self.shape_mut(shape).ok_or(DocError::ElementNotFound(shape))?;
        let (w, h) = content_size(&s.text, s.font_size);
        s.xywh.w = w;
        s.xywh.h = h;
        Ok(())
    }

    /// Union of all node shapes of a mindmap.
    #[must_use]
    pub fn mindmap_bound(&self, mindmap: &MindmapElement) -> Option<Bound> {
        let bounds: Vec<Bound> = mindmap
            .tree
            .element_ids()
            .into_iter()
            .filter_map(|id| self.shape(id).map(|s| s.xywh))
            .collect();
        Bound::common(&bounds)
    }

    /// Translate the whole mindmap so its bound starts at `target`'s corner.
    ///
    /// # Errors
    ///
    /// `NotAMindmap` for an unknown id.
    pub fn mindmap_move_to(&mut self, mindmap: ElementId, target: Bound) -> Result<(), DocError> {
        let m = self.mindmap(mindmap).ok_or(DocError::NotAMindmap(mindmap))?;
        let Some(current) = self.mindmap_bound(m) else {
            return Ok(());
        };
        let (dx, dy) = (target.x - current.x, target.y - current.y);
        let ids = m.tree.element_ids();
        for id in ids {
            if let Some(s) = self.shape_mut(id) {
                s.xywh.x += dx;
                s.xywh.y += dy;
            }
        }
        Ok(())
    }

    /// Re-run tree layout, keeping the root node where it is.
    ///
    /// # Errors
    ///
    /// `NotAMindmap` for an unknown id.
    pub fn layout_mindmap(&mut self, mindmap: ElementId) -> Result<(), DocError> {
        if self.mindmap(mindmap).is_none() {
            return Err(DocError::NotAMindmap(mindmap));
        }
        self.layout_mindmap_tree(mindmap);
        Ok(())
    }

    fn layout_mindmap_tree(&mut self, mindmap: ElementId) {
        let Some(tree) = self.mindmap(mindmap).map(|m| m.tree.clone()) else {
            return;
        };
        let Some(root) = self.shape(tree.element).map(|s| s.xywh) else {
            return;
        };
        let total = self.subtree_height(&tree);
        let mut placements = Vec::new();
        self.place(&tree, root.x, root.y - (total - root.h) / 2.0, &mut placements);
        for (id, x, y) in placements {
            if let Some(s) = self.shape_mut(id) {
                s.xywh.x = x;
                s.xywh.y = y;
            }
        }
    }

    fn node_size(&self, id: ElementId) -> (f64, f64) {
        self.shape(id)
            .map_or((DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT), |s| (s.xywh.w, s.xywh.h))
    }

    fn subtree_height(&self, tree: &MindmapTree) -> f64 {
        let (_, h) = self.node_size(tree.element);
        if tree.children.is_empty() {
            return h;
        }
        let children: f64 = tree.children.iter().map(|c| self.subtree_height(c)).sum();
        #[allow(clippy::cast_precision_loss)]
        let gaps = (tree.children.len() - 1) as f64 * V_GAP;
        h.max(children + gaps)
    }

    fn place(&self, tree: &MindmapTree, x: f64, top: f64, out: &mut Vec<(ElementId, f64, f64)>) {
        let (w, h) = self.node_size(tree.element);
        let total = self.subtree_height(tree);
        out.push((tree.element, x, top + (total - h) / 2.0));

        let children: f64 = tree.children.iter().map(|c| self.subtree_height(c)).sum();
        #[allow(clippy::cast_precision_loss)]
        let gaps = tree.children.len().saturating_sub(1) as f64 * V_GAP;
        let mut cursor = top + (total - children - gaps) / 2.0;
        for child in &tree.children {
            self.place(child, x + w + H_GAP, cursor, out);
            cursor += self.subtree_height(child) + V_GAP;
        }
    }

    fn spawn_tree(&mut self, node: &MindmapNode, group: ElementId, origin: Bound) -> MindmapTree {
        let element = self.insert_shape(origin, &node.text, Some(group));
        let child_origin = Bound::new(origin.max_x() + H_GAP, origin.y, DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT);
        let children = node
            .children
            .iter()
            .map(|c| self.spawn_tree(c, group, child_origin))
            .collect();
        MindmapTree { element, children }
    }
}

#[cfg(test)]
#[path = "mindmap_test.rs"]
mod tests;
