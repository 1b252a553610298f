//! Slide templates: content groups inserted once their images are fetched.
//!
//! `deck_from_markdown` lays a markdown answer out as slide groups: an
//! optional cover from the leading `#` heading, one slide per `##` section
//! (or per top-level list item when there are none), and a closing slide.
//! Images referenced inside a section become that slide's image group.
//!
//! A `TemplateJob` collects the image bytes of one slide group keyed by the
//! template's asset ids. `insert_template` then places the group's elements
//! in a single transaction; an image element whose asset never arrived
//! aborts the whole group.

use std::collections::HashMap;
use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

use crate::doc::{BlockProps, Bound, DocError, NoteDisplayMode};
use crate::editor::Editor;
use crate::images::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum SlidesError {
    #[error("slide asset fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("slide asset {0} was not fetched")]
    MissingAsset(String),

    #[error("slide insertion failed: {0}")]
    Doc(#[from] DocError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateElement {
    Shape { xywh: Bound, text: String },
    Note { xywh: Bound, markdown: String },
    Image { xywh: Bound, source_id: String },
}

/// One slide group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateContent {
    pub elements: Vec<TemplateElement>,
}

/// An image a slide group references by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideImage {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Default)]
pub struct TemplateJob {
    pub assets: HashMap<String, Vec<u8>>,
}

impl TemplateJob {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the fetched assets into the editor and place every element of
    /// `content`.
    ///
    /// # Errors
    ///
    /// `MissingAsset` when an image element references an unfetched asset;
    /// `Doc` on block insertion failure. Nothing is inserted on error.
    pub fn insert_template(self, editor: &mut Editor, content: &TemplateContent) -> Result<(), SlidesError> {
        for element in &content.elements {
            if let TemplateElement::Image { source_id, .. } = element {
                if !self.assets.contains_key(source_id) {
                    return Err(SlidesError::MissingAsset(source_id.clone()));
                }
            }
        }
        let root = editor.doc.root_id();
        let surface = editor.doc.surface_id();
        editor.doc.transact(|doc| {
            for element in &content.elements {
                match element {
                    TemplateElement::Shape { xywh, text } => {
                        doc.add_shape(*xywh, text);
                    }
                    TemplateElement::Note { xywh, markdown } => {
                        let note = doc.add_block(
                            BlockProps::Note { xywh: *xywh, display_mode: NoteDisplayMode::EdgelessOnly },
                            root,
                        )?;
                        doc.insert_markdown(note, markdown)?;
                    }
                    TemplateElement::Image { xywh, source_id } => {
                        let props = BlockProps::Image { source_id: source_id.clone(), xywh: *xywh, caption: None };
                        doc.add_block(props, surface)?;
                    }
                }
            }
            Ok::<_, DocError>(())
        })?;
        for (id, bytes) in self.assets {
            editor.assets.set(&id, bytes);
        }
        Ok(())
    }
}

// =============================================================================
// DECK LAYOUT
// =============================================================================

const SLIDE_WIDTH: f64 = 960.0;
const SLIDE_HEIGHT: f64 = 540.0;
const SLIDE_GAP: f64 = 100.0;
const SLIDE_MARGIN: f64 = 40.0;
const TITLE_HEIGHT: f64 = 80.0;
const SLIDE_IMAGE_WIDTH: f64 = 240.0;
const SLIDE_IMAGE_HEIGHT: f64 = 180.0;

/// Text of the slide that ends every deck.
pub const CLOSING_SLIDE_TEXT: &str = "Thank you";

/// Slide groups and their image groups for a markdown deck, index-aligned.
/// Empty when the answer has no sections.
#[must_use]
pub fn deck_from_markdown(text: &str) -> (Vec<TemplateContent>, Vec<Vec<SlideImage>>) {
    let outline = scan(text);
    let sections = if outline.headed.is_empty() { &outline.items } else { &outline.headed };
    if sections.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut contents = Vec::with_capacity(sections.len() + 2);
    let mut images = Vec::with_capacity(sections.len() + 2);
    if let Some(title) = &outline.deck_title {
        contents.push(title_slide(0, title));
        images.push(Vec::new());
    }
    for section in sections {
        let index = contents.len();
        let group: Vec<SlideImage> = outline
            .images
            .iter()
            .filter(|(r, _)| within(r, &section.span))
            .enumerate()
            .map(|(k, (_, url))| SlideImage { id: format!("slide-{index}-image-{k}"), url: url.clone() })
            .collect();
        let body = section
            .body
            .as_ref()
            .map(|b| body_markdown(text, b, &outline.images))
            .unwrap_or_default();
        contents.push(content_slide(index, &section.title, &body, &group));
        images.push(group);
    }
    contents.push(title_slide(contents.len(), CLOSING_SLIDE_TEXT));
    images.push(Vec::new());
    (contents, images)
}

struct Section {
    title: String,
    body: Option<Range<usize>>,
    span: Range<usize>,
}

#[derive(Default)]
struct Outline {
    deck_title: Option<String>,
    headed: Vec<Section>,
    items: Vec<Section>,
    images: Vec<(Range<usize>, String)>,
}

fn scan(text: &str) -> Outline {
    let mut out = Outline::default();
    let mut heading: Option<(HeadingLevel, usize)> = None;
    let mut item: Option<Section> = None;
    let mut buffer = String::new();
    let mut depth = 0_usize;
    let mut in_image = false;

    for (event, range) in Parser::new_ext(text, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((level, range.start));
                buffer.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some((level, start)) = heading.take() else {
                    continue;
                };
                let title = std::mem::take(&mut buffer).trim().to_owned();
                match level {
                    HeadingLevel::H1 if out.deck_title.is_none() && out.headed.is_empty() => {
                        out.deck_title = Some(title);
                    }
                    HeadingLevel::H2 => {
                        if let Some(prev) = out.headed.last_mut() {
                            prev.span.end = start;
                            if let Some(body) = prev.body.as_mut() {
                                body.end = start;
                            }
                        }
                        out.headed.push(Section { title, body: Some(range.end..text.len()), span: start..text.len() });
                    }
                    _ => {}
                }
            }
            Event::Start(Tag::List(_)) => {
                depth += 1;
                if let (2, Some(open)) = (depth, item.as_mut()) {
                    if open.body.is_none() {
                        open.body = Some(line_start(text, range.start)..range.end);
                    }
                }
            }
            Event::End(TagEnd::List(_)) => {
                if let (2, Some(Section { body: Some(body), .. })) = (depth, item.as_mut()) {
                    body.end = range.end;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Start(Tag::Item) if depth == 1 => {
                item = Some(Section { title: String::new(), body: None, span: range });
            }
            Event::End(TagEnd::Item) if depth == 1 => {
                if let Some(mut done) = item.take() {
                    done.title = done.title.trim().to_owned();
                    out.items.push(done);
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                in_image = true;
                out.images.push((range, dest_url.to_string()));
            }
            Event::End(TagEnd::Image) => in_image = false,
            Event::Text(t) | Event::Code(t) if !in_image => push_title(&mut buffer, item.as_mut(), heading.is_some(), depth, &t),
            Event::SoftBreak | Event::HardBreak => push_title(&mut buffer, item.as_mut(), heading.is_some(), depth, " "),
            _ => {}
        }
    }
    out
}

/// Route inline text to the open heading, or to the title of the open
/// top-level item before its nested list starts.
fn push_title(buffer: &mut String, item: Option<&mut Section>, in_heading: bool, depth: usize, text: &str) {
    if in_heading {
        buffer.push_str(text);
    } else if let (1, Some(open)) = (depth, item) {
        if open.body.is_none() {
            open.title.push_str(text);
        }
    }
}

fn within(inner: &Range<usize>, outer: &Range<usize>) -> bool {
    inner.start >= outer.start && inner.end <= outer.end
}

fn line_start(text: &str, at: usize) -> usize {
    text.get(..at)
        .and_then(|head| head.rfind('\n'))
        .map_or(0, |i| i + 1)
}

/// Source of `body` with image syntax cut out, dedented.
fn body_markdown(text: &str, body: &Range<usize>, images: &[(Range<usize>, String)]) -> String {
    let mut out = String::new();
    let mut at = body.start;
    for (range, _) in images.iter().filter(|(r, _)| within(r, body)) {
        if range.start >= at {
            out.push_str(text.get(at..range.start).unwrap_or_default());
            at = range.end;
        }
    }
    out.push_str(text.get(at..body.end).unwrap_or_default());
    dedent(&out).trim().to_owned()
}

fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(clippy::cast_precision_loss)]
fn slide_x(index: usize) -> f64 {
    index as f64 * (SLIDE_WIDTH + SLIDE_GAP)
}

fn title_slide(index: usize, text: &str) -> TemplateContent {
    let xywh = Bound::new(
        slide_x(index) + SLIDE_MARGIN,
        (SLIDE_HEIGHT - TITLE_HEIGHT) / 2.0,
        SLIDE_WIDTH - 2.0 * SLIDE_MARGIN,
        TITLE_HEIGHT,
    );
    TemplateContent { elements: vec![TemplateElement::Shape { xywh, text: text.to_owned() }] }
}

fn content_slide(index: usize, title: &str, body: &str, images: &[SlideImage]) -> TemplateContent {
    let x = slide_x(index) + SLIDE_MARGIN;
    let inner = SLIDE_WIDTH - 2.0 * SLIDE_MARGIN;
    let mut elements = vec![TemplateElement::Shape {
        xywh: Bound::new(x, SLIDE_MARGIN, inner, TITLE_HEIGHT),
        text: title.to_owned(),
    }];
    if !body.is_empty() {
        let top = 2.0 * SLIDE_MARGIN + TITLE_HEIGHT;
        let image_row = if images.is_empty() { 0.0 } else { SLIDE_IMAGE_HEIGHT + SLIDE_MARGIN };
        let height = SLIDE_HEIGHT - top - SLIDE_MARGIN - image_row;
        elements.push(TemplateElement::Note { xywh: Bound::new(x, top, inner, height), markdown: body.to_owned() });
    }
    for (k, image) in images.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let offset = k as f64 * (SLIDE_IMAGE_WIDTH + SLIDE_MARGIN);
        elements.push(TemplateElement::Image {
            xywh: Bound::new(
                x + offset,
                SLIDE_HEIGHT - SLIDE_MARGIN - SLIDE_IMAGE_HEIGHT,
                SLIDE_IMAGE_WIDTH,
                SLIDE_IMAGE_HEIGHT,
            ),
            source_id: image.id.clone(),
        });
    }
    TemplateContent { elements }
}

#[cfg(test)]
#[path = "slides_test.rs"]
mod tests;
