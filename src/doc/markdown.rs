//! Markdown → block conversion for AI answers inserted as notes.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{BlockId, BlockProps, DocError, Document, ListKind, ParagraphKind};

/// A block parsed from markdown, with nested children (list items only).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    pub props: BlockProps,
    pub children: Vec<ParsedBlock>,
}

impl ParsedBlock {
    fn leaf(props: BlockProps) -> Self {
        Self { props, children: Vec::new() }
    }
}

enum Pending {
    Paragraph(ParagraphKind),
    Code(Option<String>),
}

#[derive(Default)]
struct Builder {
    out: Vec<ParsedBlock>,
    lists: Vec<ListKind>,
    items: Vec<ParsedBlock>,
    pending: Option<Pending>,
    buffer: String,
    quote_depth: usize,
}

impl Builder {
    fn emit(&mut self, block: ParsedBlock) {
        match self.items.last_mut() {
            Some(item) => item.children.push(block),
            None => self.out.push(block),
        }
    }

    /// Move buffered inline text into the innermost open list item, if its
    /// own text is still empty. Returns `false` when nothing was absorbed.
    fn absorb_into_item(&mut self) -> bool {
        let Some(ParsedBlock { props: BlockProps::List { text, .. }, .. }) = self.items.last_mut() else {
            return false;
        };
        if !text.is_empty() {
            return false;
        }
        *text = self.buffer.trim().to_owned();
        self.buffer.clear();
        true
    }

    fn flush_loose_text(&mut self) {
        if self.buffer.trim().is_empty() {
            self.buffer.clear();
            return;
        }
        if !self.absorb_into_item() {
            let text = std::mem::take(&mut self.buffer).trim().to_owned();
            self.emit(ParsedBlock::leaf(BlockProps::Paragraph { kind: ParagraphKind::Text, text }));
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                let kind = if self.quote_depth > 0 { ParagraphKind::Quote } else { ParagraphKind::Text };
                self.pending = Some(Pending::Paragraph(kind));
            }
            Tag::Heading { level, .. } => {
                self.pending = Some(Pending::Paragraph(heading_kind(level)));
            }
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.pending = Some(Pending::Code(language));
            }
            Tag::BlockQuote(_) => self.quote_depth += 1,
            Tag::List(start) => {
                self.flush_loose_text();
                self.lists
                    .push(if start.is_some() { ListKind::Numbered } else { ListKind::Bulleted });
            }
            Tag::Item => {
                let kind = self.lists.last().copied().unwrap_or(ListKind::Bulleted);
                self.items
                    .push(ParsedBlock::leaf(BlockProps::List { kind, text: String::new(), checked: false }));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) => {
                let kind = match self.pending.take() {
                    Some(Pending::Paragraph(kind)) => kind,
                    _ => ParagraphKind::Text,
                };
                if kind == ParagraphKind::Text && self.absorb_into_item() {
                    return;
                }
                let text = std::mem::take(&mut self.buffer).trim().to_owned();
                self.emit(ParsedBlock::leaf(BlockProps::Paragraph { kind, text }));
            }
            TagEnd::CodeBlock => {
                let language = match self.pending.take() {
                    Some(Pending::Code(language)) => language,
                    _ => None,
                };
                let text = std::mem::take(&mut self.buffer)
                    .trim_end_matches('\n')
                    .to_owned();
                self.emit(ParsedBlock::leaf(BlockProps::Code { language, text }));
            }
            TagEnd::BlockQuote(_) => self.quote_depth = self.quote_depth.saturating_sub(1),
            TagEnd::List(_) => {
                self.lists.pop();
            }
            TagEnd::Item => {
                self.flush_loose_text();
                if let Some(item) = self.items.pop() {
                    self.emit(item);
                }
            }
            _ => {}
        }
    }

    fn task_marker(&mut self, done: bool) {
        if let Some(ParsedBlock { props: BlockProps::List { kind, checked, .. }, .. }) = self.items.last_mut() {
            *kind = ListKind::Todo;
            *checked = done;
        }
    }
}

fn heading_kind(level: HeadingLevel) -> ParagraphKind {
    match level {
        HeadingLevel::H1 => ParagraphKind::H1,
        HeadingLevel::H2 => ParagraphKind::H2,
        HeadingLevel::H3 => ParagraphKind::H3,
        HeadingLevel::H4 => ParagraphKind::H4,
        HeadingLevel::H5 => ParagraphKind::H5,
        HeadingLevel::H6 => ParagraphKind::H6,
    }
}

/// Parse markdown into paragraph, heading, list, code and divider blocks.
#[must_use]
pub fn parse_markdown(markdown: &str) -> Vec<ParsedBlock> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut b = Builder::default();
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => b.start(tag),
            Event::End(tag) => b.end(tag),
            Event::Text(text) | Event::Code(text) => b.buffer.push_str(&text),
            Event::SoftBreak => b.buffer.push(' '),
            Event::HardBreak => b.buffer.push('\n'),
            Event::Rule => b.emit(ParsedBlock::leaf(BlockProps::Divider)),
            Event::TaskListMarker(done) => b.task_marker(done),
            _ => {}
        }
    }
    b.flush_loose_text();
    b.out
}

impl Document {
    /// Append the blocks parsed from `markdown` under `parent`.
    ///
    /// # Errors
    ///
    /// Propagates `add_block` failures (unknown parent).
    pub fn insert_markdown(&mut self, parent: BlockId, markdown: &str) -> Result<Vec<BlockId>, DocError> {
        let parsed = parse_markdown(markdown);
        let mut ids = Vec::with_capacity(parsed.len());
        for block in parsed {
            ids.push(self.insert_parsed(parent, block)?);
        }
        Ok(ids)
    }

    fn insert_parsed(&mut self, parent: BlockId, block: ParsedBlock) -> Result<BlockId, DocError> {
        let id = self.add_block(block.props, parent)?;
        for child in block.children {
            self.insert_parsed(id, child)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
#[path = "markdown_test.rs"]
mod tests;
