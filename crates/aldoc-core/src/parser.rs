//! The aldoc block parser.
//!
//! [`Parser`] configures and runs a parse. Internally a `Builder` walks
//! the line cursor: `next_block` recognizes the block starting at the
//! cursor head and consumes its line range, `list_item_segment` carves
//! out the lines of one list item, and the section routines recognize
//! headings and collect their bodies. These are mutually recursive and
//! share the cursor by exclusive borrow.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, trace};
use regex::Regex;

use crate::ast::{Block, BlockBuffer, BlockContext, Document, Element, ListItem, Section};
use crate::cursor::{is_blank, split_lines, LineCursor};
use crate::error::ParseError;
use crate::patterns::{bullet_depth, PATTERNS};
use crate::preprocess::{sanitize_name, IncludeResolver, Preprocessor};

/// Configurable parser front-end.
///
/// A `Parser` is reusable: each [`parse`](Parser::parse) call constructs
/// an independent [`Document`].
pub struct Parser {
    attributes: HashMap<String, String>,
    include: Option<Box<IncludeResolver>>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a parser with no seed attributes and filesystem include
    /// resolution.
    pub fn new() -> Self {
        Self {
            attributes: HashMap::new(),
            include: None,
        }
    }

    /// Seed an attribute definition, visible to conditionals and
    /// substitutions from the first line onward.
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(sanitize_name(name), value.into());
        self
    }

    /// Install a custom resolver for `include::path[]` directives.
    ///
    /// The default resolver reads the path from the local filesystem.
    pub fn with_include_resolver(
        mut self,
        resolver: impl Fn(&str) -> io::Result<String> + 'static,
    ) -> Self {
        self.include = Some(Box::new(resolver));
        self
    }

    /// Parse input text into a document.
    ///
    /// Only include resolution can fail; every structural problem in the
    /// input degrades best-effort.
    pub fn parse(&self, input: &str) -> Result<Document, ParseError> {
        let raw = split_lines(input);
        let default_resolver = |path: &str| fs::read_to_string(path);
        let resolver: &IncludeResolver = match &self.include {
            Some(resolver) => resolver.as_ref(),
            None => &default_resolver,
        };
        let pre = Preprocessor::new(self.attributes.clone(), resolver).process(raw)?;

        let source = pre.lines.concat();
        let mut builder = Builder {
            references: pre.references,
        };
        let mut cursor = LineCursor::new(pre.lines);
        let mut elements = Vec::new();
        while let Some(element) = builder.next_block(&mut cursor) {
            elements.push(element);
        }
        let (header, elements) = promote_header(elements);

        Ok(Document {
            source,
            header,
            elements,
            attributes: pre.attributes,
            references: builder.references,
        })
    }

    /// Read a file and parse its contents.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Document, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ParseError::io(&path.display().to_string(), e))?;
        self.parse(&text)
    }
}

/// Promote a leading level-0 section to the document header, hoisting
/// its blocks in front of the remaining elements.
fn promote_header(elements: Vec<Element>) -> (Option<Section>, Vec<Element>) {
    let mut iter = elements.into_iter();
    match iter.next() {
        Some(Element::Section(mut section)) if section.level == 0 => {
            let mut rest = std::mem::take(&mut section.blocks);
            rest.extend(iter);
            (Some(section), rest)
        }
        Some(first) => {
            let mut rest = vec![first];
            rest.extend(iter);
            (None, rest)
        }
        None => (None, Vec::new()),
    }
}

/// List kinds the segmenter can be told to treat as item starters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListType {
    Ulist,
    Olist,
    Colist,
    Dlist,
    LitPar,
}

impl ListType {
    fn pattern(self) -> &'static Regex {
        match self {
            ListType::Ulist => &PATTERNS.ulist,
            ListType::Olist => &PATTERNS.olist,
            ListType::Colist => &PATTERNS.colist,
            ListType::Dlist => &PATTERNS.dlist,
            ListType::LitPar => &PATTERNS.lit_par,
        }
    }
}

/// Literal paragraphs continue a list item across blank lines, so they
/// ride along with the proper list kinds by default.
const DEFAULT_LIST_TYPES: &[ListType] = &[
    ListType::Ulist,
    ListType::Olist,
    ListType::Colist,
    ListType::Dlist,
    ListType::LitPar,
];

/// Options for [`list_item_segment`].
struct SegmentOptions<'a> {
    /// Pattern ending the current item; a matching line is pushed back.
    alt_ending: Option<&'a Regex>,
    /// Kinds whose bullets keep the item going across blank lines.
    list_types: &'a [ListType],
    /// Minimum bullet depth; a shallower bullet is pushed back.
    list_level: Option<usize>,
}

impl Default for SegmentOptions<'_> {
    fn default() -> Self {
        Self {
            alt_ending: None,
            list_types: DEFAULT_LIST_TYPES,
            list_level: None,
        }
    }
}

/// Extract the lines belonging to the current list item, including
/// continuations and nested content.
///
/// Stop conditions (all suppressed inside an open-block or listing
/// fence):
///
/// 1. a blank line, unless the next non-blank line starts another item
///    of a kind in `list_types` without matching `alt_ending`, in which
///    case the intervening blanks are absorbed;
/// 2. a line matching `alt_ending` (pushed back);
/// 3. a bullet strictly shallower than `list_level` (pushed back).
fn list_item_segment(cursor: &mut LineCursor, opts: &SegmentOptions) -> Vec<String> {
    let mut segment = Vec::new();
    let mut in_oblock = false;
    let mut in_listing = false;

    while let Some(line) = cursor.pop() {
        if PATTERNS.oblock.is_match(&line) {
            in_oblock = !in_oblock;
            segment.push(line);
            continue;
        }
        if PATTERNS.listing.is_match(&line) {
            in_listing = !in_listing;
            segment.push(line);
            continue;
        }
        if in_oblock || in_listing {
            segment.push(line);
            continue;
        }

        if is_blank(&line) {
            let mut blanks = vec![line];
            while !cursor.is_empty() && is_blank(cursor.peek(0)) {
                if let Some(blank) = cursor.pop() {
                    blanks.push(blank);
                }
            }
            if cursor.is_empty() {
                break;
            }
            let next = cursor.peek(0);
            let continues = opts
                .list_types
                .iter()
                .any(|t| t.pattern().is_match(next))
                && opts.alt_ending.map_or(true, |alt| !alt.is_match(next));
            if !continues {
                break;
            }
            segment.extend(blanks);
            continue;
        }

        if let Some(alt) = opts.alt_ending {
            if alt.is_match(&line) {
                cursor.unshift(line);
                break;
            }
        }

        if let Some(min_level) = opts.list_level {
            if opts.list_types.contains(&ListType::Ulist) {
                if let Some(cap) = PATTERNS.ulist.captures(&line) {
                    if bullet_depth(&cap[1]) < min_level {
                        cursor.unshift(line);
                        break;
                    }
                }
            }
        }

        segment.push(line);
    }
    segment
}

/// Flatten a leading paragraph's lines into list-item content: each line
/// trimmed, newline-joined, with a leading `\.` escape reduced to `.`.
fn flatten_content(lines: &[String]) -> String {
    let trimmed: Vec<&str> = lines.iter().map(|l| l.trim()).collect();
    let joined = trimmed.join("\n");
    match joined.strip_prefix("\\.") {
        Some(rest) => format!(".{}", rest),
        None => joined,
    }
}

/// Pop lines until the next blank line; the blank is consumed.
fn grab_lines_until_blank(cursor: &mut LineCursor) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line) = cursor.pop() {
        if is_blank(&line) {
            break;
        }
        lines.push(line);
    }
    lines
}

/// Pop lines until the closing fence. An unterminated fence consumes
/// the remainder of the input.
fn grab_lines_until_fence(cursor: &mut LineCursor, fence: &Regex) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line) = cursor.pop() {
        if fence.is_match(&line) {
            break;
        }
        lines.push(line);
    }
    lines
}

/// Pop the contiguous run of indented lines, leaving the first
/// non-matching line on the cursor.
fn grab_literal_paragraph(cursor: &mut LineCursor) -> Vec<String> {
    let mut lines = Vec::new();
    while PATTERNS.lit_par.is_match(cursor.peek(0)) {
        if let Some(line) = cursor.pop() {
            lines.push(line);
        }
    }
    lines
}

/// Whether lines one and two at the cursor head form a section heading.
fn is_section_heading(l1: &str, l2: &str) -> bool {
    if PATTERNS.level_title.is_match(l1) {
        return true;
    }
    if !PATTERNS.name.is_match(l1) || !PATTERNS.line.is_match(l2) {
        return false;
    }
    // The underline may be one character shorter or longer than the name.
    let name_len = l1.trim().len() as isize;
    let underline_len = l2.trim().len() as isize;
    (name_len - underline_len).abs() <= 1
}

/// Heading level of a recognized heading pair.
fn heading_level(l1: &str, l2: &str) -> u8 {
    match PATTERNS.level_title.captures(l1) {
        Some(cap) => cap[1].len().saturating_sub(1) as u8,
        None => underline_level(l2),
    }
}

/// Level encoded by a two-line heading's underline character.
fn underline_level(underline: &str) -> u8 {
    match underline.trim_start().chars().next() {
        Some('=') => 0,
        Some('-') => 1,
        Some('~') => 2,
        Some('^') => 3,
        _ => 4,
    }
}

/// Tree construction state: the reference table grows as anchors and
/// section ids are discovered.
struct Builder {
    references: HashMap<String, String>,
}

impl Builder {
    /// Recognize and consume the next block at the cursor head.
    ///
    /// Returns `None` iff the cursor is empty after blank skipping;
    /// otherwise consumes at least one line.
    fn next_block(&mut self, cursor: &mut LineCursor) -> Option<Element> {
        let mut anchor: Option<(String, String)> = None;
        let mut title: Option<String> = None;
        let mut caption: Option<String> = None;
        let mut source_type: Option<String> = None;

        // Marker lines that modify the block that follows them.
        loop {
            cursor.skip_blank_lines();
            if cursor.is_empty() {
                // A dangling anchor at end of input is dropped.
                return None;
            }
            let head = cursor.peek(0).to_string();
            if let Some(cap) = PATTERNS.anchor.captures(&head) {
                let id = cap[1].to_string();
                self.references.insert(id.clone(), format!("[{}]", id));
                cursor.pop();
                anchor = Some((id, head));
                continue;
            }
            if PATTERNS.comment.is_match(&head) {
                cursor.pop();
                continue;
            }
            if let Some(cap) = PATTERNS.title.captures(&head) {
                title = Some(cap[1].to_string());
                cursor.pop();
                continue;
            }
            if let Some(cap) = PATTERNS.listing_source.captures(&head) {
                source_type = Some(cap[1].to_string());
                cursor.pop();
                continue;
            }
            if let Some(cap) = PATTERNS.caption.captures(&head) {
                caption = Some(cap[1].to_string());
                cursor.pop();
                continue;
            }
            break;
        }

        let l1 = cursor.peek(0).to_string();
        let l2 = cursor.peek(1).to_string();
        trace!("dispatching at {:?}", l1.trim_end());

        // A section steals a pending anchor; the raw line travels back
        // with the heading.
        if is_section_heading(&l1, &l2) {
            if let Some((_, raw)) = anchor.take() {
                cursor.unshift(raw);
            }
            return Some(Element::Section(self.next_section(cursor)));
        }

        let mut block = if PATTERNS.oblock.is_match(&l1) {
            self.next_oblock(cursor)
        } else if PATTERNS.olist.is_match(&l1) {
            self.next_flat_list(cursor, BlockContext::Olist, &PATTERNS.olist)
        } else if PATTERNS.colist.is_match(&l1) {
            self.next_flat_list(cursor, BlockContext::Colist, &PATTERNS.colist)
        } else if PATTERNS.ulist.is_match(&l1) {
            self.next_ulist(cursor)
        } else if PATTERNS.dlist.is_match(&l1) {
            self.next_dlist(cursor, &l1)
        } else if PATTERNS.verse.is_match(&l1) {
            cursor.pop();
            Block::new(
                BlockContext::Verse,
                BlockBuffer::Lines(grab_lines_until_blank(cursor)),
            )
        } else if PATTERNS.note.is_match(&l1) {
            cursor.pop();
            Block::new(
                BlockContext::Note,
                BlockBuffer::Lines(grab_lines_until_blank(cursor)),
            )
        } else if PATTERNS.listing.is_match(&l1) {
            cursor.pop();
            Block::new(
                BlockContext::Listing,
                BlockBuffer::Lines(grab_lines_until_fence(cursor, &PATTERNS.listing)),
            )
        } else if PATTERNS.example.is_match(&l1) {
            cursor.pop();
            Block::new(
                BlockContext::Example,
                BlockBuffer::Lines(grab_lines_until_fence(cursor, &PATTERNS.example)),
            )
        } else if PATTERNS.quote.is_match(&l1) {
            cursor.pop();
            let body = grab_lines_until_fence(cursor, &PATTERNS.quote);
            Block::new(
                BlockContext::Quote,
                BlockBuffer::Elements(self.parse_lines(body)),
            )
        } else if PATTERNS.lit_blk.is_match(&l1) {
            cursor.pop();
            Block::new(
                BlockContext::Literal,
                BlockBuffer::Lines(grab_lines_until_fence(cursor, &PATTERNS.lit_blk)),
            )
        } else if PATTERNS.lit_par.is_match(&l1) {
            Block::new(
                BlockContext::Literal,
                BlockBuffer::Lines(grab_literal_paragraph(cursor)),
            )
        } else if PATTERNS.sidebar_blk.is_match(&l1) {
            cursor.pop();
            Block::new(
                BlockContext::Sidebar,
                BlockBuffer::Lines(grab_lines_until_fence(cursor, &PATTERNS.sidebar_blk)),
            )
        } else {
            self.next_paragraph(cursor, source_type.is_some())
        };

        if block.anchor.is_none() {
            block.anchor = anchor.map(|(id, _)| id);
        }
        if block.title.is_none() {
            block.title = title;
        }
        if block.caption.is_none() {
            block.caption = caption;
        }
        if block.source_type.is_none() {
            block.source_type = source_type;
        }
        Some(Element::Block(block))
    }

    /// Parse an extracted slice of lines to completion.
    fn parse_lines(&mut self, lines: Vec<String>) -> Vec<Element> {
        let mut cursor = LineCursor::new(lines);
        let mut elements = Vec::new();
        while let Some(element) = self.next_block(&mut cursor) {
            elements.push(element);
        }
        elements
    }

    /// Open block: grab to the closing `--`, strip trailing blanks,
    /// parse the interior recursively.
    fn next_oblock(&mut self, cursor: &mut LineCursor) -> Block {
        cursor.pop();
        let mut body = grab_lines_until_fence(cursor, &PATTERNS.oblock);
        while body.last().map_or(false, |l| is_blank(l)) {
            body.pop();
        }
        Block::new(
            BlockContext::Oblock,
            BlockBuffer::Elements(self.parse_lines(body)),
        )
    }

    /// Paragraph accumulator: contiguous non-blank lines, pushing back a
    /// listing or open-block fence that appears mid-paragraph.
    fn next_paragraph(&mut self, cursor: &mut LineCursor, has_source: bool) -> Block {
        let mut lines = Vec::new();
        loop {
            let head = cursor.peek(0);
            if head.is_empty() || is_blank(head) {
                break;
            }
            if PATTERNS.listing.is_match(head) || PATTERNS.oblock.is_match(head) {
                break;
            }
            if let Some(line) = cursor.pop() {
                lines.push(line);
            }
        }

        if let Some(first) = lines.first() {
            if let Some(rest) = first.strip_prefix("NOTE: ") {
                lines[0] = rest.to_string();
                return Block::new(BlockContext::Note, BlockBuffer::Lines(lines));
            }
        }
        if has_source {
            Block::new(BlockContext::Listing, BlockBuffer::Lines(lines))
        } else {
            Block::new(BlockContext::Paragraph, BlockBuffer::Lines(lines))
        }
    }

    /// Parse one item segment into a list item, flattening a leading
    /// paragraph or literal child into `content`.
    fn build_list_item(&mut self, segment: Vec<String>, level: usize) -> ListItem {
        let mut blocks = self.parse_lines(segment);
        let mut item = ListItem::new(level);
        let flatten = matches!(
            blocks.first(),
            Some(Element::Block(block)) if matches!(
                block.context,
                BlockContext::Paragraph | BlockContext::Literal
            )
        );
        if flatten {
            if let Element::Block(first) = blocks.remove(0) {
                item.anchor = first.anchor;
                if let BlockBuffer::Lines(lines) = first.buffer {
                    item.content = Some(flatten_content(&lines));
                }
            }
        }
        item.blocks = blocks;
        item
    }

    /// Unordered list loop. Deeper bullets open a sub-list owned by the
    /// preceding sibling item, not by this list.
    fn next_ulist(&mut self, cursor: &mut LineCursor) -> Block {
        let mut items: Vec<ListItem> = Vec::new();
        let mut list_level: Option<usize> = None;
        loop {
            let head = cursor.peek(0).to_string();
            let Some(cap) = PATTERNS.ulist.captures(&head) else {
                break;
            };
            let depth = bullet_depth(&cap[1]);
            match list_level {
                None => list_level = Some(depth),
                Some(level) if depth > level => {
                    let nested = self.next_ulist(cursor);
                    if let Some(previous) = items.last_mut() {
                        previous.blocks.push(Element::Block(nested));
                    }
                    continue;
                }
                Some(level) if depth < level => break,
                Some(_) => {}
            }
            let text = cap[2].to_string();
            cursor.pop();
            cursor.unshift(format!("{}\n", text));
            let segment = list_item_segment(
                cursor,
                &SegmentOptions {
                    alt_ending: Some(&PATTERNS.ulist),
                    list_level: Some(depth),
                    ..Default::default()
                },
            );
            items.push(self.build_list_item(segment, depth));
        }
        Block::new(BlockContext::Ulist, BlockBuffer::Items(items))
    }

    /// Ordered and callout lists: one flat run of bullets.
    fn next_flat_list(
        &mut self,
        cursor: &mut LineCursor,
        context: BlockContext,
        pattern: &Regex,
    ) -> Block {
        let mut items = Vec::new();
        loop {
            let head = cursor.peek(0).to_string();
            let Some(cap) = pattern.captures(&head) else {
                break;
            };
            let text = cap[2].to_string();
            cursor.pop();
            cursor.unshift(format!("{}\n", text));
            let segment = list_item_segment(
                cursor,
                &SegmentOptions {
                    alt_ending: Some(pattern),
                    ..Default::default()
                },
            );
            items.push(self.build_list_item(segment, 0));
        }
        Block::new(context, BlockBuffer::Items(items))
    }

    /// Description list: term/definition pairs sharing the delimiter
    /// captured from the first entry.
    fn next_dlist(&mut self, cursor: &mut LineCursor, first_line: &str) -> Block {
        let delimiter = PATTERNS
            .dlist
            .captures(first_line)
            .map(|cap| cap[2].to_string())
            .unwrap_or_else(|| "::".to_string());
        let term_pattern = PATTERNS.dlist_term(&delimiter);

        let mut pairs = Vec::new();
        loop {
            let head = cursor.peek(0).to_string();
            let Some(cap) = term_pattern.captures(&head) else {
                break;
            };
            let term = cap[1].to_string();
            let inline = cap
                .get(3)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty());
            cursor.pop();
            if let Some(text) = inline {
                cursor.unshift(format!("{}\n", text));
            }
            let segment = list_item_segment(
                cursor,
                &SegmentOptions {
                    alt_ending: Some(term_pattern),
                    ..Default::default()
                },
            );
            pairs.push((term, self.build_list_item(segment, 0)));
        }
        Block::new(BlockContext::Dlist, BlockBuffer::Pairs(pairs))
    }

    /// Build a section: read the heading (and any anchor riding with
    /// it), collect the body up to the next same-or-higher heading, and
    /// parse the collected slice recursively.
    fn next_section(&mut self, cursor: &mut LineCursor) -> Section {
        let mut section = Section {
            name: String::new(),
            level: 0,
            anchor: None,
            blocks: Vec::new(),
        };

        let head = cursor.peek(0).to_string();
        if let Some(cap) = PATTERNS.anchor.captures(&head) {
            section.anchor = Some(cap[1].to_string());
            cursor.pop();
        }

        let l1 = cursor.pop().unwrap_or_default();
        if let Some(cap) = PATTERNS.level_title.captures(&l1) {
            section.level = cap[1].len().saturating_sub(1) as u8;
            section.name = cap[2].to_string();
        } else {
            let l2 = cursor.pop().unwrap_or_default();
            section.level = underline_level(&l2);
            let name = l1.trim();
            match PATTERNS.name_anchor.captures(name) {
                Some(cap) => {
                    section.name = cap[1].to_string();
                    section.anchor = Some(cap[2].to_string());
                }
                None => section.name = name.to_string(),
            }
        }
        if let Some(id) = &section.anchor {
            self.references.insert(id.clone(), format!("[{}]", id));
        }
        debug!("section level {} {:?}", section.level, section.name);

        let mut body: Vec<String> = Vec::new();
        loop {
            if cursor.is_empty() {
                break;
            }
            let l0 = cursor.peek(0).to_string();

            // An anchor directly above a terminating heading stays on
            // the cursor with it.
            if PATTERNS.anchor.is_match(&l0) {
                let h1 = cursor.peek(1).to_string();
                let h2 = cursor.peek(2).to_string();
                if is_section_heading(&h1, &h2) && heading_level(&h1, &h2) <= section.level {
                    break;
                }
            }
            let l1 = cursor.peek(1).to_string();
            if is_section_heading(&l0, &l1) && heading_level(&l0, &l1) <= section.level {
                break;
            }

            let Some(line) = cursor.pop() else {
                break;
            };
            if PATTERNS.listing.is_match(&line) {
                // Listing contents pass through verbatim, closing fence
                // included.
                body.push(line);
                while let Some(inner) = cursor.pop() {
                    let closed = PATTERNS.listing.is_match(&inner);
                    body.push(inner);
                    if closed {
                        break;
                    }
                }
                continue;
            }
            body.push(line);
        }

        section.blocks = self.parse_lines(body);
        section
    }
}
