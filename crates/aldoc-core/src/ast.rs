//! Document tree types produced by the parser.
//!
//! This module contains all the node types of the parsed document tree.
//! The tree is:
//!
//! - **Constructed once**: all mutation happens during parsing; afterwards
//!   the document is read-only and freely shareable across threads
//! - **Exclusively owned**: every node owns its children outright; there
//!   are no back-pointers, so the tree is `Send + Sync` by construction
//! - **Closed**: block classification is a small tagged sum, not dynamic
//!   dispatch

use std::collections::HashMap;

/// The context tag classifying a block.
///
/// The tag is fixed at construction and determines the shape of the
/// block's [`BlockBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockContext {
    /// Plain prose paragraph.
    Paragraph,
    /// Literal text, from an indented paragraph or a `....` fence.
    Literal,
    /// Source listing, from a `----` fence or a `[source,LANG]` paragraph.
    Listing,
    /// Example block (`====` fence).
    Example,
    /// Quotation (`____` fence); contents are parsed recursively.
    Quote,
    /// Verse (`[verse]` marker up to the next blank line).
    Verse,
    /// Admonition (`[NOTE]` marker or a `NOTE: ` paragraph prefix).
    Note,
    /// Sidebar (`****` fence).
    Sidebar,
    /// Open block (`--` fence); contents are parsed recursively.
    Oblock,
    /// Unordered (bulleted) list.
    Ulist,
    /// Ordered (numbered) list.
    Olist,
    /// Callout list (`<1>` bullets).
    Colist,
    /// Description list (`term::` entries).
    Dlist,
}

impl BlockContext {
    /// The canonical lowercase tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockContext::Paragraph => "paragraph",
            BlockContext::Literal => "literal",
            BlockContext::Listing => "listing",
            BlockContext::Example => "example",
            BlockContext::Quote => "quote",
            BlockContext::Verse => "verse",
            BlockContext::Note => "note",
            BlockContext::Sidebar => "sidebar",
            BlockContext::Oblock => "oblock",
            BlockContext::Ulist => "ulist",
            BlockContext::Olist => "olist",
            BlockContext::Colist => "colist",
            BlockContext::Dlist => "dlist",
        }
    }
}

/// The payload of a block; its shape is determined by the context tag.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockBuffer {
    /// Raw source lines, terminators included (paragraph, literal,
    /// listing, example, verse, note, sidebar).
    Lines(Vec<String>),
    /// Child nodes from recursive dispatch (oblock, quote).
    Elements(Vec<Element>),
    /// List items (ulist, olist, colist).
    Items(Vec<ListItem>),
    /// Term/item pairs (dlist).
    Pairs(Vec<(String, ListItem)>),
}

impl BlockBuffer {
    /// The raw line buffer, if this block holds one.
    pub fn lines(&self) -> Option<&[String]> {
        match self {
            BlockBuffer::Lines(lines) => Some(lines),
            _ => None,
        }
    }

    /// The child elements, if this block holds parsed children.
    pub fn elements(&self) -> Option<&[Element]> {
        match self {
            BlockBuffer::Elements(elements) => Some(elements),
            _ => None,
        }
    }

    /// The list items, if this block is a ulist/olist/colist.
    pub fn items(&self) -> Option<&[ListItem]> {
        match self {
            BlockBuffer::Items(items) => Some(items),
            _ => None,
        }
    }

    /// The term/item pairs, if this block is a dlist.
    pub fn pairs(&self) -> Option<&[(String, ListItem)]> {
        match self {
            BlockBuffer::Pairs(pairs) => Some(pairs),
            _ => None,
        }
    }
}

/// A contiguous region of the document classified by a single context tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Context tag; immutable after construction.
    pub context: BlockContext,
    /// Payload, shaped per the context tag.
    pub buffer: BlockBuffer,
    /// Block title from a preceding `.Title` line.
    pub title: Option<String>,
    /// Caption from a preceding `[caption="..."]` line.
    pub caption: Option<String>,
    /// Anchor id from a preceding `[[id]]` line.
    pub anchor: Option<String>,
    /// Language tag from a preceding `[source,LANG]` line (listings).
    pub source_type: Option<String>,
}

impl Block {
    /// Create a bare block with the given context and payload.
    pub fn new(context: BlockContext, buffer: BlockBuffer) -> Self {
        Self {
            context,
            buffer,
            title: None,
            caption: None,
            anchor: None,
            source_type: None,
        }
    }
}

/// One item of a ulist/olist/colist, or the value side of a dlist entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Bullet nesting depth; meaningful for ulist items (1–5), zero
    /// otherwise.
    pub level: usize,
    /// Flattened text of a leading paragraph or literal child, lines
    /// trimmed and newline-joined.
    pub content: Option<String>,
    /// Remaining child blocks (continuations, nested lists, fences).
    pub blocks: Vec<Element>,
    /// Anchor id attached to the item's leading block.
    pub anchor: Option<String>,
}

impl ListItem {
    /// Create an empty item at the given bullet depth.
    pub fn new(level: usize) -> Self {
        Self {
            level,
            content: None,
            blocks: Vec::new(),
            anchor: None,
        }
    }
}

/// A heading-delimited region of the document.
///
/// Sections nest: every section collected under this one has a strictly
/// greater level.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Heading text, embedded anchor removed.
    pub name: String,
    /// Heading level, 0 (document title) through 4.
    pub level: u8,
    /// Anchor id from a `[[id]]` line above the heading or embedded in a
    /// two-line heading name.
    pub anchor: Option<String>,
    /// Child blocks and subsections, in source order.
    pub blocks: Vec<Element>,
}

/// A node of the document tree: a section or a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A heading-delimited section.
    Section(Section),
    /// A leaf or container block.
    Block(Block),
}

impl Element {
    /// The section, if this element is one.
    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Element::Section(section) => Some(section),
            _ => None,
        }
    }

    /// The block, if this element is one.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Element::Block(block) => Some(block),
            _ => None,
        }
    }

    /// A display title for the element: a block's title or a section's
    /// name.
    pub fn title(&self) -> Option<&str> {
        match self {
            Element::Section(section) => Some(&section.name),
            Element::Block(block) => block.title.as_deref(),
        }
    }
}

/// A parsed document.
///
/// Produced by [`Parser::parse`](crate::Parser::parse); read-only from
/// then on.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The preprocessed source text (lines rejoined after include
    /// expansion, conditional filtering, and substitution).
    pub source: String,
    /// The document header: a level-0 section promoted out of the
    /// element list, its own children hoisted.
    pub header: Option<Section>,
    /// Top-level sections and blocks in source order.
    pub elements: Vec<Element>,
    /// Attribute definitions collected during preprocessing, sanitized
    /// names, last writer wins.
    pub attributes: HashMap<String, String>,
    /// Reference table: anchor/bibliography id to display form.
    pub references: HashMap<String, String>,
}

impl Document {
    /// The attribute map. Definitions use sanitized lowercase names.
    pub fn defines(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// The document title: the header's name, else the first element's
    /// title, else the first element's section name.
    pub fn title(&self) -> Option<&str> {
        if let Some(header) = &self.header {
            return Some(&header.name);
        }
        let first = self.elements.first()?;
        match first {
            Element::Block(block) => block.title.as_deref(),
            Element::Section(section) => Some(&section.name),
        }
    }
}
