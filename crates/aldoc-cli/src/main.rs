//! aldoc CLI - Parse and inspect AsciiDoc-style documents
//!
//! Usage:
//!   adcli [OPTIONS] <FILE>
//!
//! Commands:
//!   parse     Parse and display document structure (default)
//!   stats     Show document statistics

use std::collections::HashMap;
use std::env;
use std::process;

use aldoc_core::{Block, BlockBuffer, Document, Element, ListItem, Parser, Section};
use serde::Serialize;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;

    let mut parser = Parser::new();
    for (name, value) in &config.attributes {
        parser = parser.with_attribute(name, value.clone());
    }

    let doc = parser
        .parse_file(&config.file)
        .map_err(|e| e.to_string())?;

    match config.command {
        Command::Parse => cmd_parse(&doc, &config),
        Command::Stats => cmd_stats(&doc),
    }

    Ok(())
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    format: OutputFormat,
    verbose: bool,
    attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Parse,
    Stats,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Parse;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut attributes = Vec::new();
    let mut file = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("adcli {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "-a" | "--attribute" => {
                i += 1;
                let spec = args
                    .get(i)
                    .ok_or_else(|| "missing value for --attribute".to_string())?;
                match spec.split_once('=') {
                    Some((name, value)) => {
                        attributes.push((name.to_string(), value.to_string()))
                    }
                    None => attributes.push((spec.clone(), String::new())),
                }
            }
            "parse" => command = Command::Parse,
            "stats" => command = Command::Stats,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    Ok(Config {
        command,
        file,
        format,
        verbose,
        attributes,
    })
}

fn print_help() {
    eprintln!(
        r#"adcli - AsciiDoc-style document parser

USAGE:
    adcli [OPTIONS] [COMMAND] <FILE>

COMMANDS:
    parse       Parse and display document structure (default)
    stats       Show document statistics

OPTIONS:
    -a, --attribute <NAME=VALUE>    Seed an attribute definition
    -v, --verbose                   Show detailed tree structure
    -j, --json                      Output in JSON format
    -h, --help                      Print help information
    -V, --version                   Print version information

EXAMPLES:
    adcli document.adoc             Parse a document
    adcli -v document.adoc          Parse with verbose output
    adcli -j document.adoc          Output the tree as JSON
    adcli -a env=prod doc.adoc      Parse with `env` defined
    adcli stats document.adoc       Show document statistics
"#
    );
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(doc: &Document, config: &Config) {
    match config.format {
        OutputFormat::Json => print_json(doc),
        OutputFormat::Text => {
            if config.verbose {
                print_document_verbose(doc);
            } else {
                print_document_summary(doc);
            }
        }
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(doc: &Document) {
    let stats = DocumentStats::from_document(doc);

    println!("Document Statistics");
    println!("-------------------");
    println!("Title:        {}", doc.title().unwrap_or("(none)"));
    println!("Attributes:   {}", doc.attributes.len());
    println!("References:   {}", doc.references.len());
    println!();
    println!("Content:");
    println!("  Sections:       {}", stats.sections);
    println!("  Paragraphs:     {}", stats.paragraphs);
    println!("  Listings:       {}", stats.listings);
    println!("  Literals:       {}", stats.literals);
    println!("  Lists:          {}", stats.lists);
    println!("  List items:     {}", stats.list_items);
    println!("  Admonitions:    {}", stats.notes);
    println!();
    println!("Size:");
    println!("  Characters:     {}", doc.source.len());
    println!(
        "  Words (est.):   {}",
        doc.source.split_whitespace().count()
    );
    println!("  Lines:          {}", doc.source.lines().count());
}

#[derive(Default)]
struct DocumentStats {
    sections: usize,
    paragraphs: usize,
    listings: usize,
    literals: usize,
    lists: usize,
    list_items: usize,
    notes: usize,
}

impl DocumentStats {
    fn from_document(doc: &Document) -> Self {
        let mut stats = Self::default();
        if let Some(header) = &doc.header {
            stats.sections += 1;
            stats.count_elements(&header.blocks);
        }
        stats.count_elements(&doc.elements);
        stats
    }

    fn count_elements(&mut self, elements: &[Element]) {
        for element in elements {
            match element {
                Element::Section(section) => {
                    self.sections += 1;
                    self.count_elements(&section.blocks);
                }
                Element::Block(block) => self.count_block(block),
            }
        }
    }

    fn count_block(&mut self, block: &Block) {
        use aldoc_core::BlockContext::*;
        match block.context {
            Paragraph => self.paragraphs += 1,
            Listing => self.listings += 1,
            Literal => self.literals += 1,
            Note => self.notes += 1,
            Ulist | Olist | Colist | Dlist => self.lists += 1,
            _ => {}
        }
        match &block.buffer {
            BlockBuffer::Elements(elements) => self.count_elements(elements),
            BlockBuffer::Items(items) => {
                self.list_items += items.len();
                for item in items {
                    self.count_elements(&item.blocks);
                }
            }
            BlockBuffer::Pairs(pairs) => {
                self.list_items += pairs.len();
                for (_, item) in pairs {
                    self.count_elements(&item.blocks);
                }
            }
            BlockBuffer::Lines(_) => {}
        }
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<JsonSection<'a>>,
    elements: Vec<JsonElement<'a>>,
    attributes: &'a HashMap<String, String>,
    references: &'a HashMap<String, String>,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    name: &'a str,
    level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor: Option<&'a str>,
    blocks: Vec<JsonElement<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonElement<'a> {
    Section(JsonSection<'a>),
    Block(JsonBlock<'a>),
}

#[derive(Serialize)]
struct JsonBlock<'a> {
    context: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elements: Option<Vec<JsonElement<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Vec<JsonItem<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<Vec<JsonEntry<'a>>>,
}

#[derive(Serialize)]
struct JsonItem<'a> {
    level: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor: Option<&'a str>,
    blocks: Vec<JsonElement<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    term: &'a str,
    item: JsonItem<'a>,
}

fn print_json(doc: &Document) {
    let json_doc = JsonDocument {
        title: doc.title(),
        header: doc.header.as_ref().map(convert_section),
        elements: doc.elements.iter().map(convert_element).collect(),
        attributes: &doc.attributes,
        references: &doc.references,
    };
    match serde_json::to_string_pretty(&json_doc) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: {}", e),
    }
}

fn convert_element(element: &Element) -> JsonElement<'_> {
    match element {
        Element::Section(section) => JsonElement::Section(convert_section(section)),
        Element::Block(block) => JsonElement::Block(convert_block(block)),
    }
}

fn convert_section(section: &Section) -> JsonSection<'_> {
    JsonSection {
        name: &section.name,
        level: section.level,
        anchor: section.anchor.as_deref(),
        blocks: section.blocks.iter().map(convert_element).collect(),
    }
}

fn convert_block(block: &Block) -> JsonBlock<'_> {
    let mut json = JsonBlock {
        context: block.context.as_str(),
        title: block.title.as_deref(),
        caption: block.caption.as_deref(),
        anchor: block.anchor.as_deref(),
        source_type: block.source_type.as_deref(),
        lines: None,
        elements: None,
        items: None,
        entries: None,
    };
    match &block.buffer {
        BlockBuffer::Lines(lines) => json.lines = Some(lines),
        BlockBuffer::Elements(elements) => {
            json.elements = Some(elements.iter().map(convert_element).collect())
        }
        BlockBuffer::Items(items) => {
            json.items = Some(items.iter().map(convert_item).collect())
        }
        BlockBuffer::Pairs(pairs) => {
            json.entries = Some(
                pairs
                    .iter()
                    .map(|(term, item)| JsonEntry {
                        term,
                        item: convert_item(item),
                    })
                    .collect(),
            )
        }
    }
    json
}

fn convert_item(item: &ListItem) -> JsonItem<'_> {
    JsonItem {
        level: item.level,
        content: item.content.as_deref(),
        anchor: item.anchor.as_deref(),
        blocks: item.blocks.iter().map(convert_element).collect(),
    }
}

// =============================================================================
// Text Output
// =============================================================================

fn print_document_summary(doc: &Document) {
    if let Some(title) = doc.title() {
        println!("Title: {}", title);
    }

    if !doc.attributes.is_empty() {
        println!("Attributes: {} defined", doc.attributes.len());
    }
    if !doc.references.is_empty() {
        println!("References: {} recorded", doc.references.len());
    }

    println!("Elements: {}", doc.elements.len());
    for (i, element) in doc.elements.iter().enumerate() {
        println!("  [{}] {}", i + 1, describe_element(element));
    }
}

fn print_document_verbose(doc: &Document) {
    println!("=== aldoc tree ===");
    println!();

    if let Some(header) = &doc.header {
        println!("Header: {} (level 0)", header.name);
    }
    if !doc.attributes.is_empty() {
        println!("--- Attributes ---");
        let mut names: Vec<_> = doc.attributes.keys().collect();
        names.sort();
        for name in names {
            println!("  {}: {}", name, doc.attributes[name]);
        }
    }
    if !doc.references.is_empty() {
        println!("--- References ---");
        let mut ids: Vec<_> = doc.references.keys().collect();
        ids.sort();
        for id in ids {
            println!("  {} -> {}", id, doc.references[id]);
        }
    }

    println!("--- Elements ---");
    for element in &doc.elements {
        print_element(element, 0);
    }
}

fn describe_element(element: &Element) -> String {
    match element {
        Element::Section(section) => {
            format!(
                "Section '{}' (level {}, {} children)",
                section.name,
                section.level,
                section.blocks.len()
            )
        }
        Element::Block(block) => describe_block(block),
    }
}

fn describe_block(block: &Block) -> String {
    let size = match &block.buffer {
        BlockBuffer::Lines(lines) => format!("{} lines", lines.len()),
        BlockBuffer::Elements(elements) => format!("{} children", elements.len()),
        BlockBuffer::Items(items) => format!("{} items", items.len()),
        BlockBuffer::Pairs(pairs) => format!("{} entries", pairs.len()),
    };
    let mut text = format!("{} ({})", block.context.as_str(), size);
    if let Some(title) = &block.title {
        text.push_str(&format!(" title={:?}", title));
    }
    if let Some(anchor) = &block.anchor {
        text.push_str(&format!(" anchor={:?}", anchor));
    }
    if let Some(lang) = &block.source_type {
        text.push_str(&format!(" lang={:?}", lang));
    }
    text
}

fn print_element(element: &Element, indent: usize) {
    let prefix = "  ".repeat(indent);
    println!("{}{}", prefix, describe_element(element));
    match element {
        Element::Section(section) => {
            for child in &section.blocks {
                print_element(child, indent + 1);
            }
        }
        Element::Block(block) => print_block(block, indent + 1),
    }
}

fn print_block(block: &Block, indent: usize) {
    let prefix = "  ".repeat(indent);
    match &block.buffer {
        BlockBuffer::Lines(lines) => {
            if let Some(first) = lines.first() {
                let preview: String = first.trim_end().chars().take(60).collect();
                println!("{}| {}", prefix, preview);
            }
        }
        BlockBuffer::Elements(elements) => {
            for child in elements {
                print_element(child, indent);
            }
        }
        BlockBuffer::Items(items) => {
            for item in items {
                print_item(item, indent);
            }
        }
        BlockBuffer::Pairs(pairs) => {
            for (term, item) in pairs {
                println!("{}{}:", prefix, term);
                print_item(item, indent + 1);
            }
        }
    }
}

fn print_item(item: &ListItem, indent: usize) {
    let prefix = "  ".repeat(indent);
    match &item.content {
        Some(content) => println!("{}- {}", prefix, content.replace('\n', " ")),
        None => println!("{}-", prefix),
    }
    for child in &item.blocks {
        print_element(child, indent + 1);
    }
}
