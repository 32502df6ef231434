//! Source preprocessing.
//!
//! Runs ahead of the block parser: expands one level of `include::`
//! directives, evaluates `ifdef`/`ifndef` skip regions, collects
//! `:name: value` attribute definitions (with continuation lines),
//! rewrites `{name?value}` conditional substitutions, strips comment
//! lines, and records `[[[id]]]` bibliography markers.

use std::collections::HashMap;
use std::io;

use log::{debug, trace};

use crate::cursor::{is_blank, split_lines, LineCursor};
use crate::error::ParseError;
use crate::patterns::PATTERNS;

/// Callback resolving an `include::` path to file contents.
pub type IncludeResolver = dyn Fn(&str) -> io::Result<String>;

/// A replacement value can itself contain a conditional; the rewrite
/// loop is bounded to stay total on self-referential input.
const MAX_SUBST_PASSES: usize = 64;

/// The preprocessor's output: the filtered line sequence plus the maps
/// collected along the way.
pub struct Preprocessed {
    /// Lines handed to the block parser, terminators intact.
    pub lines: Vec<String>,
    /// Attribute definitions, sanitized names, last writer wins.
    pub attributes: HashMap<String, String>,
    /// Bibliography entries: id to `[id]` display form.
    pub references: HashMap<String, String>,
}

/// Single-use preprocessor over one input's lines.
pub struct Preprocessor<'a> {
    attributes: HashMap<String, String>,
    resolver: &'a IncludeResolver,
}

impl<'a> Preprocessor<'a> {
    /// Create a preprocessor seeded with initial attributes.
    pub fn new(seed: HashMap<String, String>, resolver: &'a IncludeResolver) -> Self {
        Self {
            attributes: seed,
            resolver,
        }
    }

    /// Run all passes over the raw lines.
    pub fn process(mut self, raw: Vec<String>) -> Result<Preprocessed, ParseError> {
        let lines = self.expand_includes(raw)?;
        let lines = self.filter_lines(lines);
        let references = scan_bibliography(&lines);
        Ok(Preprocessed {
            lines,
            attributes: self.attributes,
            references,
        })
    }

    /// Replace `include::path[]` lines with the target file's lines.
    /// One pass; included content is not re-expanded.
    fn expand_includes(&self, raw: Vec<String>) -> Result<Vec<String>, ParseError> {
        let mut out = Vec::with_capacity(raw.len());
        for line in raw {
            if let Some(cap) = PATTERNS.include.captures(&line) {
                let path = cap[1].to_string();
                debug!("including {}", path);
                let text =
                    (self.resolver)(&path).map_err(|e| ParseError::include(&path, e))?;
                out.extend(split_lines(&text));
            } else {
                out.push(line);
            }
        }
        Ok(out)
    }

    /// The main pass: conditionals, attribute definitions, substitution,
    /// and comment stripping, in input order.
    fn filter_lines(&mut self, lines: Vec<String>) -> Vec<String> {
        let mut cursor = LineCursor::new(lines);
        let mut out = Vec::new();
        // Name of the attribute whose skip region is open, if any.
        let mut skipping: Option<String> = None;

        while let Some(line) = cursor.pop() {
            if let Some(active) = &skipping {
                if let Some(cap) = PATTERNS.endif.captures(&line) {
                    if &cap[1] == active {
                        skipping = None;
                    }
                }
                continue;
            }

            if let Some(cap) = PATTERNS.conditional.captures(&line) {
                let defined = self.attributes.contains_key(&sanitize_name(&cap[2]));
                let skip = match &cap[1] {
                    "ifdef" => defined,
                    _ => !defined,
                };
                if skip {
                    trace!("skipping region for {}", &cap[2]);
                    skipping = Some(cap[2].to_string());
                }
                continue;
            }

            // A stray endif with no open region is dropped.
            if PATTERNS.endif.is_match(&line) {
                continue;
            }

            if let Some(cap) = PATTERNS.attr_def.captures(&line) {
                let name = sanitize_name(&cap[1]);
                let value = self.collect_value(&cap[2], &mut cursor);
                trace!("attribute {} = {:?}", name, value);
                self.attributes.insert(name, value);
                continue;
            }

            if PATTERNS.comment.is_match(&line) {
                continue;
            }

            out.push(self.substitute(line));
        }
        out
    }

    /// Join continuation lines onto an attribute value. A continuation
    /// line without a trailing `+` terminates; a line not beginning with
    /// whitespace is pushed back to be reprocessed.
    fn collect_value(&self, first: &str, cursor: &mut LineCursor) -> String {
        let Some(cap) = PATTERNS.attr_continue.captures(first) else {
            return first.to_string();
        };
        let mut value = cap[1].trim_end().to_string();
        while let Some(next) = cursor.pop() {
            let indented = next.starts_with(' ') || next.starts_with('\t');
            if !indented || is_blank(&next) {
                cursor.unshift(next);
                break;
            }
            let content = next.trim();
            match PATTERNS.attr_continue.captures(content) {
                Some(more) => {
                    value.push(' ');
                    value.push_str(more[1].trim_end());
                }
                None => {
                    value.push(' ');
                    value.push_str(content);
                    break;
                }
            }
        }
        value
    }

    /// Rewrite `{name?value}` expressions: the value when the attribute
    /// is defined, the empty string otherwise. Repeated until no match.
    fn substitute(&self, mut line: String) -> String {
        for _ in 0..MAX_SUBST_PASSES {
            let Some(cap) = PATTERNS.subst.captures(&line) else {
                break;
            };
            let range = cap.get(0).map(|m| m.range()).unwrap_or_default();
            let replacement = if self
                .attributes
                .contains_key(&cap[1].to_lowercase())
            {
                cap[2].to_string()
            } else {
                String::new()
            };
            line.replace_range(range, &replacement);
        }
        line
    }
}

/// Second scan: record a reference for every bibliography marker.
fn scan_bibliography(lines: &[String]) -> HashMap<String, String> {
    let mut references = HashMap::new();
    for line in lines {
        for cap in PATTERNS.biblio.captures_iter(line) {
            references.insert(cap[1].to_string(), format!("[{}]", &cap[1]));
        }
    }
    references
}

/// Sanitize an attribute name: keep only alphanumerics, `-` and `_`,
/// lowercased.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>()
        .to_lowercase()
}
