//! Line classification patterns.
//!
//! The grammar is data: a named, read-only table of anchored regexes,
//! compiled once per process and shared across parses. Every pattern is
//! tested against a single line in isolation; lines keep their
//! terminators, so end anchors are written as `\s*$` to absorb the
//! trailing newline.

use once_cell::sync::Lazy;
use regex::Regex;

/// The shared pattern table.
pub static PATTERNS: Lazy<PatternRegistry> = Lazy::new(PatternRegistry::compile);

/// Named table of line-classification patterns.
pub struct PatternRegistry {
    /// `[[id]]` on its own line.
    pub anchor: Regex,
    /// Attribute value ending with whitespace and `+` (continuation).
    pub attr_continue: Regex,
    /// `:name: value` attribute definition.
    pub attr_def: Regex,
    /// `[[[id]]]` bibliography marker, anywhere on a line.
    pub biblio: Regex,
    /// `[caption="..."]` marker line.
    pub caption: Regex,
    /// `<1> text` callout list bullet.
    pub colist: Regex,
    /// `//` comment line.
    pub comment: Regex,
    /// `ifdef::name[]` / `ifndef::name[]` directive.
    pub conditional: Regex,
    /// `term::`/`term:::`/`term::::` description list entry.
    pub dlist: Regex,
    /// `endif::name[]` directive.
    pub endif: Regex,
    /// `====` example fence.
    pub example: Regex,
    /// `include::path[]` directive.
    pub include: Regex,
    /// One-line heading: `=` run, whitespace, title.
    pub level_title: Regex,
    /// Two-line heading underline: a run of one of `= - ~ ^ +`.
    pub line: Regex,
    /// `----` listing fence.
    pub listing: Regex,
    /// `[source,LANG]` marker line.
    pub listing_source: Regex,
    /// `....` literal fence.
    pub lit_blk: Regex,
    /// Indented (literal) paragraph line.
    pub lit_par: Regex,
    /// Candidate name line of a two-line heading.
    pub name: Regex,
    /// Heading name with an embedded trailing `[[id]]` anchor.
    pub name_anchor: Regex,
    /// `[NOTE]` marker line.
    pub note: Regex,
    /// `--` open block fence.
    pub oblock: Regex,
    /// `1.` ordered list bullet.
    pub olist: Regex,
    /// `____` quote fence.
    pub quote: Regex,
    /// `****` sidebar fence.
    pub sidebar_blk: Regex,
    /// `{name?value}` conditional substitution, anywhere on a line.
    pub subst: Regex,
    /// `.Title` block title line.
    pub title: Regex,
    /// `-` or `*`–`*****` unordered list bullet.
    pub ulist: Regex,
    /// `verse` marker line.
    pub verse: Regex,
    dlist_terms: [Regex; 3],
}

impl PatternRegistry {
    fn compile() -> Self {
        let re = |pattern: &str| Regex::new(pattern).unwrap();
        Self {
            anchor: re(r"^\[\[([^\[\]]+)\]\]\s*$"),
            attr_continue: re(r"^(.*)\s\+\s*$"),
            attr_def: re(r"^:([^:]+):\s*(.*?)\s*$"),
            biblio: re(r"\[\[\[([^\[\]]+)\]\]\]"),
            caption: re(r#"^\[caption="([^"]+)"\]\s*$"#),
            colist: re(r"^<(\d+)>\s+(.*?)\s*$"),
            comment: re(r"^//.*\s*$"),
            conditional: re(r"^(ifdef|ifndef)::([^\[\]]+)\[\]\s*$"),
            dlist: re(r"^(.*?[^:\s])(:{2,4})(?:\s+(.*?))?\s*$"),
            endif: re(r"^endif::([^\[\]]+)\[\]\s*$"),
            example: re(r"^={4,}\s*$"),
            include: re(r"^include::([^\[\]]+)\[\]\s*$"),
            level_title: re(r"^(=+)\s+(\S.*?)\s*$"),
            line: re(r"^(=+|-+|~+|\^+|\++)\s*$"),
            listing: re(r"^-{4,}\s*$"),
            listing_source: re(r"^\[source,\s*([^\]]+?)\s*\]\s*$"),
            lit_blk: re(r"^\.{4,}\s*$"),
            lit_par: re(r"^[ \t]+\S.*\s*$"),
            name: re(r#"^(["A-Za-z0-9].*?)\s*$"#),
            name_anchor: re(r"^(.*?)\s*\[\[([^\[\]]+)\]\]\s*$"),
            note: re(r"^\[NOTE\]\s*$"),
            oblock: re(r"^--\s*$"),
            olist: re(r"^\s*(\d+)\.\s+(.*?)\s*$"),
            quote: re(r"^_{4,}\s*$"),
            sidebar_blk: re(r"^\*{4,}\s*$"),
            subst: re(r"\{([A-Za-z0-9_-]+)\?([^{}]*)\}"),
            title: re(r"^\.([^\s.].*?)\s*$"),
            ulist: re(r"^\s*(-|\*{1,5})\s+(.*?)\s*$"),
            verse: re(r"^\[verse\]\s*$"),
            dlist_terms: [
                re(r"^(.*?[^:\s])(::)(?:\s+(.*?))?\s*$"),
                re(r"^(.*?[^:\s])(:::)(?:\s+(.*?))?\s*$"),
                re(r"^(.*?[^:\s])(::::)(?:\s+(.*?))?\s*$"),
            ],
        }
    }

    /// The term pattern for the exact delimiter captured from the first
    /// entry of a description list, so mixed `::`/`:::` lists are not
    /// merged.
    pub fn dlist_term(&self, delimiter: &str) -> &Regex {
        match delimiter.len() {
            2 => &self.dlist_terms[0],
            3 => &self.dlist_terms[1],
            _ => &self.dlist_terms[2],
        }
    }
}

/// Nesting depth of an unordered list bullet: `-` counts as depth 1,
/// otherwise the number of `*`s.
pub fn bullet_depth(marker: &str) -> usize {
    if marker == "-" {
        1
    } else {
        marker.len()
    }
}
