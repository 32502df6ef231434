//! # aldoc Core
//!
//! An AsciiDoc-style markup parser that turns a sequence of input lines
//! into a tree of structured document nodes ready for rendering.
//!
//! Parsing is line-oriented: a preprocessor expands includes, evaluates
//! conditionals, and collects attributes; the block dispatcher then
//! classifies the line at the cursor head and consumes the block it
//! starts, recursing into composite blocks, lists, and sections.
//!
//! ## Quick Start
//!
//! ```rust
//! use aldoc_core::Parser;
//!
//! let doc = Parser::new().parse("= Title\n\nHello there.").unwrap();
//! assert_eq!(doc.title(), Some("Title"));
//! assert_eq!(doc.elements.len(), 1);
//! ```
//!
//! ## Attributes
//!
//! Definitions take effect from their point of definition onward and
//! drive conditional directives and `{name?value}` substitutions:
//!
//! ```rust
//! use aldoc_core::Parser;
//!
//! let doc = Parser::new()
//!     .parse(":version: 1.0\n\nRunning {version?v1} now.")
//!     .unwrap();
//! assert_eq!(doc.defines()["version"], "1.0");
//! assert!(doc.source.contains("Running v1 now."));
//! ```
//!
//! ## Error Handling
//!
//! Parsing never fails on malformed markup; unterminated fences and
//! broken list continuations degrade best-effort. Only `include::`
//! resolution (and reading the input file itself) can return an error.

pub mod ast;
pub mod cursor;
pub mod error;
pub mod parser;
pub mod patterns;
pub mod preprocess;

pub use ast::{Block, BlockBuffer, BlockContext, Document, Element, ListItem, Section};
pub use error::{ParseError, ParseErrorKind};
pub use parser::Parser;
