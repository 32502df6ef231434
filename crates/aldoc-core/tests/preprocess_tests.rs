//! Integration tests for the aldoc preprocessor

use std::io;

use aldoc_core::{BlockContext, Element, ParseErrorKind, Parser};

fn parse(input: &str) -> aldoc_core::Document {
    Parser::new().parse(input).unwrap()
}

fn paragraph_text(element: &Element) -> String {
    match element {
        Element::Block(block) if block.context == BlockContext::Paragraph => {
            block.buffer.lines().unwrap().concat()
        }
        other => panic!("expected paragraph, got {:?}", other),
    }
}

// ============================================================================
// Attribute Definition Tests
// ============================================================================

#[test]
fn test_attribute_definition() {
    let doc = parse(":author: A. Writer\n\ntext");
    assert_eq!(doc.defines().get("author").map(String::as_str), Some("A. Writer"));
}

#[test]
fn test_attribute_continuation() {
    let doc = parse(":foo: line1 +\n  line2\n\nbody");

    assert_eq!(doc.defines().get("foo").map(String::as_str), Some("line1 line2"));
    assert_eq!(doc.elements.len(), 1);
    assert_eq!(paragraph_text(&doc.elements[0]), "body");
}

#[test]
fn test_attribute_continuation_multiple_lines() {
    let doc = parse(":foo: a +\n  b +\n  c\nrest");

    assert_eq!(doc.defines().get("foo").map(String::as_str), Some("a b c"));
    assert_eq!(paragraph_text(&doc.elements[0]), "rest");
}

#[test]
fn test_attribute_continuation_pushes_back_unindented_line() {
    let doc = parse(":foo: a +\nbar");

    assert_eq!(doc.defines().get("foo").map(String::as_str), Some("a"));
    assert_eq!(paragraph_text(&doc.elements[0]), "bar");
}

#[test]
fn test_attribute_name_sanitized() {
    let doc = parse(":Foo Bar!: value\n\ntext");

    assert_eq!(doc.defines().get("foobar").map(String::as_str), Some("value"));
    for name in doc.defines().keys() {
        assert!(name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}

#[test]
fn test_attribute_last_writer_wins() {
    let doc = parse(":x: one\n:x: two\n\ntext");
    assert_eq!(doc.defines().get("x").map(String::as_str), Some("two"));
}

#[test]
fn test_seeded_attribute_visible_to_conditionals() {
    let doc = Parser::new()
        .with_attribute("env", "prod")
        .parse("ifdef::env[]\nhidden\nendif::env[]\nshown")
        .unwrap();

    assert!(doc.source.contains("shown"));
    assert!(!doc.source.contains("hidden"));
}

// ============================================================================
// Conditional Tests
// ============================================================================

#[test]
fn test_ifdef_hides_content_when_defined() {
    let doc = parse(":hide:\nifdef::hide[]\nX\nendif::hide[]\nY");

    assert_eq!(doc.elements.len(), 1);
    assert_eq!(paragraph_text(&doc.elements[0]), "Y");
    assert!(!doc.source.contains('X'));
}

#[test]
fn test_ifdef_keeps_content_when_undefined() {
    let doc = parse("ifdef::nope[]\nX\nendif::nope[]\nY");

    assert!(doc.source.contains('X'));
    assert!(doc.source.contains('Y'));
}

#[test]
fn test_ifndef_hides_content_when_undefined() {
    let doc = parse("ifndef::hide[]\nX\nendif::hide[]\nY");

    assert!(!doc.source.contains('X'));
    assert!(doc.source.contains('Y'));
}

#[test]
fn test_ifndef_keeps_content_when_defined() {
    let doc = parse(":hide:\nifndef::hide[]\nX\nendif::hide[]\nY");

    assert!(doc.source.contains('X'));
    assert!(doc.source.contains('Y'));
}

#[test]
fn test_skip_region_ends_only_on_matching_endif() {
    let doc = parse(":a:\nifdef::a[]\nX\nendif::b[]\nstill hidden\nendif::a[]\nshown");

    assert!(!doc.source.contains("still hidden"));
    assert!(doc.source.contains("shown"));
}

#[test]
fn test_missing_endif_consumes_rest() {
    let doc = parse(":hide:\nifdef::hide[]\ngone\nalso gone");

    assert!(doc.elements.is_empty());
    assert!(doc.source.is_empty());
}

// ============================================================================
// Substitution Tests
// ============================================================================

#[test]
fn test_conditional_substitution_defined() {
    let doc = parse(":x: 1\nA{x?yes}B");
    assert!(doc.source.contains("AyesB"));
}

#[test]
fn test_conditional_substitution_undefined() {
    let doc = parse("A{y?no}B");
    assert!(doc.source.contains("AB"));
}

#[test]
fn test_conditional_substitution_repeats_on_one_line() {
    let doc = parse(":x: 1\n{x?left} middle {y?gone}{x?right}");
    assert!(doc.source.contains("left middle right"));
}

// ============================================================================
// Comment and Bibliography Tests
// ============================================================================

#[test]
fn test_comment_lines_dropped() {
    let doc = parse("// private note\nvisible");

    assert_eq!(doc.elements.len(), 1);
    assert_eq!(paragraph_text(&doc.elements[0]), "visible");
    assert!(!doc.source.contains("private"));
}

#[test]
fn test_bibliography_markers_recorded() {
    let doc = parse("[[[walsh05]]] Walsh, 2005.\n[[[gates03]]] Gates, 2003.");

    assert_eq!(doc.references.get("walsh05").map(String::as_str), Some("[walsh05]"));
    assert_eq!(doc.references.get("gates03").map(String::as_str), Some("[gates03]"));
}

// ============================================================================
// Include Tests
// ============================================================================

#[test]
fn test_include_expansion_via_resolver() {
    let doc = Parser::new()
        .with_include_resolver(|path| Ok(format!("pulled in from {}\n", path)))
        .parse("before\ninclude::extra.adoc[]\nafter")
        .unwrap();

    assert!(doc.source.contains("pulled in from extra.adoc"));
    assert!(doc.source.contains("before"));
    assert!(doc.source.contains("after"));
}

#[test]
fn test_included_lines_are_preprocessed() {
    let doc = Parser::new()
        .with_include_resolver(|_| Ok(":flag: set\n".to_string()))
        .parse("include::defs.adoc[]\nvalue is {flag?present}")
        .unwrap();

    assert_eq!(doc.defines().get("flag").map(String::as_str), Some("set"));
    assert!(doc.source.contains("value is present"));
}

#[test]
fn test_include_failure_is_fatal() {
    let result = Parser::new()
        .with_include_resolver(|path| {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path),
            ))
        })
        .parse("include::missing.adoc[]");

    let err = result.expect_err("include failure should propagate");
    assert_eq!(err.kind(), ParseErrorKind::Include);
    assert!(err.to_string().contains("missing.adoc"));
}

#[test]
fn test_includes_expand_one_level_only() {
    let doc = Parser::new()
        .with_include_resolver(|_| Ok("include::inner.adoc[]\n".to_string()))
        .parse("include::outer.adoc[]")
        .unwrap();

    // The nested directive is left as plain text rather than re-expanded.
    assert!(doc.source.contains("include::inner.adoc[]"));
}
