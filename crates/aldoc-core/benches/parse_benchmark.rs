//! Benchmarks comparing aldoc parsing vs pulldown-cmark (Markdown)
//!
//! Run with: cargo bench -p aldoc-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use aldoc_core::Parser;
use pulldown_cmark::{Options, Parser as MdParser};

/// Sample aldoc content
const ALDOC_SAMPLE: &str = r#":project: aldoc
:release: 1.0

= Benchmark Document

Introductory paragraph for {project?the project} release {release?0.0}.
It demonstrates the basic block vocabulary of the format.

== Lists

* First item with some content
* Second item with more content
** A nested point below it
** Another nested point
* Third item concluding the list

1. Step one of the process
2. Step two continues
3. Step three completes

CPU:: the processing unit
RAM:: working memory

== Code Example

[source,rust]
----
fn fibonacci(n: u64) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => fibonacci(n - 1) + fibonacci(n - 2),
    }
}
----

== Admonitions

NOTE: Parsing is deterministic and single pass over the line cursor.

[NOTE]
Fences and lists may nest inside open blocks.

== Quote

____
The best code is no code at all.
Every line of code you write is a liability.
____

== Sidebar

****
Related details live here, out of the main flow.
****

End of document.
"#;

/// Equivalent Markdown content (as close as possible)
const MARKDOWN_SAMPLE: &str = r#"# Benchmark Document

Introductory paragraph for the project release 1.0.
It demonstrates the basic block vocabulary of the format.

## Lists

* First item with some content
* Second item with more content
  * A nested point below it
  * Another nested point
* Third item concluding the list

1. Step one of the process
2. Step two continues
3. Step three completes

## Code Example

```rust
fn fibonacci(n: u64) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => fibonacci(n - 1) + fibonacci(n - 2),
    }
}
```

## Admonitions

> **Note:** Parsing is deterministic and single pass over the line cursor.

## Quote

> The best code is no code at all.
> Every line of code you write is a liability.

## Sidebar

> Related details live here, out of the main flow.

End of document.
"#;

fn bench_aldoc_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.throughput(Throughput::Bytes(ALDOC_SAMPLE.len() as u64));

    group.bench_function("aldoc", |b| {
        b.iter(|| {
            let parser = Parser::new();
            let doc = parser.parse(black_box(ALDOC_SAMPLE)).unwrap();
            black_box(doc.elements.len())
        })
    });

    group.throughput(Throughput::Bytes(MARKDOWN_SAMPLE.len() as u64));

    group.bench_function("markdown_pulldown", |b| {
        b.iter(|| {
            let parser = MdParser::new_ext(black_box(MARKDOWN_SAMPLE), Options::all());
            let events: Vec<_> = parser.collect();
            black_box(events.len())
        })
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for size in [1, 5, 10, 20].iter() {
        let aldoc_content: String = ALDOC_SAMPLE.repeat(*size);
        let markdown_content: String = MARKDOWN_SAMPLE.repeat(*size);

        group.throughput(Throughput::Bytes(aldoc_content.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("aldoc", size),
            &aldoc_content,
            |b, content| {
                b.iter(|| {
                    let parser = Parser::new();
                    let doc = parser.parse(black_box(content)).unwrap();
                    black_box(doc.elements.len())
                })
            },
        );

        group.throughput(Throughput::Bytes(markdown_content.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("markdown", size),
            &markdown_content,
            |b, content| {
                b.iter(|| {
                    let parser = MdParser::new_ext(black_box(content), Options::all());
                    let events: Vec<_> = parser.collect();
                    black_box(events.len())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_aldoc_parse, bench_scaling);
criterion_main!(benches);
