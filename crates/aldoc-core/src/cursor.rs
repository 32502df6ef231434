//! The mutable line cursor threaded through the parser.
//!
//! All block-level parsing is expressed in four operations ([`peek`],
//! [`pop`], [`unshift`], [`is_empty`]) plus blank-line skipping. The
//! cursor is exclusively borrowed by whichever parsing routine holds the
//! current stack frame; recursive calls pass the same cursor down.
//!
//! Lines retain their terminators: consumers treat entries as "line
//! fragments including the trailing newline".
//!
//! [`peek`]: LineCursor::peek
//! [`pop`]: LineCursor::pop
//! [`unshift`]: LineCursor::unshift
//! [`is_empty`]: LineCursor::is_empty

use std::collections::VecDeque;

use memchr::memchr;

/// An ordered sequence of source lines with O(1) front push-back.
#[derive(Debug, Clone, Default)]
pub struct LineCursor {
    lines: VecDeque<String>,
}

impl LineCursor {
    /// Create a cursor over the given lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into(),
        }
    }

    /// Look at the line `k` positions ahead without consuming it.
    ///
    /// Out-of-range positions return the empty-string sentinel.
    #[inline]
    pub fn peek(&self, k: usize) -> &str {
        self.lines.get(k).map(String::as_str).unwrap_or("")
    }

    /// Remove and return the head line.
    #[inline]
    pub fn pop(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    /// Push a line back onto the front.
    #[inline]
    pub fn unshift(&mut self, line: String) {
        self.lines.push_front(line);
    }

    /// Whether all lines have been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines remaining.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Pop lines while the head is whitespace-only; returns the count
    /// skipped. Idempotent.
    pub fn skip_blank_lines(&mut self) -> usize {
        let mut count = 0;
        while let Some(line) = self.lines.front() {
            if !is_blank(line) {
                break;
            }
            self.lines.pop_front();
            count += 1;
        }
        count
    }
}

/// Whether a line consists solely of whitespace (terminator included).
#[inline]
pub fn is_blank(line: &str) -> bool {
    line.bytes()
        .all(|b| b == b' ' || b == b'\t' || b == b'\r' || b == b'\n')
}

/// Split input into lines, preserving each line's terminator.
///
/// The final line is kept even without a trailing newline.
pub fn split_lines(input: &str) -> Vec<String> {
    let bytes = input.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        let end = match memchr(b'\n', &bytes[start..]) {
            Some(pos) => start + pos + 1,
            None => bytes.len(),
        };
        lines.push(input[start..end].to_string());
        start = end;
    }
    lines
}
