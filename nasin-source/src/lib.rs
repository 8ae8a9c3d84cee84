//! Source code representation and error reporting.

use console::style;
use serde::Serialize;
use std::{error::Error, fmt, ops::Range};

/// A byte range in a [`Source`]. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero length span at `offset`.
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns the smallest span that covers both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Precomputed line start offsets, for turning byte offsets into line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// Returns the 1-indexed `(line, column)` of `offset`. Columns count characters.
    pub fn line_col(&self, content: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(content.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx];
        let col = content[line_start..offset].chars().count() + 1;
        (line_idx + 1, col)
    }

    /// Returns the byte range of the 1-indexed `line`, without its line terminator.
    pub fn line_range(&self, content: &str, line: usize) -> Range<usize> {
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or_else(|| content.len());
        let end = if end > start && content.as_bytes()[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        start..end
    }
}

/// Represents source code.
#[derive(Debug, Clone)]
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
    /// Name of the module the source belongs to.
    pub name: String,
    /// Path used to label diagnostics.
    pub path: String,
    lines: LineIndex,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`, named `main`.
    pub fn new(content: &'a str) -> Self {
        Self::named("main", "<input>", content)
    }

    pub fn named(name: impl ToString, path: impl ToString, content: &'a str) -> Self {
        Self {
            content,
            name: name.to_string(),
            path: path.to_string(),
            lines: LineIndex::new(content),
        }
    }

    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        self.lines.line_col(self.content, offset)
    }

    /// Returns the text of the 1-indexed `line`.
    pub fn line(&self, line: usize) -> &'a str {
        &self.content[self.lines.line_range(self.content, line)]
    }

    /// Returns the text covered by `span`.
    pub fn slice(&self, span: Span) -> &'a str {
        &self.content[span.start.min(self.content.len())..span.end.min(self.content.len())]
    }

    /// Pairs `error` with this source so it can be displayed with its location.
    pub fn report<'s, E: Diagnostic>(&'s self, error: &'s E) -> Report<'s, 'a, E> {
        Report {
            source: self,
            error,
        }
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// An error that points at a location in a [`Source`].
pub trait Diagnostic: Error {
    fn span(&self) -> Span;
}

/// A [`Diagnostic`] rendered against the [`Source`] it came from.
///
/// ```text
/// main.nas:2:7
///   |
/// 2 | x = 1 +
///   |        ^
/// error: expected expression, found end of file
/// ```
pub struct Report<'s, 'a, E> {
    source: &'s Source<'a>,
    error: &'s E,
}

impl<E: Diagnostic> fmt::Display for Report<'_, '_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.error.span();
        let (line, col) = self.source.line_col(span.start);
        writeln!(f, "{}:{}:{}", self.source.path, line, col)?;

        let text = self.source.line(line);
        let num = line.to_string();
        let gutter = " ".repeat(num.len());
        let width = text.chars().count().saturating_sub(col - 1);
        let carets = span.len().min(width).max(1);
        writeln!(f, "{} |", gutter)?;
        writeln!(f, "{} | {}", num, text)?;
        writeln!(
            f,
            "{} | {}{}",
            gutter,
            " ".repeat(col - 1),
            style("^".repeat(carets)).red()
        )?;
        write!(f, "{}: {}", style("error").red().bold(), self.error)
    }
}
