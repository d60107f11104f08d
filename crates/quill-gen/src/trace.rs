//! Source-region tracing for generated text.
//!
//! Generator nodes may be annotated with the span of the source construct
//! they were produced from. Traced rendering then yields, next to the output
//! string, a forest of [`TraceRegion`]s mapping byte ranges of the output
//! back to those source spans. Consumers use this to build source maps or to
//! answer "which part of the input produced this character" queries.

use serde::Serialize;

use crate::text::split_newlines;

/// A byte-offset region, start inclusive, end exclusive.
///
/// A trace deals in two coordinate systems of the same shape: spans into the
/// caller's source text (attached to composites by the caller) and spans
/// into the rendered output (computed by the renderer). Neither side ever
/// manipulates a span after the fact, so the type is nothing but the two
/// endpoints plus the containment check [`find_at`](TraceRegion::find_at)
/// queries need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a span from byte offsets.
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    /// Whether the span covers the given byte offset.
    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// A mapping from a region of the rendered output back to a source span.
///
/// Regions nest: a child region always lies within its parent's `target`
/// range. Regions never overlap their siblings, since they are produced by a
/// single left-to-right walk of the node tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRegion {
    /// The span in the caller's source text this region was generated from.
    pub source: Span,
    /// The byte range of the rendered output covered by this region.
    pub target: Span,
    /// Regions produced by traced descendants, in output order.
    pub children: Vec<TraceRegion>,
}

impl TraceRegion {
    /// Find the innermost region covering the given output byte offset.
    pub fn find_at(&self, offset: u32) -> Option<&TraceRegion> {
        if !self.target.contains(offset) {
            return None;
        }
        self.children
            .iter()
            .find_map(|child| child.find_at(offset))
            .or(Some(self))
    }
}

/// The result of a traced rendering: the output text plus its trace forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Traced {
    pub text: String,
    /// Top-level trace regions in output order. Untraced output falls in the
    /// gaps between regions.
    pub regions: Vec<TraceRegion>,
}

impl Traced {
    /// Find the innermost region covering the given output byte offset.
    pub fn find_at(&self, offset: u32) -> Option<&TraceRegion> {
        self.regions.iter().find_map(|region| region.find_at(offset))
    }

    /// Build a line index over the output text for offset-to-position lookup.
    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.text)
    }
}

/// Pre-computed line starts of a rendered output, for converting trace
/// offsets to 1-based (line, column) pairs on demand.
///
/// Line boundaries are the ones [`split_newlines`] recognizes. Rendered
/// output only ever contains `\n`, but indexing text that carries foreign
/// separators works the same way.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Index a text by its line boundaries.
    pub fn new(text: &str) -> Self {
        // Each line borrows from `text`, so its address encodes its offset.
        let base = text.as_ptr() as usize;
        let line_starts = split_newlines(text)
            .into_iter()
            .map(|line| (line.as_ptr() as usize - base) as u32)
            .collect();
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based (line, column) pair. Column is
    /// measured in bytes from the line start.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line = (line_idx as u32) + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Number of lines in the indexed text.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_contains_is_half_open() {
        let span = Span::new(2, 6);
        assert!(span.contains(2));
        assert!(span.contains(5));
        assert!(!span.contains(6));
        assert!(!span.contains(1));
    }

    #[test]
    fn find_at_returns_innermost() {
        let region = TraceRegion {
            source: Span::new(0, 10),
            target: Span::new(0, 20),
            children: vec![TraceRegion {
                source: Span::new(2, 4),
                target: Span::new(5, 9),
                children: vec![],
            }],
        };
        assert_eq!(region.find_at(0).unwrap().source, Span::new(0, 10));
        assert_eq!(region.find_at(6).unwrap().source, Span::new(2, 4));
        assert_eq!(region.find_at(9).unwrap().source, Span::new(0, 10));
        assert!(region.find_at(20).is_none());
    }

    #[test]
    fn line_index_lookup() {
        let index = LineIndex::new("let x\nlet y\n");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(4), (1, 5));
        assert_eq!(index.line_col(6), (2, 1));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn line_index_follows_shared_newline_rules() {
        let index = LineIndex::new("a\r\nb\rc");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(3), (2, 1));
        assert_eq!(index.line_col(5), (3, 1));
    }
}
