//! Rendering of generator node trees to output text.
//!
//! The renderer performs a single left-to-right depth-first walk, carrying
//! the indentation frames of every enclosing indent node plus two line
//! flags: whether the output sits at a line start, and whether the current
//! line carries non-whitespace content. Indentation is emitted lazily, at
//! the moment text arrives on a fresh line, so blank lines never pick up
//! trailing indentation and indents over empty children emit nothing.
//!
//! Output uses `\n` as the only line separator; newlines embedded in text
//! fragments (`\r\n`, `\r`, or `\n`) are treated as unconditional line
//! breaks. Use [`crate::text::normalize_eol`] for other conventions.

use crate::node::{CompositeNode, GeneratorNode, IndentNode};
use crate::text::split_newlines;
use crate::trace::{Span, TraceRegion, Traced};

/// Configuration for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Indentation applied per indent level when an indent node does not
    /// carry its own string. Default: four spaces.
    pub indentation: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indentation: "    ".to_string(),
        }
    }
}

/// Render a node tree as a string.
pub fn render(node: &GeneratorNode, options: &RenderOptions) -> String {
    let mut renderer = Renderer::new(options, false);
    renderer.process(node);
    renderer.out
}

/// Render a node tree as a string plus the trace regions of every
/// source-annotated composite it contains.
pub fn render_traced(node: &GeneratorNode, options: &RenderOptions) -> Traced {
    let mut renderer = Renderer::new(options, true);
    renderer.process(node);
    Traced {
        text: renderer.out,
        regions: renderer.regions,
    }
}

pub(crate) fn render_composite(node: &CompositeNode, options: &RenderOptions) -> String {
    let mut renderer = Renderer::new(options, false);
    renderer.composite(node);
    renderer.out
}

pub(crate) fn render_composite_traced(node: &CompositeNode, options: &RenderOptions) -> Traced {
    let mut renderer = Renderer::new(options, true);
    renderer.composite(node);
    Traced {
        text: renderer.out,
        regions: renderer.regions,
    }
}

/// An indentation frame of an entered indent node.
struct Frame<'a> {
    indentation: &'a str,
    /// Inactive frames belong to not-immediate indents entered at a line
    /// start; they skip the pending line and arm at the next line break.
    active: bool,
}

/// An entered source-annotated composite whose output range is still open.
struct OpenRegion {
    source: Span,
    start: usize,
    children: Vec<TraceRegion>,
}

struct Renderer<'a> {
    options: &'a RenderOptions,
    out: String,
    frames: Vec<Frame<'a>>,
    at_line_start: bool,
    line_has_content: bool,
    tracing: bool,
    open_regions: Vec<OpenRegion>,
    regions: Vec<TraceRegion>,
}

impl<'a> Renderer<'a> {
    fn new(options: &'a RenderOptions, tracing: bool) -> Self {
        Self {
            options,
            out: String::new(),
            frames: Vec::new(),
            at_line_start: true,
            line_has_content: false,
            tracing,
            open_regions: Vec::new(),
            regions: Vec::new(),
        }
    }

    fn process(&mut self, node: &'a GeneratorNode) {
        match node {
            GeneratorNode::Text(content) => self.text(content),
            GeneratorNode::NewLine { if_not_empty } => {
                if !*if_not_empty || self.line_has_content {
                    self.newline();
                }
            }
            GeneratorNode::Indent(indent) => self.indent(indent),
            GeneratorNode::Composite(composite) => self.composite(composite),
        }
    }

    fn text(&mut self, content: &str) {
        for (i, piece) in split_newlines(content).into_iter().enumerate() {
            if i > 0 {
                self.newline();
            }
            if !piece.is_empty() {
                self.piece(piece);
            }
        }
    }

    /// Emit a newline-free, non-empty piece of text, prefixing the active
    /// indentation when the piece opens a new line.
    fn piece(&mut self, piece: &str) {
        if self.at_line_start {
            for i in 0..self.frames.len() {
                if self.frames[i].active {
                    let indentation = self.frames[i].indentation;
                    self.out.push_str(indentation);
                }
            }
            self.at_line_start = false;
        }
        self.out.push_str(piece);
        if piece.chars().any(|c| !c.is_whitespace()) {
            self.line_has_content = true;
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
        self.line_has_content = false;
        // Every line after the break begins inside all entered indents.
        for frame in &mut self.frames {
            frame.active = true;
        }
    }

    fn indent(&mut self, node: &'a IndentNode) {
        self.frames.push(Frame {
            indentation: node
                .indentation
                .as_deref()
                .unwrap_or(&self.options.indentation),
            active: node.indent_immediately || !self.at_line_start,
        });
        self.composite(node.children());
        self.frames.pop();
    }

    fn composite(&mut self, node: &'a CompositeNode) {
        let traced = self.tracing && node.source().is_some();
        if traced {
            self.open_regions.push(OpenRegion {
                source: node.source().unwrap(),
                start: self.out.len(),
                children: Vec::new(),
            });
        }
        for child in node.children() {
            self.process(child);
        }
        if traced {
            let open = self.open_regions.pop().unwrap();
            // Composites that emitted nothing map to no output range.
            if self.out.len() > open.start {
                let region = TraceRegion {
                    source: open.source,
                    target: Span::new(open.start as u32, self.out.len() as u32),
                    children: open.children,
                };
                match self.open_regions.last_mut() {
                    Some(parent) => parent.children.push(region),
                    None => self.regions.push(region),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{new_line, text, CompositeNode, IndentOptions};
    use crate::trace::Span;

    #[test]
    fn text_only() {
        assert_eq!(text("hello").render(), "hello");
    }

    #[test]
    fn indentation_fires_at_each_covered_line_start() {
        let mut node = CompositeNode::new();
        node.append("fn main() {").append_new_line();
        node.indent(|body| {
            body.append("let a = 1;").append_new_line();
            body.append("let b = 2;").append_new_line();
        });
        node.append("}");
        assert_eq!(node.render(), "fn main() {\n    let a = 1;\n    let b = 2;\n}");
    }

    #[test]
    fn nested_indents_stack() {
        let mut node = CompositeNode::new();
        node.append("a").append_new_line();
        node.indent(|outer| {
            outer.append("b").append_new_line();
            outer.indent(|inner| {
                inner.append("c").append_new_line();
            });
        });
        node.append("d");
        assert_eq!(node.render(), "a\n    b\n        c\nd");
    }

    #[test]
    fn custom_default_indentation() {
        let mut node = CompositeNode::new();
        node.append("a").append_new_line();
        node.indent(|body| {
            body.append("b");
        });
        let options = RenderOptions {
            indentation: "\t".to_string(),
        };
        assert_eq!(node.render_with(&options), "a\n\tb");
    }

    #[test]
    fn indent_over_empty_children_emits_nothing() {
        let mut node = CompositeNode::new();
        node.append("a").append_new_line();
        node.indent(|_| {});
        node.append("b");
        assert_eq!(node.render(), "a\nb");
    }

    #[test]
    fn blank_lines_carry_no_indentation() {
        let mut node = CompositeNode::new();
        node.append("a").append_new_line();
        node.indent(|body| {
            body.append_new_line();
            body.append("b");
        });
        assert_eq!(node.render(), "a\n\n    b");
    }

    #[test]
    fn not_immediate_indent_skips_the_pending_line() {
        let mut node = CompositeNode::new();
        node.indent_with(
            IndentOptions {
                indent_immediately: false,
                ..IndentOptions::default()
            },
            |body| {
                body.append("first").append_new_line();
                body.append("second");
            },
        );
        assert_eq!(node.render(), "first\n    second");
    }

    #[test]
    fn not_immediate_indent_entered_mid_line() {
        let mut node = CompositeNode::new();
        node.append("head ");
        node.indent_with(
            IndentOptions {
                indentation: Some("  ".to_string()),
                indent_immediately: false,
            },
            |body| {
                body.append("one").append_new_line();
                body.append("two");
            },
        );
        assert_eq!(node.render(), "head one\n  two");
    }

    #[test]
    fn conditional_newline_elides_on_blank_line() {
        let mut node = CompositeNode::new();
        node.append("a").append_new_line();
        node.append_new_line_if_not_empty();
        node.append("b");
        assert_eq!(node.render(), "a\nb");
    }

    #[test]
    fn conditional_newline_ignores_whitespace_content() {
        let mut node = CompositeNode::new();
        node.append("  ");
        node.append_new_line_if_not_empty();
        node.append("b");
        assert_eq!(node.render(), "  b");
    }

    #[test]
    fn conditional_newline_fires_after_content() {
        let mut node = CompositeNode::new();
        node.append("a");
        node.append_new_line_if_not_empty();
        assert_eq!(node.render(), "a\n");
    }

    #[test]
    fn embedded_newlines_split_like_newline_nodes() {
        let mut node = CompositeNode::new();
        node.append("a").append_new_line();
        node.indent(|body| {
            body.append("x\r\ny\rz");
        });
        assert_eq!(node.render(), "a\n    x\n    y\n    z");
    }

    #[test]
    fn no_trailing_newline_is_invented() {
        let mut node = CompositeNode::new();
        node.append("a");
        assert_eq!(node.render(), "a");
        assert_eq!(CompositeNode::new().render(), "");
    }

    #[test]
    fn rendering_is_repeatable() {
        let mut node = CompositeNode::new();
        node.append("a").append_new_line();
        node.indent(|body| {
            body.append("b");
        });
        assert_eq!(node.render(), node.render());
    }

    #[test]
    fn traced_rendering_collects_nested_regions() {
        let mut inner = CompositeNode::new().with_source(Span::new(10, 14));
        inner.append("inner");

        let mut outer = CompositeNode::new().with_source(Span::new(0, 20));
        outer.append("head ").append(inner).append(" tail");

        let traced = outer.render_traced(&RenderOptions::default());
        assert_eq!(traced.text, "head inner tail");
        assert_eq!(traced.regions.len(), 1);
        let root = &traced.regions[0];
        assert_eq!(root.source, Span::new(0, 20));
        assert_eq!(root.target, Span::new(0, 15));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].source, Span::new(10, 14));
        assert_eq!(root.children[0].target, Span::new(5, 10));
        assert_eq!(traced.find_at(7).unwrap().source, Span::new(10, 14));
        assert_eq!(traced.find_at(12).unwrap().source, Span::new(0, 20));
    }

    #[test]
    fn empty_traced_composite_maps_to_no_region() {
        let mut node = CompositeNode::new();
        node.append(CompositeNode::new().with_source(Span::new(0, 5)));
        node.append(new_line());
        let traced = node.render_traced(&RenderOptions::default());
        assert_eq!(traced.text, "\n");
        assert!(traced.regions.is_empty());
    }
}
