//! The generator node tree: an in-memory description of planned output.
//!
//! Emitting code goes through two stages. Builders (template expansion,
//! joining, or direct [`CompositeNode`] calls) assemble a tree of
//! [`GeneratorNode`]s describing *what* to emit; rendering then walks the
//! tree once and produces the final string, resolving indentation and
//! conditional newlines along the way.
//!
//! The tree is a plain sum type. Only [`CompositeNode`] carries builder
//! methods; the other variants are leaves or wrappers created through them.
//! Appending moves the child into its parent, so a node can never end up
//! under two parents and a built tree can be rendered any number of times
//! as a pure function of its structure.

use serde::Serialize;

use crate::render::{self, RenderOptions};
use crate::trace::{Span, Traced};

/// A value that may contribute to generated output: a node, or nothing.
///
/// `None` is the *absent* value: it never emits text and never causes
/// separators or conditional newlines to be produced. An empty string is not
/// absent: it is an empty `Text` node, and still counts as provided content
/// where that distinction matters.
pub type Generated = Option<GeneratorNode>;

/// A node of the output description tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GeneratorNode {
    /// A literal text fragment. Fragments are usually newline-free (line
    /// breaks are modeled by `NewLine`), but embedded separators are
    /// accepted and behave like unconditional newlines when rendered.
    Text(String),
    /// A line break. The conditional form only emits when the current
    /// output line carries at least one non-whitespace character.
    NewLine { if_not_empty: bool },
    /// An indented subtree; see [`IndentNode`].
    Indent(IndentNode),
    /// An ordered sequence of children; see [`CompositeNode`].
    Composite(CompositeNode),
}

impl GeneratorNode {
    /// Whether rendering this node would produce the empty string.
    ///
    /// This is a semantic check, not a structural one: empty text fragments,
    /// conditional newlines with nothing before them, and indents over empty
    /// children all count as empty.
    pub fn is_empty(&self) -> bool {
        !self.has_content()
    }

    pub(crate) fn has_content(&self) -> bool {
        match self {
            GeneratorNode::Text(text) => !text.is_empty(),
            // An unconditional newline always emits; a conditional one only
            // fires when earlier content already made the output non-empty.
            GeneratorNode::NewLine { if_not_empty } => !if_not_empty,
            GeneratorNode::Indent(indent) => indent.children.has_content(),
            GeneratorNode::Composite(composite) => composite.has_content(),
        }
    }

    /// Render with default options.
    pub fn render(&self) -> String {
        render::render(self, &RenderOptions::default())
    }

    /// Render with the given options.
    pub fn render_with(&self, options: &RenderOptions) -> String {
        render::render(self, options)
    }
}

/// An ordered container of child nodes and the root type returned by the
/// template builders.
///
/// All builder methods return `&mut Self` so calls chain. The child list is
/// append-only: nodes go in through `append*` and are only read back out by
/// the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompositeNode {
    children: Vec<GeneratorNode>,
    source: Option<Span>,
}

impl CompositeNode {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotate this composite with the source span it was generated from,
    /// making it visible to traced rendering.
    pub fn with_source(mut self, span: Span) -> Self {
        self.source = Some(span);
        self
    }

    /// The source span this composite is traced to, if any.
    pub fn source(&self) -> Option<Span> {
        self.source
    }

    pub(crate) fn children(&self) -> &[GeneratorNode] {
        &self.children
    }

    pub(crate) fn push(&mut self, child: GeneratorNode) {
        self.children.push(child);
    }

    /// Append content. Absent values are a no-op; strings become `Text`.
    pub fn append(&mut self, content: impl IntoGenerated) -> &mut Self {
        if let Some(node) = content.into_generated() {
            self.children.push(node);
        }
        self
    }

    /// Append content only when `condition` holds.
    pub fn append_if(&mut self, condition: bool, content: impl IntoGenerated) -> &mut Self {
        if condition {
            self.append(content);
        }
        self
    }

    /// Append an unconditional line break.
    pub fn append_new_line(&mut self) -> &mut Self {
        self.children.push(new_line());
        self
    }

    /// Append an unconditional line break only when `condition` holds.
    pub fn append_new_line_if(&mut self, condition: bool) -> &mut Self {
        if condition {
            self.append_new_line();
        }
        self
    }

    /// Append a line break that only emits if the current output line
    /// carries non-whitespace content.
    pub fn append_new_line_if_not_empty(&mut self) -> &mut Self {
        self.children.push(new_line_if_not_empty());
        self
    }

    /// Append a conditional line break only when `condition` holds.
    pub fn append_new_line_if_not_empty_if(&mut self, condition: bool) -> &mut Self {
        if condition {
            self.append_new_line_if_not_empty();
        }
        self
    }

    /// Append an indented subtree with default options: the renderer's
    /// indentation string, applied starting at the current line.
    ///
    /// The callback receives the inner composite and fills it:
    ///
    /// ```
    /// use quill_gen::CompositeNode;
    ///
    /// let mut node = CompositeNode::new();
    /// node.append("loop {").append_new_line();
    /// node.indent(|body| {
    ///     body.append("break;").append_new_line();
    /// });
    /// node.append("}");
    /// assert_eq!(node.render(), "loop {\n    break;\n}");
    /// ```
    pub fn indent(&mut self, indented_children: impl FnOnce(&mut CompositeNode)) -> &mut Self {
        self.indent_with(IndentOptions::default(), indented_children)
    }

    /// Append an indented subtree with explicit options.
    pub fn indent_with(
        &mut self,
        options: IndentOptions,
        indented_children: impl FnOnce(&mut CompositeNode),
    ) -> &mut Self {
        let mut indent = IndentNode::new(options.indentation, options.indent_immediately);
        indented_children(&mut indent.children);
        self.children.push(GeneratorNode::Indent(indent));
        self
    }

    /// Whether rendering this composite would produce the empty string.
    pub fn is_empty(&self) -> bool {
        !self.has_content()
    }

    pub(crate) fn has_content(&self) -> bool {
        self.children.iter().any(GeneratorNode::has_content)
    }

    /// Render with default options.
    pub fn render(&self) -> String {
        self.render_with(&RenderOptions::default())
    }

    /// Render with the given options.
    pub fn render_with(&self, options: &RenderOptions) -> String {
        render::render_composite(self, options)
    }

    /// Render with the given options, also collecting the trace regions of
    /// every source-annotated descendant (including this node itself).
    pub fn render_traced(&self, options: &RenderOptions) -> Traced {
        render::render_composite_traced(self, options)
    }
}

/// A wrapper that prefixes an indentation string to every output line that
/// begins inside its children.
///
/// The indentation is armed on entry and fires lazily at each covered line
/// start; an indent whose children emit nothing emits nothing itself. With
/// `indent_immediately` unset, a line already pending when the indent is
/// entered stays unindented and the prefix takes effect after the children's
/// first line break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndentNode {
    /// The per-line prefix; `None` uses the renderer's default.
    pub indentation: Option<String>,
    pub indent_immediately: bool,
    children: CompositeNode,
}

impl IndentNode {
    /// Create an indent with no children yet.
    pub fn new(indentation: Option<String>, indent_immediately: bool) -> Self {
        Self {
            indentation,
            indent_immediately,
            children: CompositeNode::new(),
        }
    }

    /// The wrapped children.
    pub fn children(&self) -> &CompositeNode {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut CompositeNode {
        &mut self.children
    }
}

impl Default for IndentNode {
    fn default() -> Self {
        Self::new(None, true)
    }
}

/// Options for [`CompositeNode::indent_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentOptions {
    /// Indentation string; `None` uses the renderer's default.
    pub indentation: Option<String>,
    /// Apply the indentation to the current line rather than starting at
    /// the next line break. Defaults to true.
    pub indent_immediately: bool,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            indentation: None,
            indent_immediately: true,
        }
    }
}

impl IndentOptions {
    /// Indent by `count` spaces.
    pub fn spaces(count: usize) -> Self {
        Self {
            indentation: Some(" ".repeat(count)),
            ..Self::default()
        }
    }
}

/// Conversion of caller-provided values into [`Generated`] content.
///
/// This is the typed counterpart of accepting "string, node, or nothing" at
/// every append and substitution position. `Option` composes, so both
/// `None::<&str>` and the result of a fallible builder can be spliced
/// directly.
pub trait IntoGenerated {
    fn into_generated(self) -> Generated;
}

impl IntoGenerated for GeneratorNode {
    fn into_generated(self) -> Generated {
        Some(self)
    }
}

impl IntoGenerated for CompositeNode {
    fn into_generated(self) -> Generated {
        Some(GeneratorNode::Composite(self))
    }
}

impl IntoGenerated for IndentNode {
    fn into_generated(self) -> Generated {
        Some(GeneratorNode::Indent(self))
    }
}

impl IntoGenerated for String {
    fn into_generated(self) -> Generated {
        Some(GeneratorNode::Text(self))
    }
}

impl IntoGenerated for &str {
    fn into_generated(self) -> Generated {
        Some(GeneratorNode::Text(self.to_string()))
    }
}

impl IntoGenerated for &String {
    fn into_generated(self) -> Generated {
        Some(GeneratorNode::Text(self.clone()))
    }
}

impl<T: IntoGenerated> IntoGenerated for Option<T> {
    fn into_generated(self) -> Generated {
        self.and_then(IntoGenerated::into_generated)
    }
}

// ── Helper constructors ─────────────────────────────────────────────────

/// Create a `Text` node from a string-like value.
pub fn text(content: impl Into<String>) -> GeneratorNode {
    GeneratorNode::Text(content.into())
}

/// Create an unconditional `NewLine` node.
pub fn new_line() -> GeneratorNode {
    GeneratorNode::NewLine {
        if_not_empty: false,
    }
}

/// Create a `NewLine` node that only emits on a non-blank line.
pub fn new_line_if_not_empty() -> GeneratorNode {
    GeneratorNode::NewLine { if_not_empty: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_chains_and_wraps_strings() {
        let mut node = CompositeNode::new();
        node.append("a").append(String::from("b")).append(text("c"));
        assert_eq!(node.render(), "abc");
    }

    #[test]
    fn absent_content_is_a_no_op() {
        let mut node = CompositeNode::new();
        node.append("a").append(None::<&str>).append("b");
        assert_eq!(node.render(), "ab");
    }

    #[test]
    fn append_if_respects_condition() {
        let mut node = CompositeNode::new();
        node.append_if(true, "yes").append_if(false, "no");
        assert_eq!(node.render(), "yes");
    }

    #[test]
    fn empty_text_is_provided_but_empty() {
        let mut node = CompositeNode::new();
        node.append("");
        assert!(node.is_empty());
        assert_eq!(node.render(), "");
    }

    #[test]
    fn is_empty_is_semantic() {
        let mut node = CompositeNode::new();
        node.append("").append(None::<&str>);
        node.indent(|_| {});
        node.append_new_line_if_not_empty();
        assert!(node.is_empty());
        assert_eq!(node.render(), "");

        node.append_new_line();
        assert!(!node.is_empty());
        assert_eq!(node.render(), "\n");
    }

    #[test]
    fn is_empty_agrees_with_render() {
        let mut nested = CompositeNode::new();
        nested.indent(|inner| {
            inner.append("x");
        });
        assert!(!nested.is_empty());
        assert_eq!(nested.is_empty(), nested.render().is_empty());
    }

    #[test]
    fn indent_options_spaces() {
        let mut node = CompositeNode::new();
        node.append("a").append_new_line();
        node.indent_with(IndentOptions::spaces(2), |inner| {
            inner.append("b");
        });
        assert_eq!(node.render(), "a\n  b");
    }

    #[test]
    fn whitespace_only_text_is_not_empty() {
        let mut node = CompositeNode::new();
        node.append(" ");
        assert!(!node.is_empty());
        assert_eq!(node.render(), " ");
    }
}
