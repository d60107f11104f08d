//! Template expansion: turning literal template text plus substitutions
//! into a generator node tree.
//!
//! A template arrives as static parts separated by placeholder positions
//! (the [`expand!`](crate::expand) macro splits a single literal on `${}`
//! markers). Expansion happens in three stages:
//!
//! 1. Shape detection: decide whether the first and last template lines are
//!    scaffolding around the content, and measure the common indentation of
//!    the content lines.
//! 2. Splicing: split the static parts into line fragments, strip the
//!    common indentation, and interleave fragments, line-break markers, and
//!    substitutions into one flat sequence.
//! 3. Assembly: fold the sequence into a composite, wrapping substitutions
//!    spliced mid-line in an indent that aligns their continuation lines
//!    with the column where they start.
//!
//! The line-break and absent-substitution markers used in between are
//! private to this module and never appear in the produced tree.

use crate::node::{CompositeNode, Generated, GeneratorNode, IndentNode};
use crate::text::{find_indentation, split_newlines};

/// Expand static template parts and substitutions into a composite node.
///
/// `parts` and `substitutions` interleave: a substitution sits between each
/// pair of adjacent parts, so `parts.len() == substitutions.len() + 1`.
/// Violating that arity is a programmer error and panics.
///
/// Template text is written the way it reads at its use site: a blank first
/// line and the common indentation of the content lines are scaffolding and
/// are removed, while indentation *beyond* the common prefix is preserved.
/// A substitution spliced after static text on a line inherits the column
/// of its splice point: every line it emits beyond its first is indented by
/// that many spaces. Absent substitutions contribute nothing, and a line
/// that thereby ends up blank is suppressed rather than left behind as an
/// empty line.
pub fn expand_to_node(parts: &[&str], substitutions: Vec<Generated>) -> CompositeNode {
    assert_eq!(
        parts.len(),
        substitutions.len() + 1,
        "template with {} placeholder(s) got {} substitution(s)",
        parts.len().saturating_sub(1),
        substitutions.len(),
    );
    let shape = template_shape(parts);
    let mut segments = splice(parts, substitutions, &shape);
    trim_trailing(&mut segments, &shape);
    compose(segments)
}

/// Expand directly to a string; equivalent to rendering the node returned
/// by [`expand_to_node`] with default options.
pub fn expand_to_string(parts: &[&str], substitutions: Vec<Generated>) -> String {
    expand_to_node(parts, substitutions).render()
}

/// As [`expand_to_string`], but the result ends in exactly one `\n`.
pub fn expand_to_string_with_nl(parts: &[&str], substitutions: Vec<Generated>) -> String {
    let mut rendered = expand_to_string(parts, substitutions);
    while rendered.ends_with('\n') {
        rendered.pop();
    }
    rendered.push('\n');
    rendered
}

/// Split a raw template literal on `${}` placeholder markers, producing the
/// static parts for [`expand_to_node`].
///
/// There is no escape for a literal `${}`; splice one in as a substitution
/// instead.
pub fn split_markers(template: &str) -> Vec<&str> {
    template.split("${}").collect()
}

/// Expand a template literal with `${}` placeholders.
///
/// Substitutions may be anything [`IntoGenerated`](crate::IntoGenerated)
/// accepts: strings, nodes, or options thereof.
///
/// ```
/// use quill_gen::expand;
///
/// let name = "World";
/// let node = expand!("
///     fn greet() {
///         println!(\"Hello, ${}!\");
///     }
/// ", name);
/// assert_eq!(
///     node.render(),
///     "fn greet() {\n    println!(\"Hello, World!\");\n}",
/// );
/// ```
#[macro_export]
macro_rules! expand {
    ($template:expr $(, $substitution:expr)* $(,)?) => {
        $crate::template::expand_to_node(
            &$crate::template::split_markers($template),
            ::std::vec![$($crate::node::IntoGenerated::into_generated($substitution)),*],
        )
    };
}

/// What the template's first and last lines mean, and how much leading
/// whitespace every content line shares.
struct TemplateShape {
    indentation: usize,
    omit_first_line: bool,
    omit_last_line: bool,
    trim_last_line: bool,
}

fn template_shape(parts: &[&str]) -> TemplateShape {
    // The filler keeps placeholder positions visible, so adjacent parts do
    // not fuse into what looks like a single blank line.
    let joined = parts.join("_");
    let lines = split_newlines(&joined);
    let count = lines.len();
    let omit_first_line = count > 1 && lines[0].trim().is_empty();
    let mut omit_last_line = omit_first_line && lines[count - 1].trim().is_empty();

    // Templates written inline (no leading blank line, or nothing but a
    // trailing blank line) keep their whitespace verbatim; only a purely
    // whitespace last line is trimmed.
    if count == 1
        || !lines[0].trim().is_empty()
        || (count == 2 && lines[1].trim().is_empty())
    {
        return TemplateShape {
            indentation: 0,
            omit_first_line,
            omit_last_line,
            trim_last_line: count != 1 && lines[count - 1].trim().is_empty(),
        };
    }

    let end = if omit_last_line { count - 1 } else { count };
    let content: Vec<&str> = lines[1..end]
        .iter()
        .copied()
        .filter(|line| !line.is_empty())
        .collect();
    let indentation = find_indentation(content.iter().copied());

    // A last line that already matches the common indentation is content,
    // not scaffolding around the closing delimiter.
    if omit_last_line {
        if let Some(first) = content.first() {
            let last = lines[count - 1];
            omit_last_line = last.chars().count() < indentation
                || !last.chars().take(indentation).eq(first.chars().take(indentation));
        }
    }

    TemplateShape {
        indentation,
        omit_first_line,
        omit_last_line,
        trim_last_line: false,
    }
}

/// One element of the spliced sequence fed to [`compose`].
enum Segment {
    /// A newline-free fragment of a static part.
    Literal(String),
    /// A caller-provided substitution.
    Substitution(GeneratorNode),
    /// A line boundary between fragments.
    NewLine,
    /// An absent substitution. Emits nothing, but keeps a following line
    /// boundary from counting as adjacent to the previous line's content.
    Absent,
}

fn splice(parts: &[&str], substitutions: Vec<Generated>, shape: &TemplateShape) -> Vec<Segment> {
    let mut substitutions = substitutions.into_iter();
    let mut segments = Vec::new();

    for (i, part) in parts.iter().enumerate() {
        for (j, line) in split_newlines(part).into_iter().enumerate() {
            if j == 0 {
                if i == 0 && shape.omit_first_line {
                    // The blank opening line vanishes entirely, together
                    // with the break that would otherwise precede line two.
                    continue;
                }
            } else if !(i == 0 && j == 1 && shape.omit_first_line) {
                segments.push(Segment::NewLine);
            }
            // Only lines that start within this part carry template
            // indentation; the first fragment continues the previous line.
            let line = if j > 0 {
                strip_common_indent(line, shape.indentation)
            } else {
                line
            };
            if !line.is_empty() {
                segments.push(Segment::Literal(line.to_string()));
            }
        }

        if i < parts.len() - 1 {
            match substitutions.next().expect("arity checked by caller") {
                Some(node) => segments.push(Segment::Substitution(node)),
                None => segments.push(Segment::Absent),
            }
        }
    }
    segments
}

/// Strip the common indentation off a line that carries it. Lines shorter
/// than the common prefix, or indented with other characters, pass through
/// verbatim rather than being over-trimmed.
fn strip_common_indent(line: &str, indentation: usize) -> &str {
    if indentation > 0
        && line.len() >= indentation
        && line.as_bytes()[..indentation].iter().all(|&b| b == b' ')
    {
        &line[indentation..]
    } else {
        line
    }
}

/// Drop the scaffolding that can remain at the end of the spliced sequence:
/// a whitespace-only closing fragment, and the line break in front of it.
fn trim_trailing(segments: &mut Vec<Segment>, shape: &TemplateShape) {
    if !(shape.omit_last_line || shape.trim_last_line) {
        return;
    }
    if matches!(segments.last(), Some(Segment::Literal(s)) if s.trim().is_empty()) {
        segments.pop();
    }
    if shape.omit_first_line && matches!(segments.last(), Some(Segment::NewLine)) {
        segments.pop();
    }
}

/// What the previously handled segment was; drives the line-break flavor
/// and the column bookkeeping in [`compose`].
#[derive(Clone, Copy, PartialEq)]
enum Prev {
    Start,
    Literal,
    Substitution,
    NewLine,
    Absent,
}

fn compose(segments: Vec<Segment>) -> CompositeNode {
    let mut node = CompositeNode::new();
    // The indent wrapping the rest of the current line, once a substitution
    // has been spliced mid-line.
    let mut indented: Option<IndentNode> = None;
    // Width of the static text on the current line so far, in characters.
    let mut column = 0usize;
    let mut prev = Prev::Start;

    for segment in segments {
        match segment {
            Segment::Absent => {
                prev = Prev::Absent;
            }
            Segment::NewLine => {
                if let Some(indent) = indented.take() {
                    node.push(GeneratorNode::Indent(indent));
                }
                // After a substitution the break is conditional, so a line
                // whose only potential content turned out empty disappears
                // instead of becoming a blank line. Static text keeps its
                // breaks unconditionally.
                match prev {
                    Prev::Start | Prev::NewLine | Prev::Literal => node.append_new_line(),
                    Prev::Substitution | Prev::Absent => node.append_new_line_if_not_empty(),
                };
                column = 0;
                prev = Prev::NewLine;
            }
            Segment::Literal(content) => {
                column += content.chars().count();
                let fragment = GeneratorNode::Text(content);
                match indented.as_mut() {
                    Some(indent) => indent.children_mut().push(fragment),
                    None => node.push(fragment),
                }
                prev = Prev::Literal;
            }
            Segment::Substitution(substitution) => {
                if let Some(indent) = indented.as_mut() {
                    indent.children_mut().push(substitution);
                } else if column > 0 {
                    // Continuation lines of a mid-line substitution align
                    // with the column it starts at. Only static text counts
                    // toward the column; an earlier substitution on the
                    // same line defeats the detection.
                    let mut indent = IndentNode::new(Some(" ".repeat(column)), false);
                    indent.children_mut().push(substitution);
                    indented = Some(indent);
                } else {
                    node.push(substitution);
                }
                prev = Prev::Substitution;
            }
        }
    }
    if let Some(indent) = indented.take() {
        node.push(GeneratorNode::Indent(indent));
    }
    node
}

/// Render shorthand used by the tests below.
#[cfg(test)]
fn expand_str(parts: &[&str], substitutions: Vec<Generated>) -> String {
    expand_to_node(parts, substitutions).render()
}
