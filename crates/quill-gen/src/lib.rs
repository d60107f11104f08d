//! Template-driven source text generation for the Quill toolkit.
//!
//! This crate is the emission backend used by Quill code generators: callers
//! describe output as a tree of generator nodes and render it to a string.
//! It works by:
//!
//! 1. Building a node tree through the [`expand!`] template macro (or the
//!    [`expand_to_node`] builder it wraps), through [`join_to_node`] for
//!    iterables, or through direct [`CompositeNode`] calls.
//! 2. Rendering the tree in a single walk that resolves nested indentation,
//!    conditional line breaks, and the indentation of multi-line
//!    substitutions spliced mid-line.
//!
//! Templates read the way they are written: the blank first line and the
//! common indentation of a template literal are scaffolding and disappear
//! from the output, relative indentation survives, and absent substitutions
//! leave no blank lines behind.
//!
//! ```
//! use quill_gen::{expand, join_display, JoinOptions};
//!
//! let params = ["width: u32", "height: u32"];
//! let node = expand!("
//!     fn area(${}) -> u32 {
//!         width * height
//!     }
//! ", join_display(params, &JoinOptions::separated(", ")));
//! assert_eq!(
//!     node.render(),
//!     "fn area(width: u32, height: u32) -> u32 {\n    width * height\n}",
//! );
//! ```

pub mod join;
pub mod node;
pub mod render;
pub mod template;
pub mod text;
pub mod trace;

pub use join::{join_display, join_to_node, JoinOptions};
pub use node::{
    new_line, new_line_if_not_empty, text, CompositeNode, Generated, GeneratorNode, IndentNode,
    IndentOptions, IntoGenerated,
};
pub use render::{render, render_traced, RenderOptions};
pub use template::{
    expand_to_node, expand_to_string, expand_to_string_with_nl, split_markers,
};
pub use text::{find_indentation, normalize_eol, split_newlines};
pub use trace::{LineIndex, Span, TraceRegion, Traced};
