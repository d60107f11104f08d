//! Joining iterables into generator nodes.

use std::fmt::Display;

use crate::node::{new_line_if_not_empty, text, CompositeNode, Generated, GeneratorNode};

/// Options for [`join_to_node`].
///
/// `prefix` and `suffix` wrap every element; `separator` goes between
/// elements whose content was provided. With `append_new_line_if_not_empty`
/// each element is followed by a conditional line break, which
/// `skip_new_line_after_last_item` withholds from the final element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOptions {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub separator: Option<String>,
    pub append_new_line_if_not_empty: bool,
    pub skip_new_line_after_last_item: bool,
}

impl JoinOptions {
    /// Options with just a separator.
    pub fn separated(separator: impl Into<String>) -> Self {
        Self {
            separator: Some(separator.into()),
            ..Self::default()
        }
    }
}

/// Join the elements of an iterable into a composite node.
///
/// `to_generated` receives each element together with its index and whether
/// it is the last one (the walk keeps one element of lookahead). Elements
/// whose content is absent contribute nothing and never cause a separator;
/// the separator is only appended behind provided content that is not last.
///
/// Returns absent when no element contributed anything, so an empty join
/// spliced into a template vanishes along with its line.
pub fn join_to_node<I, F>(items: I, mut to_generated: F, options: &JoinOptions) -> Generated
where
    I: IntoIterator,
    F: FnMut(I::Item, usize, bool) -> Generated,
{
    let mut items = items.into_iter().peekable();
    let mut joined: Option<CompositeNode> = None;
    let mut index = 0;
    while let Some(item) = items.next() {
        let is_last = items.peek().is_none();
        let content = to_generated(item, index, is_last);
        index += 1;
        // Purely absent elements do not even force the node into existence.
        if joined.is_none()
            && content.is_none()
            && options.prefix.is_none()
            && options.suffix.is_none()
        {
            continue;
        }
        let node = joined.get_or_insert_with(CompositeNode::new);
        let provided = content.is_some();
        if let Some(prefix) = &options.prefix {
            node.append(prefix.as_str());
        }
        node.append(content);
        if let Some(suffix) = &options.suffix {
            node.append(suffix.as_str());
        }
        if !is_last && provided {
            if let Some(separator) = &options.separator {
                node.append(separator.as_str());
            }
        }
        if options.append_new_line_if_not_empty
            && !(options.skip_new_line_after_last_item && is_last)
            && !node.is_empty()
        {
            node.append(new_line_if_not_empty());
        }
    }
    joined.map(GeneratorNode::Composite)
}

/// Join elements through their `Display` form.
pub fn join_display<I>(items: I, options: &JoinOptions) -> Generated
where
    I: IntoIterator,
    I::Item: Display,
{
    join_to_node(items, |item, _, _| Some(text(item.to_string())), options)
}
