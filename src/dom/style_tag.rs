//! Idempotent management of the injected `<style>` element
//!
//! At most one tag with the session id exists at any time. Content is
//! replaced in place rather than remove-and-recreate, so there is no flash
//! of unstyled content; enable/disable cycles flip a flag instead of
//! churning the DOM.

use super::{Document, Node};

/// Outcome of a [`create_or_update_style_tag`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTagWrite {
    /// A new tag was created and appended to head
    Created,
    /// The existing tag's content differed and was rewritten
    Updated,
    /// The existing tag already held this content; no DOM write
    Unchanged,
}

/// Create the style tag or update its content in place.
///
/// An existing tag is rewritten only when the content differs, and is
/// always re-enabled. A new tag is appended (not prepended) to `<head>`:
/// among `!important` rules of equal specificity source order wins, so the
/// injected sheet must come last.
pub fn create_or_update_style_tag(doc: &mut Document, id: &str, content: &str) -> StyleTagWrite {
    if find_style_tag(doc.head(), id).is_some() {
        let Some(tag) = find_style_tag_mut(doc.head_mut(), id) else {
            return StyleTagWrite::Unchanged;
        };
        let write = if tag.text_content() != content {
            tag.set_text_content(content);
            StyleTagWrite::Updated
        } else {
            StyleTagWrite::Unchanged
        };
        if let Some(element) = tag.as_element_mut() {
            element.remove_attribute("disabled");
        }
        write
    } else {
        let mut tag = Node::element("style");
        if let Some(element) = tag.as_element_mut() {
            element.set_attribute("id", id);
        }
        tag.set_text_content(content);
        doc.append_to_head(tag);
        StyleTagWrite::Created
    }
}

/// Enable or disable the tag without removing it. Missing tag is a no-op.
pub fn toggle_style_tag(doc: &mut Document, id: &str, enabled: bool) {
    if let Some(element) = find_style_tag_mut(doc.head_mut(), id).and_then(Node::as_element_mut) {
        if enabled {
            element.remove_attribute("disabled");
        } else {
            element.set_attribute("disabled", "true");
        }
    }
}

/// Current content of the tag, if it exists.
pub fn style_tag_content(doc: &Document, id: &str) -> Option<String> {
    find_style_tag(doc.head(), id).map(Node::text_content)
}

/// Whether the tag is disabled; `None` when no tag exists.
pub fn style_tag_disabled(doc: &Document, id: &str) -> Option<bool> {
    find_style_tag(doc.head(), id)
        .and_then(Node::as_element)
        .map(|el| el.get_attribute("disabled").is_some())
}

/// Number of style tags carrying this id (invariant: zero or one).
pub fn style_tag_count(doc: &Document, id: &str) -> usize {
    doc.head()
        .children
        .iter()
        .filter(|node| is_style_tag(node, id))
        .count()
}

fn is_style_tag(node: &Node, id: &str) -> bool {
    node.as_element()
        .is_some_and(|el| el.tag_name == "style" && el.id().map(String::as_str) == Some(id))
}

fn find_style_tag<'a>(head: &'a Node, id: &str) -> Option<&'a Node> {
    head.children.iter().find(|node| is_style_tag(node, id))
}

fn find_style_tag_mut<'a>(head: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    head.children.iter_mut().find(|node| is_style_tag(node, id))
}
