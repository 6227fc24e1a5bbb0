//! In-memory document model the engine operates on
//!
//! Mirrors the slice of a browser page the engine touches: a tree of
//! elements with inline styles and host-resolved computed font families,
//! the list of attached stylesheets, and a childList mutation feed for the
//! observer. The host (or a test) builds the document; the engine only
//! classifies and overrides.

pub mod style_tag;

use std::collections::HashMap;

use tokio::sync::mpsc;

/// Node types in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    /// Element node (e.g., `<div>`)
    Element(ElementData),
    /// Text node
    Text(String),
}

/// One inline `style` declaration on an element
#[derive(Debug, Clone, PartialEq)]
pub struct InlineDeclaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// Data for element nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Tag name (e.g., "div", "style")
    pub tag_name: String,
    /// Element attributes
    pub attributes: HashMap<String, String>,
    /// Inline `style` declarations
    inline_style: Vec<InlineDeclaration>,
    /// Computed font-family as the host resolved it; `None` when the
    /// computed style is unreadable (detached or exotic elements)
    pub computed_font_family: Option<String>,
}

impl ElementData {
    /// Create a new element
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            inline_style: Vec::new(),
            computed_font_family: None,
        }
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&String> {
        self.attributes.get(name)
    }

    /// Set an attribute value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute if present
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    /// Get the ID attribute
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Set an inline style property, replacing any previous declaration.
    pub fn set_style_property(&mut self, property: &str, value: &str, important: bool) {
        self.remove_style_property(property);
        self.inline_style.push(InlineDeclaration {
            property: property.to_string(),
            value: value.to_string(),
            important,
        });
    }

    /// Remove an inline style property if present.
    pub fn remove_style_property(&mut self, property: &str) {
        self.inline_style.retain(|d| d.property != property);
    }

    /// Look up an inline style declaration by property name.
    pub fn style_property(&self, property: &str) -> Option<&InlineDeclaration> {
        self.inline_style.iter().find(|d| d.property == property)
    }
}

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node type and data
    pub node_type: NodeType,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new node
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            children: Vec::new(),
        }
    }

    /// Create an element node
    pub fn element(tag_name: impl Into<String>) -> Self {
        Self::new(NodeType::Element(ElementData::new(tag_name)))
    }

    /// Create an element node with a host-resolved computed font-family
    pub fn with_computed_font(tag_name: impl Into<String>, family: &str) -> Self {
        let mut data = ElementData::new(tag_name);
        data.computed_font_family = Some(family.to_string());
        Self::new(NodeType::Element(data))
    }

    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeType::Text(content.into()))
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Get element data if this is an element
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Get mutable element data if this is an element
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Concatenated text of direct text children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match &child.node_type {
                NodeType::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&mut self, content: &str) {
        self.children = vec![Node::text(content)];
    }

    /// Visit every descendant element depth-first, excluding this node.
    pub fn for_each_element_mut(&mut self, visit: &mut dyn FnMut(&mut ElementData)) {
        for child in &mut self.children {
            if let Some(element) = child.as_element_mut() {
                visit(element);
            }
            child.for_each_element_mut(visit);
        }
    }
}

/// A CSS rule as exposed through a same-origin stylesheet: selector text
/// plus flat declaration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    /// Selector text; `@`-prefixed for at-rules
    pub selector: String,
    /// Declaration text of the rule body
    pub css_text: String,
}

impl CssRule {
    pub fn new(selector: impl Into<String>, css_text: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            css_text: css_text.into(),
        }
    }
}

/// Script access to a stylesheet's rule list
#[derive(Debug, Clone, PartialEq)]
pub enum SheetRules {
    /// Same-origin: rules are enumerable
    Accessible(Vec<CssRule>),
    /// Cross-origin: enumeration is denied and the sheet must be re-fetched
    Denied,
}

/// A stylesheet attached to the document
#[derive(Debug, Clone, PartialEq)]
pub struct StylesheetRef {
    /// Source URL; `None` for inline `<style>` sheets
    pub href: Option<String>,
    pub rules: SheetRules,
}

impl StylesheetRef {
    /// A same-origin sheet with an enumerable rule list.
    pub fn accessible(href: Option<&str>, rules: Vec<CssRule>) -> Self {
        Self {
            href: href.map(str::to_string),
            rules: SheetRules::Accessible(rules),
        }
    }

    /// A cross-origin sheet whose rules cannot be enumerated.
    pub fn cross_origin(href: &str) -> Self {
        Self {
            href: Some(href.to_string()),
            rules: SheetRules::Denied,
        }
    }
}

/// A childList mutation reported to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Tag name of the parent that gained or lost children
    pub parent_tag: String,
}

/// The document: root element, head, body, attached stylesheets, and the
/// mutation feed.
#[derive(Debug)]
pub struct Document {
    /// `<html>` element data; carries the root inline font-family override
    root: ElementData,
    head: Node,
    body: Node,
    stylesheets: Vec<StylesheetRef>,
    observers: Vec<mpsc::UnboundedSender<Mutation>>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            root: ElementData::new("html"),
            head: Node::element("head"),
            body: Node::element("body"),
            stylesheets: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// The `<html>` element (documentElement).
    pub fn root(&self) -> &ElementData {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ElementData {
        &mut self.root
    }

    pub fn head(&self) -> &Node {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut Node {
        &mut self.head
    }

    pub fn body(&self) -> &Node {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Node {
        &mut self.body
    }

    /// The `<body>` element data.
    pub fn body_element(&self) -> Option<&ElementData> {
        self.body.as_element()
    }

    pub fn body_element_mut(&mut self) -> Option<&mut ElementData> {
        self.body.as_element_mut()
    }

    /// Attach a stylesheet to the document.
    pub fn attach_stylesheet(&mut self, sheet: StylesheetRef) {
        self.stylesheets.push(sheet);
    }

    /// Stylesheets in attachment order.
    pub fn stylesheets(&self) -> &[StylesheetRef] {
        &self.stylesheets
    }

    /// Append a node to `<head>`, notifying observers.
    pub fn append_to_head(&mut self, node: Node) {
        self.head.add_child(node);
        self.notify("head");
    }

    /// Append a node to `<body>`, notifying observers.
    pub fn append_to_body(&mut self, node: Node) {
        self.body.add_child(node);
        self.notify("body");
    }

    /// Subscribe to childList mutations. Inline style and attribute writes
    /// do not notify, so a style-writing observer cannot feed itself.
    pub fn subscribe_mutations(&mut self) -> mpsc::UnboundedReceiver<Mutation> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.push(tx);
        rx
    }

    fn notify(&mut self, parent_tag: &str) {
        let mutation = Mutation {
            parent_tag: parent_tag.to_string(),
        };
        self.observers.retain(|tx| tx.send(mutation.clone()).is_ok());
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_style_roundtrip() {
        let mut element = ElementData::new("div");
        element.set_style_property("font-family", "var(--x)", true);
        let decl = element.style_property("font-family").expect("set");
        assert_eq!(decl.value, "var(--x)");
        assert!(decl.important);

        element.set_style_property("font-family", "serif", false);
        assert_eq!(element.style_property("font-family").map(|d| d.value.as_str()), Some("serif"));

        element.remove_style_property("font-family");
        assert!(element.style_property("font-family").is_none());
    }

    #[test]
    fn test_text_content() {
        let mut node = Node::element("style");
        node.set_text_content("a{}");
        assert_eq!(node.text_content(), "a{}");
        node.set_text_content("b{}");
        assert_eq!(node.text_content(), "b{}");
        assert_eq!(node.children.len(), 1);
    }

    #[test]
    fn test_for_each_element_excludes_root() {
        let mut body = Node::element("body");
        let mut outer = Node::element("div");
        outer.add_child(Node::element("span"));
        body.add_child(outer);
        body.add_child(Node::text("loose text"));

        let mut tags = Vec::new();
        body.for_each_element_mut(&mut |el| tags.push(el.tag_name.clone()));
        assert_eq!(tags, ["div", "span"]);
    }

    #[test]
    fn test_mutation_feed() {
        let mut doc = Document::new();
        let mut rx = doc.subscribe_mutations();

        doc.append_to_body(Node::element("div"));
        doc.append_to_head(Node::element("style"));

        assert_eq!(rx.try_recv().map(|m| m.parent_tag), Ok("body".to_string()));
        assert_eq!(rx.try_recv().map(|m| m.parent_tag), Ok("head".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut doc = Document::new();
        let rx = doc.subscribe_mutations();
        drop(rx);
        // Does not panic and subsequent appends drop the dead sender.
        doc.append_to_body(Node::element("div"));
        doc.append_to_body(Node::element("div"));
    }
}
