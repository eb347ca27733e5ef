use super::{NodeId, Surface};
use alloc::borrow::Cow;
use core::fmt::Write;
use slotmap::SlotMap;

/// A single operation applied to a [`Dom`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// An element was created.
    CreateElement {
        /// Created node.
        id: NodeId,
        /// Tag of the element.
        tag: String,
    },
    /// A node was inserted into a parent.
    InsertChild {
        /// Parent node.
        parent: NodeId,
        /// Index among the children of `parent`.
        index: usize,
        /// Inserted node.
        child: NodeId,
    },
    /// A node and its descendants were removed.
    Remove {
        /// Removed node.
        id: NodeId,
    },
    /// An attribute was set.
    SetAttribute {
        /// Target node.
        id: NodeId,
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: String,
    },
    /// An attribute was removed.
    RemoveAttribute {
        /// Target node.
        id: NodeId,
        /// Attribute name.
        name: String,
    },
    /// A class was added.
    AddClass {
        /// Target node.
        id: NodeId,
        /// Class name.
        class: String,
    },
    /// A class was removed.
    RemoveClass {
        /// Target node.
        id: NodeId,
        /// Class name.
        class: String,
    },
    /// The text content was set.
    SetText {
        /// Target node.
        id: NodeId,
        /// New text.
        text: String,
    },
}

#[derive(Debug)]
struct DomNode {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl DomNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            attributes: Vec::new(),
            classes: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }
}

/// In-memory element tree.
///
/// Content is mounted into a root `<div id="app">`.
/// Every operation applied through [`Surface`] is recorded as an [`Edit`].
///
/// ```
/// use like_toggle::{prelude::*, view::Surface};
///
/// let mut dom = Dom::new();
/// let root = dom.root();
///
/// let button = dom.create_element("button");
/// dom.insert_child(root, 0, button);
/// dom.set_text(button, "<3 & more");
///
/// assert_eq!(dom.inner_html(root), "<button>&lt;3 &amp; more</button>");
/// assert_eq!(dom.find_by_tag("button"), Some(button));
/// ```
#[derive(Debug)]
pub struct Dom {
    nodes: SlotMap<NodeId, DomNode>,
    root: NodeId,
    edits: Vec<Edit>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a new, empty tree.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();

        let mut root = DomNode::new("div");
        root.attributes.push(("id".to_owned(), "app".to_owned()));
        let root = nodes.insert(root);

        Self {
            nodes,
            root,
            edits: Vec::new(),
        }
    }

    /// Edits applied since the last call to [`Dom::take_edits`].
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Take the edits applied so far.
    pub fn take_edits(&mut self) -> Vec<Edit> {
        core::mem::take(&mut self.edits)
    }

    /// Returns `true` if `node` is part of this tree.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of nodes in this tree, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing is mounted into the root.
    pub fn is_empty(&self) -> bool {
        self.nodes[self.root].children.is_empty()
    }

    /// Tag of `node`.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|node| node.tag.as_str())
    }

    /// Value of the attribute `name` of `node`.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node)?.attribute(name)
    }

    /// Returns `true` if `node` has the class `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|node| node.classes.iter().any(|c| c == class))
    }

    /// Classes of `node`, in the order they were added.
    pub fn classes(&self, node: NodeId) -> impl Iterator<Item = &str> {
        self.nodes
            .get(node)
            .into_iter()
            .flat_map(|node| node.classes.iter().map(String::as_str))
    }

    /// Text content of `node`.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|node| node.text.as_str())
    }

    /// Parent of `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    /// Children of `node`.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Find the first node with the attribute `name` set to `value`, in document order.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|node| self.nodes[*node].attribute(name) == Some(value))
    }

    /// Find the first node with the tag `tag`, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find_all_by_tag(tag).next()
    }

    /// Find every node with the tag `tag`, in document order.
    pub fn find_all_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(self.root)
            .filter(move |node| self.nodes[*node].tag == tag)
    }

    /// Iterate over `node` and its descendants in document order.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = Vec::new();
        if self.contains(node) {
            stack.push(node);
        }

        core::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(self.nodes[node].children.iter().rev().copied());
            Some(node)
        })
    }

    /// Serialize the children of `node` to HTML.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut html = String::new();
        for child in self.children(node) {
            self.write_html(&mut html, *child);
        }
        html
    }

    /// Serialize `node` and its descendants to HTML.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut html = String::new();
        self.write_html(&mut html, node);
        html
    }

    /// Serialize this tree to HTML, starting from the root.
    pub fn to_html(&self) -> String {
        self.outer_html(self.root)
    }

    fn write_html(&self, html: &mut String, node: NodeId) {
        let Some(dom_node) = self.nodes.get(node) else {
            return;
        };

        let _ = write!(html, "<{}", dom_node.tag);
        for (name, value) in &dom_node.attributes {
            let _ = write!(html, " {}=\"{}\"", name, escape_attribute(value));
        }
        if !dom_node.classes.is_empty() {
            let _ = write!(
                html,
                " class=\"{}\"",
                escape_attribute(&dom_node.classes.join(" "))
            );
        }
        html.push('>');

        html.push_str(&escape_text(&dom_node.text));
        for child in &dom_node.children {
            self.write_html(html, *child);
        }

        let _ = write!(html, "</{}>", dom_node.tag);
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|node| node.parent.take()) else {
            return;
        };

        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|child| *child != node);
        }
    }
}

impl Surface for Dom {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let id = self.nodes.insert(DomNode::new(tag));
        self.edits.push(Edit::CreateElement {
            id,
            tag: tag.to_owned(),
        });
        id
    }

    fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return;
        }

        self.detach(child);

        let children = &mut self.nodes[parent].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child].parent = Some(parent);

        self.edits.push(Edit::InsertChild {
            parent,
            index,
            child,
        });
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.root || !self.contains(node) {
            return;
        }

        self.detach(node);

        let mut stack = vec![node];
        while let Some(node) = stack.pop() {
            if let Some(removed) = self.nodes.remove(node) {
                stack.extend(removed.children);
            }
        }

        self.edits.push(Edit::Remove { id: node });
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(dom_node) = self.nodes.get_mut(node) else {
            return;
        };

        if let Some(slot) = dom_node.attributes.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.to_owned();
        } else {
            dom_node
                .attributes
                .push((name.to_owned(), value.to_owned()));
        }

        self.edits.push(Edit::SetAttribute {
            id: node,
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let Some(dom_node) = self.nodes.get_mut(node) else {
            return;
        };
        dom_node.attributes.retain(|(n, _)| n != name);

        self.edits.push(Edit::RemoveAttribute {
            id: node,
            name: name.to_owned(),
        });
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        let Some(dom_node) = self.nodes.get_mut(node) else {
            return;
        };
        if dom_node.classes.iter().any(|c| c == class) {
            return;
        }
        dom_node.classes.push(class.to_owned());

        self.edits.push(Edit::AddClass {
            id: node,
            class: class.to_owned(),
        });
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(dom_node) = self.nodes.get_mut(node) else {
            return;
        };
        dom_node.classes.retain(|c| c != class);

        self.edits.push(Edit::RemoveClass {
            id: node,
            class: class.to_owned(),
        });
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        let Some(dom_node) = self.nodes.get_mut(node) else {
            return;
        };
        text.clone_into(&mut dom_node.text);

        self.edits.push(Edit::SetText {
            id: node,
            text: text.to_owned(),
        });
    }
}

/// Escape text content for HTML.
pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, false)
}

/// Escape an attribute value for a double- or single-quoted HTML attribute.
pub(crate) fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape(value, true)
}

fn escape(s: &str, is_attribute: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| match c {
        '&' | '<' | '>' => true,
        '"' | '\'' => is_attribute,
        _ => false,
    };

    if !s.contains(needs_escape) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if is_attribute => escaped.push_str("&quot;"),
            '\'' if is_attribute => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::{escape_attribute, escape_text, Dom};
    use crate::view::{Edit, Surface};

    #[test]
    fn it_escapes_text() {
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(
            escape_text("<script>alert('x')</script>"),
            "&lt;script&gt;alert('x')&lt;/script&gt;"
        );
    }

    #[test]
    fn it_escapes_attributes() {
        assert_eq!(escape_attribute(r#"a"b'c&"#), "a&quot;b&#39;c&amp;");
    }

    #[test]
    fn it_removes_subtrees() {
        let mut dom = Dom::new();
        let root = dom.root();

        let list = dom.create_element("ul");
        let item = dom.create_element("li");
        dom.insert_child(root, 0, list);
        dom.insert_child(list, 0, item);
        dom.take_edits();

        dom.remove(list);

        assert!(!dom.contains(list));
        assert!(!dom.contains(item));
        assert!(dom.is_empty());
        assert_eq!(dom.take_edits(), [Edit::Remove { id: list }]);
    }

    #[test]
    fn it_keeps_the_root() {
        let mut dom = Dom::new();
        let root = dom.root();

        dom.remove(root);

        assert!(dom.contains(root));
        assert!(dom.edits().is_empty());
    }

    #[test]
    fn it_reorders_on_insert() {
        let mut dom = Dom::new();
        let root = dom.root();

        let a = dom.create_element("a");
        let b = dom.create_element("b");
        dom.insert_child(root, 0, a);
        dom.insert_child(root, 0, b);
        assert_eq!(dom.children(root), [b, a]);

        dom.insert_child(root, 5, b);
        assert_eq!(dom.children(root), [a, b]);
        assert_eq!(dom.parent(b), Some(root));
    }
}
