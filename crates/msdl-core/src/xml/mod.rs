//! Arena-backed XML text tree
//!
//! Entities never hold references into the document. Every node lives in a
//! flat arena owned by [`XmlTree`] and is addressed by a copyable [`NodeId`],
//! so detaching and re-attaching nodes during re-parenting cannot alias.
//!
//! Nodes that are never touched keep their raw source text (escaped text,
//! verbatim attribute text, self-closing form) and serialize byte-for-byte
//! as parsed.

mod parse;
mod write;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use parse::XmlError;

static NEXT_DOCUMENT: AtomicU64 = AtomicU64::new(1);

/// Stable handle of a node inside an [`XmlTree`] arena
///
/// A handle remembers the document that allocated it, so a node of one
/// tree is never taken for the node at the same index of another. Clones
/// of a tree share its stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    document: u64,
    index: usize,
}

impl NodeId {
    /// Arena index of this node
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// An element node
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written in the source (`prefix:local` or `local`)
    pub name: String,
    /// Attributes as `(qualified name, raw escaped value)`
    pub attributes: Vec<(String, String)>,
    /// Attribute section exactly as it appeared after the tag name
    pub(crate) raw_attributes: Option<String>,
    /// Element was written as `<name/>` in the source
    pub(crate) self_closing: bool,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            raw_attributes: None,
            self_closing: false,
        }
    }

    /// Local part of the qualified name
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Namespace prefix of the qualified name, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }
}

/// A character data node
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// Unescaped content
    pub value: String,
    /// Escaped source form, written back verbatim
    pub(crate) raw: String,
}

/// Node payload
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(Text),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    Declaration(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// An XML document held as an arena of nodes
#[derive(Debug, Clone)]
pub struct XmlTree {
    pub(crate) nodes: Vec<Node>,
    stamp: u64,
    document: NodeId,
}

impl Default for XmlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTree {
    /// Create an empty document
    pub fn new() -> Self {
        let stamp = NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed);
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            stamp,
            document: NodeId {
                document: stamp,
                index: 0,
            },
        }
    }

    /// Parse a UTF-8 XML document
    ///
    /// # Errors
    ///
    /// Returns `XmlError` for malformed markup, mismatched or unclosed tags.
    pub fn parse(source: &str) -> Result<Self, XmlError> {
        parse::parse_document(source)
    }

    /// Serialize the whole document
    pub fn to_xml_string(&self) -> String {
        write::write_document(self)
    }

    /// Serialize a single subtree
    pub fn node_to_string(&self, node: NodeId) -> String {
        let mut out = String::new();
        write::write_node(self, node, &mut out);
        out
    }

    /// The document node (parent of the root element)
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// The outermost element
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.document)
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    /// Whether `node` was allocated by this tree
    pub fn contains(&self, node: NodeId) -> bool {
        node.document == self.stamp && node.index < self.nodes.len()
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.index].kind
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.index].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.index].kind, NodeKind::Element(_))
    }

    /// Local name of an element; empty for non-element nodes
    pub fn local_name(&self, node: NodeId) -> &str {
        self.element(node).map(Element::local_name).unwrap_or("")
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index].children
    }

    /// Whether `node` is reachable from the document node
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == self.document
    }

    /// Child elements in document order
    pub fn child_elements(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(move |&id| self.is_element(id))
    }

    /// First child element with the given local name
    pub fn first_child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(node)
            .find(|&id| self.local_name(id) == name)
    }

    /// All child elements with the given local name
    pub fn children_named(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        self.child_elements(node)
            .filter(|&id| self.local_name(id) == name)
            .collect()
    }

    /// Follow a path of child local names
    pub fn find_path(&self, node: NodeId, path: &[&str]) -> Option<NodeId> {
        path.iter()
            .try_fold(node, |current, name| self.first_child(current, name))
    }

    /// First descendant element (pre-order) with the given local name
    pub fn descendant(&self, node: NodeId, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id) && self.local_name(id) == name {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        None
    }

    /// All descendant elements (pre-order) with the given local name
    pub fn descendants(&self, node: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id) && self.local_name(id) == name {
                found.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        found
    }

    /// Trimmed text content of an element
    ///
    /// Returns the first text or CDATA child that is not blank.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.children(node).iter().find_map(|&id| {
            let value = match &self.nodes[id.index].kind {
                NodeKind::Text(text) => text.value.as_str(),
                NodeKind::CData(data) => data.as_str(),
                _ => return None,
            };
            let trimmed = value.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
    }

    /// Trimmed text of the element at `path` below `node`
    pub fn path_text(&self, node: NodeId, path: &[&str]) -> Option<&str> {
        self.find_path(node, path).and_then(|id| self.text(id))
    }

    /// Raw (still escaped) value of an attribute, looked up by local name
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .iter()
            .find(|(key, _)| local_part(key) == name)
            .map(|(_, value)| value.as_str())
    }

    /// Create a detached element node
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(name)), None)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, value: &str) -> NodeId {
        let text = Text {
            value: value.to_string(),
            raw: write::escape_text(value),
        };
        self.push(NodeKind::Text(text), None)
    }

    /// Create a detached element carrying the parent's namespace prefix
    pub fn create_element_in(&mut self, parent: NodeId, local_name: &str) -> NodeId {
        let name = match self.element(parent).and_then(Element::prefix) {
            Some(prefix) => format!("{prefix}:{local_name}"),
            None => local_name.to_string(),
        };
        self.create_element(&name)
    }

    /// Give unprefixed elements of the subtree at `node` the prefix of `parent`
    pub fn adopt_prefix(&mut self, node: NodeId, parent: NodeId) {
        let Some(prefix) = self
            .element(parent)
            .and_then(Element::prefix)
            .map(str::to_string)
        else {
            return;
        };
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let NodeKind::Element(element) = &mut self.nodes[id.index].kind {
                if element.prefix().is_none() {
                    element.name = format!("{prefix}:{}", element.name);
                }
            }
            stack.extend(self.nodes[id.index].children.iter().copied());
        }
    }

    /// Replace all children of an element with a single text node
    pub fn set_text(&mut self, node: NodeId, value: &str) {
        let old: Vec<NodeId> = self.nodes[node.index].children.drain(..).collect();
        for child in old {
            self.nodes[child.index].parent = None;
        }
        let text = self.create_text(value);
        self.append_child(node, text);
    }

    /// Get or create the child element with `local_name`
    pub fn ensure_child(&mut self, node: NodeId, local_name: &str) -> NodeId {
        match self.first_child(node, local_name) {
            Some(existing) => existing,
            None => {
                let created = self.create_element_in(node, local_name);
                self.append_child(node, created);
                created
            }
        }
    }

    /// Get or create every element along `path`
    pub fn ensure_path(&mut self, node: NodeId, path: &[&str]) -> NodeId {
        path.iter()
            .fold(node, |current, name| self.ensure_child(current, name))
    }

    /// Write a text value at `path`, creating wrapper elements as needed
    pub fn set_path_text(&mut self, node: NodeId, path: &[&str], value: &str) -> NodeId {
        let target = self.ensure_path(node, path);
        self.set_text(target, value);
        target
    }

    /// Detach the element at `path`; returns whether one was found
    pub fn remove_path(&mut self, node: NodeId, path: &[&str]) -> bool {
        match self.find_path(node, path) {
            Some(found) => {
                self.detach(found);
                true
            }
            None => false,
        }
    }

    /// Remove a node from its parent; the subtree stays in the arena
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.index].parent.take() {
            self.nodes[parent.index].children.retain(|&child| child != node);
        }
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index].parent = Some(parent);
        self.nodes[parent.index].children.push(child);
        self.open_element(parent);
    }

    /// Insert `node` immediately before `sibling`
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        self.insert_relative(sibling, node, 0);
    }

    /// Insert `node` immediately after `sibling`
    pub fn insert_after(&mut self, sibling: NodeId, node: NodeId) {
        self.insert_relative(sibling, node, 1);
    }

    fn insert_relative(&mut self, sibling: NodeId, node: NodeId, offset: usize) {
        if sibling == node {
            return;
        }
        self.detach(node);
        let Some(parent) = self.nodes[sibling.index].parent else {
            return;
        };
        let children = &mut self.nodes[parent.index].children;
        let index = children
            .iter()
            .position(|&child| child == sibling)
            .map_or(children.len(), |pos| pos + offset);
        children.insert(index, node);
        self.nodes[node.index].parent = Some(parent);
    }

    fn open_element(&mut self, node: NodeId) {
        if let NodeKind::Element(element) = &mut self.nodes[node.index].kind {
            element.self_closing = false;
        }
    }

    pub(crate) fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId {
            document: self.stamp,
            index: self.nodes.len(),
        };
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.index].children.push(id);
        }
        id
    }
}

/// Local part of a qualified name
pub fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}
