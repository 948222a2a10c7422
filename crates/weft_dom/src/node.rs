//! Element node arena
//!
//! Nodes live in a `SlotMap` keyed by generational [`NodeId`]s, so a
//! detached or freed node leaves behind an inert id rather than a
//! dangling reference. The arena stores just enough element state for a
//! binding runtime: tag name, id, classes, attributes, a value slot
//! (the editable state of form-like elements) and tree links.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Unique identifier for an element node
    pub struct NodeId;
}

/// Element state for a single node
#[derive(Debug, Default, Clone)]
pub struct NodeData {
    /// Tag name, lowercase ("div", "input", ...)
    pub tag: String,
    /// Element id ("" when unset)
    pub id: String,
    /// Class list, in insertion order
    pub classes: Vec<String>,
    /// Attributes other than id/class
    pub attrs: FxHashMap<String, String>,
    /// The editable value slot (what `value` means on an input)
    pub value: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The element arena
#[derive(Debug, Default)]
pub struct Dom {
    nodes: SlotMap<NodeId, NodeData>,
}

impl Dom {
    /// Create an empty arena
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Create a detached element with the given tag name
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.insert(NodeData {
            tag: tag.to_ascii_lowercase(),
            ..NodeData::default()
        })
    }

    /// Whether the id refers to a live node
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Read a node's data
    pub fn get(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node)
    }

    /// Append `child` as the last child of `parent`, detaching it from
    /// any previous parent first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            tracing::warn!(?parent, ?child, "append_child on invalid node pair");
            return;
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Detach a node from its parent, keeping its subtree intact
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[node].parent = None;
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != node);
        }
    }

    /// Remove a node and its whole subtree from the arena
    pub fn remove_subtree(&mut self, node: NodeId) {
        self.detach(node);
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(data) = self.nodes.remove(n) {
                stack.extend(data.children);
            }
        }
    }

    /// Parent of a node
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// Children of a node, in tree order
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.parent(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Detached tree roots, in creation order
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Depth-first descendants of `root`, in document order, excluding
    /// `root` itself. Snapshot at call time.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    // -- element state ------------------------------------------------------

    /// Tag name of a node
    pub fn tag(&self, node: NodeId) -> &str {
        self.nodes.get(node).map(|n| n.tag.as_str()).unwrap_or("")
    }

    /// Set the element id
    pub fn set_id(&mut self, node: NodeId, id: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.id = id.to_string();
        }
    }

    /// Element id ("" when unset)
    pub fn id(&self, node: NodeId) -> &str {
        self.nodes.get(node).map(|n| n.id.as_str()).unwrap_or("")
    }

    /// Add a class to the class list
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        }
    }

    /// Remove a class from the class list
    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    /// Whether the class list contains `class`
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Remove an attribute
    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.attrs.remove(name);
        }
    }

    /// Read an attribute
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    /// Set the editable value slot
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.value = value.to_string();
        }
    }

    /// Read the editable value slot
    pub fn value(&self, node: NodeId) -> &str {
        self.nodes
            .get(node)
            .map(|n| n.value.as_str())
            .unwrap_or("")
    }
}
