//! Folder nodes and their child maps.

use crate::concurrency::NodeMonitor;
use crate::error::TreeError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// One folder in the tree.
///
/// A node owns its children through the name→child map; unlinking a name
/// drops the owning `Arc`, and the node's storage is released once the last
/// in-flight traversal lets go of its clone. The map may only be mutated
/// while the mutator holds writer admission on this node's monitor, and read
/// with at least reader admission; the inner `RwLock` exists so the compiler
/// can see that too.
#[derive(Debug)]
pub(crate) struct Node {
    monitor: NodeMonitor,
    children: RwLock<HashMap<String, Arc<Node>>>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    pub(crate) fn new() -> Self {
        Node {
            monitor: NodeMonitor::new(),
            children: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn monitor(&self) -> &NodeMonitor {
        &self.monitor
    }

    /// Look up a child by name.
    pub(crate) fn child(&self, name: &str) -> Option<Arc<Node>> {
        self.children.read().get(name).cloned()
    }

    pub(crate) fn has_child(&self, name: &str) -> bool {
        self.children.read().contains_key(name)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.children.read().is_empty()
    }

    /// Insert a fresh empty folder under `name`.
    ///
    /// Requires writer admission on this node.
    pub(crate) fn insert_child(&self, name: &str) -> Result<(), TreeError> {
        let mut children = self.children.write();
        if children.contains_key(name) {
            return Err(TreeError::AlreadyExists);
        }
        children.insert(name.to_string(), Arc::new(Node::new()));
        Ok(())
    }

    /// Attach an existing subtree under `name`.
    ///
    /// Requires writer admission on this node; the caller has already
    /// verified the name is free.
    pub(crate) fn attach_child(&self, name: &str, node: Arc<Node>) {
        self.children.write().insert(name.to_string(), node);
    }

    /// Unlink the child named `name`, returning its subtree.
    ///
    /// Requires writer admission on this node.
    pub(crate) fn remove_child(&self, name: &str) -> Option<Arc<Node>> {
        self.children.write().remove(name)
    }

    /// Snapshot the child names as a comma-joined string, sorted by name.
    ///
    /// An empty folder yields the empty string. Requires at least reader
    /// admission on this node.
    pub(crate) fn contents_string(&self) -> String {
        let children = self.children.read();
        let mut names: Vec<&str> = children.keys().map(String::as_str).collect();
        names.sort_unstable();
        names.join(",")
    }

    /// Visit every child under the children read guard.
    ///
    /// Used by subtree drains: holding the guard pins the child set for the
    /// duration of the visit.
    pub(crate) fn for_each_child(&self, mut visit: impl FnMut(&Arc<Node>)) {
        let children = self.children.read();
        for child in children.values() {
            visit(child);
        }
    }
}
