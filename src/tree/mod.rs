//! The directory tree and its operations.
//!
//! [`DirTree`] is an unbounded hierarchy of named folders rooted at `/`.
//! Any number of threads may call [`list`](DirTree::list),
//! [`create`](DirTree::create), [`remove`](DirTree::remove) and
//! [`rename`](DirTree::rename) concurrently; operations on disjoint
//! subtrees proceed in parallel, while mutations observe a consistent view
//! of every path they touch.
//!
//! All four operations descend from the root hand-over-hand, holding each
//! intermediate folder as a reader and the operation's pivot folder as a
//! writer. `rename` additionally writer-locks the deepest folder shared by
//! the source and target parents, which linearizes every pair of renames
//! whose paths cross there.

pub(crate) mod node;
mod traverse;

use crate::error::TreeError;
use crate::path;
use self::node::Node;
use self::traverse::{descend_below, descend_reader, descend_writer, drain_subtree};
use std::sync::Arc;
use tracing::debug;

/// A concurrent in-memory tree of named folders.
///
/// The tree is `Send + Sync`; share it across threads behind an `Arc` or a
/// plain reference. Dropping the tree tears down every folder in it; by
/// then no operation may still be in flight, which the borrow checker
/// enforces for safe callers.
#[derive(Debug)]
pub struct DirTree {
    root: Arc<Node>,
}

impl Default for DirTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DirTree {
    /// Create a tree holding only the empty root folder `/`.
    pub fn new() -> Self {
        DirTree {
            root: Arc::new(Node::new()),
        }
    }

    /// List the folder at `path` as a comma-joined, name-sorted string.
    ///
    /// An empty folder yields the empty string. Takes only reader holds, so
    /// any number of listings proceed side by side.
    pub fn list(&self, path: &str) -> Result<String, TreeError> {
        if !path::is_valid(path) {
            return Err(TreeError::InvalidPath);
        }
        let names: Vec<&str> = path::components(path).collect();
        let permit = descend_reader(&self.root, &names)?;
        Ok(permit.node().contents_string())
    }

    /// Create an empty folder at `path`.
    ///
    /// Every folder on the way there must already exist.
    pub fn create(&self, path: &str) -> Result<(), TreeError> {
        if !path::is_valid(path) {
            return Err(TreeError::InvalidPath);
        }
        let Some((parent, name)) = path::split_last(path) else {
            // The root always exists.
            return Err(TreeError::AlreadyExists);
        };
        let names: Vec<&str> = path::components(parent).collect();
        let permit = descend_writer(&self.root, &names)?;
        permit.node().insert_child(name)?;
        debug!(path, "created folder");
        Ok(())
    }

    /// Remove the empty folder at `path`.
    ///
    /// Waits until every operation already inside the folder has finished;
    /// the writer hold on its parent keeps new ones out in the meantime.
    pub fn remove(&self, path: &str) -> Result<(), TreeError> {
        if !path::is_valid(path) {
            return Err(TreeError::InvalidPath);
        }
        let Some((parent, name)) = path::split_last(path) else {
            return Err(TreeError::Busy);
        };
        let names: Vec<&str> = path::components(parent).collect();
        let permit = descend_writer(&self.root, &names)?;
        let child = permit.node().child(name).ok_or(TreeError::NotFound)?;
        child.monitor().await_quiescence();
        if !child.is_empty() {
            return Err(TreeError::NotEmpty);
        }
        permit.node().remove_child(name);
        debug!(path, "removed folder");
        Ok(())
    }

    /// Move the folder at `source`, with everything under it, to `target`.
    ///
    /// `target` names the folder's new location, which must not exist yet;
    /// its parent must. Moving a folder into its own subtree is rejected.
    /// To every other operation the relocation is atomic: the subtree is
    /// fully quiesced before the edge is rewritten, so a traversal sees the
    /// folder at its old place or its new one, never both or neither.
    pub fn rename(&self, source: &str, target: &str) -> Result<(), TreeError> {
        if !path::is_valid(source) || !path::is_valid(target) {
            return Err(TreeError::InvalidPath);
        }
        if path::is_root(source) {
            return Err(TreeError::Busy);
        }
        if path::is_root(target) {
            return Err(TreeError::AlreadyExists);
        }
        if target.len() > source.len() && target.starts_with(source) {
            return Err(TreeError::MoveIntoItself);
        }
        let Some((source_parent, source_name)) = path::split_last(source) else {
            return Err(TreeError::Busy);
        };
        let Some((target_parent, target_name)) = path::split_last(target) else {
            return Err(TreeError::AlreadyExists);
        };

        let source_names: Vec<&str> = path::components(source_parent).collect();
        let target_names: Vec<&str> = path::components(target_parent).collect();
        let common = path::common_depth(source_parent, target_parent);

        // Writer-lock the deepest folder both parent paths share. Every
        // rename whose endpoints cross this folder serializes here.
        let shared_permit = descend_writer(&self.root, &source_names[..common])?;
        let shared_node = shared_permit.node().clone();
        let mut shared = Some(shared_permit);

        // Pin the target parent first and claim the target name.
        let target_permit = descend_below(&shared_node, &target_names[common..])?;
        let target_node = target_permit
            .as_ref()
            .map(|p| p.node().clone())
            .unwrap_or_else(|| shared_node.clone());
        if target_node.has_child(target_name) {
            return Err(TreeError::AlreadyExists);
        }

        // Then pin the source parent and find the folder to move.
        let source_permit = descend_below(&shared_node, &source_names[common..])?;
        let source_node = source_permit
            .as_ref()
            .map(|p| p.node().clone())
            .unwrap_or_else(|| shared_node.clone());
        let subtree = source_node.child(source_name).ok_or(TreeError::NotFound)?;

        // With both endpoints writer-held, a shared ancestor distinct from
        // them can let unrelated traffic through again.
        if source_permit.is_some() && target_permit.is_some() {
            drop(shared.take());
        }

        // Everyone already below the moving folder still assumes its old
        // path; wait them out before rewriting the edge.
        drain_subtree(&subtree);
        source_node.remove_child(source_name);
        target_node.attach_child(target_name, subtree);
        debug!(source, target, "moved folder");

        // Release the source parent before the target parent. Either one
        // may be held through `shared` when it coincides with the shared
        // ancestor, so the order is spelled out rather than left to
        // declaration-order drops.
        drop(source_permit);
        drop(shared);
        drop(target_permit);
        Ok(())
    }
}
