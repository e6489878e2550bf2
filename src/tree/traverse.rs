//! Hand-over-hand descent through the tree.
//!
//! Every descent obeys one discipline: the child's admission is acquired
//! *before* the parent's is released. A descender that overlapped its
//! holds this way is always visible to a writer arriving at any node on
//! its path, which is what lets `remove` and `rename` trust the quiescence
//! counters. Admissions are held through RAII permits so that every early
//! return, `?` included, releases exactly what was taken.

use crate::error::TreeError;
use crate::tree::node::Node;
use std::sync::Arc;

/// Shared admission on one node, released on drop.
pub(crate) struct ReadPermit {
    node: Arc<Node>,
}

impl ReadPermit {
    pub(crate) fn acquire(node: &Arc<Node>) -> Self {
        node.monitor().reader_enter();
        ReadPermit { node: node.clone() }
    }

    pub(crate) fn node(&self) -> &Arc<Node> {
        &self.node
    }
}

impl Drop for ReadPermit {
    fn drop(&mut self) {
        self.node.monitor().reader_exit();
    }
}

/// Exclusive admission on one node, released on drop.
#[derive(Debug)]
pub(crate) struct WritePermit {
    node: Arc<Node>,
}

impl WritePermit {
    pub(crate) fn acquire(node: &Arc<Node>) -> Self {
        node.monitor().writer_enter();
        WritePermit { node: node.clone() }
    }

    pub(crate) fn node(&self) -> &Arc<Node> {
        &self.node
    }
}

impl Drop for WritePermit {
    fn drop(&mut self) {
        self.node.monitor().writer_exit();
    }
}

/// Descend `names` from `start` under reader admissions, ending with a
/// reader hold on the named node.
///
/// A missing component releases the currently held node and reports
/// [`TreeError::NotFound`].
pub(crate) fn descend_reader(
    start: &Arc<Node>,
    names: &[&str],
) -> Result<ReadPermit, TreeError> {
    let mut held = ReadPermit::acquire(start);
    for name in names {
        let child = held.node().child(name).ok_or(TreeError::NotFound)?;
        // Assignment acquires the child before the old permit drops.
        held = ReadPermit::acquire(&child);
    }
    Ok(held)
}

/// Descend `names` from `start`, readers along the way, ending with a
/// writer hold on the named node. An empty `names` writer-locks `start`
/// itself.
///
/// The descent never upgrades early: a missing component releases the held
/// node as a reader and reports [`TreeError::NotFound`].
pub(crate) fn descend_writer(
    start: &Arc<Node>,
    names: &[&str],
) -> Result<WritePermit, TreeError> {
    let Some((last, inner)) = names.split_last() else {
        return Ok(WritePermit::acquire(start));
    };
    let mut held = ReadPermit::acquire(start);
    for name in inner {
        let child = held.node().child(name).ok_or(TreeError::NotFound)?;
        held = ReadPermit::acquire(&child);
    }
    let child = held.node().child(last).ok_or(TreeError::NotFound)?;
    let permit = WritePermit::acquire(&child);
    drop(held);
    Ok(permit)
}

/// Descend `names` below a node the caller already writer-holds, ending
/// with a writer hold on the named node.
///
/// Returns `None` when `names` is empty: the endpoint is `from` itself and
/// the caller's existing permit covers it. The caller's hold on `from` is
/// never released here, even on error.
pub(crate) fn descend_below(
    from: &Arc<Node>,
    names: &[&str],
) -> Result<Option<WritePermit>, TreeError> {
    let Some((last, inner)) = names.split_last() else {
        return Ok(None);
    };
    let mut held: Option<ReadPermit> = None;
    for name in inner {
        let current = held.as_ref().map(|p| p.node()).unwrap_or(from);
        let child = current.child(name).ok_or(TreeError::NotFound)?;
        held = Some(ReadPermit::acquire(&child));
    }
    let current = held.as_ref().map(|p| p.node()).unwrap_or(from);
    let child = current.child(last).ok_or(TreeError::NotFound)?;
    let permit = WritePermit::acquire(&child);
    drop(held);
    Ok(Some(permit))
}

/// Wait until every node in the subtree rooted at `node` has quiesced.
///
/// The caller must writer-hold the folder the subtree hangs from, so no new
/// traversal can enter; this only waits out descenders that were already
/// inside. Children are visited under the parent's read guard, pinning the
/// shape of the subtree as the drain walks it.
pub(crate) fn drain_subtree(node: &Arc<Node>) {
    node.monitor().await_quiescence();
    node.for_each_child(|child| drain_subtree(child));
}
