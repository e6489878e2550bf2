//! Arbor: Concurrent In-Memory Directory Tree
//!
//! An unbounded hierarchy of named folders rooted at `/`, safe to use from
//! any number of threads. Listings and descents share folders as readers;
//! creations, removals and moves hold their pivot folders exclusively, so
//! independent subtrees make progress in parallel while every mutation
//! observes a consistent view of the paths it touches.
//!
//! ```
//! use arbor::DirTree;
//!
//! let tree = DirTree::new();
//! tree.create("/docs/")?;
//! tree.create("/docs/drafts/")?;
//! tree.create("/archive/")?;
//! tree.rename("/docs/drafts/", "/archive/drafts/")?;
//! assert_eq!(tree.list("/archive/")?, "drafts");
//! # Ok::<(), arbor::TreeError>(())
//! ```

mod concurrency;
pub mod error;
pub mod logging;
pub mod path;
pub mod tree;

pub use error::TreeError;
pub use tree::DirTree;
