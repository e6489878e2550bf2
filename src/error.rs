//! Error types for tree operations and logging setup.

use thiserror::Error;

/// Outcome of a failed tree operation.
///
/// Most variants are expected results of concurrent use rather than bugs:
/// a folder can vanish between two calls, a name can be taken by a racing
/// `create`. Callers that speak the POSIX-style numeric protocol can use
/// [`TreeError::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The path is not of the form `/` or `/name1/name2/.../`.
    #[error("invalid path")]
    InvalidPath,
    /// The target folder already exists, or the target is the root.
    #[error("folder already exists")]
    AlreadyExists,
    /// A path component does not exist.
    #[error("no such folder")]
    NotFound,
    /// The folder still has children and cannot be removed.
    #[error("folder is not empty")]
    NotEmpty,
    /// The operation is not permitted on the root folder.
    #[error("operation not permitted on the root folder")]
    Busy,
    /// The rename source is an ancestor of the rename target.
    #[error("cannot move a folder into its own subtree")]
    MoveIntoItself,
}

impl TreeError {
    /// Numeric code compatible with the errno-style interface.
    pub const fn code(self) -> i32 {
        match self {
            TreeError::InvalidPath => 22,    // EINVAL
            TreeError::AlreadyExists => 17,  // EEXIST
            TreeError::NotFound => 2,        // ENOENT
            TreeError::NotEmpty => 39,       // ENOTEMPTY
            TreeError::Busy => 16,           // EBUSY
            TreeError::MoveIntoItself => -1,
        }
    }
}

/// Failure while configuring the logging subsystem.
#[derive(Debug, Clone, Error)]
pub enum LoggingError {
    #[error("invalid logging configuration: {0}")]
    InvalidConfig(String),
    #[error("logging already initialized")]
    AlreadyInitialized,
}
