//! Error types for the weft core runtime

use thiserror::Error;
use weft_dom::SelectorError;

/// Errors that can occur in core runtime operations
///
/// All variants are raised synchronously at the call site, before any
/// mutation. The permissive behaviors of `unbind` (non-matching
/// key/node) and `select`/`select_all` (absent scope root) are design
/// choices and deliberately not represented here.
#[derive(Error, Debug)]
pub enum WeftError {
    /// The subject id is stale or was never issued by this runtime
    #[error("unknown or reclaimed object id")]
    UnknownObject,

    /// An empty or otherwise unusable key reached an operation
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    /// A bind target resolved to zero nodes and `optional` was not set
    #[error("no node matched binding target {spec:?}")]
    NodeNotFound {
        /// The selector or target description that failed to resolve
        spec: String,
    },

    /// A reserved key (`sandbox`, `container` on lists) was bound
    /// through the general binding API
    #[error("key {key:?} is reserved")]
    ReservedKeyConflict { key: String },

    /// A bind target named a removed node, or resolved to nothing
    /// where a node is required
    #[error("bind target has no live node")]
    MissingNode,

    /// Selector parse failure
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Result type for core runtime operations
pub type Result<T> = std::result::Result<T, WeftError>;
