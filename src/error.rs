use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors raised by the tree engine and the demo binary.
///
/// Every tree-input variant is detected before any mutation happens, so a
/// rejected call leaves the structure as it was.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Empty location, or an index outside the addressed children.
    #[error("Invalid tree location: {0:?}")]
    InvalidLocation(Vec<usize>),

    /// A node handle that no longer refers to a live node.
    #[error("Tree node not found")]
    NodeNotFound,

    /// An identity lookup was needed but no identity provider is configured.
    #[error("An identity provider is required for identity lookups")]
    MissingIdentityProvider,

    /// The requested element is not part of the tree.
    #[error("Tree element not found: {0}")]
    ElementNotFound(String),

    /// I/O errors from reading data or config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON tree data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),
}
