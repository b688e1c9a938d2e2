use thiserror::Error;

/// A level of the namespace hierarchy, each with its own code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Category,
    Branch,
    Leaf,
}

impl Level {
    /// Number of codes available at this level (per parent scope).
    pub fn capacity(&self) -> usize {
        match self {
            Level::Category | Level::Branch => 16,
            Level::Leaf => 256,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Category => write!(f, "category"),
            Level::Branch => write!(f, "branch"),
            Level::Leaf => write!(f, "leaf"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GaiaError {
    #[error("Name already exists: {0}")]
    NameConflict(String),

    #[error("Namespace exhausted at {0} level (max {cap})", cap = .0.capacity())]
    NamespaceExhausted(Level),

    #[error("Cannot update {id}: branch changed from '{from}' to '{to}' (remove and re-add to rename)")]
    BranchChanged { id: String, from: String, to: String },

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid name '{0}'")]
    InvalidName(String),

    #[error("Invalid alias: {0}")]
    InvalidAlias(String),

    #[error("Duplicated content with entry {0}")]
    DuplicateContent(String),

    #[error("Duplicated id generated: {0}")]
    DuplicateId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, GaiaError>;
