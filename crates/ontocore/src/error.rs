use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Not found: '{identifier}' ({context})")]
    NotFound { identifier: String, context: String },

    #[error("Conflict: stage name '{0}' is generated more than once")]
    Conflict(String),

    #[error("Unsupported target store backend: {0}")]
    Unsupported(String),

    #[error("Malformed resource '{identifier}': {reason}")]
    Malformed { identifier: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CompileError {
    pub fn not_found(identifier: impl Into<String>, context: impl Into<String>) -> Self {
        CompileError::NotFound {
            identifier: identifier.into(),
            context: context.into(),
        }
    }

    pub fn malformed(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::Malformed {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Missing identifier for description at depth {depth}")]
    MissingIdentifier { depth: usize },

    #[error("Description nesting exceeds the ceiling of {max_depth} levels")]
    DepthExceeded { max_depth: usize },

    #[error("Cyclic dependency detected")]
    CyclicDependency,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid resource '{identifier}': {reason}")]
    InvalidResource { identifier: String, reason: String },
}
