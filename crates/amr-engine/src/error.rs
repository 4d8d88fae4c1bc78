use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The notation text does not match the grammar.
    #[error("failed to parse AMR at offset {offset}: {text}")]
    Grammar { text: String, offset: usize },

    /// A variable reference names no variable defined in the same graph.
    #[error("unresolved variable reference: {name}")]
    UnresolvedReference { name: String },

    /// A variable name is defined twice in one graph.
    #[error("duplicate variable definition: {name}")]
    DuplicateVariable { name: String },

    #[error("invalid grammar resource: {0}")]
    InvalidGrammar(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
