use thiserror::Error; // Import the `Error` derive macro from the `thiserror` crate

// Errors surfaced by the opt-in strict paths of the crate. The lenient query
// functions never return these; they degrade to "no match" instead.
#[derive(Debug, Error)]
pub enum QueryError {
    // A character the path dialect has no rule for
    #[error("unexpected character {ch:?} at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    // A `[` without a matching `]`
    #[error("unterminated bracket opened at position {position}")]
    UnterminatedBracket { position: usize },

    // A slice component such as the `x` in `[1:x]`
    #[error("invalid slice bound: {0:?}")]
    InvalidSliceBound(String),

    // A filter expression outside the supported grammar
    #[error("invalid filter expression: {0}")]
    InvalidFilter(String),

    // JSON text that could not be parsed into a document
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// Type alias for results that use `QueryError` as the error type
pub type Result<T> = std::result::Result<T, QueryError>;
