/// Error returned when a dotted field path cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path string was empty.
    #[error("field path is empty")]
    Empty,

    /// Two separators follow each other, or the path starts or ends with one.
    #[error("field path '{path}' has an empty segment")]
    EmptySegment { path: String },

    /// A `[` was opened but never closed.
    #[error("field path '{path}' has an unterminated list index")]
    UnterminatedIndex { path: String },

    /// The text between `[` and `]` is not a non-negative integer.
    #[error("field path '{path}' has invalid list index '{index}'")]
    InvalidIndex { path: String, index: String },

    /// A quoted segment was opened but never closed.
    #[error("field path '{path}' has an unterminated quoted segment")]
    UnterminatedQuote { path: String },

    /// A character that cannot follow the previous segment.
    #[error("field path '{path}' has unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar {
        path: String,
        ch: char,
        offset: usize,
    },
}
