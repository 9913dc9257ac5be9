use std::path::PathBuf;

/// Errors returned by configuration loading and definition output.
///
/// Generation itself is infallible; misuse of the model panics.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// Reading or writing a file failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A definition name cannot be used as a file name.
    #[error("definition name '{name}' is not a valid file name")]
    InvalidName { name: String },

    /// The generator configuration is not valid TOML or has wrong types.
    #[error("invalid generator configuration: {0}")]
    Config(#[from] toml::de::Error),
}
