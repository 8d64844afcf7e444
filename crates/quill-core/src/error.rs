/// Errors that can occur while drafting or reviewing posts.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary renders it through `miette` at the boundary.
///
/// Absence (a missing posts directory, a post without a document, a pull
/// request without a post file) is never reported through this type. See
/// [`Extracted`](crate::Extracted).
///
/// # Examples
///
/// ```
/// use quill_core::QuillError;
///
/// let err = QuillError::Config("GITHUB_TOKEN not set".into());
/// assert!(err.to_string().contains("GITHUB_TOKEN"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum QuillError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("required variables: GITHUB_TOKEN, HF_TOKEN, GITHUB_REPOSITORY"))]
    Config(String),

    /// Source-control host (GitHub) request failure.
    #[error("forge error: {0}")]
    Forge(String),

    /// Inference API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Model output that could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
