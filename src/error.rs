//! Error types for docmap library.

use std::io;
use thiserror::Error;

/// Result type alias for docmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting structure or ranking sections.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is neither a PDF nor a run dump.
    #[error("Unknown file format: not a PDF or run dump")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF layer could not extract text runs.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Malformed JSON input (run dump or collection config).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persona/task configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The embedding collaborator failed or timed out.
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Error while rendering output.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
