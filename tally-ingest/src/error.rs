//! Error taxonomy for the extraction engine.

use thiserror::Error;

/// Terminal failures surfaced by the engine.
///
/// Pattern misses are not errors: a field or line that fails to match yields
/// `None` or an empty collection through normal control flow.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Both text-extraction methods failed or produced nothing.
    #[error("Could not extract text from PDF")]
    PdfRead,

    /// A format config failed validation (uncompilable regex, bad shape).
    #[error("Invalid format config: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
