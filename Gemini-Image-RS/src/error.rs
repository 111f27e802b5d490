use thiserror::Error;

/// Errors returned by Gemini image operations.
#[derive(Error, Debug)]
pub enum GeminiError {
    /// The call succeeded but no image could be extracted from the response.
    #[error("{reason}")]
    Generation { reason: String },

    /// Gemini returned a non-success HTTP status.
    #[error("Gemini returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A reference image could not be decoded.
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    /// Writing an image to disk failed.
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

impl GeminiError {
    pub(crate) fn no_image() -> Self {
        GeminiError::Generation {
            reason: "no image in response".into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GeminiError>;
