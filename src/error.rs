use thiserror::Error;

/// Errors surfaced by the direct-authoring path.
///
/// Extraction, synthesis and rendering never fail; low-information input
/// degrades to empty or fallback output instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("scenario descriptor is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid scenario descriptor: {0}")]
    InvalidDescriptor(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
