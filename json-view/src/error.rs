use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to open {path}: {message}")]
    Open { path: String, message: String },

    #[error("no visible rows to display")]
    EmptyVisibleSet,
}

pub type Result<T> = std::result::Result<T, ViewError>;
