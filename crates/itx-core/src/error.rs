//! Error types for itx

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("document store is not connected")]
    NotConnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(String),
}
