//! Error handling for lowlight-pull

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (ledger file, mirror directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// Bridge transport error (adb missing, timeout, non-zero exit)
    #[error("Bridge error: {0}")]
    Bridge(String),
}
