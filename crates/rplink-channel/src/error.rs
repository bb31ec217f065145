use std::path::PathBuf;

/// Errors that can occur in channel lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// Failed to open the device at the given path.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the device handle.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
