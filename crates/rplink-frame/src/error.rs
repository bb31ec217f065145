/// Errors that can occur during frame encoding/transmission.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload cannot be described by the 32-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel accepted fewer bytes than one whole fragment.
    #[error("short write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
