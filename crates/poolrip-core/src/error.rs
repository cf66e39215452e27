use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("No string terminator within {limit} bytes at address {address:#x}")]
    StringTooLong { address: u64, limit: usize },

    #[error("String id {0} could not be resolved")]
    StringNotFound(u32),

    #[error("Animation type index {0} is outside the type table")]
    InvalidAnimType(u8),

    #[error("Decode inconsistency: {0}")]
    DecodeInconsistency(String),

    #[error("Export cancelled")]
    Cancelled,

    #[error("Export deadline exceeded")]
    DeadlineExceeded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Faults that come from reading the remote address space.
    ///
    /// A scan skips the slot on these and keeps going.
    pub fn is_read_fault(&self) -> bool {
        matches!(
            self,
            Error::MemoryReadFailed { .. } | Error::StringTooLong { .. } | Error::StringNotFound(_)
        )
    }

    /// The export was stopped by its cancel token.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    pub(crate) fn read_failed(address: u64, message: impl Into<String>) -> Self {
        Error::MemoryReadFailed {
            address,
            message: message.into(),
        }
    }
}
