//! Core error type for APDU operations

use crate::processor::ProcessorError;
use crate::response::error::ResponseError;
use crate::transport::TransportError;

/// Result type alias using the crate [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed response
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// Failure while processing a command (continuation, chaining)
    #[error(transparent)]
    Processor(#[from] ProcessorError),

    /// Invalid command length
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),
}

impl Error {
    /// Whether this error originated in the transport layer
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Processor(ProcessorError::Transport(_))
        )
    }
}
