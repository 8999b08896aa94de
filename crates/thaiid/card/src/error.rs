use thaiid_apdu_core::TransportError;
use thaiid_apdu_core::processor::ProcessorError;

/// Result type for card operations
pub type Result<T, E = CardError> = std::result::Result<T, E>;

/// Error type for card operations
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// The reader went away during the operation
    #[error("Card reader disconnected")]
    Disconnected,

    /// The card answered with an unexpected status or not at all
    #[error("Card not responding or not a Thai ID card")]
    NotResponding,

    /// Transport-related errors
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Processor-related errors
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

impl CardError {
    /// Whether the reader has to be reopened before the next attempt
    pub const fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}
