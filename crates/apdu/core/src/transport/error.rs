//! Error types specific to card transport

/// Transport error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection to the card could not be established or was lost
    #[error("Failed to connect to card")]
    Connection,

    /// The reader reports no card in the slot
    #[error("No card present in reader")]
    NoCard,

    /// The reader itself went away (unplugged, service stopped)
    #[error("Reader unavailable: {0}")]
    ReaderUnavailable(String),

    /// Transmission error
    #[error("Failed to transmit data")]
    Transmission,

    /// The card did not answer in time
    #[error("Operation timed out")]
    Timeout,

    /// Driver error (with code)
    #[error("Driver error code: {0:#010X}")]
    Driver(u32),

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }

    /// Whether the error means the reader is gone rather than a single exchange failing
    pub const fn is_disconnect(&self) -> bool {
        matches!(self, Self::ReaderUnavailable(_))
    }
}
