use thaiid_apdu_core::TransportError;

/// Error type for relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The reader host could not enumerate or open the device
    #[error("Device error: {0}")]
    Device(#[from] TransportError),

    /// A blocking transport task panicked or was cancelled
    #[error("Transport task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
