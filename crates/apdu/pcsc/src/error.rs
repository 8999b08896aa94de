//! Error types for PC/SC transport

use thaiid_apdu_core::TransportError;

/// PC/SC-specific errors
#[derive(Debug, thiserror::Error)]
pub enum PcscError {
    /// PC/SC error
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),

    /// No readers available
    #[error("No readers available")]
    NoReadersAvailable,

    /// Reader not found
    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    /// No card present in reader
    #[error("No card present in reader: {0}")]
    NoCard(String),

    /// Card was removed
    #[error("Card was removed")]
    CardRemoved,
}

impl PcscError {
    /// Whether the reader (not just the card) has gone away
    pub const fn is_reader_gone(&self) -> bool {
        matches!(
            self,
            Self::NoReadersAvailable
                | Self::ReaderNotFound(_)
                | Self::Pcsc(
                    pcsc::Error::ReaderUnavailable
                        | pcsc::Error::UnknownReader
                        | pcsc::Error::NoReadersAvailable
                        | pcsc::Error::NoService
                        | pcsc::Error::ServiceStopped
                )
        )
    }
}

impl From<PcscError> for TransportError {
    fn from(error: PcscError) -> Self {
        if error.is_reader_gone() {
            return Self::ReaderUnavailable(error.to_string());
        }
        match error {
            PcscError::NoCard(_) | PcscError::CardRemoved => Self::NoCard,
            PcscError::Pcsc(pcsc::Error::NoSmartcard | pcsc::Error::RemovedCard) => Self::NoCard,
            PcscError::Pcsc(pcsc::Error::Timeout) => Self::Timeout,
            PcscError::Pcsc(pcsc::Error::ResetCard | pcsc::Error::UnpoweredCard) => Self::Connection,
            PcscError::Pcsc(e) => Self::Driver(e as u32),
            other => Self::other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcsc_error_to_transport_error() {
        assert_eq!(
            TransportError::from(PcscError::Pcsc(pcsc::Error::NoSmartcard)),
            TransportError::NoCard
        );
        assert!(TransportError::from(PcscError::ReaderNotFound("x".into())).is_disconnect());
        assert!(TransportError::from(PcscError::Pcsc(pcsc::Error::ReaderUnavailable)).is_disconnect());
        assert!(!TransportError::from(PcscError::CardRemoved).is_disconnect());
    }
}
