//! Transport traits for APDU communication with cards
//!
//! A transport moves raw bytes between the host and one card in one reader.
//! It has no knowledge of command structure or protocol details such as
//! GET RESPONSE chaining; that lives in [`crate::processor`].

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::fmt;

use bytes::Bytes;
pub use error::TransportError;
use tracing::{debug, trace};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;

/// Trait for basic card transports
pub trait CardTransport: Send + fmt::Debug {
    /// Send raw APDU bytes to card and return response bytes
    ///
    /// Logs both directions in hex at trace level and delegates to
    /// [`Self::do_transmit_raw`].
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        trace!(command = %hex::encode_upper(command), "Transmitting raw command");
        let result = self.do_transmit_raw(command);
        match &result {
            Ok(response) => {
                trace!(response = %hex::encode_upper(response), "Received raw response");
            }
            Err(e) => {
                debug!(error = %e, "Transport error during transmission");
            }
        }
        result
    }

    /// Internal implementation of transmit_raw
    /// This is the method that concrete implementations should override
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Power the card on, or reset it if it is already powered
    fn power_on(&mut self) -> Result<(), TransportError>;

    /// Check if the transport is still attached to a present reader
    fn is_connected(&self) -> bool;

    /// Release the card. Further transmits fail until the next power on.
    fn close(&mut self);
}

impl<T: CardTransport + ?Sized> CardTransport for Box<T> {
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        (**self).transmit_raw(command)
    }

    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        (**self).do_transmit_raw(command)
    }

    fn power_on(&mut self) -> Result<(), TransportError> {
        (**self).power_on()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
