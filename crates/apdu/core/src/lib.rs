//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types used to talk to an ISO/IEC 7816-4
//! smart card through a single attached reader.
//!
//! ## Overview
//!
//! - [`Command`] builds the raw command bytes (CLA, INS, P1, P2, Lc, data, Le)
//! - [`Response`] splits a raw response into payload and [`StatusWord`]
//! - [`CardTransport`] is the seam to the reader driver (power on, transmit, close)
//! - [`processor::GetResponseProcessor`] follows `61 xx` status words with
//!   GET RESPONSE until the card reports a final status
//!
//! Only the subset of the protocol needed by a host reading a card is covered;
//! there is no secure messaging and no extended-length support.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod command;
mod error;
pub mod processor;
pub mod response;
pub mod transport;

pub use command::Command;
pub use error::{Error, Result};
pub use processor::{CommandProcessor, GetResponseProcessor, IdentityProcessor};
pub use response::Response;
pub use response::status::StatusWord;
pub use transport::{CardTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, BytesMut, Command, Error, Response, Result,
        processor::{CommandProcessor, GetResponseProcessor, ProcessorError},
        response::status::{StatusWord, common as status},
        transport::{CardTransport, TransportError},
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let cmd = Command::new(0x00, 0xA4, 0x04, 0x00);
        assert_eq!(cmd.cla, 0x00);
        assert_eq!(cmd.ins, 0xA4);

        let resp = Response::success(Bytes::from_static(&[0x01, 0x02, 0x03]));
        assert!(resp.is_success());
        assert_eq!(resp.payload().as_ref(), &[0x01, 0x02, 0x03]);
        assert_eq!(resp.status(), StatusWord::new(0x90, 0x00));
    }
}
