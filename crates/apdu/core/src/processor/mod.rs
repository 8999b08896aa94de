//! Command processors for APDU commands
//!
//! A processor owns the exchange of a single logical command: it sends the
//! command bytes through a [`CardTransport`] and may issue follow-up
//! commands before handing back one complete [`Response`].

pub mod processors;

use std::fmt;

use crate::response::error::ResponseError;
use crate::transport::{CardTransport, TransportError};
use crate::{Command, Response};

pub use processors::{GetResponseProcessor, IdentityProcessor};

/// Error type for command processors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessorError {
    /// Underlying transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid response
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The card kept answering `61 xx` past the configured limit
    #[error("Chain limit exceeded after {0} GET RESPONSE command(s)")]
    ChainLimitExceeded(usize),
}

/// Trait for command processors
pub trait CommandProcessor: Send + Sync + fmt::Debug {
    /// Send `command` through `transport` and return the final response
    fn process_command(
        &self,
        command: &Command,
        transport: &mut dyn CardTransport,
    ) -> Result<Response, ProcessorError>;
}
