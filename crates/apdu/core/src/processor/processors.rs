//! Standard command processors

use std::fmt;

use bytes::BytesMut;
use tracing::{debug, trace};

use super::{CommandProcessor, ProcessorError};
use crate::transport::CardTransport;
use crate::{Command, Response};

/// Instruction byte of GET RESPONSE
const INS_GET_RESPONSE: u8 = 0xC0;

/// Identity processor
///
/// This processor passes commands through unchanged and returns the first
/// response as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProcessor;

impl CommandProcessor for IdentityProcessor {
    fn process_command(
        &self,
        command: &Command,
        transport: &mut dyn CardTransport,
    ) -> Result<Response, ProcessorError> {
        let response_bytes = transport.transmit_raw(&command.to_bytes())?;
        Ok(Response::from_bytes(&response_bytes)?)
    }
}

/// GET RESPONSE command processor
///
/// While the card answers `61 xx`, sends `CLA C0 00 00 xx` and appends
/// whatever payload comes back. The status of the last exchange becomes the
/// status of the combined response.
#[derive(Clone, Copy)]
pub struct GetResponseProcessor {
    /// Maximum number of chained responses to handle
    pub max_chain: usize,
    /// Class byte for GET RESPONSE command
    pub cla: u8,
}

impl GetResponseProcessor {
    /// Create a processor with a custom chain limit
    pub const fn with_max_chain(max_chain: usize) -> Self {
        Self {
            max_chain,
            cla: 0x00,
        }
    }
}

impl Default for GetResponseProcessor {
    fn default() -> Self {
        Self::with_max_chain(10)
    }
}

impl fmt::Debug for GetResponseProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetResponseProcessor")
            .field("max_chain", &self.max_chain)
            .field("cla", &format!("{:#04x}", self.cla))
            .finish()
    }
}

impl CommandProcessor for GetResponseProcessor {
    fn process_command(
        &self,
        command: &Command,
        transport: &mut dyn CardTransport,
    ) -> Result<Response, ProcessorError> {
        let response_bytes = transport.transmit_raw(&command.to_bytes())?;
        let mut response = Response::from_bytes(&response_bytes)?;

        let mut chain_count = 0;
        let mut buffer = BytesMut::new();

        while let Some(le) = response.status().remaining_bytes() {
            if chain_count >= self.max_chain {
                debug!(chain_count, "Card still reports pending data, giving up");
                return Err(ProcessorError::ChainLimitExceeded(chain_count));
            }

            buffer.extend_from_slice(response.payload());

            trace!(le, "Sending GET RESPONSE");
            let get_response = Command::new_with_le(self.cla, INS_GET_RESPONSE, 0x00, 0x00, le);
            let response_bytes = transport.transmit_raw(&get_response.to_bytes())?;
            response = Response::from_bytes(&response_bytes)?;

            chain_count += 1;
        }

        if chain_count == 0 {
            return Ok(response);
        }

        buffer.extend_from_slice(response.payload());
        Ok(Response::new(buffer.freeze(), response.status()))
    }
}
