//! PC/SC transport implementation

use std::ffi::CString;
use std::fmt;

use bytes::Bytes;
use pcsc::{Card, Context, Disposition, ShareMode as PcscShareMode};
use thaiid_apdu_core::{CardTransport, TransportError};
use tracing::{debug, info};

use crate::{config::PcscConfig, error::PcscError};

/// Transport implementation using PC/SC
pub struct PcscTransport {
    /// PC/SC context
    context: Context,
    /// Card connection, if established
    card: Option<Card>,
    /// Reader name
    reader_name: CString,
    /// Configuration
    config: PcscConfig,
}

impl fmt::Debug for PcscTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscTransport")
            .field("reader_name", &self.reader_name)
            .field("has_card", &self.card.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl PcscTransport {
    /// Create a transport for the named reader without touching the card
    pub(crate) fn new(
        context: Context,
        reader_name: &str,
        config: PcscConfig,
    ) -> Result<Self, PcscError> {
        let reader_name = CString::new(reader_name)
            .map_err(|_| PcscError::ReaderNotFound(reader_name.to_string()))?;

        Ok(Self {
            context,
            card: None,
            reader_name,
            config,
        })
    }

    /// Get the reader name
    pub fn reader_name(&self) -> String {
        self.reader_name.to_string_lossy().into_owned()
    }

    /// Check if the transport holds a card connection
    pub const fn has_card(&self) -> bool {
        self.card.is_some()
    }

    /// Get the ATR of the current card
    pub fn atr(&self) -> Result<Vec<u8>, PcscError> {
        self.card.as_ref().map_or_else(
            || Err(PcscError::NoCard(self.reader_name())),
            |card| Ok(card.get_attribute_owned(pcsc::Attribute::AtrString)?),
        )
    }

    /// Connect to the card, or reset it when already connected
    fn connect_card(&mut self) -> Result<(), PcscError> {
        let share_mode: PcscShareMode = self.config.share_mode.into();

        if let Some(card) = self.card.as_mut() {
            match card.reconnect(share_mode, self.config.protocols, pcsc::Disposition::ResetCard) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!(error = %e, "Reconnect failed, opening a fresh connection");
                    self.card = None;
                }
            }
        }

        match self
            .context
            .connect(&self.reader_name, share_mode, self.config.protocols)
        {
            Ok(card) => {
                self.card = Some(card);
                if let Ok(atr) = self.atr() {
                    info!(reader = %self.reader_name(), atr = %hex::encode_upper(atr), "Card powered on");
                }
                Ok(())
            }
            Err(pcsc::Error::NoSmartcard | pcsc::Error::RemovedCard) => {
                Err(PcscError::NoCard(self.reader_name()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Transmit a command to the card
    fn transmit_command(&mut self, command: &[u8], retry_on_reset: bool) -> Result<Bytes, PcscError> {
        let card = self.card.as_mut().ok_or(PcscError::CardRemoved)?;

        let mut response_buffer = [0u8; pcsc::MAX_BUFFER_SIZE];

        match card.transmit(command, &mut response_buffer) {
            Ok(response) => Ok(Bytes::copy_from_slice(response)),
            Err(e) => {
                // If card was reset or removed, clear our reference
                if matches!(e, pcsc::Error::ResetCard | pcsc::Error::RemovedCard) {
                    self.card = None;

                    if retry_on_reset && self.config.auto_reconnect && e == pcsc::Error::ResetCard {
                        self.connect_card()?;
                        return self.transmit_command(command, false);
                    }
                }

                Err(e.into())
            }
        }
    }
}

impl CardTransport for PcscTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.transmit_command(command, true).map_err(TransportError::from)
    }

    fn power_on(&mut self) -> Result<(), TransportError> {
        self.connect_card().map_err(Into::into)
    }

    fn is_connected(&self) -> bool {
        let Ok(readers) = self.context.list_readers_owned() else {
            return false;
        };
        readers.iter().any(|name| name.as_c_str() == self.reader_name.as_c_str())
    }

    fn close(&mut self) {
        if let Some(card) = self.card.take() {
            if let Err((_, e)) = card.disconnect(Disposition::LeaveCard) {
                debug!(error = %e, "Card disconnect failed");
            }
        }
    }
}

impl Drop for PcscTransport {
    fn drop(&mut self) {
        self.close();
    }
}
