//! Access to the physical reader

use std::fmt;

use thaiid_apdu_core::{CardTransport, TransportError};
use thaiid_apdu_transport_pcsc::{ConnectStrategy, PcscConfig, PcscDeviceManager, PcscError};
use tracing::{debug, info, warn};

/// Outcome of asking the host for access to the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// Access granted, the reader can be opened
    Granted,
    /// Access refused
    Denied,
    /// Decision pending; the host reports it through
    /// [`Relay::on_authorization_granted`](crate::Relay::on_authorization_granted) or
    /// [`Relay::on_authorization_denied`](crate::Relay::on_authorization_denied)
    Pending,
}

/// The platform side of a reader: discovery, presence, permission, opening
///
/// Every method may block; the relay calls them from blocking tasks.
pub trait ReaderHost: Send + Sync + fmt::Debug + 'static {
    /// Scan for readers, returning how many were found
    fn enumerate(&self) -> Result<usize, TransportError>;

    /// Whether the reader is physically attached
    fn is_device_present(&self) -> bool;

    /// Ask for permission to use the reader
    fn request_authorization(&self) -> Authorization {
        Authorization::Granted
    }

    /// Open the reader and power the card on
    fn open(&self) -> Result<Box<dyn CardTransport>, TransportError>;
}

/// Reader host over PC/SC
///
/// PC/SC has no permission step, so authorization is always granted.
pub struct PcscHost {
    manager: PcscDeviceManager,
    reader: Option<String>,
    config: PcscConfig,
}

impl fmt::Debug for PcscHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscHost")
            .field("reader", &self.reader)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PcscHost {
    /// Use the named reader, or the first one found when `reader` is `None`
    pub fn new(reader: Option<String>) -> Result<Self, PcscError> {
        Ok(Self {
            manager: PcscDeviceManager::new()?,
            reader,
            config: PcscConfig::default(),
        })
    }

    /// Set the PC/SC connection options
    pub fn with_config(mut self, config: PcscConfig) -> Self {
        self.config = config;
        self
    }

    /// The device manager
    pub const fn manager(&self) -> &PcscDeviceManager {
        &self.manager
    }
}

impl ReaderHost for PcscHost {
    fn enumerate(&self) -> Result<usize, TransportError> {
        let readers = self.manager.list_readers()?;
        for reader in &readers {
            debug!(reader = reader.name(), card = reader.has_card(), "Found reader");
        }
        info!(count = readers.len(), "Enumerated readers");
        Ok(readers.len())
    }

    fn is_device_present(&self) -> bool {
        match &self.reader {
            Some(name) => self.manager.is_reader_present(name),
            None => self
                .manager
                .list_readers()
                .is_ok_and(|readers| !readers.is_empty()),
        }
    }

    fn open(&self) -> Result<Box<dyn CardTransport>, TransportError> {
        let strategy = ConnectStrategy::from_reader_name(self.reader.as_deref());
        let mut transport = self.manager.connect_strategy(strategy, self.config.clone())?;

        // The reader is usable without a card; reads power on again
        match transport.power_on() {
            Ok(()) => {}
            Err(TransportError::NoCard) => warn!("Reader opened without a card"),
            Err(e) => return Err(e),
        }

        info!(reader = %transport.reader_name(), "Reader opened");
        Ok(Box::new(transport))
    }
}
