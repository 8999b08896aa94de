//! Published relay state

use std::fmt;

use crate::messages;

/// Lifecycle of the reader connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No usable reader
    #[default]
    Disconnected,
    /// Reconnect in progress
    Connecting,
    /// Authorized, reader being opened
    Connected,
    /// Reader open, cards can be read
    Ready,
}

impl ConnectionState {
    /// Lower-case name, used in logs
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot published on every change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayStatus {
    /// Connection state
    pub state: ConnectionState,
    /// Human readable status, in Thai
    pub message: String,
    /// A card read is in progress
    pub is_loading: bool,
    /// The photo of the current read is being fetched
    pub is_reading_photo: bool,
    /// Read automatically once the reader is ready or data was cleared
    pub auto_read: bool,
}

impl Default for RelayStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            message: messages::STARTING.to_string(),
            is_loading: false,
            is_reading_photo: false,
            auto_read: false,
        }
    }
}
