//! Remote command bridge
//!
//! Polls a controller over HTTP for commands addressed to this device,
//! delivers them on an [`mpsc`](tokio::sync::mpsc) channel, acknowledges
//! them, and pushes card data and status lines back.
//!
//! ```no_run
//! use thaiid_bridge::{Bridge, BridgeConfig};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> thaiid_bridge::Result<()> {
//! let (tx, mut rx) = mpsc::channel(16);
//! let config = BridgeConfig::new("192.168.1.139:8080", "counter-1", "secret")?;
//! let bridge = Bridge::new(config, tx)?;
//!
//! if bridge.test_connection().await {
//!     bridge.start_polling();
//! }
//! while let Some(command) = rx.recv().await {
//!     println!("{command}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
pub mod types;

pub use client::Bridge;
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use types::{CardUpdate, CommandPoll, RemoteCommand};
