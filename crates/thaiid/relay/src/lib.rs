//! Thai ID card relay
//!
//! [`Relay`] drives one reader through its connection lifecycle
//! (`Disconnected`, `Connecting`, `Connected`, `Ready`), reads cards with
//! bounded retries, and relays the results to a remote controller through a
//! [`thaiid_bridge::Bridge`]. Commands polled from the controller flow into
//! the relay over a channel it owns.
//!
//! ```no_run
//! use thaiid_relay::{PcscHost, Relay, RelayConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let relay = Relay::new(PcscHost::new(None)?, RelayConfig::new("counter-1", "secret"));
//! relay.connect_bridge("192.168.1.139:8080").await;
//! relay.initialize().await;
//!
//! let mut status = relay.subscribe();
//! while status.changed().await.is_ok() {
//!     println!("{}", status.borrow().message);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod host;
mod messages;
mod relay;
mod state;

pub use config::{RelayConfig, RelayTimings};
pub use error::RelayError;
pub use host::{Authorization, PcscHost, ReaderHost};
pub use relay::Relay;
pub use state::{ConnectionState, RelayStatus};
