use std::time::Duration;

use thaiid_relay::{ConnectionState, PcscHost, Relay};
use tracing::{info, warn};

use crate::config::Config;

/// How often a disconnected reader is retried
const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Run the relay until Ctrl-C
pub(crate) async fn run(config: &Config) -> eyre::Result<()> {
    if config.api_key.is_empty() {
        warn!("No API key configured");
    }

    let host = PcscHost::new(config.reader.clone())?;
    let relay = Relay::new(host, config.relay_config());

    if !relay.connect_bridge(&config.server_url).await {
        warn!(url = %config.server_url, "Controller unreachable, commands will not be polled");
    }
    relay.initialize().await;

    let mut status = relay.subscribe();
    let mut reconnect = tokio::time::interval(RECONNECT_INTERVAL);
    reconnect.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                info!(
                    state = %current.state,
                    loading = current.is_loading,
                    auto_read = current.auto_read,
                    "{}",
                    current.message.replace('\n', " ")
                );
            }
            _ = reconnect.tick() => {
                if relay.state() == ConnectionState::Disconnected {
                    relay.reconnect().await;
                }
            }
        }
    }

    info!("Stopping");
    relay.shutdown().await;
    Ok(())
}
