use eyre::OptionExt;
use thaiid_bridge::Bridge;
use tokio::sync::mpsc;

use crate::config::Config;

/// Print the last record the controller holds
pub(crate) async fn latest(config: &Config) -> eyre::Result<()> {
    let (commands, _) = mpsc::channel(1);
    let bridge = Bridge::new(config.bridge_config()?, commands)?;

    let latest = bridge
        .latest_card_data()
        .await
        .ok_or_eyre("controller returned no card data")?;

    println!("{}", serde_json::to_string_pretty(&latest)?);
    Ok(())
}
