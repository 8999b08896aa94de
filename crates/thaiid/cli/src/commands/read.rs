use std::path::PathBuf;

use eyre::{OptionExt, WrapErr};
use thaiid_card::{CardReader, CardRecord};
use thaiid_relay::{PcscHost, ReaderHost};
use tracing::{info, warn};

use crate::config::Config;

fn read_blocking(reader: Option<String>, photo: Option<PathBuf>) -> eyre::Result<CardRecord> {
    let host = PcscHost::new(reader)?;
    let mut card = CardReader::new(host.open()?);

    let record = card
        .read_basic_info()?
        .ok_or_eyre("no Thai ID card could be read")?;

    if let Some(path) = photo {
        match card.read_photo()? {
            Some(bytes) => {
                std::fs::write(&path, &bytes)
                    .wrap_err_with(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), len = bytes.len(), "Photo written");
            }
            None => warn!("Photo could not be read"),
        }
    }

    card.close();
    Ok(record)
}

/// Read the card once and print the record
pub(crate) async fn read(config: &Config, photo: Option<PathBuf>) -> eyre::Result<()> {
    let reader = config.reader.clone();
    let record = tokio::task::spawn_blocking(move || read_blocking(reader, photo)).await??;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
