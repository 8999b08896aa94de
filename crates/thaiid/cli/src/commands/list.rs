use thaiid_apdu_transport_pcsc::PcscDeviceManager;

use crate::config::Config;

/// List all available readers
pub(crate) fn list(config: &Config) -> eyre::Result<()> {
    let manager = PcscDeviceManager::new()?;
    let readers = manager.list_readers()?;

    if readers.is_empty() {
        println!("No readers found!");
        return Ok(());
    }

    println!("Available readers:");
    for (i, reader) in readers.iter().enumerate() {
        let status = if reader.has_card() { "card present" } else { "no card" };
        let selected = config.reader.as_deref() == Some(reader.name());
        println!(
            "{}. {} ({}){}",
            i + 1,
            reader.name(),
            status,
            if selected { " [configured]" } else { "" }
        );
    }

    Ok(())
}
