//! The connection and retry state machine

use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use thaiid_apdu_core::CardTransport;
use thaiid_bridge::{Bridge, BridgeConfig, RemoteCommand};
use thaiid_card::{CardReader, CardRecord, encode_photo};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::host::{Authorization, ReaderHost};
use crate::messages::{self, remote};
use crate::state::{ConnectionState, RelayStatus};

type Reader = CardReader<Box<dyn CardTransport>>;

const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Result of the retried basic-info read
enum ReadOutcome {
    Record(CardRecord),
    NoCard,
    Disconnected,
}

#[derive(Debug)]
struct Inner {
    host: Arc<dyn ReaderHost>,
    config: RelayConfig,
    status: watch::Sender<RelayStatus>,
    reader: Arc<Mutex<Option<Reader>>>,
    record: RwLock<Option<CardRecord>>,
    photo: RwLock<Option<String>>,
    bridge: RwLock<Option<Arc<Bridge>>>,
    commands: mpsc::Sender<RemoteCommand>,
    loading: AtomicBool,
    token: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Clears the loading flags when a read ends, however it ends
struct LoadingGuard<'a>(&'a Inner);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.loading.store(false, Ordering::SeqCst);
        self.0.status.send_modify(|status| {
            status.is_loading = false;
            status.is_reading_photo = false;
        });
    }
}

/// Ties reader presence, card reads and the controller bridge together
///
/// State and message are published through [`Relay::subscribe`]. Protocol
/// and network failures never surface as errors: they end up in the status.
/// Cloning yields another handle to the same relay.
#[derive(Debug, Clone)]
pub struct Relay {
    inner: Arc<Inner>,
}

impl Relay {
    /// Create a relay and start its command loop
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(host: impl ReaderHost, config: RelayConfig) -> Self {
        let (commands, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let status = RelayStatus {
            auto_read: config.auto_read,
            ..RelayStatus::default()
        };

        let relay = Self {
            inner: Arc::new(Inner {
                host: Arc::new(host),
                config,
                status: watch::Sender::new(status),
                reader: Arc::new(Mutex::new(None)),
                record: RwLock::new(None),
                photo: RwLock::new(None),
                bridge: RwLock::new(None),
                commands,
                loading: AtomicBool::new(false),
                token: CancellationToken::new(),
            }),
        };

        tokio::spawn(Self::command_loop(
            Arc::downgrade(&relay.inner),
            relay.inner.token.clone(),
            commands_rx,
        ));
        relay
    }

    /// Runs until shutdown or until the last handle is dropped
    async fn command_loop(
        inner: Weak<Inner>,
        token: CancellationToken,
        mut commands: mpsc::Receiver<RemoteCommand>,
    ) {
        loop {
            let command = tokio::select! {
                biased;
                () = token.cancelled() => break,
                command = commands.recv() => command,
            };
            let Some(command) = command else { break };
            let Some(inner) = inner.upgrade() else { break };

            let relay = Self { inner };
            tokio::spawn(async move { relay.handle_command(command).await });
        }
        debug!("Command loop stopped");
    }

    /// Watch the published status
    pub fn subscribe(&self) -> watch::Receiver<RelayStatus> {
        self.inner.status.subscribe()
    }

    /// Current status
    pub fn status(&self) -> RelayStatus {
        self.inner.status.borrow().clone()
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.inner.status.borrow().state
    }

    /// Record of the last successful read
    pub fn card_record(&self) -> Option<CardRecord> {
        self.inner.record.read().clone()
    }

    /// Base64 photo of the last successful read
    pub fn photo_base64(&self) -> Option<String> {
        self.inner.photo.read().clone()
    }

    /// Sender feeding the command loop, shared by every bridge
    pub fn command_sender(&self) -> mpsc::Sender<RemoteCommand> {
        self.inner.commands.clone()
    }

    fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.inner.status.send_modify(|status| status.message = message);
    }

    /// Move to `state`, show `message` locally and push `remote`
    fn transition(
        &self,
        state: ConnectionState,
        message: impl Into<String>,
        remote: &'static str,
    ) {
        let message = message.into();
        let previous = self.inner.status.borrow().state;
        if previous != state {
            info!(from = %previous, to = %state, "Connection state changed");
        }
        self.inner.status.send_modify(|status| {
            status.state = state;
            status.message = message;
        });
        self.notify(remote);
    }

    fn current_bridge(&self) -> Option<Arc<Bridge>> {
        self.inner.bridge.read().clone()
    }

    /// Push a status line without waiting for it
    fn notify(&self, message: &'static str) {
        if let Some(bridge) = self.current_bridge() {
            tokio::spawn(async move { bridge.push_status(message).await });
        }
    }

    /// Sleep unless the relay shuts down first; `false` when cancelled
    async fn delay(&self, duration: Duration) -> bool {
        tokio::select! {
            biased;
            () = self.inner.token.cancelled() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }

    async fn blocking<R, F>(&self, f: F) -> Result<R, RelayError>
    where
        F: FnOnce(&dyn ReaderHost) -> R + Send + 'static,
        R: Send + 'static,
    {
        let host = Arc::clone(&self.inner.host);
        Ok(tokio::task::spawn_blocking(move || f(host.as_ref())).await?)
    }

    /// Run `f` on the open reader; `Ok(None)` when no reader is open
    async fn with_reader<R, F>(&self, f: F) -> Result<Option<R>, RelayError>
    where
        F: FnOnce(&mut Reader) -> R + Send + 'static,
        R: Send + 'static,
    {
        let reader = Arc::clone(&self.inner.reader);
        Ok(tokio::task::spawn_blocking(move || reader.lock().as_mut().map(f)).await?)
    }

    /// Put a freshly opened transport in the reader slot, closing the old one
    async fn install_reader(&self, transport: Box<dyn CardTransport>) -> Result<(), RelayError> {
        let reader = Arc::clone(&self.inner.reader);
        tokio::task::spawn_blocking(move || {
            if let Some(mut previous) = reader.lock().replace(CardReader::new(transport)) {
                debug!("Closing previous reader");
                previous.close();
            }
        })
        .await?;
        Ok(())
    }

    async fn close_reader(&self) {
        let reader = Arc::clone(&self.inner.reader);
        let closed = tokio::task::spawn_blocking(move || {
            if let Some(mut reader) = reader.lock().take() {
                reader.close();
            }
        })
        .await;
        if let Err(e) = closed {
            warn!(error = %e, "Failed to close reader");
        }
    }

    async fn device_present(&self) -> bool {
        self.blocking(|host| host.is_device_present())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Presence check failed");
                false
            })
    }

    async fn enumerate(&self) -> Result<usize, RelayError> {
        Ok(self.blocking(|host| host.enumerate()).await??)
    }

    /// Enumerate readers and ask for access to them
    pub async fn initialize(&self) {
        info!("Initializing relay");
        match self.enumerate().await {
            Ok(0) => {
                warn!("No reader attached");
                self.transition(
                    ConnectionState::Disconnected,
                    messages::DISCONNECTED,
                    remote::DISCONNECTED,
                );
            }
            Ok(_) => self.authorize().await,
            Err(e) => {
                error!(error = %e, "Reader enumeration failed");
                self.transition(
                    ConnectionState::Disconnected,
                    messages::failure(&e),
                    remote::ERROR,
                );
            }
        }
    }

    async fn authorize(&self) {
        match self.blocking(|host| host.request_authorization()).await {
            Ok(Authorization::Granted) => self.on_authorization_granted().await,
            Ok(Authorization::Denied) => self.on_authorization_denied(),
            Ok(Authorization::Pending) => {
                info!("Waiting for reader authorization");
                self.set_message(messages::WAITING_PERMISSION);
            }
            Err(e) => {
                error!(error = %e, "Authorization request failed");
                self.transition(
                    ConnectionState::Disconnected,
                    messages::failure(&e),
                    remote::ERROR,
                );
            }
        }
    }

    /// Access to the reader was granted: open it
    pub async fn on_authorization_granted(&self) {
        info!("Reader authorization granted, opening reader");
        self.transition(ConnectionState::Connected, messages::OPENING, remote::OPENING);

        let opened = self
            .blocking(|host| host.open())
            .await
            .and_then(|result| result.map_err(RelayError::from));

        match opened {
            Ok(transport) => {
                if let Err(e) = self.install_reader(transport).await {
                    error!(error = %e, "Failed to install reader");
                    self.transition(
                        ConnectionState::Disconnected,
                        messages::OPEN_FAILED,
                        remote::OPEN_FAILED,
                    );
                    return;
                }
                self.transition(ConnectionState::Ready, messages::READY, remote::CONNECTED);

                if self.status().auto_read {
                    let relay = self.clone();
                    let delay = self.inner.config.timings.auto_read_delay;
                    tokio::spawn(async move {
                        if relay.delay(delay).await {
                            relay.read_card().await;
                        }
                    });
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to open reader");
                self.transition(
                    ConnectionState::Disconnected,
                    messages::OPEN_FAILED,
                    remote::OPEN_FAILED,
                );
            }
        }
    }

    /// Access to the reader was refused
    pub fn on_authorization_denied(&self) {
        warn!("Reader authorization denied");
        self.transition(
            ConnectionState::Disconnected,
            messages::PERMISSION_DENIED,
            remote::PERMISSION_DENIED,
        );
    }

    async fn on_reader_disconnected(&self) {
        error!("Reader disconnected");
        self.close_reader().await;
        self.transition(
            ConnectionState::Disconnected,
            messages::DISCONNECTED,
            remote::DISCONNECTED,
        );
    }

    /// Close the reader, re-enumerate and ask for access again
    pub async fn reconnect(&self) {
        info!("Reconnecting reader");
        self.close_reader().await;
        if !self.delay(self.inner.config.timings.reconnect_delay).await {
            return;
        }

        self.transition(ConnectionState::Connecting, messages::RECONNECTING, remote::RECONNECTING);

        match self.enumerate().await {
            Ok(count) => debug!(count, "Readers after reconnect"),
            Err(e) => {
                error!(error = %e, "Reader enumeration failed");
                self.transition(
                    ConnectionState::Disconnected,
                    messages::failure(&e),
                    remote::ERROR,
                );
                return;
            }
        }

        if !self.delay(self.inner.config.timings.reconnect_delay).await {
            return;
        }
        self.authorize().await;
    }

    /// Read the card, retrying, then fetch the photo and push both
    ///
    /// Returns at once when a read is already running.
    pub async fn read_card(&self) {
        if self
            .inner
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Read already in progress");
            return;
        }
        let _guard = LoadingGuard(&self.inner);

        if !self.device_present().await {
            warn!("Reader not physically attached");
            self.on_reader_disconnected().await;
            return;
        }

        if self.state() != ConnectionState::Ready {
            warn!(state = %self.state(), "Reader not ready");
            self.set_message(messages::NOT_READY);
            return;
        }

        self.inner.status.send_modify(|status| {
            status.is_loading = true;
            status.message = messages::READING.to_string();
        });
        self.notify(remote::READING);

        match self.read_with_retry().await {
            Ok(ReadOutcome::Record(record)) => self.process_record(record).await,
            Ok(ReadOutcome::Disconnected) => self.on_reader_disconnected().await,
            Ok(ReadOutcome::NoCard) => {
                if self.device_present().await {
                    self.set_message(messages::NO_CARD);
                    self.notify(remote::NO_CARD);
                } else {
                    self.on_reader_disconnected().await;
                }
            }
            Err(e) => {
                error!(error = %e, "Card read failed");
                self.set_message(messages::failure(&e));
                self.notify(remote::ERROR);
            }
        }
    }

    async fn read_with_retry(&self) -> Result<ReadOutcome, RelayError> {
        let max_attempts = self.inner.config.timings.max_attempts;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                self.set_message(messages::retrying(attempt - 1, max_attempts));
                if !self.delay(self.inner.config.timings.retry_delay).await {
                    return Ok(ReadOutcome::NoCard);
                }
            }

            debug!(attempt, max_attempts, "Reading card");
            match self.with_reader(|reader| reader.read_basic_info()).await? {
                None => {
                    warn!("Reader closed during read");
                    return Ok(ReadOutcome::Disconnected);
                }
                Some(Ok(Some(record))) if record.is_valid() => {
                    return Ok(ReadOutcome::Record(record));
                }
                Some(Ok(_)) => debug!(attempt, "No valid record"),
                Some(Err(e)) if e.is_disconnect() => return Ok(ReadOutcome::Disconnected),
                Some(Err(e)) => warn!(attempt, error = %e, "Read attempt failed"),
            }
        }

        warn!(max_attempts, "No card after retries");
        Ok(ReadOutcome::NoCard)
    }

    async fn process_record(&self, record: CardRecord) {
        info!(fields = record.present_fields(), "Card record read");
        *self.inner.record.write() = Some(record.clone());

        self.inner.status.send_modify(|status| {
            status.is_reading_photo = true;
            status.message = messages::READING_PHOTO.to_string();
        });
        self.notify(remote::READING_PHOTO);

        let mut reader_lost = false;
        let photo = match self.with_reader(|reader| reader.read_photo()).await {
            Ok(Some(Ok(Some(photo)))) => Some(encode_photo(&photo)),
            Ok(Some(Ok(None))) => {
                warn!("Photo could not be read");
                None
            }
            Ok(Some(Err(e))) => {
                warn!(error = %e, "Photo read failed");
                reader_lost = e.is_disconnect();
                None
            }
            Ok(None) => {
                reader_lost = true;
                None
            }
            Err(e) => {
                warn!(error = %e, "Photo read failed");
                None
            }
        };
        *self.inner.photo.write() = photo.clone();
        self.inner.status.send_modify(|status| status.is_reading_photo = false);

        let pushed = match self.current_bridge() {
            Some(bridge) => bridge.push_card_data(&record, photo.as_deref()).await,
            None => {
                warn!("No controller connected, card data not pushed");
                false
            }
        };

        if pushed {
            self.set_message(messages::READ_OK);
            self.notify(remote::READ_OK);
        } else {
            let server_url = self
                .current_bridge()
                .map(|bridge| bridge.config().server_url.to_string())
                .unwrap_or_default();
            self.set_message(messages::push_failed(&server_url));
            self.notify(remote::PUSH_FAILED);
        }

        if reader_lost {
            self.on_reader_disconnected().await;
        }
    }

    /// Discard the record and photo, reading again when auto-read is on
    pub async fn clear_data(&self) {
        self.inner.record.write().take();
        self.inner.photo.write().take();
        info!("Card data cleared");
        self.set_message(messages::CLEARED);
        self.notify(remote::CLEARED);

        if self.status().auto_read && self.delay(self.inner.config.timings.clear_read_delay).await {
            self.read_card().await;
        }
    }

    /// Acknowledge a save done by the controller
    pub fn save_data(&self) {
        info!("Save acknowledged");
        self.set_message(messages::SAVED);
        self.notify(remote::SAVED);
    }

    /// Run a controller command
    pub async fn handle_command(&self, command: RemoteCommand) {
        debug!(%command, "Handling command");
        match command {
            RemoteCommand::ReadCard => self.read_card().await,
            RemoteCommand::ClearData => self.clear_data().await,
            RemoteCommand::SaveData => self.save_data(),
            RemoteCommand::Unknown(name) => warn!(command = %name, "Unknown command"),
        }
    }

    /// Replace the bridge with one talking to `server_url`
    ///
    /// Polling starts only when the controller answers. Returns whether it
    /// did.
    pub async fn connect_bridge(&self, server_url: &str) -> bool {
        let previous = self.inner.bridge.write().take();
        if let Some(previous) = previous {
            previous.dispose().await;
        }

        let config = &self.inner.config;
        let bridge = BridgeConfig::new(server_url, config.device_id.clone(), config.api_key.clone())
            .map(|bridge| {
                bridge
                    .with_poll_interval(config.poll_interval)
                    .with_request_timeout(config.request_timeout)
            })
            .and_then(|bridge| Bridge::new(bridge, self.command_sender()));

        let bridge = match bridge {
            Ok(bridge) => Arc::new(bridge),
            Err(e) => {
                error!(url = server_url, error = %e, "Invalid controller settings");
                self.set_message(messages::server_unreachable(server_url));
                return false;
            }
        };
        *self.inner.bridge.write() = Some(Arc::clone(&bridge));

        if bridge.test_connection().await {
            bridge.start_polling();
            true
        } else {
            self.set_message(messages::server_unreachable(bridge.config().server_url.as_str()));
            false
        }
    }

    /// Set the auto-read flag
    pub fn set_auto_read(&self, auto_read: bool) {
        self.inner.status.send_modify(|status| status.auto_read = auto_read);
    }

    /// Flip the auto-read flag, returning the new value
    pub fn toggle_auto_read(&self) -> bool {
        let mut auto_read = false;
        self.inner.status.send_modify(|status| {
            status.auto_read = !status.auto_read;
            auto_read = status.auto_read;
        });
        auto_read
    }

    /// Stop the command loop and pending delays, dispose the bridge and
    /// close the reader
    pub async fn shutdown(&self) {
        info!("Shutting down relay");
        self.inner.token.cancel();

        let bridge = self.inner.bridge.write().take();
        if let Some(bridge) = bridge {
            bridge.dispose().await;
        }
        self.close_reader().await;
    }
}
