//! The polling bridge

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use thaiid_card::CardRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::types::{Acknowledge, CardUpdate, CommandPoll, RemoteCommand};

const API_KEY_HEADER: &str = "x-api-key";
const DEVICE_ID_HEADER: &str = "x-device-id";

const COMMAND_LATEST: &str = "api/command/latest";
const COMMAND_ACKNOWLEDGE: &str = "api/command/acknowledge";
const CARD_UPDATE: &str = "api/card/update";
const CARD_LATEST: &str = "api/card/latest";

fn build_client(config: &BridgeConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, HeaderValue::from_str(&config.api_key)?);
    headers.insert(DEVICE_ID_HEADER, HeaderValue::from_str(&config.device_id)?);

    Ok(Client::builder()
        .default_headers(headers)
        .connect_timeout(config.request_timeout)
        .read_timeout(config.request_timeout)
        .timeout(config.request_timeout)
        .build()?)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BridgeError::Status(status))
    }
}

#[derive(Debug)]
struct Shared {
    config: BridgeConfig,
    client: RwLock<Option<Client>>,
    commands: mpsc::Sender<RemoteCommand>,
}

impl Shared {
    fn client(&self) -> Result<Client> {
        self.client.read().clone().ok_or(BridgeError::Disposed)
    }

    async fn fetch_command(&self) -> Result<Option<RemoteCommand>> {
        let response = self
            .client()?
            .get(self.config.endpoint(COMMAND_LATEST)?)
            .query(&[("deviceId", self.config.device_id.as_str())])
            .send()
            .await?;
        let body = check_status(response)?.text().await?;

        if body.trim().is_empty() {
            return Ok(None);
        }
        let poll: CommandPoll = serde_json::from_str(&body)?;
        Ok(poll.pending())
    }

    async fn acknowledge(&self, command: &RemoteCommand) -> Result<()> {
        let body = Acknowledge {
            command: command.to_string(),
            device_id: self.config.device_id.clone(),
        };
        let response = self
            .client()?
            .post(self.config.endpoint(COMMAND_ACKNOWLEDGE)?)
            .json(&body)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn poll_once(&self) -> Result<Option<RemoteCommand>> {
        let Some(command) = self.fetch_command().await? else {
            return Ok(None);
        };

        info!(%command, "Received command");
        if self.commands.send(command.clone()).await.is_err() {
            warn!(%command, "Command receiver dropped");
        }

        match self.acknowledge(&command).await {
            Ok(()) => debug!(%command, "Command acknowledged"),
            Err(e) => warn!(%command, error = %e, "Failed to acknowledge command"),
        }

        Ok(Some(command))
    }

    async fn post_update(&self, update: &CardUpdate) -> Result<()> {
        let response = self
            .client()?
            .post(self.config.endpoint(CARD_UPDATE)?)
            .json(update)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn poll_loop(self: Arc<Self>, token: CancellationToken) {
        debug!(interval = ?self.config.poll_interval, "Polling started");
        let mut failing = false;

        while !token.is_cancelled() {
            match self.poll_once().await {
                Ok(_) if failing => {
                    info!("Polling recovered");
                    failing = false;
                }
                Ok(_) => {}
                Err(e) if failing => debug!(error = %e, "Poll failed"),
                Err(e) => {
                    warn!(error = %e, "Poll failed");
                    failing = true;
                }
            }

            tokio::select! {
                biased;
                () = token.cancelled() => break,
                () = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        debug!("Polling stopped");
    }
}

#[derive(Debug)]
struct PollingTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Client of the remote controller
///
/// Commands found while polling are delivered on the channel given to
/// [`Bridge::new`], then acknowledged. Pushes report success as `bool` and
/// never retry.
#[derive(Debug)]
pub struct Bridge {
    shared: Arc<Shared>,
    polling: Mutex<Option<PollingTask>>,
}

impl Bridge {
    /// Create a bridge delivering commands on `commands`
    pub fn new(config: BridgeConfig, commands: mpsc::Sender<RemoteCommand>) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                client: RwLock::new(Some(client)),
                commands,
            }),
            polling: Mutex::new(None),
        })
    }

    /// The configuration this bridge was built with
    pub fn config(&self) -> &BridgeConfig {
        &self.shared.config
    }

    /// Poll the controller once, delivering and acknowledging any command
    pub async fn poll_once(&self) -> Result<Option<RemoteCommand>> {
        self.shared.poll_once().await
    }

    /// Start the polling task; a no-op when already polling
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_polling(&self) {
        let mut polling = self.polling.lock();
        if polling.as_ref().is_some_and(|task| !task.handle.is_finished()) {
            debug!("Polling already running");
            return;
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(&self.shared).poll_loop(token.clone()));
        *polling = Some(PollingTask { token, handle });
    }

    /// Whether the polling task is running
    pub fn is_polling(&self) -> bool {
        self.polling
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Stop polling and wait for the task to end
    pub async fn stop_polling(&self) {
        let task = self.polling.lock().take();
        if let Some(PollingTask { token, handle }) = task {
            token.cancel();
            if let Err(e) = handle.await {
                warn!(error = %e, "Polling task ended abnormally");
            }
        }
    }

    /// Push a freshly read record with its base64 photo
    pub async fn push_card_data(&self, record: &CardRecord, photo: Option<&str>) -> bool {
        let update = CardUpdate::CardData {
            device_id: self.shared.config.device_id.clone(),
            timestamp: now_millis(),
            data: record.clone(),
            photo: photo.map(str::to_string),
        };

        match self.shared.post_update(&update).await {
            Ok(()) => {
                info!(photo = photo.is_some(), "Card data pushed");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to push card data");
                false
            }
        }
    }

    /// Push a status line, logging failures
    pub async fn push_status(&self, message: &str) {
        let update = CardUpdate::Status {
            device_id: self.shared.config.device_id.clone(),
            timestamp: now_millis(),
            message: message.to_string(),
        };

        if let Err(e) = self.shared.post_update(&update).await {
            debug!(error = %e, status = message, "Failed to push status");
        }
    }

    /// Whether the controller answers the command endpoint
    pub async fn test_connection(&self) -> bool {
        let result: Result<()> = async {
            let response = self
                .shared
                .client()?
                .get(self.shared.config.endpoint(COMMAND_LATEST)?)
                .query(&[("deviceId", self.shared.config.device_id.as_str())])
                .send()
                .await?;
            check_status(response).map(drop)
        }
        .await;

        match result {
            Ok(()) => {
                info!(url = %self.shared.config.server_url, "Controller reachable");
                true
            }
            Err(e) => {
                warn!(url = %self.shared.config.server_url, error = %e, "Controller unreachable");
                false
            }
        }
    }

    /// Last record the controller holds, as raw JSON
    pub async fn latest_card_data(&self) -> Option<Value> {
        let result: Result<Value> = async {
            let response = self
                .shared
                .client()?
                .get(self.shared.config.endpoint(CARD_LATEST)?)
                .send()
                .await?;
            Ok(check_status(response)?.json().await?)
        }
        .await;

        match result {
            Ok(value) if value.is_object() => Some(value),
            Ok(_) => {
                debug!("Latest card data is not an object");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch latest card data");
                None
            }
        }
    }

    /// Stop polling and release the HTTP client
    ///
    /// Every later request fails with [`BridgeError::Disposed`].
    pub async fn dispose(&self) {
        self.stop_polling().await;
        self.shared.client.write().take();
        debug!("Bridge disposed");
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Some(task) = self.polling.get_mut().take() {
            task.token.cancel();
        }
    }
}
