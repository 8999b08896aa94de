//! Bridge configuration

use std::time::Duration;

use url::Url;

use crate::error::Result;

/// Poll period of the command loop
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Connect, read and total timeout of every request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and as whom the bridge talks to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Base URL of the controller, always ending in `/`
    pub server_url: Url,
    /// Device id sent with every request
    pub device_id: String,
    /// API key sent with every request
    pub api_key: String,
    /// Delay between two polls
    pub poll_interval: Duration,
    /// Timeout applied to connect, read and the whole request
    pub request_timeout: Duration,
}

/// Prefix `http://` unless the URL already names http or https
pub fn normalize_server_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

impl BridgeConfig {
    /// Create a configuration, normalizing `server_url`
    pub fn new(
        server_url: &str,
        device_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let mut server_url = Url::parse(&normalize_server_url(server_url))?;
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }

        Ok(Self {
            server_url,
            device_id: device_id.into(),
            api_key: api_key.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Set the poll interval
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the request timeout
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Absolute URL of an API path such as `api/card/update`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.server_url.join(path.trim_start_matches('/'))?)
    }
}
