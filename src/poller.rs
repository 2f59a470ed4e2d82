//! Periodic retrieval of the sensor feed.

use std::time::Duration;

use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use thiserror::Error;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{info, warn};

use crate::{
    luftdaten::DecodeError,
    state::{SharedSensorState, lock},
};

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_PATH: &str = "/data.json";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum PollError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status: {0}")]
    UnexpectedStatus(StatusCode),

    #[error("unexpected content type: {0:?}")]
    UnexpectedContentType(String),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoint {
    pub host: String,

    pub port: u16,

    pub path: String,

    pub interval: Duration,
}

impl DeviceEndpoint {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }
}

#[derive(Debug, Clone)]
pub struct FeedPoller {
    client: Client,
    endpoint: DeviceEndpoint,
    state: SharedSensorState,
}

impl FeedPoller {
    pub fn new(endpoint: DeviceEndpoint, state: SharedSensorState) -> Result<Self, reqwest::Error> {
        // A request never outlives its tick, so polls cannot overlap.
        let client = Client::builder().timeout(endpoint.interval).build()?;

        Ok(Self {
            client,
            endpoint,
            state,
        })
    }

    /// Runs a single tick: charges the staleness budget, fetches the feed and
    /// folds it into the shared state. Errors only describe why this tick was
    /// dropped; the state is never left half-updated.
    pub async fn poll_once(&self) -> Result<(), PollError> {
        lock(&self.state).begin_tick();

        let url = self.endpoint.url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| PollError::Transport { url, source })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if status != StatusCode::OK {
            let _ = response.bytes().await;
            return Err(PollError::UnexpectedStatus(status));
        }

        if !content_type.starts_with(JSON_CONTENT_TYPE) {
            let _ = response.bytes().await;
            return Err(PollError::UnexpectedContentType(content_type));
        }

        // The feed is UTF-8 whatever charset the header claims.
        let body = response.bytes().await.map_err(PollError::Body)?;
        let body = String::from_utf8_lossy(&body);

        lock(&self.state).ingest_body(&body)?;

        Ok(())
    }

    /// Polls immediately, then once per interval until the handle is stopped.
    pub fn start(self) -> PollerHandle {
        info!(
            "polling {} every {}s",
            self.endpoint.url(),
            self.endpoint.interval.as_secs()
        );

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.endpoint.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                if let Err(err) = self.poll_once().await {
                    warn!("{}: {err:#}", self.endpoint.host);
                }
            }
        });

        PollerHandle { task }
    }
}

#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub async fn stop(self) {
        self.task.abort();
        let _ = self.task.await;
        info!("poller stopped");
    }
}
