// src/infrastructure/anki_connect.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::application::protocol::ConnectRequest;
use crate::application::AnkiConnect;
use crate::domain::{DecodeError, FetchError};
use crate::infrastructure::config::AnkiConnectConfig;

/// AnkiConnect over HTTP.
pub struct AnkiConnectClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AnkiConnectClient {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = endpoint.into();
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("Failed to build HTTP client")?;

        info!(%endpoint, ?timeout, "Using AnkiConnect endpoint");
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &AnkiConnectConfig) -> Result<Self> {
        Self::new(config.endpoint(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnkiConnect for AnkiConnectClient {
    async fn invoke(&self, request: &ConnectRequest) -> Result<Value, FetchError> {
        debug!(action = request.action, params = %request.params, "Sending AnkiConnect request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!(
                "{} answered {} with HTTP {status}",
                self.endpoint, request.action
            )));
        }

        response.json::<Value>().await.map_err(|e| FetchError::Malformed {
            action: request.action,
            source: DecodeError::new(request.action, format!("body is not JSON: {e}")),
        })
    }
}
