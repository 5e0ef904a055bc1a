use crate::domain::errors::{FetchError, FetchErrorKind};
use crate::domain::ports::{ConfigSource, FetchedConfig};
use crate::domain::RoundConfig;
use crate::interface_adapters::protocol::{SessionResponse, StartRoundRequest};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

pub const USER_AGENT: &str = "arena-rounds-client";

// Thin reqwest client for the round start endpoint. One request per call, no retries.
#[derive(Clone)]
pub struct ConfigClient {
    http: reqwest::Client,
}

impl ConfigClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ConfigSource for ConfigClient {
    async fn fetch(
        &self,
        endpoint: &str,
        player_id: &str,
        timeout: Duration,
    ) -> Result<FetchedConfig, FetchError> {
        debug!(endpoint, player_id, "requesting round config");
        let result = request(&self.http, endpoint, player_id, timeout).await;
        if let Err(e) = &result {
            warn!(endpoint, kind = ?e.kind, error = %e, "round config request failed");
        }
        result
    }
}

async fn request(
    http: &reqwest::Client,
    endpoint: &str,
    player_id: &str,
    timeout: Duration,
) -> Result<FetchedConfig, FetchError> {
    let response = http
        .post(endpoint)
        .timeout(timeout)
        .json(&StartRoundRequest { player_id })
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(
            FetchErrorKind::ProtocolError(status.as_u16()),
            status.canonical_reason().unwrap_or("unexpected status"),
        ));
    }

    let body = response.text().await.map_err(transport_error)?;
    let envelope: SessionResponse = serde_json::from_str(&body)
        .map_err(|e| FetchError::new(FetchErrorKind::MalformedBody, e.to_string()))?;

    if !envelope.success {
        let message = envelope.message;
        return Err(FetchError::new(
            FetchErrorKind::RemoteRejected(message.clone()),
            message,
        ));
    }

    let Some(config) = envelope.config else {
        return Err(FetchError::new(
            FetchErrorKind::MalformedBody,
            "success response without config",
        ));
    };

    Ok(FetchedConfig {
        config: RoundConfig::from(config),
        session_id: envelope.session_id,
    })
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        return FetchError::timeout(e.to_string());
    }
    FetchError::unreachable(e.to_string())
}
