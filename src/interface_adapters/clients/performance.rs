use crate::domain::errors::ReportError;
use crate::domain::performance::PerformanceSnapshot;
use crate::domain::ports::PerformanceReporter;
use crate::interface_adapters::clients::config::USER_AGENT;
use crate::interface_adapters::protocol::PerformanceUpdate;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

// Posts closed performance windows to `<base_url>/<session_id>/update`.
#[derive(Clone)]
pub struct PerformanceClient {
    http: reqwest::Client,
    base_url: String,
}

impl PerformanceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn update_url(&self, session_id: &str) -> String {
        format!("{}/{}/update", self.base_url, session_id)
    }
}

#[async_trait]
impl PerformanceReporter for PerformanceClient {
    async fn report(
        &self,
        session_id: &str,
        snapshot: &PerformanceSnapshot,
    ) -> Result<(), ReportError> {
        let response = self
            .http
            .post(self.update_url(session_id))
            .json(&PerformanceUpdate::from(snapshot))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReportError::Timeout
                } else {
                    ReportError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Best effort: the body may not be the JSON error shape.
        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|body| body.message);
        Err(ReportError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}

/// Report base derived from a start endpoint: a trailing `/start` segment is removed.
pub fn report_base_from_start(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    trimmed
        .strip_suffix("/start")
        .unwrap_or(trimmed)
        .to_string()
}
