// Primary -> fallback -> default resolution of a round config.

use crate::domain::errors::FetchError;
use crate::domain::ports::{ConfigSource, FetchedConfig};
use crate::domain::{DEFAULT_ROUND_CONFIG, RoundConfig, SessionIdentity};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Endpoints and identity used for every resolution.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub primary: String,
    /// `None` when no fallback is configured.
    pub fallback: Option<String>,
    pub player_id: String,
    /// Hard bound on each attempt.
    pub timeout: Duration,
}

impl ResolverSettings {
    /// Blank fallback strings are treated as "no fallback".
    pub fn new(
        primary: impl Into<String>,
        fallback: Option<String>,
        player_id: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            player_id: player_id.into(),
            timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Primary,
    Fallback,
    Default,
}

/// Outcome of a resolution. Always carries a usable config.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub config: RoundConfig,
    pub session: Option<SessionIdentity>,
    pub source: ResolvedFrom,
}

// Cheap to clone so it can move into spawned fetch tasks.
#[derive(Clone)]
pub struct ConfigResolver {
    source: Arc<dyn ConfigSource>,
    settings: Arc<ResolverSettings>,
}

impl ConfigResolver {
    pub fn new(source: Arc<dyn ConfigSource>, settings: ResolverSettings) -> Self {
        Self {
            source,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Never fails: degrades to `DEFAULT_ROUND_CONFIG` when every endpoint fails.
    pub async fn resolve(&self) -> Resolution {
        let primary = self.settings.primary.as_str();
        match self.attempt(primary).await {
            Ok(fetched) => return self.resolved(fetched, ResolvedFrom::Primary),
            Err(e) => warn!(endpoint = %primary, error = %e, "primary config endpoint failed"),
        }

        if let Some(fallback) = self.settings.fallback.as_deref() {
            info!(endpoint = %fallback, "trying fallback config endpoint");
            match self.attempt(fallback).await {
                Ok(fetched) => return self.resolved(fetched, ResolvedFrom::Fallback),
                Err(e) => {
                    warn!(endpoint = %fallback, error = %e, "fallback config endpoint failed")
                }
            }
        }

        warn!("all config endpoints failed, using default configuration");
        Resolution {
            config: DEFAULT_ROUND_CONFIG,
            session: None,
            source: ResolvedFrom::Default,
        }
    }

    async fn attempt(&self, endpoint: &str) -> Result<FetchedConfig, FetchError> {
        let timeout = self.settings.timeout;
        debug!(endpoint, timeout_ms = timeout.as_millis(), "fetching round config");

        // Bound the attempt even if the source ignores its timeout argument.
        match tokio::time::timeout(
            timeout,
            self.source
                .fetch(endpoint, &self.settings.player_id, timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::timeout(format!(
                "no response within {}ms",
                timeout.as_millis()
            ))),
        }
    }

    fn resolved(&self, fetched: FetchedConfig, source: ResolvedFrom) -> Resolution {
        let session = Some(SessionIdentity::new(
            fetched.session_id,
            self.settings.player_id.clone(),
        ))
        .filter(SessionIdentity::is_reportable);
        debug!(?source, has_session = session.is_some(), "round config resolved");

        Resolution {
            config: fetched.config,
            session,
            source,
        }
    }
}
