use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::domain::config::{RoundConfig, TerrainKind};
use crate::domain::errors::{FetchError, ReportError};
use crate::domain::performance::PerformanceSnapshot;

// Successful fetch: the round config plus the session id the service issued.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedConfig {
    pub config: RoundConfig,
    pub session_id: String,
}

// Port for a single config fetch attempt. Implementations must not retry.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch(
        &self,
        endpoint: &str,
        player_id: &str,
        timeout: Duration,
    ) -> Result<FetchedConfig, FetchError>;
}

// Port for transmitting a closed performance window.
#[async_trait]
pub trait PerformanceReporter: Send + Sync {
    async fn report(
        &self,
        session_id: &str,
        snapshot: &PerformanceSnapshot,
    ) -> Result<(), ReportError>;
}

// Terrain collaborator (background visuals, friction).
pub trait TerrainSink: Send {
    fn set_terrain(&mut self, terrain: TerrainKind);
}

// Movement collaborator. The modifier scales its base speed, it does not compound.
pub trait MovementSink: Send {
    fn apply_speed_modifier(&mut self, modifier: f32);
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}
