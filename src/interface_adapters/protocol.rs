// Wire DTOs for the config service and performance updates.

use crate::domain::{PerformanceSnapshot, RoundConfig, TerrainKind};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Body of the round start request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRoundRequest<'a> {
    pub player_id: &'a str,
}

/// Envelope returned by the round start endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub config: Option<ConfigDto>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigDto {
    pub terrain: TerrainDto,
    pub boss: BossDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub movement_modifier: f32,
}

// Integers stay signed here so out-of-range values can be clamped instead of rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct BossDto {
    pub speed: f32,
    pub health: i64,
    pub damage: i64,
    pub shield: i64,
}

impl From<ConfigDto> for RoundConfig {
    fn from(dto: ConfigDto) -> Self {
        let terrain = TerrainKind::parse(&dto.terrain.kind).unwrap_or_else(|| {
            warn!(terrain = %dto.terrain.kind, "unknown terrain type, using smooth");
            TerrainKind::Smooth
        });

        RoundConfig::clamped(
            terrain,
            dto.terrain.movement_modifier,
            dto.boss.speed,
            dto.boss.health,
            dto.boss.damage,
            dto.boss.shield,
        )
    }
}

/// Body of `POST <base>/<sessionId>/update`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceUpdate {
    pub apm: u32,
    pub dodge_ratio: f32,
    pub round: u32,
}

impl From<&PerformanceSnapshot> for PerformanceUpdate {
    fn from(snapshot: &PerformanceSnapshot) -> Self {
        Self {
            apm: snapshot.apm,
            dodge_ratio: snapshot.dodge_ratio,
            round: snapshot.round_index,
        }
    }
}
