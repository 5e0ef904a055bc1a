// Per-round difficulty configuration supplied by the config service.

use std::fmt;

/// Arena floor type; collaborators pick visuals and friction from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TerrainKind {
    #[default]
    Smooth,
    Sticky,
    Rugged,
}

impl TerrainKind {
    /// Parses the wire name, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "smooth" => Some(Self::Smooth),
            "sticky" => Some(Self::Sticky),
            "rugged" => Some(Self::Rugged),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Sticky => "sticky",
            Self::Rugged => "rugged",
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved configuration for one round. Never mutated after resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundConfig {
    pub terrain: TerrainKind,
    /// Multiplier on the player's base movement speed (> 0).
    pub movement_modifier: f32,
    pub boss_speed: f32,
    /// Always at least 1 so a fresh boss is alive.
    pub boss_health: u32,
    pub boss_damage: u32,
    pub boss_shield: u32,
}

/// Configuration used when every endpoint fails.
pub const DEFAULT_ROUND_CONFIG: RoundConfig = RoundConfig {
    terrain: TerrainKind::Smooth,
    movement_modifier: 1.0,
    boss_speed: 75.0,
    boss_health: 180,
    boss_damage: 18,
    boss_shield: 25,
};

impl Default for RoundConfig {
    fn default() -> Self {
        DEFAULT_ROUND_CONFIG
    }
}

impl RoundConfig {
    /// Builds a config from untrusted values, clamping each into its valid range.
    pub fn clamped(
        terrain: TerrainKind,
        movement_modifier: f32,
        boss_speed: f32,
        boss_health: i64,
        boss_damage: i64,
        boss_shield: i64,
    ) -> Self {
        let movement_modifier = if movement_modifier.is_finite() && movement_modifier > 0.0 {
            movement_modifier
        } else {
            1.0
        };
        let boss_speed = if boss_speed.is_finite() {
            boss_speed.max(0.0)
        } else {
            0.0
        };

        Self {
            terrain,
            movement_modifier,
            boss_speed,
            boss_health: clamp_u32(boss_health).max(1),
            boss_damage: clamp_u32(boss_damage),
            boss_shield: clamp_u32(boss_shield),
        }
    }
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}
