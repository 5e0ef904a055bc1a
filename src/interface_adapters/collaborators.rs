// Headless collaborators used by the runner in place of a renderer.

use crate::domain::TerrainKind;
use crate::domain::ports::{MovementSink, TerrainSink};
use tracing::info;

#[derive(Debug, Default)]
pub struct TracingTerrain {
    current: Option<TerrainKind>,
}

impl TracingTerrain {
    pub fn current(&self) -> Option<TerrainKind> {
        self.current
    }
}

impl TerrainSink for TracingTerrain {
    fn set_terrain(&mut self, terrain: TerrainKind) {
        self.current = Some(terrain);
        info!(%terrain, "terrain applied");
    }
}

/// Player movement; each modifier scales the base speed, never the previous speed.
#[derive(Debug, Clone)]
pub struct ScaledMovement {
    base_speed: f32,
    current_speed: f32,
}

impl ScaledMovement {
    pub fn new(base_speed: f32) -> Self {
        Self {
            base_speed,
            current_speed: base_speed,
        }
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }
}

impl MovementSink for ScaledMovement {
    fn apply_speed_modifier(&mut self, modifier: f32) {
        self.current_speed = self.base_speed * modifier;
        info!(
            modifier,
            speed = self.current_speed,
            "player movement speed updated"
        );
    }
}
