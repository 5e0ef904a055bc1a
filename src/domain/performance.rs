// Player performance tracking over a judgment window.

use crate::domain::ports::Clock;
use std::sync::Arc;
use std::time::Instant;

/// Counters for one open judgment window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceWindow {
    pub started_at: Instant,
    pub input_events: u32,
    pub projectiles_fired: u32,
    pub projectiles_landed: u32,
    pub round_index: u32,
}

impl PerformanceWindow {
    fn dodge_ratio(&self) -> f32 {
        if self.projectiles_fired == 0 {
            // No shots fired counts as a perfect dodge.
            return 1.0;
        }
        // Hits on shots fired before the window opened can outnumber fired shots.
        (1.0 - (self.projectiles_landed as f32 / self.projectiles_fired as f32)).clamp(0.0, 1.0)
    }

    fn apm(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f32();
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.input_events as f32 / elapsed) * 60.0
    }
}

/// Final metrics of a closed window, as transmitted to the service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSnapshot {
    pub apm: u32,
    pub dodge_ratio: f32,
    pub round_index: u32,
}

pub struct PerformanceAggregator {
    clock: Arc<dyn Clock>,
    window: Option<PerformanceWindow>,
}

impl PerformanceAggregator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            window: None,
        }
    }

    /// Starts a fresh window, discarding any window left open.
    pub fn open_window(&mut self, round_index: u32) {
        self.window = Some(PerformanceWindow {
            started_at: self.clock.now(),
            input_events: 0,
            projectiles_fired: 0,
            projectiles_landed: 0,
            round_index,
        });
    }

    pub fn record_input(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.input_events = window.input_events.saturating_add(1);
        }
    }

    pub fn record_projectile_fired(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.projectiles_fired = window.projectiles_fired.saturating_add(1);
        }
    }

    pub fn record_projectile_hit(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.projectiles_landed = window.projectiles_landed.saturating_add(1);
        }
    }

    pub fn current_apm(&self) -> f32 {
        self.window
            .as_ref()
            .map(|window| window.apm(self.clock.now()))
            .unwrap_or(0.0)
    }

    pub fn current_dodge_ratio(&self) -> f32 {
        self.window
            .as_ref()
            .map(PerformanceWindow::dodge_ratio)
            .unwrap_or(1.0)
    }

    /// Finalizes the open window at the current instant. `None` when idle.
    pub fn close_window(&mut self) -> Option<PerformanceSnapshot> {
        let window = self.window.take()?;
        let apm = window.apm(self.clock.now()).round().max(0.0) as u32;

        Some(PerformanceSnapshot {
            apm,
            dodge_ratio: window.dodge_ratio(),
            round_index: window.round_index,
        })
    }

    pub fn is_tracking(&self) -> bool {
        self.window.is_some()
    }

    pub fn window(&self) -> Option<&PerformanceWindow> {
        self.window.as_ref()
    }
}
