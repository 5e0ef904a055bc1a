// Damage-absorption model shared by the boss and the player.

use crate::domain::config::RoundConfig;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combatant {
    Boss,
    Player,
}

/// Notifications published on every state transition of a combatant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    HealthChanged {
        combatant: Combatant,
        current: u32,
        max: u32,
    },
    ShieldChanged {
        combatant: Combatant,
        current: u32,
        max: u32,
    },
    ShieldBroken {
        combatant: Combatant,
    },
    Died {
        combatant: Combatant,
    },
    Revived {
        combatant: Combatant,
    },
}

impl CombatEvent {
    pub fn combatant(&self) -> Combatant {
        match self {
            CombatEvent::HealthChanged { combatant, .. }
            | CombatEvent::ShieldChanged { combatant, .. }
            | CombatEvent::ShieldBroken { combatant }
            | CombatEvent::Died { combatant }
            | CombatEvent::Revived { combatant } => *combatant,
        }
    }
}

/// Whether healing a dead combatant brings it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevivePolicy {
    Never,
    OnHeal,
}

/// Maxima a combatant is reset to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatStats {
    pub max_health: u32,
    pub max_shield: u32,
}

impl CombatStats {
    pub fn player(max_health: u32) -> Self {
        Self {
            max_health,
            max_shield: 0,
        }
    }
}

impl From<&RoundConfig> for CombatStats {
    fn from(config: &RoundConfig) -> Self {
        Self {
            max_health: config.boss_health,
            max_shield: config.boss_shield,
        }
    }
}

/// Snapshot of health and shield. `is_dead` implies `current_health == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatState {
    pub max_health: u32,
    pub current_health: u32,
    pub max_shield: u32,
    pub current_shield: u32,
    pub is_dead: bool,
}

impl CombatState {
    fn full(stats: CombatStats) -> Self {
        let max_health = stats.max_health.max(1);
        Self {
            max_health,
            current_health: max_health,
            max_shield: stats.max_shield,
            current_shield: stats.max_shield,
            is_dead: false,
        }
    }
}

/// Breakdown of a single `apply_damage` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageReport {
    pub shield_absorbed: u32,
    pub health_lost: u32,
    pub shield_broken: bool,
    pub died: bool,
}

pub struct CombatModel {
    combatant: Combatant,
    revive: RevivePolicy,
    state: CombatState,
    events: broadcast::Sender<CombatEvent>,
}

impl CombatModel {
    pub fn new(
        combatant: Combatant,
        revive: RevivePolicy,
        stats: CombatStats,
        events: broadcast::Sender<CombatEvent>,
    ) -> Self {
        Self {
            combatant,
            revive,
            state: CombatState::full(stats),
            events,
        }
    }

    /// Restores health and shield to the new maxima and revives.
    pub fn reset(&mut self, stats: CombatStats) {
        self.state = CombatState::full(stats);
        self.emit_health();
        self.emit_shield();
    }

    /// Shield absorbs first, the remainder comes off health (floored at zero).
    pub fn apply_damage(&mut self, amount: u32) -> DamageReport {
        let mut report = DamageReport::default();
        if self.state.is_dead || amount == 0 {
            return report;
        }

        let mut remaining = amount;
        if self.state.current_shield > 0 {
            let absorbed = remaining.min(self.state.current_shield);
            self.state.current_shield -= absorbed;
            remaining -= absorbed;
            report.shield_absorbed = absorbed;
            self.emit_shield();

            if self.state.current_shield == 0 {
                report.shield_broken = true;
                self.emit(CombatEvent::ShieldBroken {
                    combatant: self.combatant,
                });
            }
        }

        if remaining > 0 {
            let lost = remaining.min(self.state.current_health);
            self.state.current_health -= lost;
            report.health_lost = lost;
            if lost > 0 {
                self.emit_health();
            }
        }

        if self.state.current_health == 0 {
            self.state.is_dead = true;
            report.died = true;
            debug!(combatant = ?self.combatant, "combatant died");
            self.emit(CombatEvent::Died {
                combatant: self.combatant,
            });
        }

        report
    }

    pub fn heal(&mut self, amount: u32) {
        if self.state.is_dead {
            if self.revive == RevivePolicy::OnHeal && amount > 0 {
                self.state.is_dead = false;
                self.state.current_health = amount.min(self.state.max_health);
                debug!(combatant = ?self.combatant, "combatant revived");
                self.emit(CombatEvent::Revived {
                    combatant: self.combatant,
                });
                self.emit_health();
            }
            return;
        }

        self.state.current_health = self
            .state
            .current_health
            .saturating_add(amount)
            .min(self.state.max_health);
        self.emit_health();
    }

    pub fn restore_shield(&mut self, amount: u32) {
        if self.state.is_dead {
            return;
        }

        self.state.current_shield = self
            .state
            .current_shield
            .saturating_add(amount)
            .min(self.state.max_shield);
        self.emit_shield();
    }

    pub fn combatant(&self) -> Combatant {
        self.combatant
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn health(&self) -> u32 {
        self.state.current_health
    }

    pub fn max_health(&self) -> u32 {
        self.state.max_health
    }

    pub fn shield(&self) -> u32 {
        self.state.current_shield
    }

    pub fn max_shield(&self) -> u32 {
        self.state.max_shield
    }

    pub fn has_shield(&self) -> bool {
        self.state.current_shield > 0
    }

    pub fn is_alive(&self) -> bool {
        !self.state.is_dead
    }

    pub fn health_fraction(&self) -> f32 {
        fraction(self.state.current_health, self.state.max_health)
    }

    pub fn shield_fraction(&self) -> f32 {
        fraction(self.state.current_shield, self.state.max_shield)
    }

    fn emit_health(&self) {
        self.emit(CombatEvent::HealthChanged {
            combatant: self.combatant,
            current: self.state.current_health,
            max: self.state.max_health,
        });
    }

    fn emit_shield(&self) {
        self.emit(CombatEvent::ShieldChanged {
            combatant: self.combatant,
            current: self.state.current_shield,
            max: self.state.max_shield,
        });
    }

    fn emit(&self, event: CombatEvent) {
        // No subscribers is fine; listeners come and go with the UI.
        let _ = self.events.send(event);
    }
}

fn fraction(current: u32, max: u32) -> f32 {
    if max == 0 {
        return 0.0;
    }
    current as f32 / max as f32
}
