// Round lifecycle state machine: resolve -> judgment -> buffer -> next round.
//
// Single writer: all combat and performance mutation happens on `tick` or the
// collaborator entry points. Fetches run as tokio tasks and hand their result
// back through a channel that is drained at the start of each tick.

use super::resolver::{ConfigResolver, Resolution};
use super::types::{LifecycleEvent, Phase, StartMode};
use crate::domain::ports::{Clock, MovementSink, PerformanceReporter, TerrainSink};
use crate::domain::{
    CombatEvent, CombatModel, CombatStats, Combatant, DEFAULT_ROUND_CONFIG, DamageReport,
    PerformanceAggregator, PerformanceSnapshot, RevivePolicy, RoundConfig, SessionIdentity,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Timing and capacity settings for the orchestrator.
#[derive(Debug, Clone)]
pub struct RoundSettings {
    pub judgment_duration: Duration,
    pub buffer_duration: Duration,
    pub player_max_health: u32,
    pub lifecycle_capacity: usize,
    pub combat_capacity: usize,
}

/// Environment collaborators that receive each applied config.
pub struct Collaborators {
    pub terrain: Box<dyn TerrainSink>,
    pub movement: Box<dyn MovementSink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchPurpose {
    Initial,
    Prefetch,
}

struct FetchOutcome {
    generation: u64,
    purpose: FetchPurpose,
    resolution: Resolution,
}

struct PendingFetch {
    generation: u64,
    purpose: FetchPurpose,
    handle: JoinHandle<()>,
}

pub struct RoundOrchestrator {
    settings: RoundSettings,
    resolver: ConfigResolver,
    reporter: Arc<dyn PerformanceReporter>,
    collaborators: Collaborators,
    boss: CombatModel,
    player: CombatModel,
    aggregator: PerformanceAggregator,

    phase: Phase,
    // Time spent in the current timed phase; overflow carries across boundaries.
    phase_elapsed: Duration,
    round_index: u32,
    current_config: Option<RoundConfig>,
    next_config: Option<Resolution>,
    session: Option<SessionIdentity>,
    winner: Option<Combatant>,
    waiting_for_next: bool,

    // Only the result matching `pending.generation` is ever applied.
    generation: u64,
    pending: Option<PendingFetch>,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
    fetch_rx: mpsc::UnboundedReceiver<FetchOutcome>,

    lifecycle_tx: broadcast::Sender<LifecycleEvent>,
    combat_tx: broadcast::Sender<CombatEvent>,
}

impl RoundOrchestrator {
    pub fn new(
        settings: RoundSettings,
        resolver: ConfigResolver,
        reporter: Arc<dyn PerformanceReporter>,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let (lifecycle_tx, _lifecycle_rx) = broadcast::channel(settings.lifecycle_capacity.max(1));
        let (combat_tx, _combat_rx) = broadcast::channel(settings.combat_capacity.max(1));

        let boss = CombatModel::new(
            Combatant::Boss,
            RevivePolicy::Never,
            CombatStats::from(&DEFAULT_ROUND_CONFIG),
            combat_tx.clone(),
        );
        let player = CombatModel::new(
            Combatant::Player,
            RevivePolicy::OnHeal,
            CombatStats::player(settings.player_max_health),
            combat_tx.clone(),
        );

        Self {
            settings,
            resolver,
            reporter,
            collaborators,
            boss,
            player,
            aggregator: PerformanceAggregator::new(clock),
            phase: Phase::Idle,
            phase_elapsed: Duration::ZERO,
            round_index: 0,
            current_config: None,
            next_config: None,
            session: None,
            winner: None,
            waiting_for_next: false,
            generation: 0,
            pending: None,
            fetch_tx,
            fetch_rx,
            lifecycle_tx,
            combat_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.lifecycle_tx.subscribe()
    }

    pub fn subscribe_combat(&self) -> broadcast::Receiver<CombatEvent> {
        self.combat_tx.subscribe()
    }

    /// Begins resolving a new round. Only valid from `Idle` or `Ending`.
    pub fn start_round(&mut self, mode: StartMode) {
        if !matches!(self.phase, Phase::Idle | Phase::Ending) {
            warn!(phase = ?self.phase, "start_round ignored: a round is already active");
            return;
        }

        if mode == StartMode::Restart {
            self.round_index = 0;
            self.session = None;
            self.next_config = None;
        }
        self.abandon_pending();
        self.winner = None;
        self.waiting_for_next = false;
        self.phase_elapsed = Duration::ZERO;
        self.phase = Phase::Resolving;

        info!(?mode, next_round = self.round_index + 1, "resolving round config");
        self.launch_fetch(FetchPurpose::Initial);
    }

    /// Advances the lifecycle by `dt` of wall time.
    ///
    /// Completed fetches are applied first, then deaths are checked, then
    /// timers advance. A death therefore wins over a timer elapsing in the
    /// same tick.
    pub fn tick(&mut self, dt: Duration) {
        self.drain_fetches();
        if self.check_deaths() {
            return;
        }
        self.advance_timers(dt);
    }

    pub fn damage_boss(&mut self, amount: u32) -> DamageReport {
        if !self.in_play() {
            return DamageReport::default();
        }
        let report = self.boss.apply_damage(amount);
        self.check_deaths();
        report
    }

    pub fn damage_player(&mut self, amount: u32) -> DamageReport {
        if !self.in_play() {
            return DamageReport::default();
        }
        let report = self.player.apply_damage(amount);
        self.check_deaths();
        report
    }

    pub fn heal_player(&mut self, amount: u32) {
        if self.in_play() {
            self.player.heal(amount);
        }
    }

    pub fn restore_boss_shield(&mut self, amount: u32) {
        if self.in_play() {
            self.boss.restore_shield(amount);
        }
    }

    /// The boss touched the player: deals the round's configured contact damage.
    pub fn boss_contact(&mut self) -> DamageReport {
        let damage = self
            .current_config
            .as_ref()
            .map(|config| config.boss_damage)
            .unwrap_or(0);
        self.damage_player(damage)
    }

    pub fn projectile_fired(&mut self) {
        self.aggregator.record_projectile_fired();
    }

    /// An enemy projectile landed on the player.
    pub fn projectile_hit_player(&mut self, damage: u32) -> DamageReport {
        self.aggregator.record_projectile_hit();
        self.damage_player(damage)
    }

    pub fn player_input(&mut self) {
        self.aggregator.record_input();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn session(&self) -> Option<&SessionIdentity> {
        self.session.as_ref()
    }

    pub fn current_config(&self) -> Option<&RoundConfig> {
        self.current_config.as_ref()
    }

    pub fn winner(&self) -> Option<Combatant> {
        self.winner
    }

    pub fn boss(&self) -> &CombatModel {
        &self.boss
    }

    pub fn player(&self) -> &CombatModel {
        &self.player
    }

    /// Direct access for collaborators; deaths are picked up on the next tick.
    pub fn boss_mut(&mut self) -> &mut CombatModel {
        &mut self.boss
    }

    pub fn player_mut(&mut self) -> &mut CombatModel {
        &mut self.player
    }

    pub fn aggregator(&self) -> &PerformanceAggregator {
        &self.aggregator
    }

    pub fn is_next_config_ready(&self) -> bool {
        self.next_config.is_some()
    }

    pub fn total_duration(&self) -> Duration {
        self.settings.judgment_duration + self.settings.buffer_duration
    }

    /// Time left in the current round (judgment plus buffer).
    pub fn remaining_time(&self) -> Duration {
        match self.phase {
            Phase::Judgment => self.total_duration().saturating_sub(self.phase_elapsed),
            Phase::Buffer => self
                .settings
                .buffer_duration
                .saturating_sub(self.phase_elapsed),
            _ => Duration::ZERO,
        }
    }

    pub fn judgment_time_remaining(&self) -> Duration {
        match self.phase {
            Phase::Judgment => self
                .settings
                .judgment_duration
                .saturating_sub(self.phase_elapsed),
            _ => Duration::ZERO,
        }
    }

    fn in_play(&self) -> bool {
        matches!(self.phase, Phase::Judgment | Phase::Buffer)
    }

    fn launch_fetch(&mut self, purpose: FetchPurpose) {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let resolver = self.resolver.clone();
        let fetch_tx = self.fetch_tx.clone();

        let handle = tokio::spawn(async move {
            let resolution = resolver.resolve().await;
            // A closed channel means the orchestrator is gone; nothing to do.
            let _ = fetch_tx.send(FetchOutcome {
                generation,
                purpose,
                resolution,
            });
        });

        debug!(generation, ?purpose, "config fetch launched");
        self.pending = Some(PendingFetch {
            generation,
            purpose,
            handle,
        });
    }

    fn abandon_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
            debug!(
                generation = pending.generation,
                purpose = ?pending.purpose,
                "abandoned in-flight config fetch"
            );
        }
    }

    fn drain_fetches(&mut self) {
        while let Ok(outcome) = self.fetch_rx.try_recv() {
            self.handle_fetch(outcome);
        }
    }

    fn handle_fetch(&mut self, outcome: FetchOutcome) {
        let expected = self
            .pending
            .as_ref()
            .is_some_and(|p| p.generation == outcome.generation && p.purpose == outcome.purpose);
        if !expected {
            debug!(
                generation = outcome.generation,
                purpose = ?outcome.purpose,
                "discarding stale config result"
            );
            return;
        }
        self.pending = None;

        match (outcome.purpose, self.phase) {
            (FetchPurpose::Initial, Phase::Resolving) => {
                self.phase_elapsed = Duration::ZERO;
                self.begin_round(outcome.resolution);
            }
            (FetchPurpose::Prefetch, Phase::Buffer) => {
                info!(
                    next_round = self.round_index + 1,
                    source = ?outcome.resolution.source,
                    "next round config ready"
                );
                self.next_config = Some(outcome.resolution);
                if self.phase_elapsed >= self.settings.buffer_duration {
                    self.finish_buffer();
                }
            }
            (purpose, phase) => {
                debug!(?purpose, ?phase, "config result arrived outside its phase");
            }
        }
    }

    fn check_deaths(&mut self) -> bool {
        if !self.in_play() {
            return false;
        }

        // Player death is checked first: a double knockout goes to the boss.
        let winner = if !self.player.is_alive() {
            Combatant::Boss
        } else if !self.boss.is_alive() {
            Combatant::Player
        } else {
            return false;
        };
        self.end_round(winner);
        true
    }

    fn advance_timers(&mut self, dt: Duration) {
        if !self.in_play() {
            return;
        }
        self.phase_elapsed += dt;

        loop {
            match self.phase {
                Phase::Judgment if self.phase_elapsed >= self.settings.judgment_duration => {
                    self.phase_elapsed -= self.settings.judgment_duration;
                    self.end_judgment();
                }
                Phase::Buffer if self.phase_elapsed >= self.settings.buffer_duration => {
                    if self.next_config.is_some() {
                        self.finish_buffer();
                        continue;
                    }
                    // Hold at the boundary until the prefetch lands.
                    self.phase_elapsed = self.settings.buffer_duration;
                    if !self.waiting_for_next {
                        self.waiting_for_next = true;
                        info!(
                            round_index = self.round_index,
                            "buffer elapsed before next config was ready; waiting"
                        );
                    }
                    break;
                }
                _ => break,
            }
        }
    }

    fn begin_round(&mut self, resolution: Resolution) {
        if let Some(session) = resolution.session {
            self.session = Some(session);
        }
        let config = resolution.config;

        self.round_index += 1;
        self.apply_config(&config);
        self.aggregator.open_window(self.round_index);
        self.phase = Phase::Judgment;
        self.waiting_for_next = false;

        info!(
            round_index = self.round_index,
            terrain = %config.terrain,
            movement_modifier = config.movement_modifier,
            boss_health = config.boss_health,
            boss_shield = config.boss_shield,
            source = ?resolution.source,
            "round started"
        );
        self.current_config = Some(config.clone());
        self.publish(LifecycleEvent::RoundStarted {
            round_index: self.round_index,
            config,
        });
    }

    fn apply_config(&mut self, config: &RoundConfig) {
        self.boss.reset(CombatStats::from(config));
        self.player
            .reset(CombatStats::player(self.settings.player_max_health));
        self.collaborators.terrain.set_terrain(config.terrain);
        self.collaborators
            .movement
            .apply_speed_modifier(config.movement_modifier);
    }

    fn end_judgment(&mut self) {
        let round_index = self.round_index;
        if let Some(snapshot) = self.aggregator.close_window() {
            self.transmit(snapshot);
        }

        self.phase = Phase::Buffer;
        info!(round_index, "judgment ended; prefetching next round config");
        self.publish(LifecycleEvent::JudgmentEnded { round_index });
        self.publish(LifecycleEvent::BufferStarted { round_index });
        self.launch_fetch(FetchPurpose::Prefetch);
    }

    fn finish_buffer(&mut self) {
        // Applying the next config resets both combatants, so a pending death settles first.
        if self.check_deaths() {
            return;
        }
        let Some(resolution) = self.next_config.take() else {
            return;
        };
        self.phase_elapsed = self
            .phase_elapsed
            .saturating_sub(self.settings.buffer_duration);
        self.begin_round(resolution);
    }

    fn end_round(&mut self, winner: Combatant) {
        self.abandon_pending();
        self.next_config = None;
        if let Some(snapshot) = self.aggregator.close_window() {
            self.transmit(snapshot);
        }

        self.phase = Phase::Ending;
        self.phase_elapsed = Duration::ZERO;
        self.winner = Some(winner);

        let winner_is_boss = winner == Combatant::Boss;
        info!(round_index = self.round_index, winner_is_boss, "round ended");
        self.publish(LifecycleEvent::RoundEnded {
            round_index: self.round_index,
            winner_is_boss,
        });
    }

    fn transmit(&self, snapshot: PerformanceSnapshot) {
        let Some(session) = self.session.as_ref().filter(|s| s.is_reportable()) else {
            warn!(
                round_index = snapshot.round_index,
                "no session id available; skipping performance report"
            );
            return;
        };

        info!(
            round_index = snapshot.round_index,
            apm = snapshot.apm,
            dodge_ratio = snapshot.dodge_ratio,
            "reporting round performance"
        );
        let session_id = session.session_id.clone();
        let reporter = Arc::clone(&self.reporter);
        tokio::spawn(async move {
            // Logged only; round timing never waits on this.
            if let Err(e) = reporter.report(&session_id, &snapshot).await {
                warn!(
                    error = %e,
                    round_index = snapshot.round_index,
                    "failed to send performance report"
                );
            }
        });
    }

    fn publish(&self, event: LifecycleEvent) {
        let _ = self.lifecycle_tx.send(event);
    }
}
