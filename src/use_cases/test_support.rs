use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::errors::{FetchError, FetchErrorKind, ReportError};
use crate::domain::ports::{
    Clock, ConfigSource, FetchedConfig, MovementSink, PerformanceReporter, TerrainSink,
};
use crate::domain::{PerformanceSnapshot, RoundConfig, TerrainKind};

// Manually advanced time source so APM assertions are deterministic.
pub(crate) struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().expect("clock mutex poisoned");
        *offset += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().expect("clock mutex poisoned");
        self.origin + *offset
    }
}

pub(crate) fn fetched(config: RoundConfig, session_id: &str) -> FetchedConfig {
    FetchedConfig {
        config,
        session_id: session_id.to_string(),
    }
}

pub(crate) fn config_with_terrain(terrain: TerrainKind) -> RoundConfig {
    RoundConfig {
        terrain,
        movement_modifier: 0.8,
        boss_speed: 60.0,
        boss_health: 200,
        boss_damage: 10,
        boss_shield: 30,
    }
}

// Scripted reply for a single fetch attempt.
#[derive(Clone)]
pub(crate) enum Reply {
    Config(FetchedConfig),
    Fail(FetchErrorKind),
    // Never completes; only the resolver's timeout ends it.
    Hang,
    // Waits for a permit on the gate before producing the inner reply.
    Gated(Arc<Notify>, Box<Reply>),
}

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<Reply>>,
    sticky: HashMap<String, Reply>,
    calls: Vec<String>,
}

// Config source answering per endpoint from a script, recording every call.
#[derive(Clone, Default)]
pub(crate) struct ScriptedSource {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // Reply used whenever the endpoint has nothing queued.
    pub(crate) fn always(self, endpoint: &str, reply: Reply) -> Self {
        {
            let mut script = self.script.lock().expect("script mutex poisoned");
            script.sticky.insert(endpoint.to_string(), reply);
        }
        self
    }

    // One-shot reply consumed in order before the sticky reply.
    pub(crate) fn then(self, endpoint: &str, reply: Reply) -> Self {
        {
            let mut script = self.script.lock().expect("script mutex poisoned");
            script
                .queued
                .entry(endpoint.to_string())
                .or_default()
                .push_back(reply);
        }
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        let script = self.script.lock().expect("script mutex poisoned");
        script.calls.clone()
    }

    fn next_reply(&self, endpoint: &str) -> Reply {
        let mut script = self.script.lock().expect("script mutex poisoned");
        script.calls.push(endpoint.to_string());
        if let Some(reply) = script.queued.get_mut(endpoint).and_then(VecDeque::pop_front) {
            return reply;
        }
        script
            .sticky
            .get(endpoint)
            .cloned()
            .unwrap_or(Reply::Fail(FetchErrorKind::Unreachable))
    }
}

async fn play(reply: Reply) -> Result<FetchedConfig, FetchError> {
    let mut reply = reply;
    loop {
        match reply {
            Reply::Config(fetched) => return Ok(fetched),
            Reply::Fail(kind) => return Err(FetchError::new(kind, "scripted failure")),
            Reply::Hang => return std::future::pending().await,
            Reply::Gated(gate, inner) => {
                gate.notified().await;
                reply = *inner;
            }
        }
    }
}

#[async_trait]
impl ConfigSource for ScriptedSource {
    async fn fetch(
        &self,
        endpoint: &str,
        _player_id: &str,
        _timeout: Duration,
    ) -> Result<FetchedConfig, FetchError> {
        let reply = self.next_reply(endpoint);
        play(reply).await
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingReporter {
    reports: Arc<Mutex<Vec<(String, PerformanceSnapshot)>>>,
    fail: bool,
}

impl RecordingReporter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn reports(&self) -> Vec<(String, PerformanceSnapshot)> {
        let guard = self.reports.lock().expect("reports mutex poisoned");
        guard.clone()
    }
}

#[async_trait]
impl PerformanceReporter for RecordingReporter {
    async fn report(
        &self,
        session_id: &str,
        snapshot: &PerformanceSnapshot,
    ) -> Result<(), ReportError> {
        let mut guard = self.reports.lock().expect("reports mutex poisoned");
        guard.push((session_id.to_string(), *snapshot));
        if self.fail {
            return Err(ReportError::Upstream {
                status: 503,
                message: None,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingTerrain {
    applied: Arc<Mutex<Vec<TerrainKind>>>,
}

impl RecordingTerrain {
    pub(crate) fn applied(&self) -> Vec<TerrainKind> {
        let guard = self.applied.lock().expect("terrain mutex poisoned");
        guard.clone()
    }
}

impl TerrainSink for RecordingTerrain {
    fn set_terrain(&mut self, terrain: TerrainKind) {
        let mut guard = self.applied.lock().expect("terrain mutex poisoned");
        guard.push(terrain);
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingMovement {
    modifiers: Arc<Mutex<Vec<f32>>>,
}

impl RecordingMovement {
    pub(crate) fn modifiers(&self) -> Vec<f32> {
        let guard = self.modifiers.lock().expect("movement mutex poisoned");
        guard.clone()
    }
}

impl MovementSink for RecordingMovement {
    fn apply_speed_modifier(&mut self, modifier: f32) {
        let mut guard = self.modifiers.lock().expect("movement mutex poisoned");
        guard.push(modifier);
    }
}
