// Framework bootstrap: tracing, wiring and the fixed-rate tick loop.

use crate::domain::CombatEvent;
use crate::frameworks::config;
use crate::interface_adapters::clients::{ConfigClient, PerformanceClient};
use crate::interface_adapters::clock::SystemClock;
use crate::interface_adapters::collaborators::{ScaledMovement, TracingTerrain};
use crate::use_cases::{
    Collaborators, ConfigResolver, LifecycleEvent, ResolverSettings, RoundOrchestrator,
    RoundSettings, StartMode,
};

use std::{io::Result, sync::Arc};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Drives `orchestrator` until ctrl-c. With `auto_continue`, a finished round
/// immediately resolves the next one.
pub async fn run(mut orchestrator: RoundOrchestrator, auto_continue: bool) -> Result<()> {
    let mut lifecycle_rx = orchestrator.subscribe();
    tokio::spawn(combat_event_logger(orchestrator.subscribe_combat()));

    orchestrator.start_round(StartMode::Restart);

    let mut interval = tokio::time::interval(config::TICK_INTERVAL);
    let mut last_tick = Instant::now();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Real elapsed time, so a stalled loop still advances the timers.
                let now = Instant::now();
                orchestrator.tick(now.duration_since(last_tick));
                last_tick = now;
            }
            event = lifecycle_rx.recv() => {
                match event {
                    Ok(LifecycleEvent::RoundEnded { round_index, winner_is_boss }) => {
                        info!(round_index, winner_is_boss, auto_continue, "round finished");
                        if auto_continue {
                            orchestrator.start_round(StartMode::Continue);
                        }
                    }
                    Ok(event) => debug!(?event, "lifecycle event"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "lifecycle listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!("lifecycle channel closed; runner exiting");
                        break;
                    }
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for shutdown signal");
                }
                info!(round_index = orchestrator.round_index(), "shutting down");
                break;
            }
        }
    }

    Ok(())
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let orchestrator = build_orchestrator()?;
    run(orchestrator, config::auto_continue()).await
}

fn build_orchestrator() -> Result<RoundOrchestrator> {
    let primary = config::round_config_url();
    let fallback = config::round_config_fallback_url();
    let report_base = config::performance_report_url();
    for endpoint in [Some(&primary), fallback.as_ref(), Some(&report_base)]
        .into_iter()
        .flatten()
    {
        if !config::is_valid_endpoint(endpoint) {
            warn!(%endpoint, "endpoint is not a valid http url; requests to it will fail");
        }
    }

    let config_client = ConfigClient::new()
        .map_err(|e| std::io::Error::other(format!("failed to initialize config client: {e}")))?;
    let report_timeout = config::report_timeout();
    let performance_client = PerformanceClient::new(report_base.clone(), report_timeout)
        .map_err(|e| {
            std::io::Error::other(format!("failed to initialize performance client: {e}"))
        })?;

    let request_timeout = config::config_request_timeout();
    let settings = ResolverSettings::new(primary, fallback, config::player_id(), request_timeout);
    info!(
        primary = %settings.primary,
        fallback = settings.fallback.as_deref().unwrap_or("-"),
        report_base = %report_base,
        player_id = %settings.player_id,
        request_timeout_ms = request_timeout.as_millis(),
        report_timeout_ms = report_timeout.as_millis(),
        "round services configured"
    );

    let resolver = ConfigResolver::new(Arc::new(config_client), settings);
    Ok(RoundOrchestrator::new(
        RoundSettings {
            judgment_duration: config::judgment_duration(),
            buffer_duration: config::buffer_duration(),
            player_max_health: config::PLAYER_MAX_HEALTH,
            lifecycle_capacity: config::LIFECYCLE_BROADCAST_CAPACITY,
            combat_capacity: config::COMBAT_BROADCAST_CAPACITY,
        },
        resolver,
        Arc::new(performance_client),
        Collaborators {
            terrain: Box::new(TracingTerrain::default()),
            movement: Box::new(ScaledMovement::new(config::PLAYER_BASE_SPEED)),
        },
        Arc::new(SystemClock),
    ))
}

async fn combat_event_logger(mut combat_rx: broadcast::Receiver<CombatEvent>) {
    loop {
        match combat_rx.recv().await {
            Ok(CombatEvent::Died { combatant }) => info!(?combatant, "combatant died"),
            Ok(CombatEvent::ShieldBroken { combatant }) => info!(?combatant, "shield broken"),
            Ok(CombatEvent::Revived { combatant }) => info!(?combatant, "combatant revived"),
            Ok(event) => debug!(?event, "combat event"),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "combat logger lagged; skipping to latest event");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
