use crate::interface_adapters::clients::report_base_from_start;
use std::{env, time::Duration};

// Runtime constants (not gameplay tuning).

pub fn round_config_url() -> String {
    env::var("ROUND_CONFIG_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "http://127.0.0.1:3005/api/game/start".to_string())
}

// Empty or unset means no fallback endpoint.
pub fn round_config_fallback_url() -> Option<String> {
    env::var("ROUND_CONFIG_FALLBACK_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub fn performance_report_url() -> String {
    env::var("PERFORMANCE_REPORT_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| report_base_from_start(&round_config_url()))
}

pub fn player_id() -> String {
    env::var("PLAYER_ID").unwrap_or_else(|_| "test".to_string())
}

pub fn config_request_timeout() -> Duration {
    Duration::from_millis(millis("CONFIG_REQUEST_TIMEOUT_MS", 10_000))
}

pub fn report_timeout() -> Duration {
    Duration::from_millis(millis("REPORT_TIMEOUT_MS", 10_000))
}

pub fn judgment_duration() -> Duration {
    Duration::from_secs(seconds("JUDGMENT_SECONDS", 30))
}

pub fn buffer_duration() -> Duration {
    Duration::from_secs(seconds("BUFFER_SECONDS", 30))
}

pub fn auto_continue() -> bool {
    env::var("AUTO_CONTINUE")
        .ok()
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Only absolute http(s) URLs are usable as endpoints.
pub fn is_valid_endpoint(raw: &str) -> bool {
    url::Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

fn millis(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

// Zero-length phases would spin the timer loop, so zero falls back too.
fn seconds(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub const LIFECYCLE_BROADCAST_CAPACITY: usize = 64;
pub const COMBAT_BROADCAST_CAPACITY: usize = 256;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);

pub const PLAYER_MAX_HEALTH: u32 = 100;
pub const PLAYER_BASE_SPEED: f32 = 5.0;
