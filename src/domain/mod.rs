// Domain layer: round configuration, combat and performance rules.

pub mod combat;
pub mod config;
pub mod errors;
pub mod performance;
pub mod ports;
pub mod session;

pub use combat::{
    CombatEvent, CombatModel, CombatState, CombatStats, Combatant, DamageReport, RevivePolicy,
};
pub use config::{DEFAULT_ROUND_CONFIG, RoundConfig, TerrainKind};
pub use errors::{FetchError, FetchErrorKind, ReportError};
pub use performance::{PerformanceAggregator, PerformanceSnapshot, PerformanceWindow};
pub use ports::{
    Clock, ConfigSource, FetchedConfig, MovementSink, PerformanceReporter, TerrainSink,
};
pub use session::SessionIdentity;
