// Use-case level states and published events for the round lifecycle.

use crate::domain::RoundConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Judgment,
    Buffer,
    Ending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    RoundStarted {
        round_index: u32,
        config: RoundConfig,
    },
    JudgmentEnded {
        round_index: u32,
    },
    BufferStarted {
        round_index: u32,
    },
    RoundEnded {
        round_index: u32,
        winner_is_boss: bool,
    },
}

/// How `start_round` treats state left over from the previous round-life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Keep the round counter and session going.
    Continue,
    /// Hard reset: round counter back to zero, session dropped.
    Restart,
}
