// Use cases layer: config resolution and the round lifecycle.

pub mod orchestrator;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use orchestrator::{Collaborators, RoundOrchestrator, RoundSettings};
pub use resolver::{ConfigResolver, Resolution, ResolvedFrom, ResolverSettings};
pub use types::{LifecycleEvent, Phase, StartMode};
