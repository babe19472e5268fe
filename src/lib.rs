//! mfsim - Multi-Fidelity SIMulation environment
//!
//! Orchestrates episodes of a multi-agent vehicle-navigation simulation and
//! turns them into training data: collision-aware resets, a synchronous
//! rollout loop over a pluggable stepping backend, potential-based rewards,
//! and per-agent transition extraction.

pub mod kinematic;
pub mod rollout;
pub mod scenario;
pub mod steering;

pub use kinematic::KinematicBackend;
pub use rollout::{
    Action, AgentProperty, AgentState, Backend, EnvError, EpisodeResult, RolloutControl,
    RolloutEnv, RolloutOutcome, Transition,
};
pub use scenario::{ResetMode, ScenarioConfig, ScenarioError};

/// Identifier type used for episodes.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
