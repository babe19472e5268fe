//! Episode orchestration for the multi-agent navigation simulation.
//!
//! The [`RolloutEnv`] owns one stepping [`Backend`] and mediates between it
//! and a caller-supplied [`Policy`]: it places agents and targets, records an
//! append-only history, and post-processes that history into per-agent
//! [`Transition`]s and an [`EpisodeResult`].

pub mod backend;
pub mod environment;
pub mod error;
pub mod history;
pub mod metrics;
pub mod policy;
pub mod reference;
pub mod reset;
pub mod result;
pub mod reward;
pub mod trajectory;
pub mod types;


pub use backend::Backend;
pub use environment::{RolloutControl, RolloutEnv, RolloutOutcome};
pub use error::{BackendError, EnvError, EnvResult};
pub use history::{EpisodeHistory, HistoryEntry};
pub use metrics::EvaluationMetrics;
pub use policy::{Policy, RandomPolicy, SteeringPolicy};
pub use reference::ReferenceStates;
pub use reset::{ResetManager, ResetOutcome};
pub use result::EpisodeResult;
pub use reward::RewardCalculator;
pub use trajectory::Transition;
pub use types::{Action, AgentProperty, AgentState, Lifecycle};
