//! Scenario configuration: the `common` constants, expanded agent groups,
//! and pass-through fence geometry.

pub mod config;
pub mod error;
mod parser;

pub use config::{AgentGroup, CommonConfig, Fence, FieldRange, ResetMode, RewardCoef, ScenarioConfig};
pub use error::{ScenarioError, ScenarioResult};
