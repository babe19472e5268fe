//! Stepping backend contract.

use super::error::BackendError;
use super::types::AgentState;

/// The external component that integrates agent physics.
///
/// The rollout environment owns exactly one backend and calls it strictly in
/// sequence. Every per-agent list exchanged through this trait is
/// index-aligned with the scenario's agent order.
pub trait Backend {
    /// Per-agent observation handed to the policy.
    type Observation: Clone;
    /// Per-agent control command, passed through untouched.
    type Action: Clone;

    /// Returns the backend clock and the current state of every agent.
    fn get_state(&mut self) -> Result<(f64, Vec<AgentState>), BackendError>;

    /// Returns one observation per agent for the current state.
    fn get_obs(&mut self) -> Result<Vec<Self::Observation>, BackendError>;

    /// Overwrites agent states.
    ///
    /// Only entries whose `enable` flag is set are applied. With `reset` the
    /// backend starts a fresh episode and clears its clock and integration
    /// state (or sets the clock to `total_time` when given); without it the
    /// call is a live correction that keeps the clock running.
    fn set_state(
        &mut self,
        states: &[AgentState],
        enable: &[bool],
        reset: bool,
        total_time: Option<f64>,
    ) -> Result<(), BackendError>;

    /// Queues one action per agent for the next integration.
    fn set_action(&mut self, actions: &[Self::Action]) -> Result<(), BackendError>;

    /// Advances integration by `substeps` sub-steps.
    fn step(&mut self, substeps: u32) -> Result<(), BackendError>;
}
