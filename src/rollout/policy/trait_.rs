//! Policy trait for the rollout environment.

use crate::rollout::types::AgentState;

/// Decides one action per agent from the current observations and states.
///
/// This is the only decision point of a rollout. Any closure of the shape
/// `FnMut(&[O], &[AgentState]) -> Vec<A>` is a policy.
pub trait Policy<O, A> {
    /// Selects one action per agent.
    ///
    /// # Arguments
    ///
    /// * `observations` - Per-agent observations from the backend
    /// * `states` - Per-agent states, index-aligned with `observations`
    fn select_actions(&mut self, observations: &[O], states: &[AgentState]) -> Vec<A>;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str {
        "callback"
    }
}

impl<O, A, F> Policy<O, A> for F
where
    F: FnMut(&[O], &[AgentState]) -> Vec<A>,
{
    fn select_actions(&mut self, observations: &[O], states: &[AgentState]) -> Vec<A> {
        self(observations, states)
    }
}
