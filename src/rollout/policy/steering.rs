//! Steering heuristic policy.

use super::trait_::Policy;
use crate::rollout::types::{Action, AgentState};
use crate::steering::{path, Pose, SteeringParams};

/// Drives every movable agent toward its own target with [`path`].
///
/// Observations are ignored; the policy reads poses and targets from the
/// states. Immovable agents receive a zero command.
#[derive(Debug, Clone)]
pub struct SteeringPolicy {
    params: SteeringParams,
    speed: f64,
}

impl SteeringPolicy {
    /// Creates a steering policy commanding `speed` along the chosen direction.
    pub fn new(params: SteeringParams, speed: f64) -> Self {
        Self { params, speed }
    }

    /// Command for a single agent.
    pub fn action_for(&self, state: &AgentState) -> Action {
        if !state.movable {
            return Action::default();
        }
        let cmd = path(
            Pose::from(state),
            (state.target_x, state.target_y),
            &self.params,
        );
        Action::new(
            cmd.vel * self.speed,
            cmd.phi * self.params.max_steering_angle,
        )
    }
}

impl<O> Policy<O, Action> for SteeringPolicy {
    fn select_actions(&mut self, _observations: &[O], states: &[AgentState]) -> Vec<Action> {
        states.iter().map(|s| self.action_for(s)).collect()
    }

    fn name(&self) -> &str {
        "steering"
    }
}
