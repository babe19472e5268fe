//! Random policy for testing and baselines.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::trait_::Policy;
use crate::rollout::types::{Action, AgentState};
use crate::steering::prefer_vel_list;

/// Picks a uniformly random discrete command per agent.
///
/// Candidates are the forward and backward variants of
/// [`prefer_vel_list`] at zero steering, scaled to `speed` and
/// `max_steering_angle`.
pub struct RandomPolicy {
    candidates: Vec<Action>,
    rng: StdRng,
}

impl RandomPolicy {
    /// Creates a new random policy.
    pub fn new(speed: f64, max_steering_angle: f64, seed: u64) -> Self {
        let candidates = prefer_vel_list(speed, 0.0)
            .into_iter()
            .chain(prefer_vel_list(-speed, 0.0))
            .map(|(vel, phi)| Action::new(vel, phi * max_steering_angle))
            .collect();
        Self {
            candidates,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn candidates(&self) -> &[Action] {
        &self.candidates
    }
}

impl<O> Policy<O, Action> for RandomPolicy {
    fn select_actions(&mut self, _observations: &[O], states: &[AgentState]) -> Vec<Action> {
        states
            .iter()
            .map(|_| {
                self.candidates
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or_default()
            })
            .collect()
    }

    fn name(&self) -> &str {
        "random"
    }
}
