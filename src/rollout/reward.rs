//! Potential-based reward for the rollout environment.

use super::types::AgentState;
use crate::scenario::RewardCoef;

/// Computes per-agent rewards from consecutive states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardCalculator {
    coef: RewardCoef,
}

impl RewardCalculator {
    pub fn new(coef: RewardCoef) -> Self {
        Self { coef }
    }

    /// Coefficients of the reward terms.
    pub fn coef(&self) -> &RewardCoef {
        &self.coef
    }

    /// Reward for moving from `old_state` to `new_state` in `delta_time`.
    ///
    /// # Components
    ///
    /// 1. **Crash**: `crash` if the new state is crashed.
    /// 2. **Reach**: `reach` if the new state reached its target.
    /// 3. **Potential**: `potential × (d_old - d_new)`, with `d` the distance
    ///    from the agent to its own target in that state.
    /// 4. **Time**: `time_penalty × delta_time`.
    pub fn compute(&self, new_state: &AgentState, old_state: &AgentState, delta_time: f64) -> f64 {
        let crash = if new_state.crash { self.coef.crash } else { 0.0 };
        let reach = if new_state.reach { self.coef.reach } else { 0.0 };
        let potential = self.coef.potential
            * (old_state.distance_to_target() - new_state.distance_to_target());
        let time = self.coef.time_penalty * delta_time;
        crash + reach + potential + time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::AgentProperty;

    fn coef() -> RewardCoef {
        RewardCoef {
            crash: -10.0,
            reach: 10.0,
            potential: 1.0,
            time_penalty: -0.01,
        }
    }

    fn at(x: f64) -> AgentState {
        AgentState::from_property(&AgentProperty::new(0.5, (x, 0.0, 0.0), (10.0, 0.0)))
    }

    #[test]
    fn identical_inputs_give_identical_rewards() {
        let calc = RewardCalculator::new(coef());
        let (old, new) = (at(1.0), at(2.5));
        let first = calc.compute(&new, &old, 0.1);
        for _ in 0..10 {
            assert_eq!(calc.compute(&new, &old, 0.1).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn combines_all_components() {
        let calc = RewardCalculator::new(coef());
        let old = at(2.0);
        let mut new = at(4.0);
        new.reach = true;
        // reach 10 + potential (8 - 6) + time -0.01 * 2
        assert!((calc.compute(&new, &old, 2.0) - 11.98).abs() < 1e-12);

        new.reach = false;
        new.crash = true;
        assert!((calc.compute(&new, &old, 2.0) - (-8.02)).abs() < 1e-12);
    }

    #[test]
    fn moving_away_is_penalized() {
        let calc = RewardCalculator::new(RewardCoef {
            time_penalty: 0.0,
            ..coef()
        });
        assert!(calc.compute(&at(1.0), &at(3.0), 1.0) < 0.0);
    }

    #[test]
    fn potential_rewards_telescope() {
        let calc = RewardCalculator::new(RewardCoef {
            crash: -10.0,
            reach: 10.0,
            potential: 0.5,
            time_penalty: 0.0,
        });
        let path: Vec<AgentState> = [0.0, 2.0, 3.0, 5.0, 6.0, 8.0].iter().map(|x| at(*x)).collect();
        let total: f64 = path
            .windows(2)
            .map(|w| calc.compute(&w[1], &w[0], 1.0))
            .sum();
        let expected =
            0.5 * (path[0].distance_to_target() - path[path.len() - 1].distance_to_target());
        assert_eq!(total, expected);
    }
}
