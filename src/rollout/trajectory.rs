//! Per-agent transition extraction from a recorded history.

use serde::{Deserialize, Serialize};

use super::error::EnvResult;
use super::history::EpisodeHistory;
use super::reward::RewardCalculator;

/// One agent's transition between two consecutive history entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition<O, A> {
    pub obs: O,
    pub action: A,
    pub reward: f64,
    pub obs_next: O,
    /// The agent stopped being movable at the end of this transition.
    pub done: bool,
    /// Clock at the start of the transition.
    pub time: f64,
}

impl<O: Clone, A: Clone> EpisodeHistory<O, A> {
    /// Extracts one transition sequence per agent.
    ///
    /// A transition starts at every entry where the agent was movable and an
    /// action was executed. Histories with fewer than two entries yield empty
    /// sequences. Entries disagreeing on the agent count are an error.
    pub fn trajectories(&self, reward: &RewardCalculator) -> EnvResult<Vec<Vec<Transition<O, A>>>> {
        self.check_alignment()?;
        let entries = self.entries();
        let mut trajectories = vec![Vec::new(); self.agent_count()];

        for i in self.transition_starts() {
            let (current, next) = (&entries[i], &entries[i + 1]);
            let Some(actions) = &current.actions else {
                continue;
            };
            for (agent, trajectory) in trajectories.iter_mut().enumerate() {
                if !current.states[agent].movable {
                    continue;
                }
                let elapsed = self.elapsed(i)?;
                trajectory.push(Transition {
                    obs: current.observations[agent].clone(),
                    action: actions[agent].clone(),
                    reward: reward.compute(&next.states[agent], &current.states[agent], elapsed),
                    obs_next: next.observations[agent].clone(),
                    done: !next.states[agent].movable,
                    time: current.time,
                });
            }
        }
        Ok(trajectories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::{AgentProperty, AgentState, EnvError};
    use crate::scenario::RewardCoef;

    fn calc() -> RewardCalculator {
        RewardCalculator::new(RewardCoef {
            crash: -10.0,
            reach: 10.0,
            potential: 1.0,
            time_penalty: 0.0,
        })
    }

    fn agent(x: f64, movable: bool) -> AgentState {
        let mut s = AgentState::from_property(&AgentProperty::new(0.5, (x, 0.0, 0.0), (10.0, 0.0)));
        s.movable = movable;
        s
    }

    /// Two agents; agent 0 becomes immovable at entry 3, agent 1 never does.
    fn history() -> EpisodeHistory<u32, char> {
        let mut h = EpisodeHistory::new();
        for step in 0..5u32 {
            let x = step as f64;
            h.record(x, &[agent(x, step < 3), agent(x, true)], vec![step, 100 + step]);
            if step < 4 {
                h.record_actions(vec!['a', 'b']);
            }
        }
        h
    }

    #[test]
    fn done_marks_the_movable_flip() {
        let trajectories = history().trajectories(&calc()).unwrap();
        assert_eq!(trajectories.len(), 2);

        let first = &trajectories[0];
        assert_eq!(first.len(), 3);
        let dones: Vec<bool> = first.iter().map(|t| t.done).collect();
        assert_eq!(dones, [false, false, true]);

        let second = &trajectories[1];
        assert_eq!(second.len(), 4);
        assert!(second.iter().all(|t| !t.done));
    }

    #[test]
    fn transitions_carry_aligned_fields() {
        let trajectories = history().trajectories(&calc()).unwrap();
        let t = &trajectories[1][2];
        assert_eq!(t.obs, 102);
        assert_eq!(t.obs_next, 103);
        assert_eq!(t.action, 'b');
        assert_eq!(t.time, 2.0);
        assert!((t.reward - 1.0).abs() < 1e-12);
    }

    #[test]
    fn short_histories_are_empty() {
        let mut h: EpisodeHistory<u32, char> = EpisodeHistory::new();
        assert!(h.trajectories(&calc()).unwrap().is_empty());

        h.record(0.0, &[agent(0.0, true)], vec![0]);
        h.record_actions(vec!['a']);
        let trajectories = h.trajectories(&calc()).unwrap();
        assert_eq!(trajectories.len(), 1);
        assert!(trajectories[0].is_empty());
    }

    #[test]
    fn misaligned_entries_are_an_error() {
        let mut h: EpisodeHistory<u32, char> = EpisodeHistory::new();
        h.record(0.0, &[agent(0.0, true), agent(1.0, true)], vec![0]);
        h.record_actions(vec!['a', 'b']);
        h.record(1.0, &[agent(0.5, true), agent(1.5, true)], vec![1, 2]);
        assert_eq!(
            h.trajectories(&calc()),
            Err(EnvError::AgentCountMismatch {
                what: "history observation",
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn stalled_clock_is_an_error() {
        let mut h: EpisodeHistory<u32, char> = EpisodeHistory::new();
        h.record(1.0, &[agent(0.0, true)], vec![0]);
        h.record_actions(vec!['a']);
        h.record(1.0, &[agent(1.0, true)], vec![1]);
        assert!(matches!(
            h.trajectories(&calc()),
            Err(EnvError::NonPositiveElapsed { index: 0, .. })
        ));
    }
}
