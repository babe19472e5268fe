//! Aggregate statistics over a recorded history.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::EnvResult;
use super::history::EpisodeHistory;
use super::reward::RewardCalculator;

/// Summary of one rollout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// Sum of every movable agent's reward over every transition.
    pub total_reward: f64,
    /// Number of false → true edges of the `crash` flag.
    pub crash_time: usize,
    /// Number of false → true edges of the `reach` flag.
    pub reach_time: usize,
    /// Mean `|vel_b|` over movable agent-steps; `0.0` if there are none.
    pub mean_vel: f64,
    /// Last timestamp minus first; `0.0` for an empty history.
    pub total_time: f64,
}

impl<O, A> EpisodeHistory<O, A> {
    /// Aggregates rewards, terminal events, and speed over the whole history.
    ///
    /// Entries disagreeing on the agent count are an error.
    pub fn summarize(&self, reward: &RewardCalculator) -> EnvResult<EpisodeResult> {
        self.check_alignment()?;
        let entries = self.entries();
        let mut result = EpisodeResult::default();

        for i in self.transition_starts() {
            let (current, next) = (&entries[i], &entries[i + 1]);
            for (agent, state) in current.states.iter().enumerate() {
                if state.movable {
                    result.total_reward +=
                        reward.compute(&next.states[agent], state, self.elapsed(i)?);
                }
            }
        }

        for pair in entries.windows(2) {
            for (prev, state) in pair[0].states.iter().zip(&pair[1].states) {
                if state.crash && !prev.crash {
                    result.crash_time += 1;
                }
                if state.reach && !prev.reach {
                    result.reach_time += 1;
                }
            }
        }

        let (vel_sum, movable_steps) = entries
            .iter()
            .flat_map(|e| e.states.iter())
            .filter(|s| s.movable)
            .fold((0.0, 0usize), |(sum, n), s| (sum + s.vel_b.abs(), n + 1));
        if movable_steps > 0 {
            result.mean_vel = vel_sum / movable_steps as f64;
        }

        if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
            result.total_time = last.time - first.time;
        }
        Ok(result)
    }
}

impl fmt::Display for EpisodeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reward {:.3}, crashes {}, reaches {}, mean |v| {:.3}, time {:.2}",
            self.total_reward, self.crash_time, self.reach_time, self.mean_vel, self.total_time
        )
    }
}
