//! Evaluation metrics over repeated rollouts.
//!
//! Runs a policy for several episodes and averages the per-episode
//! [`EpisodeResult`] statistics.

use std::fmt;

use super::backend::Backend;
use super::environment::{RolloutControl, RolloutEnv};
use super::error::EnvResult;
use super::policy::Policy;
use super::result::EpisodeResult;

/// Aggregated evaluation metrics over multiple episodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    /// Mean total reward per episode.
    pub mean_total_reward: f64,
    /// Mean number of crashes per episode.
    pub mean_crashes: f64,
    /// Mean number of reached targets per episode.
    pub mean_reaches: f64,
    /// Mean of the per-episode mean speeds.
    pub mean_vel: f64,
    /// Mean simulated time per episode.
    pub mean_total_time: f64,
    /// Number of episodes evaluated.
    pub n_episodes: usize,
}

impl EvaluationMetrics {
    /// Evaluates a policy over multiple episodes and returns aggregated metrics.
    ///
    /// Every episode starts with [`RolloutEnv::reset_rollout`] and ends at the
    /// first exit of the driver loop, pause included.
    ///
    /// # Arguments
    ///
    /// * `env` - The environment to evaluate in
    /// * `policy` - The policy to evaluate
    /// * `control` - Loop options shared by every episode
    /// * `n_episodes` - Number of episodes to run
    pub fn evaluate<B, P>(
        env: &mut RolloutEnv<B>,
        policy: &mut P,
        control: &mut RolloutControl<'_>,
        n_episodes: usize,
    ) -> EnvResult<Self>
    where
        B: Backend,
        P: Policy<B::Observation, B::Action> + ?Sized,
    {
        let mut results = Vec::with_capacity(n_episodes);
        for episode in 0..n_episodes {
            env.reset_rollout()?;
            env.rollout_sync(policy, control)?;
            let result = env.result()?;
            tracing::info!(episode, %result, "evaluated episode");
            results.push(result);
        }
        Ok(Self::from_results(&results))
    }

    /// Averages already computed episode results.
    pub fn from_results(results: &[EpisodeResult]) -> Self {
        let n = results.len();
        let mean = |f: fn(&EpisodeResult) -> f64| {
            if n == 0 {
                0.0
            } else {
                results.iter().map(f).sum::<f64>() / n as f64
            }
        };
        Self {
            mean_total_reward: mean(|r| r.total_reward),
            mean_crashes: mean(|r| r.crash_time as f64),
            mean_reaches: mean(|r| r.reach_time as f64),
            mean_vel: mean(|r| r.mean_vel),
            mean_total_time: mean(|r| r.total_time),
            n_episodes: n,
        }
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Evaluation Metrics ({} episodes) ===",
            self.n_episodes
        )?;
        writeln!(f, "  Mean total reward:   {:.3}", self.mean_total_reward)?;
        writeln!(f, "  Mean crashes:        {:.2}", self.mean_crashes)?;
        writeln!(f, "  Mean reaches:        {:.2}", self.mean_reaches)?;
        writeln!(f, "  Mean |velocity|:     {:.3}", self.mean_vel)?;
        writeln!(f, "  Mean episode time:   {:.2}", self.mean_total_time)
    }
}
