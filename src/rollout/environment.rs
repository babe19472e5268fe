//! Rollout environment and its synchronous driver loop.
//!
//! Each driver iteration runs:
//! fetch → decide → record → pause? → finish? → reset → act + step.

use std::fmt;
use std::thread;
use std::time::Duration;

use super::backend::Backend;
use super::error::{EnvError, EnvResult};
use super::history::EpisodeHistory;
use super::policy::Policy;
use super::reference::ReferenceStates;
use super::reset::ResetManager;
use super::result::EpisodeResult;
use super::reward::RewardCalculator;
use super::trajectory::Transition;
use super::types::{AgentProperty, AgentState};
use crate::scenario::{CommonConfig, ResetMode, ScenarioConfig, ScenarioResult};
use crate::{generate_id, Id};

/// Why a call to [`RolloutEnv::rollout_sync`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutOutcome {
    /// The pause predicate fired; calling the loop again resumes the episode.
    Pause,
    /// The finish predicate fired or the clock passed the time limit.
    Finish,
}

impl fmt::Display for RolloutOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RolloutOutcome::Pause => write!(f, "pause"),
            RolloutOutcome::Finish => write!(f, "finish"),
        }
    }
}

type StatePredicate<'a> = Box<dyn FnMut(&[AgentState]) -> bool + 'a>;

/// Caller-side options of one driver invocation.
pub struct RolloutControl<'a> {
    substeps: u32,
    delay: Duration,
    pause: Option<StatePredicate<'a>>,
    finish: Option<StatePredicate<'a>>,
}

impl<'a> RolloutControl<'a> {
    /// Advances the backend by `substeps` integration sub-steps per iteration.
    pub fn new(substeps: u32) -> Self {
        Self {
            substeps,
            delay: Duration::ZERO,
            pause: None,
            finish: None,
        }
    }

    /// Stops with [`RolloutOutcome::Pause`] when `predicate` holds.
    pub fn with_pause(mut self, predicate: impl FnMut(&[AgentState]) -> bool + 'a) -> Self {
        self.pause = Some(Box::new(predicate));
        self
    }

    /// Stops with [`RolloutOutcome::Finish`] when `predicate` holds.
    pub fn with_finish(mut self, predicate: impl FnMut(&[AgentState]) -> bool + 'a) -> Self {
        self.finish = Some(Box::new(predicate));
        self
    }

    /// Sleeps this long after every step, for pacing against a live backend.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Backend sub-steps per driver iteration.
    pub fn substeps(&self) -> u32 {
        self.substeps
    }

    fn should_pause(&mut self, states: &[AgentState]) -> bool {
        self.pause.as_mut().is_some_and(|p| p(states))
    }

    fn should_finish(&mut self, states: &[AgentState]) -> bool {
        self.finish.as_mut().is_some_and(|p| p(states))
    }
}

impl fmt::Debug for RolloutControl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RolloutControl")
            .field("substeps", &self.substeps)
            .field("delay", &self.delay)
            .field("pause", &self.pause.is_some())
            .field("finish", &self.finish.is_some())
            .finish()
    }
}

/// A multi-agent navigation environment driving one backend.
///
/// # Lifecycle
///
/// 1. Call [`RolloutEnv::new`] with a scenario, a backend, and a seed.
///    An invalid `common` section is rejected here.
/// 2. Call [`RolloutEnv::reset_rollout`] to start an episode.
/// 3. Call [`RolloutEnv::rollout_sync`] until it returns
///    [`RolloutOutcome::Finish`]; a `Pause` can be resumed by calling it again.
/// 4. Read [`RolloutEnv::trajectories`] and [`RolloutEnv::result`].
pub struct RolloutEnv<B: Backend> {
    backend: B,
    common: CommonConfig,
    reference: ReferenceStates,
    reset: ResetManager,
    reward: RewardCalculator,
    history: EpisodeHistory<B::Observation, B::Action>,
    step_number: u64,
    episode_id: Id,
}

impl<B: Backend> RolloutEnv<B> {
    /// Creates an environment for `scenario` on top of `backend`.
    ///
    /// `seed` drives every random placement made by the environment. The
    /// `common` section is validated here as well, since a scenario built in
    /// code never went through the parser.
    pub fn new(scenario: &ScenarioConfig, backend: B, seed: u64) -> ScenarioResult<Self> {
        scenario.common.validate()?;
        let reference = ReferenceStates::build(scenario);
        let reset = ResetManager::new(
            scenario.common.field_range,
            reference.safety_radii(),
            seed,
        );
        Ok(Self {
            backend,
            common: scenario.common.clone(),
            reference,
            reset,
            reward: RewardCalculator::new(scenario.common.reward_coef),
            history: EpisodeHistory::new(),
            step_number: 0,
            episode_id: generate_id(),
        })
    }

    /// Overrides the placement retry budget (default 40).
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.reset = self.reset.with_max_retries(max_retries);
        self
    }

    /// Number of agents across all scenario groups.
    pub fn agent_count(&self) -> usize {
        self.reference.agent_count()
    }

    /// Static per-agent properties in scenario order.
    pub fn properties(&self) -> &[AgentProperty] {
        self.reference.properties()
    }

    /// Initial states built from the scenario, before any placement.
    pub fn reference_states(&self) -> &[AgentState] {
        self.reference.template()
    }

    /// The validated `common` scenario section.
    pub fn common(&self) -> &CommonConfig {
        &self.common
    }

    /// Reward function used by [`RolloutEnv::trajectories`] and [`RolloutEnv::result`].
    pub fn reward_calculator(&self) -> &RewardCalculator {
        &self.reward
    }

    /// Placement state, including the infeasible placement counter.
    pub fn reset_manager(&self) -> &ResetManager {
        &self.reset
    }

    /// Number of executed driver steps since construction.
    pub fn step_number(&self) -> u64 {
        self.step_number
    }

    /// Identifier of the current episode, renewed by every hard reset.
    pub fn episode_id(&self) -> &str {
        &self.episode_id
    }

    /// Returns a reference to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns a mutable reference to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consumes the environment and returns its backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Reads the backend clock and agent states.
    pub fn get_state(&mut self) -> EnvResult<(f64, Vec<AgentState>)> {
        let (time, states) = self.backend.get_state()?;
        self.check_len("state", states.len())?;
        Ok((time, states))
    }

    /// Pushes a live correction to the backend; `enable` defaults to all agents.
    pub fn set_state(
        &mut self,
        states: &[AgentState],
        enable: Option<&[bool]>,
        total_time: Option<f64>,
    ) -> EnvResult<()> {
        self.check_len("state", states.len())?;
        let all = vec![true; states.len()];
        let enable = enable.unwrap_or(&all);
        self.check_len("enable", enable.len())?;
        self.backend.set_state(states, enable, false, total_time)?;
        Ok(())
    }

    /// Starts a new episode: places agents, hard-resets the backend, and
    /// clears the history.
    pub fn reset_rollout(&mut self) -> EnvResult<()> {
        let mut states = self.reference.initial_states();
        let enable = match self.common.reset_mode {
            ResetMode::Random => self.reset.decide_and_place(&mut states, true).eligible,
            ResetMode::Fixed => vec![true; states.len()],
        };
        self.backend.set_state(&states, &enable, true, None)?;
        self.history.clear();
        self.episode_id = generate_id();
        tracing::debug!(
            episode = %self.episode_id,
            mode = ?self.common.reset_mode,
            agents = states.len(),
            "episode reset"
        );
        Ok(())
    }

    /// History of the current episode, across paused and resumed calls.
    pub fn history(&self) -> &EpisodeHistory<B::Observation, B::Action> {
        &self.history
    }

    /// Replaces the recorded history, e.g. to continue a saved episode.
    pub fn set_history(&mut self, history: EpisodeHistory<B::Observation, B::Action>) {
        self.history = history;
    }

    /// Hands the recorded history over, leaving an empty one.
    pub fn take_history(&mut self) -> EpisodeHistory<B::Observation, B::Action> {
        std::mem::take(&mut self.history)
    }

    /// Runs the episode until the pause or finish condition holds.
    ///
    /// The action decided in the stopping iteration is never sent to the
    /// backend. History is appended to across calls.
    pub fn rollout_sync<P>(
        &mut self,
        policy: &mut P,
        control: &mut RolloutControl<'_>,
    ) -> EnvResult<RolloutOutcome>
    where
        P: Policy<B::Observation, B::Action> + ?Sized,
    {
        let mut iterations = 0usize;
        let outcome = loop {
            let (time, mut states) = self.get_state()?;
            let observations = self.backend.get_obs()?;
            self.check_len("observation", observations.len())?;

            let actions = policy.select_actions(&observations, &states);
            self.check_len("action", actions.len())?;

            self.history.record(time, &states, observations);
            iterations += 1;
            tracing::trace!(time, step = self.step_number, "recorded iteration");

            if control.should_pause(&states) {
                break RolloutOutcome::Pause;
            }
            if control.should_finish(&states) || time > self.common.time_limit {
                break RolloutOutcome::Finish;
            }

            self.apply_reset(&mut states)?;

            self.backend.set_action(&actions)?;
            self.backend.step(control.substeps)?;
            self.history.record_actions(actions);
            self.step_number += 1;

            if !control.delay.is_zero() {
                thread::sleep(control.delay);
            }
        };

        tracing::info!(
            episode = %self.episode_id,
            %outcome,
            policy = policy.name(),
            iterations,
            history_len = self.history.len(),
            "rollout stopped"
        );
        Ok(outcome)
    }

    /// Per-agent transitions of the recorded history.
    pub fn trajectories(&self) -> EnvResult<Vec<Vec<Transition<B::Observation, B::Action>>>> {
        self.history.trajectories(&self.reward)
    }

    /// Summary statistics of the recorded history.
    pub fn result(&self) -> EnvResult<EpisodeResult> {
        self.history.summarize(&self.reward)
    }

    /// Applies the per-iteration reset rule and pushes any change as a live
    /// correction.
    fn apply_reset(&mut self, states: &mut [AgentState]) -> EnvResult<()> {
        match self.common.reset_mode {
            ResetMode::Random => {
                let outcome = self.reset.decide_and_place(states, false);
                if outcome.any_reset {
                    self.backend
                        .set_state(states, &outcome.eligible, false, None)?;
                }
            }
            ResetMode::Fixed => {
                let mut changed = false;
                for state in states.iter_mut().filter(|s| s.reach && s.movable) {
                    state.movable = false;
                    changed = true;
                }
                if changed {
                    self.backend
                        .set_state(states, &vec![true; states.len()], false, None)?;
                }
            }
        }
        Ok(())
    }

    fn check_len(&self, what: &'static str, got: usize) -> EnvResult<()> {
        let expected = self.agent_count();
        if got == expected {
            Ok(())
        } else {
            Err(EnvError::AgentCountMismatch {
                what,
                expected,
                got,
            })
        }
    }
}
