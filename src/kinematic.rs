//! Low-fidelity in-process backend.
//!
//! Integrates a kinematic bicycle model with a fixed time step. Agents crash
//! when they leave the field or overlap another agent's safety radius, and
//! reach their target within `reach_radius`. Both events stop the agent.

use std::f64::consts::TAU;

use crate::rollout::{Action, AgentProperty, AgentState, Backend, BackendError};
use crate::scenario::{FieldRange, ScenarioConfig};

/// Kinematic bicycle-model backend.
#[derive(Debug, Clone)]
pub struct KinematicBackend {
    properties: Vec<AgentProperty>,
    field: FieldRange,
    dt: f64,
    reach_radius: f64,
    time: f64,
    states: Vec<AgentState>,
    actions: Vec<Action>,
}

impl KinematicBackend {
    /// Wheelbase used when an agent has no `L_axis` property.
    pub const DEFAULT_WHEELBASE: f64 = 0.3;
    pub const DEFAULT_REACH_RADIUS: f64 = 0.1;

    /// Creates a backend holding the scenario's initial states, with
    /// integration step `dt` per sub-step.
    pub fn new(scenario: &ScenarioConfig, dt: f64) -> Self {
        let properties: Vec<AgentProperty> = scenario.agents().cloned().collect();
        let states = properties.iter().map(AgentState::from_property).collect();
        let actions = vec![Action::default(); properties.len()];
        Self {
            properties,
            field: scenario.common.field_range,
            dt,
            reach_radius: Self::DEFAULT_REACH_RADIUS,
            time: 0.0,
            states,
            actions,
        }
    }

    /// Overrides the distance below which a target counts as reached.
    pub fn with_reach_radius(mut self, reach_radius: f64) -> Self {
        self.reach_radius = reach_radius;
        self
    }

    /// Simulated clock in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current agent states, without copying.
    pub fn states(&self) -> &[AgentState] {
        &self.states
    }

    fn wheelbase(&self, agent: usize) -> f64 {
        self.properties[agent]
            .extra_f64("L_axis")
            .unwrap_or(Self::DEFAULT_WHEELBASE)
    }

    fn check_len(&self, what: &str, got: usize) -> Result<(), BackendError> {
        if got == self.states.len() {
            Ok(())
        } else {
            Err(BackendError::Rejected(format!(
                "{what} list has {got} entries for {} agents",
                self.states.len()
            )))
        }
    }

    fn integrate(&mut self) {
        for i in 0..self.states.len() {
            let wheelbase = self.wheelbase(i);
            let action = self.actions[i];
            let state = &mut self.states[i];
            if !state.movable || !state.enable {
                continue;
            }
            state.vel_b = action.ctrl_vel;
            state.phi = action.ctrl_phi;
            state.x += state.vel_b * state.theta.cos() * self.dt;
            state.y += state.vel_b * state.theta.sin() * self.dt;
            state.theta = (state.theta + state.vel_b / wheelbase * state.phi.tan() * self.dt)
                .rem_euclid(TAU);
        }
        self.time += self.dt;
        self.detect_events();
    }

    fn detect_events(&mut self) {
        let n = self.states.len();
        let mut crashed = vec![false; n];
        for i in 0..n {
            if !self.field.contains(self.states[i].x, self.states[i].y) {
                crashed[i] = true;
            }
            for j in (i + 1)..n {
                let clearance = self.properties[i].r_safe + self.properties[j].r_safe;
                if self.states[i].distance_to(&self.states[j]) < clearance {
                    crashed[i] = true;
                    crashed[j] = true;
                }
            }
        }

        for (state, crash) in self.states.iter_mut().zip(crashed) {
            if !state.movable || !state.enable {
                continue;
            }
            if crash {
                state.crash = true;
            } else if state.distance_to_target() < self.reach_radius {
                state.reach = true;
            } else {
                continue;
            }
            state.movable = false;
            state.vel_b = 0.0;
        }
    }
}

impl Backend for KinematicBackend {
    /// Target position in the agent frame, body velocity, steering angle.
    type Observation = Vec<f64>;
    type Action = Action;

    fn get_state(&mut self) -> Result<(f64, Vec<AgentState>), BackendError> {
        Ok((self.time, self.states.clone()))
    }

    fn get_obs(&mut self) -> Result<Vec<Vec<f64>>, BackendError> {
        Ok(self
            .states
            .iter()
            .map(|s| {
                let (dx, dy) = (s.target_x - s.x, s.target_y - s.y);
                let (sin, cos) = s.theta.sin_cos();
                vec![dx * cos + dy * sin, dy * cos - dx * sin, s.vel_b, s.phi]
            })
            .collect())
    }

    fn set_state(
        &mut self,
        states: &[AgentState],
        enable: &[bool],
        reset: bool,
        total_time: Option<f64>,
    ) -> Result<(), BackendError> {
        self.check_len("state", states.len())?;
        self.check_len("enable", enable.len())?;
        for ((current, new), apply) in self.states.iter_mut().zip(states).zip(enable) {
            if *apply {
                *current = new.clone();
            }
        }
        if reset {
            self.time = total_time.unwrap_or(0.0);
            self.actions.fill(Action::default());
        } else if let Some(time) = total_time {
            self.time = time;
        }
        Ok(())
    }

    fn set_action(&mut self, actions: &[Action]) -> Result<(), BackendError> {
        self.check_len("action", actions.len())?;
        self.actions.copy_from_slice(actions);
        Ok(())
    }

    fn step(&mut self, substeps: u32) -> Result<(), BackendError> {
        for _ in 0..substeps {
            self.integrate();
        }
        Ok(())
    }
}
