//! Core per-agent records for the rollout environment.
//!
//! Defines the immutable agent properties, the mutable per-step state, and
//! the default control command used by the bundled backend and policies.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable per-agent properties, built once from the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProperty {
    /// Minimum clearance used by collision-free placement.
    #[serde(rename = "R_safe")]
    pub r_safe: f64,
    pub init_x: f64,
    pub init_y: f64,
    #[serde(default)]
    pub init_theta: f64,
    #[serde(default)]
    pub init_vel_b: f64,
    #[serde(default)]
    pub init_phi: f64,
    #[serde(default = "default_movable")]
    pub init_movable: bool,
    pub init_target_x: f64,
    pub init_target_y: f64,
    /// Backend-specific keys (vehicle dimensions, sensor setup, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_movable() -> bool {
    true
}

impl AgentProperty {
    /// Creates a property record with zero initial motion and no extras.
    pub fn new(r_safe: f64, init: (f64, f64, f64), target: (f64, f64)) -> Self {
        Self {
            r_safe,
            init_x: init.0,
            init_y: init.1,
            init_theta: init.2,
            init_vel_b: 0.0,
            init_phi: 0.0,
            init_movable: true,
            init_target_x: target.0,
            init_target_y: target.1,
            extra: BTreeMap::new(),
        }
    }

    /// Looks up a numeric backend-specific property.
    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }
}

/// Mutable state of one agent at one instant.
///
/// `crash` and `reach` are mutually exclusive terminal conditions. An agent
/// with `movable == false` receives no meaningful control until it is reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    /// Body-frame velocity.
    pub vel_b: f64,
    /// Steering angle.
    pub phi: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub movable: bool,
    pub enable: bool,
    pub crash: bool,
    pub reach: bool,
}

impl AgentState {
    /// Initial state described by an agent's properties.
    pub fn from_property(prop: &AgentProperty) -> Self {
        Self {
            x: prop.init_x,
            y: prop.init_y,
            theta: prop.init_theta,
            vel_b: prop.init_vel_b,
            phi: prop.init_phi,
            target_x: prop.init_target_x,
            target_y: prop.init_target_y,
            movable: prop.init_movable,
            enable: true,
            crash: false,
            reach: false,
        }
    }

    /// Euclidean distance between the agent and its own target.
    pub fn distance_to_target(&self) -> f64 {
        (self.x - self.target_x).hypot(self.y - self.target_y)
    }

    /// Euclidean distance between the positions of two agents.
    pub fn distance_to(&self, other: &AgentState) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Euclidean distance between the targets of two agents.
    pub fn target_distance_to(&self, other: &AgentState) -> f64 {
        (self.target_x - other.target_x).hypot(self.target_y - other.target_y)
    }

    /// Collapses the boolean flags into a lifecycle stage.
    pub fn lifecycle(&self) -> Lifecycle {
        if self.crash {
            Lifecycle::Crashed
        } else if self.reach {
            Lifecycle::Reached
        } else if !self.movable {
            Lifecycle::Frozen
        } else {
            Lifecycle::Active
        }
    }
}

/// Read-only view of an agent's flags as a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Active,
    Crashed,
    Reached,
    Frozen,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Active => write!(f, "active"),
            Lifecycle::Crashed => write!(f, "crashed"),
            Lifecycle::Reached => write!(f, "reached"),
            Lifecycle::Frozen => write!(f, "frozen"),
        }
    }
}

/// Velocity/steering command for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    pub ctrl_vel: f64,
    pub ctrl_phi: f64,
}

impl Action {
    pub fn new(ctrl_vel: f64, ctrl_phi: f64) -> Self {
        Self { ctrl_vel, ctrl_phi }
    }
}
