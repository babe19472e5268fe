//! Coarse geometric steering toward a target.
//!
//! A bang-bang heuristic for car-like agents: drive straight when the target
//! is nearly on the body axis, otherwise pick one of the four
//! forward/backward × left/right combinations depending on whether the target
//! lies inside the minimum turning circle.

use std::f64::consts::PI;

use crate::rollout::AgentState;

/// Agent position and heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }
}

impl From<&AgentState> for Pose {
    fn from(state: &AgentState) -> Self {
        Self::new(state.x, state.y, state.theta)
    }
}

/// Vehicle geometry used by [`path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringParams {
    pub max_steering_angle: f64,
    pub wheelbase: f64,
    /// Lateral band around the body axis treated as "straight ahead".
    pub stop_dist: f64,
}

impl SteeringParams {
    /// Radius of the tightest turn the vehicle can drive.
    pub fn min_turning_radius(&self) -> f64 {
        self.wheelbase / self.max_steering_angle.tan()
    }
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            max_steering_angle: PI / 6.0,
            wheelbase: 0.3,
            stop_dist: 0.1,
        }
    }
}

/// Discrete command: each component is -1, 0, or 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteerCommand {
    pub vel: f64,
    pub phi: f64,
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Picks a velocity and steering sign that bring `pose` toward `target`.
pub fn path(pose: Pose, target: (f64, f64), params: &SteeringParams) -> SteerCommand {
    let (dx, dy) = (target.0 - pose.x, target.1 - pose.y);
    let (sin, cos) = pose.theta.sin_cos();
    let xt = dx * cos + dy * sin;
    let yt = dy * cos - dx * sin;

    if yt.abs() < params.stop_dist * 0.5 {
        return SteerCommand {
            vel: sign(xt),
            phi: 0.0,
        };
    }

    let min_r = params.min_turning_radius();
    let inside = xt * xt + (yt.abs() - min_r).powi(2) < min_r * min_r;
    // Inside the circle the turn cannot be made directly; back up the other way.
    let vel = if inside ^ (xt < 0.0) { -1.0 } else { 1.0 };
    let phi = if inside ^ (yt < 0.0) { -1.0 } else { 1.0 };
    SteerCommand { vel, phi }
}

/// Ordered `(velocity, steering)` candidates around a preferred command.
///
/// With zero steering the left and right alternatives are the unit turns.
pub fn prefer_vel_list(speed: f64, steering: f64) -> Vec<(f64, f64)> {
    if steering == 0.0 {
        vec![(speed, 0.0), (speed, -1.0), (speed, 1.0)]
    } else {
        vec![(speed, steering), (speed, -steering), (speed, 0.0)]
    }
}
