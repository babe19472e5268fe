//! Stochastic, collision-aware placement of agent poses and targets.
//!
//! Crashed agents get a fresh uniform pose and reached targets get a fresh
//! uniform position. Each pass retries until every pair of agents is
//! separated by more than the sum of their safety radii, and keeps the last
//! draw when the retry budget runs out.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::AgentState;
use crate::scenario::FieldRange;

/// Result of one reset decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    /// Whether any agent was touched. Drives whether the state is pushed back.
    pub any_reset: bool,
    /// Per agent: eligible for a pose or target reset.
    pub eligible: Vec<bool>,
    /// `None` if no pose was redrawn, otherwise whether separation was achieved.
    pub pose_feasible: Option<bool>,
    /// Same as `pose_feasible`, for targets.
    pub target_feasible: Option<bool>,
}

/// Places agents and targets inside the field with pairwise clearance.
#[derive(Debug)]
pub struct ResetManager {
    field: FieldRange,
    radii: Vec<f64>,
    max_retries: usize,
    rng: StdRng,
    infeasible_placements: usize,
}

impl ResetManager {
    /// Placement attempts per pass before settling for the last draw.
    pub const DEFAULT_RETRIES: usize = 40;

    /// Creates a reset manager for agents with the given safety radii.
    pub fn new(field: FieldRange, radii: Vec<f64>, seed: u64) -> Self {
        Self {
            field,
            radii,
            max_retries: Self::DEFAULT_RETRIES,
            rng: StdRng::seed_from_u64(seed),
            infeasible_placements: 0,
        }
    }

    /// Overrides the number of placement attempts per pass.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Placement attempts per pass before a layout is declared infeasible.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Number of passes that exhausted their retries without a feasible layout.
    pub fn infeasible_placements(&self) -> usize {
        self.infeasible_placements
    }

    /// Decides which agents need a reset and redraws them in place.
    ///
    /// Poses are redrawn for every agent if `force_all`, otherwise only for
    /// crashed ones; targets likewise for reached ones. Separation is checked
    /// across all agents, not only the redrawn ones.
    pub fn decide_and_place(&mut self, states: &mut [AgentState], force_all: bool) -> ResetOutcome {
        debug_assert_eq!(states.len(), self.radii.len());

        let eligible: Vec<bool> = states
            .iter()
            .map(|s| force_all || s.crash || s.reach)
            .collect();

        let pose_idx: Vec<usize> = (0..states.len())
            .filter(|&i| force_all || states[i].crash)
            .collect();
        let pose_feasible = (!pose_idx.is_empty()).then(|| {
            for &i in &pose_idx {
                states[i].crash = false;
                states[i].movable = true;
            }
            self.place(states, &pose_idx, Placement::Pose)
        });

        let target_idx: Vec<usize> = (0..states.len())
            .filter(|&i| force_all || states[i].reach)
            .collect();
        let target_feasible = (!target_idx.is_empty()).then(|| {
            for &i in &target_idx {
                states[i].reach = false;
                states[i].movable = true;
            }
            self.place(states, &target_idx, Placement::Target)
        });

        ResetOutcome {
            any_reset: eligible.iter().any(|e| *e),
            eligible,
            pose_feasible,
            target_feasible,
        }
    }

    /// Redraws the selected agents until the layout is separated.
    fn place(&mut self, states: &mut [AgentState], indices: &[usize], what: Placement) -> bool {
        let mut feasible = self.separated(states, what);
        let mut attempts = 0;
        while attempts < self.max_retries {
            attempts += 1;
            for &i in indices {
                let x = self.rng.gen_range(self.field.min_x..self.field.max_x);
                let y = self.rng.gen_range(self.field.min_y..self.field.max_y);
                match what {
                    Placement::Pose => {
                        states[i].x = x;
                        states[i].y = y;
                        states[i].theta = self.rng.gen_range(0.0..TAU);
                    }
                    Placement::Target => {
                        states[i].target_x = x;
                        states[i].target_y = y;
                    }
                }
            }
            feasible = self.separated(states, what);
            if feasible {
                break;
            }
        }

        if feasible {
            tracing::debug!(?what, agents = indices.len(), attempts, "placed agents");
        } else {
            self.infeasible_placements += 1;
            tracing::warn!(
                ?what,
                agents = indices.len(),
                attempts,
                "no separated layout found, keeping last draw"
            );
        }
        feasible
    }

    fn separated(&self, states: &[AgentState], what: Placement) -> bool {
        for i in 0..states.len() {
            for j in (i + 1)..states.len() {
                let dist = match what {
                    Placement::Pose => states[i].distance_to(&states[j]),
                    Placement::Target => states[i].target_distance_to(&states[j]),
                };
                if dist <= self.radii[i] + self.radii[j] {
                    return false;
                }
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Pose,
    Target,
}
