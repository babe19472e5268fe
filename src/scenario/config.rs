//! Scenario configuration consumed by the rollout environment.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ScenarioError, ScenarioResult};
use crate::rollout::AgentProperty;

/// How agents and targets are re-placed during and between episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    /// Crashed agents and reached targets are re-drawn uniformly in the field.
    Random,
    /// Agents start from the configured poses; reaching a target freezes the agent.
    Fixed,
}

/// Reward coefficients. Every key is required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardCoef {
    pub crash: f64,
    pub reach: f64,
    pub potential: f64,
    pub time_penalty: f64,
}

/// Axis-aligned field bounds, written `[min_x, max_x, min_y, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct FieldRange {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl FieldRange {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Returns true if `(x, y)` lies inside the field, borders included.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    fn validate(&self) -> ScenarioResult<()> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if finite && self.min_x < self.max_x && self.min_y < self.max_y {
            Ok(())
        } else {
            Err(ScenarioError::InvalidFieldRange {
                min_x: self.min_x,
                max_x: self.max_x,
                min_y: self.min_y,
                max_y: self.max_y,
            })
        }
    }
}

impl From<[f64; 4]> for FieldRange {
    fn from(r: [f64; 4]) -> Self {
        Self::new(r[0], r[1], r[2], r[3])
    }
}

impl From<FieldRange> for [f64; 4] {
    fn from(r: FieldRange) -> Self {
        [r.min_x, r.max_x, r.min_y, r.max_y]
    }
}

/// The `common` section of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonConfig {
    /// Episode ends once the backend clock exceeds this value.
    pub time_limit: f64,
    pub reward_coef: RewardCoef,
    pub reset_mode: ResetMode,
    pub field_range: FieldRange,
}

impl CommonConfig {
    /// Rejects a non-finite time limit or an empty field range.
    pub fn validate(&self) -> ScenarioResult<()> {
        if !self.time_limit.is_finite() {
            return Err(ScenarioError::InvalidTimeLimit(self.time_limit));
        }
        self.field_range.validate()
    }
}

/// A named group of agents, expanded to one property record per agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentGroup {
    pub name: String,
    pub agents: Vec<AgentProperty>,
}

/// Static boundary or obstacle geometry, forwarded untouched to backends.
#[derive(Debug, Clone, PartialEq)]
pub struct Fence {
    pub name: String,
    pub properties: Map<String, Value>,
}

/// A fully parsed and validated scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub common: CommonConfig,
    /// Opaque per-backend agent defaults, if the document has any.
    pub default_agent: Option<Value>,
    /// Agent groups in document order.
    pub agent_groups: Vec<AgentGroup>,
    pub fences: Vec<Fence>,
}

impl ScenarioConfig {
    /// Total number of agents across all groups.
    pub fn agent_count(&self) -> usize {
        self.agent_groups.iter().map(|g| g.agents.len()).sum()
    }

    /// Iterates over every agent property, group by group.
    pub fn agents(&self) -> impl Iterator<Item = &AgentProperty> {
        self.agent_groups.iter().flat_map(|g| g.agents.iter())
    }
}
