//! One-time construction of agent properties and the initial state template.

use super::types::{AgentProperty, AgentState};
use crate::scenario::ScenarioConfig;

/// Immutable reference data for every agent in a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceStates {
    properties: Vec<AgentProperty>,
    template: Vec<AgentState>,
}

impl ReferenceStates {
    /// Builds the property list and the initial state template, group by group.
    pub fn build(scenario: &ScenarioConfig) -> Self {
        let properties: Vec<AgentProperty> = scenario.agents().cloned().collect();
        let template = properties.iter().map(AgentState::from_property).collect();
        Self {
            properties,
            template,
        }
    }

    /// Agent properties in scenario order.
    pub fn properties(&self) -> &[AgentProperty] {
        &self.properties
    }

    /// Initial states. Callers receive copies through [`Self::initial_states`].
    pub fn template(&self) -> &[AgentState] {
        &self.template
    }

    /// A fresh, independently owned copy of the initial states.
    pub fn initial_states(&self) -> Vec<AgentState> {
        self.template.clone()
    }

    /// Safety radius per agent.
    pub fn safety_radii(&self) -> Vec<f64> {
        self.properties.iter().map(|p| p.r_safe).collect()
    }

    /// Number of agents in the scenario.
    pub fn agent_count(&self) -> usize {
        self.properties.len()
    }
}
