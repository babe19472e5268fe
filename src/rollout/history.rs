//! Append-only record of a rollout.

use serde::{Deserialize, Serialize};

use super::error::{EnvError, EnvResult};
use super::types::AgentState;

/// One driver iteration: what the backend reported and what was executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry<O, A> {
    /// Backend clock when the state was fetched.
    pub time: f64,
    /// Snapshot of every agent's state, owned by the entry.
    pub states: Vec<AgentState>,
    pub observations: Vec<O>,
    /// Actions sent to the backend after this entry. `None` when the loop
    /// stopped (pause or finish) before executing the decided action.
    pub actions: Option<Vec<A>>,
}

/// Ordered history of a rollout, possibly spanning several paused/resumed
/// calls of the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeHistory<O, A> {
    entries: Vec<HistoryEntry<O, A>>,
}

impl<O, A> EpisodeHistory<O, A> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a snapshot. The states are copied so later mutation of the
    /// live list cannot alter the record.
    pub fn record(&mut self, time: f64, states: &[AgentState], observations: Vec<O>) {
        self.entries.push(HistoryEntry {
            time,
            states: states.to_vec(),
            observations,
            actions: None,
        });
    }

    /// Attaches the executed actions to the most recent entry.
    pub fn record_actions(&mut self, actions: Vec<A>) {
        if let Some(last) = self.entries.last_mut() {
            last.actions = Some(actions);
        }
    }

    /// All entries in recording order.
    pub fn entries(&self) -> &[HistoryEntry<O, A>] {
        &self.entries
    }

    /// Number of recorded state/observation snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries whose actions were executed.
    pub fn action_count(&self) -> usize {
        self.entries.iter().filter(|e| e.actions.is_some()).count()
    }

    /// Timestamps of every entry.
    pub fn times(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.time).collect()
    }

    /// Agents per entry, taken from the first one.
    pub fn agent_count(&self) -> usize {
        self.entries.first().map_or(0, |e| e.states.len())
    }

    /// Drops every entry, e.g. on an episode reset.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Indices that start a transition: an action was executed and a
    /// successor entry exists.
    pub fn transition_starts(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0].actions.is_some())
            .map(|(i, _)| i)
    }

    /// Checks that every entry lists states, observations, and executed
    /// actions for the same number of agents.
    ///
    /// Histories handed in through [`EpisodeHistory::record`] or restored
    /// from elsewhere are not checked on the way in.
    pub fn check_alignment(&self) -> EnvResult<()> {
        let expected = self.agent_count();
        let mismatch = |what, got| EnvError::AgentCountMismatch {
            what,
            expected,
            got,
        };
        for entry in &self.entries {
            if entry.states.len() != expected {
                return Err(mismatch("history state", entry.states.len()));
            }
            if entry.observations.len() != expected {
                return Err(mismatch("history observation", entry.observations.len()));
            }
            if let Some(actions) = &entry.actions {
                if actions.len() != expected {
                    return Err(mismatch("history action", actions.len()));
                }
            }
        }
        Ok(())
    }

    /// Clock difference between entry `index` and its successor.
    ///
    /// Errors if there is no successor or the backend clock did not move
    /// forward.
    pub fn elapsed(&self, index: usize) -> EnvResult<f64> {
        let (Some(current), Some(next)) = (self.entries.get(index), self.entries.get(index + 1))
        else {
            return Err(EnvError::NoSuccessor { index });
        };
        let elapsed = next.time - current.time;
        if elapsed > 0.0 {
            Ok(elapsed)
        } else {
            Err(EnvError::NonPositiveElapsed { index, elapsed })
        }
    }
}

impl<O, A> Default for EpisodeHistory<O, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::AgentProperty;

    fn state() -> AgentState {
        AgentState::from_property(&AgentProperty::new(0.5, (0.0, 0.0, 0.0), (1.0, 0.0)))
    }

    #[test]
    fn recorded_states_are_snapshots() {
        let mut history: EpisodeHistory<(), u8> = EpisodeHistory::new();
        let mut live = vec![state()];
        history.record(0.0, &live, vec![()]);
        live[0].x = 42.0;
        live[0].crash = true;
        assert_eq!(history.entries()[0].states[0].x, 0.0);
        assert!(!history.entries()[0].states[0].crash);
    }

    #[test]
    fn transitions_need_an_action_and_a_successor() {
        let mut history: EpisodeHistory<(), u8> = EpisodeHistory::new();
        history.record(0.0, &[state()], vec![()]);
        history.record_actions(vec![1]);
        history.record(1.0, &[state()], vec![()]);
        // paused: no action executed
        history.record(2.0, &[state()], vec![()]);
        history.record_actions(vec![2]);
        history.record(3.0, &[state()], vec![()]);
        history.record_actions(vec![3]);

        assert_eq!(history.len(), 4);
        assert_eq!(history.action_count(), 3);
        let starts: Vec<usize> = history.transition_starts().collect();
        assert_eq!(starts, [0, 2]);
    }

    #[test]
    fn elapsed_rejects_stalled_clock() {
        let mut history: EpisodeHistory<(), u8> = EpisodeHistory::new();
        history.record(1.0, &[state()], vec![()]);
        history.record(1.5, &[state()], vec![()]);
        history.record(1.5, &[state()], vec![()]);
        assert_eq!(history.elapsed(0), Ok(0.5));
        assert_eq!(
            history.elapsed(1),
            Err(EnvError::NonPositiveElapsed {
                index: 1,
                elapsed: 0.0
            })
        );
    }

    #[test]
    fn elapsed_past_the_end_is_an_error() {
        let mut history: EpisodeHistory<(), u8> = EpisodeHistory::new();
        history.record(0.0, &[state()], vec![()]);
        assert_eq!(history.elapsed(0), Err(EnvError::NoSuccessor { index: 0 }));
        assert_eq!(history.elapsed(7), Err(EnvError::NoSuccessor { index: 7 }));
    }

    #[test]
    fn alignment_catches_short_lists() {
        let mut history: EpisodeHistory<(), u8> = EpisodeHistory::new();
        history.record(0.0, &[state(), state()], vec![(), ()]);
        history.record_actions(vec![1, 2]);
        assert_eq!(history.check_alignment(), Ok(()));

        history.record(1.0, &[state(), state()], vec![()]);
        assert_eq!(
            history.check_alignment(),
            Err(EnvError::AgentCountMismatch {
                what: "history observation",
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn alignment_catches_short_actions() {
        let mut history: EpisodeHistory<(), u8> = EpisodeHistory::new();
        history.record(0.0, &[state(), state()], vec![(), ()]);
        history.record_actions(vec![1]);
        assert!(matches!(
            history.check_alignment(),
            Err(EnvError::AgentCountMismatch { what: "history action", got: 1, .. })
        ));
    }

    #[test]
    fn empty_history() {
        let history: EpisodeHistory<(), u8> = EpisodeHistory::default();
        assert!(history.is_empty());
        assert_eq!(history.agent_count(), 0);
        assert_eq!(history.transition_starts().count(), 0);
    }
}
