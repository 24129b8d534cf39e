//! Per-agent update mask

use serde::{Deserialize, Serialize};

/// Which agents reached a decision point in the macro-step just completed
///
/// # Example
/// ```
/// use traffic_signal_core_rs::metrics::UpdateMask;
///
/// let mut mask = UpdateMask::none(3);
/// assert!(!mask.any());
/// mask.set(1, true);
/// assert_eq!(mask.agents().collect::<Vec<_>>(), vec![1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMask(Vec<bool>);

impl UpdateMask {
    /// Every agent due (episode start)
    pub fn all(num_agents: usize) -> Self {
        Self(vec![true; num_agents])
    }

    /// No agent due
    pub fn none(num_agents: usize) -> Self {
        Self(vec![false; num_agents])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, agent: usize) -> bool {
        self.0.get(agent).copied().unwrap_or(false)
    }

    pub fn set(&mut self, agent: usize, due: bool) {
        self.0[agent] = due;
    }

    /// At least one agent is due
    pub fn any(&self) -> bool {
        self.0.iter().any(|&due| due)
    }

    /// Indices of due agents
    pub fn agents(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &due)| due.then_some(i))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for UpdateMask {
    fn from(flags: Vec<bool>) -> Self {
        Self(flags)
    }
}
