//! Differential rewards
//!
//! Rewards are the reduction in halted vehicles between two consecutive
//! macro-step snapshots. The global reward is always computed; an agent's
//! own reward is only credited when it reached a decision point in the
//! macro-step just completed, and is exactly zero otherwise.

use serde::{Deserialize, Serialize};

use super::mask::UpdateMask;
use super::snapshot::MetricsSnapshot;
use super::MetricsError;

/// Rewards for one macro-step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    /// previous global queue − current global queue
    pub global: i64,
    /// previous agent queue − current agent queue for due agents, else 0
    pub individual: Vec<i64>,
}

fn ensure_len(what: &'static str, expected: usize, actual: usize) -> Result<(), MetricsError> {
    if expected == actual {
        Ok(())
    } else {
        Err(MetricsError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}

/// Compare two snapshots under an update mask
///
/// # Example
/// ```
/// use traffic_signal_core_rs::metrics::{compute_rewards, MetricsSnapshot, UpdateMask};
///
/// let mut previous = MetricsSnapshot::zeroed(2, 1);
/// previous.agent_queue_length = vec![4, 6];
/// previous.global_queue_length = 10;
///
/// let mut current = MetricsSnapshot::zeroed(2, 1);
/// current.agent_queue_length = vec![1, 8];
/// current.global_queue_length = 9;
///
/// let rewards = compute_rewards(&previous, &current, &UpdateMask::from(vec![true, false])).unwrap();
/// assert_eq!(rewards.global, 1);
/// assert_eq!(rewards.individual, vec![3, 0]);
/// ```
pub fn compute_rewards(
    previous: &MetricsSnapshot,
    current: &MetricsSnapshot,
    mask: &UpdateMask,
) -> Result<Rewards, MetricsError> {
    ensure_len("update mask vs queue length", current.num_agents(), mask.len())?;
    ensure_len(
        "previous vs current queue length",
        current.num_agents(),
        previous.num_agents(),
    )?;

    let individual = previous
        .agent_queue_length
        .iter()
        .zip(&current.agent_queue_length)
        .zip(mask.as_slice())
        .map(|((prev, cur), &due)| if due { prev - cur } else { 0 })
        .collect();

    Ok(Rewards {
        global: previous.global_queue_length - current.global_queue_length,
        individual,
    })
}

/// Ticks until the next decision per agent: zero for due agents
pub fn left_times(current: &MetricsSnapshot, mask: &UpdateMask) -> Result<Vec<i32>, MetricsError> {
    ensure_len("update mask vs left time", current.left_time.len(), mask.len())?;
    Ok(current
        .left_time
        .iter()
        .zip(mask.as_slice())
        .map(|(&left, &due)| if due { 0 } else { left })
        .collect())
}

/// Per-lane queue change since the previous snapshot (previous − current)
///
/// Positive where a lane drained. Padding slots stay zero.
pub fn lane_queue_diff(
    previous: &MetricsSnapshot,
    current: &MetricsSnapshot,
) -> Result<Vec<i32>, MetricsError> {
    ensure_len(
        "previous vs current lane slots",
        current.lane_queue_length.len(),
        previous.lane_queue_length.len(),
    )?;
    Ok(previous
        .lane_queue_length
        .iter()
        .zip(&current.lane_queue_length)
        .map(|(prev, cur)| prev - cur)
        .collect())
}
