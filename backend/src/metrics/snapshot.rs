//! Per-macro-step metrics snapshot

use serde::{Deserialize, Serialize};

/// Lane and intersection counters read once at the end of a macro-step
///
/// Lane tensors are flat `[agents, lanes_per_agent]`, row-major; slots past
/// an agent's last representative lane are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Width of each agent's row in the lane tensors
    pub lanes_per_agent: usize,

    /// Halted vehicles per lane
    pub lane_queue_length: Vec<i32>,

    /// Lane length in meters
    pub lane_length: Vec<f32>,

    /// Lane speed limit in m/s
    pub lane_max_speed: Vec<f32>,

    /// Waiting time per lane in seconds
    pub lane_waiting_time: Vec<f32>,

    /// Halted vehicles summed over each agent's lanes
    pub agent_queue_length: Vec<i64>,

    /// Halted vehicles summed over all agents
    pub global_queue_length: i64,

    /// Program phase shown per agent, -1 before any was set
    pub stage_index: Vec<i32>,

    /// Ticks until each agent's next decision point
    pub left_time: Vec<i32>,
}

impl MetricsSnapshot {
    /// All-zero snapshot (episode start)
    ///
    /// # Example
    /// ```
    /// use traffic_signal_core_rs::metrics::MetricsSnapshot;
    ///
    /// let snap = MetricsSnapshot::zeroed(2, 8);
    /// assert_eq!(snap.lane_queue_length.len(), 16);
    /// assert_eq!(snap.global_queue_length, 0);
    /// assert_eq!(snap.stage_index, vec![-1, -1]);
    /// ```
    pub fn zeroed(num_agents: usize, lanes_per_agent: usize) -> Self {
        let lanes = num_agents * lanes_per_agent;
        Self {
            lanes_per_agent,
            lane_queue_length: vec![0; lanes],
            lane_length: vec![0.0; lanes],
            lane_max_speed: vec![0.0; lanes],
            lane_waiting_time: vec![0.0; lanes],
            agent_queue_length: vec![0; num_agents],
            global_queue_length: 0,
            stage_index: vec![-1; num_agents],
            left_time: vec![0; num_agents],
        }
    }

    pub fn num_agents(&self) -> usize {
        self.agent_queue_length.len()
    }
}
