//! Step outputs handed back to the host
//!
//! Three pure transforms over the metrics of a finished macro-step:
//! [`observation`] (state tensors), rewards (see
//! [`compute_rewards`](crate::metrics::compute_rewards)) and [`info`].

use serde::{Deserialize, Serialize};

use crate::metrics::{lane_queue_diff, MetricsError, MetricsSnapshot, Rewards, UpdateMask};

/// Observation tensors, flat `[agents, lanes_per_agent]` unless noted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub num_agents: usize,
    pub lanes_per_agent: usize,
    pub lane_queue_length: Vec<i32>,
    /// Queue change since the previous macro-step, previous − current
    pub lane_queue_length_diff: Vec<i32>,
    pub lane_length: Vec<f32>,
    pub lane_max_speed: Vec<f32>,
    pub lane_waiting_time: Vec<f32>,
    /// `[agents]`, the simulator's program phase
    pub stage_index: Vec<i32>,
}

/// Per-step info surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub global_reward: f32,
    pub individual_reward: Vec<f32>,
    pub agents_to_update: Vec<bool>,
    pub left_time: Vec<i32>,
    pub done: bool,
    pub elapsed_ticks: usize,
    pub macro_step: usize,
    pub sim_time: f64,
}

/// Everything returned by `reset` and `step`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    pub observation: Observation,
    pub info: StepInfo,
}

/// Progress counters reported alongside the info surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub done: bool,
    pub elapsed_ticks: usize,
    pub macro_step: usize,
    pub sim_time: f64,
}

/// State tensors of the latest snapshot, plus queue changes since `previous`
///
/// # Errors
///
/// `LengthMismatch` if the snapshots disagree on lane slots.
pub fn observation(
    previous: &MetricsSnapshot,
    current: &MetricsSnapshot,
) -> Result<Observation, MetricsError> {
    Ok(Observation {
        num_agents: current.num_agents(),
        lanes_per_agent: current.lanes_per_agent,
        lane_queue_length: current.lane_queue_length.clone(),
        lane_queue_length_diff: lane_queue_diff(previous, current)?,
        lane_length: current.lane_length.clone(),
        lane_max_speed: current.lane_max_speed.clone(),
        lane_waiting_time: current.lane_waiting_time.clone(),
        stage_index: current.stage_index.clone(),
    })
}

/// Split a flat `[agents, width]` tensor into one row per agent
pub fn agent_rows<T: Copy>(flat: &[T], width: usize) -> Vec<Vec<T>> {
    flat.chunks(width.max(1)).map(<[T]>::to_vec).collect()
}

/// Info surface from rewards, mask and left times
pub fn info(rewards: &Rewards, mask: &UpdateMask, left_time: Vec<i32>, progress: Progress) -> StepInfo {
    StepInfo {
        global_reward: rewards.global as f32,
        individual_reward: rewards.individual.iter().map(|&r| r as f32).collect(),
        agents_to_update: mask.as_slice().to_vec(),
        left_time,
        done: progress.done,
        elapsed_ticks: progress.elapsed_ticks,
        macro_step: progress.macro_step,
        sim_time: progress.sim_time,
    }
}
