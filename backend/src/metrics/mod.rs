//! Observation and reward metrics
//!
//! - **lanes**: representative-lane filtering and the fixed-width layout
//! - **snapshot**: per-macro-step counters
//! - **aggregator**: simulator → snapshot
//! - **reward**: snapshot pair → differential rewards
//! - **mask**: which agents are due for a decision
//!
//! Aggregation and reward computation are stateless functions over borrowed
//! data; the episode controller owns every snapshot.

pub mod aggregator;
pub mod lanes;
pub mod mask;
pub mod reward;
pub mod snapshot;

use thiserror::Error;

use crate::simulation::SimulatorError;

pub use aggregator::aggregate;
pub use lanes::{representative_lanes, LaneLayout};
pub use mask::UpdateMask;
pub use reward::{compute_rewards, lane_queue_diff, left_times, Rewards};
pub use snapshot::MetricsSnapshot;

/// Errors raised while building metrics
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetricsError {
    #[error("Length mismatch ({what}): expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Traffic light '{tls_id}' has {lanes} representative lanes but tensors hold {width}")]
    LaneOverflow {
        tls_id: String,
        lanes: usize,
        width: usize,
    },

    #[error(transparent)]
    Simulator(#[from] SimulatorError),
}
