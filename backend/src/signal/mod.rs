//! Traffic signal control
//!
//! - **transition**: stages, phase codes and the static transition table
//! - **scheduler**: per-intersection phase scheduler

pub mod scheduler;
pub mod transition;

use thiserror::Error;

pub use scheduler::{PhaseScheduler, ScheduleEntry, ScheduleTick};
pub use transition::{PhaseCode, SignalTransitionTable, Stage, NUM_STAGES};

/// Errors raised by the phase scheduler
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Schedule of traffic light '{tls_id}' is empty: no command was ever issued")]
    EmptySchedule { tls_id: String },

    #[error("Invalid stage {stage}: must be in [0, {max}]", max = NUM_STAGES - 1)]
    InvalidStage { stage: i64 },

    #[error("Invalid duration {duration}: must be in [0, {threshold}) ticks")]
    InvalidDuration { duration: i64, threshold: usize },
}
