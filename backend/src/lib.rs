//! Traffic Signal Core - Rust Engine
//!
//! Multi-agent traffic signal control on top of a tick-based traffic
//! simulator, with asynchronous per-intersection decisions.
//!
//! # Architecture
//!
//! - **signal**: phase scheduler and stage transition table
//! - **simulation**: simulator boundary, command line, scripted engine
//! - **metrics**: lane layout, snapshots, differential rewards
//! - **orchestrator**: macro-step synchronization and episode controller
//! - **core**: tick clock
//! - **rng**: deterministic seed stream for episode resets
//! - **models**: episode event log
//!
//! # Critical Invariants
//!
//! 1. A stage change is always preceded by its transition phase
//! 2. Every scheduler is checked and popped exactly once per tick
//! 3. Rewards are only non-zero for agents due for a decision
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod config;
pub mod core;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod signal;
pub mod simulation;

// Re-exports for convenience
pub use config::{ConfigError, SignalEnvConfig};
pub use crate::core::time::TickClock;
pub use metrics::{LaneLayout, MetricsError, MetricsSnapshot, Rewards, UpdateMask};
pub use models::event::{Event, EventLog};
pub use orchestrator::{
    EnvError, EpisodeController, EpisodeState, Observation, SignalCommand, StepInfo, StepOutput,
};
pub use rng::SeedRng;
pub use signal::{PhaseCode, PhaseScheduler, ScheduleError, SignalTransitionTable, Stage};
pub use simulation::{ScriptedSimulation, SimulatorError, SumoCommand, TrafficSimulation};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn traffic_signal_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::orchestrator::PySignalEnv>()?;
    Ok(())
}
