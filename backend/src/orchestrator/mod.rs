//! Orchestrator - episode loop
//!
//! - **engine**: episode controller (reset/step lifecycle)
//! - **sync**: macro-step synchronization over all schedulers
//! - **action**: per-agent commands
//! - **output**: observation and info surfaces
//!
//! See `engine.rs` for the full step pipeline.

pub mod action;
pub mod engine;
pub mod output;
pub mod sync;

pub use action::SignalCommand;
pub use engine::{EnvError, EpisodeController, EpisodeState};
pub use output::{Observation, Progress, StepInfo, StepOutput};
pub use sync::{run_macro_step, MacroStepOutcome};
