//! PyO3 bindings
//!
//! - **types**: dict ↔ Rust conversions
//! - **simulation**: [`TrafficSimulation`](crate::simulation::TrafficSimulation)
//!   over a Python libsumo/traci module
//! - **orchestrator**: the `SignalEnv` class

pub mod orchestrator;
pub mod simulation;
pub mod types;
