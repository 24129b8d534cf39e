//! Simulation engine boundary
//!
//! The traffic simulator (SUMO) is an external collaborator. Everything this
//! crate needs from it is captured by [`TrafficSimulation`]: session
//! lifecycle, tick advance, and the handful of traffic light and lane queries
//! used to build observations.
//!
//! All calls are synchronous and may block for as long as the engine takes;
//! there is no timeout at this layer.

pub mod command;
pub mod scripted;

use thiserror::Error;

use crate::signal::PhaseCode;

pub use command::SumoCommand;
pub use scripted::ScriptedSimulation;

/// Errors reported by a simulation session
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulatorError {
    #[error("Simulation session is not running")]
    NotStarted,

    #[error("Simulation session is already running")]
    AlreadyStarted,

    #[error("Unknown traffic light: {0}")]
    UnknownTrafficLight(String),

    #[error("Unknown lane: {0}")]
    UnknownLane(String),

    #[error("Simulation engine error: {0}")]
    Engine(String),
}

/// One simulation session driven tick by tick
pub trait TrafficSimulation {
    /// Launch a session from a full command line (binary first)
    fn start(&mut self, command: &[String]) -> Result<(), SimulatorError>;

    /// Terminate the running session
    fn close(&mut self) -> Result<(), SimulatorError>;

    /// Whether a session is currently open
    fn is_running(&self) -> bool;

    /// Advance the simulation by one tick
    fn step(&mut self) -> Result<(), SimulatorError>;

    /// Current simulated time in seconds
    fn time(&self) -> Result<f64, SimulatorError>;

    /// Configured end of the simulation in seconds
    fn end_time(&self) -> Result<f64, SimulatorError>;

    /// Ids of all signal-controlled intersections, in engine order
    fn traffic_light_ids(&self) -> Result<Vec<String>, SimulatorError>;

    /// Raw controlled-lane list of one intersection (one entry per link)
    fn controlled_lanes(&self, tls_id: &str) -> Result<Vec<String>, SimulatorError>;

    /// Switch an intersection to a signal program phase
    fn set_phase(&mut self, tls_id: &str, phase: PhaseCode) -> Result<(), SimulatorError>;

    /// Program phase an intersection is currently showing, -1 if none was set
    fn stage_index(&self, tls_id: &str) -> Result<i32, SimulatorError>;

    /// Vehicles halted on a lane during the last tick
    fn lane_halting_number(&self, lane_id: &str) -> Result<u32, SimulatorError>;

    /// Lane length in meters
    fn lane_length(&self, lane_id: &str) -> Result<f64, SimulatorError>;

    /// Lane speed limit in m/s
    fn lane_max_speed(&self, lane_id: &str) -> Result<f64, SimulatorError>;

    /// Accumulated waiting time of vehicles on a lane during the last tick
    fn lane_waiting_time(&self, lane_id: &str) -> Result<f64, SimulatorError>;
}
