//! In-memory scripted simulation
//!
//! A deterministic stand-in for the real engine: intersections and lanes are
//! declared up front, halting counts follow per-lane scripts indexed by tick,
//! and every phase command is recorded. Used for tests and dry runs of the
//! episode loop without a simulator process.

use std::collections::HashMap;

use super::command::flag_value;
use super::{SimulatorError, TrafficSimulation};
use crate::signal::PhaseCode;

const DEFAULT_LANE_LENGTH: f64 = 100.0;
const DEFAULT_LANE_MAX_SPEED: f64 = 13.89;
const DEFAULT_END_TIME: f64 = 3600.0;

/// A phase command received by the scripted engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCommand {
    /// Tick at which the command was issued
    pub tick: usize,
    pub tls_id: String,
    pub phase: PhaseCode,
}

#[derive(Debug, Clone)]
struct ScriptedLane {
    length: f64,
    max_speed: f64,
    halting: Vec<u32>,
    waiting_time: Vec<f64>,
}

impl Default for ScriptedLane {
    fn default() -> Self {
        Self {
            length: DEFAULT_LANE_LENGTH,
            max_speed: DEFAULT_LANE_MAX_SPEED,
            halting: Vec::new(),
            waiting_time: Vec::new(),
        }
    }
}

/// Value of a per-tick script; the last value holds once the script runs out
fn scripted_at<T: Copy + Default>(script: &[T], tick: usize) -> T {
    script
        .get(tick)
        .or_else(|| script.last())
        .copied()
        .unwrap_or_default()
}

/// Deterministic in-memory [`TrafficSimulation`]
///
/// # Example
/// ```
/// use traffic_signal_core_rs::simulation::{ScriptedSimulation, TrafficSimulation};
///
/// let mut sim = ScriptedSimulation::new()
///     .with_traffic_light("J1", &["n_0", "n_1", "n_2"])
///     .with_halting("n_0", vec![0, 2, 5]);
///
/// sim.start(&["sumo".to_string(), "--end".to_string(), "60".to_string()]).unwrap();
/// sim.step().unwrap();
/// assert_eq!(sim.time().unwrap(), 1.0);
/// assert_eq!(sim.lane_halting_number("n_0").unwrap(), 2);
/// assert_eq!(sim.end_time().unwrap(), 60.0);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedSimulation {
    traffic_lights: Vec<(String, Vec<String>)>,
    lanes: HashMap<String, ScriptedLane>,
    running: bool,
    tick: usize,
    step_length: f64,
    end_time: f64,
    fail_step_at: Option<usize>,
    phase_log: Vec<PhaseCommand>,
    start_commands: Vec<Vec<String>>,
    close_count: usize,
}

impl Default for ScriptedSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSimulation {
    pub fn new() -> Self {
        Self {
            traffic_lights: Vec::new(),
            lanes: HashMap::new(),
            running: false,
            tick: 0,
            step_length: 1.0,
            end_time: DEFAULT_END_TIME,
            fail_step_at: None,
            phase_log: Vec::new(),
            start_commands: Vec::new(),
            close_count: 0,
        }
    }

    /// Declare an intersection with its raw controlled-lane list
    ///
    /// Lanes not declared yet get default geometry and no halting vehicles.
    pub fn with_traffic_light(mut self, tls_id: &str, controlled_lanes: &[&str]) -> Self {
        for lane in controlled_lanes {
            self.lanes.entry(lane.to_string()).or_default();
        }
        self.traffic_lights.push((
            tls_id.to_string(),
            controlled_lanes.iter().map(|l| l.to_string()).collect(),
        ));
        self
    }

    /// Set lane geometry
    pub fn with_lane(mut self, lane_id: &str, length: f64, max_speed: f64) -> Self {
        let lane = self.lanes.entry(lane_id.to_string()).or_default();
        lane.length = length;
        lane.max_speed = max_speed;
        self
    }

    /// Halting vehicle count per tick (index 0 = before the first step)
    pub fn with_halting(mut self, lane_id: &str, script: Vec<u32>) -> Self {
        self.lanes.entry(lane_id.to_string()).or_default().halting = script;
        self
    }

    /// Waiting time per tick (index 0 = before the first step)
    pub fn with_waiting_time(mut self, lane_id: &str, script: Vec<f64>) -> Self {
        self.lanes.entry(lane_id.to_string()).or_default().waiting_time = script;
        self
    }

    /// Make `step()` fail once, when the given tick is reached
    ///
    /// The failing call does not advance the clock; the next one succeeds.
    pub fn with_step_failure_at(mut self, tick: usize) -> Self {
        self.fail_step_at = Some(tick);
        self
    }

    /// Ticks executed in the current session
    pub fn current_tick(&self) -> usize {
        self.tick
    }

    /// Every phase command received in the current session
    pub fn phase_log(&self) -> &[PhaseCommand] {
        &self.phase_log
    }

    /// Command lines of every session started so far
    pub fn start_commands(&self) -> &[Vec<String>] {
        &self.start_commands
    }

    /// Number of sessions closed so far
    pub fn close_count(&self) -> usize {
        self.close_count
    }

    fn ensure_running(&self) -> Result<(), SimulatorError> {
        if self.running {
            Ok(())
        } else {
            Err(SimulatorError::NotStarted)
        }
    }

    fn lane(&self, lane_id: &str) -> Result<&ScriptedLane, SimulatorError> {
        self.ensure_running()?;
        self.lanes
            .get(lane_id)
            .ok_or_else(|| SimulatorError::UnknownLane(lane_id.to_string()))
    }
}

impl TrafficSimulation for ScriptedSimulation {
    fn start(&mut self, command: &[String]) -> Result<(), SimulatorError> {
        if self.running {
            return Err(SimulatorError::AlreadyStarted);
        }
        if let Some(end) = flag_value(command, "--end") {
            self.end_time = end
                .parse()
                .map_err(|_| SimulatorError::Engine(format!("Invalid --end value '{}'", end)))?;
        }
        self.running = true;
        self.tick = 0;
        self.phase_log.clear();
        self.start_commands.push(command.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<(), SimulatorError> {
        self.ensure_running()?;
        self.running = false;
        self.close_count += 1;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn step(&mut self) -> Result<(), SimulatorError> {
        self.ensure_running()?;
        if self.fail_step_at == Some(self.tick) {
            self.fail_step_at = None;
            return Err(SimulatorError::Engine(format!(
                "scripted failure at tick {}",
                self.tick
            )));
        }
        self.tick += 1;
        Ok(())
    }

    fn time(&self) -> Result<f64, SimulatorError> {
        self.ensure_running()?;
        Ok(self.tick as f64 * self.step_length)
    }

    fn end_time(&self) -> Result<f64, SimulatorError> {
        self.ensure_running()?;
        Ok(self.end_time)
    }

    fn traffic_light_ids(&self) -> Result<Vec<String>, SimulatorError> {
        self.ensure_running()?;
        Ok(self.traffic_lights.iter().map(|(id, _)| id.clone()).collect())
    }

    fn controlled_lanes(&self, tls_id: &str) -> Result<Vec<String>, SimulatorError> {
        self.ensure_running()?;
        self.traffic_lights
            .iter()
            .find(|(id, _)| id == tls_id)
            .map(|(_, lanes)| lanes.clone())
            .ok_or_else(|| SimulatorError::UnknownTrafficLight(tls_id.to_string()))
    }

    fn set_phase(&mut self, tls_id: &str, phase: PhaseCode) -> Result<(), SimulatorError> {
        self.ensure_running()?;
        if !self.traffic_lights.iter().any(|(id, _)| id == tls_id) {
            return Err(SimulatorError::UnknownTrafficLight(tls_id.to_string()));
        }
        self.phase_log.push(PhaseCommand {
            tick: self.tick,
            tls_id: tls_id.to_string(),
            phase,
        });
        Ok(())
    }

    fn stage_index(&self, tls_id: &str) -> Result<i32, SimulatorError> {
        self.ensure_running()?;
        if !self.traffic_lights.iter().any(|(id, _)| id == tls_id) {
            return Err(SimulatorError::UnknownTrafficLight(tls_id.to_string()));
        }
        Ok(self
            .phase_log
            .iter()
            .rev()
            .find(|cmd| cmd.tls_id == tls_id)
            .map_or(-1, |cmd| cmd.phase as i32))
    }

    fn lane_halting_number(&self, lane_id: &str) -> Result<u32, SimulatorError> {
        Ok(scripted_at(&self.lane(lane_id)?.halting, self.tick))
    }

    fn lane_length(&self, lane_id: &str) -> Result<f64, SimulatorError> {
        Ok(self.lane(lane_id)?.length)
    }

    fn lane_max_speed(&self, lane_id: &str) -> Result<f64, SimulatorError> {
        Ok(self.lane(lane_id)?.max_speed)
    }

    fn lane_waiting_time(&self, lane_id: &str) -> Result<f64, SimulatorError> {
        Ok(scripted_at(&self.lane(lane_id)?.waiting_time, self.tick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd() -> Vec<String> {
        vec!["sumo".to_string()]
    }

    #[test]
    fn test_queries_require_running_session() {
        let sim = ScriptedSimulation::new().with_traffic_light("J1", &["a"]);
        assert_eq!(sim.time(), Err(SimulatorError::NotStarted));
        assert_eq!(sim.lane_length("a"), Err(SimulatorError::NotStarted));
    }

    #[test]
    fn test_double_start_rejected() {
        let mut sim = ScriptedSimulation::new();
        sim.start(&cmd()).unwrap();
        assert_eq!(sim.start(&cmd()), Err(SimulatorError::AlreadyStarted));
    }

    #[test]
    fn test_halting_script_holds_last_value() {
        let mut sim = ScriptedSimulation::new()
            .with_traffic_light("J1", &["a"])
            .with_halting("a", vec![1, 4]);
        sim.start(&cmd()).unwrap();
        for _ in 0..5 {
            sim.step().unwrap();
        }
        assert_eq!(sim.lane_halting_number("a").unwrap(), 4);
    }

    #[test]
    fn test_restart_rewinds_clock_and_phase_log() {
        let mut sim = ScriptedSimulation::new().with_traffic_light("J1", &["a"]);
        sim.start(&cmd()).unwrap();
        sim.step().unwrap();
        sim.set_phase("J1", 3).unwrap();
        sim.close().unwrap();
        sim.start(&cmd()).unwrap();

        assert_eq!(sim.time().unwrap(), 0.0);
        assert!(sim.phase_log().is_empty());
        assert_eq!(sim.close_count(), 1);
        assert_eq!(sim.start_commands().len(), 2);
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let mut sim = ScriptedSimulation::new().with_traffic_light("J1", &["a"]);
        sim.start(&cmd()).unwrap();
        assert!(matches!(sim.set_phase("J9", 0), Err(SimulatorError::UnknownTrafficLight(_))));
        assert!(matches!(sim.lane_max_speed("zz"), Err(SimulatorError::UnknownLane(_))));
    }

    #[test]
    fn test_step_failure_injection() {
        let mut sim = ScriptedSimulation::new().with_step_failure_at(2);
        sim.start(&cmd()).unwrap();
        sim.step().unwrap();
        sim.step().unwrap();
        assert!(matches!(sim.step(), Err(SimulatorError::Engine(_))));
        assert_eq!(sim.current_tick(), 2);

        sim.step().unwrap();
        assert_eq!(sim.current_tick(), 3);
    }

    #[test]
    fn test_stage_index_reports_last_phase_set() {
        let mut sim = ScriptedSimulation::new()
            .with_traffic_light("J1", &["a"])
            .with_traffic_light("J2", &["b"]);
        sim.start(&cmd()).unwrap();
        assert_eq!(sim.stage_index("J1").unwrap(), -1);

        sim.set_phase("J1", 2).unwrap();
        sim.set_phase("J2", 5).unwrap();
        sim.step().unwrap();
        sim.set_phase("J1", 17).unwrap();

        assert_eq!(sim.stage_index("J1").unwrap(), 17);
        assert_eq!(sim.stage_index("J2").unwrap(), 5);
        assert!(matches!(
            sim.stage_index("J9"),
            Err(SimulatorError::UnknownTrafficLight(_))
        ));
    }
}
