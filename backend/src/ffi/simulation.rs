//! Python-backed simulation session
//!
//! Drives any Python object exposing the libsumo/traci module API
//! (`start`, `close`, `simulation.*`, `trafficlight.*`, `lane.*`). Python
//! exceptions surface as [`SimulatorError::Engine`].

use pyo3::prelude::*;

use crate::signal::PhaseCode;
use crate::simulation::{SimulatorError, TrafficSimulation};

fn engine_error(err: PyErr) -> SimulatorError {
    SimulatorError::Engine(err.to_string())
}

/// [`TrafficSimulation`] over a libsumo-compatible Python module
pub struct PySimulation {
    backend: Py<PyAny>,
    running: bool,
}

impl PySimulation {
    pub fn new(backend: Py<PyAny>) -> Self {
        Self {
            backend,
            running: false,
        }
    }

    fn ensure_running(&self) -> Result<(), SimulatorError> {
        if self.running {
            Ok(())
        } else {
            Err(SimulatorError::NotStarted)
        }
    }

    /// Call `backend.<domain>.<method>()` and extract the result
    fn query<T>(&self, domain: &str, method: &str) -> Result<T, SimulatorError>
    where
        T: for<'py> FromPyObject<'py>,
    {
        self.ensure_running()?;
        Python::with_gil(|py| {
            self.backend
                .bind(py)
                .getattr(domain)?
                .call_method0(method)?
                .extract()
        })
        .map_err(engine_error)
    }

    /// Call `backend.<domain>.<method>(id)` and extract the result
    fn query_id<T>(&self, domain: &str, method: &str, id: &str) -> Result<T, SimulatorError>
    where
        T: for<'py> FromPyObject<'py>,
    {
        self.ensure_running()?;
        Python::with_gil(|py| {
            self.backend
                .bind(py)
                .getattr(domain)?
                .call_method1(method, (id,))?
                .extract()
        })
        .map_err(engine_error)
    }
}

impl TrafficSimulation for PySimulation {
    fn start(&mut self, command: &[String]) -> Result<(), SimulatorError> {
        if self.running {
            return Err(SimulatorError::AlreadyStarted);
        }
        Python::with_gil(|py| {
            self.backend
                .bind(py)
                .call_method1("start", (command.to_vec(),))
                .map(|_| ())
        })
        .map_err(engine_error)?;
        self.running = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SimulatorError> {
        self.ensure_running()?;
        self.running = false;
        Python::with_gil(|py| self.backend.bind(py).call_method0("close").map(|_| ()))
            .map_err(engine_error)
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn step(&mut self) -> Result<(), SimulatorError> {
        self.ensure_running()?;
        Python::with_gil(|py| {
            self.backend
                .bind(py)
                .getattr("simulation")?
                .call_method0("step")
                .map(|_| ())
        })
        .map_err(engine_error)
    }

    fn time(&self) -> Result<f64, SimulatorError> {
        self.query("simulation", "getTime")
    }

    fn end_time(&self) -> Result<f64, SimulatorError> {
        self.query("simulation", "getEndTime")
    }

    fn traffic_light_ids(&self) -> Result<Vec<String>, SimulatorError> {
        self.query("trafficlight", "getIDList")
    }

    fn controlled_lanes(&self, tls_id: &str) -> Result<Vec<String>, SimulatorError> {
        self.query_id("trafficlight", "getControlledLanes", tls_id)
    }

    fn set_phase(&mut self, tls_id: &str, phase: PhaseCode) -> Result<(), SimulatorError> {
        self.ensure_running()?;
        Python::with_gil(|py| {
            self.backend
                .bind(py)
                .getattr("trafficlight")?
                .call_method1("setPhase", (tls_id, phase))
                .map(|_| ())
        })
        .map_err(engine_error)
    }

    fn stage_index(&self, tls_id: &str) -> Result<i32, SimulatorError> {
        self.query_id("trafficlight", "getPhase", tls_id)
    }

    fn lane_halting_number(&self, lane_id: &str) -> Result<u32, SimulatorError> {
        self.query_id("lane", "getLastStepHaltingNumber", lane_id)
    }

    fn lane_length(&self, lane_id: &str) -> Result<f64, SimulatorError> {
        self.query_id("lane", "getLength", lane_id)
    }

    fn lane_max_speed(&self, lane_id: &str) -> Result<f64, SimulatorError> {
        self.query_id("lane", "getMaxSpeed", lane_id)
    }

    fn lane_waiting_time(&self, lane_id: &str) -> Result<f64, SimulatorError> {
        self.query_id("lane", "getWaitingTime", lane_id)
    }
}
