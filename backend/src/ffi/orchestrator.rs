//! PyO3 wrapper for the episode controller
//!
//! This module provides the Python interface to the Rust environment.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::simulation::PySimulation;
use super::types::{parse_commands, parse_signal_env_config, step_output_to_py};
use crate::config::SignalEnvConfig;
use crate::orchestrator::EpisodeController;

fn runtime_error(context: &str, err: impl std::fmt::Display) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}: {}", context, err))
}

/// Python wrapper for the Rust episode controller
///
/// # Example (from Python)
///
/// ```python
/// import libsumo
/// from traffic_signal_core_rs import SignalEnv
///
/// env = SignalEnv.new(libsumo, {"yellow_time": 3, "end_time": 3600.0})
/// out = env.reset()
/// while not out["info"]["done"]:
///     n = env.num_agents()
///     out = env.step([0] * n, [10] * n)
/// env.close()
/// ```
#[pyclass(name = "SignalEnv")]
pub struct PySignalEnv {
    inner: EpisodeController<PySimulation>,
}

#[pymethods]
impl PySignalEnv {
    /// Create an environment from a libsumo-like module and a config dict
    ///
    /// # Errors
    ///
    /// Raises ValueError if the configuration is invalid.
    #[staticmethod]
    #[pyo3(signature = (backend, config=None))]
    fn new(backend: Py<PyAny>, config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let rust_config = match config {
            Some(dict) => parse_signal_env_config(dict)?,
            None => SignalEnvConfig::default(),
        };

        let inner = EpisodeController::new(rust_config, PySimulation::new(backend))
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

        Ok(PySignalEnv { inner })
    }

    /// Restart the simulator and return the initial observation/info dict
    fn reset(&mut self, py: Python) -> PyResult<Py<PyDict>> {
        let output = self
            .inner
            .reset()
            .map_err(|e| runtime_error("Reset failed", e))?;
        step_output_to_py(py, &output)
    }

    /// Apply per-agent `(stage, duration)` commands and run one macro-step
    ///
    /// Commands of agents not due for a decision are ignored.
    fn step(&mut self, py: Python, stage: Vec<i64>, duration: Vec<i64>) -> PyResult<Py<PyDict>> {
        let commands = parse_commands(stage, duration)?;
        let output = self
            .inner
            .step(&commands)
            .map_err(|e| runtime_error("Step failed", e))?;
        step_output_to_py(py, &output)
    }

    /// Close the simulator session
    fn close(&mut self) -> PyResult<()> {
        self.inner
            .close()
            .map_err(|e| runtime_error("Close failed", e))
    }

    fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    fn num_agents(&self) -> usize {
        self.inner.num_agents()
    }

    fn state(&self) -> String {
        self.inner.state().to_string()
    }

    fn config_hash(&self) -> String {
        self.inner.config_hash().to_string()
    }

    /// Event log of the current episode as a JSON array
    fn event_log_json(&self) -> PyResult<String> {
        self.inner
            .event_log()
            .to_json()
            .map_err(|e| runtime_error("Event log serialization failed", e))
    }
}
