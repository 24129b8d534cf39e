//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList, etc.)

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::config::SignalEnvConfig;
use crate::orchestrator::output::agent_rows;
use crate::orchestrator::{SignalCommand, StepOutput};

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a field with a default value if missing.
///
/// # Errors
/// Returns error only if type conversion fails (not if field is missing)
///
/// # Example
/// ```ignore
/// let yellow_time: usize = extract_with_default(&py_dict, "yellow_time", 3)?;
/// ```
fn extract_with_default<T>(dict: &Bound<'_, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: for<'py> FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

/// Extract an optional field; `None` values count as missing
fn extract_optional<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    T: for<'py> FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

// ========================================================================
// Configuration Parsers
// ========================================================================

/// Recognized configuration keys
const CONFIG_KEYS: [&str; 14] = [
    "path_to_sumo",
    "net_file",
    "route_file",
    "addition_file",
    "yellow_time",
    "seed",
    "end_time",
    "duration_threshold",
    "lanes_per_agent",
    "max_num_players",
    "lane_stride",
    "lane_offset",
    "reseed_on_reset",
    // accepted for compatibility with host configs; the width is `lanes_per_agent`
    "state_dim",
];

/// Convert Python dict to SignalEnvConfig
///
/// Missing keys take their defaults. `state_dim` is an alias of
/// `lanes_per_agent`.
///
/// # Errors
///
/// Returns PyErr if:
/// - An unknown key is present
/// - Type conversions fail
/// - Values out of valid range
pub fn parse_signal_env_config(py_config: &Bound<'_, PyDict>) -> PyResult<SignalEnvConfig> {
    for key in py_config.keys() {
        let key: String = key.extract()?;
        if !CONFIG_KEYS.contains(&key.as_str()) {
            return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Unknown config field '{}'",
                key
            )));
        }
    }

    let defaults = SignalEnvConfig::default();
    let state_dim: usize = extract_with_default(py_config, "state_dim", defaults.lanes_per_agent)?;

    let config = SignalEnvConfig {
        path_to_sumo: extract_with_default(py_config, "path_to_sumo", defaults.path_to_sumo)?,
        net_file: extract_with_default(py_config, "net_file", defaults.net_file)?,
        route_file: extract_with_default(py_config, "route_file", defaults.route_file)?,
        addition_file: extract_with_default(py_config, "addition_file", defaults.addition_file)?,
        yellow_time: extract_with_default(py_config, "yellow_time", defaults.yellow_time)?,
        seed: extract_with_default(py_config, "seed", defaults.seed)?,
        end_time: extract_with_default(py_config, "end_time", defaults.end_time)?,
        duration_threshold: extract_with_default(
            py_config,
            "duration_threshold",
            defaults.duration_threshold,
        )?,
        lanes_per_agent: extract_with_default(py_config, "lanes_per_agent", state_dim)?,
        max_num_players: extract_optional(py_config, "max_num_players")?,
        lane_stride: extract_with_default(py_config, "lane_stride", defaults.lane_stride)?,
        lane_offset: extract_with_default(py_config, "lane_offset", defaults.lane_offset)?,
        reseed_on_reset: extract_with_default(
            py_config,
            "reseed_on_reset",
            defaults.reseed_on_reset,
        )?,
    };

    config
        .validate()
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
    Ok(config)
}

/// Zip the host's parallel stage/duration arrays into commands
pub fn parse_commands(stage: Vec<i64>, duration: Vec<i64>) -> PyResult<Vec<SignalCommand>> {
    if stage.len() != duration.len() {
        return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "stage has {} entries but duration has {}",
            stage.len(),
            duration.len()
        )));
    }
    Ok(stage
        .into_iter()
        .zip(duration)
        .map(SignalCommand::from)
        .collect())
}

// ========================================================================
// Result Converters
// ========================================================================

/// Convert StepOutput to Python dict
///
/// Returns `{"observation": {...}, "info": {...}}`. Lane tensors are nested
/// lists, one row of `lanes_per_agent` values per agent; per-agent values are
/// flat lists.
pub fn step_output_to_py(py: Python, output: &StepOutput) -> PyResult<Py<PyDict>> {
    let obs = &output.observation;
    let obs_dict = PyDict::new(py);
    obs_dict.set_item("num_agents", obs.num_agents)?;
    obs_dict.set_item("lanes_per_agent", obs.lanes_per_agent)?;
    let width = obs.lanes_per_agent;
    obs_dict.set_item("lane_queue_length", agent_rows(&obs.lane_queue_length, width))?;
    obs_dict.set_item(
        "lane_queue_length_diff",
        agent_rows(&obs.lane_queue_length_diff, width),
    )?;
    obs_dict.set_item("lane_length", agent_rows(&obs.lane_length, width))?;
    obs_dict.set_item("lane_max_speed", agent_rows(&obs.lane_max_speed, width))?;
    obs_dict.set_item("lane_waiting_time", agent_rows(&obs.lane_waiting_time, width))?;
    obs_dict.set_item("stage_index", PyList::new(py, &obs.stage_index)?)?;

    let info = &output.info;
    let info_dict = PyDict::new(py);
    info_dict.set_item("global_reward", info.global_reward)?;
    info_dict.set_item("individual_reward", PyList::new(py, &info.individual_reward)?)?;
    info_dict.set_item("agents_to_update", PyList::new(py, &info.agents_to_update)?)?;
    info_dict.set_item("left_time", PyList::new(py, &info.left_time)?)?;
    info_dict.set_item("done", info.done)?;
    info_dict.set_item("elapsed_ticks", info.elapsed_ticks)?;
    info_dict.set_item("macro_step", info.macro_step)?;
    info_dict.set_item("sim_time", info.sim_time)?;

    let dict = PyDict::new(py);
    dict.set_item("observation", obs_dict)?;
    dict.set_item("info", info_dict)?;
    Ok(dict.into())
}
