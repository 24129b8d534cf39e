//! Environment configuration
//!
//! Every option has a default, so a config can be built from a partial JSON
//! object (or a partial Python dict through the FFI).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::simulation::SumoCommand;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_path_to_sumo() -> String {
    "/usr/bin/sumo".to_string()
}
fn default_net_file() -> String {
    "nets/grid.net.xml".to_string()
}
fn default_route_file() -> String {
    "nets/grid.rou.xml".to_string()
}
fn default_addition_file() -> String {
    "nets/grid.add.xml".to_string()
}
fn default_yellow_time() -> usize {
    3
}
fn default_seed() -> u32 {
    1
}
fn default_end_time() -> f64 {
    3600.0
}
fn default_duration_threshold() -> usize {
    45
}
fn default_lanes_per_agent() -> usize {
    8
}
fn default_lane_stride() -> usize {
    3
}

/// Traffic signal environment configuration
///
/// # Example
/// ```
/// use traffic_signal_core_rs::SignalEnvConfig;
///
/// let config = SignalEnvConfig::from_json(r#"{"yellow_time": 2, "end_time": 600.0}"#).unwrap();
/// assert_eq!(config.yellow_time, 2);
/// assert_eq!(config.duration_threshold, 45);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalEnvConfig {
    /// Simulator binary
    #[serde(default = "default_path_to_sumo")]
    pub path_to_sumo: String,

    #[serde(default = "default_net_file")]
    pub net_file: String,

    #[serde(default = "default_route_file")]
    pub route_file: String,

    #[serde(default = "default_addition_file")]
    pub addition_file: String,

    /// Transition ticks inserted on every stage change
    #[serde(default = "default_yellow_time")]
    pub yellow_time: usize,

    /// Simulator seed of the first episode
    #[serde(default = "default_seed")]
    pub seed: u32,

    /// Episode horizon in simulated seconds
    #[serde(default = "default_end_time")]
    pub end_time: f64,

    /// Upper bound (exclusive) of a command's green duration
    #[serde(default = "default_duration_threshold")]
    pub duration_threshold: usize,

    /// Lane slots per agent in observation tensors
    #[serde(default = "default_lanes_per_agent")]
    pub lanes_per_agent: usize,

    /// Expected number of controlled intersections, checked on reset
    #[serde(default)]
    pub max_num_players: Option<usize>,

    /// Representative-lane sampling stride over the raw controlled lanes
    #[serde(default = "default_lane_stride")]
    pub lane_stride: usize,

    /// Representative-lane sampling offset
    #[serde(default)]
    pub lane_offset: usize,

    /// Draw a fresh simulator seed on every reset after the first
    #[serde(default)]
    pub reseed_on_reset: bool,
}

impl Default for SignalEnvConfig {
    fn default() -> Self {
        Self {
            path_to_sumo: default_path_to_sumo(),
            net_file: default_net_file(),
            route_file: default_route_file(),
            addition_file: default_addition_file(),
            yellow_time: default_yellow_time(),
            seed: default_seed(),
            end_time: default_end_time(),
            duration_threshold: default_duration_threshold(),
            lanes_per_agent: default_lanes_per_agent(),
            max_num_players: None,
            lane_stride: default_lane_stride(),
            lane_offset: 0,
            reseed_on_reset: false,
        }
    }
}

impl SignalEnvConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, path) in [
            ("path_to_sumo", &self.path_to_sumo),
            ("net_file", &self.net_file),
            ("route_file", &self.route_file),
            ("addition_file", &self.addition_file),
        ] {
            if path.is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }
        if self.yellow_time == 0 {
            return Err(ConfigError::Invalid("yellow_time must be > 0".to_string()));
        }
        if !self.end_time.is_finite() || self.end_time <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "end_time must be a positive number, got {}",
                self.end_time
            )));
        }
        if self.duration_threshold == 0 {
            return Err(ConfigError::Invalid("duration_threshold must be > 0".to_string()));
        }
        if self.lanes_per_agent == 0 {
            return Err(ConfigError::Invalid("lanes_per_agent must be > 0".to_string()));
        }
        if self.max_num_players == Some(0) {
            return Err(ConfigError::Invalid("max_num_players must be > 0".to_string()));
        }
        if self.lane_stride == 0 {
            return Err(ConfigError::Invalid("lane_stride must be > 0".to_string()));
        }
        if self.lane_offset >= self.lane_stride {
            return Err(ConfigError::Invalid(format!(
                "lane_offset ({}) must be smaller than lane_stride ({})",
                self.lane_offset, self.lane_stride
            )));
        }
        Ok(())
    }

    /// Simulator command line for an episode using `seed`
    pub fn sumo_command(&self, seed: u32) -> Vec<String> {
        SumoCommand::new(
            &self.path_to_sumo,
            &self.net_file,
            &self.route_file,
            &self.addition_file,
        )
        .seed(seed)
        .end_time(self.end_time)
        .build()
    }

    /// Deterministic SHA256 hash of this config
    ///
    /// Computed over the JSON form with sorted keys, so equal configs hash
    /// equally regardless of field order. Tags episodes in the event log.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        use serde_json::Value;
        use std::collections::BTreeMap;

        fn canonicalize(value: Value) -> Value {
            match value {
                Value::Object(map) => {
                    let sorted: BTreeMap<String, Value> =
                        map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                    Value::Object(sorted.into_iter().collect())
                }
                Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
                other => other,
            }
        }

        let value = canonicalize(serde_json::to_value(self)?);
        let json = serde_json::to_string(&value)?;

        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}
