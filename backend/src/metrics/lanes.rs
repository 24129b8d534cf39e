//! Representative inbound lanes per intersection
//!
//! The simulator lists one controlled lane per signal link, so an approach
//! lane with three turning movements appears three times, and internal
//! junction lanes (ids starting with `:`) can show up as well. Observations
//! use one representative lane per movement group: every `stride`-th entry
//! starting at `offset`, with internal lanes and repeats removed.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::MetricsError;
use crate::simulation::TrafficSimulation;

/// Prefix of junction-internal lane ids
const INTERNAL_LANE_PREFIX: char = ':';

/// Reduce a raw controlled-lane list to its representative lanes
///
/// # Example
/// ```
/// use traffic_signal_core_rs::metrics::representative_lanes;
///
/// let raw: Vec<String> = ["n_0", "n_0", "n_0", "e_0", "e_0", "e_0"]
///     .iter().map(|s| s.to_string()).collect();
/// assert_eq!(representative_lanes(&raw, 3, 0), vec!["n_0", "e_0"]);
/// ```
pub fn representative_lanes(raw: &[String], stride: usize, offset: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut lanes = Vec::new();
    for lane in raw.iter().skip(offset).step_by(stride.max(1)) {
        if lane.starts_with(INTERNAL_LANE_PREFIX) || !seen.insert(lane.as_str()) {
            continue;
        }
        lanes.push(lane.clone());
    }
    lanes
}

/// Fixed-width lane layout of all controlled intersections
///
/// Agent `i` is the `i`-th traffic light reported by the simulator. Each agent
/// owns `lanes_per_agent` tensor slots; unused slots stay zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneLayout {
    lanes_per_agent: usize,
    tls_ids: Vec<String>,
    lanes: Vec<Vec<String>>,
}

impl LaneLayout {
    /// Build a layout from explicit per-agent lane lists
    ///
    /// # Errors
    ///
    /// `LengthMismatch` if ids and lane lists differ in length,
    /// `LaneOverflow` if an agent has more lanes than `lanes_per_agent`.
    pub fn new(
        tls_ids: Vec<String>,
        lanes: Vec<Vec<String>>,
        lanes_per_agent: usize,
    ) -> Result<Self, MetricsError> {
        if tls_ids.len() != lanes.len() {
            return Err(MetricsError::LengthMismatch {
                what: "traffic light ids vs lane lists",
                expected: tls_ids.len(),
                actual: lanes.len(),
            });
        }
        for (tls_id, agent_lanes) in tls_ids.iter().zip(&lanes) {
            if agent_lanes.len() > lanes_per_agent {
                return Err(MetricsError::LaneOverflow {
                    tls_id: tls_id.clone(),
                    lanes: agent_lanes.len(),
                    width: lanes_per_agent,
                });
            }
        }
        Ok(Self {
            lanes_per_agent,
            tls_ids,
            lanes,
        })
    }

    /// Query the simulator's intersections and filter their lanes
    pub fn discover<S: TrafficSimulation + ?Sized>(
        sim: &S,
        lanes_per_agent: usize,
        stride: usize,
        offset: usize,
    ) -> Result<Self, MetricsError> {
        let tls_ids = sim.traffic_light_ids()?;
        let lanes = tls_ids
            .iter()
            .map(|id| {
                sim.controlled_lanes(id)
                    .map(|raw| representative_lanes(&raw, stride, offset))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tls_ids, lanes, lanes_per_agent)
    }

    pub fn num_agents(&self) -> usize {
        self.tls_ids.len()
    }

    pub fn lanes_per_agent(&self) -> usize {
        self.lanes_per_agent
    }

    pub fn tls_ids(&self) -> &[String] {
        &self.tls_ids
    }

    /// Representative lanes of one agent
    pub fn lanes(&self, agent: usize) -> &[String] {
        &self.lanes[agent]
    }

    /// Flat tensor index of `(agent, lane slot)`
    pub fn slot(&self, agent: usize, lane: usize) -> usize {
        agent * self.lanes_per_agent + lane
    }

    /// Length of a flat `[agents, lanes_per_agent]` tensor
    pub fn tensor_len(&self) -> usize {
        self.num_agents() * self.lanes_per_agent
    }
}
