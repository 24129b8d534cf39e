//! Metrics aggregation
//!
//! Reads lane counters from the simulator for every representative lane and
//! reduces them into a [`MetricsSnapshot`]. Called once per macro-step, after
//! the tick loop exits.

use super::lanes::LaneLayout;
use super::snapshot::MetricsSnapshot;
use super::MetricsError;
use crate::signal::PhaseScheduler;
use crate::simulation::TrafficSimulation;

/// Build the snapshot for the current simulator state
///
/// `schedulers[i]` must drive `layout.tls_ids()[i]`. The stage index is the
/// phase the simulator reports, so it shows transition codes mid-change.
///
/// # Errors
///
/// `LengthMismatch` when the scheduler count differs from the layout's agent
/// count; simulator errors are propagated as-is.
pub fn aggregate<S: TrafficSimulation + ?Sized>(
    sim: &S,
    layout: &LaneLayout,
    schedulers: &[PhaseScheduler],
) -> Result<MetricsSnapshot, MetricsError> {
    if schedulers.len() != layout.num_agents() {
        return Err(MetricsError::LengthMismatch {
            what: "schedulers vs lane layout agents",
            expected: layout.num_agents(),
            actual: schedulers.len(),
        });
    }

    let mut snapshot = MetricsSnapshot::zeroed(layout.num_agents(), layout.lanes_per_agent());

    for (agent, scheduler) in schedulers.iter().enumerate() {
        let mut agent_queue = 0i64;
        for (lane_idx, lane_id) in layout.lanes(agent).iter().enumerate() {
            let slot = layout.slot(agent, lane_idx);
            let halting = sim.lane_halting_number(lane_id)?;

            snapshot.lane_queue_length[slot] = halting as i32;
            snapshot.lane_length[slot] = sim.lane_length(lane_id)? as f32;
            snapshot.lane_max_speed[slot] = sim.lane_max_speed(lane_id)? as f32;
            snapshot.lane_waiting_time[slot] = sim.lane_waiting_time(lane_id)? as f32;
            agent_queue += i64::from(halting);
        }

        snapshot.agent_queue_length[agent] = agent_queue;
        snapshot.stage_index[agent] = sim.stage_index(&layout.tls_ids()[agent])?;
        snapshot.left_time[agent] = scheduler.left_time() as i32;
    }

    snapshot.global_queue_length = snapshot.agent_queue_length.iter().sum();
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Stage;
    use crate::simulation::ScriptedSimulation;

    #[test]
    fn test_sums_per_agent_and_global() {
        let mut sim = ScriptedSimulation::new()
            .with_traffic_light("J1", &["a", "a", "a", "b", "b", "b"])
            .with_traffic_light("J2", &["c", "c", "c"])
            .with_halting("a", vec![2])
            .with_halting("b", vec![3])
            .with_halting("c", vec![7])
            .with_lane("c", 250.0, 20.0);
        sim.start(&["sumo".to_string()]).unwrap();

        let layout = LaneLayout::discover(&sim, 4, 3, 0).unwrap();
        let mut schedulers = vec![PhaseScheduler::new("J1", 3), PhaseScheduler::new("J2", 3)];
        schedulers[1].set_stage_duration(Stage::new(5).unwrap(), 6);
        sim.set_phase("J2", 13).unwrap();

        let snap = aggregate(&sim, &layout, &schedulers).unwrap();
        assert_eq!(snap.lane_queue_length, vec![2, 3, 0, 0, 7, 0, 0, 0]);
        assert_eq!(snap.agent_queue_length, vec![5, 7]);
        assert_eq!(snap.global_queue_length, 12);
        assert_eq!(snap.lane_length[4], 250.0);
        assert_eq!(snap.lane_max_speed[4], 20.0);
        // Engine phase, not the scheduler's committed stage
        assert_eq!(snap.stage_index, vec![-1, 13]);
        assert_eq!(snap.left_time, vec![0, 6]);
    }

    #[test]
    fn test_scheduler_count_must_match_layout() {
        let mut sim = ScriptedSimulation::new().with_traffic_light("J1", &["a"]);
        sim.start(&["sumo".to_string()]).unwrap();
        let layout = LaneLayout::discover(&sim, 4, 3, 0).unwrap();

        let err = aggregate(&sim, &layout, &[]).unwrap_err();
        assert!(matches!(err, MetricsError::LengthMismatch { expected: 1, actual: 0, .. }));
    }
}
