//! Metrics aggregation and differential rewards

use traffic_signal_core_rs::metrics::{
    aggregate, compute_rewards, lane_queue_diff, left_times, LaneLayout, MetricsError,
    MetricsSnapshot, UpdateMask,
};
use traffic_signal_core_rs::orchestrator::output::observation;
use traffic_signal_core_rs::signal::{PhaseScheduler, Stage};
use traffic_signal_core_rs::simulation::{ScriptedSimulation, TrafficSimulation};

fn snapshot(queues: &[i64], left: &[i32]) -> MetricsSnapshot {
    let mut snap = MetricsSnapshot::zeroed(queues.len(), 2);
    snap.agent_queue_length = queues.to_vec();
    snap.global_queue_length = queues.iter().sum();
    snap.left_time = left.to_vec();
    snap
}

// ============================================================================
// Aggregation
// ============================================================================

#[test]
fn test_aggregate_reads_every_lane_once() {
    let mut sim = ScriptedSimulation::new()
        .with_traffic_light("J1", &["a", "a", "a", "b", "b", "b"])
        .with_halting("a", vec![0, 1, 2, 3])
        .with_halting("b", vec![0, 0, 5, 5])
        .with_waiting_time("a", vec![0.0, 1.0, 2.5])
        .with_lane("b", 80.0, 8.0);
    sim.start(&["sumo".to_string()]).unwrap();
    sim.step().unwrap();
    sim.step().unwrap();

    let layout = LaneLayout::discover(&sim, 3, 3, 0).unwrap();
    let schedulers = vec![PhaseScheduler::new("J1", 3)];
    let snap = aggregate(&sim, &layout, &schedulers).unwrap();

    assert_eq!(snap.lane_queue_length, vec![2, 5, 0]);
    assert_eq!(snap.lane_waiting_time, vec![2.5, 0.0, 0.0]);
    assert_eq!(snap.lane_length, vec![100.0, 80.0, 0.0]);
    assert_eq!(snap.lane_max_speed[1], 8.0);
    assert_eq!(snap.agent_queue_length, vec![7]);
    assert_eq!(snap.global_queue_length, 7);
    assert_eq!(snap.stage_index, vec![-1]);
}

#[test]
fn test_aggregate_reports_engine_phase_and_left_time() {
    let mut sim = ScriptedSimulation::new().with_traffic_light("J1", &["a"]);
    sim.start(&["sumo".to_string()]).unwrap();
    let layout = LaneLayout::discover(&sim, 1, 3, 0).unwrap();

    let mut scheduler = PhaseScheduler::new("J1", 3);
    scheduler.set_stage_duration(Stage::new(0).unwrap(), 1);
    let tick = scheduler.check().unwrap();
    sim.set_phase("J1", tick.apply_phase.unwrap()).unwrap();
    scheduler.pop();

    // Mid-transition to stage 3: the engine shows the 0 -> 3 yellow
    scheduler.set_stage_duration(Stage::new(3).unwrap(), 2);
    let tick = scheduler.check().unwrap();
    sim.set_phase("J1", tick.apply_phase.unwrap()).unwrap();

    let snap = aggregate(&sim, &layout, &[scheduler]).unwrap();
    assert_eq!(snap.stage_index, vec![8]);
    assert_eq!(snap.left_time, vec![5]);
}

// ============================================================================
// Rewards
// ============================================================================

#[test]
fn test_global_reward_is_queue_reduction() {
    let previous = snapshot(&[10, 5], &[0, 0]);
    let current = snapshot(&[4, 7], &[0, 0]);
    let rewards = compute_rewards(&previous, &current, &UpdateMask::all(2)).unwrap();

    assert_eq!(rewards.global, 4);
    assert_eq!(rewards.individual, vec![6, -2]);
}

#[test]
fn test_unmasked_agents_get_exactly_zero() {
    let previous = snapshot(&[10, 5, 3], &[0, 0, 0]);
    let current = snapshot(&[4, 7, 0], &[0, 0, 0]);
    let mask = UpdateMask::from(vec![false, true, false]);
    let rewards = compute_rewards(&previous, &current, &mask).unwrap();

    assert_eq!(rewards.individual, vec![0, -2, 0]);
    // Global reward ignores the mask
    assert_eq!(rewards.global, 7);
}

#[test]
fn test_unchanged_queues_give_zero_reward() {
    let snap = snapshot(&[3, 3], &[0, 0]);
    let rewards = compute_rewards(&snap, &snap, &UpdateMask::all(2)).unwrap();
    assert_eq!(rewards.global, 0);
    assert_eq!(rewards.individual, vec![0, 0]);
}

#[test]
fn test_mask_length_mismatch_is_fatal() {
    let snap = snapshot(&[1, 2], &[0, 0]);
    let err = compute_rewards(&snap, &snap, &UpdateMask::all(3)).unwrap_err();
    assert!(matches!(
        err,
        MetricsError::LengthMismatch {
            expected: 2,
            actual: 3,
            ..
        }
    ));
}

#[test]
fn test_snapshot_length_mismatch_is_fatal() {
    let previous = snapshot(&[1], &[0]);
    let current = snapshot(&[1, 2], &[0, 0]);
    assert!(compute_rewards(&previous, &current, &UpdateMask::all(2)).is_err());
}

#[test]
fn test_left_time_zero_for_due_agents() {
    let current = snapshot(&[0, 0, 0], &[0, 4, 9]);
    let mask = UpdateMask::from(vec![true, false, false]);
    assert_eq!(left_times(&current, &mask).unwrap(), vec![0, 4, 9]);

    let all_due = UpdateMask::all(3);
    assert_eq!(left_times(&current, &all_due).unwrap(), vec![0, 0, 0]);
}

// ============================================================================
// Lane queue change
// ============================================================================

#[test]
fn test_lane_queue_diff_is_previous_minus_current() {
    let mut previous = MetricsSnapshot::zeroed(2, 2);
    previous.lane_queue_length = vec![6, 2, 0, 3];
    let mut current = MetricsSnapshot::zeroed(2, 2);
    current.lane_queue_length = vec![4, 5, 0, 0];

    assert_eq!(lane_queue_diff(&previous, &current).unwrap(), vec![2, -3, 0, 3]);

    let obs = observation(&previous, &current).unwrap();
    assert_eq!(obs.lane_queue_length, vec![4, 5, 0, 0]);
    assert_eq!(obs.lane_queue_length_diff, vec![2, -3, 0, 3]);
}

#[test]
fn test_lane_queue_diff_rejects_mismatched_layouts() {
    let err = observation(&MetricsSnapshot::zeroed(1, 2), &MetricsSnapshot::zeroed(2, 2))
        .unwrap_err();
    assert!(matches!(
        err,
        MetricsError::LengthMismatch {
            expected: 4,
            actual: 2,
            ..
        }
    ));
}
