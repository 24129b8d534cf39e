//! Property tests for scheduling and reward invariants

use proptest::prelude::*;

use traffic_signal_core_rs::metrics::{compute_rewards, MetricsSnapshot, UpdateMask};
use traffic_signal_core_rs::signal::{PhaseScheduler, ScheduleEntry, Stage};

fn snapshot(queues: &[i64]) -> MetricsSnapshot {
    let mut snap = MetricsSnapshot::zeroed(queues.len(), 1);
    snap.agent_queue_length = queues.to_vec();
    snap.global_queue_length = queues.iter().sum();
    snap
}

proptest! {
    /// Each stage change queues exactly `yellow` transition ticks; repeats queue none
    #[test]
    fn prop_transition_ticks_match_stage_changes(
        commands in prop::collection::vec((0i64..8, 0usize..45), 1..20),
        yellow in 1usize..6,
    ) {
        let mut scheduler = PhaseScheduler::new("J1", yellow);
        let mut previous: Option<Stage> = None;

        for (raw_stage, duration) in commands {
            let stage = Stage::new(raw_stage).unwrap();
            let transition = scheduler.set_stage_duration(stage, duration);

            let changed = previous.map_or(false, |p| p != stage);
            prop_assert_eq!(transition.is_some(), changed);

            let transitions = scheduler
                .entries()
                .filter(|e| matches!(e, ScheduleEntry::Transition(_)))
                .count();
            prop_assert_eq!(transitions, if changed { yellow } else { 0 });
            prop_assert_eq!(scheduler.left_time(), transitions + duration);

            // Drain to the decision point
            let mut rounds = 0;
            loop {
                let tick = scheduler.check().unwrap();
                scheduler.pop();
                rounds += 1;
                if tick.is_decision_point() {
                    break;
                }
            }
            prop_assert_eq!(rounds, (transitions + duration).max(1));
            previous = Some(stage);
        }
    }

    /// Left time never increases while a command is held
    #[test]
    fn prop_left_time_non_increasing(
        first in 0i64..8,
        second in 0i64..8,
        duration in 0usize..45,
        yellow in 1usize..6,
    ) {
        let mut scheduler = PhaseScheduler::new("J1", yellow);
        scheduler.set_stage_duration(Stage::new(first).unwrap(), 1);
        scheduler.check().unwrap();
        scheduler.pop();
        scheduler.set_stage_duration(Stage::new(second).unwrap(), duration);

        let mut last = scheduler.left_time();
        for _ in 0..(yellow + duration + 3) {
            scheduler.check().unwrap();
            scheduler.pop();
            prop_assert!(scheduler.left_time() <= last);
            last = scheduler.left_time();
        }
        prop_assert_eq!(last, 0);
    }

    /// Agents outside the update mask never receive a reward
    #[test]
    fn prop_masked_out_rewards_are_zero(
        rows in prop::collection::vec((0i64..200, 0i64..200, any::<bool>()), 1..16),
    ) {
        let previous = snapshot(&rows.iter().map(|r| r.0).collect::<Vec<_>>());
        let current = snapshot(&rows.iter().map(|r| r.1).collect::<Vec<_>>());
        let mask = UpdateMask::from(rows.iter().map(|r| r.2).collect::<Vec<_>>());

        let rewards = compute_rewards(&previous, &current, &mask).unwrap();
        for (i, &(prev, cur, due)) in rows.iter().enumerate() {
            if due {
                prop_assert_eq!(rewards.individual[i], prev - cur);
            } else {
                prop_assert_eq!(rewards.individual[i], 0);
            }
        }
    }

    /// With every agent due, individual rewards sum to the global reward
    #[test]
    fn prop_individual_rewards_sum_to_global(
        rows in prop::collection::vec((0i64..200, 0i64..200), 1..16),
    ) {
        let previous = snapshot(&rows.iter().map(|r| r.0).collect::<Vec<_>>());
        let current = snapshot(&rows.iter().map(|r| r.1).collect::<Vec<_>>());

        let rewards = compute_rewards(&previous, &current, &UpdateMask::all(rows.len())).unwrap();
        prop_assert_eq!(rewards.individual.iter().sum::<i64>(), rewards.global);
    }
}
