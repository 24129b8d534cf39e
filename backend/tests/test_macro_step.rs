//! Macro-step synchronization across asynchronously deciding agents

use traffic_signal_core_rs::orchestrator::{run_macro_step, EnvError};
use traffic_signal_core_rs::signal::{PhaseScheduler, ScheduleError, Stage};
use traffic_signal_core_rs::simulation::{ScriptedSimulation, TrafficSimulation};
use traffic_signal_core_rs::TickClock;

fn stage(index: i64) -> Stage {
    Stage::new(index).unwrap()
}

fn started_sim(ids: &[&str]) -> ScriptedSimulation {
    let mut sim = ids
        .iter()
        .fold(ScriptedSimulation::new(), |sim, id| sim.with_traffic_light(id, &[]));
    sim.start(&["sumo".to_string()]).unwrap();
    sim
}

fn schedulers(ids: &[&str], yellow: usize) -> Vec<PhaseScheduler> {
    ids.iter().map(|id| PhaseScheduler::new(*id, yellow)).collect()
}

#[test]
fn test_first_agent_to_go_idle_ends_macro_step() {
    let mut sim = started_sim(&["J1", "J2"]);
    let mut tls = schedulers(&["J1", "J2"], 3);
    tls[0].set_stage_duration(stage(0), 5);
    tls[1].set_stage_duration(stage(1), 2);

    let mut clock = TickClock::new();
    let outcome = run_macro_step(&mut sim, &mut tls, 3600.0, &mut clock).unwrap();

    assert_eq!(outcome.ticks, 2);
    assert_eq!(outcome.update_mask.as_slice(), &[false, true]);
    assert_eq!(outcome.sim_time, 2.0);
    assert!(!outcome.reached_horizon);

    // The slower agent carries on in the next macro-step untouched
    tls[1].set_stage_duration(stage(1), 10);
    let outcome = run_macro_step(&mut sim, &mut tls, 3600.0, &mut clock).unwrap();
    assert_eq!(outcome.ticks, 3);
    assert_eq!(outcome.update_mask.as_slice(), &[true, false]);
    assert_eq!(clock.current_tick(), 5);
}

#[test]
fn test_simultaneous_decision_points() {
    let mut sim = started_sim(&["J1", "J2", "J3"]);
    let mut tls = schedulers(&["J1", "J2", "J3"], 3);
    tls[0].set_stage_duration(stage(0), 4);
    tls[1].set_stage_duration(stage(2), 4);
    tls[2].set_stage_duration(stage(4), 6);

    let outcome = run_macro_step(&mut sim, &mut tls, 3600.0, &mut TickClock::new()).unwrap();
    assert_eq!(outcome.ticks, 4);
    assert_eq!(outcome.update_mask.as_slice(), &[true, true, false]);
}

#[test]
fn test_phases_pushed_only_on_change() {
    let mut sim = started_sim(&["J1"]);
    let mut tls = schedulers(&["J1"], 2);
    let mut clock = TickClock::new();

    tls[0].set_stage_duration(stage(2), 3);
    run_macro_step(&mut sim, &mut tls, 3600.0, &mut clock).unwrap();
    tls[0].set_stage_duration(stage(6), 2);
    let outcome = run_macro_step(&mut sim, &mut tls, 3600.0, &mut clock).unwrap();
    assert_eq!(outcome.ticks, 4);

    let pushed: Vec<(usize, u32)> = sim
        .phase_log()
        .iter()
        .map(|cmd| (cmd.tick, cmd.phase))
        .collect();
    // green 2 at tick 1, transition 16 at tick 4, green 6 at tick 6
    assert_eq!(pushed, vec![(1, 2), (4, 16), (6, 6)]);
}

#[test]
fn test_horizon_ends_macro_step_without_decision() {
    let mut sim = started_sim(&["J1"]);
    let mut tls = schedulers(&["J1"], 3);
    tls[0].set_stage_duration(stage(0), 44);

    let outcome = run_macro_step(&mut sim, &mut tls, 12.0, &mut TickClock::new()).unwrap();
    assert!(outcome.reached_horizon);
    assert_eq!(outcome.ticks, 12);
    assert!(!outcome.update_mask.any());
    assert_eq!(tls[0].left_time(), 32);
}

#[test]
fn test_decision_on_horizon_tick_reports_both() {
    let mut sim = started_sim(&["J1"]);
    let mut tls = schedulers(&["J1"], 3);
    tls[0].set_stage_duration(stage(0), 5);

    let outcome = run_macro_step(&mut sim, &mut tls, 5.0, &mut TickClock::new()).unwrap();
    assert!(outcome.reached_horizon);
    assert_eq!(outcome.update_mask.as_slice(), &[true]);
}

#[test]
fn test_uncommanded_agent_aborts_step() {
    let mut sim = started_sim(&["J1", "J2"]);
    let mut tls = schedulers(&["J1", "J2"], 3);
    tls[0].set_stage_duration(stage(0), 5);

    let err = run_macro_step(&mut sim, &mut tls, 3600.0, &mut TickClock::new()).unwrap_err();
    assert!(matches!(
        err,
        EnvError::Schedule(ScheduleError::EmptySchedule { ref tls_id }) if tls_id == "J2"
    ));
}

#[test]
fn test_engine_failure_aborts_step() {
    let mut sim = ScriptedSimulation::new()
        .with_traffic_light("J1", &[])
        .with_step_failure_at(3);
    sim.start(&["sumo".to_string()]).unwrap();
    let mut tls = schedulers(&["J1"], 3);
    tls[0].set_stage_duration(stage(0), 10);

    let mut clock = TickClock::new();
    assert!(matches!(
        run_macro_step(&mut sim, &mut tls, 3600.0, &mut clock),
        Err(EnvError::Simulator(_))
    ));
    assert_eq!(clock.current_tick(), 3);
}
