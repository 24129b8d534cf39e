//! Macro-step synchronization
//!
//! Advances the shared simulation one tick at a time and polls every
//! intersection's scheduler after each tick:
//!
//! ```text
//! loop:
//!   simulation.step()
//!   for every agent: check → apply phase → record decision point → pop
//!   stop if any agent reached a decision point or time ≥ horizon
//! ```
//!
//! Every scheduler is checked and popped on every tick, not only the ones
//! that go idle, so their countdowns stay aligned with simulation ticks.

use crate::core::time::TickClock;
use crate::metrics::UpdateMask;
use crate::signal::PhaseScheduler;
use crate::simulation::TrafficSimulation;

use super::engine::EnvError;

/// How a macro-step ended
#[derive(Debug, Clone, PartialEq)]
pub struct MacroStepOutcome {
    /// Agents that reached a decision point on the terminating tick
    pub update_mask: UpdateMask,
    /// Ticks executed in this macro-step
    pub ticks: usize,
    /// Simulated time after the last tick
    pub sim_time: f64,
    /// The loop stopped because the horizon was reached
    pub reached_horizon: bool,
}

/// Run ticks until an agent is due or the horizon is reached
///
/// Schedulers must already hold commands; the simulation is stepped before
/// the first check.
///
/// # Errors
///
/// Scheduler and simulator errors abort the macro-step immediately.
pub fn run_macro_step<S: TrafficSimulation + ?Sized>(
    sim: &mut S,
    schedulers: &mut [PhaseScheduler],
    horizon: f64,
    clock: &mut TickClock,
) -> Result<MacroStepOutcome, EnvError> {
    let mut update_mask = UpdateMask::none(schedulers.len());
    let mut ticks = 0;

    loop {
        sim.step()?;
        clock.advance_tick();
        ticks += 1;

        for (agent, scheduler) in schedulers.iter_mut().enumerate() {
            let tick = scheduler.check()?;
            if let Some(phase) = tick.apply_phase {
                sim.set_phase(scheduler.tls_id(), phase)?;
            }
            update_mask.set(agent, tick.is_decision_point());
            scheduler.pop();
        }

        let sim_time = sim.time()?;
        let reached_horizon = sim_time >= horizon;
        if update_mask.any() || reached_horizon {
            return Ok(MacroStepOutcome {
                update_mask,
                ticks,
                sim_time,
                reached_horizon,
            });
        }
    }
}
