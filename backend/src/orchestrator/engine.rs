//! Episode Controller
//!
//! Owns one simulation session, one phase scheduler per controlled
//! intersection and the two most recent metrics snapshots, and exposes the
//! reset/step contract to the host.
//!
//! # Architecture
//!
//! ```text
//! reset():
//!   close + restart simulator → discover intersections/lanes
//!   → fresh schedulers → zeroed snapshots → Running
//!
//! step(commands):
//! 1. Queue commands for agents due for a decision (all on the first step)
//! 2. Tick until an agent is due or the horizon is reached
//! 3. Aggregate lane metrics once
//! 4. Differential rewards against the previous snapshot
//! 5. Log the macro-step, hand back observation + info
//! ```
//!
//! # Lifecycle
//!
//! `Uninitialized → Ready → Running → Done`. `reset` moves any state to
//! `Running`; `close` (and drop) returns to `Uninitialized`. A step that
//! fails after its commands were queued leaves the episode `Failed` until
//! the next `reset`.
//!
//! # Example
//!
//! ```rust
//! use traffic_signal_core_rs::simulation::ScriptedSimulation;
//! use traffic_signal_core_rs::{EpisodeController, SignalCommand, SignalEnvConfig};
//!
//! let sim = ScriptedSimulation::new()
//!     .with_traffic_light("J1", &["n_0", "n_0", "n_0"])
//!     .with_halting("n_0", vec![4, 3, 2, 1]);
//! let config = SignalEnvConfig { end_time: 100.0, ..Default::default() };
//!
//! let mut env = EpisodeController::new(config, sim).unwrap();
//! env.reset().unwrap();
//!
//! let out = env.step(&[SignalCommand::new(0, 3)]).unwrap();
//! assert_eq!(out.info.elapsed_ticks, 3);
//! assert_eq!(out.info.agents_to_update, vec![true]);
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ConfigError, SignalEnvConfig};
use crate::core::time::TickClock;
use crate::metrics::{
    aggregate, compute_rewards, left_times, LaneLayout, MetricsError, MetricsSnapshot, Rewards,
    UpdateMask,
};
use crate::models::event::{Event, EventLog};
use crate::rng::SeedRng;
use crate::signal::{PhaseScheduler, ScheduleError, Stage};
use crate::simulation::{SimulatorError, TrafficSimulation};

use super::action::SignalCommand;
use super::output::{self, Progress, StepOutput};
use super::sync::run_macro_step;

// ============================================================================
// Errors and state
// ============================================================================

/// Episode-level error; any of these aborts the current step
#[derive(Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Simulator(#[from] SimulatorError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid action for agent {agent}: {source}")]
    InvalidAction {
        agent: usize,
        #[source]
        source: ScheduleError,
    },

    #[error("Simulation has no signal-controlled intersections")]
    NoTrafficLights,

    #[error("Expected {expected} controlled intersections, simulator reports {actual}")]
    AgentCountMismatch { expected: usize, actual: usize },

    #[error("Episode is not running (state: {state})")]
    NotRunning { state: EpisodeState },

    #[error("Episode is done; call reset() first")]
    EpisodeDone,
}

/// Episode lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeState {
    /// No simulator session
    Uninitialized,
    /// Session started and intersections discovered
    Ready,
    /// Accepting steps
    Running,
    /// Horizon reached
    Done,
    /// A step failed mid-way; schedulers and simulator may disagree
    Failed,
}

impl fmt::Display for EpisodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EpisodeState::Uninitialized => "uninitialized",
            EpisodeState::Ready => "ready",
            EpisodeState::Running => "running",
            EpisodeState::Done => "done",
            EpisodeState::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Episode Controller
// ============================================================================

/// Drives one simulation session for a set of asynchronously deciding agents
pub struct EpisodeController<S: TrafficSimulation> {
    config: SignalEnvConfig,
    config_hash: String,

    /// Exclusively owned simulation session
    sim: S,

    state: EpisodeState,

    /// Lane layout discovered at reset
    layout: Option<LaneLayout>,

    /// One scheduler per agent, in layout order
    schedulers: Vec<PhaseScheduler>,

    /// Snapshot of the macro-step before the latest one
    previous_snapshot: MetricsSnapshot,

    /// Snapshot of the latest macro-step; baseline for the next reward
    current_snapshot: MetricsSnapshot,

    /// Agents due for a new command
    update_mask: UpdateMask,

    clock: TickClock,

    /// Simulated time at which the episode ends
    horizon: f64,

    seed_rng: SeedRng,
    episodes_started: usize,
    episode_seed: u32,
    episode_id: Option<Uuid>,

    event_log: EventLog,
}

impl<S: TrafficSimulation> EpisodeController<S> {
    /// Create a controller; no simulator session is started yet
    ///
    /// # Errors
    ///
    /// `EnvError::Config` if the configuration is invalid.
    pub fn new(config: SignalEnvConfig, sim: S) -> Result<Self, EnvError> {
        config.validate()?;
        let config_hash = config.config_hash()?;
        let seed_rng = SeedRng::new(u64::from(config.seed));
        let horizon = config.end_time;
        let episode_seed = config.seed;

        Ok(Self {
            config,
            config_hash,
            sim,
            state: EpisodeState::Uninitialized,
            layout: None,
            schedulers: Vec::new(),
            previous_snapshot: MetricsSnapshot::default(),
            current_snapshot: MetricsSnapshot::default(),
            update_mask: UpdateMask::none(0),
            clock: TickClock::new(),
            horizon,
            seed_rng,
            episodes_started: 0,
            episode_seed,
            episode_id: None,
            event_log: EventLog::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SignalEnvConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// True once simulated time reached the episode horizon
    pub fn is_done(&self) -> bool {
        self.state == EpisodeState::Done
    }

    /// Number of agents (controlled intersections); 0 before the first reset
    pub fn num_agents(&self) -> usize {
        self.schedulers.len()
    }

    pub fn schedulers(&self) -> &[PhaseScheduler] {
        &self.schedulers
    }

    pub fn layout(&self) -> Option<&LaneLayout> {
        self.layout.as_ref()
    }

    pub fn previous_snapshot(&self) -> &MetricsSnapshot {
        &self.previous_snapshot
    }

    pub fn current_snapshot(&self) -> &MetricsSnapshot {
        &self.current_snapshot
    }

    /// Agents that will accept a command on the next step
    pub fn update_mask(&self) -> &UpdateMask {
        &self.update_mask
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Simulator seed of the current episode
    pub fn episode_seed(&self) -> u32 {
        self.episode_seed
    }

    pub fn episode_id(&self) -> Option<Uuid> {
        self.episode_id
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn simulation(&self) -> &S {
        &self.sim
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Restart the simulator and begin a new episode
    ///
    /// Returns the initial output: zero observations, every agent due.
    pub fn reset(&mut self) -> Result<StepOutput, EnvError> {
        self.close()?;

        let seed = self.next_episode_seed();
        self.sim.start(&self.config.sumo_command(seed))?;

        let layout = LaneLayout::discover(
            &self.sim,
            self.config.lanes_per_agent,
            self.config.lane_stride,
            self.config.lane_offset,
        )?;
        if layout.num_agents() == 0 {
            return Err(EnvError::NoTrafficLights);
        }
        if let Some(expected) = self.config.max_num_players {
            if expected != layout.num_agents() {
                return Err(EnvError::AgentCountMismatch {
                    expected,
                    actual: layout.num_agents(),
                });
            }
        }

        self.schedulers = layout
            .tls_ids()
            .iter()
            .map(|id| PhaseScheduler::new(id.clone(), self.config.yellow_time))
            .collect();
        self.horizon = self.resolve_horizon()?;
        self.state = EpisodeState::Ready;

        let num_agents = layout.num_agents();
        self.previous_snapshot = MetricsSnapshot::zeroed(num_agents, layout.lanes_per_agent());
        self.current_snapshot = self.previous_snapshot.clone();
        self.update_mask = UpdateMask::all(num_agents);
        self.clock.reset();
        self.layout = Some(layout);

        let episode_id = Uuid::new_v4();
        self.episode_id = Some(episode_id);
        self.episode_seed = seed;
        self.episodes_started += 1;

        self.event_log.clear();
        self.event_log.log(Event::EpisodeStarted {
            tick: 0,
            episode_id: episode_id.to_string(),
            seed,
            config_hash: self.config_hash.clone(),
            num_agents,
        });

        info!(
            "episode {} started: {} agents, seed {}, horizon {}s",
            episode_id, num_agents, seed, self.horizon
        );

        self.state = EpisodeState::Running;
        self.initial_output()
    }

    /// Close the simulator session, then drop episode state
    pub fn close(&mut self) -> Result<(), EnvError> {
        if self.sim.is_running() {
            self.sim.close()?;
        }
        self.schedulers.clear();
        self.layout = None;
        self.state = EpisodeState::Uninitialized;
        Ok(())
    }

    /// Apply commands and advance to the next decision point
    ///
    /// `commands[i]` belongs to agent `i`. Only agents due for a decision
    /// (every agent on the first step) have their command queued; the
    /// others keep executing their previous command.
    ///
    /// # Errors
    ///
    /// - `NotRunning` / `EpisodeDone` outside the `Running` state
    /// - `Metrics(LengthMismatch)` if `commands.len()` differs from the agent count
    /// - `InvalidAction` if a due agent's command is outside the action space
    /// - scheduler, simulator and metrics errors from the macro-step; these
    ///   leave the episode `Failed` until `reset`
    pub fn step(&mut self, commands: &[SignalCommand]) -> Result<StepOutput, EnvError> {
        match self.state {
            EpisodeState::Running => {}
            EpisodeState::Done => return Err(EnvError::EpisodeDone),
            state => return Err(EnvError::NotRunning { state }),
        }
        if commands.len() != self.schedulers.len() {
            return Err(MetricsError::LengthMismatch {
                what: "commands vs agents",
                expected: self.schedulers.len(),
                actual: commands.len(),
            }
            .into());
        }

        // Validate every due command before touching any scheduler
        let accepted = self
            .update_mask
            .agents()
            .map(|agent| {
                commands[agent]
                    .validate(self.config.duration_threshold)
                    .map(|(stage, duration)| (agent, stage, duration))
                    .map_err(|source| EnvError::InvalidAction { agent, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        match self.advance(accepted) {
            Ok(out) => Ok(out),
            Err(e) => {
                self.state = EpisodeState::Failed;
                self.event_log.log(Event::EpisodeFailed {
                    tick: self.clock.current_tick(),
                    reason: e.to_string(),
                });
                warn!("episode failed at tick {}: {}", self.clock.current_tick(), e);
                Err(e)
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Queue validated commands, run one macro-step and build its output
    fn advance(&mut self, accepted: Vec<(usize, Stage, usize)>) -> Result<StepOutput, EnvError> {
        let tick = self.clock.current_tick();
        for (agent, stage, duration) in accepted {
            let scheduler = &mut self.schedulers[agent];
            let transition = scheduler.set_stage_duration(stage, duration);
            self.event_log.log(Event::CommandAccepted {
                tick,
                agent,
                tls_id: scheduler.tls_id().to_string(),
                stage: stage.into(),
                duration,
                transition,
            });
        }

        let outcome = run_macro_step(
            &mut self.sim,
            &mut self.schedulers,
            self.horizon,
            &mut self.clock,
        )?;

        let layout = self.layout.as_ref().ok_or(EnvError::NotRunning {
            state: self.state,
        })?;
        let snapshot = aggregate(&self.sim, layout, &self.schedulers)?;
        let rewards = compute_rewards(&self.current_snapshot, &snapshot, &outcome.update_mask)?;
        let left_time = left_times(&snapshot, &outcome.update_mask)?;

        self.previous_snapshot = std::mem::replace(&mut self.current_snapshot, snapshot);
        self.update_mask = outcome.update_mask;
        self.clock.complete_macro_step();

        let current_tick = self.clock.current_tick();
        self.event_log.log(Event::MacroStepCompleted {
            tick: current_tick,
            macro_step: self.clock.macro_step(),
            ticks: outcome.ticks,
            agents_to_update: self.update_mask.agents().collect(),
            global_reward: rewards.global,
        });
        debug!(
            "macro-step {} ended at tick {} after {} ticks, due agents {:?}, global reward {}",
            self.clock.macro_step(),
            current_tick,
            outcome.ticks,
            self.update_mask.agents().collect::<Vec<_>>(),
            rewards.global
        );

        if outcome.reached_horizon {
            self.state = EpisodeState::Done;
            self.event_log.log(Event::EpisodeFinished {
                tick: current_tick,
                macro_steps: self.clock.macro_step(),
            });
            info!(
                "episode finished at t={}s after {} macro-steps",
                outcome.sim_time,
                self.clock.macro_step()
            );
        }

        Ok(StepOutput {
            observation: output::observation(&self.previous_snapshot, &self.current_snapshot)?,
            info: output::info(
                &rewards,
                &self.update_mask,
                left_time,
                Progress {
                    done: self.is_done(),
                    elapsed_ticks: current_tick,
                    macro_step: self.clock.macro_step(),
                    sim_time: outcome.sim_time,
                },
            ),
        })
    }

    /// First episode uses the configured seed; later ones may draw a fresh one
    fn next_episode_seed(&mut self) -> u32 {
        if self.episodes_started > 0 && self.config.reseed_on_reset {
            self.seed_rng.next_seed()
        } else {
            self.config.seed
        }
    }

    /// Configured horizon, capped by the engine's own end time when it has one
    fn resolve_horizon(&self) -> Result<f64, EnvError> {
        let engine_end = self.sim.end_time()?;
        if engine_end.is_finite() && engine_end > 0.0 {
            Ok(self.config.end_time.min(engine_end))
        } else {
            Ok(self.config.end_time)
        }
    }

    fn initial_output(&self) -> Result<StepOutput, EnvError> {
        let num_agents = self.schedulers.len();
        let rewards = Rewards {
            global: 0,
            individual: vec![0; num_agents],
        };
        Ok(StepOutput {
            observation: output::observation(&self.current_snapshot, &self.current_snapshot)?,
            info: output::info(
                &rewards,
                &self.update_mask,
                vec![0; num_agents],
                Progress {
                    done: false,
                    elapsed_ticks: 0,
                    macro_step: 0,
                    sim_time: 0.0,
                },
            ),
        })
    }
}

impl<S: TrafficSimulation> Drop for EpisodeController<S> {
    fn drop(&mut self) {
        if self.sim.is_running() {
            if let Err(e) = self.sim.close() {
                warn!("failed to close simulation session on drop: {}", e);
            }
        }
    }
}

// Manual Debug implementation (the simulator need not implement Debug)
impl<S: TrafficSimulation> fmt::Debug for EpisodeController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EpisodeController")
            .field("state", &self.state)
            .field("num_agents", &self.num_agents())
            .field("current_tick", &self.clock.current_tick())
            .field("macro_step", &self.clock.macro_step())
            .field("episode_seed", &self.episode_seed)
            .field("event_count", &self.event_log.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
