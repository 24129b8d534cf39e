//! Event logging for episode replay and auditing.
//!
//! The episode controller records every significant decision here:
//! - **EpisodeStarted**: simulator session (re)launched
//! - **CommandAccepted**: an agent's stage/duration command was queued
//! - **MacroStepCompleted**: the tick loop stopped at a decision point
//! - **EpisodeFinished**: the horizon was reached
//!
//! # Example
//!
//! ```rust
//! use traffic_signal_core_rs::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::CommandAccepted {
//!     tick: 0,
//!     agent: 1,
//!     tls_id: "J2".to_string(),
//!     stage: 3,
//!     duration: 10,
//!     transition: None,
//! });
//! assert_eq!(log.events_for_agent(1).len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::signal::PhaseCode;

/// Episode event capturing a state change.
///
/// All events carry the episode tick at which they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Event {
    /// Simulator session started and schedulers rebuilt
    EpisodeStarted {
        tick: usize,
        episode_id: String,
        seed: u32,
        config_hash: String,
        num_agents: usize,
    },

    /// Command queued on an agent's scheduler
    CommandAccepted {
        tick: usize,
        agent: usize,
        tls_id: String,
        stage: u8,
        duration: usize,
        /// Transition phase inserted ahead of the green ticks
        transition: Option<PhaseCode>,
    },

    /// Tick loop stopped
    MacroStepCompleted {
        tick: usize,
        macro_step: usize,
        ticks: usize,
        agents_to_update: Vec<usize>,
        global_reward: i64,
    },

    /// Horizon reached
    EpisodeFinished { tick: usize, macro_steps: usize },

    /// Step aborted after its commands were queued
    EpisodeFailed { tick: usize, reason: String },
}

impl Event {
    /// Get the tick at which this event occurred
    pub fn tick(&self) -> usize {
        match self {
            Event::EpisodeStarted { tick, .. } => *tick,
            Event::CommandAccepted { tick, .. } => *tick,
            Event::MacroStepCompleted { tick, .. } => *tick,
            Event::EpisodeFinished { tick, .. } => *tick,
            Event::EpisodeFailed { tick, .. } => *tick,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::EpisodeStarted { .. } => "episode_started",
            Event::CommandAccepted { .. } => "command_accepted",
            Event::MacroStepCompleted { .. } => "macro_step_completed",
            Event::EpisodeFinished { .. } => "episode_finished",
            Event::EpisodeFailed { .. } => "episode_failed",
        }
    }

    /// Whether this event concerns the given agent
    pub fn involves_agent(&self, agent_index: usize) -> bool {
        match self {
            Event::CommandAccepted { agent, .. } => *agent == agent_index,
            Event::MacroStepCompleted {
                agents_to_update, ..
            } => agents_to_update.contains(&agent_index),
            _ => false,
        }
    }
}

/// Append-only episode event log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific tick
    pub fn events_at_tick(&self, tick: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific agent
    pub fn events_for_agent(&self, agent: usize) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.involves_agent(agent))
            .collect()
    }

    /// Serialize the whole log as a JSON array
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.events)
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
