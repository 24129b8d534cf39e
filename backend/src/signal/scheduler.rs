//! Per-intersection phase scheduler
//!
//! Turns "hold stage X for N ticks" commands into a per-tick queue of signal
//! phases, inserting the transition phase whenever the stage changes, and
//! reports at every tick whether the intersection has reached its next
//! decision point.
//!
//! # Per-tick protocol
//!
//! ```text
//! simulation.step()
//! tick = scheduler.check()?     // apply tick.apply_phase to the simulator
//! scheduler.pop()
//! ```
//!
//! A command of `N` green ticks preceded by `Y` transition ticks is consumed
//! by exactly `Y + N` check/pop rounds; the last round reports
//! `remaining == 0` (decision point). From then on the scheduler idles and
//! keeps reporting a decision point until the next command.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::iter;

use super::transition::{PhaseCode, SignalTransitionTable, Stage};
use super::ScheduleError;

/// One tick's worth of signal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEntry {
    /// Yellow/all-red tick between two different stages
    Transition(PhaseCode),
    /// Green tick of a stage
    Green(Stage),
    /// Terminal sentinel: waiting for a new command
    Idle,
}

impl ScheduleEntry {
    /// Signal program phase shown during this tick
    pub fn phase(&self) -> Option<PhaseCode> {
        match self {
            ScheduleEntry::Transition(code) => Some(*code),
            ScheduleEntry::Green(stage) => Some(stage.green_phase()),
            ScheduleEntry::Idle => None,
        }
    }
}

/// Result of checking the schedule at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTick {
    /// Phase to push to the simulator because a new run of ticks begins
    pub apply_phase: Option<PhaseCode>,
    /// Ticks still queued after this one; 0 means a decision is due now
    pub remaining: usize,
}

impl ScheduleTick {
    /// True when the intersection needs a new command after this tick
    pub fn is_decision_point(&self) -> bool {
        self.remaining == 0
    }
}

/// Transition-safe queue of per-tick phases for one intersection
///
/// # Example
/// ```
/// use traffic_signal_core_rs::signal::{PhaseScheduler, Stage};
///
/// let mut tl = PhaseScheduler::new("J1", 3);
/// tl.set_stage_duration(Stage::new(0).unwrap(), 2);
///
/// let first = tl.check().unwrap();
/// assert_eq!(first.apply_phase, Some(0));
/// assert!(!first.is_decision_point());
/// tl.pop();
///
/// assert!(tl.check().unwrap().is_decision_point());
/// tl.pop();
/// assert_eq!(tl.left_time(), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseScheduler {
    /// Traffic light (intersection) id in the simulator
    tls_id: String,

    /// Transition ticks inserted on every stage change
    yellow_duration: usize,

    /// Last committed stage; `None` until the first command
    previous_stage: Option<Stage>,

    /// Pending ticks, front = current tick; at most one trailing `Idle`
    schedule: VecDeque<ScheduleEntry>,

    /// Phase last pushed to the simulator in the current run
    active_phase: Option<PhaseCode>,

    /// Phase last pushed to the simulator at all; survives new commands
    displayed_phase: Option<PhaseCode>,
}

impl PhaseScheduler {
    /// Create an empty scheduler for one intersection
    pub fn new(tls_id: impl Into<String>, yellow_duration: usize) -> Self {
        Self {
            tls_id: tls_id.into(),
            yellow_duration,
            previous_stage: None,
            schedule: VecDeque::new(),
            active_phase: None,
            displayed_phase: None,
        }
    }

    /// Traffic light id this scheduler drives
    pub fn tls_id(&self) -> &str {
        &self.tls_id
    }

    /// Transition ticks per stage change
    pub fn yellow_duration(&self) -> usize {
        self.yellow_duration
    }

    /// Queue a command: hold `stage` for `duration` green ticks
    ///
    /// When the stage differs from the last committed one, `yellow_duration`
    /// transition ticks are queued first. Returns the transition phase that
    /// was inserted, if any.
    pub fn set_stage_duration(&mut self, stage: Stage, duration: usize) -> Option<PhaseCode> {
        let was_idle = self.is_idle();
        if self.schedule.back() == Some(&ScheduleEntry::Idle) {
            self.schedule.pop_back();
        }
        if was_idle {
            // a fresh run starts; re-issue its phase even if unchanged
            self.active_phase = None;
        }

        let transition = match self.previous_stage {
            Some(previous) if previous != stage => SignalTransitionTable::lookup(previous, stage),
            _ => None,
        };

        if let Some(code) = transition {
            self.schedule
                .extend(iter::repeat(ScheduleEntry::Transition(code)).take(self.yellow_duration));
        }
        self.schedule
            .extend(iter::repeat(ScheduleEntry::Green(stage)).take(duration));
        self.schedule.push_back(ScheduleEntry::Idle);

        self.previous_stage = Some(stage);
        transition
    }

    /// Inspect the entry for the current tick
    ///
    /// Must be followed by exactly one [`pop`](Self::pop) in the same tick.
    ///
    /// An idle tick applies the committed stage's green phase if the
    /// simulator is not showing it yet, e.g. after a zero-duration first
    /// command or a zero-duration stage change.
    ///
    /// # Errors
    ///
    /// `ScheduleError::EmptySchedule` if no command was ever issued.
    pub fn check(&mut self) -> Result<ScheduleTick, ScheduleError> {
        let front = *self
            .schedule
            .front()
            .ok_or_else(|| ScheduleError::EmptySchedule {
                tls_id: self.tls_id.clone(),
            })?;

        let Some(phase) = front.phase() else {
            let green = self.previous_stage.map(Stage::green_phase);
            let apply_phase = if green.is_some() && self.displayed_phase != green {
                self.active_phase = green;
                self.displayed_phase = green;
                green
            } else {
                None
            };
            return Ok(ScheduleTick {
                apply_phase,
                remaining: 0,
            });
        };

        let apply_phase = if self.active_phase != Some(phase) {
            self.active_phase = Some(phase);
            self.displayed_phase = Some(phase);
            Some(phase)
        } else {
            None
        };

        Ok(ScheduleTick {
            apply_phase,
            remaining: self.left_time() - 1,
        })
    }

    /// Consume the current tick's entry
    ///
    /// The idle sentinel is never consumed: an idle scheduler stays idle
    /// until the next command.
    pub fn pop(&mut self) {
        if matches!(self.schedule.front(), Some(entry) if *entry != ScheduleEntry::Idle) {
            self.schedule.pop_front();
        }
    }

    /// Ticks remaining before the next decision point
    pub fn left_time(&self) -> usize {
        match self.schedule.back() {
            Some(ScheduleEntry::Idle) => self.schedule.len() - 1,
            _ => self.schedule.len(),
        }
    }

    /// Last committed stage
    pub fn stage_index(&self) -> Option<Stage> {
        self.previous_stage
    }

    /// True when nothing but the idle sentinel (or nothing at all) is queued
    pub fn is_idle(&self) -> bool {
        self.left_time() == 0
    }

    /// True when no command was issued since creation or the last reset
    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    /// Pending entries, front first
    pub fn entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.schedule.iter()
    }

    /// Forget every queued tick and the committed stage
    pub fn reset(&mut self) {
        self.previous_stage = None;
        self.schedule.clear();
        self.active_phase = None;
        self.displayed_phase = None;
    }
}
