//! Stage-to-stage transition table
//!
//! Switching an intersection from one stage to a different one requires an
//! intermediate yellow/all-red phase. The phase code for every ordered pair
//! of stages is fixed by the signal program shipped with the network, so it
//! lives here as a constant table.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ScheduleError;

/// Number of stages in the signal program
pub const NUM_STAGES: usize = 8;

/// Low-level signal program phase index (`setPhase` argument)
pub type PhaseCode = u32;

/// Diagonal marker: a stage never transitions to itself
const NO_TRANSITION: i32 = -1;

/// Transition phase codes indexed by `[previous stage][next stage]`
///
/// Green phases occupy codes 0..=7 (one per stage); transition phases start
/// at 8.
const TRANSITION_PHASES: [[i32; NUM_STAGES]; NUM_STAGES] = [
    [-1, 8, 8, 8, 9, 8, 10, 8],
    [11, -1, 11, 11, 11, 12, 11, 13],
    [14, 14, -1, 14, 15, 14, 16, 14],
    [17, 17, 17, -1, 17, 18, 17, 19],
    [20, 22, 21, 22, -1, 22, 22, 22],
    [23, 24, 23, 25, 23, -1, 23, 23],
    [26, 27, 28, 27, 27, 27, -1, 27],
    [29, 30, 29, 31, 29, 29, 29, -1],
];

/// A legal combination of green movements at one intersection (0..=7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Stage(u8);

impl Stage {
    /// Validate a raw stage index
    ///
    /// # Example
    /// ```
    /// use traffic_signal_core_rs::signal::Stage;
    ///
    /// assert!(Stage::new(7).is_ok());
    /// assert!(Stage::new(8).is_err());
    /// assert!(Stage::new(-1).is_err());
    /// ```
    pub fn new(index: i64) -> Result<Self, ScheduleError> {
        if (0..NUM_STAGES as i64).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(ScheduleError::InvalidStage { stage: index })
        }
    }

    /// Stage index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Green phase code of this stage
    pub fn green_phase(self) -> PhaseCode {
        self.0 as PhaseCode
    }
}

impl TryFrom<i64> for Stage {
    type Error = ScheduleError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        Stage::new(index)
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.0
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static lookup of the transition phase between two stages
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalTransitionTable;

impl SignalTransitionTable {
    /// Transition phase required to go from `previous` to `next`
    ///
    /// Returns `None` when the stages are equal (no transition needed).
    ///
    /// # Example
    /// ```
    /// use traffic_signal_core_rs::signal::{SignalTransitionTable, Stage};
    ///
    /// let s0 = Stage::new(0).unwrap();
    /// let s4 = Stage::new(4).unwrap();
    /// assert_eq!(SignalTransitionTable::lookup(s0, s4), Some(9));
    /// assert_eq!(SignalTransitionTable::lookup(s4, s4), None);
    /// ```
    pub fn lookup(previous: Stage, next: Stage) -> Option<PhaseCode> {
        let code = TRANSITION_PHASES[previous.index()][next.index()];
        if code == NO_TRANSITION {
            None
        } else {
            Some(code as PhaseCode)
        }
    }
}
