//! Per-agent commands from the learner

use serde::{Deserialize, Serialize};

use crate::signal::{ScheduleError, Stage};

/// Raw `(stage, duration)` command for one agent, as sent by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCommand {
    pub stage: i64,
    pub duration: i64,
}

impl SignalCommand {
    pub fn new(stage: i64, duration: i64) -> Self {
        Self { stage, duration }
    }

    /// Check the command against the action space
    ///
    /// Valid commands have `stage` in `[0, 7]` and `duration` in
    /// `[0, duration_threshold - 1]`.
    ///
    /// # Example
    /// ```
    /// use traffic_signal_core_rs::SignalCommand;
    ///
    /// assert!(SignalCommand::new(3, 44).validate(45).is_ok());
    /// assert!(SignalCommand::new(3, 45).validate(45).is_err());
    /// assert!(SignalCommand::new(8, 0).validate(45).is_err());
    /// ```
    pub fn validate(&self, duration_threshold: usize) -> Result<(Stage, usize), ScheduleError> {
        let stage = Stage::new(self.stage)?;
        if self.duration < 0 || self.duration as u64 >= duration_threshold as u64 {
            return Err(ScheduleError::InvalidDuration {
                duration: self.duration,
                threshold: duration_threshold,
            });
        }
        Ok((stage, self.duration as usize))
    }
}

impl From<(i64, i64)> for SignalCommand {
    fn from((stage, duration): (i64, i64)) -> Self {
        Self { stage, duration }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_of_action_space() {
        assert_eq!(
            SignalCommand::new(0, 0).validate(45).unwrap(),
            (Stage::new(0).unwrap(), 0)
        );
        assert_eq!(
            SignalCommand::new(7, 44).validate(45).unwrap(),
            (Stage::new(7).unwrap(), 44)
        );
        assert_eq!(
            SignalCommand::new(-1, 10).validate(45),
            Err(ScheduleError::InvalidStage { stage: -1 })
        );
        assert_eq!(
            SignalCommand::new(2, -1).validate(45),
            Err(ScheduleError::InvalidDuration {
                duration: -1,
                threshold: 45
            })
        );
        assert_eq!(
            SignalCommand::new(2, 45).validate(45),
            Err(ScheduleError::InvalidDuration {
                duration: 45,
                threshold: 45
            })
        );
    }

    #[test]
    fn test_from_tuple() {
        assert_eq!(SignalCommand::from((3, 12)), SignalCommand::new(3, 12));
    }
}
