//! Time management for an episode
//!
//! The simulation advances in discrete ticks. Consecutive ticks between two
//! decision points form a macro-step. This module keeps both counters.

use serde::{Deserialize, Serialize};

/// Counts simulation ticks and completed macro-steps within one episode
///
/// # Example
/// ```
/// use traffic_signal_core_rs::TickClock;
///
/// let mut clock = TickClock::new();
/// assert_eq!(clock.current_tick(), 0);
///
/// clock.advance_tick();
/// clock.advance_tick();
/// assert_eq!(clock.ticks_in_macro_step(), 2);
///
/// clock.complete_macro_step();
/// assert_eq!(clock.macro_step(), 1);
/// assert_eq!(clock.ticks_in_macro_step(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickClock {
    /// Total ticks elapsed since the episode started
    current_tick: usize,
    /// Number of completed macro-steps
    macro_step: usize,
    /// Tick at which the running macro-step began
    macro_step_start: usize,
}

impl TickClock {
    /// Create a clock at tick 0 with no completed macro-steps
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by one tick
    ///
    /// # Example
    /// ```
    /// use traffic_signal_core_rs::TickClock;
    ///
    /// let mut clock = TickClock::new();
    /// clock.advance_tick();
    /// assert_eq!(clock.current_tick(), 1);
    /// ```
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Close the running macro-step and start the next one at the current tick
    pub fn complete_macro_step(&mut self) {
        self.macro_step += 1;
        self.macro_step_start = self.current_tick;
    }

    /// Get the current tick (total ticks since episode start)
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Get the number of completed macro-steps
    pub fn macro_step(&self) -> usize {
        self.macro_step
    }

    /// Ticks elapsed since the running macro-step began
    pub fn ticks_in_macro_step(&self) -> usize {
        self.current_tick - self.macro_step_start
    }

    /// Rewind to tick 0 (episode reset)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_all_counters() {
        let mut clock = TickClock::new();
        clock.advance_tick();
        clock.complete_macro_step();
        clock.advance_tick();

        clock.reset();
        assert_eq!(clock, TickClock::new());
    }
}
