//! Turn clock for the squad simulation.
//!
//! The clock is the single source of round and tick numbers. It is owned by
//! the orchestrator and passed explicitly to anything that needs the time;
//! no component keeps its own counter.
//!
//! # Design Principles
//!
//! - Ticks advance once per logged event and never go backwards.
//! - Rounds start at 1; round 0 means no round has run yet.
//! - All arithmetic is checked (no silent overflow).

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Round counter would overflow.
    #[error("round counter overflow: cannot advance beyond u32::MAX")]
    RoundOverflow,
}

/// Round and tick counters for one simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnClock {
    round: u32,
    tick: u64,
}

impl TurnClock {
    /// A clock before the first round.
    pub const fn new() -> Self {
        Self { round: 0, tick: 0 }
    }

    /// Create a clock from explicit parameters (useful for testing and
    /// resuming a mission).
    pub const fn at(round: u32, tick: u64) -> Self {
        Self { round, tick }
    }

    /// Start the next round. Returns the new round number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::RoundOverflow`] if the round counter would
    /// exceed `u32::MAX`.
    pub fn begin_round(&mut self) -> Result<u32, ClockError> {
        self.round = self.round.checked_add(1).ok_or(ClockError::RoundOverflow)?;
        Ok(self.round)
    }

    /// Advance by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn next_tick(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Current round number.
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_clock_starts_before_round_one() {
        let clock = TurnClock::new();
        assert_eq!(clock.round(), 0);
        assert_eq!(clock.tick(), 0);
    }

    #[test]
    fn rounds_and_ticks_advance_independently() {
        let mut clock = TurnClock::new();
        assert_eq!(clock.begin_round().unwrap(), 1);
        assert_eq!(clock.next_tick().unwrap(), 1);
        assert_eq!(clock.next_tick().unwrap(), 2);
        assert_eq!(clock.begin_round().unwrap(), 2);
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut clock = TurnClock::at(u32::MAX, u64::MAX);
        assert_eq!(clock.next_tick(), Err(ClockError::TickOverflow));
        assert_eq!(clock.begin_round(), Err(ClockError::RoundOverflow));
    }
}
