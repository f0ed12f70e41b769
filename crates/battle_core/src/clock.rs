//! Wall-clock to tick conversion.
//!
//! The simulation itself never reads time; it only counts ticks. A driver
//! that wants real-time playback feeds elapsed wall time into a
//! [`TickClock`] and runs however many whole ticks it yields, carrying the
//! sub-tick remainder forward.

use std::time::Duration;

/// Nominal duration of one simulation tick.
pub const TICK_DURATION_MS: u64 = 1;

/// Accumulates wall time and converts it to whole ticks.
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    carry_micros: u64,
}

impl TickClock {
    /// Create a clock with no accumulated time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add elapsed wall time and return the number of whole ticks it
    /// covers. Sub-tick remainders accumulate across calls.
    pub fn advance(&mut self, elapsed: Duration) -> u64 {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let total = self.carry_micros.saturating_add(micros);
        let tick_micros = TICK_DURATION_MS * 1000;
        let ticks = total / tick_micros;
        self.carry_micros = total % tick_micros;
        ticks
    }

    /// Discard any accumulated remainder.
    pub fn reset(&mut self) {
        self.carry_micros = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_ticks_per_millisecond() {
        let mut clock = TickClock::new();
        assert_eq!(clock.advance(Duration::from_millis(5)), 5);
        assert_eq!(clock.advance(Duration::from_millis(1)), 1);
    }

    #[test]
    fn test_sub_tick_remainder_carries() {
        let mut clock = TickClock::new();
        assert_eq!(clock.advance(Duration::from_micros(600)), 0);
        assert_eq!(clock.advance(Duration::from_micros(600)), 1);
        // 200us left over from the two calls above.
        assert_eq!(clock.advance(Duration::from_micros(800)), 1);
    }

    #[test]
    fn test_reset_discards_remainder() {
        let mut clock = TickClock::new();
        clock.advance(Duration::from_micros(900));
        clock.reset();
        assert_eq!(clock.advance(Duration::from_micros(500)), 0);
    }
}
