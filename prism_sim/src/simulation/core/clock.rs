// prism_sim/src/simulation/core/clock.rs

use bevy::prelude::Resource;

/// Simulated time. One host frame is one tick, whatever the wall clock does,
/// so headless and windowed runs of a scenario see the same timestamps.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    /// The tick being simulated. The first tick is 0.
    tick: u64,
    rate_hz: u32,
}

impl SimulationClock {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            tick: 0,
            rate_hz: rate_hz.max(1),
        }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// Seconds since the start of the run: `tick / rate_hz`.
    pub fn timestamp(&self) -> f64 {
        self.tick as f64 / self.rate_hz as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_follows_ticks_not_the_wall_clock() {
        let mut clock = SimulationClock::new(50);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.timestamp(), 0.0);

        for _ in 0..25 {
            clock.advance();
        }
        assert_eq!(clock.tick(), 25);
        assert_eq!(clock.timestamp(), 0.5);
    }
}
