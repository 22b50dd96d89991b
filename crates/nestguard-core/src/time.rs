//! Simulation clock
//!
//! The simulation is tick driven: every call to [`SimClock::step`] advances
//! one fixed timestep.

/// Fixed-timestep simulation clock
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Seconds per tick
    pub fixed_timestep: f32,
    /// Time since simulation start in seconds
    pub total_time: f64,
    /// Number of ticks handed out so far
    pub tick_count: u64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl SimClock {
    pub fn new(fixed_timestep: f32) -> Self {
        Self {
            fixed_timestep,
            total_time: 0.0,
            tick_count: 0,
        }
    }

    /// Advance exactly one tick, returning its delta
    pub fn step(&mut self) -> f32 {
        self.tick_count += 1;
        self.total_time += self.fixed_timestep as f64;
        self.fixed_timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_counts_ticks() {
        let mut clock = SimClock::default();
        let dt = clock.step();
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);
        assert_eq!(clock.tick_count, 1);
    }

    #[test]
    fn test_total_time_accumulates() {
        let mut clock = SimClock::new(0.25);
        for _ in 0..8 {
            clock.step();
        }
        assert_eq!(clock.tick_count, 8);
        assert!((clock.total_time - 2.0).abs() < 1e-9);
    }
}
