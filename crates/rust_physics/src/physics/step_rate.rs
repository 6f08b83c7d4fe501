//! Adaptive fixed-step rate
//!
//! The simulation advances in fixed steps. When a step costs more wall-clock
//! time than it simulates, the rate halves so the accumulator cannot run away;
//! once steps are cheap again the rate climbs back to the ideal.

/// Result of feeding one measurement to [`StepRate::adapt`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateChange {
    /// Rate unchanged
    Steady,
    /// Rate halved to the contained Hz
    Lowered(u32),
    /// Rate doubled to the contained Hz
    Raised(u32),
    /// Steps are too expensive but the rate is already at its floor
    AtFloor,
}

/// Current simulation rate between a floor and the ideal rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRate {
    current_hz: u32,
    ideal_hz: u32,
    min_hz: u32,
}

impl StepRate {
    /// Start at `ideal_hz`; `min_hz` is clamped into `1..=ideal_hz`
    pub fn new(ideal_hz: u32, min_hz: u32) -> Self {
        let ideal_hz = ideal_hz.max(1);
        Self {
            current_hz: ideal_hz,
            ideal_hz,
            min_hz: min_hz.clamp(1, ideal_hz),
        }
    }

    /// Steps per simulated second
    pub const fn hz(&self) -> u32 {
        self.current_hz
    }

    /// Rate the controller climbs back to
    pub const fn ideal_hz(&self) -> u32 {
        self.ideal_hz
    }

    /// Rate the controller never drops below
    pub const fn min_hz(&self) -> u32 {
        self.min_hz
    }

    /// Simulated seconds per step
    #[allow(clippy::cast_precision_loss)]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.current_hz as f32
    }

    /// Adjust the rate from the measured wall-clock cost of one step
    ///
    /// Halves when a step costs more than it simulates. Doubles when a step
    /// would still fit in half of the shorter step it would get.
    pub fn adapt(&mut self, step_cost: f32) -> RateChange {
        let fixed_dt = self.fixed_dt();
        if step_cost > fixed_dt {
            if self.current_hz <= self.min_hz {
                return RateChange::AtFloor;
            }
            self.current_hz = (self.current_hz / 2).max(self.min_hz);
            return RateChange::Lowered(self.current_hz);
        }
        if self.current_hz < self.ideal_hz && step_cost * 4.0 < fixed_dt {
            self.current_hz = (self.current_hz * 2).min(self.ideal_hz);
            return RateChange::Raised(self.current_hz);
        }
        RateChange::Steady
    }

    /// Back to the ideal rate
    pub fn reset(&mut self) {
        self.current_hz = self.ideal_hz;
    }
}
