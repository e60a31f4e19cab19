/// Upper bound on ticks run for a single host frame.
pub const MAX_STEPS_PER_FRAME: u32 = 10;

/// Fixed-step frame pacer.
/// Turns variable browser frame deltas (milliseconds) into whole nominal
/// ticks, so the simulation advances at the same rate on 60 Hz and 144 Hz
/// displays.
#[derive(Debug, Clone)]
pub struct FramePacer {
    /// Length of one nominal tick in milliseconds.
    step_ms: f64,
    /// Real time not yet consumed by a tick.
    accumulator_ms: f64,
}

impl FramePacer {
    pub fn new(step_ms: f64) -> Self {
        Self {
            step_ms,
            accumulator_ms: 0.0,
        }
    }

    /// Pacer for a nominal frame rate (e.g. 60 → 16.67 ms steps).
    pub fn from_frame_rate(frame_rate: f64) -> Self {
        Self::new(1000.0 / frame_rate)
    }

    /// Feed a host frame delta. Returns the number of ticks to run now.
    /// Negative or non-finite deltas (tab switches, clock skew) count as zero.
    pub fn accumulate(&mut self, frame_ms: f64) -> u32 {
        if frame_ms.is_finite() && frame_ms > 0.0 {
            self.accumulator_ms += frame_ms;
        }
        // A backgrounded tab can hand us seconds at once; never replay them all.
        self.accumulator_ms = self
            .accumulator_ms
            .min(self.step_ms * MAX_STEPS_PER_FRAME as f64);
        let steps = (self.accumulator_ms / self.step_ms) as u32;
        self.accumulator_ms -= steps as f64 * self.step_ms;
        steps
    }

    /// Fraction of the next tick already accumulated (0.0 to 1.0).
    pub fn alpha(&self) -> f64 {
        self.accumulator_ms / self.step_ms
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominal_frame_is_one_step() {
        let mut pacer = FramePacer::from_frame_rate(60.0);
        assert_eq!(pacer.accumulate(1000.0 / 60.0), 1);
    }

    #[test]
    fn fast_display_steps_every_other_frame() {
        let mut pacer = FramePacer::from_frame_rate(60.0);
        assert_eq!(pacer.accumulate(8.4), 0);
        assert_eq!(pacer.accumulate(8.4), 1);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut pacer = FramePacer::from_frame_rate(60.0);
        assert_eq!(pacer.accumulate(5_000.0), MAX_STEPS_PER_FRAME);
        assert!(pacer.alpha() < 1.0);
    }

    #[test]
    fn bogus_deltas_are_ignored() {
        let mut pacer = FramePacer::new(10.0);
        assert_eq!(pacer.accumulate(-50.0), 0);
        assert_eq!(pacer.accumulate(f64::NAN), 0);
        assert_eq!(pacer.alpha(), 0.0);
    }
}
