/// Fixed-timestep accumulator: frames add wall-clock time, physics consumes
/// it in whole steps, and the remainder becomes the render blend factor.
#[derive(Clone, Debug)]
pub struct FixedStep {
    step: f32,
    accumulator: f32,
    max_steps_per_frame: u32,
}

impl FixedStep {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            max_steps_per_frame: 8,
        }
    }

    /// Adds `frame_dt` and returns how many steps to run now.
    /// Time beyond `max_steps_per_frame` steps is discarded.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps_per_frame {
            self.accumulator -= self.step;
            steps += 1;
        }
        if self.accumulator >= self.step {
            log::debug!(
                "fixed step fell behind; dropping {:.3}s",
                self.accumulator - self.accumulator % self.step
            );
            self.accumulator %= self.step;
        }
        steps
    }

    /// Fraction of a step left in the accumulator, clamped to 1.
    #[inline]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_follow_accumulated_time() {
        let mut c = FixedStep::new(0.25);
        assert_eq!(c.advance(0.1), 0);
        assert!((c.alpha() - 0.4).abs() < 1e-6);
        assert_eq!(c.advance(0.2), 1);
        assert!((c.alpha() - 0.2).abs() < 1e-5);
        assert_eq!(c.advance(0.5), 2);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut c = FixedStep::new(0.5);
        assert_eq!(c.advance(100.0), 8);
        assert!(c.alpha() < 1.0);
        assert_eq!(c.advance(0.0), 0);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut c = FixedStep::new(0.1);
        assert_eq!(c.advance(-3.0), 0);
        assert_eq!(c.alpha(), 0.0);
    }
}
