use super::Stage;

/// Symmetric hard clipper applied ahead of the detector
///
/// The product detector's output scales with the square of the input
/// amplitude; clipping the input bounds that dependence on signal strength.
#[derive(Debug, Clone, Copy)]
pub struct Limiter {
    level: f64,
}

impl Limiter {
    /// `level` is the clip level in normalized units and must be positive
    pub fn new(level: f64) -> Self {
        Self { level: level.abs() }
    }

    pub fn level(&self) -> f64 {
        self.level
    }
}

impl Stage for Limiter {
    fn process(&mut self, sample: f64) -> f64 {
        sample.clamp(-self.level, self.level)
    }

    fn reset(&mut self) {}
}
