/// Common trait for streaming pipeline stages
///
/// Implemented by every stage that carries state from one block to the next.
/// Processing a stream in one call or split across many calls gives the same
/// output.
pub trait Stage {
    /// Process a single sample through the stage
    fn process(&mut self, sample: f64) -> f64;

    /// Process a buffer of samples in-place
    fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Return the stage to its freshly constructed state
    fn reset(&mut self);
}
