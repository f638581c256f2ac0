/// Direct-form FIR convolution over a fixed-length ring buffer
///
/// The history always holds exactly `taps.len()` samples, zero-initialized.
/// Each new sample overwrites the oldest slot, then the window is convolved
/// oldest-first: `y = sum(history[j] * taps[j])` with `history[0]` the
/// oldest sample. For symmetric taps this is the same as the usual
/// newest-first form.
#[derive(Debug, Clone)]
pub struct FirFilterCore {
    taps: Vec<f64>,
    history: Vec<f64>,
    /// Slot holding the oldest sample, overwritten next
    pos: usize,
}

impl FirFilterCore {
    /// Create a new FIR filter core with the given tap coefficients
    ///
    /// # Panics
    /// Panics if `taps` is empty.
    pub fn new(taps: Vec<f64>) -> Self {
        assert!(!taps.is_empty(), "FIR filter needs at least one tap");
        Self {
            history: vec![0.0; taps.len()],
            taps,
            pos: 0,
        }
    }

    /// Process a single sample through the filter
    pub fn process(&mut self, sample: f64) -> f64 {
        let n = self.taps.len();
        self.history[self.pos] = sample;
        self.pos += 1;
        if self.pos == n {
            self.pos = 0;
        }

        // The ring splits into two contiguous runs, oldest first, so the
        // inner loop needs no modulo.
        let (newer, older) = self.history.split_at(self.pos);
        let (taps_old, taps_new) = self.taps.split_at(older.len());

        let mut output = 0.0f64;
        for (h, t) in older.iter().zip(taps_old) {
            output += h * t;
        }
        for (h, t) in newer.iter().zip(taps_new) {
            output += h * t;
        }
        output
    }

    /// Process an entire buffer of samples in-place
    pub fn process_buffer(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear the history back to zeros
    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.pos = 0;
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        (self.taps.len() - 1) / 2
    }

    /// Get access to the tap coefficients
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// History in chronological order, oldest first
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history[self.pos..]
            .iter()
            .chain(&self.history[..self.pos])
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_fifo() {
        let mut core = FirFilterCore::new(vec![0.0; 3]);
        for x in [1.0, 2.0, 3.0, 4.0] {
            core.process(x);
        }
        let history: Vec<f64> = core.history().collect();
        assert_eq!(history, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_oldest_sample_meets_first_tap() {
        // Asymmetric taps make the ordering observable
        let mut core = FirFilterCore::new(vec![1.0, 10.0, 100.0]);
        assert_eq!(core.process(1.0), 100.0);
        assert_eq!(core.process(0.0), 10.0);
        assert_eq!(core.process(0.0), 1.0);
        assert_eq!(core.process(0.0), 0.0);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut core = FirFilterCore::new(vec![0.5, 0.5]);
        core.process(1.0);
        core.reset();
        assert!(core.history().all(|h| h == 0.0));
        assert_eq!(core.process(0.0), 0.0);
    }
}
