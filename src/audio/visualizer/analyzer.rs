// src/audio/visualizer/analyzer.rs
//! Analyzer handle and the reusable sample buffer handed to the renderer.

/// Something that can report current frequency magnitudes as bytes.
pub trait FrequencyAnalyzer {
    /// Number of frequency bins, half the analysis window size.
    fn frequency_bin_count(&self) -> usize;

    /// Write the latest magnitudes (0..=255) into `out`, at most
    /// `frequency_bin_count()` bytes.
    fn byte_frequency_data(&mut self, out: &mut [u8]);
}

impl<A: FrequencyAnalyzer + ?Sized> FrequencyAnalyzer for Box<A> {
    fn frequency_bin_count(&self) -> usize {
        (**self).frequency_bin_count()
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        (**self).byte_frequency_data(out)
    }
}

/// Fixed-length byte magnitudes, overwritten in place every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer(Box<[u8]>);

impl SampleBuffer {
    pub fn new(len: usize) -> Self {
        Self(vec![0; len].into_boxed_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// An analyzer paired with a sample buffer sized to its bin count.
///
/// The buffer is allocated once here and never resized, so the renderer can
/// rely on `buffer_length() == samples().len()`.
pub struct AnalyzerData<A> {
    analyzer: A,
    buffer: SampleBuffer,
}

impl<A: FrequencyAnalyzer> AnalyzerData<A> {
    pub fn new(analyzer: A) -> Self {
        let buffer = SampleBuffer::new(analyzer.frequency_bin_count());
        Self { analyzer, buffer }
    }

    pub fn buffer_length(&self) -> usize {
        self.buffer.len()
    }

    /// Samples written by the most recent `refresh`.
    pub fn samples(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Have the analyzer overwrite the buffer, then hand it out for reading.
    /// The write finishes before the returned borrow begins.
    pub fn refresh(&mut self) -> &[u8] {
        self.analyzer.byte_frequency_data(&mut self.buffer.0);
        &self.buffer.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        bins: usize,
        calls: u8,
    }

    impl FrequencyAnalyzer for Counting {
        fn frequency_bin_count(&self) -> usize {
            self.bins
        }

        fn byte_frequency_data(&mut self, out: &mut [u8]) {
            self.calls += 1;
            out.fill(self.calls);
        }
    }

    #[test]
    fn buffer_matches_bin_count_and_is_reused() {
        let mut data = AnalyzerData::new(Counting { bins: 8, calls: 0 });
        assert_eq!(data.buffer_length(), 8);
        assert_eq!(data.samples(), &[0; 8]);

        let first = data.refresh().as_ptr();
        assert_eq!(data.samples(), &[1; 8]);
        let second = data.refresh().as_ptr();
        assert_eq!(first, second);
        assert_eq!(data.samples(), &[2; 8]);
        assert_eq!(data.buffer_length(), 8);
    }

    #[test]
    fn boxed_analyzers_forward() {
        let boxed: Box<dyn FrequencyAnalyzer> = Box::new(Counting { bins: 3, calls: 0 });
        let mut data = AnalyzerData::new(boxed);
        assert_eq!(data.refresh(), &[1, 1, 1]);
    }
}
