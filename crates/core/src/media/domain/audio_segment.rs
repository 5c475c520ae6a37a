/// Decoded PCM audio: interleaved f32 samples normalized to [-1.0, 1.0].
#[derive(Clone, Debug)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds. Zero when the rate or channel count is zero.
    pub fn duration(&self) -> f64 {
        let per_second = self.sample_rate as f64 * self.channels as f64;
        if per_second == 0.0 {
            return 0.0;
        }
        self.samples.len() as f64 / per_second
    }

    /// True when no sample rises above `threshold` in magnitude.
    pub fn is_silent(&self, threshold: f32) -> bool {
        self.samples.iter().all(|s| s.abs() <= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duration_mono() {
        let seg = AudioSegment::mono(vec![0.0; 48000], 16000);
        assert_relative_eq!(seg.duration(), 3.0);
        assert_eq!(seg.channels(), 1);
    }

    #[test]
    fn test_duration_stereo() {
        let seg = AudioSegment::new(vec![0.0; 96000], 48000, 2);
        assert_relative_eq!(seg.duration(), 1.0);
    }

    #[test]
    fn test_duration_zero_rate() {
        let seg = AudioSegment::mono(vec![0.0; 10], 0);
        assert_eq!(seg.duration(), 0.0);
    }

    #[test]
    fn test_is_silent() {
        let mut samples = vec![0.0f32; 100];
        let quiet = AudioSegment::mono(samples.clone(), 16000);
        assert!(quiet.is_silent(0.001));
        samples[42] = -0.5;
        let loud = AudioSegment::mono(samples, 16000);
        assert!(!loud.is_silent(0.001));
    }

    #[test]
    fn test_empty() {
        assert!(AudioSegment::mono(Vec::new(), 16000).is_empty());
    }
}
