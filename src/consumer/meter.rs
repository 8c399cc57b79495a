//! Running statistics over received blocks.

/// Level summary of one block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockLevel {
    pub rms: f32,
    pub peak: f32,
}

impl BlockLevel {
    /// ```
    /// use frame_forwarder::consumer::BlockLevel;
    ///
    /// let level = BlockLevel::of(&[0.5, -0.5, 0.5, -0.5]);
    /// assert!((level.rms - 0.5).abs() < 1e-6);
    /// assert!((level.peak - 0.5).abs() < 1e-6);
    /// assert_eq!(BlockLevel::of(&[]), BlockLevel::default());
    /// ```
    pub fn of(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let mut sum_sq = 0.0_f64;
        let mut peak = 0.0_f32;
        for &s in samples {
            sum_sq += f64::from(s) * f64::from(s);
            peak = peak.max(s.abs());
        }
        Self {
            rms: (sum_sq / samples.len() as f64).sqrt() as f32,
            peak,
        }
    }
}

/// Accumulates block counts and levels on the consumer side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockMeter {
    pub blocks: u64,
    pub samples: u64,
    /// Level of the most recent block.
    pub last: BlockLevel,
    /// Highest absolute sample seen so far.
    pub peak: f32,
}

impl BlockMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, samples: &[f32]) {
        let level = BlockLevel::of(samples);
        self.blocks += 1;
        self.samples += samples.len() as u64;
        self.last = level;
        self.peak = self.peak.max(level.peak);
    }

    /// Audio received so far, in seconds at `sample_rate`.
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.samples as f32 / sample_rate as f32
    }
}
