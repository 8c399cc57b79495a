//! Synthetic sine source used by the demo in place of a device.

use std::f32::consts::TAU;

/// Phase-continuous sine generator writing interleaved frames.
#[derive(Debug, Clone)]
pub struct ToneSource {
    phase: f32,
    step: f32,
    amplitude: f32,
}

impl ToneSource {
    pub fn new(frequency_hz: f32, sample_rate: u32, amplitude: f32) -> Self {
        let step = if sample_rate == 0 {
            0.0
        } else {
            TAU * frequency_hz / sample_rate as f32
        };
        Self {
            phase: 0.0,
            step,
            amplitude,
        }
    }

    /// Fill `buffer` with interleaved frames, the same value on every channel.
    ///
    /// ```
    /// use frame_forwarder::audio::ToneSource;
    ///
    /// let mut tone = ToneSource::new(12_000.0, 48_000, 1.0);
    /// let mut buf = [0.0_f32; 4];
    /// tone.fill_interleaved(&mut buf, 2);
    /// assert_eq!(buf[0], buf[1]);
    /// assert!((buf[2] - 1.0).abs() < 1e-6);
    /// ```
    pub fn fill_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for frame in buffer.chunks_mut(channels) {
            let value = self.amplitude * self.phase.sin();
            frame.fill(value);
            self.phase = (self.phase + self.step) % TAU;
        }
    }
}
