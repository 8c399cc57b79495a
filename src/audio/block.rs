//! Audio block types shared by the forwarder, the conduit and the consumer.
//!
//! Inside the real-time callback a block is only ever *borrowed* as
//! `&[f32]`.  Once it has crossed the conduit the consumer owns it as an
//! [`AudioBlock`].

use std::ops::Deref;

/// Default number of frames per quantum used by the render host.
pub const DEFAULT_QUANTUM_FRAMES: usize = 128;

/// One quantum's worth of input, one slice per channel.
///
/// Only channel `0` is read by the forwarder; the rest are ignored.
pub type ChannelSet<'a> = &'a [&'a [f32]];

/// Returns the first channel of `channels` when it holds at least one sample.
///
/// A missing channel array and a zero-length first channel are both treated
/// as "nothing to forward".
///
/// ```
/// use frame_forwarder::audio::first_channel;
///
/// let left = [0.5_f32, 0.25];
/// let right = [1.0_f32, 1.0];
/// assert_eq!(first_channel(&[&left, &right]), Some(&left[..]));
/// assert_eq!(first_channel(&[]), None);
/// assert_eq!(first_channel(&[&[]]), None);
/// ```
pub fn first_channel<'a>(channels: &[&'a [f32]]) -> Option<&'a [f32]> {
    match channels.first() {
        Some(samples) if !samples.is_empty() => Some(samples),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// AudioBlock
// ---------------------------------------------------------------------------

/// An owned, immutable block of mono `f32` samples as received by the
/// consumer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioBlock {
    samples: Vec<f32>,
}

impl AudioBlock {
    /// Wrap an already-owned sample vector.
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Sample data in arrival order.
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    /// Give the sample vector back to the caller.
    pub fn into_vec(self) -> Vec<f32> {
        self.samples
    }
}

impl Deref for AudioBlock {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples
    }
}

impl From<&[f32]> for AudioBlock {
    fn from(samples: &[f32]) -> Self {
        Self {
            samples: samples.to_vec(),
        }
    }
}

impl From<Vec<f32>> for AudioBlock {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
