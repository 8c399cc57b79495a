//! One-way, order-preserving block conduit from the real-time callback to
//! the consumer.
//!
//! # Layout
//!
//! ```text
//! on_block()  ──post(&[f32])──▶  BlockSender ═══ ringbuf ═══▶ BlockReceiver ──▶ consumer
//!  (audio thread, no alloc)                                     (tokio task)
//! ```
//!
//! [`BlockSink`] is the seam the forwarder posts into.  [`BlockSender`] is
//! the allocation-free implementation used by the render host; a
//! `tokio::sync::mpsc::Sender<AudioBlock>` also implements it for callers
//! that want to `.await` blocks directly and can afford one allocation per
//! block.

pub mod ring;

pub use ring::{block_channel, BlockReceiver, BlockSender, MAX_CONDUIT_SAMPLES};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::audio::AudioBlock;

// ---------------------------------------------------------------------------
// ConduitError
// ---------------------------------------------------------------------------

/// Reasons a block could not be enqueued.
///
/// None of these are fatal for the forwarder: the block is dropped and the
/// next quantum is handled normally.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConduitError {
    /// The conduit has no room for the whole block.
    #[error("conduit full; block dropped")]
    Full,

    /// The receiving side has gone away.
    #[error("conduit receiver dropped")]
    Closed,

    /// The block is longer than the conduit's per-block limit.
    #[error("block of {len} samples exceeds conduit limit of {max}")]
    Oversized { len: usize, max: usize },
}

// ---------------------------------------------------------------------------
// ConduitStats
// ---------------------------------------------------------------------------

/// Counters for every post attempt, readable from either endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConduitStats {
    /// Blocks successfully enqueued.
    pub sent: u64,
    /// Blocks dropped because the conduit was full.
    pub dropped_full: u64,
    /// Blocks dropped because the receiver was gone.
    pub dropped_closed: u64,
    /// Blocks rejected for exceeding the per-block limit.
    pub rejected_oversized: u64,
}

impl ConduitStats {
    /// Total blocks that did not reach the consumer.
    pub fn dropped(&self) -> u64 {
        self.dropped_full + self.dropped_closed + self.rejected_oversized
    }
}

// ---------------------------------------------------------------------------
// BlockSink
// ---------------------------------------------------------------------------

/// Non-blocking destination for forwarded blocks.
///
/// Implementations must return promptly: `post` is called from the audio
/// callback and may not wait on the consumer.
pub trait BlockSink: Send {
    /// Enqueue a copy of `block` as a single message.
    fn post(&mut self, block: &[f32]) -> Result<(), ConduitError>;
}

impl BlockSink for mpsc::Sender<AudioBlock> {
    fn post(&mut self, block: &[f32]) -> Result<(), ConduitError> {
        self.try_send(AudioBlock::from(block)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ConduitError::Full,
            mpsc::error::TrySendError::Closed(_) => ConduitError::Closed,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_sums_every_failure_kind() {
        let stats = ConduitStats {
            sent: 10,
            dropped_full: 2,
            dropped_closed: 1,
            rejected_oversized: 3,
        };
        assert_eq!(stats.dropped(), 6);
    }

    #[test]
    fn error_messages() {
        assert_eq!(ConduitError::Full.to_string(), "conduit full; block dropped");
        assert_eq!(
            ConduitError::Oversized { len: 256, max: 128 }.to_string(),
            "block of 256 samples exceeds conduit limit of 128"
        );
    }

    #[test]
    fn tokio_sender_as_sink() {
        let (mut tx, mut rx) = mpsc::channel::<AudioBlock>(1);
        tx.post(&[0.5, 0.25]).unwrap();
        assert_eq!(tx.post(&[1.0]), Err(ConduitError::Full));

        let block = rx.try_recv().unwrap();
        assert_eq!(block.as_slice(), &[0.5, 0.25]);

        drop(rx);
        assert_eq!(tx.post(&[1.0]), Err(ConduitError::Closed));
    }
}
