//! Consumer side of the conduit.
//!
//! [`run_consumer`] is an async task that polls a [`BlockReceiver`], keeps a
//! [`BlockMeter`] up to date and returns a [`ConsumerReport`] once the
//! sending side has gone away and every block has been received.  It stands
//! in for whatever analysis runs on the forwarded audio; it does not
//! estimate pitch.
//!
//! ```rust,no_run
//! use frame_forwarder::config::ConsumerConfig;
//! use frame_forwarder::conduit::block_channel;
//! use frame_forwarder::consumer::run_consumer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (_tx, rx) = block_channel(256, 128);
//!     let report = tokio::spawn(run_consumer(rx, ConsumerConfig::default()))
//!         .await
//!         .unwrap();
//!     println!("{} blocks", report.meter.blocks);
//! }
//! ```

pub mod meter;

pub use meter::{BlockLevel, BlockMeter};

use std::time::Duration;

use crate::config::ConsumerConfig;
use crate::conduit::{BlockReceiver, ConduitStats};

/// Final tally returned by [`run_consumer`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerReport {
    pub meter: BlockMeter,
    /// Conduit counters at shutdown, including blocks that never arrived.
    pub conduit: ConduitStats,
}

/// Drain `receiver` until the sender is dropped and nothing is pending.
pub async fn run_consumer(mut receiver: BlockReceiver, config: ConsumerConfig) -> ConsumerReport {
    let poll = Duration::from_millis(config.poll_interval_ms.max(1));
    let mut meter = BlockMeter::new();
    let mut block = Vec::new();
    let mut last_dropped = 0;

    loop {
        while receiver.try_recv_into(&mut block).is_some() {
            meter.record(&block);
            if config.report_every_blocks > 0 && meter.blocks % config.report_every_blocks == 0 {
                log::info!(
                    "received {} blocks, rms {:.4}, peak {:.4}",
                    meter.blocks,
                    meter.last.rms,
                    meter.peak
                );
            }
        }

        let dropped = receiver.stats().dropped();
        if dropped > last_dropped {
            log::warn!("conduit dropped {} block(s)", dropped - last_dropped);
            last_dropped = dropped;
        }

        if receiver.is_closed() {
            break;
        }
        tokio::time::sleep(poll).await;
    }

    let conduit = receiver.stats();
    log::debug!("consumer finished: {} blocks, {:?}", meter.blocks, conduit);
    ConsumerReport { meter, conduit }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
