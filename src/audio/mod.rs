//! Audio data types and sources.
//!
//! # Pipeline
//!
//! ```text
//! cpal callback / ToneSource → RenderHost::render_interleaved
//!           → FrameForwarder::on_block(channel 0) → conduit → consumer
//! ```
//!
//! Live capture is behind the `capture` cargo feature.

pub mod block;
#[cfg(feature = "capture")]
pub mod capture;
pub mod tone;

pub use block::{first_channel, AudioBlock, ChannelSet, DEFAULT_QUANTUM_FRAMES};
#[cfg(feature = "capture")]
pub use capture::{AudioCapture, CaptureError, StreamHandle};
pub use tone::ToneSource;
