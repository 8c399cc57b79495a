//! Streaming mono-audio frame forwarder.
//!
//! A [`processor::FrameForwarder`] is invoked once per audio quantum by a
//! [`host::RenderHost`] and relays the first input channel, unmodified, over
//! a lock-free [`conduit`] to a consumer running on another thread.
//!
//! ```text
//! ProcessorRegistry ──instantiate("pitch-processor")──▶ RenderHost
//!                                                         │ once per quantum
//!                                                         ▼
//!                                   FrameForwarder::on_block ──post──▶ BlockSender
//!                                                                          ║ ringbuf
//!                                   run_consumer (tokio) ◀──try_recv── BlockReceiver
//! ```

pub mod audio;
pub mod conduit;
pub mod config;
pub mod consumer;
pub mod host;
pub mod processor;
