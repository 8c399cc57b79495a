//! Block processors and the name-to-factory registry the host creates them
//! from.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 ProcessorRegistry                      │
//! │   "pitch-processor" ──▶ |port| FrameForwarder::new(port)│
//! └──────────────────────────┬─────────────────────────────┘
//!                            │ instantiate(name, port)
//!                            ▼
//!                 Box<dyn BlockProcessor>
//!                            │ process(inputs, outputs, parameters) -> bool
//!                            ▼
//!                       RenderHost (once per quantum)
//! ```
//!
//! # Quick start
//!
//! ```
//! use frame_forwarder::conduit::block_channel;
//! use frame_forwarder::processor::{register_builtin, ProcessorRegistry, PITCH_PROCESSOR};
//!
//! let mut registry = ProcessorRegistry::new();
//! register_builtin(&mut registry).unwrap();
//!
//! let (port, mut rx) = block_channel(16, 128);
//! let mut processor = registry.instantiate(PITCH_PROCESSOR, port).unwrap();
//!
//! let keep_alive = processor.process(&[&[0.1, -0.2, 0.3]], &mut [], &Default::default());
//! assert!(keep_alive);
//! assert_eq!(rx.try_recv().unwrap().as_slice(), &[0.1, -0.2, 0.3]);
//! ```

pub mod forwarder;
pub mod registry;

pub use forwarder::FrameForwarder;
pub use registry::{
    register_builtin, ProcessorFactory, ProcessorRegistry, RegistryError, PITCH_PROCESSOR,
};

use std::collections::HashMap;

/// Automation values passed by the host, keyed by parameter name.
pub type ParameterMap = HashMap<String, Vec<f32>>;

// ---------------------------------------------------------------------------
// BlockProcessor
// ---------------------------------------------------------------------------

/// Contract between the render host and a processor.
///
/// The host calls [`process`](Self::process) once per quantum, strictly
/// sequentially.  Implementations run on the audio thread and must return in
/// bounded time: no blocking, no locking, no allocation.
pub trait BlockProcessor: Send {
    /// Handle one quantum.
    ///
    /// `inputs` holds one slice per input channel, `outputs` one slice per
    /// output channel.  Returning `false` tells the host it may discard the
    /// processor; it will not be invoked again.
    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        parameters: &ParameterMap,
    ) -> bool;
}
