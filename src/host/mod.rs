//! Render host: the harness that owns a processor and invokes it once per
//! quantum.
//!
//! # Quick start
//!
//! ```
//! use frame_forwarder::config::AppConfig;
//! use frame_forwarder::host::{ProcessorState, RenderHost};
//! use frame_forwarder::processor::{register_builtin, ProcessorRegistry, PITCH_PROCESSOR};
//!
//! let config = AppConfig::default();
//! let mut registry = ProcessorRegistry::new();
//! register_builtin(&mut registry).unwrap();
//!
//! let (mut host, mut rx) =
//!     RenderHost::new(&registry, PITCH_PROCESSOR, &config.host, &config.conduit).unwrap();
//!
//! let quantum = vec![0.25_f32; config.host.quantum_frames];
//! assert_eq!(host.render_quantum(&[quantum.as_slice()]), ProcessorState::Active);
//! assert_eq!(rx.try_recv().unwrap().len(), 128);
//! ```

pub mod runner;
pub mod state;

pub use runner::{HostError, RenderHost, MAX_CHANNELS};
pub use state::ProcessorState;
