//! Render host — instantiates a processor by name and drives it once per
//! quantum.
//!
//! # Flow
//!
//! ```text
//! RenderHost::new(registry, name)
//!   └─▶ block_channel(capacity, quantum)  → (port, BlockReceiver)
//!   └─▶ registry.instantiate(name, port)  → Box<dyn BlockProcessor>
//!
//! render_interleaved(device buffer)
//!   └─▶ de-interleave into per-channel scratch
//!         └─▶ every full quantum: render_quantum(channels)
//!               └─▶ processor.process(..) == false  → Discarded
//! ```
//!
//! Everything reachable from `render_*` is allocation-free: scratch and
//! output buffers are sized in [`RenderHost::new`].

use arrayvec::ArrayVec;
use thiserror::Error;

use super::state::ProcessorState;
use crate::config::{ConduitConfig, HostConfig};
use crate::conduit::{block_channel, BlockReceiver, MAX_CONDUIT_SAMPLES};
use crate::processor::{BlockProcessor, ParameterMap, ProcessorRegistry, RegistryError};

/// Upper bound on input channels the host de-interleaves; extra device
/// channels are skipped.
pub const MAX_CHANNELS: usize = 32;

// ---------------------------------------------------------------------------
// HostError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("quantum size must be > 0")]
    ZeroQuantum,

    #[error("conduit capacity must be > 0")]
    ZeroCapacity,

    #[error(
        "conduit of {capacity_blocks} blocks x {quantum_frames} frames exceeds {max} samples",
        max = MAX_CONDUIT_SAMPLES
    )]
    ConduitTooLarge {
        capacity_blocks: usize,
        quantum_frames: usize,
    },
}

// ---------------------------------------------------------------------------
// RenderHost
// ---------------------------------------------------------------------------

/// Stand-in for the audio engine that owns and schedules a processor.
pub struct RenderHost {
    name: String,
    processor: Box<dyn BlockProcessor>,
    state: ProcessorState,
    quantum_frames: usize,
    /// Per-channel de-interleave scratch, each with `quantum_frames` capacity.
    scratch: Vec<Vec<f32>>,
    /// Single mono output slot handed to the processor, zeroed each quantum.
    output: Vec<f32>,
    parameters: ParameterMap,
    quanta_rendered: u64,
}

impl RenderHost {
    /// Create the conduit, instantiate `name` from `registry` and return the
    /// host together with the consumer end of the conduit.
    ///
    /// # Errors
    ///
    /// [`HostError::Registry`] when `name` is unknown, a zero-size error for
    /// an unusable config, or [`HostError::ConduitTooLarge`] when the conduit
    /// would need more than [`MAX_CONDUIT_SAMPLES`] samples.
    pub fn new(
        registry: &ProcessorRegistry,
        name: &str,
        host: &HostConfig,
        conduit: &ConduitConfig,
    ) -> Result<(Self, BlockReceiver), HostError> {
        if host.quantum_frames == 0 {
            return Err(HostError::ZeroQuantum);
        }
        if conduit.capacity_blocks == 0 {
            return Err(HostError::ZeroCapacity);
        }
        let fits = conduit
            .capacity_blocks
            .checked_mul(host.quantum_frames)
            .is_some_and(|n| n <= MAX_CONDUIT_SAMPLES);
        if !fits {
            return Err(HostError::ConduitTooLarge {
                capacity_blocks: conduit.capacity_blocks,
                quantum_frames: host.quantum_frames,
            });
        }

        let (port, receiver) = block_channel(conduit.capacity_blocks, host.quantum_frames);
        let processor = registry.instantiate(name, port)?;
        log::info!(
            "instantiated '{name}' ({} frames/quantum, conduit {} blocks)",
            host.quantum_frames,
            conduit.capacity_blocks
        );

        let host = Self {
            name: name.to_owned(),
            processor,
            state: ProcessorState::Active,
            quantum_frames: host.quantum_frames,
            scratch: (0..MAX_CHANNELS)
                .map(|_| Vec::with_capacity(host.quantum_frames))
                .collect(),
            output: vec![0.0; host.quantum_frames],
            parameters: ParameterMap::new(),
            quanta_rendered: 0,
        };
        Ok((host, receiver))
    }

    /// Invoke the processor for one quantum of per-channel input.
    ///
    /// Every channel must hold at most [`quantum_frames`](Self::quantum_frames)
    /// samples; the conduit refuses longer blocks.  Debug builds panic on a
    /// longer channel, release builds leave the refusal to the conduit's
    /// `rejected_oversized` counter.
    ///
    /// Does nothing once the processor is [`ProcessorState::Discarded`].
    pub fn render_quantum(&mut self, inputs: &[&[f32]]) -> ProcessorState {
        debug_assert!(
            inputs.iter().all(|c| c.len() <= self.quantum_frames),
            "input channel longer than the host quantum of {} frames",
            self.quantum_frames
        );
        if !self.state.is_active() {
            return self.state;
        }

        self.output.fill(0.0);
        let mut outputs: [&mut [f32]; 1] = [self.output.as_mut_slice()];
        let keep_alive = self.processor.process(inputs, &mut outputs, &self.parameters);
        self.quanta_rendered += 1;

        if !keep_alive {
            self.state = ProcessorState::Discarded;
        }
        self.state
    }

    /// Feed an interleaved device buffer, rendering every completed quantum.
    ///
    /// `data` must hold whole frames (`data.len()` a multiple of `channels`).
    /// Frames that do not complete a quantum are kept for the next call.  A
    /// change in `channels` between calls drops the partial quantum.
    pub fn render_interleaved(&mut self, data: &[f32], channels: usize) {
        if channels == 0 {
            return;
        }
        debug_assert_eq!(
            data.len() % channels,
            0,
            "interleaved buffer ends in a partial frame"
        );
        let used = channels.min(MAX_CHANNELS);
        if self.scratch[..used].iter().any(|c| c.len() != self.scratch[0].len())
            || self.scratch[used..].iter().any(|c| !c.is_empty())
        {
            self.clear_scratch();
        }

        for frame in data.chunks_exact(channels) {
            for (ch, &sample) in frame.iter().take(used).enumerate() {
                self.scratch[ch].push(sample);
            }
            if self.scratch[0].len() == self.quantum_frames {
                self.flush_scratch(used);
            }
        }
    }

    fn flush_scratch(&mut self, used: usize) {
        let mut scratch = std::mem::take(&mut self.scratch);
        {
            let inputs: ArrayVec<&[f32], MAX_CHANNELS> =
                scratch[..used].iter().map(Vec::as_slice).collect();
            self.render_quantum(&inputs);
        }
        for channel in &mut scratch[..used] {
            channel.clear();
        }
        self.scratch = scratch;
    }

    fn clear_scratch(&mut self) {
        for channel in &mut self.scratch {
            channel.clear();
        }
    }

    /// Stop invoking the processor.  The processor and its port are dropped
    /// with the host.
    pub fn discard(&mut self) {
        if self.state.is_active() {
            log::debug!("discarding processor '{}'", self.name);
        }
        self.state = ProcessorState::Discarded;
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantum_frames(&self) -> usize {
        self.quantum_frames
    }

    /// Number of times the processor has been invoked.
    pub fn quanta_rendered(&self) -> u64 {
        self.quanta_rendered
    }

    /// Frames currently buffered towards the next quantum.
    pub fn pending_frames(&self) -> usize {
        self.scratch[0].len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conduit::BlockSender;
    use crate::processor::{register_builtin, PITCH_PROCESSOR};

    fn host_config(quantum_frames: usize) -> HostConfig {
        HostConfig {
            quantum_frames,
            ..HostConfig::default()
        }
    }

    fn forwarder_host(quantum_frames: usize, capacity_blocks: usize) -> (RenderHost, BlockReceiver) {
        let mut registry = ProcessorRegistry::new();
        register_builtin(&mut registry).unwrap();
        RenderHost::new(
            &registry,
            PITCH_PROCESSOR,
            &host_config(quantum_frames),
            &ConduitConfig { capacity_blocks },
        )
        .unwrap()
    }

    /// Stays alive for `remaining` quanta, then asks to be discarded.
    struct Countdown {
        remaining: usize,
        _port: BlockSender,
    }

    impl BlockProcessor for Countdown {
        fn process(&mut self, _: &[&[f32]], _: &mut [&mut [f32]], _: &ParameterMap) -> bool {
            self.remaining = self.remaining.saturating_sub(1);
            self.remaining > 0
        }
    }

    #[test]
    fn host_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<RenderHost>();
    }

    #[test]
    fn unknown_processor_is_an_error() {
        let registry = ProcessorRegistry::new();
        let err = RenderHost::new(
            &registry,
            "missing",
            &HostConfig::default(),
            &ConduitConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, HostError::Registry(RegistryError::UnknownProcessor(_))));
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let mut registry = ProcessorRegistry::new();
        register_builtin(&mut registry).unwrap();
        assert!(matches!(
            RenderHost::new(&registry, PITCH_PROCESSOR, &host_config(0), &ConduitConfig::default()),
            Err(HostError::ZeroQuantum)
        ));
        assert!(matches!(
            RenderHost::new(
                &registry,
                PITCH_PROCESSOR,
                &HostConfig::default(),
                &ConduitConfig { capacity_blocks: 0 }
            ),
            Err(HostError::ZeroCapacity)
        ));
    }

    #[test]
    fn oversized_conduit_is_rejected() {
        let mut registry = ProcessorRegistry::new();
        register_builtin(&mut registry).unwrap();

        let err = RenderHost::new(
            &registry,
            PITCH_PROCESSOR,
            &HostConfig::default(),
            &ConduitConfig {
                capacity_blocks: usize::MAX / 64,
            },
        )
        .err()
        .unwrap();
        assert!(matches!(err, HostError::ConduitTooLarge { quantum_frames: 128, .. }));

        // no overflow, but still past the cap
        let too_many = MAX_CONDUIT_SAMPLES / 128 + 1;
        assert!(matches!(
            RenderHost::new(
                &registry,
                PITCH_PROCESSOR,
                &HostConfig::default(),
                &ConduitConfig { capacity_blocks: too_many }
            ),
            Err(HostError::ConduitTooLarge { .. })
        ));
    }

    #[test]
    fn forwarder_stays_active() {
        let (mut host, mut rx) = forwarder_host(4, 8);
        for _ in 0..3 {
            assert_eq!(host.render_quantum(&[&[0.0, 0.1, 0.2, 0.3]]), ProcessorState::Active);
        }
        assert_eq!(host.render_quantum(&[]), ProcessorState::Active);
        assert_eq!(host.quanta_rendered(), 4);
        assert_eq!(rx.drain().len(), 3);
    }

    #[test]
    fn false_return_discards_and_stops_invocation() {
        let mut registry = ProcessorRegistry::new();
        registry
            .register("countdown", |port| {
                Box::new(Countdown {
                    remaining: 2,
                    _port: port,
                })
            })
            .unwrap();
        let (mut host, _rx) =
            RenderHost::new(&registry, "countdown", &host_config(4), &ConduitConfig::default())
                .unwrap();

        assert_eq!(host.render_quantum(&[]), ProcessorState::Active);
        assert_eq!(host.render_quantum(&[]), ProcessorState::Discarded);
        assert_eq!(host.render_quantum(&[]), ProcessorState::Discarded);
        assert_eq!(host.quanta_rendered(), 2);
    }

    #[test]
    fn discard_stops_forwarding() {
        let (mut host, mut rx) = forwarder_host(2, 8);
        host.render_quantum(&[&[1.0, 2.0]]);
        host.discard();
        host.render_quantum(&[&[3.0, 4.0]]);

        let blocks = rx.drain();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].as_slice(), &[1.0, 2.0]);
        assert_eq!(host.state(), ProcessorState::Discarded);
    }

    #[test]
    fn interleaved_stereo_forwards_left_channel_per_quantum() {
        let (mut host, mut rx) = forwarder_host(2, 8);
        // L R L R L R L R
        host.render_interleaved(&[1.0, -1.0, 2.0, -2.0, 3.0, -3.0, 4.0, -4.0], 2);

        let blocks = rx.drain();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].as_slice(), &[1.0, 2.0]);
        assert_eq!(blocks[1].as_slice(), &[3.0, 4.0]);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn partial_quantum_carries_over() {
        let (mut host, mut rx) = forwarder_host(4, 8);
        host.render_interleaved(&[1.0, 2.0, 3.0], 1);
        assert_eq!(host.pending_frames(), 3);
        assert!(rx.try_recv().is_none());

        host.render_interleaved(&[4.0, 5.0], 1);
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(rx.try_recv().unwrap().as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn channel_count_change_drops_partial_quantum() {
        let (mut host, mut rx) = forwarder_host(2, 8);
        host.render_interleaved(&[1.0, -1.0], 2);
        assert_eq!(host.pending_frames(), 1);

        host.render_interleaved(&[5.0, 6.0], 1);
        assert_eq!(rx.try_recv().unwrap().as_slice(), &[5.0, 6.0]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "partial frame")]
    fn trailing_partial_frame_panics_in_debug() {
        let (mut host, _rx) = forwarder_host(4, 8);
        host.render_interleaved(&[1.0, -1.0, 2.0], 2);
    }

    #[test]
    fn zero_channels_is_ignored() {
        let (mut host, _rx) = forwarder_host(2, 8);
        host.render_interleaved(&[1.0, 2.0], 0);
        assert_eq!(host.quanta_rendered(), 0);
    }
}
