//! Forwards the first input channel of every quantum to a [`BlockSink`].

use super::{BlockProcessor, ParameterMap};
use crate::audio::{first_channel, ChannelSet};
use crate::conduit::{BlockSender, BlockSink};

/// Relays channel `0` of each quantum, unmodified, to its port.
///
/// The forwarder keeps no memory of previous quanta and always asks to stay
/// alive.  A block the port refuses (full, closed, oversized) is dropped;
/// the port keeps the count.
pub struct FrameForwarder<S = BlockSender> {
    port: S,
}

impl<S: BlockSink> FrameForwarder<S> {
    pub fn new(port: S) -> Self {
        Self { port }
    }

    /// Forward the first channel of `channels` if it holds any samples.
    ///
    /// Always returns `true`.
    ///
    /// ```
    /// use frame_forwarder::conduit::block_channel;
    /// use frame_forwarder::processor::FrameForwarder;
    ///
    /// let (port, mut rx) = block_channel(4, 128);
    /// let mut forwarder = FrameForwarder::new(port);
    ///
    /// assert!(forwarder.on_block(&[]));
    /// assert!(rx.try_recv().is_none());
    ///
    /// assert!(forwarder.on_block(&[&[0.1, -0.2, 0.3]]));
    /// assert_eq!(rx.try_recv().unwrap().as_slice(), &[0.1, -0.2, 0.3]);
    /// ```
    pub fn on_block(&mut self, channels: ChannelSet<'_>) -> bool {
        if let Some(samples) = first_channel(channels) {
            // Refusals are counted by the port; nothing to do on this thread.
            let _ = self.port.post(samples);
        }
        true
    }

    pub fn port(&self) -> &S {
        &self.port
    }

    pub fn into_port(self) -> S {
        self.port
    }
}

impl<S: BlockSink> BlockProcessor for FrameForwarder<S> {
    fn process(
        &mut self,
        inputs: &[&[f32]],
        _outputs: &mut [&mut [f32]],
        _parameters: &ParameterMap,
    ) -> bool {
        self.on_block(inputs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conduit::{block_channel, ConduitError};

    /// Records every posted block; used to count copies exactly.
    #[derive(Default)]
    struct RecordingSink {
        posted: Vec<Vec<f32>>,
        refuse_with: Option<ConduitError>,
    }

    impl BlockSink for RecordingSink {
        fn post(&mut self, block: &[f32]) -> Result<(), ConduitError> {
            if let Some(err) = self.refuse_with {
                return Err(err);
            }
            self.posted.push(block.to_vec());
            Ok(())
        }
    }

    #[test]
    fn forwards_first_channel_only() {
        let mut fwd = FrameForwarder::new(RecordingSink::default());
        let left = [0.1_f32, -0.2, 0.3];
        let right = [7.0_f32, 7.0, 7.0];

        assert!(fwd.on_block(&[&left, &right]));
        assert_eq!(fwd.port().posted, vec![vec![0.1, -0.2, 0.3]]);
    }

    #[test]
    fn no_channels_is_a_no_op() {
        let mut fwd = FrameForwarder::new(RecordingSink::default());
        assert!(fwd.on_block(&[]));
        assert!(fwd.port().posted.is_empty());
    }

    #[test]
    fn empty_first_channel_is_a_no_op() {
        let mut fwd = FrameForwarder::new(RecordingSink::default());
        assert!(fwd.on_block(&[&[]]));
        assert!(fwd.port().posted.is_empty());
    }

    #[test]
    fn exactly_one_post_per_forward() {
        let mut fwd = FrameForwarder::new(RecordingSink::default());
        for _ in 0..5 {
            fwd.on_block(&[&[1.0, 2.0]]);
        }
        assert_eq!(fwd.into_port().posted.len(), 5);
    }

    #[test]
    fn refused_post_still_keeps_alive() {
        for err in [
            ConduitError::Full,
            ConduitError::Closed,
            ConduitError::Oversized { len: 3, max: 2 },
        ] {
            let mut fwd = FrameForwarder::new(RecordingSink {
                refuse_with: Some(err),
                ..Default::default()
            });
            assert!(fwd.on_block(&[&[1.0, 2.0, 3.0]]));
        }
    }

    #[test]
    fn same_block_twice_forwards_twice() {
        let (port, mut rx) = block_channel(4, 8);
        let mut fwd = FrameForwarder::new(port);
        let block = [0.25_f32, 0.5];

        fwd.on_block(&[&block]);
        fwd.on_block(&[&block]);

        let received = rx.drain();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], received[1]);
        assert_eq!(received[0].as_slice(), &block);
    }

    #[test]
    fn process_ignores_outputs_and_parameters() {
        let (port, mut rx) = block_channel(4, 8);
        let mut fwd = FrameForwarder::new(port);

        let mut out = [0.0_f32; 2];
        let mut outputs: [&mut [f32]; 1] = [&mut out];
        let mut params = ParameterMap::new();
        params.insert("gain".into(), vec![0.5]);

        assert!(fwd.process(&[&[0.3, 0.4]], &mut outputs, &params));
        assert_eq!(out, [0.0, 0.0]);
        assert_eq!(rx.try_recv().unwrap().as_slice(), &[0.3, 0.4]);
    }
}
