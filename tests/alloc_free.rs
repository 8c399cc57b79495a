//! Allocation-free real-time path tests.
//!
//! These tests verify that forwarding, conduit posts and host rendering do
//! not allocate once everything has been constructed.  Any heap allocation
//! inside `assert_no_alloc` aborts the test binary in debug builds.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use frame_forwarder::conduit::{block_channel, BlockSink};
use frame_forwarder::config::{ConduitConfig, HostConfig};
use frame_forwarder::host::RenderHost;
use frame_forwarder::processor::{register_builtin, FrameForwarder, ProcessorRegistry, PITCH_PROCESSOR};

#[test]
fn conduit_post_alloc_free() {
    let (mut tx, mut rx) = block_channel(64, 128);
    let block = vec![0.5_f32; 128];

    assert_no_alloc(|| {
        for _ in 0..64 {
            tx.post(&block).unwrap();
        }
        // the full path too
        assert!(tx.post(&block).is_err());
    });

    assert_eq!(rx.drain().len(), 64);
}

#[test]
fn forwarder_alloc_free() {
    let (port, mut rx) = block_channel(100, 128);
    let mut forwarder = FrameForwarder::new(port);
    let block = vec![0.25_f32; 128];

    for _ in 0..10 {
        assert_no_alloc(|| {
            for _ in 0..100 {
                forwarder.on_block(&[block.as_slice()]);
                forwarder.on_block(&[]);
            }
        });
        assert_eq!(rx.drain().len(), 100);
    }
}

#[test]
fn host_render_alloc_free() {
    let mut registry = ProcessorRegistry::new();
    register_builtin(&mut registry).unwrap();
    let host_config = HostConfig::default();
    let (mut host, mut rx) = RenderHost::new(
        &registry,
        PITCH_PROCESSOR,
        &host_config,
        &ConduitConfig { capacity_blocks: 64 },
    )
    .unwrap();

    // 10 quanta of stereo per device buffer, delivered in uneven pieces
    let interleaved = vec![0.1_f32; host_config.quantum_frames * 2 * 10];
    let quantum = vec![0.2_f32; host_config.quantum_frames];

    assert_no_alloc(|| {
        for piece in interleaved.chunks(300) {
            host.render_interleaved(piece, 2);
        }
        for _ in 0..10 {
            host.render_quantum(&[quantum.as_slice()]);
        }
    });

    assert_eq!(rx.drain().len(), 20);
}
