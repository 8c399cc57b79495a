//! Live input via `cpal`.
//!
//! [`AudioCapture`] wraps the cpal host/device/stream lifecycle.  Call
//! [`AudioCapture::start`] to move a [`RenderHost`] into the cpal input
//! callback; every device buffer is handed to
//! [`RenderHost::render_interleaved`].  The returned [`StreamHandle`] is a
//! RAII guard — dropping it stops the stream and drops the host with it.
//! Only devices whose default input format is `f32` are accepted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use crate::host::RenderHost;

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
pub struct StreamHandle {
    _stream: cpal::Stream,
    quanta: Arc<AtomicU64>,
}

impl StreamHandle {
    /// Quanta the host inside the callback has rendered so far.
    pub fn quanta_rendered(&self) -> u64 {
        self.quanta.load(Ordering::Relaxed)
    }
}

/// Body of the input callback: render `data` and publish the host's count.
fn render_device_buffer(host: &mut RenderHost, data: &[f32], channels: usize, quanta: &AtomicU64) {
    host.render_interleaved(data, channels);
    quanta.store(host.quanta_rendered(), Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running the audio capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("default input format is {0:?}; only f32 input is supported")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// Default input device wrapper built on top of `cpal`.
///
/// ```rust,no_run
/// use frame_forwarder::audio::AudioCapture;
/// use frame_forwarder::config::AppConfig;
/// use frame_forwarder::host::RenderHost;
/// use frame_forwarder::processor::{register_builtin, ProcessorRegistry, PITCH_PROCESSOR};
///
/// let config = AppConfig::default();
/// let mut registry = ProcessorRegistry::new();
/// register_builtin(&mut registry).unwrap();
/// let (host, _rx) =
///     RenderHost::new(&registry, PITCH_PROCESSOR, &config.host, &config.conduit).unwrap();
///
/// let capture = AudioCapture::new().unwrap();
/// let _handle = capture.start(host).unwrap();
/// // `_handle` keeps the stream alive; drop it to stop capturing.
/// ```
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapture {
    /// Open the system default input device with its preferred config.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::NoDevice`] when no input device is available,
    /// [`CaptureError::DefaultConfig`] when the device cannot report a
    /// default stream configuration, or [`CaptureError::UnsupportedFormat`]
    /// when that configuration is not `f32`.
    pub fn new() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(CaptureError::UnsupportedFormat(supported.sample_format()));
        }

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Start the stream and drive `host` from the audio callback.
    ///
    /// The callback never blocks or allocates: it only de-interleaves into
    /// the host's preallocated scratch and forwards full quanta.
    pub fn start(&self, mut host: RenderHost) -> Result<StreamHandle, CaptureError> {
        let channels = usize::from(self.channels);
        let quanta = Arc::new(AtomicU64::new(0));
        let published = Arc::clone(&quanta);

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                render_device_buffer(&mut host, data, channels, &published);
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;

        stream.play()?;
        log::info!(
            "audio capture started ({} Hz, {} ch)",
            self.sample_rate,
            self.channels
        );
        Ok(StreamHandle {
            _stream: stream,
            quanta,
        })
    }

    /// Native sample rate of the capture stream in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels the device delivers.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
