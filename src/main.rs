//! Demo entry point — forwards a synthetic tone or live input through the
//! `pitch-processor` and reports what the consumer received.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Register the built-in processors.
//! 4. Build the [`RenderHost`] for the configured processor.
//! 5. Create the [`tokio`] runtime and spawn the consumer task.
//! 6. Drive the host from the configured input source for
//!    `demo.duration_secs`.
//! 7. Tear the host down and wait for the consumer's report.

use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use frame_forwarder::{
    audio::ToneSource,
    config::{AppConfig, InputSource},
    consumer::run_consumer,
    host::RenderHost,
    processor::{register_builtin, ProcessorRegistry},
};

// ---------------------------------------------------------------------------
// Input sources
// ---------------------------------------------------------------------------

/// Render the synthetic tone on a dedicated thread, paced to wall-clock time.
///
/// Returns the number of quanta the processor was invoked for.
fn run_tone(mut host: RenderHost, config: &AppConfig) -> Result<u64> {
    let sample_rate = config.host.sample_rate;
    let channels = config.host.channels;
    let quantum = config.host.quantum_frames;
    let total_quanta =
        (config.demo.duration_secs * sample_rate as f32 / quantum as f32).ceil() as u64;
    let quantum_period = Duration::from_secs_f64(quantum as f64 / f64::from(sample_rate));
    let mut tone = ToneSource::new(config.demo.tone_hz, sample_rate, 0.5);

    let render = std::thread::Builder::new()
        .name("render".into())
        .spawn(move || {
            let mut buffer = vec![0.0_f32; quantum * channels];
            let start = Instant::now();
            for n in 0..total_quanta {
                tone.fill_interleaved(&mut buffer, channels);
                host.render_interleaved(&buffer, channels);
                if !host.state().is_active() {
                    log::info!("processor '{}' asked to be discarded", host.name());
                    break;
                }

                let deadline = start + quantum_period.mul_f64((n + 1) as f64);
                if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
                    std::thread::sleep(wait);
                }
            }
            host.quanta_rendered()
        })
        .context("failed to spawn render thread")?;

    render
        .join()
        .map_err(|_| anyhow!("render thread panicked"))
}

#[cfg(feature = "capture")]
fn run_capture(host: RenderHost, config: &AppConfig) -> Result<u64> {
    use frame_forwarder::audio::AudioCapture;

    let capture = AudioCapture::new()?;
    if capture.sample_rate() != config.host.sample_rate {
        log::warn!(
            "device runs at {} Hz, config says {} Hz; forwarding at device rate",
            capture.sample_rate(),
            config.host.sample_rate
        );
    }
    let handle = capture.start(host)?;
    std::thread::sleep(Duration::from_secs_f32(config.demo.duration_secs));
    let quanta = handle.quanta_rendered();
    drop(handle);
    log::info!("audio capture stopped");
    Ok(quanta)
}

#[cfg(not(feature = "capture"))]
fn run_capture(_host: RenderHost, _config: &AppConfig) -> Result<u64> {
    anyhow::bail!("demo.source = \"capture\" requires building with `--features capture`")
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("frame-forwarder starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    config.validate()?;

    // 3. Processor registry
    let mut registry = ProcessorRegistry::new();
    register_builtin(&mut registry)?;

    // 4. Host + conduit
    let (host, receiver) = RenderHost::new(
        &registry,
        &config.processor.name,
        &config.host,
        &config.conduit,
    )?;

    // 5. Consumer on the tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    let consumer = rt.spawn(run_consumer(receiver, config.consumer.clone()));

    // 6. Drive the host; it is dropped when the source stops, closing the conduit
    let quanta = match config.demo.source {
        InputSource::Tone => run_tone(host, &config)?,
        InputSource::Capture => run_capture(host, &config)?,
    };

    // 7. Final report
    let report = rt.block_on(consumer).context("consumer task failed")?;
    log::info!(
        "done: {} quanta rendered, {} blocks received ({:.2}s of audio), peak {:.4}, {} dropped",
        quanta,
        report.meter.blocks,
        report.meter.duration_secs(config.host.sample_rate),
        report.meter.peak,
        report.conduit.dropped()
    );
    Ok(())
}
