//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Missing keys fall back to their defaults, so a partial `settings.toml` is
//! valid.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::audio::DEFAULT_QUANTUM_FRAMES;
use crate::conduit::MAX_CONDUIT_SAMPLES;
use crate::processor::PITCH_PROCESSOR;

// ---------------------------------------------------------------------------
// HostConfig
// ---------------------------------------------------------------------------

/// Settings for the render host that drives the processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Nominal sample rate in Hz.  Informational for the forwarder; used by
    /// the synthetic source and for reporting durations.
    pub sample_rate: u32,
    /// Frames per quantum (one processor invocation).
    pub quantum_frames: usize,
    /// Channels produced by the synthetic source.
    pub channels: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            quantum_frames: DEFAULT_QUANTUM_FRAMES,
            channels: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// ConduitConfig
// ---------------------------------------------------------------------------

/// Sizing of the forwarder → consumer conduit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConduitConfig {
    /// Maximum number of blocks in flight before new blocks are dropped.
    pub capacity_blocks: usize,
}

impl Default for ConduitConfig {
    fn default() -> Self {
        // ~680 ms at 48 kHz / 128 frames
        Self {
            capacity_blocks: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// ProcessorConfig
// ---------------------------------------------------------------------------

/// Which registered processor the host instantiates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub name: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            name: PITCH_PROCESSOR.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConsumerConfig
// ---------------------------------------------------------------------------

/// Settings for the async consumer that drains the conduit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// How long the consumer sleeps when the conduit is empty.
    pub poll_interval_ms: u64,
    /// Log a progress line every this many blocks (`0` disables).
    pub report_every_blocks: u64,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            report_every_blocks: 375,
        }
    }
}

// ---------------------------------------------------------------------------
// DemoConfig
// ---------------------------------------------------------------------------

/// Where the demo binary takes its input from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// Synthetic sine tone rendered in real time.
    #[default]
    Tone,
    /// Default input device (requires the `capture` feature).
    Capture,
}

/// Settings for the demo binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub source: InputSource,
    /// Frequency of the synthetic tone in Hz.
    pub tone_hz: f32,
    /// How long to run before tearing the host down.
    pub duration_secs: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            source: InputSource::default(),
            tone_hz: 440.0,
            duration_secs: 2.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use frame_forwarder::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub host: HostConfig,
    pub conduit: ConduitConfig,
    pub processor: ProcessorConfig,
    pub consumer: ConsumerConfig,
    pub demo: DemoConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the host cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.host.sample_rate > 0, "host.sample_rate must be > 0");
        ensure!(self.host.quantum_frames > 0, "host.quantum_frames must be > 0");
        ensure!(self.host.channels > 0, "host.channels must be > 0");
        ensure!(self.conduit.capacity_blocks > 0, "conduit.capacity_blocks must be > 0");
        ensure!(
            self.conduit
                .capacity_blocks
                .checked_mul(self.host.quantum_frames)
                .is_some_and(|n| n <= MAX_CONDUIT_SAMPLES),
            "conduit.capacity_blocks x host.quantum_frames must not exceed {MAX_CONDUIT_SAMPLES} samples"
        );
        ensure!(!self.processor.name.is_empty(), "processor.name must not be empty");
        ensure!(self.consumer.poll_interval_ms > 0, "consumer.poll_interval_ms must be > 0");
        ensure!(
            self.demo.duration_secs.is_finite() && self.demo.duration_secs >= 0.0,
            "demo.duration_secs must be a non-negative number"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
