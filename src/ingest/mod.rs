//! Landmark ingestion sources.
//!
//! Landmark inference runs outside this crate. Sources deliver its output, one
//! [`LandmarkFrame`] at a time:
//! - `stub://name`: scripted synthetic hand (demos, tests)
//! - `udp://host:port`: JSON frames, one per datagram, from an external detector process
//! - a local path or `file://` URL: JSON Lines recording (`-` reads stdin)
//!
//! Sources never classify; they only validate frames at the boundary.

mod file;
mod synthetic;
mod udp;

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::landmark::LandmarkFrame;

pub use synthetic::HandPose;

use file::FileLandmarkSource;
use synthetic::SyntheticSource;
use udp::UdpLandmarkSource;

/// Configuration for a landmark source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    /// Source URL. See the module docs for supported forms.
    pub url: String,
    /// Target frame rate. Sources without recorded timestamps are paced to it.
    pub target_fps: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "stub://demo".to_string(),
            target_fps: 30,
        }
    }
}

/// Result of polling a source.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    Frame(LandmarkFrame),
    /// Nothing arrived within the poll window; the stream is still open.
    Idle,
    /// The stream is exhausted.
    Ended,
}

/// Statistics for a landmark source.
#[derive(Clone, Debug)]
pub struct SourceStats {
    pub frames_received: u64,
    pub source: String,
}

/// Landmark source, selected by URL scheme.
pub struct LandmarkSource {
    backend: SourceBackend,
}

enum SourceBackend {
    Synthetic(SyntheticSource),
    Udp(UdpLandmarkSource),
    File(FileLandmarkSource),
}

impl LandmarkSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(anyhow!("landmark source url must not be empty"));
        }
        if config.url.starts_with("stub://") {
            return Ok(Self {
                backend: SourceBackend::Synthetic(SyntheticSource::new(config)),
            });
        }
        if !config.url.contains("://") {
            let path = PathBuf::from(&config.url);
            return Ok(Self {
                backend: SourceBackend::File(FileLandmarkSource::new(config, path)),
            });
        }

        let url = Url::parse(&config.url).context("parse landmark source url")?;
        let backend = match url.scheme() {
            "udp" => SourceBackend::Udp(UdpLandmarkSource::new(config, &url)?),
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| anyhow!("invalid file url {}", config.url))?;
                SourceBackend::File(FileLandmarkSource::new(config, path))
            }
            other => {
                return Err(anyhow!(
                    "unsupported landmark source scheme '{}'; expected stub, udp or file",
                    other
                ))
            }
        };
        Ok(Self { backend })
    }

    /// Open the source.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            SourceBackend::Synthetic(source) => source.connect(),
            SourceBackend::Udp(source) => source.connect(),
            SourceBackend::File(source) => source.connect(),
        }
    }

    /// Wait for the next frame.
    pub fn next_event(&mut self) -> Result<SourceEvent> {
        match &mut self.backend {
            SourceBackend::Synthetic(source) => source.next_event(),
            SourceBackend::Udp(source) => source.next_event(),
            SourceBackend::File(source) => source.next_event(),
        }
    }

    /// Check if the source is healthy.
    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            SourceBackend::Synthetic(source) => source.is_healthy(),
            SourceBackend::Udp(source) => source.is_healthy(),
            SourceBackend::File(source) => source.is_healthy(),
        }
    }

    /// Get frame statistics.
    pub fn stats(&self) -> SourceStats {
        match &self.backend {
            SourceBackend::Synthetic(source) => source.stats(),
            SourceBackend::Udp(source) => source.stats(),
            SourceBackend::File(source) => source.stats(),
        }
    }
}

fn frame_interval(target_fps: u32) -> Duration {
    if target_fps == 0 {
        Duration::from_millis(0)
    } else {
        Duration::from_millis((1000 / target_fps).max(1) as u64)
    }
}

fn health_grace(target_fps: u32) -> Duration {
    let base_ms = if target_fps == 0 {
        2_000
    } else {
        (1000 / target_fps).saturating_mul(6)
    };
    Duration::from_millis(base_ms.max(2_000) as u64)
}
