use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::classify::{ClassifierSettings, DEFAULT_GRACE_PERIOD};
use crate::dispatch::{DispatchPolicy, DEFAULT_COOLDOWN, DEFAULT_MOVEMENT_COOLDOWN};
use crate::ingest::SourceConfig;
use crate::pipeline::PipelineSettings;

const DEFAULT_SINK_ADDR: &str = "127.0.0.1:1234";
const DEFAULT_SOURCE_URL: &str = "stub://demo";
const DEFAULT_TARGET_FPS: u32 = 30;

pub const ENV_CONFIG: &str = "GESTURE_CONFIG";
pub const ENV_SINK_ADDR: &str = "GESTURE_SINK_ADDR";
pub const ENV_SOURCE_URL: &str = "GESTURE_SOURCE_URL";
pub const ENV_TARGET_FPS: &str = "GESTURE_TARGET_FPS";
pub const ENV_RESET_ON_HAND_LOSS: &str = "GESTURE_RESET_ON_HAND_LOSS";

#[derive(Debug, Deserialize, Default)]
struct RelayConfigFile {
    sink: Option<SinkConfigFile>,
    source: Option<SourceConfigFile>,
    classifier: Option<ClassifierConfigFile>,
    dispatch: Option<DispatchConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct SinkConfigFile {
    addr: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ClassifierConfigFile {
    movement_threshold: Option<f32>,
    hand_size_threshold: Option<f32>,
    grace_period_ms: Option<u64>,
    reset_on_hand_loss: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct DispatchConfigFile {
    cooldown_ms: Option<u64>,
    movement_cooldown_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// `host:port` of the actuator.
    pub sink_addr: String,
    pub source: SourceConfig,
    pub pipeline: PipelineSettings,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            sink_addr: DEFAULT_SINK_ADDR.to_string(),
            source: SourceConfig {
                url: DEFAULT_SOURCE_URL.to_string(),
                target_fps: DEFAULT_TARGET_FPS,
            },
            pipeline: PipelineSettings::default(),
        }
    }
}

impl RelayConfig {
    /// Loads the file named by `GESTURE_CONFIG` (if set), applies env overrides, validates.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var(ENV_CONFIG).ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => read_config_file(path)?,
            None => RelayConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: RelayConfigFile) -> Self {
        let sink_addr = file
            .sink
            .and_then(|sink| sink.addr)
            .unwrap_or_else(|| DEFAULT_SINK_ADDR.to_string());
        let source = SourceConfig {
            url: file
                .source
                .as_ref()
                .and_then(|source| source.url.clone())
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            target_fps: file
                .source
                .as_ref()
                .and_then(|source| source.target_fps)
                .unwrap_or(DEFAULT_TARGET_FPS),
        };

        let classifier_file = file.classifier.unwrap_or_default();
        let defaults = ClassifierSettings::default();
        let classifier = ClassifierSettings {
            movement_threshold: classifier_file
                .movement_threshold
                .unwrap_or(defaults.movement_threshold),
            hand_size_threshold: classifier_file
                .hand_size_threshold
                .unwrap_or(defaults.hand_size_threshold),
            grace_period: classifier_file
                .grace_period_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_GRACE_PERIOD),
        };

        let dispatch_file = file.dispatch.unwrap_or_default();
        let dispatch = DispatchPolicy {
            cooldown: dispatch_file
                .cooldown_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_COOLDOWN),
            movement_cooldown: dispatch_file
                .movement_cooldown_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_MOVEMENT_COOLDOWN),
        };

        Self {
            sink_addr,
            source,
            pipeline: PipelineSettings {
                classifier,
                dispatch,
                reset_on_hand_loss: classifier_file.reset_on_hand_loss.unwrap_or(false),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var(ENV_SINK_ADDR) {
            if !addr.trim().is_empty() {
                self.sink_addr = addr.trim().to_string();
            }
        }
        if let Ok(url) = std::env::var(ENV_SOURCE_URL) {
            if !url.trim().is_empty() {
                self.source.url = url.trim().to_string();
            }
        }
        if let Ok(fps) = std::env::var(ENV_TARGET_FPS) {
            self.source.target_fps = fps
                .trim()
                .parse()
                .map_err(|_| anyhow!("{} must be an integer frame rate", ENV_TARGET_FPS))?;
        }
        if let Ok(reset) = std::env::var(ENV_RESET_ON_HAND_LOSS) {
            self.pipeline.reset_on_hand_loss = parse_bool(&reset).ok_or_else(|| {
                anyhow!("{} must be true/false (or 1/0)", ENV_RESET_ON_HAND_LOSS)
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_sink_addr(&self.sink_addr)?;
        if self.source.url.trim().is_empty() {
            return Err(anyhow!("source url must not be empty"));
        }
        if self.source.target_fps == 0 {
            return Err(anyhow!("target_fps must be >= 1"));
        }

        let classifier = &self.pipeline.classifier;
        for (name, value) in [
            ("movement_threshold", classifier.movement_threshold),
            ("hand_size_threshold", classifier.hand_size_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(anyhow!("{} must be a positive number, got {}", name, value));
            }
        }
        for (name, value) in [
            ("grace_period", classifier.grace_period),
            ("cooldown", self.pipeline.dispatch.cooldown),
            ("movement_cooldown", self.pipeline.dispatch.movement_cooldown),
        ] {
            if value.is_zero() {
                return Err(anyhow!("{} must be greater than zero", name));
            }
        }
        Ok(())
    }
}

/// Checks `host:port` shape. Resolution happens when the sink is opened.
pub fn validate_sink_addr(addr: &str) -> Result<()> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("sink address '{}' must be host:port", addr))?;
    if host.trim().is_empty() {
        return Err(anyhow!("sink address '{}' is missing a host", addr));
    }
    let port: u16 = port
        .parse()
        .map_err(|_| anyhow!("sink address '{}' has an invalid port", addr))?;
    if port == 0 {
        return Err(anyhow!("sink address '{}' must name a non-zero port", addr));
    }
    Ok(())
}

fn read_config_file(path: &Path) -> Result<RelayConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
