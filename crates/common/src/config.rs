use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default frame rate for the render loop.
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 24;

/// Errors from building or loading a host configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("frame rate must be at least 1 frame per second")]
    ZeroFrameRate,
    #[error("unknown resume policy '{0}' (expected 'await-surface' or 'restart-ticker')")]
    UnknownResumePolicy(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fixed render rate in ticks per second. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FrameRate(u32);

impl FrameRate {
    pub fn new(frames_per_second: u32) -> Result<Self, ConfigError> {
        if frames_per_second == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        Ok(Self(frames_per_second))
    }

    pub fn frames_per_second(&self) -> u32 {
        self.0
    }

    /// Time between two ticks.
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.0))
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self(DEFAULT_FRAMES_PER_SECOND)
    }
}

impl TryFrom<u32> for FrameRate {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FrameRate> for u32 {
    fn from(rate: FrameRate) -> Self {
        rate.0
    }
}

/// What a resume notification does to a paused render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResumePolicy {
    /// Stay paused until the host assigns a surface again.
    #[default]
    AwaitSurface,
    /// Restart the ticker on the retained surface.
    RestartTicker,
}

impl fmt::Display for ResumePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitSurface => f.write_str("await-surface"),
            Self::RestartTicker => f.write_str("restart-ticker"),
        }
    }
}

impl FromStr for ResumePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "await-surface" => Ok(Self::AwaitSurface),
            "restart-ticker" => Ok(Self::RestartTicker),
            other => Err(ConfigError::UnknownResumePolicy(other.to_string())),
        }
    }
}

/// Startup configuration for the render and event loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub frames_per_second: FrameRate,
    pub resume_policy: ResumePolicy,
}

impl HostConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn frame_interval(&self) -> Duration {
        self.frames_per_second.interval()
    }
}
