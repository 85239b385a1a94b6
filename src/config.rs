use crate::protocol::WireFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tokio::fs;

/// Advisory power range used to scale a waterfall's colors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min_db: f32,
    pub max_db: f32,
}

impl DisplayRange {
    pub fn new(min_db: f32, max_db: f32) -> Self {
        Self { min_db, max_db }
    }
}

impl Default for DisplayRange {
    fn default() -> Self {
        Self {
            min_db: -60.0,
            max_db: 40.0,
        }
    }
}

/// Deployment settings for one ingest session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterfallConfig {
    /// Rows kept per channel (visible waterfall height)
    pub history_rows: usize,

    /// Message-bus topic carrying spectrogram frames
    pub topic: String,

    pub wire_format: WireFormat,

    /// Range assigned to every new channel
    pub display_range: DisplayRange,

    /// Follow the observed power range instead of the fixed one
    pub auto_range: bool,

    /// Bounded queue between the host transport and the session runner
    pub channel_capacity: usize,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            history_rows: 512,
            topic: "sdr/spectrogram".to_string(),
            wire_format: WireFormat::Auto,
            display_range: DisplayRange::default(),
            auto_range: false,
            channel_capacity: 100,
        }
    }
}

impl WaterfallConfig {
    /// Build from a JSON value; missing fields take their defaults
    pub fn from_json(config: Value) -> Result<Self> {
        let config: Self =
            serde_json::from_value(config).context("Failed to parse waterfall config")?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        // Write to temporary file first
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)
            .await
            .context("Failed to write temporary config file")?;

        fs::rename(&temp_path, path)
            .await
            .context("Failed to atomically update config file")?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_rows == 0 {
            anyhow::bail!("history_rows must be at least 1");
        }
        if self.channel_capacity == 0 {
            anyhow::bail!("channel_capacity must be at least 1");
        }
        let DisplayRange { min_db, max_db } = self.display_range;
        if min_db.is_nan() || max_db.is_nan() || min_db >= max_db {
            anyhow::bail!("display_range min {} dB must be below max {} dB", min_db, max_db);
        }
        Ok(())
    }
}
