use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use prism_engine::logging::LoggingConfig;
use prism_engine::texture::{VaultConfig, DEFAULT_TEXTURE_ROOT};
use prism_engine::time::DEFAULT_REDRAW_INTERVAL;
use prism_engine::window::RuntimeConfig;
use winit::dpi::LogicalSize;

/// Viewer settings, read from an optional JSON file. Every field may be
/// omitted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub redraw_interval_ms: u64,
    pub texture_root: PathBuf,
    /// Texture drawn on the bootstrap triangle, relative to `texture_root`.
    pub texture: Option<String>,
    pub log_filter: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            title: runtime.title,
            width: runtime.initial_size.width,
            height: runtime.initial_size.height,
            redraw_interval_ms: DEFAULT_REDRAW_INTERVAL.as_millis() as u64,
            texture_root: PathBuf::from(DEFAULT_TEXTURE_ROOT),
            texture: None,
            log_filter: None,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        anyhow::ensure!(
            config.width > 0.0 && config.height > 0.0,
            "window size must be positive, got {}x{}",
            config.width,
            config.height
        );
        anyhow::ensure!(config.redraw_interval_ms > 0, "redraw_interval_ms must be positive");
        Ok(config)
    }

    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width, self.height),
            redraw_interval: Duration::from_millis(self.redraw_interval_ms),
        }
    }

    pub fn vault(&self) -> VaultConfig {
        VaultConfig {
            root: self.texture_root.clone(),
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log_filter.clone(),
            ..LoggingConfig::default()
        }
    }
}
