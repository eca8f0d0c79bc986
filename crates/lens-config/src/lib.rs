use lens_core::{LensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportingConfig {
    #[serde(default)]
    pub reporting: ReportingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingSettings {
    /// Gates the experimental inquiry-to-response ratio: when off, the
    /// ratio is neither placed into the result nor logged.
    #[serde(default = "default_inquiry_ratio_enabled")]
    pub inquiry_ratio_enabled: bool,
    /// When set, every computed metric is appended to this JSONL file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_path: Option<PathBuf>,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            inquiry_ratio_enabled: default_inquiry_ratio_enabled(),
            metrics_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub verbose: bool,
}

impl ReportingConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| LensError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self> {
        let config: ReportingConfig = serde_yaml::from_str(yaml)
            .map_err(|e| LensError::Config(format!("Failed to parse YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.reporting.metrics_path {
            if path.is_dir() {
                return Err(LensError::Config(format!(
                    "metrics_path must be a file, got directory: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

fn default_inquiry_ratio_enabled() -> bool {
    true
}
