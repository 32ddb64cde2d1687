use gesture_hand_detector::SkinHandDetector;
use gesture_shared::ClassifierSettings;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// The sample config shipped with the server; every value equals the default
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub min_skin_pixels: usize,
    pub sample_stride: usize,
    pub min_elongation: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_skin_pixels: 2000,
            sample_stride: 2,
            min_elongation: 1.4,
        }
    }
}

impl DetectorConfig {
    pub fn build(&self) -> SkinHandDetector {
        SkinHandDetector::new()
            .with_min_skin_pixels(self.min_skin_pixels)
            .with_sample_stride(self.sample_stride)
            .with_min_elongation(self.min_elongation)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub classifier: ClassifierSettings,
    pub detector: DetectorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            classifier: ClassifierSettings::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.classifier;
        if !(c.direction_threshold > 0.0 && c.direction_threshold < 1.0) {
            return Err(ConfigError::Invalid(
                "classifier.direction_threshold must be in (0,1) normalized units".into(),
            ));
        }
        if !(c.extension_threshold > 0.0 && c.extension_threshold < 1.0) {
            return Err(ConfigError::Invalid(
                "classifier.extension_threshold must be in (0,1) normalized units".into(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".into()));
        }
        if self.detector.sample_stride == 0 {
            return Err(ConfigError::Invalid(
                "detector.sample_stride must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
