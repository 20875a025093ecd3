use serde_derive::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::format::Format;
use crate::scorer::{DEFAULT_CLASS_ID, DEFAULT_DANGER_THRESHOLD, DEFAULT_HEIGHT_DIFF};

const DEFAULT_BASEPATH: &str = "metadata";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// only detections of this class are scored
    pub class_id: i32,
    /// pairs whose heights differ by more than this fraction are ignored
    pub height_diff: f32,
    pub danger_threshold: f32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            class_id: DEFAULT_CLASS_ID,
            height_diff: DEFAULT_HEIGHT_DIFF,
            danger_threshold: DEFAULT_DANGER_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub basepath: PathBuf,
    pub format: Format,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            basepath: PathBuf::from(DEFAULT_BASEPATH),
            format: Format::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scorer: ScorerConfig,
    pub broker: BrokerConfig,
}

impl Config {
    pub fn from_toml_str(src: &str) -> Result<Self, Error> {
        Ok(toml::from_str(src)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let src = std::fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }
}
