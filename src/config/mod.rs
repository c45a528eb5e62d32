use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chat::OnChatError;
use crate::generate::DEFAULT_TEMPERATURE;
use crate::model::ModelId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Overrides the automatic upgrade to the most capable model.
    pub model: Option<ModelId>,
    pub on_error: OnChatError,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { model: None, on_error: OnChatError::SubstituteMessage }
    }
}

/// Runtime settings. The API key is deliberately absent: it lives in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub default_model: ModelId,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Where the history slot is stored.
    pub data_dir: PathBuf,
    /// Where downloads are written.
    pub export_dir: PathBuf,
    pub chat: ChatConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".into(),
            default_model: ModelId::Gemini25Flash,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: 600,
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mobius_prime"),
            export_dir: PathBuf::from("."),
            chat: ChatConfig::default(),
        }
    }
}

impl Config {
    /// `<config dir>/mobius_prime/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mobius_prime").join("config.toml"))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing config TOML")
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s).with_context(|| format!("in {}", path.display()))
    }

    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(p) => Self::load_file(p),
            None => match Self::default_path() {
                Some(p) if p.is_file() => Self::load_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }
}
