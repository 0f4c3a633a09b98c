//! Server configuration, loaded from a TOML file with env overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{PotencyError, Result};

/// Top-level configuration for the Potentia server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Path to the pretrained gradient-boosting artifact (JSON).
    pub model_path: PathBuf,
    /// Origins allowed by the CORS layer. `"*"` opens the API up fully
    /// and is only appropriate for local demos.
    pub cors_allowed_origins: Vec<String>,
    pub padel: PadelConfig,
    pub pubchem: PubchemConfig,
}

/// Invocation settings for the external PaDEL fingerprinting tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PadelConfig {
    /// Java launcher; an absolute path or anything resolvable on PATH.
    pub java_bin: PathBuf,
    pub jar_path: PathBuf,
    /// PubChem fingerprint definition XML shipped with PaDEL.
    pub descriptor_types_path: PathBuf,
    /// Hard deadline for one subprocess invocation, in seconds.
    pub timeout_secs: u64,
}

/// PubChem PUG REST settings for IUPAC name resolution.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PubchemConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            model_path: PathBuf::from("./GradientBoostingRegressor.json"),
            cors_allowed_origins: vec![
                "http://localhost".to_string(),
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
            ],
            padel: PadelConfig::default(),
            pubchem: PubchemConfig::default(),
        }
    }
}

impl Default for PadelConfig {
    fn default() -> Self {
        Self {
            java_bin: PathBuf::from("java"),
            jar_path: PathBuf::from("./PaDEL-Descriptor/PaDEL-Descriptor.jar"),
            descriptor_types_path: PathBuf::from("./PaDEL-Descriptor/PubchemFingerprinter.xml"),
            timeout_secs: 60,
        }
    }
}

impl Default for PubchemConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pubchem.ncbi.nlm.nih.gov/rest/pug".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Config {
    /// Load configuration from the file named by `POTENTIA_CONFIG`
    /// (default `potentia.toml`). A missing file yields the defaults;
    /// a malformed file is a hard error.
    pub fn load() -> Result<Self> {
        let path = std::env::var("POTENTIA_CONFIG")
            .unwrap_or_else(|_| "potentia.toml".to_string());
        Self::from_file(Path::new(&path))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| PotencyError::Config(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
