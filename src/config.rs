use std::env;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LinkNestError, Result};
use crate::storage::{StorageKeys, DEFAULT_KEY_NAMESPACE};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "LINKNEST_DATA_DIR";

/// Name of the optional config file inside the data directory.
pub const CONFIG_FILE: &str = "config.yaml";

const DOCUMENTS_DIR_NAME: &str = "LinkNestDocuments";

/// Where and how the organizer keeps its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for stored collections and imported documents
    pub data_dir: PathBuf,
    /// Subdirectory of `data_dir` holding imported document files
    pub documents_dir_name: String,
    /// Prefix of every storage key
    pub key_namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            documents_dir_name: DOCUMENTS_DIR_NAME.to_string(),
            key_namespace: DEFAULT_KEY_NAMESPACE.to_string(),
        }
    }
}

impl Config {
    /// Config rooted at `data_dir` with every other setting defaulted.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Read a YAML config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective config.
    ///
    /// The data directory comes from `data_dir_override`, then
    /// `LINKNEST_DATA_DIR`, then the platform default. A `config.yaml` found
    /// in that directory supplies the remaining settings.
    pub fn resolve(data_dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir_override
            .or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        let file = data_dir.join(CONFIG_FILE);
        let mut config = if file.is_file() {
            debug!(path = %file.display(), "config: loading file");
            Self::from_file(&file)?
        } else {
            Self::default()
        };
        config.data_dir = data_dir;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.documents_dir_name.trim().is_empty() {
            return Err(LinkNestError::Config(
                "documents_dir_name must not be empty".to_string(),
            ));
        }
        if self.documents_dir_name.contains(['/', '\\']) {
            return Err(LinkNestError::Config(format!(
                "documents_dir_name must be a single directory name, got '{}'",
                self.documents_dir_name
            )));
        }
        if self.key_namespace.trim().is_empty() {
            return Err(LinkNestError::Config("key_namespace must not be empty".to_string()));
        }
        Ok(())
    }

    /// Directory imported documents are copied into.
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join(&self.documents_dir_name)
    }

    /// Directory the on-disk key-value store writes to.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::new(self.key_namespace.clone())
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "LinkNest")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".linknest"))
}
