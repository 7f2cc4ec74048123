//! Configuration: worker limits and working-folder names

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pool::DEFAULT_MAX_WORKERS;
use crate::store::LoadOptions;

/// Default temporary folder name
pub const DEFAULT_TEMP_FOLDER: &str = "Tabula";

/// Names of the folders and files tabula stages work in.
///
/// Paths resolve under `base_dir`, or the system temp directory when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderConfig {
    pub base_dir: Option<PathBuf>,
    pub temp_folder_name: String,
    pub plugin_folder_name: String,
    pub plugin_info_folder_name: String,
    pub plugin_info_file_name: String,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            temp_folder_name: DEFAULT_TEMP_FOLDER.to_string(),
            plugin_folder_name: "Plugin".to_string(),
            plugin_info_folder_name: "PluginInfoTemp".to_string(),
            plugin_info_file_name: "PluginInfoTemp.xml".to_string(),
        }
    }
}

impl FolderConfig {
    /// Append a marking code to the configured temp folder name.
    ///
    /// A blank code leaves the configuration unchanged.
    pub fn with_marking_code(mut self, code: &str) -> Self {
        let code = code.trim();
        if !code.is_empty() {
            self.temp_folder_name.push_str(code);
        }
        self
    }

    /// Resolve paths under `base_dir`
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, base_dir: P) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    fn base(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn temp_folder(&self) -> PathBuf {
        self.base().join(&self.temp_folder_name)
    }

    pub fn plugin_folder(&self) -> PathBuf {
        self.temp_folder().join(&self.plugin_folder_name)
    }

    /// Plugin info folder, created if missing
    pub fn plugin_info_folder(&self) -> Result<PathBuf> {
        let dir = self.plugin_folder().join(&self.plugin_info_folder_name);
        crate::fsutil::ensure_folder(&dir)?;
        Ok(dir)
    }

    /// Plugin info file inside [`Self::plugin_info_folder`]
    pub fn plugin_info_file(&self) -> Result<PathBuf> {
        Ok(self.plugin_info_folder()?.join(&self.plugin_info_file_name))
    }

    /// `file_name` inside the temp folder
    pub fn temp_path<P: AsRef<Path>>(&self, file_name: P) -> PathBuf {
        self.temp_folder().join(file_name)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabulaConfig {
    /// Working folders
    pub folders: FolderConfig,
    /// Threads for row loading and partition writes
    pub max_workers: usize,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            folders: FolderConfig::default(),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl TabulaConfig {
    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse and validate JSON configuration
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable values
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(Error::InvalidConfig("max_workers must be at least 1".into()));
        }
        if self.folders.temp_folder_name.trim().is_empty() {
            return Err(Error::InvalidConfig("temp_folder_name must not be empty".into()));
        }
        Ok(())
    }

    /// Load options carrying this configuration's worker count
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            max_workers: self.max_workers,
            ..LoadOptions::default()
        }
    }
}
