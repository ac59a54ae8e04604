// SimLog - GPL-3.0-or-later
// This file is part of SimLog.
//
// Copyright (C) 2026 SimLog Contributors
//
// SimLog is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SimLog is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with SimLog.  If not, see <https://www.gnu.org/licenses/>.

use crate::core::DEFAULT_DELIMITER;
use crate::stats::{Algorithm, DEFAULT_EXTENSIONS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// User configuration stored in the config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Algorithm names compared between baseline and ciphertext logs
    pub algorithms: Vec<String>,

    /// Extensions recognized as comparison files (case-insensitive)
    pub comparison_extensions: Vec<String>,

    /// Field delimiter of benchmark log files
    pub log_delimiter: char,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            algorithms: Algorithm::ALL
                .iter()
                .map(|a| a.log_name().to_string())
                .collect(),
            comparison_extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            log_delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl AnalysisConfig {
    /// Get the path to the global config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("simlog").join("config.json"))
    }

    /// Load the global config, returning defaults if not found or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            tracing::info!("No config found at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!(
                    "Loaded config from {} ({} algorithms)",
                    path.display(),
                    config.algorithms.len()
                );
                config
            }
            Err(e) => {
                tracing::warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to the global location
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
