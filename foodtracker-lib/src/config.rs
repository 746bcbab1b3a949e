use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    fs::{config_dir, meals_file},
    store::{MealStore, StoreError},
};

const FILE_NAME: &str = "foodtracker.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access the configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to write the configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// User configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the meal list is saved. Defaults to the data directory.
    pub data_file: Option<PathBuf>,
    /// Start with the sample meals when no list has been saved yet.
    pub seed_sample_meals: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            seed_sample_meals: true,
        }
    }
}

impl Config {
    /// Load the configuration file from the configuration directory, writing out the defaults
    /// if it doesn't exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_dir()?.join(FILE_NAME))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(Self::parse(&contents).unwrap_or_else(|e| {
                warn!("Ignoring {}: {e}", path.display());
                Self::default()
            }))
        } else {
            let cfg = Self::default();
            cfg.save_to(path)?;
            Ok(cfg)
        }
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, contents)?;

        Ok(())
    }

    /// The configured meals file, or the default one in the data directory.
    pub fn data_file(&self) -> io::Result<PathBuf> {
        match &self.data_file {
            Some(path) => Ok(path.clone()),
            None => meals_file(),
        }
    }

    pub fn store(&self) -> Result<MealStore, StoreError> {
        Ok(MealStore::at(self.data_file()?))
    }
}
