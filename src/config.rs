use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::documents::LocalDocuments;
use crate::documents::local::EXTERNAL_STORAGE_AUTHORITY;
use crate::volume::storage_dir::DEFAULT_STORAGE_ROOT;
use crate::volume::{StaticVolumes, StorageDirVolumes, VolumeDescriptor, VolumeLister};

/// Where volumes and documents live on this host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory whose subdirectories are the mounted volumes
    pub storage_root: PathBuf,
    /// Directory backing `primary:` documents
    pub primary_root: Option<PathBuf>,
    /// Authority served by the local document provider
    pub authority: String,
    /// Fixed volume list; when non-empty `storage_root` is not scanned
    pub volumes: Vec<VolumeDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            primary_root: None,
            authority: EXTERNAL_STORAGE_AUTHORITY.to_string(),
            volumes: Vec::new(),
        }
    }
}

impl Config {
    /// `<config dir>/treespace/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("treespace");
            p.push("config.json");
            p
        })
    }

    /// Load an explicit config file, or the default one if it exists.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Volume enumeration for this configuration
    pub fn volume_lister(&self) -> Box<dyn VolumeLister> {
        if self.volumes.is_empty() {
            Box::new(StorageDirVolumes::new(&self.storage_root))
        } else {
            Box::new(StaticVolumes::new(self.volumes.clone()))
        }
    }

    /// Local document provider for this configuration
    pub fn documents(&self) -> LocalDocuments {
        LocalDocuments::new(
            self.authority.clone(),
            self.primary_root.clone(),
            self.volume_lister(),
        )
    }
}
