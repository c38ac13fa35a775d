pub mod matcher;
pub mod storage_dir;

pub use matcher::{is_volume_token, match_volume, resolve_volume_root};
pub use storage_dir::StorageDirVolumes;

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// A mounted storage volume as reported by the enumeration service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDescriptor {
    /// Volume identifier such as `1234-ABCD`; absent for the primary volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Mount point of the volume's filesystem
    pub root: PathBuf,
}

impl VolumeDescriptor {
    pub fn new(uuid: Option<String>, root: impl Into<PathBuf>) -> Self {
        VolumeDescriptor {
            uuid,
            root: root.into(),
        }
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Enumerates the currently mounted storage volumes.
///
/// Each call is a fresh snapshot; nothing is cached between calls.
pub trait VolumeLister: Send + Sync {
    fn list_volumes(&self) -> io::Result<Vec<VolumeDescriptor>>;
}

/// A fixed volume list, typically loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticVolumes {
    volumes: Vec<VolumeDescriptor>,
}

impl StaticVolumes {
    pub fn new(volumes: Vec<VolumeDescriptor>) -> Self {
        StaticVolumes { volumes }
    }
}

impl VolumeLister for StaticVolumes {
    fn list_volumes(&self) -> io::Result<Vec<VolumeDescriptor>> {
        Ok(self.volumes.clone())
    }
}
