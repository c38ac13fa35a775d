use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{VolumeDescriptor, VolumeLister, is_volume_token};

/// Default directory under which volumes are mounted
pub const DEFAULT_STORAGE_ROOT: &str = "/storage";

/// Lists volumes mounted as subdirectories of a storage root, e.g.
/// `/storage/emulated` and `/storage/1234-ABCD`.
///
/// A subdirectory whose name is a volume token is reported with that name as
/// its identifier; any other subdirectory is reported without one.
#[derive(Debug, Clone)]
pub struct StorageDirVolumes {
    root: PathBuf,
}

impl StorageDirVolumes {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StorageDirVolumes { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for StorageDirVolumes {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_ROOT)
    }
}

impl VolumeLister for StorageDirVolumes {
    fn list_volumes(&self) -> io::Result<Vec<VolumeDescriptor>> {
        let mut volumes = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let uuid = entry
                .file_name()
                .to_str()
                .filter(|name| is_volume_token(name))
                .map(String::from);

            volumes.push(VolumeDescriptor { uuid, root: path });
        }

        volumes.sort_by(|a, b| a.root.cmp(&b.root));
        debug!(root = %self.root.display(), count = volumes.len(), "listed storage volumes");
        Ok(volumes)
    }
}
