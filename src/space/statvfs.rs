use std::io;
use std::path::Path;

use super::FsStats;

/// Filesystem statistics from `statvfs(2)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Statvfs;

#[cfg(unix)]
impl FsStats for Statvfs {
    fn available_bytes(&self, path: &Path) -> io::Result<u64> {
        let stat = nix::sys::statvfs::statvfs(path).map_err(io::Error::from)?;
        Ok((stat.blocks_available() as u64).saturating_mul(stat.fragment_size() as u64))
    }
}

#[cfg(not(unix))]
impl FsStats for Statvfs {
    fn available_bytes(&self, _path: &Path) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "statvfs is not available on this platform",
        ))
    }
}
