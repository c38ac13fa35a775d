//! Free space of the volume backing a tree reference.
//!
//! The chain is parse → match → query. [`resolve_free_space`] keeps the typed
//! error; [`get_free_space`] collapses every failure to [`FREE_SPACE_UNKNOWN`].

mod statvfs;

pub use statvfs::Statvfs;

use std::io;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, TreeError};
use crate::tree::parse_tree_reference;
use crate::volume::{VolumeLister, resolve_volume_root};

/// Returned when the free space could not be determined
pub const FREE_SPACE_UNKNOWN: i64 = -1;

/// Reports filesystem statistics for a mount path
pub trait FsStats: Send + Sync {
    /// Bytes available to unprivileged callers on the filesystem holding `path`
    fn available_bytes(&self, path: &Path) -> io::Result<u64>;
}

/// Available bytes at `root`, keeping the failure
pub fn query_available(root: &Path, stats: &dyn FsStats) -> Result<u64> {
    stats
        .available_bytes(root)
        .map_err(|e| TreeError::collaborator("query filesystem statistics", e))
}

/// Available bytes at `root`, or `-1` when `root` is absent or the query fails.
///
/// An absent root never reaches `stats`.
pub fn free_space(root: Option<&Path>, stats: &dyn FsStats) -> i64 {
    let Some(root) = root else {
        return FREE_SPACE_UNKNOWN;
    };

    match query_available(root, stats) {
        Ok(bytes) => to_signed(bytes),
        Err(e) => {
            warn!(root = %root.display(), error = %e, "free space query failed");
            FREE_SPACE_UNKNOWN
        }
    }
}

/// Parse a tree reference, find its volume and query that volume's free space
pub fn resolve_free_space(
    reference: &str,
    volumes: &dyn VolumeLister,
    stats: &dyn FsStats,
) -> Result<u64> {
    let id = parse_tree_reference(reference)?;
    let root = resolve_volume_root(&id, volumes)?;
    let bytes = query_available(&root, stats)?;
    debug!(token = id.storage_token(), root = %root.display(), bytes, "resolved free space");
    Ok(bytes)
}

/// Free space of the volume backing `reference`, or `-1` on any failure
pub fn get_free_space(volumes: &dyn VolumeLister, stats: &dyn FsStats, reference: &str) -> i64 {
    match resolve_free_space(reference, volumes, stats) {
        Ok(bytes) => to_signed(bytes),
        Err(e) => {
            warn!(reference, error = %e, "could not determine free space");
            FREE_SPACE_UNKNOWN
        }
    }
}

fn to_signed(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedStats {
        bytes: io::Result<u64>,
        calls: AtomicUsize,
    }

    impl FixedStats {
        fn ok(bytes: u64) -> Self {
            FixedStats {
                bytes: Ok(bytes),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            FixedStats {
                bytes: Err(io::Error::new(io::ErrorKind::NotFound, "not mounted")),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl FsStats for FixedStats {
        fn available_bytes(&self, _path: &Path) -> io::Result<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.bytes {
                Ok(b) => Ok(*b),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    #[test]
    fn test_absent_root_skips_stats() {
        let stats = FixedStats::ok(10);
        assert_eq!(free_space(None, &stats), FREE_SPACE_UNKNOWN);
        assert_eq!(stats.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reports_bytes() {
        let stats = FixedStats::ok(5_000_000_000);
        assert_eq!(free_space(Some(Path::new("/storage/1234-ABCD")), &stats), 5_000_000_000);
        assert_eq!(stats.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_becomes_sentinel() {
        let stats = FixedStats::failing();
        assert_eq!(free_space(Some(Path::new("/nowhere")), &stats), FREE_SPACE_UNKNOWN);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let stats = FixedStats::ok(u64::MAX);
        assert_eq!(free_space(Some(Path::new("/big")), &stats), i64::MAX);
    }
}
