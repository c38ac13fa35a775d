//! Free-space resolution through the public API with in-memory collaborators.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use treespace::space::Statvfs;
use treespace::volume::{StaticVolumes, StorageDirVolumes};
use treespace::{
    FREE_SPACE_UNKNOWN, FsStats, TreeError, VolumeDescriptor, VolumeLister, get_free_space,
    match_volume, parse_tree_reference, resolve_free_space,
};

const AUTHORITY: &str = "com.android.externalstorage.documents";

fn tree_uri(document_id: &str) -> String {
    format!(
        "content://{AUTHORITY}/tree/{}",
        document_id.replace(':', "%3A").replace('/', "%2F")
    )
}

/// Volume list that counts how often it is asked
struct CountingVolumes {
    volumes: Vec<VolumeDescriptor>,
    calls: AtomicUsize,
}

impl CountingVolumes {
    fn new(volumes: Vec<VolumeDescriptor>) -> Self {
        CountingVolumes {
            volumes,
            calls: AtomicUsize::new(0),
        }
    }
}

impl VolumeLister for CountingVolumes {
    fn list_volumes(&self) -> io::Result<Vec<VolumeDescriptor>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.volumes.clone())
    }
}

/// Filesystem statistics keyed by mount path; unknown paths are not mounted
#[derive(Default)]
struct FakeStats {
    available: HashMap<PathBuf, u64>,
    calls: AtomicUsize,
}

impl FakeStats {
    fn with(path: &str, bytes: u64) -> Self {
        let mut stats = FakeStats::default();
        stats.available.insert(PathBuf::from(path), bytes);
        stats
    }
}

impl FsStats for FakeStats {
    fn available_bytes(&self, path: &Path) -> io::Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.available
            .get(path)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "not a mount point"))
    }
}

fn sd_card() -> Vec<VolumeDescriptor> {
    vec![
        VolumeDescriptor::new(None, "/storage/emulated/0"),
        VolumeDescriptor::new(Some("1234-ABCD".to_string()), "/storage/1234-ABCD"),
    ]
}

#[test]
fn test_primary_storage_is_unresolved() {
    let volumes = CountingVolumes::new(sd_card());
    let stats = FakeStats::with("/storage/emulated/0", 1_000);

    let bytes = get_free_space(&volumes, &stats, &tree_uri("primary:Documents"));

    assert_eq!(bytes, FREE_SPACE_UNKNOWN);
    assert_eq!(stats.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_removable_volume_free_space() {
    let volumes = CountingVolumes::new(sd_card());
    let stats = FakeStats::with("/storage/1234-ABCD", 5_000_000_000);

    let bytes = get_free_space(&volumes, &stats, &tree_uri("1234-ABCD:Pictures"));

    assert_eq!(bytes, 5_000_000_000);
    assert_eq!(volumes.calls.load(Ordering::SeqCst), 1);
    assert_eq!(stats.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unmounted_volume() {
    let volumes = CountingVolumes::new(vec![VolumeDescriptor::new(
        Some("9999-0000".to_string()),
        "/storage/9999-0000",
    )]);
    let stats = FakeStats::with("/storage/1234-ABCD", 5_000_000_000);

    let reference = tree_uri("1234-ABCD:Pictures");
    assert_eq!(get_free_space(&volumes, &stats, &reference), FREE_SPACE_UNKNOWN);
    assert!(matches!(
        resolve_free_space(&reference, &volumes, &stats),
        Err(TreeError::VolumeNotFound { .. })
    ));
    assert_eq!(stats.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unparsable_reference() {
    let volumes = CountingVolumes::new(sd_card());
    let stats = FakeStats::with("/storage/1234-ABCD", 1);

    for reference in ["", "not a uri", "content://provider/document/1234-ABCD%3AX"] {
        assert_eq!(get_free_space(&volumes, &stats, reference), FREE_SPACE_UNKNOWN);
        assert!(matches!(
            resolve_free_space(reference, &volumes, &stats),
            Err(TreeError::MalformedReference { .. })
        ));
    }
    assert_eq!(volumes.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_tree_id_without_colon() {
    let volumes = CountingVolumes::new(sd_card());
    let stats = FakeStats::default();

    for id in ["1234-ABCD", "downloads", "%20"] {
        let reference = format!("content://{AUTHORITY}/tree/{id}");
        assert!(matches!(
            parse_tree_reference(&reference),
            Err(TreeError::MalformedReference { .. })
        ));
        assert_eq!(get_free_space(&volumes, &stats, &reference), FREE_SPACE_UNKNOWN);
    }
}

#[test]
fn test_rejected_mount_path() {
    let volumes = CountingVolumes::new(sd_card());
    let stats = FakeStats::default();

    let reference = tree_uri("1234-ABCD:Pictures");
    assert_eq!(get_free_space(&volumes, &stats, &reference), FREE_SPACE_UNKNOWN);
    assert!(matches!(
        resolve_free_space(&reference, &volumes, &stats),
        Err(TreeError::CollaboratorFailure { .. })
    ));
}

#[test]
fn test_non_token_ignores_volume_list() {
    let volumes = vec![
        VolumeDescriptor::new(Some("primary".to_string()), "/storage/emulated/0"),
        VolumeDescriptor::new(Some("12345-ABCD".to_string()), "/storage/long"),
    ];
    for token in ["primary", "12345-ABCD", "1234_ABCD", "home"] {
        assert_eq!(match_volume(token, &volumes), None);
    }
}

#[test]
fn test_loose_token_pattern_still_resolves() {
    let volumes = StaticVolumes::new(vec![VolumeDescriptor::new(
        Some("SD_1-card".to_string()),
        "/storage/SD_1-card",
    )]);
    let stats = FakeStats::with("/storage/SD_1-card", 42);

    assert_eq!(get_free_space(&volumes, &stats, &tree_uri("SD_1-card:")), 42);
}

#[cfg(unix)]
#[test]
fn test_storage_dir_with_statvfs() {
    let storage = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(storage.path().join("emulated")).unwrap();
    std::fs::create_dir(storage.path().join("0A1B-2C3D")).unwrap();
    let volumes = StorageDirVolumes::new(storage.path());

    let bytes = get_free_space(&volumes, &Statvfs, &tree_uri("0A1B-2C3D:DCIM"));
    assert!(bytes >= 0);

    let missing = get_free_space(&volumes, &Statvfs, &tree_uri("FFFF-FFFF:DCIM"));
    assert_eq!(missing, FREE_SPACE_UNKNOWN);
}
