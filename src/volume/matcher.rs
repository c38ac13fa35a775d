use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use super::{VolumeDescriptor, VolumeLister};
use crate::error::{Result, TreeError};
use crate::tree::DocumentId;

/// Two groups of four ASCII word characters. Loose on purpose: `\w` admits
/// more than hex digits.
static VOLUME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?-u:\w){4}-(?-u:\w){4}$").unwrap());

/// Whether a storage token looks like a removable volume identifier
pub fn is_volume_token(token: &str) -> bool {
    VOLUME_TOKEN.is_match(token)
}

/// Root path of the first volume whose identifier equals `token`.
///
/// Tokens that are not volume tokens never match. Comparison is exact and
/// case-sensitive, and volumes without an identifier are skipped.
pub fn match_volume<'a>(token: &str, volumes: &'a [VolumeDescriptor]) -> Option<&'a Path> {
    if !is_volume_token(token) {
        return None;
    }

    volumes
        .iter()
        .find(|v| v.uuid() == Some(token))
        .map(|v| v.root())
}

/// Resolve the mount point backing a document identifier.
///
/// The primary token is not resolved: it fails with `VolumeNotFound` like any
/// other token that is not a volume token, without listing volumes.
pub fn resolve_volume_root(id: &DocumentId, lister: &dyn VolumeLister) -> Result<PathBuf> {
    let token = id.storage_token();

    if !is_volume_token(token) {
        debug!(token, "storage token is not a removable volume token");
        return Err(TreeError::VolumeNotFound {
            token: token.to_string(),
        });
    }

    let volumes = lister
        .list_volumes()
        .map_err(|e| TreeError::collaborator("list storage volumes", e))?;

    match match_volume(token, &volumes) {
        Some(root) => {
            debug!(token, root = %root.display(), "matched storage volume");
            Ok(root.to_path_buf())
        }
        None => Err(TreeError::VolumeNotFound {
            token: token.to_string(),
        }),
    }
}
