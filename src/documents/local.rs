use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::{DocumentResolver, MIME_TYPE_DIR};
use crate::tree::{DocumentId, DocumentUri};
use crate::volume::{VolumeLister, match_volume};

/// Authority of the external storage provider
pub const EXTERNAL_STORAGE_AUTHORITY: &str = "com.android.externalstorage.documents";

/// Attempts at finding a free `name (n)` before giving up
const MAX_UNIQUE_ATTEMPTS: u32 = 32;

/// Document provider backed by the local filesystem.
///
/// `primary:` documents live under the primary root; volume tokens are
/// resolved through the volume lister on every call.
pub struct LocalDocuments {
    authority: String,
    primary_root: Option<PathBuf>,
    volumes: Box<dyn VolumeLister>,
}

impl LocalDocuments {
    pub fn new(
        authority: impl Into<String>,
        primary_root: Option<PathBuf>,
        volumes: Box<dyn VolumeLister>,
    ) -> Self {
        LocalDocuments {
            authority: authority.into(),
            primary_root,
            volumes,
        }
    }

    /// Directory on disk holding the document `id`
    pub fn locate(&self, id: &DocumentId) -> io::Result<PathBuf> {
        let root = if id.is_primary() {
            self.primary_root
                .clone()
                .ok_or_else(|| not_found("primary storage root is not configured"))?
        } else {
            let volumes = self.volumes.list_volumes()?;
            match_volume(id.storage_token(), &volumes)
                .map(Path::to_path_buf)
                .ok_or_else(|| not_found(&format!("no volume for {}", id.storage_token())))?
        };

        let relative = Path::new(id.path());
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("document path escapes its volume: {}", id.path()),
            ));
        }

        Ok(root.join(relative))
    }
}

fn not_found(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, msg.to_string())
}

fn validate_display_name(name: &str) -> io::Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid display name: {name:?}"),
        ));
    }
    Ok(())
}

/// `name`, then `name (1)`, `name (2)`, ... Files keep their extension last.
fn candidate_name(name: &str, attempt: u32, is_dir: bool) -> String {
    if attempt == 0 {
        return name.to_string();
    }

    match name.rsplit_once('.') {
        Some((stem, ext)) if !is_dir && !stem.is_empty() => format!("{stem} ({attempt}).{ext}"),
        _ => format!("{name} ({attempt})"),
    }
}

fn create_entry(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::create_dir(path)
    } else {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map(|_| ())
    }
}

impl DocumentResolver for LocalDocuments {
    fn create_document(
        &self,
        parent: &DocumentUri,
        mime_type: &str,
        display_name: &str,
    ) -> io::Result<Option<String>> {
        if parent.authority() != self.authority {
            return Err(not_found(&format!("unknown authority {}", parent.authority())));
        }
        validate_display_name(display_name)?;

        let parent_id = DocumentId::parse(parent.document_id())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let dir = self.locate(&parent_id)?;
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", dir.display()),
            ));
        }

        let is_dir = mime_type == MIME_TYPE_DIR;
        for attempt in 0..MAX_UNIQUE_ATTEMPTS {
            let name = candidate_name(display_name, attempt, is_dir);
            let path = dir.join(&name);

            match create_entry(&path, is_dir) {
                Ok(()) => {
                    debug!(path = %path.display(), mime_type, "created document");
                    let child = parent_id.child(&name);
                    return Ok(Some(parent.with_document_id(&child.to_string()).to_string()));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for {display_name:?} in {}", dir.display()),
        ))
    }
}
