//! Creating child documents under a granted tree.

pub mod local;

pub use local::LocalDocuments;

use std::io;
use tracing::{debug, warn};

use crate::error::{Result, TreeError};
use crate::tree::{DocumentUri, TreeUri};

/// Content type that asks a provider to create a directory
pub const MIME_TYPE_DIR: &str = "vnd.android.document/directory";

/// The tree-storage service that owns the documents
pub trait DocumentResolver: Send + Sync {
    /// Create a document named `display_name` under `parent`.
    ///
    /// Returns the new document's reference, or `None` when the provider
    /// declined without reporting an error. How an existing name is handled
    /// is up to the provider.
    fn create_document(
        &self,
        parent: &DocumentUri,
        mime_type: &str,
        display_name: &str,
    ) -> io::Result<Option<String>>;
}

/// Create a directory named `name` at the root of the tree `parent`
pub fn create_child(resolver: &dyn DocumentResolver, parent: &str, name: &str) -> Result<String> {
    let tree = TreeUri::parse(parent)?;
    let parent_document = tree.root_document();
    debug!(parent = %parent_document, name, "creating directory");

    resolver
        .create_document(&parent_document, MIME_TYPE_DIR, name)
        .map_err(|e| TreeError::collaborator("create document", e))?
        .ok_or_else(|| {
            TreeError::collaborator(
                "create document",
                io::Error::other("provider returned no document"),
            )
        })
}

/// Create a folder under a tree reference, returning its reference.
///
/// `None` when no resolver is supplied (no call is made) and on every failure.
pub fn create_folder_in_uri(
    context: Option<&dyn DocumentResolver>,
    parent: &str,
    name: &str,
) -> Option<String> {
    let Some(resolver) = context else {
        debug!(error = %TreeError::InvalidContext, "skipping folder creation");
        return None;
    };

    match create_child(resolver, parent, name) {
        Ok(uri) => Some(uri),
        Err(e) => {
            warn!(parent, name, error = %e, "failed to create folder");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingResolver {
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl DocumentResolver for RecordingResolver {
        fn create_document(
            &self,
            parent: &DocumentUri,
            mime_type: &str,
            display_name: &str,
        ) -> io::Result<Option<String>> {
            self.calls.lock().unwrap().push((
                parent.to_string(),
                mime_type.to_string(),
                display_name.to_string(),
            ));
            Ok(Some("tree://auth/doc/newid".to_string()))
        }
    }

    #[test]
    fn test_creates_under_root_document() {
        let resolver = RecordingResolver::default();
        let uri = create_child(
            &resolver,
            "content://com.android.externalstorage.documents/tree/primary%3AMovies",
            "Clips",
        )
        .unwrap();
        assert_eq!(uri, "tree://auth/doc/newid");

        let calls = resolver.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            "content://com.android.externalstorage.documents/tree/primary%3AMovies/document/primary%3AMovies"
        );
        assert_eq!(calls[0].1, MIME_TYPE_DIR);
        assert_eq!(calls[0].2, "Clips");
    }

    #[test]
    fn test_malformed_parent_makes_no_call() {
        let resolver = RecordingResolver::default();
        assert!(create_folder_in_uri(Some(&resolver), "garbage", "Clips").is_none());
        assert!(resolver.calls.lock().unwrap().is_empty());
    }
}
