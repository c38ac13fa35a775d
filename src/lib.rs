//! Resolve document-tree references.
//!
//! Two operations share the tree reference: creating a folder inside the tree
//! ([`create_folder_in_uri`]) and reporting the free space of the volume that
//! backs it ([`get_free_space`]). The storage service, volume enumeration and
//! filesystem statistics are passed in as trait objects.

pub mod blocking;
pub mod config;
pub mod documents;
pub mod error;
pub mod space;
pub mod tree;
pub mod volume;

pub use documents::{DocumentResolver, MIME_TYPE_DIR, create_child, create_folder_in_uri};
pub use error::{Result, TreeError};
pub use space::{FREE_SPACE_UNKNOWN, FsStats, free_space, get_free_space, resolve_free_space};
pub use tree::{DocumentId, DocumentUri, TreeUri, parse_tree_reference};
pub use volume::{VolumeDescriptor, VolumeLister, match_volume};
