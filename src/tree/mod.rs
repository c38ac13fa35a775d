pub mod document_id;
pub mod uri;

pub use document_id::{DocumentId, PRIMARY_TOKEN};
pub use uri::{DocumentUri, TreeUri};

use crate::error::Result;

/// Extract the document identifier a tree reference was granted for.
///
/// Fails with `MalformedReference` when the string is not a tree URI or its
/// tree document id has no `:` separator.
pub fn parse_tree_reference(reference: &str) -> Result<DocumentId> {
    let tree = TreeUri::parse(reference)?;
    DocumentId::parse(tree.tree_document_id())
}
