use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Result, TreeError};

/// First path segment of a tree reference
pub const TREE_SEGMENT: &str = "tree";
/// Path segment introducing a document inside a tree
pub const DOCUMENT_SEGMENT: &str = "document";

/// Bytes left alone when encoding an identifier into a path segment.
/// Everything else, including `:` and `/`, becomes `%XX`.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'-')
    .remove(b'!')
    .remove(b'.')
    .remove(b'~')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

/// Percent-encode an identifier for use as a single path segment
pub fn encode_segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

fn decode_segment(reference: &str, segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| TreeError::malformed(reference, "path segment is not valid UTF-8"))
}

/// Parse a URL and return it with its non-empty, still-encoded path segments
fn parse_url(reference: &str) -> Result<(Url, Vec<String>)> {
    let url = Url::parse(reference).map_err(|e| TreeError::malformed(reference, e.to_string()))?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(TreeError::malformed(reference, "missing authority"));
    }

    let segments: Vec<String> = url
        .path_segments()
        .ok_or_else(|| TreeError::malformed(reference, "URI has no path"))?
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    Ok((url, segments))
}

fn document_url(base: &Url, tree_document_id: &str, document_id: &str) -> Url {
    let mut url = base.clone();
    url.set_path(&format!(
        "/{}/{}/{}/{}",
        TREE_SEGMENT,
        encode_segment(tree_document_id),
        DOCUMENT_SEGMENT,
        encode_segment(document_id)
    ));
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// A granted tree reference, e.g.
/// `content://com.android.externalstorage.documents/tree/1234-ABCD%3APictures`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeUri {
    url: Url,
    tree_document_id: String,
}

impl TreeUri {
    /// Parse a tree reference.
    ///
    /// The path must start with `tree/<id>`; anything after the tree id (such
    /// as a `document/<id>` suffix) is accepted and ignored.
    pub fn parse(reference: &str) -> Result<Self> {
        let (url, segments) = parse_url(reference)?;

        match segments.as_slice() {
            [first, id, ..] if first == TREE_SEGMENT => {
                let tree_document_id = decode_segment(reference, id)?;
                Ok(TreeUri {
                    url,
                    tree_document_id,
                })
            }
            _ => Err(TreeError::malformed(reference, "not a tree URI")),
        }
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Authority (provider) that issued this tree
    pub fn authority(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Decoded document id of the tree root, e.g. `1234-ABCD:Pictures`
    pub fn tree_document_id(&self) -> &str {
        &self.tree_document_id
    }

    /// Document URI of the tree's root document
    pub fn root_document(&self) -> DocumentUri {
        self.document(&self.tree_document_id)
    }

    /// Document URI for `document_id` addressed through this tree
    pub fn document(&self, document_id: &str) -> DocumentUri {
        DocumentUri {
            url: document_url(&self.url, &self.tree_document_id, document_id),
            tree_document_id: Some(self.tree_document_id.clone()),
            document_id: document_id.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl FromStr for TreeUri {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self> {
        TreeUri::parse(s)
    }
}

impl fmt::Display for TreeUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// A reference to a single document, either `tree/<t>/document/<d>` or a
/// bare `document/<d>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUri {
    url: Url,
    tree_document_id: Option<String>,
    document_id: String,
}

impl DocumentUri {
    pub fn parse(reference: &str) -> Result<Self> {
        let (url, segments) = parse_url(reference)?;

        match segments.as_slice() {
            [tree, tree_id, document, doc_id, ..]
                if tree == TREE_SEGMENT && document == DOCUMENT_SEGMENT =>
            {
                Ok(DocumentUri {
                    tree_document_id: Some(decode_segment(reference, tree_id)?),
                    document_id: decode_segment(reference, doc_id)?,
                    url,
                })
            }
            [document, doc_id, ..] if document == DOCUMENT_SEGMENT => Ok(DocumentUri {
                tree_document_id: None,
                document_id: decode_segment(reference, doc_id)?,
                url,
            }),
            _ => Err(TreeError::malformed(reference, "not a document URI")),
        }
    }

    pub fn authority(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn tree_document_id(&self) -> Option<&str> {
        self.tree_document_id.as_deref()
    }

    /// Another document in the same tree (or a bare document URI when this one has no tree)
    pub fn with_document_id(&self, document_id: &str) -> DocumentUri {
        let url = match &self.tree_document_id {
            Some(tree_id) => document_url(&self.url, tree_id, document_id),
            None => {
                let mut url = self.url.clone();
                url.set_path(&format!("/{}/{}", DOCUMENT_SEGMENT, encode_segment(document_id)));
                url.set_query(None);
                url.set_fragment(None);
                url
            }
        };

        DocumentUri {
            url,
            tree_document_id: self.tree_document_id.clone(),
            document_id: document_id.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl FromStr for DocumentUri {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self> {
        DocumentUri::parse(s)
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
