use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TreeError};

/// Storage token of the internal (primary) storage volume
pub const PRIMARY_TOKEN: &str = "primary";

/// A document identifier of the form `<storage-token>:<relative-path>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    storage_token: String,
    path: String,
}

impl DocumentId {
    /// Split an identifier on its first `:`.
    ///
    /// An identifier without a separator (including the empty string) is malformed.
    pub fn parse(raw: &str) -> Result<Self> {
        let (token, path) = raw
            .split_once(':')
            .ok_or_else(|| TreeError::malformed(raw, "document id has no ':' separator"))?;

        Ok(DocumentId {
            storage_token: token.to_string(),
            path: path.to_string(),
        })
    }

    pub fn new(storage_token: impl Into<String>, path: impl Into<String>) -> Self {
        DocumentId {
            storage_token: storage_token.into(),
            path: path.into(),
        }
    }

    /// `primary` for internal storage, a volume token such as `1234-ABCD` otherwise
    pub fn storage_token(&self) -> &str {
        &self.storage_token
    }

    /// Path relative to the volume root, without a leading `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_primary(&self) -> bool {
        self.storage_token == PRIMARY_TOKEN
    }

    /// Identifier of `name` directly below this document
    pub fn child(&self, name: &str) -> DocumentId {
        let path = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path.trim_end_matches('/'), name)
        };

        DocumentId {
            storage_token: self.storage_token.clone(),
            path,
        }
    }
}

impl FromStr for DocumentId {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self> {
        DocumentId::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.storage_token, self.path)
    }
}
