use thiserror::Error;

/// Boxed error raised by one of the external collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures while resolving a tree reference
#[derive(Debug, Error)]
pub enum TreeError {
    /// The input could not be read as a tree reference or document identifier
    #[error("malformed tree reference {reference:?}: {reason}")]
    MalformedReference { reference: String, reason: String },

    /// The storage token names no mounted volume
    #[error("no mounted volume for storage token {token:?}")]
    VolumeNotFound { token: String },

    /// A storage, enumeration or statistics collaborator failed
    #[error("{operation} failed: {source}")]
    CollaboratorFailure {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// No execution context was supplied
    #[error("no execution context supplied")]
    InvalidContext,
}

impl TreeError {
    pub fn malformed(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        TreeError::MalformedReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn collaborator(operation: &'static str, source: impl Into<BoxError>) -> Self {
        TreeError::CollaboratorFailure {
            operation,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
