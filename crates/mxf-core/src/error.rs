//! Error types shared across the mxf-* crates.

use thiserror::Error;

/// Errors raised while framing, decoding or re-serializing an MXF stream.
#[derive(Debug, Error)]
#[must_use]
pub enum Error {
    #[error("invalid BER length prefix: {0}")]
    InvalidBer(String),

    #[error("not a valid SMPTE 377M MXF stream: partition-pack label not found in run-in window")]
    NotMxf,

    #[error("partition invariant violated: {0}")]
    BadPartition(String),

    #[error("expected Primer Pack key, found {0}")]
    BadPrimerKey(String),

    #[error("expected Preface key, found {0}")]
    BadPrefaceKey(String),

    #[error("expected Avid Object Directory key, found {0}")]
    BadObjectDirectoryKey(String),

    #[error("primer maps tag {tag:04x} to UL {ul} absent from the RP 210 dictionary")]
    UnknownUl { tag: u16, ul: String },

    #[error("RP 210 type '{0}' has no registered codec")]
    NoConverter(String),

    #[error("DataSet field walk consumed {consumed} bytes, declared length was {declared}")]
    TruncatedSet { consumed: u64, declared: u64 },

    #[error("codec refused to encode value: {0}")]
    WriteEncodeFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
