//! Error taxonomy for retrieval and validation operations.
//!
//! The library distinguishes failures the caller must act on (the store
//! cannot be reached, the configuration is out of range) from anomalies
//! that are recovered locally (a single record's reference list failed to
//! parse). Recovered anomalies surface as per-case issues, never as a
//! top-level error, so one corrupt record cannot abort a bulk sweep.

use crate::store::StoreError;

/// Top-level error type for all library operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The vector store could not serve a retrieval query: unreachable,
    /// or the query itself was malformed (e.g. wrong dimensionality).
    /// Surfaced to the caller once; never silently retried.
    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// The store could not serve a validation scan. An inability to
    /// check is distinct from a confirmed-valid result, so this is never
    /// mapped to a `valid` status.
    #[error("validation unavailable: {0}")]
    ValidationUnavailable(String),

    /// A serialized reference list failed to parse. Only returned from
    /// entry points where the caller asked for the parse itself; bulk
    /// operations recover by substituting an empty set instead.
    #[error("malformed reference data: {0}")]
    MalformedReferenceData(String),

    /// A configured value is out of its allowed range. Fatal at startup,
    /// not recoverable per-call.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Wrap a store failure encountered on the retrieval path.
    pub(crate) fn retrieval(err: StoreError) -> Self {
        Error::RetrievalUnavailable(err.to_string())
    }

    /// Wrap a store failure encountered on the validation path.
    pub(crate) fn validation(err: StoreError) -> Self {
        Error::ValidationUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
