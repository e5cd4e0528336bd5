//! Store-level error taxonomy.

use thiserror::Error;

/// Failures surfaced by the post store and user directory.
///
/// `Validation` and `NotFound` are local guard-clause failures raised before
/// any network call; they never touch stored state. `Remote` wraps a failure
/// from the backing service.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: `{field}` must not be empty")]
    Validation { field: &'static str },

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("remote service failed: {0}")]
    Remote(#[from] RemoteError),
}

impl StoreError {
    pub(crate) fn post_not_found(id: crate::domain::PostId) -> Self {
        StoreError::NotFound {
            entity: "post",
            id: id.to_string(),
        }
    }
}

/// Errors at the remote-service boundary.
///
/// The display form is the human-readable message captured on
/// `status = rejected`; it is stored verbatim, never parsed further.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response decode failed: {0}")]
    Decode(String),
}
