//! Query-layer error types.

use thiserror::Error;

use crate::http::HttpError;

/// Errors from a single ruleset API call.
///
/// The display string of each variant doubles as the outcome comment the
/// reconciler reports when it absorbs the failure, so the exact wording is
/// part of the crate's contract.
#[derive(Debug, Error)]
pub enum QueryError {
    /// GitHub answered with a non-2xx status.
    #[error("GitHub Response Status Code: {error}")]
    Remote { status: u16, error: String },

    /// GitHub answered 2xx but the body was empty or not decodable.
    #[error("{comment}")]
    Malformed { comment: &'static str },

    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] HttpError),
}

impl QueryError {
    /// Build a [`QueryError::Remote`] from a status code, describing the
    /// status as `{code} {canonical reason}`.
    #[must_use]
    pub fn remote(status: u16) -> Self {
        let error = match reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
        {
            Some(reason) => format!("{} {}", status, reason),
            None => status.to_string(),
        };
        QueryError::Remote { status, error }
    }

    /// The HTTP status attached to the failure, when one exists.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            QueryError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
