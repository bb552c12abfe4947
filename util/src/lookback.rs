//! Per-student look-back derivation.
//!
//! Every student receives a rolling-window length in `[LOOKBACK_MIN, LOOKBACK_MAX]`
//! trading days, derived from their repository identifier. The value is a pure
//! function of the identifier so that re-grading the same repository always
//! reproduces the same parameter.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Shortest look-back handed out (~1 month of trading days).
pub const LOOKBACK_MIN: u32 = 21;
/// Longest look-back handed out (~1 year of trading days).
pub const LOOKBACK_MAX: u32 = 252;
/// Number of distinct look-back values.
pub const LOOKBACK_RANGE: u32 = LOOKBACK_MAX - LOOKBACK_MIN + 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookbackError {
    #[error("invalid repository identifier: {0}")]
    InvalidInput(String),
}

/// Returns the part of a repository identifier that is hashed.
///
/// GitHub Classroom repositories are named `<org>/<assignment>-<username>`;
/// only the last path segment identifies the student, so `course-org/hw1-jdoe`
/// and `hw1-jdoe` map to the same slug.
pub fn repository_slug(identifier: &str) -> &str {
    identifier.rsplit('/').next().unwrap_or(identifier)
}

/// Derives the look-back period (in trading days) for a repository identifier.
///
/// The SHA-256 digest of the slug is read as a big-endian unsigned integer,
/// reduced modulo [`LOOKBACK_RANGE`] and offset by [`LOOKBACK_MIN`].
///
/// # Errors
///
/// Returns [`LookbackError::InvalidInput`] if the identifier or its slug is
/// empty or whitespace only.
///
/// # Example
///
/// ```
/// use util::lookback::derive_lookback;
///
/// assert_eq!(derive_lookback("hw1-johndoe").unwrap(), 100);
/// assert_eq!(derive_lookback("course-org/hw1-johndoe").unwrap(), 100);
/// ```
pub fn derive_lookback(identifier: &str) -> Result<u32, LookbackError> {
    if identifier.trim().is_empty() {
        return Err(LookbackError::InvalidInput(
            "repository identifier is empty".to_string(),
        ));
    }

    let slug = repository_slug(identifier);
    if slug.trim().is_empty() {
        return Err(LookbackError::InvalidInput(format!(
            "repository identifier '{identifier}' has an empty name segment"
        )));
    }

    let digest = Sha256::digest(slug.as_bytes());

    // Horner's rule over the big-endian digest keeps the residue below 2^16.
    let residue = digest
        .iter()
        .fold(0u32, |acc, &byte| (acc * 256 + u32::from(byte)) % LOOKBACK_RANGE);
    let lookback = residue + LOOKBACK_MIN;

    tracing::debug!(
        slug,
        digest = %hex::encode(digest),
        lookback,
        "derived student look-back"
    );

    Ok(lookback)
}
