//! Error types for the linking subsystem.

use thiserror::Error;

/// Result type alias for linker operations.
pub type LinkerResult<T> = Result<T, LinkerError>;

/// Errors that can occur in the linking subsystem.
///
/// Note that no-match conditions (empty source, empty dictionary, no
/// eligible candidates, no matching affiliate links) are normal outcomes
/// returned as empty results, never as errors.
#[derive(Debug, Clone, Error)]
pub enum LinkerError {
    /// The catalog source failed to produce substances. The dictionary
    /// cache is left untouched when this occurs.
    #[error("catalog load failed: {0}")]
    CatalogLoad(String),
}
