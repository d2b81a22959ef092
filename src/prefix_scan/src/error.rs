//! Error types for scan operations.

use thiserror::Error;

/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors that can occur while running a scan.
///
/// A scan either returns the complete output sequence or one of these
/// errors; partially scanned buffers are never handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Block width cannot drive the recursion (must be at least 2) or
    /// exceeds what the selected backend can dispatch.
    #[error("Invalid block width: {width} (must be in [2, {max}])")]
    InvalidBlockWidth { width: usize, max: usize },

    /// No backend capable of executing a block scan could be obtained.
    #[error("Compute backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend reported failure for a dispatched operation.
    #[error("Compute backend execution failed: {0}")]
    BackendExecutionFailed(String),
}

impl ScanError {
    /// Whether the error originated in the compute backend rather than in
    /// argument validation.
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            ScanError::BackendUnavailable(_) | ScanError::BackendExecutionFailed(_)
        )
    }
}
