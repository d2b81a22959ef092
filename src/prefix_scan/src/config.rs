//! Scan configuration.

use crate::error::{Result, ScanError};

/// Default block width, matching the work-group size of typical GPUs.
pub const DEFAULT_BLOCK_WIDTH: usize = 256;

/// Default absolute tolerance for sequential/parallel equivalence checks.
pub const DEFAULT_TOLERANCE: f32 = 1e-3;

/// Smallest block width for which the block-total sequence shrinks.
pub const MIN_BLOCK_WIDTH: usize = 2;

/// Configuration passed explicitly to every scan.
///
/// Nothing here is process-wide, so scans with different widths can run
/// concurrently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    /// Maximum number of elements scanned by one block-scan unit (W).
    pub block_width: usize,
    /// Absolute tolerance used when comparing against the sequential scan.
    pub tolerance: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            block_width: DEFAULT_BLOCK_WIDTH,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ScanConfig {
    /// Create a configuration with the given block width and default tolerance.
    pub fn new(block_width: usize) -> Self {
        Self {
            block_width,
            ..Default::default()
        }
    }

    pub fn with_block_width(mut self, block_width: usize) -> Self {
        self.block_width = block_width;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check the block width against the recursion lower bound and a
    /// backend-imposed upper bound.
    pub fn validate(&self, max_block_width: usize) -> Result<()> {
        if self.block_width < MIN_BLOCK_WIDTH || self.block_width > max_block_width {
            return Err(ScanError::InvalidBlockWidth {
                width: self.block_width,
                max: max_block_width,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.block_width, 256);
        assert_eq!(config.tolerance, 1e-3);
        assert!(config.validate(usize::MAX).is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ScanConfig::new(64).with_tolerance(0.5);
        assert_eq!(config.block_width, 64);
        assert_eq!(config.tolerance, 0.5);
        assert_eq!(config.with_block_width(8).block_width, 8);
    }

    #[test]
    fn test_rejects_degenerate_widths() {
        for width in [0, 1] {
            let err = ScanConfig::new(width).validate(usize::MAX).unwrap_err();
            assert_eq!(
                err,
                ScanError::InvalidBlockWidth {
                    width,
                    max: usize::MAX
                }
            );
        }
        assert!(ScanConfig::new(2).validate(usize::MAX).is_ok());
    }

    #[test]
    fn test_rejects_width_above_backend_limit() {
        assert!(ScanConfig::new(1024).validate(1024).is_ok());
        assert!(ScanConfig::new(2048).validate(1024).is_err());
    }
}
