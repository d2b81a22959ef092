//! Prefix sum (scan) implementations.
//!
//! - [`sequential`]: left-to-right reference scans (the correctness oracle)
//! - [`block`]: work-efficient scan of one block of at most W elements
//! - [`hierarchical`]: block-recursive scan of arbitrary length over a
//!   [`ComputeBackend`](crate::backend::ComputeBackend)
//! - [`padding`]: fitting lengths to whole blocks
//! - [`equivalence`]: tolerance-based comparison of results

pub mod block;
pub mod equivalence;
pub mod hierarchical;
pub mod padding;
pub mod sequential;

pub use block::{scan_block, BlockScan};
pub use equivalence::{equivalent, first_mismatch, relative_tolerance, Mismatch};
pub use hierarchical::{HierarchicalScanner, LevelInfo, ScanReport};
pub use padding::{fit_to_block_width, pad_to_block_width};
pub use sequential::{exclusive_from_inclusive, inclusive_scan};

use crate::backend::CpuBackend;
use crate::config::ScanConfig;
use crate::error::Result;

/// Inclusive scan on a default CPU backend.
///
/// Builds a fresh thread pool per call; keep a [`HierarchicalScanner`]
/// around when scanning repeatedly.
pub fn parallel_inclusive_scan(input: &[f32], config: ScanConfig) -> Result<Vec<f32>> {
    let scanner = HierarchicalScanner::new(CpuBackend::new()?, config);
    scanner.scan(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_inclusive_scan() {
        let input = vec![1.0f32; 1000];
        let output = parallel_inclusive_scan(&input, ScanConfig::new(16)).unwrap();
        let expected: Vec<f32> = (1..=1000).map(|i| i as f32).collect();
        assert_eq!(output, expected);
    }
}
