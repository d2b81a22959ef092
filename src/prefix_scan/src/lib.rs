//! Hierarchical parallel prefix scan.
//!
//! This crate computes inclusive prefix sums of `f32` sequences two ways:
//! a sequential left-to-right reference scan and a block-recursive parallel
//! scan that runs on a pluggable compute backend.
//!
//! # Architecture
//!
//! 1. Pad the input to a whole number of W-wide blocks
//! 2. Backend: scan all blocks in parallel (Blelloch up/down-sweep per block)
//! 3. Recursively scan the block totals until they fit in one block
//! 4. Backend: add each block's exclusive prefix to its elements
//!
//! Backends:
//! - [`CpuBackend`]: rayon thread pool
//! - `CudaBackend` (feature `cuda`): CubeCL kernels on a CUDA device
//!
//! # Example
//! ```
//! use prefix_scan::{equivalent, inclusive_scan, CpuBackend, HierarchicalScanner, ScanConfig};
//!
//! let input = vec![1.0f32; 10_000];
//! let scanner = HierarchicalScanner::new(CpuBackend::new()?, ScanConfig::default());
//! let parallel = scanner.scan(&input)?;
//! assert!(equivalent(&parallel, &inclusive_scan(&input), 1e-3));
//! # Ok::<(), prefix_scan::ScanError>(())
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_utils;

pub use backend::{BlockScanOutput, ComputeBackend, CpuBackend};
#[cfg(feature = "cuda")]
pub use backend::CudaBackend;
pub use config::{ScanConfig, DEFAULT_BLOCK_WIDTH, DEFAULT_TOLERANCE};
pub use error::{Result, ScanError};
pub use scan::{
    equivalent, exclusive_from_inclusive, first_mismatch, inclusive_scan, parallel_inclusive_scan,
    relative_tolerance, HierarchicalScanner, Mismatch, ScanReport,
};
