//! Compute backends executing the data-parallel passes of a scan.
//!
//! The hierarchical orchestrator only ever issues two kinds of dispatch:
//!
//! 1. **Block scan**: scan every W-wide block of a buffer independently and
//!    report one total per block
//! 2. **Add offsets**: add one scalar per block to every element of that block
//!
//! Each dispatch returns only after all of its blocks are done, which gives
//! the orchestrator its synchronization barriers. Backends may run blocks on
//! a thread pool, SIMD lanes, or a GPU; the orchestrator does not care which.

pub mod cpu;
#[cfg(feature = "cuda")]
pub mod cuda;

pub use cpu::CpuBackend;
#[cfg(feature = "cuda")]
pub use cuda::CudaBackend;

use crate::error::Result;

/// Output of one block-scan dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockScanOutput {
    /// Per-block inclusive scans, laid out like the input buffer.
    pub scanned: Vec<f32>,
    /// One total per block.
    pub totals: Vec<f32>,
}

/// A facility that executes block scans and offset broadcasts in parallel.
pub trait ComputeBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Number of execution lanes available. Zero means the backend cannot
    /// run anything.
    fn lanes(&self) -> usize;

    /// Largest block width this backend can dispatch.
    fn max_block_width(&self) -> usize {
        usize::MAX
    }

    /// Scan every `block_width`-sized block of `input` independently.
    ///
    /// `input.len()` is a non-zero multiple of `block_width`.
    fn scan_blocks(&self, input: &[f32], block_width: usize) -> Result<BlockScanOutput>;

    /// Add `offsets[i]` to every element of block `i` of `data`.
    ///
    /// `data.len()` is `offsets.len() * block_width`.
    fn add_block_offsets(
        &self,
        data: &mut [f32],
        offsets: &[f32],
        block_width: usize,
    ) -> Result<()>;
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for &B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lanes(&self) -> usize {
        (**self).lanes()
    }

    fn max_block_width(&self) -> usize {
        (**self).max_block_width()
    }

    fn scan_blocks(&self, input: &[f32], block_width: usize) -> Result<BlockScanOutput> {
        (**self).scan_blocks(input, block_width)
    }

    fn add_block_offsets(
        &self,
        data: &mut [f32],
        offsets: &[f32],
        block_width: usize,
    ) -> Result<()> {
        (**self).add_block_offsets(data, offsets, block_width)
    }
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lanes(&self) -> usize {
        (**self).lanes()
    }

    fn max_block_width(&self) -> usize {
        (**self).max_block_width()
    }

    fn scan_blocks(&self, input: &[f32], block_width: usize) -> Result<BlockScanOutput> {
        (**self).scan_blocks(input, block_width)
    }

    fn add_block_offsets(
        &self,
        data: &mut [f32],
        offsets: &[f32],
        block_width: usize,
    ) -> Result<()> {
        (**self).add_block_offsets(data, offsets, block_width)
    }
}
