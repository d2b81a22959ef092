//! Multi-threaded CPU backend.
//!
//! Blocks are distributed over a dedicated rayon thread pool (work-stealing),
//! each worker owning the output blocks it is assigned. Every dispatch runs
//! inside `ThreadPool::install`, which returns only once all blocks are done.
//!
//! Parallelism is across blocks only. The up-sweep and down-sweep levels of a
//! single block run sequentially on the worker that owns it, so a dispatch of
//! one block occupies one thread.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use super::{BlockScanOutput, ComputeBackend};
use crate::error::{Result, ScanError};
use crate::scan::block::scan_block_into;

/// Rayon-based compute backend.
pub struct CpuBackend {
    pool: ThreadPool,
}

impl CpuBackend {
    /// Create a backend with one worker per available core.
    pub fn new() -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .thread_name(|i| format!("scan-worker-{i}"))
            .build()
            .map_err(|e| ScanError::BackendUnavailable(e.to_string()))?;
        debug!(threads = pool.current_num_threads(), "Created CPU scan backend");
        Ok(Self { pool })
    }

    /// Create a backend with exactly `num_threads` workers.
    ///
    /// # Returns
    /// `BackendUnavailable` when `num_threads` is zero; there is no implicit
    /// fallback to a default worker count.
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(ScanError::BackendUnavailable(
                "CPU backend requested with zero worker threads".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("scan-worker-{i}"))
            .build()
            .map_err(|e| ScanError::BackendUnavailable(e.to_string()))?;
        debug!(threads = num_threads, "Created CPU scan backend");
        Ok(Self { pool })
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn lanes(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn scan_blocks(&self, input: &[f32], block_width: usize) -> Result<BlockScanOutput> {
        check_block_layout(input.len(), block_width)?;
        trace!(len = input.len(), block_width, "cpu scan_blocks");

        let mut scanned = vec![0.0f32; input.len()];
        let totals: Vec<f32> = self.pool.install(|| {
            input
                .par_chunks(block_width)
                .zip(scanned.par_chunks_mut(block_width))
                .map_init(
                    || Vec::with_capacity(block_width.next_power_of_two()),
                    |tree, (block, out)| scan_block_into(block, out, tree),
                )
                .collect()
        });

        Ok(BlockScanOutput { scanned, totals })
    }

    fn add_block_offsets(
        &self,
        data: &mut [f32],
        offsets: &[f32],
        block_width: usize,
    ) -> Result<()> {
        check_block_layout(data.len(), block_width)?;
        if data.len() / block_width != offsets.len() {
            return Err(ScanError::BackendExecutionFailed(format!(
                "{} offsets for {} blocks",
                offsets.len(),
                data.len() / block_width
            )));
        }
        trace!(len = data.len(), block_width, "cpu add_block_offsets");

        // Block 0 has a zero prefix.
        self.pool.install(|| {
            data.par_chunks_mut(block_width)
                .zip(offsets.par_iter())
                .skip(1)
                .for_each(|(block, &offset)| {
                    for value in block {
                        *value += offset;
                    }
                });
        });

        Ok(())
    }
}

/// Reject buffers that do not split into whole blocks.
fn check_block_layout(len: usize, block_width: usize) -> Result<()> {
    if block_width == 0 || len == 0 || len % block_width != 0 {
        return Err(ScanError::BackendExecutionFailed(format!(
            "buffer of {len} elements is not a whole number of {block_width}-wide blocks"
        )));
    }
    Ok(())
}
