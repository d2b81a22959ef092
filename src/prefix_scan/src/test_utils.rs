//! Shared helpers for unit tests.

use parking_lot::Mutex;
use rand::prelude::*;

use crate::backend::{BlockScanOutput, ComputeBackend, CpuBackend};
use crate::error::{Result, ScanError};

/// Deterministic sequence of `n` values uniformly drawn from [0, 1).
pub fn random_sequence(n: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen::<f32>()).collect()
}

/// Kind of a recorded backend dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    ScanBlocks { len: usize },
    AddOffsets { len: usize },
}

/// Backend wrapper that records every dispatch it forwards.
pub struct CountingBackend<B> {
    inner: B,
    max_block_width: usize,
    log: Mutex<Vec<Dispatch>>,
}

impl<B: ComputeBackend> CountingBackend<B> {
    pub fn new(inner: B) -> Self {
        let max_block_width = inner.max_block_width();
        Self {
            inner,
            max_block_width,
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_max_block_width(mut self, max_block_width: usize) -> Self {
        self.max_block_width = max_block_width;
        self
    }

    pub fn dispatch_count(&self) -> usize {
        self.log.lock().len()
    }

    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.log.lock().clone()
    }
}

impl<B: ComputeBackend> ComputeBackend for CountingBackend<B> {
    fn name(&self) -> &str {
        "counting"
    }

    fn lanes(&self) -> usize {
        self.inner.lanes()
    }

    fn max_block_width(&self) -> usize {
        self.max_block_width
    }

    fn scan_blocks(&self, input: &[f32], block_width: usize) -> Result<BlockScanOutput> {
        self.log.lock().push(Dispatch::ScanBlocks { len: input.len() });
        self.inner.scan_blocks(input, block_width)
    }

    fn add_block_offsets(
        &self,
        data: &mut [f32],
        offsets: &[f32],
        block_width: usize,
    ) -> Result<()> {
        self.log.lock().push(Dispatch::AddOffsets { len: data.len() });
        self.inner.add_block_offsets(data, offsets, block_width)
    }
}

/// Backend that fails a chosen dispatch, or reports no lanes at all.
pub struct FailingBackend {
    inner: CpuBackend,
    fail_at: Option<usize>,
    lanes: usize,
    issued: Mutex<usize>,
}

impl FailingBackend {
    /// Fail the `index`-th dispatch (zero-based), succeed on all others.
    pub fn fail_at(index: usize) -> Self {
        Self {
            inner: CpuBackend::with_threads(1).expect("Failed to create CPU backend"),
            fail_at: Some(index),
            lanes: 1,
            issued: Mutex::new(0),
        }
    }

    /// A backend that claims zero execution lanes.
    pub fn without_lanes() -> Self {
        Self {
            inner: CpuBackend::with_threads(1).expect("Failed to create CPU backend"),
            fail_at: None,
            lanes: 0,
            issued: Mutex::new(0),
        }
    }

    fn check(&self) -> Result<()> {
        let mut issued = self.issued.lock();
        let index = *issued;
        *issued += 1;
        if self.fail_at == Some(index) {
            return Err(ScanError::BackendExecutionFailed(format!(
                "injected failure on dispatch {index}"
            )));
        }
        Ok(())
    }
}

impl ComputeBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn lanes(&self) -> usize {
        self.lanes
    }

    fn scan_blocks(&self, input: &[f32], block_width: usize) -> Result<BlockScanOutput> {
        self.check()?;
        self.inner.scan_blocks(input, block_width)
    }

    fn add_block_offsets(
        &self,
        data: &mut [f32],
        offsets: &[f32],
        block_width: usize,
    ) -> Result<()> {
        self.check()?;
        self.inner.add_block_offsets(data, offsets, block_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_sequence_is_deterministic() {
        let a = random_sequence(100, 1);
        assert_eq!(a, random_sequence(100, 1));
        assert_ne!(a, random_sequence(100, 2));
        assert!(a.iter().all(|&x| (0.0..1.0).contains(&x)));
    }

    #[test]
    fn test_counting_backend_records_dispatches() {
        let backend = CountingBackend::new(CpuBackend::with_threads(1).unwrap());
        let mut data = backend.scan_blocks(&[1.0; 4], 2).unwrap().scanned;
        backend.add_block_offsets(&mut data, &[0.0, 2.0], 2).unwrap();

        assert_eq!(
            backend.dispatches(),
            vec![
                Dispatch::ScanBlocks { len: 4 },
                Dispatch::AddOffsets { len: 4 }
            ]
        );
    }
}
