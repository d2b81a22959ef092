//! Hierarchical (block-recursive) inclusive scan for arbitrarily long sequences.
//!
//! # Algorithm
//!
//! 1. Pad the input with zeros to a multiple of the block width W
//! 2. Scan every block independently in one backend dispatch, collecting
//!    one total per block
//! 3. Scan the block totals: recursively while there are more than W of
//!    them, otherwise with one more single-block dispatch
//! 4. Shift the scanned totals into exclusive block prefixes and add each
//!    prefix to every element of its block (block 0 is left alone)
//! 5. Truncate back to the original length
//!
//! Each backend dispatch returns only when all of its blocks are done, so
//! step 2 completes before totals are read and step 3 completes before any
//! element is offset. Recursion depth is `O(log_W n)`.

use tracing::{debug, debug_span};

use crate::backend::{BlockScanOutput, ComputeBackend};
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::scan::padding::pad_to_block_width;
use crate::scan::sequential::exclusive_from_inclusive;

/// Describes a level in the hierarchical scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    /// Number of elements to scan at this level (before padding).
    pub num_elements: usize,
    /// Number of blocks (and thus block totals) produced.
    pub num_blocks: usize,
}

/// What a scan did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Levels visited, outermost first.
    pub levels: Vec<LevelInfo>,
    /// Number of backend dispatches issued.
    pub dispatches: usize,
}

impl ScanReport {
    /// Number of levels below the outermost one.
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }
}

/// Inclusive scan driver over a compute backend.
///
/// Holds no per-scan state, so one scanner can serve any number of
/// sequential calls; the backend decides how blocks are parallelized.
pub struct HierarchicalScanner<B> {
    backend: B,
    config: ScanConfig,
}

impl<B: ComputeBackend> HierarchicalScanner<B> {
    pub fn new(backend: B, config: ScanConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Compute the inclusive scan of `input`.
    ///
    /// # Returns
    /// A sequence of the same length, or an error with no partial result.
    pub fn scan(&self, input: &[f32]) -> Result<Vec<f32>> {
        self.scan_with_report(input).map(|(output, _)| output)
    }

    /// Compute the inclusive scan of `input` and report the levels visited.
    pub fn scan_with_report(&self, input: &[f32]) -> Result<(Vec<f32>, ScanReport)> {
        self.config.validate(self.backend.max_block_width())?;

        let mut report = ScanReport::default();
        if input.is_empty() {
            return Ok((Vec::new(), report));
        }

        if self.backend.lanes() == 0 {
            return Err(ScanError::BackendUnavailable(format!(
                "backend '{}' reports zero execution lanes",
                self.backend.name()
            )));
        }

        let span = debug_span!(
            "hierarchical_scan",
            len = input.len(),
            block_width = self.config.block_width,
            backend = self.backend.name()
        );
        let _enter = span.enter();

        let output = self.scan_level(input, &mut report)?;
        debug!(
            depth = report.depth(),
            dispatches = report.dispatches,
            "Scan complete"
        );

        Ok((output, report))
    }

    /// Scan one level: fan out over blocks, resolve block prefixes, broadcast.
    fn scan_level(&self, input: &[f32], report: &mut ScanReport) -> Result<Vec<f32>> {
        let width = self.config.block_width;
        let num_elements = input.len();
        let padded = pad_to_block_width(input, width);

        let BlockScanOutput {
            mut scanned,
            totals,
        } = self.backend.scan_blocks(&padded, width)?;
        report.dispatches += 1;

        let num_blocks = totals.len();
        report.levels.push(LevelInfo {
            num_elements,
            num_blocks,
        });
        debug!(
            level = report.levels.len() - 1,
            num_elements, num_blocks, "Scanned blocks"
        );

        if num_blocks > 1 {
            let scanned_totals = if num_blocks > width {
                self.scan_level(&totals, report)?
            } else {
                self.scan_single_block(&totals, report)?
            };

            let offsets = exclusive_from_inclusive(&scanned_totals);
            self.backend.add_block_offsets(&mut scanned, &offsets, width)?;
            report.dispatches += 1;
        }

        scanned.truncate(num_elements);
        Ok(scanned)
    }

    /// Base case: a sequence of at most one block, scanned in one dispatch.
    fn scan_single_block(&self, input: &[f32], report: &mut ScanReport) -> Result<Vec<f32>> {
        let width = self.config.block_width;
        debug_assert!(input.len() <= width);

        let padded = pad_to_block_width(input, width);
        let mut scanned = self.backend.scan_blocks(&padded, width)?.scanned;
        report.dispatches += 1;
        report.levels.push(LevelInfo {
            num_elements: input.len(),
            num_blocks: 1,
        });

        scanned.truncate(input.len());
        Ok(scanned)
    }
}
