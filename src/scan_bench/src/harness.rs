//! Timing and validation of sequential vs. hierarchical scans.

use std::time::{Duration, Instant};

use anyhow::Result;
use prefix_scan::{
    first_mismatch, inclusive_scan, relative_tolerance, ComputeBackend, HierarchicalScanner,
    Mismatch, ScanReport,
};
use tracing::{info, warn};

use crate::generate::{generate_sequence, ValueDistribution};

/// Input lengths exercised by the self-test table.
pub const SELF_TEST_LENGTHS: &[usize] = &[
    0, 1, 31, 255, 256, 257, 1023, 65_536, 65_537, 1_000_000,
];

/// How the equivalence tolerance is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// Fixed absolute tolerance.
    Absolute(f32),
    /// Fraction of the reference sequence's largest magnitude.
    Relative(f32),
}

impl Tolerance {
    /// Absolute tolerance to use against `reference`.
    pub fn resolve(&self, reference: &[f32]) -> f32 {
        match *self {
            Tolerance::Absolute(tolerance) => tolerance,
            Tolerance::Relative(fraction) => relative_tolerance(reference, fraction),
        }
    }
}

/// Outcome of one sequential/parallel comparison.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    /// Input length.
    pub len: usize,
    /// Wall time of the sequential scan.
    pub sequential: Duration,
    /// Wall time of the hierarchical scan.
    pub parallel: Duration,
    /// Absolute tolerance used for the comparison.
    pub tolerance: f32,
    /// First disagreement, if any.
    pub mismatch: Option<Mismatch>,
    /// Levels and dispatches of the hierarchical scan.
    pub scan: ScanReport,
}

impl BenchmarkReport {
    pub fn passed(&self) -> bool {
        self.mismatch.is_none()
    }

    /// Sequential time divided by parallel time.
    pub fn speedup(&self) -> f64 {
        let parallel = self.parallel.as_secs_f64();
        if parallel == 0.0 {
            return f64::INFINITY;
        }
        self.sequential.as_secs_f64() / parallel
    }
}

/// Run both scans on `input`, time them, and compare the results.
///
/// # Returns
/// The report and the hierarchical scan's output.
pub fn run_benchmark<B: ComputeBackend>(
    scanner: &HierarchicalScanner<B>,
    input: &[f32],
    tolerance: Tolerance,
) -> Result<(BenchmarkReport, Vec<f32>)> {
    let start = Instant::now();
    let expected = inclusive_scan(input);
    let sequential = start.elapsed();

    let start = Instant::now();
    let (output, scan) = scanner.scan_with_report(input).map_err(|err| {
        let stage = if err.is_backend_error() {
            "failed in the compute backend"
        } else {
            "was rejected"
        };
        anyhow::Error::new(err).context(format!(
            "Hierarchical scan of {} elements {stage}",
            input.len()
        ))
    })?;
    let parallel = start.elapsed();

    let tolerance = tolerance.resolve(&expected);
    let mismatch = first_mismatch(&output, &expected, tolerance);
    if let Some(mismatch) = &mismatch {
        warn!(
            len = input.len(),
            block_width = scanner.config().block_width,
            tolerance,
            ?mismatch,
            "Parallel scan disagrees with sequential scan"
        );
    }

    let report = BenchmarkReport {
        len: input.len(),
        sequential,
        parallel,
        tolerance,
        mismatch,
        scan,
    };
    Ok((report, output))
}

/// Summary of a self-test run.
#[derive(Debug, Clone)]
pub struct SelfTestSummary {
    pub reports: Vec<BenchmarkReport>,
}

impl SelfTestSummary {
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.passed()).count()
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }
}

/// Benchmark every length in `lengths` on generated input.
pub fn run_self_tests<B: ComputeBackend>(
    scanner: &HierarchicalScanner<B>,
    lengths: &[usize],
    distribution: ValueDistribution,
    tolerance: Tolerance,
    seed: Option<u64>,
) -> Result<SelfTestSummary> {
    let mut reports = Vec::with_capacity(lengths.len());
    for (i, &len) in lengths.iter().enumerate() {
        let input = generate_sequence(len, distribution, seed.map(|s| s.wrapping_add(i as u64)));
        let (report, _) = run_benchmark(scanner, &input, tolerance)?;
        info!(
            len,
            passed = report.passed(),
            depth = report.scan.depth(),
            "Self-test case done"
        );
        reports.push(report);
    }
    Ok(SelfTestSummary { reports })
}

/// One-line human-readable result for a report.
pub fn format_report(report: &BenchmarkReport) -> String {
    format!(
        "N = {}. {} (seq_time = {} ns, par_time = {} ns, speedup = {:.3}, depth = {})",
        report.len,
        if report.passed() { "passed" } else { "failed" },
        report.sequential.as_nanos(),
        report.parallel.as_nanos(),
        report.speedup(),
        report.scan.depth(),
    )
}
