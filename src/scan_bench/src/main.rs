//! Benchmark the hierarchical parallel prefix scan against the sequential scan.
//!
//! Reads a count-prefixed sequence from `--input` (or generates one), runs
//! both scans, prints timings and the speedup, verifies equivalence, and
//! optionally writes the parallel result to `--output`.

mod generate;
mod harness;
mod io;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use prefix_scan::{ComputeBackend, CpuBackend, HierarchicalScanner, ScanConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use generate::{generate_sequence, ValueDistribution};
use harness::{format_report, run_benchmark, run_self_tests, Tolerance, SELF_TEST_LENGTHS};

/// Compute backend selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// Rayon thread pool.
    Cpu,
    /// CubeCL kernels on CUDA device 0.
    #[cfg(feature = "cuda")]
    Cuda,
}

#[derive(Debug, Parser)]
#[command(name = "scan_bench", version, about)]
struct Cli {
    /// Count-prefixed input file; a random sequence is generated if omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write the parallel scan result here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Length of the generated sequence
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    len: usize,

    /// Block width W
    #[arg(short = 'w', long, default_value_t = prefix_scan::DEFAULT_BLOCK_WIDTH)]
    block_width: usize,

    /// Worker threads for the CPU backend (defaults to one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Compute backend
    #[arg(long, value_enum, default_value_t = BackendKind::Cpu)]
    backend: BackendKind,

    /// Absolute equivalence tolerance (overrides --relative-tolerance)
    #[arg(long)]
    tolerance: Option<f32>,

    /// Equivalence tolerance as a fraction of the largest prefix sum
    #[arg(long, default_value_t = 1e-3)]
    relative_tolerance: f32,

    /// Distribution of generated values
    #[arg(long, value_enum, default_value_t = ValueDistribution::Uniform)]
    distribution: ValueDistribution,

    /// Seed for generated values
    #[arg(long)]
    seed: Option<u64>,

    /// Run the self-test table before the main benchmark
    #[arg(long)]
    self_test: bool,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        let config = ScanConfig::new(self.block_width);
        match self.tolerance {
            Some(tolerance) => config.with_tolerance(tolerance),
            None => config,
        }
    }

    fn tolerance(&self, config: &ScanConfig) -> Tolerance {
        match self.tolerance {
            Some(_) => Tolerance::Absolute(config.tolerance),
            None => Tolerance::Relative(self.relative_tolerance),
        }
    }

    fn create_backend(&self) -> Result<Box<dyn ComputeBackend>> {
        let backend: Box<dyn ComputeBackend> = match self.backend {
            BackendKind::Cpu => match self.threads {
                Some(threads) => Box::new(CpuBackend::with_threads(threads)?),
                None => Box::new(CpuBackend::new()?),
            },
            #[cfg(feature = "cuda")]
            BackendKind::Cuda => Box::new(prefix_scan::CudaBackend::new()?),
        };
        Ok(backend)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let config = cli.scan_config();
    let tolerance = cli.tolerance(&config);

    let backend = cli
        .create_backend()
        .context("Failed to create compute backend")?;
    let scanner = HierarchicalScanner::new(backend, config);
    info!(
        backend = scanner.backend().name(),
        lanes = scanner.backend().lanes(),
        block_width = scanner.config().block_width,
        "Scan backend ready"
    );

    if cli.self_test {
        let summary = run_self_tests(
            &scanner,
            SELF_TEST_LENGTHS,
            cli.distribution,
            tolerance,
            cli.seed,
        )?;
        for report in &summary.reports {
            println!("{}", format_report(report));
        }
        println!(
            "Test summary: {} / {} passed\n",
            summary.passed(),
            summary.total()
        );
        if !summary.all_passed() {
            bail!("Self-tests failed");
        }
    }

    let input = match &cli.input {
        Some(path) => io::read_sequence_file(path)?,
        None => generate_sequence(cli.len, cli.distribution, cli.seed),
    };

    let (report, output) = run_benchmark(&scanner, &input, tolerance)?;

    println!("Sequential time = {} ns", report.sequential.as_nanos());
    println!("Parallel time = {} ns", report.parallel.as_nanos());
    println!("Acceleration: {:.3}", report.speedup());
    println!("Tolerance = {}", report.tolerance);

    if let Some(path) = &cli.output {
        io::write_sequence_file(path, &output)?;
        info!(path = %path.display(), "Wrote parallel scan result");
    }

    if let Some(mismatch) = report.mismatch {
        bail!("Parallel and sequential scans differ: {mismatch:?}");
    }
    println!("Parallel and sequential scans produce equivalent sequences");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["scan_bench"]);
        assert_eq!(cli.len, 1_000_000);
        assert_eq!(cli.block_width, 256);
        assert_eq!(cli.backend, BackendKind::Cpu);

        let config = cli.scan_config();
        assert_eq!(cli.tolerance(&config), Tolerance::Relative(1e-3));
    }

    #[test]
    fn test_absolute_tolerance_flag() {
        let cli = Cli::parse_from(["scan_bench", "--tolerance", "10", "-w", "64", "-t", "2"]);
        let config = cli.scan_config();
        assert_eq!(config.block_width, 64);
        assert_eq!(cli.tolerance(&config), Tolerance::Absolute(10.0));
        assert_eq!(cli.create_backend().unwrap().lanes(), 2);
    }

    #[test]
    fn test_zero_threads_fails() {
        let cli = Cli::parse_from(["scan_bench", "--threads", "0"]);
        assert!(cli.create_backend().is_err());
    }
}
