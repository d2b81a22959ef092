//! GPU backend using CubeCL on CUDA.
//!
//! Each block of W elements maps to one cube of W units:
//! 1. Inclusive scan within each plane (warp) using plane intrinsics
//! 2. Last lane of every plane publishes the plane total to shared memory
//! 3. The first plane scans the plane totals into per-plane offsets
//! 4. Every unit adds its plane offset; the last unit writes the block total
//!
//! The offset broadcast is a second kernel with one unit per element.
//! Every dispatch synchronizes with the device before returning.

use std::panic::AssertUnwindSafe;

use cubecl::client::ComputeClient;
use cubecl::cuda::{CudaDevice, CudaRuntime};
use cubecl::prelude::*;
use tracing::{debug, trace};

use super::{BlockScanOutput, ComputeBackend};
use crate::error::{Result, ScanError};

/// Type alias for CUDA compute client.
type CudaClient = ComputeClient<<CudaRuntime as Runtime>::Server>;

/// Largest cube the block-scan kernel is launched with.
const MAX_BLOCK_WIDTH: usize = 1024;

/// Plane (warp) width assumed when sizing the shared plane-total buffer.
const PLANE_WIDTH: usize = 32;

#[cube(launch_unchecked)]
fn block_inclusive_scan_kernel(
    input: &Array<f32>,
    output: &mut Array<f32>,
    block_totals: &mut Array<f32>,
    #[comptime] num_planes: u32,
) {
    let block_id = CUBE_POS;
    let thread_id = UNIT_POS;
    let plane_thread_idx = UNIT_POS_PLANE;
    let plane_idx = thread_id / PLANE_DIM;

    // The last plane of a cube may be partial.
    let remaining = CUBE_DIM - plane_idx * PLANE_DIM;
    let plane_size = if remaining < PLANE_DIM {
        remaining
    } else {
        PLANE_DIM
    };

    let mut plane_totals = SharedMemory::<f32>::new(num_planes);

    let local_scan = plane_inclusive_sum(input[ABSOLUTE_POS]);

    if plane_thread_idx == plane_size - 1 {
        plane_totals[plane_idx] = local_scan;
    }
    sync_cube();

    if plane_idx == 0 {
        let mut total = f32::new(0.0);
        if plane_thread_idx < num_planes {
            total = plane_totals[plane_thread_idx];
        }
        let offset = plane_exclusive_sum(total);
        if plane_thread_idx < num_planes {
            plane_totals[plane_thread_idx] = offset;
        }
    }
    sync_cube();

    let result = local_scan + plane_totals[plane_idx];
    output[ABSOLUTE_POS] = result;

    if thread_id == CUBE_DIM - 1 {
        block_totals[block_id] = result;
    }
}

#[cube(launch_unchecked)]
fn add_block_offsets_kernel(data: &mut Array<f32>, block_offsets: &Array<f32>) {
    let block_id = CUBE_POS;
    if block_id > 0 {
        data[ABSOLUTE_POS] += block_offsets[block_id];
    }
}

/// GPU compute backend.
///
/// Holds a CubeCL client for one CUDA device.
pub struct CudaBackend {
    client: CudaClient,
    device_index: usize,
}

impl CudaBackend {
    /// Create a backend on CUDA device 0.
    pub fn new() -> Result<Self> {
        Self::with_device(0)
    }

    /// Create a backend on the given CUDA device.
    ///
    /// # Returns
    /// `BackendUnavailable` if the device cannot be opened.
    pub fn with_device(device_index: usize) -> Result<Self> {
        let device = CudaDevice::new(device_index);
        let client = std::panic::catch_unwind(AssertUnwindSafe(|| CudaRuntime::client(&device)))
            .map_err(|_| {
                ScanError::BackendUnavailable(format!("CUDA device {device_index} not available"))
            })?;
        debug!(device_index, "Created CUDA scan backend");
        Ok(Self {
            client,
            device_index,
        })
    }

    fn sync(&self) -> Result<()> {
        std::panic::catch_unwind(AssertUnwindSafe(|| {
            cubecl::future::block_on(self.client.sync())
        }))
        .map_err(|_| {
            ScanError::BackendExecutionFailed(format!(
                "CUDA device {} failed to synchronize",
                self.device_index
            ))
        })?;
        Ok(())
    }
}

impl ComputeBackend for CudaBackend {
    fn name(&self) -> &str {
        "cuda"
    }

    /// Units in one cube of the widest supported block.
    ///
    /// Never zero: a missing or unusable device already fails in
    /// [`CudaBackend::with_device`] with [`ScanError::BackendUnavailable`], so
    /// an existing client can always dispatch one full cube.
    fn lanes(&self) -> usize {
        MAX_BLOCK_WIDTH
    }

    fn max_block_width(&self) -> usize {
        MAX_BLOCK_WIDTH
    }

    fn scan_blocks(&self, input: &[f32], block_width: usize) -> Result<BlockScanOutput> {
        check_launch(input.len(), block_width)?;

        let num_elements = input.len();
        let num_blocks = num_elements / block_width;
        let num_planes = block_width.div_ceil(PLANE_WIDTH) as u32;
        trace!(num_elements, num_blocks, "cuda scan_blocks");

        let input_gpu = self.client.create(f32::as_bytes(input));
        let output_gpu = self.client.empty(num_elements * std::mem::size_of::<f32>());
        let totals_gpu = self.client.empty(num_blocks * std::mem::size_of::<f32>());

        unsafe {
            block_inclusive_scan_kernel::launch_unchecked::<CudaRuntime>(
                &self.client,
                CubeCount::Static(num_blocks as u32, 1, 1),
                CubeDim::new(block_width as u32, 1, 1),
                ArrayArg::from_raw_parts::<f32>(&input_gpu, num_elements, 1),
                ArrayArg::from_raw_parts::<f32>(&output_gpu, num_elements, 1),
                ArrayArg::from_raw_parts::<f32>(&totals_gpu, num_blocks, 1),
                num_planes,
            );
        }
        self.sync()?;

        let scanned = f32::from_bytes(&self.client.read_one(output_gpu)).to_vec();
        let totals = f32::from_bytes(&self.client.read_one(totals_gpu)).to_vec();

        Ok(BlockScanOutput { scanned, totals })
    }

    fn add_block_offsets(
        &self,
        data: &mut [f32],
        offsets: &[f32],
        block_width: usize,
    ) -> Result<()> {
        check_launch(data.len(), block_width)?;
        let num_blocks = data.len() / block_width;
        if num_blocks != offsets.len() {
            return Err(ScanError::BackendExecutionFailed(format!(
                "{} offsets for {num_blocks} blocks",
                offsets.len()
            )));
        }
        trace!(num_elements = data.len(), num_blocks, "cuda add_block_offsets");

        let data_gpu = self.client.create(f32::as_bytes(data));
        let offsets_gpu = self.client.create(f32::as_bytes(offsets));

        unsafe {
            add_block_offsets_kernel::launch_unchecked::<CudaRuntime>(
                &self.client,
                CubeCount::Static(num_blocks as u32, 1, 1),
                CubeDim::new(block_width as u32, 1, 1),
                ArrayArg::from_raw_parts::<f32>(&data_gpu, data.len(), 1),
                ArrayArg::from_raw_parts::<f32>(&offsets_gpu, num_blocks, 1),
            );
        }
        self.sync()?;

        let result = self.client.read_one(data_gpu);
        data.copy_from_slice(f32::from_bytes(&result));
        Ok(())
    }
}

/// Validate a launch shape before touching the device.
fn check_launch(len: usize, block_width: usize) -> Result<()> {
    if block_width == 0 || block_width > MAX_BLOCK_WIDTH || len == 0 || len % block_width != 0 {
        return Err(ScanError::BackendExecutionFailed(format!(
            "cannot launch {len} elements as {block_width}-wide cubes"
        )));
    }
    if (len / block_width) > u32::MAX as usize {
        return Err(ScanError::BackendExecutionFailed(format!(
            "too many blocks: {}",
            len / block_width
        )));
    }
    Ok(())
}
