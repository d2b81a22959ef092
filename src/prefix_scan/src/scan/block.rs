//! Work-efficient block scan (Blelloch).
//!
//! Scans one block of at most W elements in O(m) work and O(log m) depth.
//!
//! # Algorithm
//!
//! 1. **Upsweep (Reduce)**: Build a binary tree of partial sums in place
//! 2. **Downsweep**: Clear the root and propagate sums back down, producing
//!    the exclusive scan
//! 3. **Finalize**: Add each input back to turn exclusive into inclusive
//!
//! Every iteration of the inner loop at a given tree level touches a disjoint
//! pair of slots, so a level is one data-parallel step; only the levels are
//! ordered. Blocks whose length is not a power of two are scanned in a
//! zero-padded tree of the next power of two.

/// Inclusive scan of a single block together with its total.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockScan {
    /// Inclusive prefix sums of the block.
    pub scanned: Vec<f32>,
    /// Sum of the block (equal to the last element of `scanned`).
    pub total: f32,
}

/// Scan one block, allocating the output and scratch tree.
pub fn scan_block(block: &[f32]) -> BlockScan {
    let mut scanned = vec![0.0f32; block.len()];
    let mut tree = Vec::new();
    let total = scan_block_into(block, &mut scanned, &mut tree);
    BlockScan { scanned, total }
}

/// Scan one block into `output`, returning the block total.
///
/// `tree` is scratch space; it is resized as needed so callers scanning many
/// blocks can reuse one allocation per worker.
///
/// # Arguments
/// * `block` - Input block (length m)
/// * `output` - Destination for the inclusive scan (length m)
/// * `tree` - Reusable scratch buffer
pub fn scan_block_into(block: &[f32], output: &mut [f32], tree: &mut Vec<f32>) -> f32 {
    debug_assert_eq!(block.len(), output.len());

    let m = block.len();
    if m == 0 {
        return 0.0;
    }

    let size = m.next_power_of_two();
    tree.clear();
    tree.extend_from_slice(block);
    tree.resize(size, 0.0);

    upsweep(tree);
    downsweep(tree);

    for ((out, &exclusive), &value) in output.iter_mut().zip(tree.iter()).zip(block) {
        *out = exclusive + value;
    }

    output[m - 1]
}

/// Reduce phase: after this, `tree[size - 1]` holds the sum of all slots.
fn upsweep(tree: &mut [f32]) {
    let size = tree.len();
    let mut stride = 1;
    while stride < size {
        for right in (2 * stride - 1..size).step_by(2 * stride) {
            tree[right] += tree[right - stride];
        }
        stride *= 2;
    }
}

/// Distribution phase: turns the reduction tree into an exclusive scan.
fn downsweep(tree: &mut [f32]) {
    let size = tree.len();
    tree[size - 1] = 0.0;

    let mut stride = size / 2;
    while stride >= 1 {
        for right in (2 * stride - 1..size).step_by(2 * stride) {
            let left = right - stride;
            let carry = tree[left];
            tree[left] = tree[right];
            tree[right] += carry;
        }
        stride /= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::sequential::inclusive_scan;
    use crate::test_utils::random_sequence;
    use approx::assert_relative_eq;

    #[test]
    fn test_power_of_two_block() {
        let block = vec![3.0, 1.0, 7.0, 0.0, 4.0, 1.0, 6.0, 3.0];
        let result = scan_block(&block);
        assert_eq!(
            result.scanned,
            vec![3.0, 4.0, 11.0, 11.0, 15.0, 16.0, 22.0, 25.0]
        );
        assert_eq!(result.total, 25.0);
    }

    #[test]
    fn test_non_power_of_two_block() {
        let block = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = scan_block(&block);
        assert_eq!(result.scanned, vec![1.0, 3.0, 6.0, 10.0, 15.0]);
        assert_eq!(result.total, 15.0);
    }

    #[test]
    fn test_single_and_empty_block() {
        let result = scan_block(&[42.0]);
        assert_eq!(result.scanned, vec![42.0]);
        assert_eq!(result.total, 42.0);

        let result = scan_block(&[]);
        assert!(result.scanned.is_empty());
        assert_eq!(result.total, 0.0);
    }

    #[test]
    fn test_matches_sequential_for_all_small_lengths() {
        for m in 1..=300 {
            let block = random_sequence(m, m as u64);
            let result = scan_block(&block);
            let expected = inclusive_scan(&block);

            for (got, want) in result.scanned.iter().zip(&expected) {
                assert_relative_eq!(*got, *want, max_relative = 1e-4);
            }
            assert_eq!(result.total, result.scanned[m - 1]);
        }
    }

    #[test]
    fn test_scratch_reuse_across_blocks() {
        let mut tree = Vec::new();
        let mut out = vec![0.0; 7];
        let total = scan_block_into(&[1.0; 7], &mut out, &mut tree);
        assert_eq!(total, 7.0);

        // Smaller block after a larger one must not see stale slots.
        let mut out = vec![0.0; 3];
        let total = scan_block_into(&[2.0, 2.0, 2.0], &mut out, &mut tree);
        assert_eq!(out, vec![2.0, 4.0, 6.0]);
        assert_eq!(total, 6.0);
    }
}
