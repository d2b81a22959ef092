//! Sequential prefix sums.
//!
//! These are the correctness oracle for the parallel scans: accumulation runs
//! strictly left to right, which is the canonical order parallel results are
//! judged against.

/// Perform inclusive prefix sum.
///
/// Inclusive scan: output[i] = input[0] + input[1] + ... + input[i]
///
/// # Arguments
/// * `input` - Input slice of f32 values
///
/// # Returns
/// Vector with inclusive prefix sums.
pub fn inclusive_scan(input: &[f32]) -> Vec<f32> {
    let mut output = Vec::with_capacity(input.len());
    let mut sum = 0.0f32;
    for &value in input {
        sum += value;
        output.push(sum);
    }
    output
}

/// Shift an inclusive scan right by one, yielding the exclusive prefixes.
///
/// output[0] = 0, output[i] = inclusive[i-1]
pub fn exclusive_from_inclusive(inclusive: &[f32]) -> Vec<f32> {
    let mut output = Vec::with_capacity(inclusive.len());
    if inclusive.is_empty() {
        return output;
    }
    output.push(0.0);
    output.extend_from_slice(&inclusive[..inclusive.len() - 1]);
    output
}
