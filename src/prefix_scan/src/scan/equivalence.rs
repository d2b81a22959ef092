//! Element-wise comparison of scan results under an absolute tolerance.

/// Where two sequences first disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mismatch {
    /// The sequences have different lengths.
    Length { left: usize, right: usize },
    /// The values at `index` differ by at least the tolerance.
    Value { index: usize, left: f32, right: f32 },
}

/// Check that every pair differs by strictly less than `tolerance`.
///
/// A length mismatch yields `false` rather than an error.
pub fn equivalent(left: &[f32], right: &[f32], tolerance: f32) -> bool {
    first_mismatch(left, right, tolerance).is_none()
}

/// Find the first position where the sequences are not equivalent.
pub fn first_mismatch(left: &[f32], right: &[f32], tolerance: f32) -> Option<Mismatch> {
    if left.len() != right.len() {
        return Some(Mismatch::Length {
            left: left.len(),
            right: right.len(),
        });
    }

    left
        .iter()
        .zip(right)
        .enumerate()
        // Negated so NaN on either side counts as a mismatch.
        .find(|(_, (l, r))| !((*l - *r).abs() < tolerance))
        .map(|(index, (&left, &right))| Mismatch::Value { index, left, right })
}

/// Absolute tolerance scaled to the magnitude of a reference sequence.
///
/// Floating-point error of a long running sum grows with the sum itself, so
/// comparisons of large scans use `relative * max(|x|)`, floored at
/// `relative` for sequences of small magnitude.
pub fn relative_tolerance(reference: &[f32], relative: f32) -> f32 {
    let magnitude = reference.iter().fold(1.0f32, |acc, x| acc.max(x.abs()));
    relative * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_sequences() {
        let a = vec![1.0, 2.0, 3.0];
        assert!(equivalent(&a, &a, 1e-3));
        assert!(equivalent(&[], &[], 1e-3));
    }

    #[test]
    fn test_within_tolerance() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.0005, 1.9995, 3.0];
        assert!(equivalent(&a, &b, 1e-3));
    }

    #[test]
    fn test_tolerance_is_strict() {
        let a = vec![0.0];
        let b = vec![0.5];
        assert!(!equivalent(&a, &b, 0.5));
        assert!(equivalent(&a, &b, 0.5001));
    }

    #[test]
    fn test_length_mismatch_is_not_equal() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert!(!equivalent(&a, &b, 1.0));
        assert_eq!(
            first_mismatch(&a, &b, 1.0),
            Some(Mismatch::Length { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_reports_first_mismatch() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![1.0, 2.0, 3.5, 5.0];
        assert_eq!(
            first_mismatch(&a, &b, 0.1),
            Some(Mismatch::Value {
                index: 2,
                left: 3.0,
                right: 3.5
            })
        );
    }

    #[test]
    fn test_nan_is_mismatch() {
        assert!(!equivalent(&[f32::NAN], &[f32::NAN], 1.0));
    }

    #[test]
    fn test_relative_tolerance() {
        assert_eq!(relative_tolerance(&[], 1e-3), 1e-3);
        assert_eq!(relative_tolerance(&[0.5, -2000.0, 10.0], 1e-3), 2.0);
    }
}
