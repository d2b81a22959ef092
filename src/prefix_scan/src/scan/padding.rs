//! Fitting sequences to a whole number of blocks.

use std::borrow::Cow;

/// Smallest multiple of `block_width` that is at least `len`.
///
/// Never over-pads: a length that is already a multiple is returned as is.
pub fn fit_to_block_width(len: usize, block_width: usize) -> usize {
    len.div_ceil(block_width) * block_width
}

/// Pad `input` with zeros up to a multiple of `block_width`.
///
/// Borrows the input unchanged when no padding is needed.
pub fn pad_to_block_width(input: &[f32], block_width: usize) -> Cow<'_, [f32]> {
    let padded_len = fit_to_block_width(input.len(), block_width);
    if padded_len == input.len() {
        return Cow::Borrowed(input);
    }

    let mut padded = Vec::with_capacity(padded_len);
    padded.extend_from_slice(input);
    padded.resize(padded_len, 0.0);
    Cow::Owned(padded)
}
