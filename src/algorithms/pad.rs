//! Special handling for converting the BigUint to u8 vectors

use alloc::vec::Vec;
use num_bigint::BigUint;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Error, Result};

/// Returns a new vector of the given length, with 0s left padded.
#[inline]
fn left_pad(input: &[u8], padded_len: usize) -> Result<Vec<u8>> {
    if input.len() > padded_len {
        return Err(Error::Decode);
    }

    let mut out = vec![0u8; padded_len];
    out[padded_len - input.len()..].copy_from_slice(input);
    Ok(out)
}

/// Converts input to the new vector of the given length, using BE and with 0s left padded.
#[inline]
pub(crate) fn uint_to_be_pad(input: BigUint, padded_len: usize) -> Result<Vec<u8>> {
    left_pad(&input.to_bytes_be(), padded_len)
}

/// Converts input to the new vector of the given length, using BE and with 0s left padded.
#[inline]
pub(crate) fn uint_to_zeroizing_be_pad(
    input: BigUint,
    padded_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let m = Zeroizing::new(input);
    let m = Zeroizing::new(m.to_bytes_be());
    left_pad(&m, padded_len).map(Zeroizing::new)
}

/// Writes `input` big-endian into the first `width` bytes of `out`, left
/// padded with 0s. Returns `width`.
pub(crate) fn uint_write_be_pad(input: &BigUint, width: usize, out: &mut [u8]) -> Result<usize> {
    let mut bytes = input.to_bytes_be();
    if bytes.len() > width || out.len() < width {
        bytes.zeroize();
        return Err(Error::MemoryFailure);
    }

    let (pad, value) = out[..width].split_at_mut(width - bytes.len());
    pad.fill(0);
    value.copy_from_slice(&bytes);
    bytes.zeroize();
    Ok(width)
}

/// Big-endian, minimal length encoding of a component. Zero encodes as a
/// single 0 byte.
#[inline]
pub(crate) fn uint_to_zeroizing_be(input: &BigUint) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(input.to_bytes_be())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    #[test]
    fn test_left_pad() {
        const INPUT_LEN: usize = 3;
        let input = vec![0u8; INPUT_LEN];

        // input len < padded len
        let padded = left_pad(&input, INPUT_LEN + 1).unwrap();
        assert_eq!(padded.len(), INPUT_LEN + 1);

        // input len == padded len
        let padded = left_pad(&input, INPUT_LEN).unwrap();
        assert_eq!(padded.len(), INPUT_LEN);

        // input len > padded len
        let padded = left_pad(&input, INPUT_LEN - 1);
        assert_eq!(padded, Err(Error::Decode));
    }

    #[test]
    fn test_write_be_pad() {
        let value = BigUint::from_u32(0x0102).unwrap();
        let mut out = [0xffu8; 6];

        assert_eq!(uint_write_be_pad(&value, 4, &mut out), Ok(4));
        assert_eq!(out, [0, 0, 1, 2, 0xff, 0xff]);

        assert_eq!(
            uint_write_be_pad(&value, 8, &mut out),
            Err(Error::MemoryFailure)
        );
        assert_eq!(
            uint_write_be_pad(&value, 1, &mut out),
            Err(Error::MemoryFailure)
        );
    }
}
