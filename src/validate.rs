//! Precondition checks shared by every entry point.

use crate::errors::{Error, Result};
use crate::hash::{DigestAlgorithm, DigestInfo};
use crate::key::{PrivateParts, RsaCryptor};
use crate::padding::Padding;
use crate::{MAX_KEY_BITS, MIN_KEY_BITS};

/// Rejects empty buffers where data is required.
#[inline]
pub(crate) fn non_empty(data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(Error::Param);
    }
    Ok(())
}

/// Accepts SHA-1 and the SHA-2 family only, returning the digest descriptor.
pub(crate) fn digest(alg: DigestAlgorithm) -> Result<DigestInfo> {
    match alg {
        DigestAlgorithm::Sha1
        | DigestAlgorithm::Sha224
        | DigestAlgorithm::Sha256
        | DigestAlgorithm::Sha384
        | DigestAlgorithm::Sha512 => alg.info().ok_or(Error::Param),
        _ => Err(Error::Param),
    }
}

/// Paddings accepted by encryption and decryption.
pub(crate) fn encryption_padding(padding: Padding) -> Result<()> {
    match padding {
        Padding::Pkcs1 | Padding::Oaep => Ok(()),
        _ => Err(Error::Param),
    }
}

/// Paddings accepted by signing and verification.
pub(crate) fn signature_padding(padding: Padding) -> Result<()> {
    match padding {
        Padding::Pkcs1 | Padding::Pss => Ok(()),
        _ => Err(Error::Param),
    }
}

/// Requested modulus size for generation.
pub(crate) fn key_bits(bits: usize) -> Result<()> {
    if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
        return Err(Error::Param);
    }
    Ok(())
}

/// Operations that need the private half.
#[inline]
pub(crate) fn private_key(key: &RsaCryptor) -> Result<&PrivateParts> {
    key.private_parts().ok_or(Error::Param)
}
