//! Access to the injected secure random source.

use rand_core::CryptoRngCore;

use crate::errors::{Error, Result};

/// Checks that `rng` is able to produce output before it is handed to
/// routines that cannot report failure (prime search, blinding).
pub(crate) fn ensure_available<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<()> {
    let mut probe = [0u8; 16];
    rng.try_fill_bytes(&mut probe)
        .map_err(|_| Error::RngFailure)
}

/// Fills `dest` with random bytes.
#[inline]
pub(crate) fn fill<R: CryptoRngCore + ?Sized>(rng: &mut R, dest: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(dest).map_err(|_| Error::RngFailure)
}
