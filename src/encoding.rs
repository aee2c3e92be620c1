//! PKCS#1 and PKCS#8 encoding support, and access to the raw key
//! components.
//!
//! Keys export as PKCS#1 DER by default. Import accepts PKCS#1 and PKCS#8
//! private keys as well as PKCS#1 and SPKI public keys.

use alloc::vec::Vec;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use pkcs8::der::{asn1::BitStringRef, Encode};
use zeroize::Zeroizing;

use crate::algorithms::pad::uint_to_zeroizing_be;
use crate::errors::{Error, Result};
use crate::key::{PrivateParts, PublicParts, RsaCryptor};
use crate::traits::{PrivateKeyParts, PublicKeyParts};
use crate::{validate, MAX_KEY_BITS};

/// Verify that the `AlgorithmIdentifier` for a key is correct.
pub(crate) fn verify_algorithm_id(
    algorithm: &pkcs8::AlgorithmIdentifierRef<'_>,
) -> pkcs8::spki::Result<()> {
    algorithm.assert_algorithm_oid(pkcs1::ALGORITHM_OID)?;

    if algorithm.parameters_any()? != pkcs8::der::asn1::Null.into() {
        return Err(pkcs8::spki::Error::KeyMalformed);
    }

    Ok(())
}

/// Raw components of a key, big-endian and minimal length.
pub enum KeyComponents {
    /// Components of a public key.
    Public {
        /// Modulus `n`.
        modulus: Zeroizing<Vec<u8>>,
        /// Public exponent `e`.
        exponent: Zeroizing<Vec<u8>>,
    },
    /// Components of a private key.
    Private {
        /// Modulus `n`.
        modulus: Zeroizing<Vec<u8>>,
        /// Private exponent `d`.
        exponent: Zeroizing<Vec<u8>>,
        /// First prime factor.
        p: Zeroizing<Vec<u8>>,
        /// Second prime factor.
        q: Zeroizing<Vec<u8>>,
    },
}

fn pkcs1_private_der(key: &PrivateParts) -> Result<Zeroizing<Vec<u8>>> {
    let modulus = uint_to_zeroizing_be(key.n());
    let public_exponent = uint_to_zeroizing_be(key.e());
    let private_exponent = uint_to_zeroizing_be(key.d());
    let prime1 = uint_to_zeroizing_be(key.p());
    let prime2 = uint_to_zeroizing_be(key.q());
    let exponent1 = uint_to_zeroizing_be(key.dp());
    let exponent2 = uint_to_zeroizing_be(key.dq());
    let coefficient = uint_to_zeroizing_be(key.qinv());

    let der = pkcs1::RsaPrivateKey {
        modulus: pkcs1::UintRef::new(&modulus)?,
        public_exponent: pkcs1::UintRef::new(&public_exponent)?,
        private_exponent: pkcs1::UintRef::new(&private_exponent)?,
        prime1: pkcs1::UintRef::new(&prime1)?,
        prime2: pkcs1::UintRef::new(&prime2)?,
        exponent1: pkcs1::UintRef::new(&exponent1)?,
        exponent2: pkcs1::UintRef::new(&exponent2)?,
        coefficient: pkcs1::UintRef::new(&coefficient)?,
        other_prime_infos: None,
    }
    .to_der()?;

    Ok(Zeroizing::new(der))
}

fn pkcs1_public_der(key: &PublicParts) -> Result<Vec<u8>> {
    let modulus = key.n().to_bytes_be();
    let public_exponent = key.e().to_bytes_be();

    Ok(pkcs1::RsaPublicKey {
        modulus: pkcs1::UintRef::new(&modulus)?,
        public_exponent: pkcs1::UintRef::new(&public_exponent)?,
    }
    .to_der()?)
}

fn private_from_pkcs1(pkcs1_key: &pkcs1::RsaPrivateKey<'_>) -> Result<RsaCryptor> {
    // Multi-prime RSA keys not supported
    if pkcs1_key.version() != pkcs1::Version::TwoPrime {
        return Err(Error::Decode);
    }

    let n = BigUint::from_bytes_be(pkcs1_key.modulus.as_bytes());
    if n.bits() > MAX_KEY_BITS {
        return Err(Error::Decode);
    }

    let e = BigUint::from_bytes_be(pkcs1_key.public_exponent.as_bytes());
    let d = BigUint::from_bytes_be(pkcs1_key.private_exponent.as_bytes());
    let p = BigUint::from_bytes_be(pkcs1_key.prime1.as_bytes());
    let q = BigUint::from_bytes_be(pkcs1_key.prime2.as_bytes());

    let one = BigUint::one();
    if e <= one || p <= one || q <= one || &p * &q != n {
        return Err(Error::Decode);
    }

    // d * e == 1 mod (p - 1) and mod (q - 1)
    let de = &d * &e;
    if !(&de % (&p - &one)).is_one() || !(&de % (&q - &one)).is_one() {
        return Err(Error::Decode);
    }

    // CRT values are always recomputed rather than trusted
    let parts = PrivateParts::from_factors(n, e, d, p, q)?;
    RsaCryptor::from_private_parts(parts, MAX_KEY_BITS).map_err(|_| Error::Decode)
}

fn public_from_pkcs1(pkcs1_key: &pkcs1::RsaPublicKey<'_>) -> Result<RsaCryptor> {
    let n = BigUint::from_bytes_be(pkcs1_key.modulus.as_bytes());
    let e = BigUint::from_bytes_be(pkcs1_key.public_exponent.as_bytes());

    let one = BigUint::one();
    if n <= one || n.is_even() || n.bits() > MAX_KEY_BITS || e <= one {
        return Err(Error::Decode);
    }

    RsaCryptor::from_public_parts(PublicParts::new(n, e), MAX_KEY_BITS)
        .map_err(|_| Error::Decode)
}

fn import_package(bytes: &[u8]) -> Result<RsaCryptor> {
    if let Ok(pkcs1_key) = pkcs1::RsaPrivateKey::try_from(bytes) {
        return private_from_pkcs1(&pkcs1_key);
    }

    if let Ok(private_key_info) = pkcs8::PrivateKeyInfo::try_from(bytes) {
        verify_algorithm_id(&private_key_info.algorithm)?;
        let pkcs1_key = pkcs1::RsaPrivateKey::try_from(private_key_info.private_key)?;
        return private_from_pkcs1(&pkcs1_key);
    }

    if let Ok(pkcs1_key) = pkcs1::RsaPublicKey::try_from(bytes) {
        return public_from_pkcs1(&pkcs1_key);
    }

    let spki = pkcs8::SubjectPublicKeyInfoRef::try_from(bytes)?;
    verify_algorithm_id(&spki.algorithm)?;
    let pkcs1_key = pkcs1::RsaPublicKey::try_from(
        spki.subject_public_key
            .as_bytes()
            .ok_or(pkcs8::spki::Error::KeyMalformed)?,
    )?;
    public_from_pkcs1(&pkcs1_key)
}

impl RsaCryptor {
    /// Imports a key package.
    ///
    /// Private packages are probed first (PKCS#1, then PKCS#8), then public
    /// ones (PKCS#1, then SPKI). The context is sized for the largest
    /// supported key, and the key size is recomputed from the recovered
    /// modulus.
    ///
    /// Empty input fails with [`Error::Param`]; anything that does not decode
    /// to a consistent two-prime key of at most 4096 bits fails with
    /// [`Error::Decode`].
    pub fn import(bytes: &[u8]) -> Result<RsaCryptor> {
        validate::non_empty(bytes)?;

        let key = import_package(bytes)?;
        tracing::debug!(
            key_type = ?key.key_type(),
            key_nbits = key.key_size(),
            "imported key"
        );
        Ok(key)
    }

    fn export_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        match self.private_parts() {
            Some(private) => pkcs1_private_der(private),
            None => pkcs1_public_der(self.public_parts()).map(Zeroizing::new),
        }
    }

    /// Length in bytes of the package [`export`](RsaCryptor::export) writes.
    pub fn exported_len(&self) -> Result<usize> {
        Ok(self.export_der()?.len())
    }

    /// Writes the PKCS#1 DER package of this key into `out` and returns its
    /// length.
    ///
    /// When `out` is too small nothing is written and
    /// [`Error::BufferTooSmall`] reports the required size.
    pub fn export(&self, out: &mut [u8]) -> Result<usize> {
        let der = self.export_der()?;
        if out.len() < der.len() {
            return Err(Error::BufferTooSmall {
                required: der.len(),
            });
        }

        out[..der.len()].copy_from_slice(&der);
        tracing::trace!(key_type = ?self.key_type(), len = der.len(), "exported key");
        Ok(der.len())
    }

    /// Allocating variant of [`export`](RsaCryptor::export).
    pub fn export_to_vec(&self) -> Result<Zeroizing<Vec<u8>>> {
        self.export_der()
    }

    /// Exports the key wrapped in PKCS#8 `PrivateKeyInfo` (private keys) or
    /// `SubjectPublicKeyInfo` (public keys), DER encoded.
    pub fn export_pkcs8(&self) -> Result<Zeroizing<Vec<u8>>> {
        let pkcs1_der = self.export_der()?;

        let der = match self.private_parts() {
            Some(_) => pkcs8::PrivateKeyInfo::new(pkcs1::ALGORITHM_ID, &pkcs1_der).to_der()?,
            None => pkcs8::SubjectPublicKeyInfoRef {
                algorithm: pkcs1::ALGORITHM_ID,
                subject_public_key: BitStringRef::new(0, &pkcs1_der)?,
            }
            .to_der()?,
        };

        Ok(Zeroizing::new(der))
    }

    /// Returns the modulus and exponent of a public key, or the modulus,
    /// private exponent and prime factors of a private key.
    pub fn key_components(&self) -> KeyComponents {
        match self.private_parts() {
            Some(private) => KeyComponents::Private {
                modulus: uint_to_zeroizing_be(private.n()),
                exponent: uint_to_zeroizing_be(private.d()),
                p: uint_to_zeroizing_be(private.p()),
                q: uint_to_zeroizing_be(private.q()),
            },
            None => {
                let public = self.public_parts();
                KeyComponents::Public {
                    modulus: uint_to_zeroizing_be(public.n()),
                    exponent: uint_to_zeroizing_be(public.e()),
                }
            }
        }
    }

    /// Byte sizes of `(dp, dq, qinv)`. Private keys only.
    pub fn crt_components_sizes(&self) -> Result<(usize, usize, usize)> {
        let private = validate::private_key(self)?;
        Ok((
            uint_to_zeroizing_be(private.dp()).len(),
            uint_to_zeroizing_be(private.dq()).len(),
            uint_to_zeroizing_be(private.qinv()).len(),
        ))
    }

    /// Writes `dp`, `dq` and `qinv` big-endian into the given buffers and
    /// returns the number of bytes written to each.
    ///
    /// Private keys only, and only when `p > q`; both fail with
    /// [`Error::Param`]. If any buffer is too small nothing is written and
    /// [`Error::BufferTooSmall`] carries the size that buffer needs.
    pub fn crt_components(
        &self,
        dp_out: &mut [u8],
        dq_out: &mut [u8],
        qinv_out: &mut [u8],
    ) -> Result<(usize, usize, usize)> {
        let private = validate::private_key(self)?;
        if private.p() <= private.q() {
            return Err(Error::Param);
        }

        let dp = uint_to_zeroizing_be(private.dp());
        let dq = uint_to_zeroizing_be(private.dq());
        let qinv = uint_to_zeroizing_be(private.qinv());

        for (value, out) in [(&dp, &*dp_out), (&dq, &*dq_out), (&qinv, &*qinv_out)] {
            if out.len() < value.len() {
                return Err(Error::BufferTooSmall {
                    required: value.len(),
                });
            }
        }

        dp_out[..dp.len()].copy_from_slice(&dp);
        dq_out[..dq.len()].copy_from_slice(&dq);
        qinv_out[..qinv.len()].copy_from_slice(&qinv);

        Ok((dp.len(), dq.len(), qinv.len()))
    }
}
