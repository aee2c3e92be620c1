//! Generic RSA implementation

use alloc::borrow::Cow;
use num_bigint::{BigInt, BigUint, IntoBigInt, IntoBigUint, ModInverse, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// Raw RSA encryption of m with the public key. No padding is performed.
#[inline]
pub(crate) fn rsa_encrypt<K: PublicKeyParts>(key: &K, m: &BigUint) -> Result<BigUint> {
    Ok(m.modpow(key.e(), key.n()))
}

/// Performs raw RSA decryption with no padding or error checking.
///
/// Returns a plaintext `BigUint`. Performs RSA blinding if an `Rng` is passed.
/// Decryption always goes through the CRT values of the key.
#[inline]
pub(crate) fn rsa_decrypt<R: CryptoRngCore + ?Sized>(
    mut rng: Option<&mut R>,
    priv_key: &impl PrivateKeyParts,
    c: &BigUint,
) -> Result<BigUint> {
    if c >= priv_key.n() {
        return Err(Error::Decode);
    }

    if priv_key.n().is_zero() {
        return Err(Error::Decode);
    }

    let mut ir = None;

    let c = if let Some(ref mut rng) = rng {
        let (blinded, unblinder) = blind(rng, priv_key, c);
        ir = Some(unblinder);
        Cow::Owned(blinded)
    } else {
        Cow::Borrowed(c)
    };

    let mut p = priv_key.p().clone().into_bigint().ok_or(Error::Decode)?;

    // m1 = c^dp mod p, m2 = c^dq mod q
    let mut m = c
        .modpow(priv_key.dp(), priv_key.p())
        .into_bigint()
        .ok_or(Error::Decode)?;
    let mut m2 = c
        .modpow(priv_key.dq(), priv_key.q())
        .into_bigint()
        .ok_or(Error::Decode)?;

    // h = qinv * (m1 - m2) mod p, m = m2 + h * q
    m -= &m2;
    while m.is_negative() {
        m += &p;
    }
    m *= priv_key.qinv().clone().into_bigint().ok_or(Error::Decode)?;
    m %= &p;
    m *= priv_key.q().clone().into_bigint().ok_or(Error::Decode)?;
    m += &m2;

    // clear tmp values
    p.zeroize();
    m2.zeroize();

    let m = m.into_biguint().ok_or(Error::Decode)?;

    match ir {
        Some(ref ir) => {
            // unblind
            Ok(unblind(priv_key, &m, ir))
        }
        None => Ok(m),
    }
}

/// Performs raw RSA decryption with no padding.
///
/// Returns a plaintext `BigUint`. Performs RSA blinding if an `Rng` is passed.
/// This will also check for errors in the CRT computation.
#[inline]
pub(crate) fn rsa_decrypt_and_check<R: CryptoRngCore + ?Sized>(
    priv_key: &impl PrivateKeyParts,
    rng: Option<&mut R>,
    c: &BigUint,
) -> Result<BigUint> {
    let m = rsa_decrypt(rng, priv_key, c)?;

    // In order to defend against errors in the CRT computation, m^e is
    // calculated, which should match the original ciphertext.
    let check = rsa_encrypt(priv_key, &m)?;

    if c != &check {
        return Err(Error::Decode);
    }

    Ok(m)
}

/// Returns the blinded c, along with the unblinding factor.
fn blind<R: CryptoRngCore, K: PublicKeyParts>(
    rng: &mut R,
    key: &K,
    c: &BigUint,
) -> (BigUint, BigUint) {
    // Blinding involves multiplying c by r^e.
    // Then the decryption operation performs (m^e * r^e)^d mod n
    // which equals mr mod n. The factor of r can then be removed
    // by multiplying by the multiplicative inverse of r.

    let mut r: BigUint;
    let mut ir: Option<BigInt>;
    let unblinder;
    loop {
        r = rng.gen_biguint_below(key.n());
        if r.is_zero() {
            r = BigUint::one();
        }
        ir = r.clone().mod_inverse(key.n());
        if let Some(ir) = ir {
            if let Some(ub) = ir.into_biguint() {
                unblinder = ub;
                break;
            }
        }
    }

    let c = {
        let mut rpowe = r.modpow(key.e(), key.n()); // N != 0
        let mut c = c * &rpowe;
        c %= key.n();

        rpowe.zeroize();

        c
    };

    r.zeroize();

    (c, unblinder)
}

/// Given an m and and unblinding factor, unblind the m.
fn unblind(key: &impl PublicKeyParts, m: &BigUint, unblinder: &BigUint) -> BigUint {
    (m * unblinder) % key.n()
}

/// Computes the private exponent `d = e^-1 mod lcm(p - 1, q - 1)`.
///
/// Fails if `e` is not invertible.
pub(crate) fn compute_private_exponent(
    p: &BigUint,
    q: &BigUint,
    e: &BigUint,
) -> Result<BigUint> {
    let one = BigUint::one();
    if p <= &one || q <= &one {
        return Err(Error::Decode);
    }

    let mut lambda = (p - &one).lcm(&(q - &one));
    let d = e
        .clone()
        .mod_inverse(&lambda)
        .and_then(IntoBigUint::into_biguint)
        .ok_or(Error::Decode);
    lambda.zeroize();
    d
}

/// Precomputed CRT terms of a two-prime key.
pub(crate) struct CrtValues {
    /// D mod (P-1)
    pub dp: BigUint,
    /// D mod (Q-1)
    pub dq: BigUint,
    /// Q^-1 mod P
    pub qinv: BigUint,
}

/// Derives `dp`, `dq` and `qinv` from the private exponent and the primes.
pub(crate) fn compute_crt_values(p: &BigUint, q: &BigUint, d: &BigUint) -> Result<CrtValues> {
    let one = BigUint::one();
    let dp = d % (p - &one);
    let dq = d % (q - &one);
    let qinv = q
        .clone()
        .mod_inverse(p)
        .and_then(IntoBigUint::into_biguint)
        .ok_or(Error::Decode)?;

    Ok(CrtValues { dp, dq, qinv })
}
