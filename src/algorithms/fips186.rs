//! Deterministic key derivation from caller supplied prime candidates, as in
//! FIPS 186-4 appendix B.3.6 ("probable primes with conditions based on
//! auxiliary probable primes") and the construction of appendix C.9.

use num_bigint::{prime::probably_prime, BigUint, IntoBigInt, IntoBigUint, ModInverse};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use zeroize::Zeroize;

use super::generate::{check_fips_bounds, check_public_exponent, RsaPrivateKeyComponents};
use super::rsa::compute_private_exponent;
use crate::errors::{Error, Result};

/// Miller-Rabin rounds used for every probable-prime test in this module.
const MR_ROUNDS: usize = 20;

/// Prime candidates for one factor: two auxiliary seeds and the main seed.
pub(crate) struct Candidates<'a> {
    pub x1: &'a [u8],
    pub x2: &'a [u8],
    pub x: &'a [u8],
}

/// Returns the smallest probable prime `>= x`.
pub(crate) fn next_prime(x: &BigUint) -> BigUint {
    let two = BigUint::from(2u32);
    if x <= &two {
        return two;
    }

    let mut candidate = x.clone();
    if candidate.is_even() {
        candidate += 1u32;
    }
    while !probably_prime(&candidate, MR_ROUNDS) {
        candidate += 2u32;
    }
    candidate
}

/// Builds a probable prime `p` of `half_bits` bits from the auxiliary primes
/// `r1`, `r2` and the seed `x`, such that `r1 | p - 1`, `r2 | p + 1` and
/// `gcd(p - 1, e) = 1`.
fn probable_prime_from_auxiliary(
    r1: &BigUint,
    r2: &BigUint,
    x: &BigUint,
    e: &BigUint,
    half_bits: usize,
) -> Result<BigUint> {
    let one = BigUint::one();
    let two_r1 = r1 << 1;

    // 1. gcd(2r1, r2) must be 1.
    if !two_r1.gcd(r2).is_one() {
        return Err(Error::Decode);
    }

    // 2. R = ((r2^-1 mod 2r1) * r2) - (((2r1)^-1 mod r2) * 2r1)
    let r2_inv = r2
        .clone()
        .mod_inverse(&two_r1)
        .and_then(IntoBigUint::into_biguint)
        .ok_or(Error::Decode)?;
    let two_r1_inv = two_r1
        .clone()
        .mod_inverse(r2)
        .and_then(IntoBigUint::into_biguint)
        .ok_or(Error::Decode)?;
    let r = (r2_inv * r2).into_bigint().ok_or(Error::Decode)?
        - (two_r1_inv * &two_r1).into_bigint().ok_or(Error::Decode)?;

    // 3. X >= sqrt(2) * 2^(half_bits - 1), i.e. X^2 >= 2^(2 * half_bits - 1).
    if x * x < (BigUint::one() << (2 * half_bits - 1)) {
        return Err(Error::Decode);
    }

    // 4. Y = X + ((R - X) mod 2r1r2)
    let step = &two_r1 * r2;
    let step_int = step.clone().into_bigint().ok_or(Error::Decode)?;
    let x_int = x.clone().into_bigint().ok_or(Error::Decode)?;
    let mut offset = (r - &x_int) % &step_int;
    if offset.is_negative() {
        offset += &step_int;
    }
    let mut y = (x_int + offset).into_biguint().ok_or(Error::Decode)?;

    // 5. Walk Y in steps of 2r1r2 until a suitable prime shows up.
    let limit = BigUint::one() << half_bits;
    for _ in 0..5 * half_bits {
        if y >= limit {
            break;
        }
        if (&y - &one).gcd(e).is_one() && probably_prime(&y, MR_ROUNDS) {
            return Ok(y);
        }
        y += &step;
    }

    y.zeroize();
    Err(Error::Decode)
}

/// Derives one prime factor from its candidates.
fn derive_factor(c: &Candidates<'_>, e: &BigUint, half_bits: usize) -> Result<BigUint> {
    let mut r1 = next_prime(&BigUint::from_bytes_be(c.x1));
    let mut r2 = next_prime(&BigUint::from_bytes_be(c.x2));
    let mut x = BigUint::from_bytes_be(c.x);

    let prime = probable_prime_from_auxiliary(&r1, &r2, &x, e, half_bits);

    r1.zeroize();
    r2.zeroize();
    x.zeroize();
    prime
}

/// Derives a two-prime key of `bit_size` bits from the candidate sets of
/// `p` and `q`.
///
/// The factors come back ordered `p > q`, whichever candidate produced the
/// larger one.
pub(crate) fn derive_key_from_candidates(
    exp: BigUint,
    p_candidates: &Candidates<'_>,
    q_candidates: &Candidates<'_>,
    bit_size: usize,
) -> Result<RsaPrivateKeyComponents> {
    check_public_exponent(&exp)?;
    if bit_size < 2 {
        return Err(Error::Decode);
    }

    let half_bits = bit_size / 2;
    let mut p = derive_factor(p_candidates, &exp, half_bits)?;
    let mut q = match derive_factor(q_candidates, &exp, half_bits) {
        Ok(q) => q,
        Err(err) => {
            p.zeroize();
            return Err(err);
        }
    };

    if p < q {
        core::mem::swap(&mut p, &mut q);
    }

    let d = compute_private_exponent(&p, &q, &exp).and_then(|d| {
        if d.is_zero() || !check_fips_bounds(&p, &q, &d, bit_size) {
            Err(Error::Decode)
        } else {
            Ok(d)
        }
    });

    let d = match d {
        Ok(d) => d,
        Err(err) => {
            p.zeroize();
            q.zeroize();
            return Err(err);
        }
    };

    let n = &p * &q;
    Ok(RsaPrivateKeyComponents { n, e: exp, d, p, q })
}
