//! Generate prime components for the RSA Private Key

use num_bigint::{BigUint, RandPrime};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::{
    algorithms::rsa::compute_private_exponent,
    errors::{Error, Result},
    MIN_PUBLIC_EXPONENT,
};

/// Components of a freshly derived two-prime key, ordered so that `p > q`.
pub(crate) struct RsaPrivateKeyComponents {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub p: BigUint,
    pub q: BigUint,
}

/// Checks the public exponent accepted for key generation: odd and at least
/// 65537.
pub(crate) fn check_public_exponent(exp: &BigUint) -> Result<()> {
    if exp.is_even() || exp < &BigUint::from(MIN_PUBLIC_EXPONENT) {
        return Err(Error::Decode);
    }

    Ok(())
}

/// Checks the FIPS 186-4 bounds shared by every generation path:
/// `|p - q| > 2^(nlen/2 - 100)` and `d > 2^(nlen/2)`.
pub(crate) fn check_fips_bounds(p: &BigUint, q: &BigUint, d: &BigUint, bit_size: usize) -> bool {
    let half = bit_size / 2;
    let diff = if p > q { p - q } else { q - p };
    let min_diff = BigUint::one() << half.saturating_sub(100);
    let min_d = BigUint::one() << half;

    diff > min_diff && d > &min_d
}

/// Generates a two-prime RSA keypair of the given bit size, public exponent,
/// and the given random source.
///
/// Candidates are rejected until `gcd(e, p - 1) = gcd(e, q - 1) = 1`, the
/// modulus has exactly `bit_size` bits and the FIPS 186-4 bounds hold.
pub(crate) fn generate_two_prime_key_with_exp<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
    exp: BigUint,
) -> Result<RsaPrivateKeyComponents> {
    check_public_exponent(&exp)?;

    let one = BigUint::one();

    loop {
        // `gen_prime` sets the top two bits in each prime, so the product of
        // the two always has `bit_size` or `bit_size - 1` bits.
        let mut p: BigUint = rng.gen_prime(bit_size - bit_size / 2);
        let mut q: BigUint = rng.gen_prime(bit_size / 2);

        if p == q {
            continue;
        }
        if p < q {
            core::mem::swap(&mut p, &mut q);
        }

        let n = &p * &q;
        if n.bits() != bit_size {
            p.zeroize();
            q.zeroize();
            continue;
        }

        if !exp.gcd(&(&p - &one)).is_one() || !exp.gcd(&(&q - &one)).is_one() {
            p.zeroize();
            q.zeroize();
            continue;
        }

        let mut d = match compute_private_exponent(&p, &q, &exp) {
            Ok(d) => d,
            Err(_) => {
                p.zeroize();
                q.zeroize();
                continue;
            }
        };

        if d.is_zero() || !check_fips_bounds(&p, &q, &d, bit_size) {
            d.zeroize();
            p.zeroize();
            q.zeroize();
            continue;
        }

        return Ok(RsaPrivateKeyComponents { n, e: exp, d, p, q });
    }
}
