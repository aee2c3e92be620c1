//! Key construction: random generation, deterministic derivation from prime
//! candidates, and assembly from supplied components.

use alloc::vec::Vec;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::algorithms::fips186::{derive_key_from_candidates, Candidates};
use crate::algorithms::generate::generate_two_prime_key_with_exp;
use crate::algorithms::pad::uint_to_zeroizing_be;
use crate::algorithms::rsa::compute_private_exponent;
use crate::errors::{Error, Result};
use crate::key::{KeyType, PrivateParts, PublicParts, RsaCryptor};
use crate::rng::ensure_available;
use crate::traits::{PrivateKeyParts, PublicKeyParts};
use crate::{validate, MAX_KEY_BITS};

/// Generates a fresh key pair of `bits` bits with public exponent `e`,
/// returning `(public, private)`.
///
/// `bits` must lie in `512..=4096` ([`Error::Param`]). The exponent must be
/// odd and at least 65537, otherwise the key search rejects it with
/// [`Error::Decode`].
pub fn generate_pair<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bits: usize,
    e: u32,
) -> Result<(RsaCryptor, RsaCryptor)> {
    validate::key_bits(bits)?;
    ensure_available(rng)?;

    let components = generate_two_prime_key_with_exp(rng, bits, BigUint::from(e))?;
    let private = RsaCryptor::from_components(components, bits)?;
    let public = private.to_public_key();

    tracing::debug!(key_nbits = private.key_size(), "generated key pair");
    Ok((public, private))
}

/// Same as [`generate_pair`], drawing from the operating system's random
/// source.
#[cfg(feature = "getrandom")]
pub fn generate_pair_os(bits: usize, e: u32) -> Result<(RsaCryptor, RsaCryptor)> {
    generate_pair(&mut rand_core::OsRng, bits, e)
}

/// Prime candidates for [`create_pair_from_data`].
///
/// `xp1`, `xp2` seed the auxiliary primes of `p` and `xp` seeds `p` itself;
/// likewise for `q`. The modulus size is `8 * (xp.len() + xq.len())` bits.
#[derive(Clone, Copy, Debug)]
pub struct Fips186Candidates<'a> {
    /// First auxiliary seed of `p`.
    pub xp1: &'a [u8],
    /// Second auxiliary seed of `p`.
    pub xp2: &'a [u8],
    /// Seed of `p`.
    pub xp: &'a [u8],
    /// First auxiliary seed of `q`.
    pub xq1: &'a [u8],
    /// Second auxiliary seed of `q`.
    pub xq2: &'a [u8],
    /// Seed of `q`.
    pub xq: &'a [u8],
}

/// Values derived by [`create_pair_from_data`], big-endian.
pub struct DerivedFactors {
    p: Zeroizing<Vec<u8>>,
    q: Zeroizing<Vec<u8>>,
    modulus: Zeroizing<Vec<u8>>,
    private_exponent: Zeroizing<Vec<u8>>,
}

impl DerivedFactors {
    /// The larger prime factor.
    pub fn p(&self) -> &[u8] {
        &self.p
    }

    /// The smaller prime factor.
    pub fn q(&self) -> &[u8] {
        &self.q
    }

    /// The modulus `p * q`.
    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }

    /// The private exponent `d`.
    pub fn private_exponent(&self) -> &[u8] {
        &self.private_exponent
    }

    /// Copies the derived values into caller buffers and returns the number
    /// of bytes written to each, in argument order.
    ///
    /// Every buffer is checked before any is written; an undersized one
    /// fails with [`Error::MemoryFailure`].
    pub fn copy_into(
        &self,
        p_out: &mut [u8],
        q_out: &mut [u8],
        modulus_out: &mut [u8],
        d_out: &mut [u8],
    ) -> Result<(usize, usize, usize, usize)> {
        let fits = p_out.len() >= self.p.len()
            && q_out.len() >= self.q.len()
            && modulus_out.len() >= self.modulus.len()
            && d_out.len() >= self.private_exponent.len();
        if !fits {
            return Err(Error::MemoryFailure);
        }

        p_out[..self.p.len()].copy_from_slice(&self.p);
        q_out[..self.q.len()].copy_from_slice(&self.q);
        modulus_out[..self.modulus.len()].copy_from_slice(&self.modulus);
        d_out[..self.private_exponent.len()].copy_from_slice(&self.private_exponent);

        Ok((
            self.p.len(),
            self.q.len(),
            self.modulus.len(),
            self.private_exponent.len(),
        ))
    }
}

/// Result of [`create_pair_from_data`].
pub struct GeneratedPair {
    /// Public key.
    pub public: RsaCryptor,
    /// Private key.
    pub private: RsaCryptor,
    /// Derived factors and exponent.
    pub factors: DerivedFactors,
}

/// Deterministically derives a key pair from prime candidates, following
/// FIPS 186-4 B.3.6.
///
/// Empty candidates or a modulus over 4096 bits fail with [`Error::Param`];
/// a candidate set that yields no acceptable prime, or an unsuitable
/// exponent, fails with [`Error::Decode`].
pub fn create_pair_from_data(e: u32, candidates: &Fips186Candidates<'_>) -> Result<GeneratedPair> {
    for buf in [
        candidates.xp1,
        candidates.xp2,
        candidates.xp,
        candidates.xq1,
        candidates.xq2,
        candidates.xq,
    ] {
        validate::non_empty(buf)?;
    }

    let bits = 8 * (candidates.xp.len() + candidates.xq.len());
    if bits > MAX_KEY_BITS {
        return Err(Error::Param);
    }

    let p_candidates = Candidates {
        x1: candidates.xp1,
        x2: candidates.xp2,
        x: candidates.xp,
    };
    let q_candidates = Candidates {
        x1: candidates.xq1,
        x2: candidates.xq2,
        x: candidates.xq,
    };
    let components =
        derive_key_from_candidates(BigUint::from(e), &p_candidates, &q_candidates, bits)?;

    let private = RsaCryptor::from_components(components, bits)?;
    let public = private.to_public_key();

    let parts = validate::private_key(&private)?;
    let factors = DerivedFactors {
        p: uint_to_zeroizing_be(parts.p()),
        q: uint_to_zeroizing_be(parts.q()),
        modulus: uint_to_zeroizing_be(parts.n()),
        private_exponent: uint_to_zeroizing_be(parts.d()),
    };

    tracing::debug!(key_nbits = private.key_size(), "derived key pair from candidates");
    Ok(GeneratedPair {
        public,
        private,
        factors,
    })
}

/// Builds a single key from big-endian components.
///
/// - [`KeyType::Public`]: `modulus` and `exponent` are required; `p` and `q`
///   are ignored. The modulus must be odd, greater than one and at most 4096
///   bits.
/// - [`KeyType::Private`]: `exponent`, `p` and `q` are required, with
///   `p.len() == q.len()` and `p > q`; the factors are never swapped. A
///   non-empty `modulus` must equal `p * q`. The private exponent and CRT
///   values are derived; an exponent that is not invertible fails with
///   [`Error::Decode`].
/// - [`KeyType::Invalid`]: always [`Error::Param`].
pub fn create_from_data(
    key_type: KeyType,
    modulus: &[u8],
    exponent: &[u8],
    p: &[u8],
    q: &[u8],
) -> Result<RsaCryptor> {
    let key = match key_type {
        KeyType::Public => create_public(modulus, exponent)?,
        KeyType::Private => create_private(modulus, exponent, p, q)?,
        KeyType::Invalid => return Err(Error::Param),
    };

    tracing::debug!(
        key_type = ?key.key_type(),
        key_nbits = key.key_size(),
        "created key from components"
    );
    Ok(key)
}

fn create_public(modulus: &[u8], exponent: &[u8]) -> Result<RsaCryptor> {
    validate::non_empty(modulus)?;
    validate::non_empty(exponent)?;

    let n = BigUint::from_bytes_be(modulus);
    let e = BigUint::from_bytes_be(exponent);
    if n <= BigUint::one() || n.is_even() || n.bits() > MAX_KEY_BITS || e <= BigUint::one() {
        return Err(Error::Param);
    }

    let capacity_bits = n.bits();
    RsaCryptor::from_public_parts(PublicParts::new(n, e), capacity_bits)
}

fn create_private(modulus: &[u8], exponent: &[u8], p: &[u8], q: &[u8]) -> Result<RsaCryptor> {
    validate::non_empty(exponent)?;
    validate::non_empty(p)?;
    validate::non_empty(q)?;
    if p.len() != q.len() {
        return Err(Error::Param);
    }

    let p = BigUint::from_bytes_be(p);
    let q = BigUint::from_bytes_be(q);
    if p <= q {
        return Err(Error::Param);
    }

    let n = &p * &q;
    if !modulus.is_empty() && BigUint::from_bytes_be(modulus) != n {
        return Err(Error::Param);
    }
    if n.bits() > MAX_KEY_BITS {
        return Err(Error::Param);
    }

    let e = BigUint::from_bytes_be(exponent);
    if e <= BigUint::one() {
        return Err(Error::Param);
    }
    let d = compute_private_exponent(&p, &q, &e)?;
    let capacity_bits = n.bits();
    let parts = PrivateParts::from_factors(n, e, d, p, q)?;
    RsaCryptor::from_private_parts(parts, capacity_bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::tests::FailingRng;
    use hex_literal::hex;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    const P: [u8; 64] = hex!("e882d12d5f0be26a80359f13c08210bdcbf759dfee695313efa8886919659b064e3c656a267af6275ed1af89a5dfe9e25b31a02bafbd59445b7507a22989a681");
    const Q: [u8; 64] = hex!("e5a65cfa668bd857d59135a78c18c8adb7c222368e9d74abad8e83299f7ac3c2ad7aa44ddb05deea6d9b20dbaf09a8615284a17c72d3723240334685ea7e2559");
    const N: [u8; 128] = hex!("d0941e63a980fa92fb25ed4c7b3307f827023034ae7f1a7491f0699ca7607285e62ad8e994bac21b8b6e305e334f4874067d28e304230dca7f0e85f7ce595770b6e054c9f844ba86c0696eeba0769d8d4a347e8fe85c724ac1c44994af18a39e719f721f1bc50c46a39e6c075fcd1649f01f22608ce7dc6955502258336987d9");
    const E: [u8; 3] = hex!("010001");
    const XP1: [u8; 3] = hex!("0a0b0c");
    const XP2: [u8; 3] = hex!("0d0e0f");
    const XQ1: [u8; 3] = hex!("102030");
    const XQ2: [u8; 3] = hex!("405060");

    fn candidates<'a>(xp: &'a [u8], xq: &'a [u8]) -> Fips186Candidates<'a> {
        Fips186Candidates {
            xp1: &XP1,
            xp2: &XP2,
            xp,
            xq1: &XQ1,
            xq2: &XQ2,
            xq,
        }
    }

    #[test]
    fn test_generate_pair() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let (public, private) = generate_pair(&mut rng, 1024, 65537).unwrap();

        assert_eq!(public.key_type(), KeyType::Public);
        assert_eq!(private.key_type(), KeyType::Private);
        assert_eq!(public.key_size(), 1024);
        assert_eq!(private.key_size(), 1024);
        assert_eq!(public.n(), private.n());

        let parts = private.private_parts().unwrap();
        assert!(parts.p() > parts.q());
    }

    #[test]
    fn test_generate_pair_bad_size() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        assert!(matches!(
            generate_pair(&mut rng, 256, 65537),
            Err(Error::Param)
        ));
        assert!(matches!(
            generate_pair(&mut rng, 8192, 65537),
            Err(Error::Param)
        ));
    }

    #[test]
    fn test_generate_pair_bad_exponent() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        assert!(matches!(generate_pair(&mut rng, 512, 3), Err(Error::Decode)));
        assert!(matches!(
            generate_pair(&mut rng, 512, 65536),
            Err(Error::Decode)
        ));
    }

    #[test]
    fn test_generate_pair_rng_failure() {
        assert!(matches!(
            generate_pair(&mut FailingRng, 512, 65537),
            Err(Error::RngFailure)
        ));
    }

    #[test]
    fn test_create_pair_from_data() {
        let mut xp = [0u8; 64];
        xp[0] = 0xc0;
        let mut xq = [0u8; 64];
        xq[0] = 0xd0;

        let pair = create_pair_from_data(65537, &candidates(&xp, &xq)).unwrap();
        assert_eq!(pair.private.key_size(), 1024);
        assert_eq!(pair.public.key_size(), 1024);

        let factors = &pair.factors;
        let p = BigUint::from_bytes_be(factors.p());
        let q = BigUint::from_bytes_be(factors.q());
        assert!(p > q);
        assert_eq!(&p * &q, BigUint::from_bytes_be(factors.modulus()));

        let (mut p_out, mut q_out, mut m_out, mut d_out) =
            ([0u8; 64], [0u8; 64], [0u8; 128], [0u8; 128]);
        let sizes = factors
            .copy_into(&mut p_out, &mut q_out, &mut m_out, &mut d_out)
            .unwrap();
        assert_eq!(sizes.0, 64);
        assert_eq!(&p_out[..], factors.p());
        assert_eq!(&m_out[..sizes.2], factors.modulus());

        let mut short = [0u8; 127];
        assert_eq!(
            factors.copy_into(&mut p_out, &mut q_out, &mut short, &mut d_out),
            Err(Error::MemoryFailure)
        );

        let again = create_pair_from_data(65537, &candidates(&xp, &xq)).unwrap();
        assert_eq!(again.factors.modulus(), factors.modulus());
        assert_eq!(again.factors.private_exponent(), factors.private_exponent());
    }

    #[test]
    fn test_create_pair_from_data_errors() {
        let mut xp = [0u8; 64];
        xp[0] = 0xc0;
        let mut xq = [0u8; 64];
        xq[0] = 0xd0;

        let mut empty = candidates(&xp, &xq);
        empty.xq2 = &[];
        assert!(matches!(
            create_pair_from_data(65537, &empty),
            Err(Error::Param)
        ));

        let big = [0xc0u8; 257];
        assert!(matches!(
            create_pair_from_data(65537, &candidates(&big, &big)),
            Err(Error::Param)
        ));

        // below sqrt(2) * 2^511
        let small = [0x10u8; 64];
        assert!(matches!(
            create_pair_from_data(65537, &candidates(&small, &xq)),
            Err(Error::Decode)
        ));

        assert!(matches!(
            create_pair_from_data(3, &candidates(&xp, &xq)),
            Err(Error::Decode)
        ));
    }

    #[test]
    fn test_create_public() {
        let key = create_from_data(KeyType::Public, &N, &E, &[], &[]).unwrap();
        assert_eq!(key.key_type(), KeyType::Public);
        assert_eq!(key.key_size(), 1024);

        // even modulus
        let mut even = N;
        even[127] &= 0xfe;
        assert!(matches!(
            create_from_data(KeyType::Public, &even, &E, &[], &[]),
            Err(Error::Param)
        ));
        assert!(matches!(
            create_from_data(KeyType::Public, &[], &E, &[], &[]),
            Err(Error::Param)
        ));
        assert!(matches!(
            create_from_data(KeyType::Public, &[0x01], &E, &[], &[]),
            Err(Error::Param)
        ));

        let mut huge = vec![0xffu8; 513];
        huge[512] = 0x01;
        assert!(matches!(
            create_from_data(KeyType::Public, &huge, &E, &[], &[]),
            Err(Error::Param)
        ));
    }

    #[test]
    fn test_create_private() {
        let key = create_from_data(KeyType::Private, &[], &E, &P, &Q).unwrap();
        assert_eq!(key.key_type(), KeyType::Private);
        assert_eq!(key.key_size(), 1024);
        assert_eq!(key.n(), &BigUint::from_bytes_be(&N));

        let with_modulus = create_from_data(KeyType::Private, &N, &E, &P, &Q).unwrap();
        assert_eq!(with_modulus.n(), key.n());
    }

    #[test]
    fn test_create_private_errors() {
        // p < q is never swapped
        assert!(matches!(
            create_from_data(KeyType::Private, &[], &E, &Q, &P),
            Err(Error::Param)
        ));
        assert!(matches!(
            create_from_data(KeyType::Private, &[], &E, &P, &Q[1..]),
            Err(Error::Param)
        ));
        assert!(matches!(
            create_from_data(KeyType::Private, &[0x03], &E, &P, &Q),
            Err(Error::Param)
        ));
        assert!(matches!(
            create_from_data(KeyType::Private, &[], &[], &P, &Q),
            Err(Error::Param)
        ));
        // e <= 1 is rejected like on the public path
        let exponents: [&[u8]; 3] = [&[0x01], &[0x00], &[0x00, 0x01]];
        for e in exponents {
            assert!(matches!(
                create_from_data(KeyType::Private, &[], e, &P, &Q),
                Err(Error::Param)
            ));
        }
        // e = 2 shares a factor with lcm(p - 1, q - 1)
        assert!(matches!(
            create_from_data(KeyType::Private, &[], &[0x02], &P, &Q),
            Err(Error::Decode)
        ));
        assert!(matches!(
            create_from_data(KeyType::Invalid, &N, &E, &P, &Q),
            Err(Error::Param)
        ));
    }
}
