use core::fmt;

use num_bigint::BigUint;
use num_traits::One;
use zeroize::Zeroize;

use crate::algorithms::generate::RsaPrivateKeyComponents;
use crate::algorithms::rsa::{compute_crt_values, CrtValues};
use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};
use crate::MAX_KEY_BITS;

/// Kind of key held by an [`RsaCryptor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum KeyType {
    /// Modulus and public exponent only.
    Public = 0,
    /// Full two-prime CRT key.
    Private = 1,
    /// Never held by a live key; constructors reject it.
    Invalid = u32::MAX,
}

impl TryFrom<u32> for KeyType {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Ok(match value {
            0 => KeyType::Public,
            1 => KeyType::Private,
            u32::MAX => KeyType::Invalid,
            _ => return Err(Error::Param),
        })
    }
}

/// Public half of a key.
pub(crate) struct PublicParts {
    n: BigUint,
    e: BigUint,
}

impl PublicKeyParts for PublicParts {
    fn n(&self) -> &BigUint {
        &self.n
    }

    fn e(&self) -> &BigUint {
        &self.e
    }
}

impl Zeroize for PublicParts {
    fn zeroize(&mut self) {
        self.n.zeroize();
        self.e.zeroize();
    }
}

impl Drop for PublicParts {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Two-prime private key with precomputed CRT values, `p > q` unless it was
/// imported in the other order.
pub(crate) struct PrivateParts {
    public: PublicParts,
    d: BigUint,
    p: BigUint,
    q: BigUint,
    crt: CrtValues,
}

impl PublicKeyParts for PrivateParts {
    fn n(&self) -> &BigUint {
        &self.public.n
    }

    fn e(&self) -> &BigUint {
        &self.public.e
    }
}

impl PrivateKeyParts for PrivateParts {
    fn d(&self) -> &BigUint {
        &self.d
    }

    fn p(&self) -> &BigUint {
        &self.p
    }

    fn q(&self) -> &BigUint {
        &self.q
    }

    fn dp(&self) -> &BigUint {
        &self.crt.dp
    }

    fn dq(&self) -> &BigUint {
        &self.crt.dq
    }

    fn qinv(&self) -> &BigUint {
        &self.crt.qinv
    }
}

impl Zeroize for PrivateParts {
    fn zeroize(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.crt.dp.zeroize();
        self.crt.dq.zeroize();
        self.crt.qinv.zeroize();
    }
}

impl Drop for PrivateParts {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl PrivateParts {
    /// Assembles a private key from its factors and private exponent,
    /// deriving the CRT values.
    pub(crate) fn from_factors(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
    ) -> Result<Self> {
        let one = BigUint::one();
        if p <= one || q <= one {
            return Err(Error::Decode);
        }
        let crt = compute_crt_values(&p, &q, &d)?;
        Ok(Self {
            public: PublicParts { n, e },
            d,
            p,
            q,
            crt,
        })
    }

    pub(crate) fn public(&self) -> &PublicParts {
        &self.public
    }
}

impl PublicParts {
    pub(crate) fn new(n: BigUint, e: BigUint) -> Self {
        Self { n, e }
    }
}

enum Context {
    Public(PublicParts),
    Private(PrivateParts),
}

/// An RSA key together with its per-key context.
///
/// The context is sized once, at creation, for a fixed capacity class and is
/// never resized. Every big integer it holds is zeroized when the key is
/// [released](RsaCryptor::release) or dropped.
pub struct RsaCryptor {
    context: Context,
    capacity_bits: usize,
    key_nbits: usize,
}

impl fmt::Debug for RsaCryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaCryptor")
            .field("key_type", &self.key_type())
            .field("key_nbits", &self.key_nbits)
            .field("capacity_bits", &self.capacity_bits)
            .finish_non_exhaustive()
    }
}

impl RsaCryptor {
    fn with_context(context: Context, capacity_bits: usize) -> Result<Self> {
        let n = match &context {
            Context::Public(public) => public.n(),
            Context::Private(private) => private.n(),
        };

        // the bit length always comes from the modulus itself
        let key_nbits = n.bits();
        if key_nbits > MAX_KEY_BITS || key_nbits > capacity_bits {
            return Err(Error::Param);
        }

        Ok(Self {
            context,
            capacity_bits,
            key_nbits,
        })
    }

    pub(crate) fn from_public_parts(parts: PublicParts, capacity_bits: usize) -> Result<Self> {
        Self::with_context(Context::Public(parts), capacity_bits)
    }

    pub(crate) fn from_private_parts(parts: PrivateParts, capacity_bits: usize) -> Result<Self> {
        Self::with_context(Context::Private(parts), capacity_bits)
    }

    /// Builds the private key of a generated pair.
    pub(crate) fn from_components(
        components: RsaPrivateKeyComponents,
        capacity_bits: usize,
    ) -> Result<Self> {
        let RsaPrivateKeyComponents { n, e, d, p, q } = components;
        let parts = PrivateParts::from_factors(n, e, d, p, q)?;
        Self::from_private_parts(parts, capacity_bits)
    }

    /// Returns whether this is a public or a private key.
    pub fn key_type(&self) -> KeyType {
        match self.context {
            Context::Public(_) => KeyType::Public,
            Context::Private(_) => KeyType::Private,
        }
    }

    /// Returns the bit length of the modulus.
    pub fn key_size(&self) -> usize {
        self.key_nbits
    }

    /// Returns the capacity class the context was sized for, in bits.
    pub fn capacity_bits(&self) -> usize {
        self.capacity_bits
    }

    /// Derives the public key. For a public key this is a copy.
    pub fn to_public_key(&self) -> RsaCryptor {
        let public = self.public_parts();
        let key = RsaCryptor {
            context: Context::Public(PublicParts::new(public.n.clone(), public.e.clone())),
            capacity_bits: self.capacity_bits,
            key_nbits: self.key_nbits,
        };
        tracing::debug!(key_nbits = key.key_nbits, "derived public key");
        key
    }

    /// Destroys the key, zeroizing its material.
    pub fn release(self) {
        tracing::debug!(
            key_type = ?self.key_type(),
            key_nbits = self.key_nbits,
            "releasing key"
        );
        drop(self);
    }

    pub(crate) fn public_parts(&self) -> &PublicParts {
        match &self.context {
            Context::Public(public) => public,
            Context::Private(private) => private.public(),
        }
    }

    pub(crate) fn private_parts(&self) -> Option<&PrivateParts> {
        match &self.context {
            Context::Public(_) => None,
            Context::Private(private) => Some(private),
        }
    }
}

impl PublicKeyParts for RsaCryptor {
    fn n(&self) -> &BigUint {
        self.public_parts().n()
    }

    fn e(&self) -> &BigUint {
        self.public_parts().e()
    }

    fn size(&self) -> usize {
        self.key_nbits.div_ceil(8)
    }
}
