//! Digest algorithm identifiers and the descriptor registry.
//!
//! The numbering of [`DigestAlgorithm`] follows the historical digest enum
//! used by CommonCrypto-style APIs so raw values coming from foreign callers
//! can be converted with [`TryFrom<u32>`].

use alloc::boxed::Box;
use const_oid::{AssociatedOid, ObjectIdentifier};
use digest::{Digest, DynDigest};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::errors::{Error, Result};

/// Digest algorithm selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DigestAlgorithm {
    /// No digest.
    None = 0,
    /// MD2.
    Md2 = 1,
    /// MD4.
    Md4 = 2,
    /// MD5.
    Md5 = 3,
    /// RIPEMD-128.
    Rmd128 = 4,
    /// RIPEMD-160.
    Rmd160 = 5,
    /// RIPEMD-256.
    Rmd256 = 6,
    /// RIPEMD-320.
    Rmd320 = 7,
    /// SHA-1.
    Sha1 = 8,
    /// SHA-224.
    Sha224 = 9,
    /// SHA-256.
    Sha256 = 10,
    /// SHA-384.
    Sha384 = 11,
    /// SHA-512.
    Sha512 = 12,
}

impl TryFrom<u32> for DigestAlgorithm {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Ok(match value {
            0 => DigestAlgorithm::None,
            1 => DigestAlgorithm::Md2,
            2 => DigestAlgorithm::Md4,
            3 => DigestAlgorithm::Md5,
            4 => DigestAlgorithm::Rmd128,
            5 => DigestAlgorithm::Rmd160,
            6 => DigestAlgorithm::Rmd256,
            7 => DigestAlgorithm::Rmd320,
            8 => DigestAlgorithm::Sha1,
            9 => DigestAlgorithm::Sha224,
            10 => DigestAlgorithm::Sha256,
            11 => DigestAlgorithm::Sha384,
            12 => DigestAlgorithm::Sha512,
            _ => return Err(Error::Param),
        })
    }
}

/// Descriptor of a registered digest: OID and sizes.
///
/// Only [`DigestAlgorithm::info`] builds descriptors, so every descriptor
/// belongs to a registered digest.
#[derive(Clone, Copy, Debug)]
pub struct DigestInfo {
    algorithm: DigestAlgorithm,
    oid: ObjectIdentifier,
    output_size: usize,
    block_size: usize,
    new_hasher: fn() -> Box<dyn DynDigest + Send + Sync>,
}

impl PartialEq for DigestInfo {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm
    }
}

impl Eq for DigestInfo {}

fn boxed_hasher<D>() -> Box<dyn DynDigest + Send + Sync>
where
    D: DynDigest + Default + Send + Sync + 'static,
{
    Box::new(D::default())
}

impl DigestInfo {
    fn of<D>(algorithm: DigestAlgorithm, block_size: usize) -> Self
    where
        D: Digest + DynDigest + AssociatedOid + Default + Send + Sync + 'static,
    {
        Self {
            algorithm,
            oid: D::OID,
            output_size: <D as Digest>::output_size(),
            block_size,
            new_hasher: boxed_hasher::<D>,
        }
    }

    /// Algorithm this descriptor belongs to.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Registered object identifier, used in PKCS#1 v1.5 `DigestInfo`.
    pub fn oid(&self) -> ObjectIdentifier {
        self.oid
    }

    /// Output length in bytes.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Internal block length in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns a fresh hasher for this digest.
    pub fn hasher(&self) -> Box<dyn DynDigest + Send + Sync> {
        (self.new_hasher)()
    }

    /// Hashes `data` in one shot.
    pub fn digest(&self, data: &[u8]) -> Box<[u8]> {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize_reset()
    }
}

impl DigestAlgorithm {
    /// Looks up the descriptor of this digest. Only the SHA family is
    /// registered.
    pub fn info(self) -> Option<DigestInfo> {
        match self {
            DigestAlgorithm::Sha1 => Some(DigestInfo::of::<Sha1>(self, 64)),
            DigestAlgorithm::Sha224 => Some(DigestInfo::of::<Sha224>(self, 64)),
            DigestAlgorithm::Sha256 => Some(DigestInfo::of::<Sha256>(self, 64)),
            DigestAlgorithm::Sha384 => Some(DigestInfo::of::<Sha384>(self, 128)),
            DigestAlgorithm::Sha512 => Some(DigestInfo::of::<Sha512>(self, 128)),
            _ => None,
        }
    }
}
