#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo_small.png")]
#![warn(missing_docs)]

//! # Supported operations
//!
//! Every operation goes through an [`RsaCryptor`], which holds either a
//! public or a two-prime private key:
//!
//! - key generation: [`generate_pair`], [`create_pair_from_data`] (FIPS 186-4
//!   B.3.6 derivation from prime candidates) and [`create_from_data`]
//! - encryption: PKCS#1 v1.5 and [OAEP] with SHA-1 or SHA-2
//! - signatures over precomputed hashes: PKCS#1 v1.5 and [PSS]
//! - raw exponentiation: [`RsaCryptor::crypt`]
//! - import and export of PKCS#1 and PKCS#8 DER
//!
//! Errors are flat: every failure maps to one [`Error`] variant, and
//! decryption and verification never say more than [`Error::Decode`].
//!
//! # Usage
//!
//! ## OAEP encryption
//!
//! ```
//! use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
//! use rsa_cryptor::{generate_pair, DigestAlgorithm, Padding};
//!
//! let mut rng = ChaCha8Rng::from_seed([42; 32]);
//! let (public, private) = generate_pair(&mut rng, 1024, 65537).expect("failed to generate a key");
//!
//! // Encrypt
//! let data = b"hello world";
//! let enc_data = public
//!     .encrypt(&mut rng, Padding::Oaep, data, &[], DigestAlgorithm::Sha256)
//!     .expect("failed to encrypt");
//! assert_ne!(&data[..], &enc_data[..]);
//!
//! // Decrypt
//! let dec_data = private
//!     .decrypt(Padding::Oaep, &enc_data, &[], DigestAlgorithm::Sha256)
//!     .expect("failed to decrypt");
//! assert_eq!(&data[..], &dec_data[..]);
//! ```
//!
//! ## PKCS#1 v1.5 signatures
//!
//! ```
//! use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
//! use rsa_cryptor::{generate_pair, DigestAlgorithm, Padding};
//!
//! let mut rng = ChaCha8Rng::from_seed([42; 32]);
//! let (public, private) = generate_pair(&mut rng, 1024, 65537).expect("failed to generate a key");
//!
//! let hash = DigestAlgorithm::Sha256.info().unwrap().digest(b"hello world");
//!
//! // Sign
//! let signature = private
//!     .sign(&mut rng, Padding::Pkcs1, DigestAlgorithm::Sha256, &hash, 0)
//!     .expect("failed to sign");
//!
//! // Verify
//! public
//!     .verify(Padding::Pkcs1, DigestAlgorithm::Sha256, &hash, 0, &signature)
//!     .expect("failed to verify");
//! ```
//!
//! ## Key export and import
//!
//! [`RsaCryptor::export`] writes PKCS#1 DER into a caller buffer and reports
//! the required size when the buffer is short:
//!
//! ```
//! use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
//! use rsa_cryptor::{generate_pair, Error, KeyType, RsaCryptor};
//!
//! let mut rng = ChaCha8Rng::from_seed([42; 32]);
//! let (_, private) = generate_pair(&mut rng, 1024, 65537).expect("failed to generate a key");
//!
//! let required = match private.export(&mut []) {
//!     Err(Error::BufferTooSmall { required }) => required,
//!     other => panic!("unexpected {:?}", other),
//! };
//! let mut der = vec![0u8; required];
//! private.export(&mut der).expect("failed to export");
//!
//! let imported = RsaCryptor::import(&der).expect("failed to import");
//! assert_eq!(imported.key_type(), KeyType::Private);
//! ```
//!
//! [OAEP]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.1
//! [PSS]: https://datatracker.ietf.org/doc/html/rfc8017#section-8.1

#[cfg(doctest)]
pub struct ReadmeDoctests;

#[macro_use]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub use num_bigint::BigUint;
pub use rand_core;

mod algorithms;
pub mod errors;
pub mod hash;
pub mod keygen;
pub mod padding;
pub mod traits;

mod cryptor;
mod dummy_rng;
mod encoding;
mod key;
mod rng;
mod validate;

pub use pkcs1;
pub use pkcs8;

pub use crate::{
    encoding::KeyComponents,
    errors::{Error, Result},
    hash::{DigestAlgorithm, DigestInfo},
    key::{KeyType, RsaCryptor},
    keygen::{
        create_from_data, create_pair_from_data, generate_pair, DerivedFactors,
        Fips186Candidates, GeneratedPair,
    },
    padding::Padding,
    traits::{PrivateKeyParts, PublicKeyParts},
};

#[cfg(feature = "getrandom")]
pub use crate::keygen::generate_pair_os;

/// Largest modulus size supported by any context, in bits.
pub const MAX_KEY_BITS: usize = 4096;

/// Smallest modulus size accepted by [`generate_pair`], in bits.
pub const MIN_KEY_BITS: usize = 512;

/// Smallest public exponent accepted for key generation.
pub const MIN_PUBLIC_EXPONENT: u32 = 65537;
