//! Encryption, decryption, signing and raw exponentiation, dispatched on
//! the padding scheme and the kind of key.

use alloc::vec::Vec;
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::algorithms::oaep::{oaep_decrypt, oaep_encrypt};
use crate::algorithms::pad::{uint_to_be_pad, uint_to_zeroizing_be_pad, uint_write_be_pad};
use crate::algorithms::pkcs1v15::{
    pkcs1v15_encrypt_pad, pkcs1v15_encrypt_unpad, pkcs1v15_generate_prefix, pkcs1v15_sign_pad,
    pkcs1v15_sign_unpad,
};
use crate::algorithms::pss::{emsa_pss_encode, emsa_pss_verify};
use crate::algorithms::rsa::{rsa_decrypt, rsa_decrypt_and_check, rsa_encrypt};
use crate::dummy_rng::DummyRng;
use crate::errors::{Error, Result};
use crate::hash::DigestAlgorithm;
use crate::key::{PrivateParts, RsaCryptor};
use crate::padding::Padding;
use crate::rng::{ensure_available, fill};
use crate::traits::PublicKeyParts;
use crate::validate;

impl RsaCryptor {
    /// Encrypts `plaintext` with the public half of this key.
    ///
    /// [`Padding::Pkcs1`] applies type-2 padding and ignores `label` and
    /// `digest`. [`Padding::Oaep`] hashes `label` with `digest` and uses the
    /// same digest for MGF1. A message too long for the key fails with
    /// [`Error::Decode`].
    pub fn encrypt<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        padding: Padding,
        plaintext: &[u8],
        label: &[u8],
        digest: DigestAlgorithm,
    ) -> Result<Vec<u8>> {
        validate::encryption_padding(padding)?;
        tracing::trace!(?padding, ?digest, "encrypt");

        let k = self.size();
        let em = match padding {
            Padding::Oaep => {
                let info = validate::digest(digest)?;
                oaep_encrypt(rng, plaintext, &mut *info.hasher(), label, k)?
            }
            _ => pkcs1v15_encrypt_pad(rng, plaintext, k)?,
        };

        let int = Zeroizing::new(BigUint::from_bytes_be(&em));
        uint_to_be_pad(rsa_encrypt(self.public_parts(), &int)?, k)
    }

    /// Decrypts `ciphertext`. Private keys only.
    ///
    /// Every failure past argument validation is reported as
    /// [`Error::Decode`], whatever its cause.
    pub fn decrypt(
        &self,
        padding: Padding,
        ciphertext: &[u8],
        label: &[u8],
        digest: DigestAlgorithm,
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.decrypt_inner(None::<&mut DummyRng>, padding, ciphertext, label, digest)
    }

    /// Like [`decrypt`](RsaCryptor::decrypt), with the private
    /// exponentiation blinded by randomness from `rng`.
    pub fn decrypt_blinded<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        padding: Padding,
        ciphertext: &[u8],
        label: &[u8],
        digest: DigestAlgorithm,
    ) -> Result<Zeroizing<Vec<u8>>> {
        ensure_available(rng)?;
        self.decrypt_inner(Some(rng), padding, ciphertext, label, digest)
    }

    fn decrypt_inner<R: CryptoRngCore + ?Sized>(
        &self,
        rng: Option<&mut R>,
        padding: Padding,
        ciphertext: &[u8],
        label: &[u8],
        digest: DigestAlgorithm,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let private = validate::private_key(self)?;
        validate::encryption_padding(padding)?;
        validate::non_empty(ciphertext)?;
        let info = match padding {
            Padding::Oaep => Some(validate::digest(digest)?),
            _ => None,
        };
        tracing::trace!(?padding, ?digest, "decrypt");

        let k = self.size();
        let plaintext = decrypt_padded(rng, private, k, ciphertext, |em| match info {
            Some(info) => oaep_decrypt(em, &mut *info.hasher(), label, k),
            None => pkcs1v15_encrypt_unpad(em.to_vec(), k),
        });

        // the cause of a decryption failure is never reported
        plaintext.map(Zeroizing::new).map_err(|_| Error::Decode)
    }

    /// Signs the precomputed `hash`. Private keys only.
    ///
    /// `hash.len()` must equal the output size of `digest`. With
    /// [`Padding::Pkcs1`] the hash is wrapped in a `DigestInfo` carrying the
    /// digest's OID; with [`Padding::Pss`] a random salt of `salt_len` bytes
    /// is drawn from `rng` and `digest` also drives MGF1. The private
    /// exponentiation is blinded and checked against the public key.
    pub fn sign<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        padding: Padding,
        digest: DigestAlgorithm,
        hash: &[u8],
        salt_len: usize,
    ) -> Result<Vec<u8>> {
        let private = validate::private_key(self)?;
        let info = validate::digest(digest)?;
        validate::signature_padding(padding)?;
        if hash.len() != info.output_size() {
            return Err(Error::Param);
        }
        ensure_available(rng)?;
        tracing::trace!(?padding, ?digest, "sign");

        let k = self.size();
        let em = match padding {
            Padding::Pss => {
                if !pss_salt_fits(self.key_size(), info.output_size(), salt_len) {
                    return Err(Error::Decode);
                }
                let mut salt = Zeroizing::new(vec![0u8; salt_len]);
                fill(rng, &mut salt)?;
                emsa_pss_encode(hash, self.key_size() - 1, &salt, &mut *info.hasher())?
            }
            _ => pkcs1v15_sign_pad(&pkcs1v15_generate_prefix(&info), hash, k)?,
        };

        let em = Zeroizing::new(BigUint::from_bytes_be(&em));
        let signature = rsa_decrypt_and_check(private, Some(rng), &em)?;
        uint_to_be_pad(signature, k)
    }

    /// Verifies `signature` over the precomputed `hash` with the public half
    /// of this key.
    ///
    /// Malformed input and a signature that does not match both fail with
    /// [`Error::Decode`].
    pub fn verify(
        &self,
        padding: Padding,
        digest: DigestAlgorithm,
        hash: &[u8],
        salt_len: usize,
        signature: &[u8],
    ) -> Result<()> {
        let info = validate::digest(digest)?;
        validate::signature_padding(padding)?;
        validate::non_empty(hash)?;
        validate::non_empty(signature)?;
        tracing::trace!(?padding, ?digest, "verify");

        let k = self.size();
        let check = || -> Result<()> {
            if signature.len() != k {
                return Err(Error::Decode);
            }
            let s = BigUint::from_bytes_be(signature);
            if &s >= self.n() {
                return Err(Error::Decode);
            }

            let mut em = uint_to_be_pad(rsa_encrypt(self.public_parts(), &s)?, k)?;
            match padding {
                Padding::Pss => {
                    if !pss_salt_fits(self.key_size(), info.output_size(), salt_len) {
                        return Err(Error::Decode);
                    }
                    emsa_pss_verify(hash, &mut em, salt_len, &mut *info.hasher(), self.key_size())
                }
                _ => pkcs1v15_sign_unpad(&pkcs1v15_generate_prefix(&info), hash, &em, k),
            }
        };

        check().map_err(|_| Error::Decode)
    }

    /// Raw modular exponentiation: `input^e mod n` for a public key, the CRT
    /// private operation for a private key.
    ///
    /// `input` must be exactly [`size`](PublicKeyParts::size) bytes and
    /// `output` at least that long ([`Error::MemoryFailure`]); an input not
    /// below the modulus fails with [`Error::Param`]. The result is written
    /// left padded to the key width, which is returned.
    pub fn crypt(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let k = self.size();
        if input.len() != k || output.len() < k {
            return Err(Error::MemoryFailure);
        }
        tracing::trace!(key_type = ?self.key_type(), "crypt");

        let x = Zeroizing::new(BigUint::from_bytes_be(input));
        if &*x >= self.n() {
            return Err(Error::Param);
        }

        let y = match self.private_parts() {
            Some(private) => rsa_decrypt::<DummyRng>(None, private, &x),
            None => rsa_encrypt(self.public_parts(), &x),
        }
        .map_err(|_| Error::Param)?;

        let y = Zeroizing::new(y);
        uint_write_be_pad(&y, k, output)
    }
}

/// Whether a PSS encoding for a `key_bits` modulus has room for the hash,
/// a salt of `salt_len` bytes and the two framing bytes.
fn pss_salt_fits(key_bits: usize, h_len: usize, salt_len: usize) -> bool {
    let em_len = key_bits.saturating_sub(1).div_ceil(8);
    h_len
        .checked_add(salt_len)
        .and_then(|len| len.checked_add(2))
        .is_some_and(|len| len <= em_len)
}

/// Runs the private operation on `ciphertext` and hands the encoded message
/// to `unpad`.
fn decrypt_padded<R, F>(
    rng: Option<&mut R>,
    private: &PrivateParts,
    k: usize,
    ciphertext: &[u8],
    unpad: F,
) -> Result<Vec<u8>>
where
    R: CryptoRngCore + ?Sized,
    F: FnOnce(&mut [u8]) -> Result<Vec<u8>>,
{
    if ciphertext.len() != k {
        return Err(Error::Decode);
    }

    let c = BigUint::from_bytes_be(ciphertext);
    let m = rsa_decrypt_and_check(private, rng, &c)?;
    let mut em = uint_to_zeroizing_be_pad(m, k)?;
    unpad(&mut em)
}
