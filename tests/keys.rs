//! Key lifecycle through the public API: generation, export, import and
//! failure reporting.

use core::num::NonZeroU32;

use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use rand_core::{CryptoRng, RngCore};
use rsa_cryptor::{
    generate_pair, DigestAlgorithm, Error, KeyComponents, KeyType, Padding, PublicKeyParts,
    RsaCryptor,
};
use sha2::{Digest, Sha256};

/// Random source that always fails.
struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        panic!("rng exhausted")
    }

    fn next_u64(&mut self) -> u64 {
        panic!("rng exhausted")
    }

    fn fill_bytes(&mut self, _: &mut [u8]) {
        panic!("rng exhausted")
    }

    fn try_fill_bytes(&mut self, _: &mut [u8]) -> Result<(), rand_core::Error> {
        Err(NonZeroU32::new(rand_core::Error::CUSTOM_START)
            .unwrap()
            .into())
    }
}

impl CryptoRng for FailingRng {}

fn key_pair(seed: u8) -> (RsaCryptor, RsaCryptor) {
    let mut rng = ChaCha8Rng::from_seed([seed; 32]);
    generate_pair(&mut rng, 1024, 65537).unwrap()
}

#[test]
fn oaep_sha256_2048() {
    let mut rng = ChaCha8Rng::from_seed([1; 32]);
    let (public, private) = generate_pair(&mut rng, 2048, 65537).unwrap();
    assert_eq!(public.key_size(), 2048);
    assert_eq!(private.key_size(), 2048);

    let ciphertext = public
        .encrypt(&mut rng, Padding::Oaep, b"hello", &[], DigestAlgorithm::Sha256)
        .unwrap();
    assert_eq!(ciphertext.len(), 256);

    let plaintext = private
        .decrypt_blinded(&mut rng, Padding::Oaep, &ciphertext, &[], DigestAlgorithm::Sha256)
        .unwrap();
    assert_eq!(&plaintext[..], b"hello");
}

#[test]
fn export_import_roundtrip() {
    let (public, private) = key_pair(2);

    for key in [&public, &private] {
        let required = match key.export(&mut [0u8; 4]) {
            Err(Error::BufferTooSmall { required }) => required,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(key.exported_len(), Ok(required));

        let mut der = vec![0u8; required + 16];
        assert_eq!(key.export(&mut der), Ok(required));

        let imported = RsaCryptor::import(&der[..required]).unwrap();
        assert_eq!(imported.key_type(), key.key_type());
        assert_eq!(imported.key_size(), 1024);
        assert_eq!(imported.n(), key.n());
        assert_eq!(imported.e(), key.e());
        assert_eq!(&*imported.export_to_vec().unwrap(), &der[..required]);

        let pkcs8 = key.export_pkcs8().unwrap();
        let imported = RsaCryptor::import(&pkcs8).unwrap();
        assert_eq!(imported.key_type(), key.key_type());
        assert_eq!(imported.n(), key.n());
        assert_eq!(&*imported.export_pkcs8().unwrap(), &*pkcs8);
        assert_eq!(&*imported.export_to_vec().unwrap(), &der[..required]);
    }
}

#[test]
fn imported_key_signs_like_the_original() {
    let (public, private) = key_pair(3);
    let mut rng = ChaCha8Rng::from_seed([3; 32]);
    let hash = Sha256::digest(b"hello world");

    let imported = RsaCryptor::import(&private.export_to_vec().unwrap()).unwrap();
    let signature = imported
        .sign(&mut rng, Padding::Pkcs1, DigestAlgorithm::Sha256, &hash, 0)
        .unwrap();
    let expected = private
        .sign(&mut rng, Padding::Pkcs1, DigestAlgorithm::Sha256, &hash, 0)
        .unwrap();
    assert_eq!(signature, expected);

    public
        .verify(Padding::Pkcs1, DigestAlgorithm::Sha256, &hash, 0, &signature)
        .unwrap();
}

#[test]
fn import_rejects_garbage() {
    assert_eq!(RsaCryptor::import(&[]).unwrap_err(), Error::Param);
    assert_eq!(
        RsaCryptor::import(&[0x30, 0x03, 0x02, 0x01, 0x00]).unwrap_err(),
        Error::Decode
    );
}

#[test]
fn components_match_key() {
    let (public, private) = key_pair(4);

    match public.key_components() {
        KeyComponents::Public { modulus, exponent } => {
            assert_eq!(modulus.len(), 128);
            assert_eq!(&exponent[..], &[0x01, 0x00, 0x01]);
        }
        KeyComponents::Private { .. } => panic!("public key exposed private components"),
    }

    match private.key_components() {
        KeyComponents::Private { modulus, p, q, .. } => {
            assert_eq!(modulus.len(), 128);
            assert!(p[..] > q[..] || p.len() > q.len());
        }
        KeyComponents::Public { .. } => panic!("private key lost its factors"),
    }

    let (dp_len, dq_len, qinv_len) = private.crt_components_sizes().unwrap();
    let mut dp = vec![0u8; dp_len];
    let mut dq = vec![0u8; dq_len];
    let mut qinv = vec![0u8; qinv_len];
    assert_eq!(
        private.crt_components(&mut dp, &mut dq, &mut qinv),
        Ok((dp_len, dq_len, qinv_len))
    );
    assert_eq!(
        public.crt_components(&mut dp, &mut dq, &mut qinv),
        Err(Error::Param)
    );
}

#[test]
fn crypt_requires_exact_width() {
    let (public, private) = key_pair(5);
    assert_eq!(public.size(), 128);

    let input = [0x11u8; 128];
    let mut out = [0u8; 128];
    assert_eq!(public.crypt(&input[..127], &mut out), Err(Error::MemoryFailure));
    assert_eq!(public.crypt(&input, &mut out[..127]), Err(Error::MemoryFailure));

    assert_eq!(public.crypt(&input, &mut out), Ok(128));
    let mut back = [0u8; 128];
    assert_eq!(private.crypt(&out, &mut back), Ok(128));
    assert_eq!(back, input);
}

#[test]
fn failing_rng_is_reported() {
    let (public, private) = key_pair(6);
    let hash = Sha256::digest(b"hello");

    assert_eq!(
        generate_pair(&mut FailingRng, 1024, 65537).unwrap_err(),
        Error::RngFailure
    );
    assert_eq!(
        public.encrypt(&mut FailingRng, Padding::Oaep, b"hi", &[], DigestAlgorithm::Sha1),
        Err(Error::RngFailure)
    );
    assert_eq!(
        private.sign(&mut FailingRng, Padding::Pss, DigestAlgorithm::Sha256, &hash, 32),
        Err(Error::RngFailure)
    );
}

#[test]
fn public_key_cannot_use_private_operations() {
    let (public, _) = key_pair(7);
    let mut rng = ChaCha8Rng::from_seed([7; 32]);
    let hash = Sha256::digest(b"hello");

    assert_eq!(public.key_type(), KeyType::Public);
    assert_eq!(
        public.sign(&mut rng, Padding::Pkcs1, DigestAlgorithm::Sha256, &hash, 0),
        Err(Error::Param)
    );
    assert_eq!(
        public
            .decrypt(Padding::Pkcs1, &[1u8; 128], &[], DigestAlgorithm::None)
            .unwrap_err(),
        Error::Param
    );
}
