//! Mask generation function common to both PSS and OAEP padding

use digest::DynDigest;

/// MGF1 as defined in RFC 8017 - PKCS #1 B.2.1: XORs `out` with the mask
/// derived from `seed`.
///
/// `out` never exceeds the modulus size, far below the 2^32 blocks limit.
pub(crate) fn mgf1_xor(out: &mut [u8], digest: &mut dyn DynDigest, seed: &[u8]) {
    let mut counter = [0u8; 4];

    for chunk in out.chunks_mut(digest.output_size()) {
        digest.update(seed);
        digest.update(&counter);

        let digest_output = digest.finalize_reset();
        for (o, d) in chunk.iter_mut().zip(digest_output.iter()) {
            *o ^= *d;
        }
        inc_counter(&mut counter);
    }
}

fn inc_counter(counter: &mut [u8; 4]) {
    for i in (0..4).rev() {
        counter[i] = counter[i].wrapping_add(1);
        if counter[i] != 0 {
            // No overflow
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use sha1::Sha1;

    #[test]
    fn test_inc_counter() {
        let mut counter = [0, 0, 0xff, 0xff];
        inc_counter(&mut counter);
        assert_eq!(counter, [0, 1, 0, 0]);
    }

    #[test]
    fn test_mgf1_sha1() {
        // MGF1-SHA1("foo", 3) and MGF1-SHA1("bar", 5)
        let mut digest = Sha1::default();
        let mut out = [0u8; 3];
        mgf1_xor(&mut out, &mut digest, b"foo");
        assert_eq!(out, hex!("1ac907"));

        let mut out = [0u8; 5];
        mgf1_xor(&mut out, &mut digest, b"bar");
        assert_eq!(out, hex!("bc0c655e01"));
    }
}
