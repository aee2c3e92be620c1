//! Supported padding schemes.

use crate::errors::{Error, Result};

/// Asymmetric padding selector.
///
/// Which variants an operation accepts is decided by the dispatcher; see
/// [`RsaCryptor::encrypt`](crate::RsaCryptor::encrypt) and
/// [`RsaCryptor::sign`](crate::RsaCryptor::sign).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Padding {
    /// PKCS#1 v1.5: type-2 for encryption, type-1 with `DigestInfo` for
    /// signatures.
    Pkcs1 = 1001,
    /// RSAES-OAEP.
    Oaep = 1002,
    /// RSASSA-PSS.
    Pss = 1005,
}

impl TryFrom<u32> for Padding {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Ok(match value {
            1001 => Padding::Pkcs1,
            1002 => Padding::Oaep,
            1005 => Padding::Pss,
            _ => return Err(Error::Param),
        })
    }
}
