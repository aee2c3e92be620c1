//! Error types.

/// Alias for [`core::result::Result`] with the `rsa-cryptor` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Status of a failed operation.
///
/// The taxonomy is deliberately flat. Decryption and verification collapse
/// every failure cause into [`Error::Decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// Invalid, empty or out-of-range argument, disallowed digest or
    /// padding, `p <= q` ordering violation or unsupported key type.
    #[error("invalid parameter")]
    Param,

    /// Fixed-width buffer size mismatch.
    #[error("memory failure")]
    MemoryFailure,

    /// Output capacity is insufficient; retry with `required` bytes.
    #[error("buffer too small: {required} bytes required")]
    BufferTooSmall {
        /// Exact number of bytes the operation needs.
        required: usize,
    },

    /// Malformed input, rejection by the arithmetic engine, or failed
    /// padding/signature verification.
    #[error("decode error")]
    Decode,

    /// The random number generator could not produce output.
    #[error("random number generator failure")]
    RngFailure,
}

impl From<pkcs1::Error> for Error {
    fn from(_err: pkcs1::Error) -> Error {
        Error::Decode
    }
}

impl From<pkcs8::Error> for Error {
    fn from(_err: pkcs8::Error) -> Error {
        Error::Decode
    }
}

impl From<spki::Error> for Error {
    fn from(_err: spki::Error) -> Error {
        Error::Decode
    }
}

impl From<pkcs1::der::Error> for Error {
    fn from(_err: pkcs1::der::Error) -> Error {
        Error::Decode
    }
}

impl From<rand_core::Error> for Error {
    fn from(_err: rand_core::Error) -> Error {
        Error::RngFailure
    }
}
