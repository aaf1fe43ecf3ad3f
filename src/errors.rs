//! Error types.

use thiserror::Error;

/// Alias for [`core::result::Result`] with the `jsencrypt` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Input is not a delimited PEM block, or not valid base64.
    #[error("malformed encoding")]
    MalformedEncoding,

    /// The PEM block decoded but matches none of the supported RSA key structures.
    #[error("unrecognized key format")]
    UnrecognizedKeyFormat,

    /// Plaintext exceeds the modulus size minus the PKCS#1 v1.5 overhead.
    #[error("message too long")]
    MessageTooLong,

    /// Decryption or signing was requested while only a public key is held.
    #[error("no private key available")]
    NoPrivateKey,

    /// Ciphertext length or padding is invalid. Causes are deliberately not
    /// distinguished.
    #[error("decryption error")]
    DecryptionFailed,

    /// The signature cannot belong to this modulus (wrong length or out of range).
    #[error("invalid signature")]
    InvalidSignature,

    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(#[from] GenerationError),

    /// Decrypted plaintext is not valid UTF-8.
    #[error("plaintext is not valid UTF-8")]
    InvalidUtf8,

    /// A prime factor is invalid.
    #[error("invalid prime value")]
    InvalidPrime,

    /// The modulus does not match the key's factors or is malformed.
    #[error("invalid modulus")]
    InvalidModulus,

    /// The private exponent is not the inverse of the public exponent.
    #[error("invalid exponent")]
    InvalidExponent,

    /// Public exponent below the accepted minimum.
    #[error("public exponent too small")]
    PublicExponentTooSmall,

    /// Public exponent above the accepted maximum.
    #[error("public exponent too large")]
    PublicExponentTooLarge,

    /// Modulus exceeds the supported size.
    #[error("modulus too large")]
    ModulusTooLarge,

    /// Serializing a key to DER/PEM failed.
    #[error("key encoding error")]
    Encoding,

    /// Internal failure, e.g. a CRT computation that did not verify.
    #[error("internal error")]
    Internal,
}

/// Reasons key generation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Requested modulus size is too small.
    #[error("key size of {bits} bits is below the minimum of {min} bits")]
    KeySizeTooSmall {
        /// Requested size.
        bits: usize,
        /// Smallest supported size.
        min: usize,
    },

    /// Requested modulus size is above the supported maximum.
    #[error("key size of {bits} bits is above the maximum of {max} bits")]
    KeySizeTooLarge {
        /// Requested size.
        bits: usize,
        /// Largest supported size.
        max: usize,
    },

    /// Configured public exponent is even or out of range.
    #[error("public exponent {0} is not usable")]
    InvalidExponent(u64),

    /// Not enough primes of the requested length exist.
    #[error("too few primes of given length to generate an RSA key")]
    TooFewPrimes,

    /// Generated components failed validation.
    #[error("generated key components are inconsistent")]
    Inconsistent,
}
