//! Configuration for key generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Key size used when no key has been set, in bits.
pub const DEFAULT_KEY_SIZE: usize = 1024;

/// Public exponent used for generated keys.
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65537;

/// Largest public exponent accepted for generated or imported keys.
pub const MAX_PUBLIC_EXPONENT: u64 = (1 << 33) - 1;

/// Settings that only take effect when a key pair is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Modulus size in bits for a lazily generated key.
    pub default_key_size: usize,
    /// Public exponent for a lazily generated key.
    pub public_exponent: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_key_size: DEFAULT_KEY_SIZE,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
        }
    }
}

impl Options {
    /// Returns a copy with `default_key_size` replaced.
    pub fn with_key_size(mut self, bits: usize) -> Self {
        self.default_key_size = bits;
        self
    }

    /// Returns a copy with `public_exponent` replaced.
    pub fn with_public_exponent(mut self, exponent: u64) -> Self {
        self.public_exponent = exponent;
        self
    }

    /// Checks that a key could be generated with these settings.
    ///
    /// The key size must lie within [`MIN_KEY_SIZE`](crate::MIN_KEY_SIZE) and
    /// [`MAX_KEY_SIZE`](crate::MAX_KEY_SIZE); the lower bound is the smallest
    /// modulus that fits a SHA-256 signature.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.default_key_size < crate::MIN_KEY_SIZE {
            return Err(GenerationError::KeySizeTooSmall {
                bits: self.default_key_size,
                min: crate::MIN_KEY_SIZE,
            });
        }

        if self.default_key_size > crate::MAX_KEY_SIZE {
            return Err(GenerationError::KeySizeTooLarge {
                bits: self.default_key_size,
                max: crate::MAX_KEY_SIZE,
            });
        }

        let e = self.public_exponent;
        if e < 3 || e % 2 == 0 || e > MAX_PUBLIC_EXPONENT {
            return Err(GenerationError::InvalidExponent(e));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert_eq!(opts.default_key_size, 1024);
        assert_eq!(opts.public_exponent, 65537);
        assert_eq!(opts.validate(), Ok(()));
    }

    #[test]
    fn test_validate_key_size() {
        let opts = Options::default().with_key_size(crate::MIN_KEY_SIZE - 1);
        assert_eq!(
            opts.validate(),
            Err(GenerationError::KeySizeTooSmall {
                bits: crate::MIN_KEY_SIZE - 1,
                min: crate::MIN_KEY_SIZE,
            })
        );
        assert!(Options::default()
            .with_key_size(crate::MIN_KEY_SIZE)
            .validate()
            .is_ok());
        assert!(Options::default()
            .with_key_size(crate::MAX_KEY_SIZE + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_exponent() {
        for e in [0, 1, 2, 4, 65536, MAX_PUBLIC_EXPONENT + 2] {
            let opts = Options::default().with_public_exponent(e);
            assert_eq!(opts.validate(), Err(GenerationError::InvalidExponent(e)));
        }
        for e in [3, 17, 65537, MAX_PUBLIC_EXPONENT] {
            assert!(Options::default().with_public_exponent(e).validate().is_ok());
        }
    }

    #[test]
    #[cfg(feature = "serde")]
    fn test_serde() {
        use serde_test::{assert_tokens, Token};

        let opts = Options::default().with_key_size(2048);
        assert_tokens(
            &opts,
            &[
                Token::Struct {
                    name: "Options",
                    len: 2,
                },
                Token::Str("default_key_size"),
                Token::U64(2048),
                Token::Str("public_exponent"),
                Token::U64(65537),
                Token::StructEnd,
            ],
        );
    }
}
