//! Stateful RSA facade compatible with JSEncrypt.

use core::fmt;
use std::time::Instant;

use base64ct::{Base64, Encoding};
use num_bigint::BigUint;
use pkcs1::{EncodeRsaPrivateKey, LineEnding};
use pkcs8::EncodePublicKey;
use rand_core::{CryptoRngCore, OsRng};
use sha2::Sha256;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::errors::{Error, Result};
use crate::key::{PublicKeyParts, RsaPrivateKey, RsaPublicKey};
use crate::options::Options;
use crate::pkcs1v15;
use crate::resolver::{self, KeyFormat, KeyPair, KeyState};

/// Key material held by a [`JsEncrypt`] instance.
#[derive(Clone, Default)]
enum KeySlot {
    #[default]
    Empty,
    Generated(KeyPair),
    Imported(KeyFormat, KeyPair),
}

impl KeySlot {
    fn key_pair(&self) -> Option<&KeyPair> {
        match self {
            KeySlot::Empty => None,
            KeySlot::Generated(key_pair) | KeySlot::Imported(_, key_pair) => Some(key_pair),
        }
    }

    fn state(&self) -> KeyState {
        match self {
            KeySlot::Empty => KeyState::Empty,
            KeySlot::Generated(_) => KeyState::Generated,
            KeySlot::Imported(format, _) => KeyState::Imported(*format),
        }
    }
}

/// An RSA key pair together with the PKCS#1 v1.5 operations JSEncrypt
/// exposes.
///
/// An instance starts without a key. The first operation that needs one
/// generates a key pair of [`Options::default_key_size`] bits, unless a key
/// was set with [`JsEncrypt::set_key`] first. Setting a key always replaces
/// whatever was held before.
///
/// Ciphertexts and signatures are exchanged as standard base64 without line
/// breaks.
///
/// # Example
///
/// ```
/// use jsencrypt::JsEncrypt;
///
/// let mut alice = JsEncrypt::new();
/// alice.set_default_key_size(512);
///
/// let mut bob = JsEncrypt::new();
/// bob.set_key(&alice.export_public_key()?)?;
///
/// let ciphertext = bob.encrypt(b"hello")?;
/// assert_eq!(alice.decrypt(&ciphertext)?, b"hello");
///
/// let signature = alice.sign(b"hello")?;
/// assert!(bob.verify(b"hello", &signature)?);
/// # Ok::<(), jsencrypt::Error>(())
/// ```
#[derive(Clone)]
pub struct JsEncrypt<R = OsRng> {
    rng: R,
    options: Options,
    slot: KeySlot,
}

impl JsEncrypt<OsRng> {
    /// Creates an instance with default [`Options`] that draws randomness
    /// from the operating system.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Creates an instance with the given options that draws randomness from
    /// the operating system.
    pub fn with_options(options: Options) -> Self {
        Self::with_rng(OsRng, options)
    }
}

impl Default for JsEncrypt<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for JsEncrypt<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsEncrypt")
            .field("options", &self.options)
            .field("key_state", &self.slot.state())
            .finish_non_exhaustive()
    }
}

impl<R: CryptoRngCore> JsEncrypt<R> {
    /// Creates an instance that draws padding, blinding and key generation
    /// randomness from `rng`.
    pub fn with_rng(rng: R, options: Options) -> Self {
        Self {
            rng,
            options,
            slot: KeySlot::Empty,
        }
    }

    /// The options in effect.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Sets the size of a key generated later. Has no effect on a key that is
    /// already held.
    pub fn set_default_key_size(&mut self, bits: usize) {
        self.options.default_key_size = bits;
    }

    /// Replaces the held key with the PEM encoded `encoded` key.
    ///
    /// Accepts PKCS#1 and PKCS#8 private keys as well as SubjectPublicKeyInfo
    /// and PKCS#1 public keys. Importing a public key discards any private
    /// key held before. On error the held key is left unchanged.
    pub fn set_key(&mut self, encoded: &str) -> Result<()> {
        match resolver::resolve(encoded) {
            Ok((format, key_pair)) => {
                self.slot = KeySlot::Imported(format, key_pair);
                Ok(())
            }
            Err(e) => {
                warn!("rejected key: {}", e);
                Err(e)
            }
        }
    }

    /// Alias of [`JsEncrypt::set_key`].
    ///
    /// A public key is accepted here too, and leaves the instance without a
    /// private key.
    pub fn set_private_key(&mut self, encoded: &str) -> Result<()> {
        self.set_key(encoded)
    }

    /// Alias of [`JsEncrypt::set_key`].
    ///
    /// A private key is accepted here too, and is kept in full.
    pub fn set_public_key(&mut self, encoded: &str) -> Result<()> {
        self.set_key(encoded)
    }

    /// Returns the held key pair, generating one if none is held yet.
    pub fn ensure_key_pair(&mut self) -> Result<&KeyPair> {
        if let KeySlot::Empty = self.slot {
            let key = self.generate()?;
            self.slot = KeySlot::Generated(KeyPair::Private(key));
        }

        self.slot.key_pair().ok_or(Error::Internal)
    }

    fn generate(&mut self) -> Result<RsaPrivateKey> {
        self.options.validate()?;

        let bits = self.options.default_key_size;
        let exp = BigUint::from(self.options.public_exponent);

        let start = Instant::now();
        let key = RsaPrivateKey::new_with_exp(&mut self.rng, bits, &exp)?;
        debug!("generated {} bit key pair in {:?}", bits, start.elapsed());

        Ok(key)
    }

    /// Where the held key came from. Never generates a key.
    pub fn key_state(&self) -> KeyState {
        self.slot.state()
    }

    /// Whether a private key is held. Never generates a key.
    pub fn has_private_key(&self) -> bool {
        self.slot.key_pair().map_or(false, KeyPair::is_private)
    }

    /// Modulus length in bytes, which is also the length of every ciphertext
    /// and signature.
    pub fn key_size(&mut self) -> Result<usize> {
        Ok(self.ensure_key_pair()?.size())
    }

    /// Longest plaintext [`JsEncrypt::encrypt`] accepts, in bytes.
    pub fn max_message_len(&mut self) -> Result<usize> {
        Ok(self
            .key_size()?
            .saturating_sub(crate::algorithms::pkcs1v15::PADDING_OVERHEAD))
    }

    /// Exports the private key as a PKCS#1 `RSA PRIVATE KEY` PEM block.
    ///
    /// Fails with [`Error::NoPrivateKey`] when only a public key is held.
    pub fn export_private_key(&mut self) -> Result<Zeroizing<String>> {
        let key = self.private_key()?;
        let pem = key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|_| Error::Encoding)?;
        debug!("exported {} bit private key", key.n().bits());
        Ok(pem)
    }

    /// Alias of [`JsEncrypt::export_private_key`].
    pub fn get_private_key(&mut self) -> Result<Zeroizing<String>> {
        self.export_private_key()
    }

    /// Exports the public key as a SubjectPublicKeyInfo `PUBLIC KEY` PEM block.
    pub fn export_public_key(&mut self) -> Result<String> {
        let key = self.public_key()?;
        let pem = key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|_| Error::Encoding)?;
        debug!("exported {} bit public key", key.n().bits());
        Ok(pem)
    }

    /// Alias of [`JsEncrypt::export_public_key`].
    pub fn get_public_key(&mut self) -> Result<String> {
        self.export_public_key()
    }

    /// Encrypts `msg` with PKCS#1 v1.5 padding and returns the base64
    /// ciphertext.
    ///
    /// Fails with [`Error::MessageTooLong`] when `msg` is longer than
    /// [`JsEncrypt::max_message_len`].
    pub fn encrypt(&mut self, msg: &[u8]) -> Result<String> {
        self.ensure_key_pair()?;
        let Self { rng, slot, .. } = self;
        let key = slot.key_pair().ok_or(Error::Internal)?;

        let ciphertext = pkcs1v15::encrypt(rng, key.public_key(), msg)?;
        Ok(Base64::encode_string(&ciphertext))
    }

    /// Encrypts the UTF-8 bytes of `msg`.
    pub fn encrypt_str(&mut self, msg: &str) -> Result<String> {
        self.encrypt(msg.as_bytes())
    }

    /// Decrypts a base64 ciphertext produced by [`JsEncrypt::encrypt`] or
    /// JSEncrypt.
    ///
    /// A ciphertext of the wrong length and one with invalid padding both
    /// fail with [`Error::DecryptionFailed`].
    pub fn decrypt(&mut self, ciphertext: &str) -> Result<Vec<u8>> {
        self.private_key()?;
        let ciphertext = decode_base64(ciphertext)?;

        let Self { rng, slot, .. } = self;
        let key = slot
            .key_pair()
            .and_then(KeyPair::private_key)
            .ok_or(Error::NoPrivateKey)?;

        let mut plaintext = pkcs1v15::decrypt(Some(rng), key, &ciphertext)?;
        Ok(core::mem::take(&mut *plaintext))
    }

    /// Decrypts `ciphertext` and interprets the plaintext as UTF-8.
    pub fn decrypt_to_string(&mut self, ciphertext: &str) -> Result<String> {
        String::from_utf8(self.decrypt(ciphertext)?).map_err(|_| Error::InvalidUtf8)
    }

    /// Signs the SHA-256 digest of `msg` with PKCS#1 v1.5 and returns the
    /// base64 signature.
    ///
    /// An imported key below 496 bits cannot hold the SHA-256 `DigestInfo`
    /// and fails with [`Error::MessageTooLong`]. Generated keys are never
    /// that small.
    pub fn sign(&mut self, msg: &[u8]) -> Result<String> {
        self.private_key()?;

        let Self { rng, slot, .. } = self;
        let key = slot
            .key_pair()
            .and_then(KeyPair::private_key)
            .ok_or(Error::NoPrivateKey)?;

        let signature = pkcs1v15::sign::<Sha256, _>(Some(rng), key, msg)?;
        Ok(Base64::encode_string(&signature))
    }

    /// Signs the UTF-8 bytes of `msg`.
    pub fn sign_str(&mut self, msg: &str) -> Result<String> {
        self.sign(msg.as_bytes())
    }

    /// Checks a base64 PKCS#1 v1.5 SHA-256 signature over `msg`.
    ///
    /// A signature that does not match is reported as `Ok(false)`. Errors are
    /// returned only when `signature` is not base64 or cannot be a signature
    /// under the held modulus ([`Error::InvalidSignature`]).
    pub fn verify(&mut self, msg: &[u8], signature: &str) -> Result<bool> {
        let key = self.public_key()?;
        let signature = decode_base64(signature)?;
        pkcs1v15::verify::<Sha256>(key, msg, &signature)
    }

    /// Checks a signature over the UTF-8 bytes of `msg`.
    pub fn verify_str(&mut self, msg: &str, signature: &str) -> Result<bool> {
        self.verify(msg.as_bytes(), signature)
    }

    fn public_key(&mut self) -> Result<&RsaPublicKey> {
        Ok(self.ensure_key_pair()?.public_key())
    }

    fn private_key(&mut self) -> Result<&RsaPrivateKey> {
        match self.ensure_key_pair()? {
            KeyPair::Private(key) => Ok(key),
            KeyPair::Public(_) => {
                warn!("private key operation requested but only a public key is held");
                Err(Error::NoPrivateKey)
            }
        }
    }
}

fn decode_base64(input: &str) -> Result<Vec<u8>> {
    Base64::decode_vec(input.trim()).map_err(|_| Error::MalformedEncoding)
}
