#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Usage
//!
//! ## Encryption and signatures with a generated key
//!
//! A [`JsEncrypt`] instance generates its key pair the first time an
//! operation needs one. Ciphertexts and signatures are base64 strings.
//!
//! ```
//! use jsencrypt::{JsEncrypt, KeyState};
//!
//! let mut js = JsEncrypt::new();
//! js.set_default_key_size(512);
//! assert_eq!(js.key_state(), KeyState::Empty);
//!
//! // Encrypt
//! let enc_data = js.encrypt(b"hello world")?;
//! assert_eq!(js.key_state(), KeyState::Generated);
//!
//! // Decrypt
//! let dec_data = js.decrypt(&enc_data)?;
//! assert_eq!(&dec_data[..], b"hello world");
//!
//! // Sign and verify (PKCS#1 v1.5 with SHA-256)
//! let signature = js.sign(b"hello world")?;
//! assert!(js.verify(b"hello world", &signature)?);
//! assert!(!js.verify(b"hello there", &signature)?);
//! # Ok::<(), jsencrypt::Error>(())
//! ```
//!
//! ## Importing keys
//!
//! [`JsEncrypt::set_key`] accepts any of the four PEM structures below. The
//! PEM label is not trusted; the structures are tried in this order:
//!
//! | Structure | Usual label | [`KeyFormat`] |
//! |---|---|---|
//! | PKCS#1 `RSAPrivateKey` | `RSA PRIVATE KEY` | [`KeyFormat::PrivateClassic`] |
//! | PKCS#8 `PrivateKeyInfo` | `PRIVATE KEY` | [`KeyFormat::PrivateTagged`] |
//! | `SubjectPublicKeyInfo` | `PUBLIC KEY` | [`KeyFormat::PublicTagged`] |
//! | PKCS#1 `RSAPublicKey` | `RSA PUBLIC KEY` | [`KeyFormat::PublicClassic`] |
//!
//! Private keys are exported as PKCS#1 and public keys as
//! `SubjectPublicKeyInfo`.
//!
//! ```
//! use jsencrypt::{Error, JsEncrypt, KeyFormat, KeyState};
//!
//! let pem = "-----BEGIN PUBLIC KEY-----
//! MFwwDQYJKoZIhvcNAQEBBQADSwAwSAJBAKEpu21RDTXxEly55HdkVV9SlFL3Hgpl
//! i6+IohAsnaqFnApsKi1R7fAd3tBLmeHV2tlxYIogtxpzfpcc+QBVDx8CAwEAAQ==
//! -----END PUBLIC KEY-----";
//!
//! let mut js = JsEncrypt::new();
//! js.set_public_key(pem)?;
//! assert_eq!(js.key_state(), KeyState::Imported(KeyFormat::PublicTagged));
//!
//! let enc_data = js.encrypt_str("test")?;
//! assert_eq!(js.decrypt(&enc_data), Err(Error::NoPrivateKey));
//! assert_eq!(js.export_public_key()?.trim(), pem);
//! # Ok::<(), jsencrypt::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events: `debug` for
//! resolved, generated and exported keys, `trace` for each structure a key
//! failed to decode as, and `warn` for rejected keys and private key
//! operations attempted without a private key. Key material is never logged.

pub use num_bigint::BigUint;
pub use rand_core;

mod algorithms;
pub mod errors;
mod jsencrypt;
pub mod options;
mod pkcs1v15;
pub mod resolver;

mod encoding;
mod key;

pub use pkcs1;
pub use pkcs8;

pub use crate::{
    errors::{Error, GenerationError, Result},
    jsencrypt::JsEncrypt,
    key::{PrivateKeyParts, PublicKeyParts, RsaPrivateKey, RsaPublicKey},
    options::Options,
    resolver::{resolve, KeyFormat, KeyPair, KeyState},
};

/// Smallest modulus, in bits, a key may be generated with.
///
/// A PKCS#1 v1.5 SHA-256 signature needs 62 bytes of modulus, so any smaller
/// key could encrypt but never sign.
pub const MIN_KEY_SIZE: usize = 512;

/// Largest modulus, in bits, a key may have.
pub const MAX_KEY_SIZE: usize = 16384;
