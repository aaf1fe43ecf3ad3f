//! Key material resolution.
//!
//! A PEM block does not reliably say which of the four RSA key structures it
//! carries, so [`resolve`] decodes the block and then tries each structure in
//! a fixed order until one parses.

use core::fmt;

use base64ct::{Base64, Encoding};
use pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use pkcs8::{DecodePrivateKey, DecodePublicKey};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::errors::{Error, Result};
use crate::key::{PublicKeyParts, RsaPrivateKey, RsaPublicKey};

/// The encoded key structures accepted on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFormat {
    /// PKCS#1 `RSAPrivateKey` (`RSA PRIVATE KEY`).
    PrivateClassic,
    /// PKCS#8 `PrivateKeyInfo` wrapping an RSA key (`PRIVATE KEY`).
    PrivateTagged,
    /// X.509 `SubjectPublicKeyInfo` wrapping an RSA key (`PUBLIC KEY`).
    PublicTagged,
    /// PKCS#1 `RSAPublicKey` (`RSA PUBLIC KEY`).
    PublicClassic,
}

impl KeyFormat {
    /// Order in which the structures are attempted.
    pub const PROBE_ORDER: [KeyFormat; 4] = [
        KeyFormat::PrivateClassic,
        KeyFormat::PrivateTagged,
        KeyFormat::PublicTagged,
        KeyFormat::PublicClassic,
    ];

    /// The PEM label conventionally used for this structure.
    pub fn label(self) -> &'static str {
        match self {
            KeyFormat::PrivateClassic => "RSA PRIVATE KEY",
            KeyFormat::PrivateTagged => "PRIVATE KEY",
            KeyFormat::PublicTagged => "PUBLIC KEY",
            KeyFormat::PublicClassic => "RSA PUBLIC KEY",
        }
    }

    /// Whether this structure carries private key material.
    pub fn is_private(self) -> bool {
        matches!(self, KeyFormat::PrivateClassic | KeyFormat::PrivateTagged)
    }

    fn decode(self, der: &[u8]) -> Result<KeyPair> {
        let decoded = match self {
            KeyFormat::PrivateClassic => RsaPrivateKey::from_pkcs1_der(der)
                .map(KeyPair::Private)
                .map_err(|e| e.to_string()),
            KeyFormat::PrivateTagged => RsaPrivateKey::from_pkcs8_der(der)
                .map(KeyPair::Private)
                .map_err(|e| e.to_string()),
            KeyFormat::PublicTagged => RsaPublicKey::from_public_key_der(der)
                .map(KeyPair::Public)
                .map_err(|e| e.to_string()),
            KeyFormat::PublicClassic => RsaPublicKey::from_pkcs1_der(der)
                .map(KeyPair::Public)
                .map_err(|e| e.to_string()),
        };

        decoded.map_err(|reason| {
            trace!("key is not {}: {}", self, reason);
            Error::UnrecognizedKeyFormat
        })
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A resolved key: either a full private key (whose public half is always
/// derived from it) or a public key on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPair {
    /// Private key together with its public half.
    Private(RsaPrivateKey),
    /// Public key only.
    Public(RsaPublicKey),
}

impl KeyPair {
    /// The public key. Always available.
    pub fn public_key(&self) -> &RsaPublicKey {
        match self {
            KeyPair::Private(key) => key.as_public_key(),
            KeyPair::Public(key) => key,
        }
    }

    /// The private key, if one is held.
    pub fn private_key(&self) -> Option<&RsaPrivateKey> {
        match self {
            KeyPair::Private(key) => Some(key),
            KeyPair::Public(_) => None,
        }
    }

    /// Whether a private key is held.
    pub fn is_private(&self) -> bool {
        matches!(self, KeyPair::Private(_))
    }

    /// Modulus length in bytes.
    pub fn size(&self) -> usize {
        self.public_key().size()
    }
}

impl From<RsaPrivateKey> for KeyPair {
    fn from(key: RsaPrivateKey) -> Self {
        KeyPair::Private(key)
    }
}

impl From<RsaPublicKey> for KeyPair {
    fn from(key: RsaPublicKey) -> Self {
        KeyPair::Public(key)
    }
}

/// Where the key material held by an instance came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    /// No key material yet.
    #[default]
    Empty,
    /// Generated on first use.
    Generated,
    /// Imported from an encoded key in the given format.
    Imported(KeyFormat),
}

/// Decodes a PEM encoded RSA key of any supported structure.
///
/// The PEM label is not trusted: the payload is tried as each
/// [`KeyFormat`] in [`KeyFormat::PROBE_ORDER`] and the first structure that
/// decodes to a valid key wins.
///
/// The base64 body may be wrapped at any width, or not at all.
///
/// Returns [`Error::MalformedEncoding`] when `encoded` is not a single PEM
/// block with a valid base64 body, and [`Error::UnrecognizedKeyFormat`] when
/// the body is none of the supported structures.
pub fn resolve(encoded: &str) -> Result<(KeyFormat, KeyPair)> {
    let (label, der) = decode_pem(encoded)?;

    for format in KeyFormat::PROBE_ORDER {
        if let Ok(key_pair) = format.decode(&der) {
            debug!(
                "resolved {} key ({} bits) from a \"{}\" block",
                format,
                key_pair.public_key().n().bits(),
                label
            );
            return Ok((format, key_pair));
        }
    }

    Err(Error::UnrecognizedKeyFormat)
}

/// Splits a PEM block into its label and decoded body.
///
/// The encapsulation boundaries are checked with `pem_rfc7468`, but the body
/// is decoded leniently: all ASCII whitespace is dropped before the base64
/// decode, so line width does not matter.
fn decode_pem(encoded: &str) -> Result<(&str, Zeroizing<Vec<u8>>)> {
    let encoded = encoded.trim();
    let label = pem_rfc7468::decode_label(encoded.as_bytes()).map_err(|e| {
        trace!("key is not a PEM block: {}", e);
        Error::MalformedEncoding
    })?;

    let header = format!("-----BEGIN {}-----", label);
    let footer = format!("-----END {}-----", label);
    let start = encoded
        .find(&header)
        .map(|i| i + header.len())
        .ok_or(Error::MalformedEncoding)?;
    let end = encoded.rfind(&footer).ok_or(Error::MalformedEncoding)?;
    if end < start {
        return Err(Error::MalformedEncoding);
    }

    let body: Zeroizing<String> = Zeroizing::new(
        encoded[start..end]
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect(),
    );
    let der = Base64::decode_vec(&body).map_err(|e| {
        trace!("PEM body is not valid base64: {}", e);
        Error::MalformedEncoding
    })?;

    Ok((label, Zeroizing::new(der)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_512_PRIV_PEM: &str = include_str!("../tests/examples/pkcs1/rsa512-priv.pem");
    const RSA_512_PUB_PEM: &str = include_str!("../tests/examples/pkcs1/rsa512-pub.pem");
    const RSA_512_PKCS8_PEM: &str = include_str!("../tests/examples/pkcs8/rsa512-priv.pem");
    const RSA_512_SPKI_PEM: &str = include_str!("../tests/examples/spki/rsa512-pub.pem");
    const RSA_1024_PRIV_PEM: &str = include_str!("../tests/examples/pkcs1/rsa1024-priv.pem");
    const RSA_1024_SPKI_PEM: &str = include_str!("../tests/examples/spki/rsa1024-pub.pem");
    const P256_PKCS8_PEM: &str = include_str!("../tests/examples/pkcs8/p256-priv.pem");
    const P256_SPKI_PEM: &str = include_str!("../tests/examples/spki/p256-pub.pem");

    #[test]
    fn test_resolve_each_format() {
        let (format, pair) = resolve(RSA_512_PRIV_PEM).unwrap();
        assert_eq!(format, KeyFormat::PrivateClassic);
        assert!(pair.is_private());

        let (format, tagged) = resolve(RSA_512_PKCS8_PEM).unwrap();
        assert_eq!(format, KeyFormat::PrivateTagged);
        assert_eq!(tagged, pair);

        let (format, public) = resolve(RSA_512_SPKI_PEM).unwrap();
        assert_eq!(format, KeyFormat::PublicTagged);
        assert!(public.private_key().is_none());
        assert_eq!(public.public_key(), pair.public_key());

        let (format, classic) = resolve(RSA_512_PUB_PEM).unwrap();
        assert_eq!(format, KeyFormat::PublicClassic);
        assert_eq!(classic, public);
        assert_eq!(classic.size(), 64);
    }

    #[test]
    fn test_resolve_ignores_label() {
        // PKCS#1 private key body under a PKCS#8 label
        let relabeled = RSA_512_PRIV_PEM.replace("RSA PRIVATE KEY", "PRIVATE KEY");
        let (format, _) = resolve(&relabeled).unwrap();
        assert_eq!(format, KeyFormat::PrivateClassic);
    }

    #[test]
    fn test_resolve_tolerates_surrounding_whitespace() {
        let padded = format!("\n\n  {}\n\n", RSA_512_SPKI_PEM);
        assert_eq!(resolve(&padded).unwrap().0, KeyFormat::PublicTagged);
    }

    /// Re-wraps the body of `pem` at `width` columns, or onto one line.
    fn rewrap(pem: &str, width: Option<usize>, eol: &str) -> String {
        let lines: Vec<&str> = pem.lines().collect();
        let body = lines[1..lines.len() - 1].concat();
        let body = match width {
            Some(width) => body
                .as_bytes()
                .chunks(width)
                .map(|chunk| core::str::from_utf8(chunk).unwrap())
                .collect::<Vec<_>>()
                .join(eol),
            None => body,
        };
        [lines[0], body.as_str(), lines[lines.len() - 1], ""].join(eol)
    }

    #[test]
    fn test_resolve_any_line_width() {
        let (_, expected) = resolve(RSA_1024_SPKI_PEM).unwrap();

        let single_line = rewrap(RSA_1024_SPKI_PEM, None, "\n");
        assert_eq!(single_line.lines().count(), 3);
        assert_eq!(
            resolve(&single_line).unwrap(),
            (KeyFormat::PublicTagged, expected.clone())
        );

        let wide = rewrap(RSA_1024_SPKI_PEM, Some(76), "\n");
        assert_eq!(
            resolve(&wide).unwrap(),
            (KeyFormat::PublicTagged, expected.clone())
        );

        let narrow = rewrap(RSA_1024_SPKI_PEM, Some(40), "\n");
        assert_eq!(
            resolve(&narrow).unwrap(),
            (KeyFormat::PublicTagged, expected.clone())
        );

        let crlf = rewrap(RSA_1024_SPKI_PEM, Some(64), "\r\n");
        assert_eq!(resolve(&crlf).unwrap(), (KeyFormat::PublicTagged, expected));
    }

    #[test]
    fn test_resolve_single_line_private_key() {
        let single_line = rewrap(RSA_1024_PRIV_PEM, None, "\n");
        let (format, pair) = resolve(&single_line).unwrap();
        assert_eq!(format, KeyFormat::PrivateClassic);
        assert_eq!(pair, resolve(RSA_1024_PRIV_PEM).unwrap().1);
    }

    #[test]
    fn test_resolve_skips_leading_text() {
        let with_preamble = format!("Public key:\n{}", RSA_512_SPKI_PEM);
        assert_eq!(resolve(&with_preamble).unwrap().0, KeyFormat::PublicTagged);
    }

    #[test]
    fn test_resolve_malformed() {
        assert_eq!(resolve("").unwrap_err(), Error::MalformedEncoding);
        assert_eq!(resolve("not a key").unwrap_err(), Error::MalformedEncoding);

        let no_footer = RSA_512_PRIV_PEM.replace("-----END RSA PRIVATE KEY-----", "");
        assert_eq!(resolve(&no_footer).unwrap_err(), Error::MalformedEncoding);

        let bad_base64 = "-----BEGIN PUBLIC KEY-----\n!!!!\n-----END PUBLIC KEY-----\n";
        assert_eq!(resolve(bad_base64).unwrap_err(), Error::MalformedEncoding);

        let mismatched = "-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PRIVATE KEY-----\n";
        assert_eq!(resolve(mismatched).unwrap_err(), Error::MalformedEncoding);

        let bad_padding = rewrap(RSA_512_SPKI_PEM, None, "\n").replace("==", "=");
        assert_eq!(resolve(&bad_padding).unwrap_err(), Error::MalformedEncoding);
    }

    #[test]
    fn test_resolve_unrecognized() {
        assert_eq!(
            resolve(P256_PKCS8_PEM).unwrap_err(),
            Error::UnrecognizedKeyFormat
        );
        assert_eq!(
            resolve(P256_SPKI_PEM).unwrap_err(),
            Error::UnrecognizedKeyFormat
        );

        let garbage = "-----BEGIN PUBLIC KEY-----\nAAECAwQFBgcICQ==\n-----END PUBLIC KEY-----\n";
        assert_eq!(resolve(garbage).unwrap_err(), Error::UnrecognizedKeyFormat);
    }

    #[test]
    fn test_key_format_metadata() {
        assert!(KeyFormat::PrivateClassic.is_private());
        assert!(KeyFormat::PrivateTagged.is_private());
        assert!(!KeyFormat::PublicTagged.is_private());
        assert!(!KeyFormat::PublicClassic.is_private());
        assert_eq!(KeyFormat::PublicTagged.to_string(), "PUBLIC KEY");
        assert_eq!(KeyState::default(), KeyState::Empty);
    }
}
