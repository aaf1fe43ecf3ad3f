//! PKCS#1 v1.5 encryption and signatures as described in [RFC8017 § 7.2] and
//! [RFC8017 § 8.2].
//!
//! [RFC8017 § 7.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-7.2
//! [RFC8017 § 8.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-8.2

use const_oid::AssociatedOid;
use digest::Digest;
use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::algorithms::pad::{uint_to_be_pad, uint_to_zeroizing_be_pad};
use crate::algorithms::pkcs1v15::*;
use crate::algorithms::rsa::{rsa_decrypt_and_check, rsa_encrypt};
use crate::errors::{Error, Result};
use crate::key::{self, PublicKeyParts, RsaPrivateKey, RsaPublicKey};

/// Encrypts the given message with RSA and the padding
/// scheme from PKCS#1 v1.5.  The message must be no longer than the
/// length of the public modulus minus 11 bytes.
#[inline]
pub(crate) fn encrypt<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    pub_key: &RsaPublicKey,
    msg: &[u8],
) -> Result<Vec<u8>> {
    key::check_public(pub_key)?;

    let em = pkcs1v15_encrypt_pad(rng, msg, pub_key.size())?;
    let int = Zeroizing::new(BigUint::from_bytes_be(&em));
    uint_to_be_pad(rsa_encrypt(pub_key, &int), pub_key.size())
}

/// Decrypts a plaintext using RSA and the padding scheme from PKCS#1 v1.5.
///
/// If an `rng` is passed, it uses RSA blinding to avoid timing side-channel attacks.
///
/// A ciphertext whose length differs from the modulus length, one that is out
/// of range, and one whose padding does not check all fail with the same
/// [`Error::DecryptionFailed`].
#[inline]
pub(crate) fn decrypt<R: CryptoRngCore + ?Sized>(
    rng: Option<&mut R>,
    priv_key: &RsaPrivateKey,
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    key::check_public(priv_key)?;

    let k = priv_key.size();
    if ciphertext.len() != k {
        return Err(Error::DecryptionFailed);
    }

    let c = BigUint::from_bytes_be(ciphertext);
    let em = rsa_decrypt_and_check(priv_key, rng, &c).map_err(|_| Error::DecryptionFailed)?;
    let em = uint_to_zeroizing_be_pad(em, k).map_err(|_| Error::DecryptionFailed)?;

    pkcs1v15_encrypt_unpad(&em, k).map(Zeroizing::new)
}

/// Hashes `msg` with `D` and signs the digest with the `RSASSA-PKCS1-v1_5`
/// scheme.
///
/// If an `rng` is passed, it uses RSA blinding to avoid timing side-channel attacks.
#[inline]
pub(crate) fn sign<D, R>(rng: Option<&mut R>, priv_key: &RsaPrivateKey, msg: &[u8]) -> Result<Vec<u8>>
where
    D: Digest + AssociatedOid,
    R: CryptoRngCore + ?Sized,
{
    let prefix = pkcs1v15_generate_prefix::<D>();
    let hashed = D::digest(msg);

    let em = pkcs1v15_sign_pad(&prefix, &hashed, priv_key.size())?;
    let em = Zeroizing::new(BigUint::from_bytes_be(&em));

    let sig = rsa_decrypt_and_check(priv_key, rng, &em)?;
    uint_to_be_pad(sig, priv_key.size())
}

/// Verifies an `RSASSA-PKCS1-v1_5` signature over the `D` digest of `msg`.
///
/// Returns `Ok(false)` when the signature does not match, and
/// [`Error::InvalidSignature`] only when `sig` cannot be a signature under
/// this modulus at all.
#[inline]
pub(crate) fn verify<D>(pub_key: &RsaPublicKey, msg: &[u8], sig: &[u8]) -> Result<bool>
where
    D: Digest + AssociatedOid,
{
    let k = pub_key.size();
    let s = BigUint::from_bytes_be(sig);
    if sig.len() != k || &s >= pub_key.n() {
        return Err(Error::InvalidSignature);
    }

    let prefix = pkcs1v15_generate_prefix::<D>();
    let hashed = D::digest(msg);

    let em = uint_to_be_pad(rsa_encrypt(pub_key, &s), k)?;
    Ok(pkcs1v15_sign_unpad(&prefix, &hashed, &em, k))
}
