//! Generic RSA implementation

use std::borrow::Cow;

use num_bigint::{BigInt, BigUint, IntoBigUint, ModInverse, RandBigInt, Sign};
use num_traits::{One, Signed, Zero};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::errors::{Error, Result};
use crate::key::{PrivateKeyParts, PublicKeyParts, RsaPrivateKey};

/// Raw RSA encryption of m with the public key. No padding is performed.
#[inline]
pub(crate) fn rsa_encrypt<K: PublicKeyParts>(key: &K, m: &BigUint) -> BigUint {
    m.modpow(key.e(), key.n())
}

/// Performs raw RSA decryption with no padding, resulting in a plaintext `BigUint`.
/// Performs RSA blinding if an `Rng` is passed.
#[inline]
pub(crate) fn rsa_decrypt<R: CryptoRngCore + ?Sized>(
    rng: Option<&mut R>,
    priv_key: &RsaPrivateKey,
    c: &BigUint,
) -> Result<BigUint> {
    if c >= priv_key.n() {
        return Err(Error::DecryptionFailed);
    }

    if priv_key.n().is_zero() {
        return Err(Error::DecryptionFailed);
    }

    let mut ir = None;

    let c = if let Some(rng) = rng {
        let (blinded, unblinder) = blind(rng, priv_key, c);
        ir = Some(unblinder);
        Cow::Owned(blinded)
    } else {
        Cow::Borrowed(c)
    };

    let m = match priv_key.precomputed {
        Some(ref precomputed) => {
            // We have the precalculated values needed for the CRT.
            let p = &priv_key.primes()[0];
            let q = &priv_key.primes()[1];

            let mut m = BigInt::from_biguint(Sign::Plus, c.modpow(&precomputed.dp, p));
            let mut m2 = BigInt::from_biguint(Sign::Plus, c.modpow(&precomputed.dq, q));

            m -= &m2;

            let mut p = BigInt::from_biguint(Sign::Plus, p.clone());
            let mut q = BigInt::from_biguint(Sign::Plus, q.clone());

            while m.is_negative() {
                m += &p;
            }
            m *= &precomputed.qinv;
            m %= &p;
            m *= &q;
            m += &m2;

            // clear tmp values
            p.zeroize();
            q.zeroize();
            m2.zeroize();

            m.into_biguint().ok_or(Error::Internal)?
        }
        None => c.modpow(priv_key.d(), priv_key.n()),
    };

    match ir {
        Some(ref ir) => {
            // unblind
            Ok(unblind(priv_key, &m, ir))
        }
        None => Ok(m),
    }
}

/// Performs RSA decryption, resulting in a plaintext `BigUint`.
/// Performs RSA blinding if an `Rng` is passed.
/// This will also check for errors in the CRT computation.
#[inline]
pub(crate) fn rsa_decrypt_and_check<R: CryptoRngCore + ?Sized>(
    priv_key: &RsaPrivateKey,
    rng: Option<&mut R>,
    c: &BigUint,
) -> Result<BigUint> {
    let m = rsa_decrypt(rng, priv_key, c)?;

    // In order to defend against errors in the CRT computation, m^e is
    // calculated, which should match the original ciphertext.
    let check = rsa_encrypt(priv_key, &m);

    if c != &check {
        return Err(Error::Internal);
    }

    Ok(m)
}

/// Returns the blinded c, along with the unblinding factor.
fn blind<R: CryptoRngCore + ?Sized, K: PublicKeyParts>(
    rng: &mut R,
    key: &K,
    c: &BigUint,
) -> (BigUint, BigUint) {
    // Blinding involves multiplying c by r^e.
    // Then the decryption operation performs (m^e * r^e)^d mod n
    // which equals mr mod n. The factor of r can then be removed
    // by multiplying by the multiplicative inverse of r.

    let mut r: BigUint;
    let unblinder;
    loop {
        r = rng.gen_biguint_below(key.n());
        if r.is_zero() {
            r = BigUint::one();
        }
        if let Some(ir) = r.clone().mod_inverse(key.n()) {
            if let Some(ub) = ir.into_biguint() {
                unblinder = ub;
                break;
            }
        }
    }

    let c = {
        let mut rpowe = r.modpow(key.e(), key.n()); // N != 0
        let mut c = c * &rpowe;
        c %= key.n();

        rpowe.zeroize();

        c
    };

    r.zeroize();

    (c, unblinder)
}

/// Given an m and and unblinding factor, unblind the m.
fn unblind(key: &impl PublicKeyParts, m: &BigUint, unblinder: &BigUint) -> BigUint {
    (m * unblinder) % key.n()
}
