//! PKCS#1 and PKCS#8 encoding support.
//!
//! Note: PKCS#1 support is achieved through a blanket impl of the
//! `pkcs1` crate's traits for types which impl the `pkcs8` crate's traits.

use num_bigint::{BigUint, ToBigUint};
use pkcs8::{der::Encode, Document, EncodePrivateKey, EncodePublicKey, SecretDocument};
use spki::{AlgorithmIdentifierRef, SubjectPublicKeyInfoRef};
use zeroize::Zeroizing;

use crate::key::{PrivateKeyParts, PublicKeyParts, RsaPrivateKey, RsaPublicKey};

/// Verify that the `AlgorithmIdentifier` for a key is `rsaEncryption` with
/// NULL parameters.
pub(crate) fn verify_algorithm_id(algorithm: &AlgorithmIdentifierRef<'_>) -> spki::Result<()> {
    algorithm.assert_algorithm_oid(pkcs1::ALGORITHM_OID)?;

    if algorithm.parameters_any()? != pkcs8::der::asn1::Null.into() {
        return Err(spki::Error::KeyMalformed);
    }

    Ok(())
}

impl TryFrom<pkcs8::PrivateKeyInfo<'_>> for RsaPrivateKey {
    type Error = pkcs8::Error;

    fn try_from(private_key_info: pkcs8::PrivateKeyInfo<'_>) -> pkcs8::Result<Self> {
        verify_algorithm_id(&private_key_info.algorithm)?;

        let pkcs1_key = pkcs1::RsaPrivateKey::try_from(private_key_info.private_key)?;

        // Multi-prime RSA keys not currently supported
        if pkcs1_key.version() != pkcs1::Version::TwoPrime {
            return Err(pkcs1::Error::Version.into());
        }

        let n = BigUint::from_bytes_be(pkcs1_key.modulus.as_bytes());
        let e = BigUint::from_bytes_be(pkcs1_key.public_exponent.as_bytes());
        let d = BigUint::from_bytes_be(pkcs1_key.private_exponent.as_bytes());
        let prime1 = BigUint::from_bytes_be(pkcs1_key.prime1.as_bytes());
        let prime2 = BigUint::from_bytes_be(pkcs1_key.prime2.as_bytes());
        let primes = vec![prime1, prime2];

        // The stored CRT values are recomputed from the primes rather than
        // trusted.
        RsaPrivateKey::from_components(n, e, d, primes).map_err(|_| pkcs8::Error::KeyMalformed)
    }
}

impl TryFrom<SubjectPublicKeyInfoRef<'_>> for RsaPublicKey {
    type Error = spki::Error;

    fn try_from(spki: SubjectPublicKeyInfoRef<'_>) -> spki::Result<Self> {
        verify_algorithm_id(&spki.algorithm)?;

        let pkcs1_key = pkcs1::RsaPublicKey::try_from(
            spki.subject_public_key
                .as_bytes()
                .ok_or(spki::Error::KeyMalformed)?,
        )?;

        let n = BigUint::from_bytes_be(pkcs1_key.modulus.as_bytes());
        let e = BigUint::from_bytes_be(pkcs1_key.public_exponent.as_bytes());

        RsaPublicKey::new(n, e).map_err(|_| spki::Error::KeyMalformed)
    }
}

impl EncodePrivateKey for RsaPrivateKey {
    fn to_pkcs8_der(&self) -> pkcs8::Result<SecretDocument> {
        let precomputed = self.precomputed.as_ref().ok_or(pkcs1::Error::Crypto)?;

        let modulus = self.n().to_bytes_be();
        let public_exponent = self.e().to_bytes_be();
        let private_exponent = Zeroizing::new(self.d().to_bytes_be());
        let prime1 = Zeroizing::new(self.primes()[0].to_bytes_be());
        let prime2 = Zeroizing::new(self.primes()[1].to_bytes_be());
        let exponent1 = Zeroizing::new(precomputed.dp.to_bytes_be());
        let exponent2 = Zeroizing::new(precomputed.dq.to_bytes_be());
        let coefficient = Zeroizing::new(
            self.qinv()
                .and_then(|qinv| qinv.to_biguint())
                .ok_or(pkcs1::Error::Crypto)?
                .to_bytes_be(),
        );

        let private_key = Zeroizing::new(
            pkcs1::RsaPrivateKey {
                modulus: pkcs1::UintRef::new(&modulus)?,
                public_exponent: pkcs1::UintRef::new(&public_exponent)?,
                private_exponent: pkcs1::UintRef::new(&private_exponent)?,
                prime1: pkcs1::UintRef::new(&prime1)?,
                prime2: pkcs1::UintRef::new(&prime2)?,
                exponent1: pkcs1::UintRef::new(&exponent1)?,
                exponent2: pkcs1::UintRef::new(&exponent2)?,
                coefficient: pkcs1::UintRef::new(&coefficient)?,
                other_prime_infos: None,
            }
            .to_der()?,
        );

        pkcs8::PrivateKeyInfo::new(pkcs1::ALGORITHM_ID, &private_key).try_into()
    }
}

impl EncodePublicKey for RsaPublicKey {
    fn to_public_key_der(&self) -> spki::Result<Document> {
        let modulus = self.n().to_bytes_be();
        let public_exponent = self.e().to_bytes_be();

        let subject_public_key = pkcs1::RsaPublicKey {
            modulus: pkcs1::UintRef::new(&modulus)?,
            public_exponent: pkcs1::UintRef::new(&public_exponent)?,
        }
        .to_der()?;

        SubjectPublicKeyInfoRef {
            algorithm: pkcs1::ALGORITHM_ID,
            subject_public_key: pkcs8::der::asn1::BitStringRef::new(0, subject_public_key.as_ref())?,
        }
        .try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, LineEnding};
    use pkcs8::{DecodePrivateKey, DecodePublicKey};

    const RSA_512_PRIV_PEM: &str = include_str!("../tests/examples/pkcs1/rsa512-priv.pem");
    const RSA_512_PUB_PEM: &str = include_str!("../tests/examples/pkcs1/rsa512-pub.pem");
    const RSA_512_PKCS8_PEM: &str = include_str!("../tests/examples/pkcs8/rsa512-priv.pem");
    const RSA_512_SPKI_PEM: &str = include_str!("../tests/examples/spki/rsa512-pub.pem");
    const P256_PKCS8_PEM: &str = include_str!("../tests/examples/pkcs8/p256-priv.pem");
    const P256_SPKI_PEM: &str = include_str!("../tests/examples/spki/p256-pub.pem");

    #[test]
    fn test_decode_all_rsa_512_forms() {
        let key = RsaPrivateKey::from_pkcs1_pem(RSA_512_PRIV_PEM).unwrap();
        assert_eq!(key.n().bits(), 512);
        assert_eq!(
            key.n().to_bytes_be()[..8],
            hex!("a129bb6d510d35f1")
        );
        assert_eq!(key.e(), &BigUint::from(65537u32));

        let pkcs8_key = RsaPrivateKey::from_pkcs8_pem(RSA_512_PKCS8_PEM).unwrap();
        assert_eq!(pkcs8_key, key);

        let pub_key = RsaPublicKey::from_public_key_pem(RSA_512_SPKI_PEM).unwrap();
        assert_eq!(&pub_key, key.as_public_key());

        let pkcs1_pub_key = RsaPublicKey::from_pkcs1_pem(RSA_512_PUB_PEM).unwrap();
        assert_eq!(pkcs1_pub_key, pub_key);
    }

    #[test]
    fn test_encode_matches_fixtures() {
        let key = RsaPrivateKey::from_pkcs1_pem(RSA_512_PRIV_PEM).unwrap();

        let pem = key.to_pkcs1_pem(LineEnding::LF).unwrap();
        assert_eq!(pem.trim(), RSA_512_PRIV_PEM.trim());

        let pem = key.to_public_key().to_public_key_pem(LineEnding::LF).unwrap();
        assert_eq!(pem.trim(), RSA_512_SPKI_PEM.trim());
    }

    #[test]
    fn test_reject_non_rsa_keys() {
        assert!(RsaPrivateKey::from_pkcs8_pem(P256_PKCS8_PEM).is_err());
        assert!(RsaPublicKey::from_public_key_pem(P256_SPKI_PEM).is_err());
    }
}
