//! Generate prime components for the RSA Private Key

use num_bigint::{BigUint, IntoBigUint, ModInverse, RandPrime};
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;

use crate::errors::{Error, GenerationError, Result};

pub(crate) struct RsaPrivateKeyComponents {
    pub(crate) n: BigUint,
    pub(crate) e: BigUint,
    pub(crate) d: BigUint,
    pub(crate) primes: Vec<BigUint>,
}

/// Generates a two-prime RSA keypair of the given bit size, public exponent,
/// and the given random source.
///
/// Both primes are drawn with their top two bits set, so their product has
/// exactly `bit_size` bits in the common case; candidates that miss are
/// discarded, as are pairs for which `exp` has no inverse modulo the totient.
pub(crate) fn generate_key_with_exp<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
    exp: &BigUint,
) -> Result<RsaPrivateKeyComponents> {
    const NPRIMES: usize = 2;

    if bit_size < 64 {
        let prime_limit = (1u64 << (bit_size / NPRIMES) as u64) as f64;

        // pi approximates the number of primes less than prime_limit
        let mut pi = prime_limit / (prime_limit.ln() - 1f64);
        // Generated primes start with 0b11, so we can only use a quarter of them.
        pi /= 4f64;
        // Use a factor of two to ensure that key generation terminates in a
        // reasonable amount of time.
        pi /= 2f64;

        if pi < NPRIMES as f64 {
            return Err(Error::KeyGeneration(GenerationError::TooFewPrimes));
        }
    }

    let mut primes = vec![BigUint::zero(); NPRIMES];
    let n_final: BigUint;
    let d_final: BigUint;

    'next: loop {
        let mut todo = bit_size;
        for (i, prime) in primes.iter_mut().enumerate() {
            *prime = rng.gen_prime(todo / (NPRIMES - i));
            todo -= prime.bits();
        }

        if primes[0] == primes[1] {
            continue 'next;
        }

        let mut n = BigUint::one();
        let mut totient = BigUint::one();

        for prime in &primes {
            n *= prime;
            totient *= prime - BigUint::one();
        }

        if n.bits() != bit_size {
            // This should never happen because gen_prime sets the top two
            // bits in each prime.
            continue 'next;
        }

        if let Some(d) = exp.clone().mod_inverse(&totient) {
            if let Some(d) = d.into_biguint() {
                n_final = n;
                d_final = d;
                break;
            }
        }
    }

    Ok(RsaPrivateKeyComponents {
        n: n_final,
        e: exp.clone(),
        d: d_final,
        primes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    const EXP: u64 = 65537;

    #[test]
    fn test_impossible_keys() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let exp = BigUint::from_u64(EXP).unwrap();
        for i in 0..12 {
            assert_eq!(
                generate_key_with_exp(&mut rng, i, &exp).err(),
                Some(Error::KeyGeneration(GenerationError::TooFewPrimes)),
                "bit size {}",
                i
            );
        }
    }

    macro_rules! key_generation {
        ($name:ident, $size:expr) => {
            #[test]
            fn $name() {
                let mut rng = ChaCha8Rng::from_seed([42; 32]);
                let exp = BigUint::from_u64(EXP).unwrap();
                for _ in 0..5 {
                    let components = generate_key_with_exp(&mut rng, $size, &exp).unwrap();
                    assert_eq!(components.n.bits(), $size);
                    assert_eq!(components.primes.len(), 2);
                    assert_eq!(&components.primes[0] * &components.primes[1], components.n);
                    assert_eq!(components.e, exp);
                }
            }
        };
    }

    key_generation!(key_generation_128, 128);
    key_generation!(key_generation_512, 512);
    key_generation!(key_generation_1024, 1024);
}
