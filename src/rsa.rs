use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::Rng;

use crate::{
    algo, chain,
    claim::{self, Claim},
    error::{Error, Result},
    prime::gen,
};

pub const MIN_KEY_SIZE: u64 = 16;
pub const MAX_KEY_SIZE: u64 = 16384;
pub const DEFAULT_KEY_SIZE: u64 = 512;

/// Public exponents are drawn from [2^16, 2^17)
const EXP_BITS: u64 = 16;

/// Parameters of the key generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyConfig {
    /// Size of the modulus in bits, a multiple of 8
    pub bits: u64,
    /// Random Miller-Rabin rounds for both primes, `None` for the
    /// deterministic test
    pub confidence_rounds: Option<usize>,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            bits: DEFAULT_KEY_SIZE,
            confidence_rounds: Some(gen::DEFAULT_CONFIDENCE_ROUNDS),
        }
    }
}

/// Rsa key. Holds the private exponent only if it is known, otherwise the
/// key can only encode and verify.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    exponent: BigUint,
    modulus: BigUint,
    private_exponent: Option<BigUint>,
    // every block value is below the modulus
    block_size_bits: usize,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("exponent", &self.exponent)
            .field("modulus", &self.modulus)
            .field("private", &self.private_exponent.is_some())
            .finish()
    }
}

impl KeyPair {
    /// Builds the key from known parameters.
    ///
    /// The modulus has to be at least 2^8 so that a block holds one byte.
    pub fn new(
        exponent: BigUint,
        modulus: BigUint,
        private_exponent: Option<BigUint>,
    ) -> Result<Self> {
        let bits = modulus.bits();
        if bits <= 8 {
            return Err(Error::InvalidArgument(format!(
                "modulus {:#x} is too small",
                modulus
            )));
        }
        if exponent.is_zero() {
            return Err(Error::InvalidArgument("exponent is zero".to_string()));
        }
        // largest multiple of 8 below the bit length
        let block_size_bits = ((bits - 1) / 8 * 8) as usize;
        Ok(Self {
            exponent,
            modulus,
            private_exponent,
            block_size_bits,
        })
    }

    /// Public only key
    pub fn public(exponent: BigUint, modulus: BigUint) -> Result<Self> {
        Self::new(exponent, modulus, None)
    }

    /// Generates a key with the thread rng
    pub fn generate(bits: u64, confidence_rounds: Option<usize>) -> Result<Self> {
        Self::random(&mut rand::thread_rng(), bits, confidence_rounds)
    }

    /// Generates a key as described by the config
    pub fn from_config<R: Rng + ?Sized>(rng: &mut R, config: &KeyConfig) -> Result<Self> {
        Self::random(rng, config.bits, config.confidence_rounds)
    }

    /// Generates a key with a modulus of `bits - 1` or `bits` bits
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        bits: u64,
        confidence_rounds: Option<usize>,
    ) -> Result<Self> {
        if bits % 8 != 0 {
            return Err(Error::InvalidArgument(format!(
                "key size {} is not a multiple of 8",
                bits
            )));
        }
        if !(MIN_KEY_SIZE..=MAX_KEY_SIZE).contains(&bits) {
            return Err(Error::InvalidArgument(format!(
                "key size {} is out of [{}, {}]",
                bits, MIN_KEY_SIZE, MAX_KEY_SIZE
            )));
        }

        let (p, q) = prime_pair(rng, bits / 2, confidence_rounds)?;
        let key = Self::from_primes(rng, &p, &q)?;
        log::debug!("generated a key with a {}-bit modulus", key.modulus.bits());
        Ok(key)
    }

    /// Derives the key from two distinct primes with a random public exponent
    #[allow(clippy::many_single_char_names)]
    fn from_primes<R: Rng + ?Sized>(rng: &mut R, p: &BigUint, q: &BigUint) -> Result<Self> {
        let modulus = p * q;
        let period = period(p, q);

        let mut exponent = period.clone();
        while !algo::gcd(&exponent, &period).is_one() {
            exponent = gen::random_bits(rng, EXP_BITS) + (BigUint::one() << EXP_BITS);
        }
        let (private_exponent, _) = algo::solve_congruence(&exponent, &period, &BigUint::one())
            .map_err(|e| {
                log::error!("exponent {:#x} is coprime with the period but has no inverse", exponent);
                e
            })?;

        Self::new(exponent, modulus, Some(private_exponent))
    }

    /// Recovering the private key would need the factorisation of the
    /// modulus, which is not supported.
    pub fn recover_private_key(&self) -> Result<BigUint> {
        match self.private_exponent {
            Some(_) => Err(Error::NotImplemented(
                "recovering the prime factors from the private exponent",
            )),
            None => Err(Error::NotImplemented("factorisation of the modulus")),
        }
    }

    /// $n^e \mod modulus$
    pub fn encode_block(&self, num: &BigUint) -> BigUint {
        algo::mod_pow(num, &self.exponent, &self.modulus)
    }

    /// $n^d \mod modulus$
    pub fn decode_block(&self, num: &BigUint) -> Result<BigUint> {
        let d = self
            .private_exponent
            .as_ref()
            .ok_or(Error::MissingPrivateKey)?;
        Ok(algo::mod_pow(num, d, &self.modulus))
    }

    /// Encrypts a message of any length, see [`chain::encrypt`]
    pub fn encrypt(&self, msg: &[u8]) -> Result<Vec<u8>> {
        chain::encrypt(self, msg)
    }

    /// Decrypts what [`KeyPair::encrypt`] produced
    pub fn decrypt(&self, msg: &[u8]) -> Result<Vec<u8>> {
        chain::decrypt(self, msg)
    }

    /// Signs the message. Requires the private key
    pub fn sign(&self, msg: &[u8]) -> Result<Claim> {
        claim::sign(self, msg)
    }

    /// Checks the claim against this key, whatever key the claim carries
    pub fn verify(&self, claim: &Claim) -> bool {
        claim::verify_with(self, claim)
    }

    /// The same key without the private part
    pub fn to_public(&self) -> Self {
        Self {
            private_exponent: None,
            ..self.clone()
        }
    }

    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn private_exponent(&self) -> Option<&BigUint> {
        self.private_exponent.as_ref()
    }

    pub fn has_private_key(&self) -> bool {
        self.private_exponent.is_some()
    }

    pub fn block_size_bits(&self) -> usize {
        self.block_size_bits
    }

    pub fn block_size_bytes(&self) -> usize {
        self.block_size_bits / 8
    }
}

/// Two distinct random primes of `size` bits
fn prime_pair<R: Rng + ?Sized>(
    rng: &mut R,
    size: u64,
    confidence_rounds: Option<usize>,
) -> Result<(BigUint, BigUint)> {
    let p = gen::random_prime(rng, size, confidence_rounds)?;
    loop {
        let q = gen::random_prime(rng, size, confidence_rounds)?;
        if q != p {
            return Ok((p, q));
        }
    }
}

/// (p-1)(q-1)gcd(p-1, q-1). A multiple of the group exponent, so that
/// anything^(1 + period) == anything (mod p*q)
#[allow(clippy::many_single_char_names)]
fn period(p: &BigUint, q: &BigUint) -> BigUint {
    let (p1, q1) = (p - 1u32, q - 1u32);
    let g = algo::gcd(&p1, &q1);
    p1 * q1 * g
}

#[cfg(test)]
mod tests {
    use num_bigint::RandBigInt;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn rsa_enc_dec() {
        let mut rng = StdRng::seed_from_u64(1);
        let key = KeyPair::random(&mut rng, 512, Some(20)).unwrap();
        for _ in 0..10 {
            let data = rng.gen_biguint_below(key.modulus());
            let ciphertext = key.encode_block(&data);
            let plaintext = key.decode_block(&ciphertext).unwrap();
            assert_eq!(plaintext, data);
        }
    }

    #[test]
    fn generated_key_properties() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..3 {
            // the key is built from the first two primes the rng yields
            let (p, q) = prime_pair(&mut rng.clone(), 256, Some(20)).unwrap();
            let key = KeyPair::random(&mut rng, 512, Some(20)).unwrap();
            assert_eq!(key.modulus(), &(&p * &q));
            assert!(algo::gcd(key.exponent(), &period(&p, &q)).is_one());
            assert!([511, 512, 513].contains(&key.modulus().bits()));
            assert_eq!(key.block_size_bits() % 8, 0);
            assert!(BigUint::one() << key.block_size_bits() < *key.modulus());
            assert!(key.exponent().bits() == EXP_BITS + 1);
        }
    }

    #[test]
    fn exponent_is_coprime_with_period() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = gen::random_prime(&mut rng, 256, Some(20)).unwrap();
        let q = gen::random_prime(&mut rng, 256, Some(20)).unwrap();
        let key = KeyPair::from_primes(&mut rng, &p, &q).unwrap();
        let period = period(&p, &q);

        assert_eq!(key.modulus(), &(&p * &q));
        assert!(algo::gcd(key.exponent(), &period).is_one());
        let d = key.private_exponent().unwrap();
        assert!((key.exponent() * d % &period).is_one());
    }

    #[test]
    fn small_keys() {
        let mut rng = StdRng::seed_from_u64(4);
        for bits in [MIN_KEY_SIZE, 24, 32, 64] {
            let key = KeyPair::random(&mut rng, bits, None).unwrap();
            assert!(key.block_size_bits() >= 8);
            let data = BigUint::from(200u8);
            assert_eq!(key.decode_block(&key.encode_block(&data)).unwrap(), data);
        }
    }

    #[test]
    fn invalid_sizes() {
        let mut rng = StdRng::seed_from_u64(5);
        for bits in [0, 8, 12, 100, MAX_KEY_SIZE + 8] {
            assert!(matches!(
                KeyPair::random(&mut rng, bits, Some(2)),
                Err(Error::InvalidArgument(_))
            ));
        }
        assert!(matches!(
            KeyPair::public(BigUint::from(3u8), BigUint::from(255u8)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            KeyPair::public(BigUint::zero(), BigUint::from(1000u32)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn block_size() {
        let key = KeyPair::public(BigUint::from(3u8), BigUint::from(256u32)).unwrap();
        assert_eq!(key.block_size_bits(), 8);
        let key = KeyPair::public(BigUint::from(3u8), BigUint::one() << 511).unwrap();
        assert_eq!(key.block_size_bits(), 504);
        let key = KeyPair::public(BigUint::from(3u8), BigUint::one() << 512).unwrap();
        assert_eq!(key.block_size_bits(), 512);
        assert_eq!(key.block_size_bytes(), 64);
    }

    #[test]
    fn public_key_cannot_decode() {
        let mut rng = StdRng::seed_from_u64(6);
        let key = KeyPair::random(&mut rng, 128, Some(20)).unwrap().to_public();
        assert!(!key.has_private_key());
        assert_eq!(
            key.decode_block(&BigUint::from(5u8)),
            Err(Error::MissingPrivateKey)
        );
    }

    #[test]
    fn no_factorisation() {
        let mut rng = StdRng::seed_from_u64(7);
        let key = KeyPair::random(&mut rng, 128, Some(20)).unwrap();
        assert!(matches!(
            key.recover_private_key(),
            Err(Error::NotImplemented(_))
        ));
        assert!(matches!(
            key.to_public().recover_private_key(),
            Err(Error::NotImplemented(_))
        ));
    }

    #[test]
    fn config() {
        let config = KeyConfig::default();
        assert_eq!(config.bits, DEFAULT_KEY_SIZE);

        let mut rng = StdRng::seed_from_u64(8);
        let config = KeyConfig {
            bits: 64,
            confidence_rounds: Some(10),
        };
        let key = KeyPair::from_config(&mut rng, &config).unwrap();
        assert!(key.modulus().bits() >= 63);
    }
}
