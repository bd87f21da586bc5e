use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::Rng;

use super::ver;
use crate::error::{Error, Result};

/// Width of the random chunks random numbers are assembled from
pub const CHUNK_BITS: u64 = 16;

/// Random rounds used to throw away most composites before the real test
pub const CHEAP_ROUNDS: usize = 2;

/// Random rounds of the final acceptance test used by [`new_prime`]
pub const DEFAULT_CONFIDENCE_ROUNDS: usize = 121;

/// Uniformly random number below `2^bits`, built from [`CHUNK_BITS`]-wide
/// chunks, most significant first.
pub fn random_bits<R: Rng + ?Sized>(rng: &mut R, bits: u64) -> BigUint {
    let mut res = BigUint::zero();
    let mut remaining = bits;
    while remaining > 0 {
        let chunk: u32 = rng.gen_range(0..1 << CHUNK_BITS);
        let width = remaining.min(CHUNK_BITS);
        // the last chunk may be partial
        let chunk = chunk % (1 << width);
        res = (res << width) + chunk;
        remaining -= width;
    }
    res
}

/// Generates a random prime of exactly `bits` bits.
///
/// A candidate has to survive trial division, a cheap Miller-Rabin test with
/// [`CHEAP_ROUNDS`] rounds and finally the Miller-Rabin test with
/// `confidence_rounds` rounds (`None` means the deterministic test).
pub fn random_prime<R: Rng + ?Sized>(
    rng: &mut R,
    bits: u64,
    confidence_rounds: Option<usize>,
) -> Result<BigUint> {
    if bits < 2 {
        return Err(Error::InvalidArgument(format!(
            "no primes with {} bits",
            bits
        )));
    }
    let min = BigUint::one() << (bits - 1);

    let mut tried = 0u64;
    loop {
        tried += 1;
        let candidate = random_bits(rng, bits - 1) + &min;
        if ver::is_divisible_by_small_prime(&candidate) {
            continue;
        }
        if !ver::is_probable_prime(&candidate, Some(CHEAP_ROUNDS), rng) {
            continue;
        }
        if ver::is_probable_prime(&candidate, confidence_rounds, rng) {
            log::debug!("found a {}-bit prime after {} candidates", bits, tried);
            return Ok(candidate);
        }
        log::trace!("candidate passed the cheap test only");
    }
}

/// Generates a random prime of `bits` bits with the thread rng and
/// [`DEFAULT_CONFIDENCE_ROUNDS`]
pub fn new_prime(bits: u64) -> Result<BigUint> {
    random_prime(
        &mut rand::thread_rng(),
        bits,
        Some(DEFAULT_CONFIDENCE_ROUNDS),
    )
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn random_bits_range() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(random_bits(&mut rng, 0).is_zero());
        for bits in [1, 7, 15, 16, 17, 31, 32, 33, 100, 512] {
            let bound = BigUint::one() << bits;
            for _ in 0..50 {
                assert!(random_bits(&mut rng, bits) < bound);
            }
        }
    }

    #[test]
    fn random_bits_uses_the_top_bits() {
        // with 64 draws the top bit of a 17 bit number is set at least once
        let mut rng = StdRng::seed_from_u64(6);
        let half = BigUint::one() << 16;
        assert!((0..64).any(|_| random_bits(&mut rng, 17) >= half));
    }

    #[test]
    fn random_prime_test() {
        let mut rng = StdRng::seed_from_u64(8);
        for bits in [2, 3, 8, 17, 64, 128] {
            let p = random_prime(&mut rng, bits, Some(20)).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(ver::is_probable_prime(&p, Some(40), &mut rng));
        }
        let p = random_prime(&mut rng, 24, None).unwrap();
        assert_eq!(p.bits(), 24);
        assert!(ver::is_prime(&p));
    }

    #[test]
    fn random_prime_too_small() {
        let mut rng = StdRng::seed_from_u64(9);
        assert!(matches!(
            random_prime(&mut rng, 1, None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn new_prime_test() {
        let p = new_prime(96).unwrap();
        assert_eq!(p.bits(), 96);
    }
}
