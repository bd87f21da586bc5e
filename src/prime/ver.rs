use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rng;

use crate::{algo, sieve};

/// All primes below this bound are used for trial division. There are
/// exactly 10000 of them.
pub const SMALL_PRIME_LIMIT: u64 = 104_730;

lazy_static! {
    static ref SMALL_PRIMES: Vec<u64> = sieve::primes_below(SMALL_PRIME_LIMIT);
}

/// Deterministic Miller-Rabin: every base below `min(x, 2*ceil(log2(x))^2 + 1)`
/// is tried.
pub fn is_prime(x: &BigUint) -> bool {
    match MillerRabin::new(x) {
        Ok(test) => (2..test.bound).all(|a| test.passes(a)),
        Err(decided) => decided,
    }
}

/// Miller-Rabin test.
///
/// With `rounds == None` the test is deterministic (see [`is_prime`]).
/// Otherwise only `rounds` random bases are tried, which is much faster but
/// may report a composite as prime.
pub fn is_probable_prime<R: Rng + ?Sized>(x: &BigUint, rounds: Option<usize>, rng: &mut R) -> bool {
    let rounds = match rounds {
        Some(rounds) => rounds,
        None => return is_prime(x),
    };
    match MillerRabin::new(x) {
        Ok(test) => (0..rounds).all(|_| test.passes(rng.gen_range(2..test.bound))),
        Err(decided) => decided,
    }
}

/// Cheap pre-filter: trial division by the first 10000 primes.
///
/// Returns `true` if `x` is certainly not a prime, that is `x < 2` or `x`
/// is a proper multiple of one of the small primes. `false` means that `x`
/// may be a prime.
pub fn is_divisible_by_small_prime(x: &BigUint) -> bool {
    if let Some(small) = x.to_u64() {
        if small < 2 {
            return true;
        }
        if SMALL_PRIMES.binary_search(&small).is_ok() {
            return false;
        }
    }
    SMALL_PRIMES.iter().any(|&p| (x % p).is_zero())
}

struct MillerRabin<'a> {
    x: &'a BigUint,
    x_minus_one: BigUint,
    // x - 1 = d * 2^s
    s: u64,
    d: BigUint,
    // bases are taken from [2, bound)
    bound: u64,
}

impl<'a> MillerRabin<'a> {
    /// Sets up the test for an odd `x > 2`. Any other input is decided
    /// right away and returned as an error.
    fn new(x: &'a BigUint) -> Result<Self, bool> {
        if x < &BigUint::from(2u8) {
            return Err(false);
        }
        if x == &BigUint::from(2u8) {
            return Err(true);
        }
        let x_minus_one = x - 1u32;
        let (s, d) = algo::decompose_odd(&x_minus_one);
        if s == 0 {
            return Err(false);
        }

        // ceil(log2(x)) for x > 2
        let log2x = x_minus_one.bits();
        let limit = 2 * log2x * log2x + 1;
        let bound = x.to_u64().map_or(limit, |x| x.min(limit));

        Ok(Self {
            x,
            x_minus_one,
            s,
            d,
            bound,
        })
    }

    /// Returns false if `a` witnesses that x is composite
    fn passes(&self, a: u64) -> bool {
        let mut y = algo::mod_pow(&BigUint::from(a), &self.d, self.x);
        if y.is_one() {
            return true;
        }
        for _ in 0..self.s {
            if y == self.x_minus_one {
                return true;
            }
            y = &y * &y % self.x;
        }
        false
    }
}
