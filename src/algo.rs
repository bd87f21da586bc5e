use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use sha2::Digest;

use crate::{
    error::{Error, Result},
    sieve,
};

/// Greatest common divisor. `gcd(0, n) == n`
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let (mut a, mut b) = if b < a {
        (b.clone(), a.clone())
    } else {
        (a.clone(), b.clone())
    };
    while !a.is_zero() {
        let r = &b % &a;
        b = a;
        a = r;
    }
    b
}

/// Computes `base^exponent (mod modulus)` by repeated squaring.
///
/// Bases below 2 are returned as they are.
///
/// # Panic
///
/// Panics if `modulus` is zero.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    assert!(!modulus.is_zero(), "modulus must be positive");
    if modulus.is_one() {
        return BigUint::zero();
    }
    if base < &BigUint::from(2u8) {
        return base.clone();
    }

    let mut result = BigUint::one();
    let mut square = base % modulus;
    let mut exponent = exponent.clone();
    while !exponent.is_zero() {
        if exponent.is_odd() {
            result = result * &square % modulus;
        }
        exponent >>= 1;
        if !exponent.is_zero() {
            square = &square * &square % modulus;
        }
    }
    result
}

/// Returns `(s, d)` such that `x = d * 2^s` and `d` is odd. Zero gives `(0, 0)`
pub fn decompose_odd(x: &BigUint) -> (u64, BigUint) {
    match x.trailing_zeros() {
        Some(s) => (s, x >> s),
        None => (0, BigUint::zero()),
    }
}

/// Finds the smallest non-negative `(b, x)` such that `a*b = rem + x*n`.
///
/// When `rem` is zero the answer is the first non-trivial one, `(n/g, a/g)`
/// with `g = gcd(a, n)`.
#[allow(clippy::many_single_char_names)]
pub fn solve_congruence(a: &BigUint, n: &BigUint, rem: &BigUint) -> Result<(BigUint, BigUint)> {
    if a.is_zero() || n.is_zero() {
        return Err(Error::InvalidArgument(
            "congruence needs positive a and n".to_string(),
        ));
    }
    let g = gcd(a, n);
    if rem.is_zero() {
        return Ok((n / &g, a / &g));
    }
    if !(rem % &g).is_zero() {
        return Err(Error::NoSolution);
    }

    // every solution b is congruent modulo n/g
    let period = n / &g;
    let inverse = if period.is_one() {
        BigUint::zero()
    } else {
        let (inverse, _) = sub_inverse(&((a / &g) % &period), &period)?;
        inverse
    };
    let mut b = (rem / &g) * inverse % &period;

    // x must not go negative
    let reached = a * &b;
    if &reached < rem {
        let step = a * &period;
        b += (rem - reached).div_ceil(&step) * &period;
    }
    let x = (a * &b - rem) / n;
    Ok((b, x))
}

/// Returns `(b, x)` such that `a*b = 1 + x*n`.
///
/// Fails with [`Error::NoSolution`] if `a` and `n` are not coprime.
#[allow(clippy::many_single_char_names)]
pub fn sub_inverse(a: &BigUint, n: &BigUint) -> Result<(BigUint, BigUint)> {
    if n.is_zero() {
        return Err(Error::InvalidArgument("modulus must be positive".to_string()));
    }
    if n.is_one() {
        if a.is_zero() {
            return Err(Error::NoSolution);
        }
        return Ok((BigUint::one(), a - 1u32));
    }
    let reduced = a % n;
    if !gcd(&reduced, n).is_one() {
        return Err(Error::NoSolution);
    }
    let (b, _) = descend(&reduced, n);
    let x = (a * &b - 1u32) / n;
    Ok((b, x))
}

/// Euclidean descent behind [`sub_inverse`]. Expects `0 < a < n` and
/// `gcd(a, n) = 1`.
///
/// Writing `n = a*(div - 1) + r` gives `a*div = n + off` with `off = a - r`,
/// so an inverse of either `off` or `r` modulo `a` lifts to an inverse of
/// `a` modulo `n`. The smaller of the two is taken, which at least halves
/// the working modulus on every step.
#[allow(clippy::many_single_char_names)]
fn descend(a: &BigUint, n: &BigUint) -> (BigUint, BigUint) {
    if a.is_one() {
        return (BigUint::one(), BigUint::zero());
    }
    let (quot, r) = n.div_rem(a);
    let div = BigInt::from(quot + 1u32);
    let off = a - &r;
    let period = BigInt::from(a * n);

    let b = if off <= (a >> 1) {
        // off*pb = 1 + px*a
        let (pb, px) = descend(&off, a);
        (BigInt::from(pb) * &div - BigInt::from(px)).mod_floor(&period)
    } else {
        // r*pb = 1 + px*a
        let (pb, px) = descend(&r, a);
        let pb = BigInt::from(pb);
        (&pb - &pb * &div - BigInt::from(px)).mod_floor(&period)
    };
    let b = b
        .to_biguint()
        .expect("after mod floor is always non-negative");
    let x = (a * &b - 1u32) / n;
    (b, x)
}

/// Checks if `n` can be written as `a^b` with `a, b >= 2`.
///
/// Only prime `b` are tried, as any perfect power is also a prime power of
/// something.
pub fn perfect_power(n: &BigUint) -> Option<(BigUint, u32)> {
    if n < &BigUint::from(4u8) {
        return None;
    }
    let bits = n.bits();
    for b in sieve::primes_below(bits) {
        // 2^((bits-1)/b) <= a < 2^ceil(bits/b)
        let mut low = BigUint::one() << ((bits - 1) / b);
        let mut high = (BigUint::one() << ((bits + b - 1) / b)) + 1u32;
        let b = b as u32;
        while low < high {
            let a: BigUint = (&low + &high) >> 1;
            match a.pow(b).cmp(n) {
                std::cmp::Ordering::Equal => return Some((a, b)),
                std::cmp::Ordering::Less => low = a + 1u32,
                std::cmp::Ordering::Greater => high = a,
            }
        }
    }
    None
}

/// Hashes the concatenation of `parts` and reads the digest as a big-endian
/// number
pub fn hash_to_int<D: Digest>(parts: &[&[u8]]) -> BigUint {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    BigUint::from_bytes_be(&hasher.finalize())
}
