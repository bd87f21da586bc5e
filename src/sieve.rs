/// Returns every prime below `n`.
///
/// Only odd numbers are sieved: the entry at index `i` stands for `3 + 2i`.
pub fn primes_below(n: u64) -> Vec<u64> {
    if n <= 2 {
        return Vec::new();
    }
    let len = (n / 2 - 1) as usize;
    let mut candidates = vec![true; len];

    let mut i = 0;
    loop {
        let value = 3 + 2 * i as u64;
        if value * value >= n {
            break;
        }
        if candidates[i] {
            let first = ((value * value - 3) / 2) as usize;
            for composite in candidates.iter_mut().skip(first).step_by(value as usize) {
                *composite = false;
            }
        }
        i += 1;
    }

    std::iter::once(2)
        .chain(
            candidates
                .iter()
                .enumerate()
                .filter(|(_, is_prime)| **is_prime)
                .map(|(i, _)| 3 + 2 * i as u64),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_bounds() {
        assert!(primes_below(0).is_empty());
        assert!(primes_below(2).is_empty());
        assert_eq!(primes_below(3), vec![2]);
        assert_eq!(primes_below(4), vec![2, 3]);
        assert_eq!(primes_below(11), vec![2, 3, 5, 7]);
        assert_eq!(primes_below(12), vec![2, 3, 5, 7, 11]);
    }

    #[test]
    fn prime_counts() {
        assert_eq!(primes_below(100).len(), 25);
        assert_eq!(primes_below(10_000).len(), 1229);
        assert_eq!(primes_below(104_730).len(), 10_000);
        assert_eq!(primes_below(104_730).last(), Some(&104_729));
    }

    #[test]
    fn squares_are_excluded() {
        let primes = primes_below(1000);
        for p in [9, 25, 49, 121, 169, 289, 361, 529, 841, 961] {
            assert!(!primes.contains(&p), "{} is a square", p);
        }
    }
}
