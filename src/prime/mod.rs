/// Miller-Rabin primality test and the trial division pre-filter
pub mod ver;

/// Random numbers and random primes of a requested size
pub mod gen;
