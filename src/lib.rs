/// Module dedicated to the modular arithmetic: gcd, modular exponentiation
/// and the linear congruence solver
pub mod algo;

/// Module dedicated to the hash-chained block mode, which turns single block
/// RSA into a cipher for messages of any length
pub mod chain;

/// Module dedicated to signed claims and their text form
pub mod claim;

mod error;
pub use error::{Error, Result};

/// Module dedicated to the length-prefixed block padding
pub mod padding;

/// Module dedicated to the prime number generation and verification
pub mod prime;

/// Module dedicated to the rsa key pair
pub mod rsa;

/// Module dedicated to the sieve of small primes
pub mod sieve;
