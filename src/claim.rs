//! Claim
//! A claim is a message bound to a signature and to the public key that can
//! verify it, so anyone holding the claim can check it on its own.
//!
//! The signature is the sha256 hash of the message reduced modulo the
//! modulus and decoded with the private exponent.
//!
//! # Text form
//! `hex(message);hex(exponent);hex(modulus);hex(signature)` in lowercase
//! hex, numbers without leading zeros. Parsing accepts nothing else. A
//! claim with the modulus `0` is unsigned.
//!
//! # Usage
//! ```
//! use rsa_chain::{claim::Claim, rsa::KeyPair};
//!
//! let key = KeyPair::generate(128, Some(20)).unwrap();
//! let claim = key.sign(b"Piter is the best!").unwrap();
//! assert!(claim.verify());
//!
//! let recovered: Claim = claim.to_string().parse().unwrap();
//! assert!(recovered.verify());
//! ```
use std::{fmt, str::FromStr};

use num_bigint::BigUint;
use num_traits::Zero;
use sha2::Sha256;

use crate::{
    algo,
    error::{Error, Result},
    rsa::KeyPair,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    message: Vec<u8>,
    exponent: BigUint,
    modulus: BigUint,
    signature: BigUint,
}

impl Claim {
    /// Unsigned claim
    pub fn new(message: impl Into<Vec<u8>>) -> Self {
        Self {
            message: message.into(),
            exponent: BigUint::zero(),
            modulus: BigUint::zero(),
            signature: BigUint::zero(),
        }
    }

    /// Builds a claim from its parts as they are. Whether it is valid is
    /// up to [`Claim::verify`].
    pub fn from_parts(
        message: impl Into<Vec<u8>>,
        exponent: BigUint,
        modulus: BigUint,
        signature: BigUint,
    ) -> Self {
        Self {
            message: message.into(),
            exponent,
            modulus,
            signature,
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.modulus.is_zero()
    }

    /// Checks the signature with the key the claim carries
    pub fn verify(&self) -> bool {
        if self.modulus.is_zero() || self.exponent.is_zero() || self.signature.is_zero() {
            return false;
        }
        match KeyPair::public(self.exponent.clone(), self.modulus.clone()) {
            Ok(key) => verify_with(&key, self),
            Err(_) => false,
        }
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn exponent(&self) -> &BigUint {
        &self.exponent
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn signature(&self) -> &BigUint {
        &self.signature
    }
}

/// Signs the message with the private key
pub fn sign(key: &KeyPair, msg: &[u8]) -> Result<Claim> {
    let hash = hash_from_msg(msg) % key.modulus();
    let signature = key.decode_block(&hash)?;
    Ok(Claim {
        message: msg.to_vec(),
        exponent: key.exponent().clone(),
        modulus: key.modulus().clone(),
        signature,
    })
}

/// Checks the signature of the claim with `key`
pub fn verify_with(key: &KeyPair, claim: &Claim) -> bool {
    let hash = hash_from_msg(&claim.message) % key.modulus();
    key.encode_block(&claim.signature) == hash
}

fn hash_from_msg(msg: &[u8]) -> BigUint {
    algo::hash_to_int::<Sha256>(&[msg])
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{}",
            hex::encode(&self.message),
            self.exponent.to_str_radix(16),
            self.modulus.to_str_radix(16),
            self.signature.to_str_radix(16),
        )
    }
}

impl FromStr for Claim {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(';').collect();
        let (msg, e, m, sig) = match fields.as_slice() {
            [msg, e, m, sig] => (msg, e, m, sig),
            _ => {
                return Err(Error::MalformedInput(format!(
                    "claim has {} fields instead of 4",
                    fields.len()
                )))
            }
        };

        if !is_lower_hex(msg) {
            return Err(Error::MalformedInput(
                "claim message is not lowercase hex".to_string(),
            ));
        }
        let message = hex::decode(msg)
            .map_err(|e| Error::MalformedInput(format!("claim message: {}", e)))?;
        let modulus = parse_hex(m, "modulus")?;
        if modulus.is_zero() {
            return Ok(Claim::new(message));
        }
        Ok(Claim {
            message,
            exponent: parse_hex(e, "exponent")?,
            modulus,
            signature: parse_hex(sig, "signature")?,
        })
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f'))
}

/// Only the form `to_str_radix(16)` writes: lowercase, no leading zeros
fn parse_hex(s: &str, what: &str) -> Result<BigUint> {
    let canonical = !s.is_empty() && is_lower_hex(s) && (s == "0" || !s.starts_with('0'));
    if !canonical {
        return Err(Error::MalformedInput(format!(
            "claim {} {:?} is not a lowercase hex number",
            what, s
        )));
    }
    BigUint::parse_bytes(s.as_bytes(), 16)
        .ok_or_else(|| Error::MalformedInput(format!("claim {} is not a hex number", what)))
}
