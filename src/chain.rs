//! Hash-chained block mode on top of raw RSA.
//!
//! One pass pads the message and encodes it block by block. The encoded
//! block is xored with a running state and written one byte wider than the
//! plaintext block. After every block the state becomes
//! `sha256(plaintext block || decimal(state)) mod 2^block_bits`, so each
//! block depends on all plaintext before it.
//!
//! The whole pass is applied twice with the bytes reversed in between:
//! `encrypt(m) = pass(reverse(pass(m)))`.
use num_bigint::BigUint;
use num_traits::One;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{
    algo,
    error::{Error, Result},
    padding,
    rsa::KeyPair,
};

/// State of the chain before the first block
pub const INITIAL_STATE: u32 = 11;

struct Chain {
    state: BigUint,
    // 2^block_bits
    period: BigUint,
}

impl Chain {
    fn new(block_bits: usize) -> Self {
        let period = BigUint::one() << block_bits;
        Self {
            state: BigUint::from(INITIAL_STATE) % &period,
            period,
        }
    }

    fn advance(&mut self, plain_block: &[u8]) {
        let state = self.state.to_str_radix(10);
        let digest = algo::hash_to_int::<Sha256>(&[plain_block, state.as_bytes()]);
        self.state = digest % &self.period;
    }
}

pub fn encrypt(key: &KeyPair, msg: &[u8]) -> Result<Vec<u8>> {
    let mut once = encrypt_pass(key, msg)?;
    once.reverse();
    let res = encrypt_pass(key, &once)?;
    log::trace!("encrypted {} bytes into {} bytes", msg.len(), res.len());
    Ok(res)
}

pub fn decrypt(key: &KeyPair, msg: &[u8]) -> Result<Vec<u8>> {
    if !key.has_private_key() {
        return Err(Error::MissingPrivateKey);
    }
    let mut once = decrypt_pass(key, msg)?;
    once.reverse();
    decrypt_pass(key, &once)
}

fn encrypt_pass(key: &KeyPair, msg: &[u8]) -> Result<Vec<u8>> {
    let block_bits = key.block_size_bits();
    let block_len = key.block_size_bytes();
    let padded = Zeroizing::new(padding::pad(msg, block_bits)?);

    let mut chain = Chain::new(block_bits);
    let mut res = Vec::with_capacity(padded.len() / block_len * (block_len + 1));
    for block in padded.chunks(block_len) {
        let num = padding::block_to_int(block);
        let encoded = key.encode_block(&num) ^ &chain.state;
        res.extend(padding::int_to_block(&encoded, block_bits + 8)?);
        chain.advance(block);
    }
    Ok(res)
}

fn decrypt_pass(key: &KeyPair, msg: &[u8]) -> Result<Vec<u8>> {
    let block_bits = key.block_size_bits();
    let chunk_len = key.block_size_bytes() + 1;
    if msg.len() % chunk_len != 0 {
        return Err(Error::MalformedInput(format!(
            "invalid length of the encrypted message {}, expected a multiple of {}",
            msg.len(),
            chunk_len
        )));
    }

    let mut chain = Chain::new(block_bits);
    let capacity = msg.len() / chunk_len * (chunk_len - 1);
    let mut plain = Zeroizing::new(Vec::with_capacity(capacity));
    for chunk in msg.chunks(chunk_len) {
        let num = padding::block_to_int(chunk) ^ &chain.state;
        let decoded = key.decode_block(&num)?;
        if decoded >= chain.period {
            return Err(Error::MalformedInput(
                "decoded block is too large, wrong key?".to_string(),
            ));
        }
        let block = Zeroizing::new(padding::int_to_block(&decoded, block_bits)?);
        chain.advance(&block);
        plain.extend_from_slice(&block);
    }
    padding::unpad(&plain, block_bits)
}
