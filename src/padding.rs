use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::error::{Error, Result};

/// Byte used to left-pad a message up to whole blocks
pub const FILLER: u8 = b'?';

/// Block size in bytes. Blocks are always whole bytes.
fn block_len(block_bits: usize) -> Result<usize> {
    if block_bits == 0 || block_bits % 8 != 0 {
        return Err(Error::InvalidArgument(format!(
            "block size of {} bits is not a positive multiple of 8",
            block_bits
        )));
    }
    Ok(block_bits / 8)
}

/// Reads a block as a big-endian number
pub fn block_to_int(block: &[u8]) -> BigUint {
    BigUint::from_bytes_be(block)
}

/// Writes `num` as a big-endian block of exactly `block_bits` bits
pub fn int_to_block(num: &BigUint, block_bits: usize) -> Result<Vec<u8>> {
    let len = block_len(block_bits)?;
    if num.bits() > block_bits as u64 {
        return Err(Error::MalformedInput(format!(
            "number of {} bits does not fit into a {}-bit block",
            num.bits(),
            block_bits
        )));
    }
    let mut res = vec![0u8; len];
    // to_bytes_be gives [0] for zero, which is exactly the padding
    let raw = num.to_bytes_be();
    res[len - raw.len()..].copy_from_slice(&raw);
    Ok(res)
}

/// Pads the message to whole blocks.
///
/// res = length block || FILLER .. FILLER || message
pub fn pad(msg: &[u8], block_bits: usize) -> Result<Vec<u8>> {
    let len = block_len(block_bits)?;
    let msg_len = BigUint::from(msg.len());
    if msg_len.bits() > block_bits as u64 {
        return Err(Error::MalformedInput(format!(
            "{}-bit blocks are too small to encode a message of {} bytes",
            block_bits,
            msg.len()
        )));
    }

    let filler = (len - msg.len() % len) % len;
    let mut res = int_to_block(&msg_len, block_bits)?;
    res.reserve(filler + msg.len());
    res.resize(len + filler, FILLER);
    res.extend_from_slice(msg);
    Ok(res)
}

/// Strips what [`pad`] added
pub fn unpad(padded: &[u8], block_bits: usize) -> Result<Vec<u8>> {
    let len = block_len(block_bits)?;
    if padded.len() < len {
        return Err(Error::MalformedInput(
            "padded message is shorter than its length block".to_string(),
        ));
    }
    let (header, body) = padded.split_at(len);
    let msg_len = block_to_int(header)
        .to_usize()
        .filter(|&msg_len| msg_len <= body.len())
        .ok_or_else(|| {
            Error::MalformedInput("length block exceeds the padded message".to_string())
        })?;
    Ok(body[body.len() - msg_len..].to_vec())
}
