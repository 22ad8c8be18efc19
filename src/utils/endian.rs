//! Dual-endian integer decoding
//!
//! ECMA-119 records every multi-byte integer twice: the little-endian copy
//! immediately followed by the big-endian copy. The copies must agree.

use crate::error::{Iso9660Error, Result};
use log::warn;

/// Decode a dual-endian 16-bit integer from its 4-byte storage form.
pub fn both_u16(bytes: [u8; 4]) -> Result<u16> {
    let le = u16::from_le_bytes([bytes[0], bytes[1]]);
    let be = u16::from_be_bytes([bytes[2], bytes[3]]);
    if le != be {
        warn!("dual-endian u16 mismatch: le={le} be={be}");
        return Err(Iso9660Error::EncodingMismatch);
    }
    Ok(le)
}

/// Decode a dual-endian 32-bit integer from its 8-byte storage form.
pub fn both_u32(bytes: [u8; 8]) -> Result<u32> {
    let le = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let be = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if le != be {
        warn!("dual-endian u32 mismatch: le={le} be={be}");
        return Err(Iso9660Error::EncodingMismatch);
    }
    Ok(le)
}
