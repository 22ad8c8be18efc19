//! Supplementary Volume Descriptor (Joliet support)
//!
//! A Supplementary VD repeats the primary field layout and adds a 32-byte
//! escape-sequence field. One of the escape sequences `%/@`, `%/C`, `%/E`
//! in its first bytes marks a Joliet hierarchy (levels 1 to 3), whose text
//! fields and file identifiers are UCS-2 big-endian.

use log::warn;

use crate::error::Result;
use crate::utils::field;
use crate::volume::primary::{parse_table, TextEncoding, VolumeDescriptorTable};

/// Joliet level advertised by the escape-sequence field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JolietLevel {
    /// `%/@`: UCS-2 level 1
    Level1,
    /// `%/C`: UCS-2 level 2
    Level2,
    /// `%/E`: UCS-2 level 3
    Level3,
}

/// Supplementary Volume Descriptor (type 2)
#[derive(Debug, Clone, PartialEq)]
pub struct SupplementaryVolumeDescriptor {
    /// The shared descriptor field table
    pub table: VolumeDescriptorTable,

    /// Raw escape-sequence field (bytes 88..120)
    pub escape_sequences: [u8; 32],

    /// Joliet level, when one of the Joliet escape sequences is present
    pub joliet_level: Option<JolietLevel>,
}

/// Detect a Joliet escape sequence at the start of the field
pub fn joliet_level(escape_sequences: &[u8]) -> Option<JolietLevel> {
    match escape_sequences.get(..3) {
        Some(b"%/@") => Some(JolietLevel::Level1),
        Some(b"%/C") => Some(JolietLevel::Level2),
        Some(b"%/E") => Some(JolietLevel::Level3),
        _ => None,
    }
}

/// Parse a Supplementary Volume Descriptor from one 2048-byte sector
pub fn parse(data: &[u8]) -> Result<SupplementaryVolumeDescriptor> {
    let escape_sequences: [u8; 32] = field(data, 88, crate::error::Iso9660Error::NotAnIso9660Image)?;
    let level = joliet_level(&escape_sequences);

    let encoding = if level.is_some() {
        TextEncoding::Ucs2
    } else {
        TextEncoding::Ascii
    };
    let table = parse_table(data, encoding, level.is_some())?;
    if table.version != 1 && table.version != 2 {
        warn!(
            "supplementary volume descriptor has version {}",
            table.version
        );
    }

    Ok(SupplementaryVolumeDescriptor {
        table,
        escape_sequences,
        joliet_level: level,
    })
}
