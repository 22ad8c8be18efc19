//! String handling utilities
//!
//! ISO9660 uses several text encodings: d-characters and a-characters for
//! plain identifiers, and UCS-2 big-endian for Joliet hierarchies.

use alloc::string::String;

use crate::error::{Iso9660Error, Result};

/// d-characters: A-Z, 0-9, _
pub fn is_d_char(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'
}

/// a-characters: A-Z, 0-9, space and the ECMA-119 punctuation set
pub fn is_a_char(b: u8) -> bool {
    is_d_char(b)
        || matches!(
            b,
            b' ' | b'!'
                | b'"'
                | b'%'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b'-'
                | b'.'
                | b'/'
                | b':'
                | b';'
                | b'<'
                | b'='
                | b'>'
                | b'?'
        )
}

/// Check that every byte is a d-character (separators `.` and `;` allowed)
pub fn validate_d_characters(bytes: &[u8]) -> Result<()> {
    for &b in bytes {
        if !is_d_char(b) && b != b'.' && b != b';' {
            return Err(Iso9660Error::InvalidIdentifierChar);
        }
    }
    Ok(())
}

/// Check that every byte is an a-character
pub fn validate_a_characters(bytes: &[u8]) -> Result<()> {
    for &b in bytes {
        if !is_a_char(b) {
            return Err(Iso9660Error::InvalidIdentifierChar);
        }
    }
    Ok(())
}

/// Decode a plain ISO9660 file identifier.
///
/// Only control bytes and non-ASCII bytes are rejected. Images in the wild
/// routinely carry characters outside the strict d-character class (mkisofs
/// 8.3 mangling uses `~`), so the strict validators above are not applied
/// here.
pub fn decode_identifier(bytes: &[u8]) -> Result<String> {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b < 0x20 || b >= 0x7F {
            return Err(Iso9660Error::InvalidIdentifierChar);
        }
        out.push(b as char);
    }
    Ok(out)
}

/// Decode a fixed-width ASCII text field, dropping trailing padding
pub fn decode_text(bytes: &[u8]) -> String {
    let trimmed = trim_trailing_spaces(bytes);
    let mut out = String::with_capacity(trimmed.len());
    for &b in trimmed {
        if (0x20..0x7F).contains(&b) {
            out.push(b as char);
        } else {
            out.push(char::REPLACEMENT_CHARACTER);
        }
    }
    out
}

/// Characters Joliet forbids in identifiers, besides control code points
fn is_joliet_forbidden(unit: u16) -> bool {
    unit <= 0x1F || matches!(unit, 0x2A | 0x2F | 0x3A | 0x3B | 0x3F | 0x5C)
}

/// Decode a Joliet (UCS-2 big-endian) file identifier.
///
/// The byte length must be even; trailing NUL code units are stripped; the
/// Joliet forbidden set and surrogate code units are rejected.
pub fn decode_ucs2_identifier(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Iso9660Error::InvalidJolietName);
    }
    let mut out = String::with_capacity(bytes.len() / 2);
    let mut units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect::<alloc::vec::Vec<u16>>();
    while units.last() == Some(&0) {
        units.pop();
    }
    for unit in units {
        if is_joliet_forbidden(unit) {
            return Err(Iso9660Error::InvalidJolietName);
        }
        match char::from_u32(unit as u32) {
            Some(c) => out.push(c),
            // surrogate code unit; UCS-2 has no pairs
            None => return Err(Iso9660Error::InvalidJolietName),
        }
    }
    Ok(out)
}

/// Decode a fixed-width UCS-2 big-endian text field, dropping trailing padding
pub fn decode_ucs2_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        let unit = u16::from_be_bytes([pair[0], pair[1]]);
        if unit == 0 {
            continue;
        }
        out.push(char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    String::from(out.trim_end_matches(' '))
}

/// Trim trailing NUL padding from byte slice
pub fn trim_trailing_nuls(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == 0 {
        end -= 1;
    }
    &bytes[..end]
}

/// Trim trailing spaces from byte slice
pub fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        end -= 1;
    }
    &bytes[..end]
}

/// Strip version suffix from filename (e.g., "FILE.TXT;1" -> "FILE.TXT")
/// Also removes trailing dot if present (e.g., "FILE.;1" -> "FILE")
pub fn strip_version(name: &str) -> &str {
    let base = name.split(';').next().unwrap_or(name);
    if let Some(stripped) = base.strip_suffix('.') {
        stripped
    } else {
        base
    }
}
