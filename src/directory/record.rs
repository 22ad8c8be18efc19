//! Directory Record structure
//!
//! Directory records describe files and subdirectories. Records are decoded
//! into owned values; nothing borrows from the sector buffer.

use alloc::string::String;
use alloc::vec::Vec;

use crate::directory::flags::FileFlags;
use crate::error::{Iso9660Error, Result};
use crate::utils::datetime::RecordDateTime;
use crate::utils::endian::{both_u16, both_u32};
use crate::utils::{field, string};

/// File identifier of a directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordIdentifier {
    /// `\x00`: the directory itself
    Current,
    /// `\x01`: the parent directory
    Parent,
    /// A file or directory name
    Name(String),
}

impl RecordIdentifier {
    fn decode(bytes: &[u8], joliet: bool) -> Result<Self> {
        match bytes {
            [0x00] => Ok(Self::Current),
            [0x01] => Ok(Self::Parent),
            _ if joliet => Ok(Self::Name(string::decode_ucs2_identifier(bytes)?)),
            _ => Ok(Self::Name(string::decode_identifier(bytes)?)),
        }
    }

    /// The identifier as presentable text (`.` and `..` for the specials)
    pub fn as_str(&self) -> &str {
        match self {
            Self::Current => ".",
            Self::Parent => "..",
            Self::Name(name) => name,
        }
    }

    /// Is this the `\x00` or `\x01` special identifier?
    pub fn is_special(&self) -> bool {
        matches!(self, Self::Current | Self::Parent)
    }
}

/// Directory Record (variable length, minimum 34 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Length of directory record (BP 1)
    pub length: u8,

    /// Extended attribute record length in logical blocks (BP 2)
    pub extended_attr_length: u8,

    /// Extent location (BP 3-10, dual-endian)
    pub extent_lba: u32,

    /// Data length in bytes (BP 11-18, dual-endian)
    pub data_length: u32,

    /// Recording date and time, raw 7-byte form (BP 19-25)
    pub recorded_at: [u8; 7],

    /// File flags (BP 26)
    pub flags: FileFlags,

    /// File unit size for interleaved files (BP 27)
    pub file_unit_size: u8,

    /// Interleave gap size (BP 28)
    pub interleave_gap: u8,

    /// Volume sequence number (BP 29-32, dual-endian)
    pub volume_sequence: u16,

    /// Decoded file identifier
    pub identifier: RecordIdentifier,

    /// System-use area, copied out of the record tail
    pub system_use: Vec<u8>,
}

impl DirectoryRecord {
    /// Minimum record length (33-byte fixed prefix + 1 identifier byte)
    pub const MIN_LENGTH: u8 = 34;

    /// Decode one record from `data`.
    ///
    /// `data` may extend past the record; the declared record length decides
    /// how much is consumed. `joliet` selects UCS-2 identifier decoding.
    pub fn parse(data: &[u8], joliet: bool) -> Result<Self> {
        let length = *data.first().ok_or(Iso9660Error::ShortRecord)?;
        if length < Self::MIN_LENGTH || length as usize > data.len() {
            return Err(Iso9660Error::ShortRecord);
        }
        let data = &data[..length as usize];

        let id_len = data[32] as usize;
        if 33 + id_len > length as usize {
            return Err(Iso9660Error::ShortRecord);
        }
        let identifier = RecordIdentifier::decode(&data[33..33 + id_len], joliet)?;

        // Pad byte keeps the system-use area at an even offset; it is
        // present exactly when the identifier length is even.
        let mut su_start = 33 + id_len;
        if id_len % 2 == 0 {
            su_start += 1;
        }
        let system_use = if su_start < length as usize {
            data[su_start..].to_vec()
        } else {
            Vec::new()
        };

        Ok(Self {
            length,
            extended_attr_length: data[1],
            extent_lba: both_u32(field(data, 2, Iso9660Error::ShortRecord)?)?,
            data_length: both_u32(field(data, 10, Iso9660Error::ShortRecord)?)?,
            recorded_at: field(data, 18, Iso9660Error::ShortRecord)?,
            flags: FileFlags::from_bits_retain(data[25]),
            file_unit_size: data[26],
            interleave_gap: data[27],
            volume_sequence: both_u16(field(data, 28, Iso9660Error::ShortRecord)?)?,
            identifier,
            system_use,
        })
    }

    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.flags.is_directory()
    }

    /// Decode the recording timestamp; all-zero bytes mean "not recorded"
    pub fn recording_time(&self) -> Result<Option<RecordDateTime>> {
        RecordDateTime::from_bytes_opt(&self.recorded_at)
    }

    /// First logical block of the file data (skips any extended attribute record)
    pub fn data_lba(&self) -> u32 {
        self.extent_lba + self.extended_attr_length as u32
    }
}
