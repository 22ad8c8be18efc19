//! Extended Attribute Record parsing
//!
//! An extended attribute record occupies the leading logical blocks of a
//! file's extent when the directory record declares a non-zero length for
//! it. The fixed prefix is 250 bytes, followed by the application-use and
//! escape-sequence blobs.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

use crate::directory::DirectoryEntry;
use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;
use crate::utils::datetime::VolumeDateTime;
use crate::utils::endian::both_u16;
use crate::utils::{field, string};
use crate::volume::Volume;

/// Size of the fixed portion of an extended attribute record
pub const FIXED_LEN: usize = 250;

/// Extended Attribute Record (ECMA-119 9.5)
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedAttributeRecord {
    /// Owner identification
    pub owner_id: u16,

    /// Group identification
    pub group_id: u16,

    /// Permission bits
    pub permissions: u16,

    /// File creation time
    pub created_at: Option<VolumeDateTime>,

    /// Last modification time
    pub modified_at: Option<VolumeDateTime>,

    /// Expiration time
    pub expires_at: Option<VolumeDateTime>,

    /// Effective time
    pub effective_at: Option<VolumeDateTime>,

    /// Record format
    pub record_format: u8,

    /// Record attributes
    pub record_attributes: u8,

    /// Record length
    pub record_length: u16,

    /// System identifier (32 a-characters)
    pub system_identifier: String,

    /// System-use area (64 bytes)
    pub system_use: Vec<u8>,

    /// Extended attribute record version
    pub version: u8,

    /// Application-use area of declared length
    pub application_use: Vec<u8>,

    /// Escape sequences of declared length
    pub escape_sequences: Vec<u8>,
}

impl ExtendedAttributeRecord {
    /// Decode an extended attribute record from its on-disc bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        let short = Iso9660Error::ShortExtendedAttr;
        if data.len() < FIXED_LEN {
            return Err(short);
        }

        let timestamp =
            |offset: usize| -> Result<Option<VolumeDateTime>> {
                VolumeDateTime::from_bytes(&field(data, offset, short)?)
            };

        let escape_len = data[181] as usize;
        let application_len = both_u16(field(data, 246, short)?)? as usize;
        let application_end = FIXED_LEN + application_len;
        let escape_end = application_end + escape_len;
        if escape_end > data.len() {
            return Err(short);
        }

        Ok(Self {
            owner_id: both_u16(field(data, 0, short)?)?,
            group_id: both_u16(field(data, 4, short)?)?,
            permissions: u16::from_le_bytes(field(data, 8, short)?),
            created_at: timestamp(10)?,
            modified_at: timestamp(27)?,
            expires_at: timestamp(44)?,
            effective_at: timestamp(61)?,
            record_format: data[78],
            record_attributes: data[79],
            record_length: both_u16(field(data, 80, short)?)?,
            system_identifier: string::decode_text(&data[84..116]),
            system_use: data[116..180].to_vec(),
            version: data[180],
            application_use: data[FIXED_LEN..application_end].to_vec(),
            escape_sequences: data[application_end..escape_end].to_vec(),
        })
    }
}

/// Read the extended attribute record of an entry, if it has one.
///
/// The record occupies the first `extended_attr_length` logical blocks of
/// the entry's extent; entries without one yield `None`.
pub fn read_extended_attr<B: BlockIo>(
    block_io: &mut B,
    volume: &Volume,
    entry: &DirectoryEntry,
) -> Result<Option<ExtendedAttributeRecord>> {
    let blocks = entry.record().extended_attr_length as usize;
    if blocks == 0 {
        return Ok(None);
    }
    let mut buffer = vec![0u8; blocks * SECTOR_SIZE];
    block_io
        .read_blocks(
            Lba(volume.start_lba() + entry.record().extent_lba as u64),
            &mut buffer,
        )
        .map_err(|_| Iso9660Error::Io)?;
    ExtendedAttributeRecord::parse(&buffer).map(Some)
}
