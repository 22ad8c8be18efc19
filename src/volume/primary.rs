//! Primary Volume Descriptor parsing
//!
//! The Primary Volume Descriptor (PVD) is always present and describes the
//! basic ISO9660 filesystem structure. The Supplementary Volume Descriptor
//! shares the same field layout, so both decode through
//! [`VolumeDescriptorTable`].
//!
//! See ECMA-119 8.4 for the field table.

use alloc::string::String;
use alloc::vec::Vec;

use log::warn;

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::utils::datetime::VolumeDateTime;
use crate::utils::endian::{both_u16, both_u32};
use crate::utils::{field, string};

/// Text encoding of a descriptor's character fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextEncoding {
    /// Plain ISO9660 a/d-characters
    Ascii,
    /// Joliet UCS-2 big-endian
    Ucs2,
}

/// The field layout shared by the Primary and Supplementary descriptors
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeDescriptorTable {
    /// Descriptor version byte
    pub version: u8,

    /// System identifier (32 a-characters)
    pub system_identifier: String,

    /// Volume identifier (32 d-characters)
    pub volume_identifier: String,

    /// Volume space size in logical blocks
    pub volume_space_size: u32,

    /// Number of volumes in the set
    pub volume_set_size: u16,

    /// Ordinal of this volume in the set
    pub volume_sequence_number: u16,

    /// Logical block size (2048 on every real disc)
    pub logical_block_size: u16,

    /// Path table size in bytes
    pub path_table_size: u32,

    /// Location of the little-endian (type L) path table
    pub l_path_table_lba: u32,

    /// Location of the optional type L path table (0 if absent)
    pub opt_l_path_table_lba: u32,

    /// Location of the big-endian (type M) path table
    pub m_path_table_lba: u32,

    /// Location of the optional type M path table (0 if absent)
    pub opt_m_path_table_lba: u32,

    /// Root directory record, inlined at bytes 156..190
    pub root_record: DirectoryRecord,

    /// Volume set identifier
    pub volume_set_identifier: String,

    /// Publisher identifier
    pub publisher_identifier: String,

    /// Data preparer identifier
    pub data_preparer_identifier: String,

    /// Application identifier
    pub application_identifier: String,

    /// Copyright file identifier
    pub copyright_file_identifier: String,

    /// Abstract file identifier
    pub abstract_file_identifier: String,

    /// Bibliographic file identifier
    pub bibliographic_file_identifier: String,

    /// Volume creation time
    pub created_at: Option<VolumeDateTime>,

    /// Volume modification time
    pub modified_at: Option<VolumeDateTime>,

    /// Volume expiration time
    pub expires_at: Option<VolumeDateTime>,

    /// Volume effective time
    pub effective_at: Option<VolumeDateTime>,

    /// File structure version
    pub file_structure_version: u8,

    /// Application-use area (512 bytes)
    pub application_use: Vec<u8>,
}

/// Parse a Primary Volume Descriptor from one 2048-byte sector
pub fn parse(data: &[u8]) -> Result<VolumeDescriptorTable> {
    let table = parse_table(data, TextEncoding::Ascii, false)?;
    if table.version != 1 {
        warn!("primary volume descriptor has version {}", table.version);
    }
    Ok(table)
}

pub(crate) fn parse_table(
    data: &[u8],
    encoding: TextEncoding,
    joliet_root: bool,
) -> Result<VolumeDescriptorTable> {
    let short = Iso9660Error::NotAnIso9660Image;
    if data.len() < 1395 {
        return Err(short);
    }

    let decode = |bytes: &[u8]| -> String {
        match encoding {
            TextEncoding::Ascii => string::decode_text(bytes),
            TextEncoding::Ucs2 => string::decode_ucs2_text(bytes),
        }
    };

    let root_record = DirectoryRecord::parse(&data[156..190], joliet_root)?;

    Ok(VolumeDescriptorTable {
        version: data[6],
        system_identifier: decode(&data[8..40]),
        volume_identifier: decode(&data[40..72]),
        volume_space_size: both_u32(field(data, 80, short)?)?,
        volume_set_size: both_u16(field(data, 120, short)?)?,
        volume_sequence_number: both_u16(field(data, 124, short)?)?,
        logical_block_size: both_u16(field(data, 128, short)?)?,
        path_table_size: both_u32(field(data, 132, short)?)?,
        l_path_table_lba: u32::from_le_bytes(field(data, 140, short)?),
        opt_l_path_table_lba: u32::from_le_bytes(field(data, 144, short)?),
        m_path_table_lba: u32::from_be_bytes(field(data, 148, short)?),
        opt_m_path_table_lba: u32::from_be_bytes(field(data, 152, short)?),
        root_record,
        volume_set_identifier: decode(&data[190..318]),
        publisher_identifier: decode(&data[318..446]),
        data_preparer_identifier: decode(&data[446..574]),
        application_identifier: decode(&data[574..702]),
        copyright_file_identifier: decode(&data[702..739]),
        abstract_file_identifier: decode(&data[739..776]),
        bibliographic_file_identifier: decode(&data[776..813]),
        created_at: VolumeDateTime::from_bytes(&field(data, 813, short)?)?,
        modified_at: VolumeDateTime::from_bytes(&field(data, 830, short)?)?,
        expires_at: VolumeDateTime::from_bytes(&field(data, 847, short)?)?,
        effective_at: VolumeDateTime::from_bytes(&field(data, 864, short)?)?,
        file_structure_version: data[881],
        application_use: data[883..1395].to_vec(),
    })
}
