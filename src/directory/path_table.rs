//! Path table parsing
//!
//! The path table lists every directory of a hierarchy in one flat run of
//! records. Each hierarchy records two copies in opposite byte orders: the
//! type L (little-endian) and type M (big-endian) tables.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;
use log::warn;

use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;
use crate::utils::sector::sectors_for_bytes;
use crate::utils::string;
use crate::volume::Volume;

/// Which path table copy to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathTableKind {
    /// Type L: multi-byte fields are little-endian
    L,
    /// Type M: multi-byte fields are big-endian
    M,
}

/// One path table record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTableRecord {
    /// Directory identifier; empty for the root record
    pub identifier: String,

    /// Extended attribute record length in logical blocks
    pub extended_attr_length: u8,

    /// First logical block of the directory extent
    pub extent_lba: u32,

    /// 1-based index of the parent directory's record in this table
    pub parent_index: u16,
}

/// Read and decode one path table copy of the active hierarchy
pub fn read_path_table<B: BlockIo>(
    block_io: &mut B,
    volume: &Volume,
    kind: PathTableKind,
) -> Result<Vec<PathTableRecord>> {
    let table = volume.active_table();
    let lba = match kind {
        PathTableKind::L => table.l_path_table_lba,
        PathTableKind::M => table.m_path_table_lba,
    };
    let size = table.path_table_size as usize;
    let sectors = sectors_for_bytes(table.path_table_size) as usize;
    let mut buffer = vec![0u8; sectors * SECTOR_SIZE];
    if sectors > 0 {
        block_io
            .read_blocks(Lba(volume.start_lba() + lba as u64), &mut buffer)
            .map_err(|_| Iso9660Error::Io)?;
    }
    parse_records(
        &buffer[..size],
        kind == PathTableKind::M,
        volume.uses_joliet(),
    )
}

/// Decode the records of one path table
pub(crate) fn parse_records(
    data: &[u8],
    big_endian: bool,
    joliet: bool,
) -> Result<Vec<PathTableRecord>> {
    let mut records = Vec::new();
    let mut pos = 0usize;
    while pos < data.len() {
        let id_len = data[pos] as usize;
        if id_len == 0 {
            // trailing padding
            break;
        }
        // 8-byte fixed header, identifier, one pad byte when the length is odd
        if pos + 8 + id_len > data.len() {
            return Err(Iso9660Error::ShortPathRecord);
        }
        let extent = [data[pos + 2], data[pos + 3], data[pos + 4], data[pos + 5]];
        let parent = [data[pos + 6], data[pos + 7]];
        let (extent_lba, parent_index) = if big_endian {
            (u32::from_be_bytes(extent), u16::from_be_bytes(parent))
        } else {
            (u32::from_le_bytes(extent), u16::from_le_bytes(parent))
        };

        let id_bytes = &data[pos + 8..pos + 8 + id_len];
        let identifier = if id_bytes == [0x00] {
            String::new()
        } else if joliet {
            string::decode_ucs2_identifier(id_bytes)?
        } else {
            string::decode_identifier(id_bytes)?
        };

        records.push(PathTableRecord {
            identifier,
            extended_attr_length: data[pos + 1],
            extent_lba,
            parent_index,
        });
        pos += 8 + id_len + (id_len & 1);
    }

    match records.first() {
        Some(root) if root.identifier.is_empty() && root.parent_index == 1 => {}
        Some(_) => warn!("path table does not start with the root record"),
        None => {}
    }
    Ok(records)
}
