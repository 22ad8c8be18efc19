//! System Use Sharing Protocol (SUSP) parsing
//!
//! SUSP layers tagged variable-length entries into the system-use tail of
//! each directory record. A `CE` entry continues the area in another sector;
//! continuation chains are cycle-checked by target block.

use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;
use log::{trace, warn};

use crate::error::{Iso9660Error, Result};
use crate::extensions::rock_ridge::{
    AlternateName, ExtensionRef, PosixAttributes, SymbolicLink, TimestampsEntry,
};
use crate::types::SECTOR_SIZE;
use crate::utils::endian::both_u32;
use crate::utils::{field, string};

/// Magic check bytes of the `SP` indicator payload
pub const SP_MAGIC: [u8; 2] = [0xBE, 0xEF];

/// Upper bound on a single continuation area
const MAX_CONTINUATION_LEN: u32 = 4 * SECTOR_SIZE as u32;

/// One decoded system-use entry
#[derive(Debug, Clone, PartialEq)]
pub enum SystemUseEntry {
    /// `SP`: SUSP is in use; `skip` bytes lead every system-use area
    SuspIndicator {
        /// Bytes to skip at the start of each record's system-use area
        skip: u8,
    },

    /// `ST`: logical end of the system-use area
    Terminator,

    /// `PD`: padding
    Padding,

    /// `ES`: extension sequence selector
    ExtensionSelector {
        /// Extension sequence number
        sequence: u8,
    },

    /// `ER`: extension references registered for the hierarchy
    ExtensionsReference(Vec<ExtensionRef>),

    /// `NM`: Rock Ridge alternate name (possibly one part of several)
    AlternateName(AlternateName),

    /// `PX`: Rock Ridge POSIX file attributes
    PosixAttributes(PosixAttributes),

    /// `TF`: Rock Ridge timestamps
    Timestamps(TimestampsEntry),

    /// `SL`: Rock Ridge symbolic link target components
    SymbolicLink(SymbolicLink),

    /// `CL`: Rock Ridge child link (relocated directory extent)
    ChildLink(u32),

    /// `PL`: Rock Ridge parent link
    ParentLink(u32),

    /// `RE`: record is a relocated directory
    RelocatedDirectory,

    /// `RR`: legacy Rock Ridge presence mask
    RockRidgeIndicator(u8),

    /// Any tag this parser does not interpret
    Unknown {
        /// Two-character entry tag
        tag: [u8; 2],
        /// Entry version byte
        version: u8,
        /// Raw payload
        data: Vec<u8>,
    },
}

/// Parse a directory record's system-use area, chasing continuations.
///
/// `start_lba` is the device sector the image begins at; continuation block
/// numbers are relative to it. `skip` is the byte count announced by the
/// hierarchy's `SP` entry.
pub fn parse_system_use<B: BlockIo>(
    block_io: &mut B,
    start_lba: u64,
    area: &[u8],
    skip: usize,
) -> Result<Vec<SystemUseEntry>> {
    let area = area.get(skip.min(area.len())..).unwrap_or(&[]);
    let mut entries = Vec::new();
    let mut visited = BTreeSet::new();
    parse_area(block_io, start_lba, area, &mut entries, &mut visited)?;
    Ok(entries)
}

fn parse_area<B: BlockIo>(
    block_io: &mut B,
    start_lba: u64,
    area: &[u8],
    entries: &mut Vec<SystemUseEntry>,
    visited: &mut BTreeSet<u32>,
) -> Result<()> {
    let mut pos = 0usize;
    while pos < area.len() {
        if area[pos] == 0 {
            // padding up to the end of the area
            break;
        }
        if area.len() - pos < 4 {
            warn!("system-use area ends inside an entry header");
            break;
        }
        let tag = [area[pos], area[pos + 1]];
        let len = area[pos + 2] as usize;
        let version = area[pos + 3];
        if len < 4 || pos + len > area.len() {
            return Err(Iso9660Error::TruncatedSuspEntry);
        }
        let payload = &area[pos + 4..pos + len];
        pos += len;

        match &tag {
            b"CE" => {
                chase_continuation(block_io, start_lba, payload, entries, visited)?;
            }
            b"ST" => {
                entries.push(SystemUseEntry::Terminator);
                break;
            }
            _ => entries.push(decode_entry(tag, version, payload)?),
        }
    }
    Ok(())
}

fn chase_continuation<B: BlockIo>(
    block_io: &mut B,
    start_lba: u64,
    payload: &[u8],
    entries: &mut Vec<SystemUseEntry>,
    visited: &mut BTreeSet<u32>,
) -> Result<()> {
    let block = both_u32(field(payload, 0, Iso9660Error::TruncatedSuspEntry)?)?;
    let offset = both_u32(field(payload, 8, Iso9660Error::TruncatedSuspEntry)?)?;
    let length = both_u32(field(payload, 16, Iso9660Error::TruncatedSuspEntry)?)?;

    if offset >= SECTOR_SIZE as u32 || length > MAX_CONTINUATION_LEN {
        warn!("continuation area rejected: block={block} offset={offset} length={length}");
        return Err(Iso9660Error::TruncatedSuspEntry);
    }
    if !visited.insert(block) {
        return Err(Iso9660Error::CircularContinuation);
    }
    trace!("following continuation area at block {block}+{offset}, {length} bytes");

    let sectors = (offset + length).div_ceil(SECTOR_SIZE as u32) as usize;
    let mut buffer = vec![0u8; sectors * SECTOR_SIZE];
    block_io
        .read_blocks(Lba(start_lba + block as u64), &mut buffer)
        .map_err(|_| Iso9660Error::Io)?;

    let continuation = &buffer[offset as usize..(offset + length) as usize];
    parse_area(block_io, start_lba, continuation, entries, visited)
}

fn decode_entry(tag: [u8; 2], version: u8, payload: &[u8]) -> Result<SystemUseEntry> {
    let entry = match &tag {
        b"SP" => {
            if payload.len() < 3 || payload[..2] != SP_MAGIC {
                warn!("SP entry without check bytes");
                return Ok(unknown(tag, version, payload));
            }
            SystemUseEntry::SuspIndicator { skip: payload[2] }
        }
        b"PD" => SystemUseEntry::Padding,
        b"ES" => match payload.first() {
            Some(&sequence) => SystemUseEntry::ExtensionSelector { sequence },
            None => return Err(Iso9660Error::TruncatedSuspEntry),
        },
        b"ER" => SystemUseEntry::ExtensionsReference(decode_extension_refs(payload)?),
        b"NM" => SystemUseEntry::AlternateName(AlternateName::parse(payload)?),
        b"PX" => SystemUseEntry::PosixAttributes(PosixAttributes::parse(payload)?),
        b"TF" => SystemUseEntry::Timestamps(TimestampsEntry::parse(payload)?),
        b"SL" => SystemUseEntry::SymbolicLink(SymbolicLink::parse(payload)?),
        b"CL" => {
            SystemUseEntry::ChildLink(both_u32(field(payload, 0, Iso9660Error::TruncatedSuspEntry)?)?)
        }
        b"PL" => {
            SystemUseEntry::ParentLink(both_u32(field(payload, 0, Iso9660Error::TruncatedSuspEntry)?)?)
        }
        b"RE" => SystemUseEntry::RelocatedDirectory,
        b"RR" => match payload.first() {
            Some(&mask) => SystemUseEntry::RockRidgeIndicator(mask),
            None => return Err(Iso9660Error::TruncatedSuspEntry),
        },
        _ => {
            trace!(
                "unhandled system-use tag {}{}",
                tag[0] as char,
                tag[1] as char
            );
            unknown(tag, version, payload)
        }
    };
    Ok(entry)
}

fn unknown(tag: [u8; 2], version: u8, payload: &[u8]) -> SystemUseEntry {
    SystemUseEntry::Unknown {
        tag,
        version,
        data: payload.to_vec(),
    }
}

fn decode_extension_refs(payload: &[u8]) -> Result<Vec<ExtensionRef>> {
    if payload.len() < 4 {
        return Err(Iso9660Error::InvalidErRecord);
    }
    let id_len = payload[0] as usize;
    let descriptor_len = payload[1] as usize;
    let source_len = payload[2] as usize;
    let version = payload[3];

    let id_end = 4 + id_len;
    let descriptor_end = id_end + descriptor_len;
    let source_end = descriptor_end + source_len;
    if source_end > payload.len() {
        return Err(Iso9660Error::InvalidErRecord);
    }

    Ok(vec![ExtensionRef {
        identifier: string::decode_text(&payload[4..id_end]),
        descriptor: string::decode_text(&payload[id_end..descriptor_end]),
        source: string::decode_text(&payload[descriptor_end..source_end]),
        version,
    }])
}
