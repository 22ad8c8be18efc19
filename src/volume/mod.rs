//! Volume descriptor parsing and the mounted volume handle
//!
//! ISO9660 volume descriptors start at sector 16 and describe the filesystem
//! layout. The scanner classifies each 2048-byte descriptor until the set
//! terminator, then `mount` selects the active hierarchy (plain, Joliet, or
//! Rock-Ridge-over-plain) from the parsed set.

pub mod boot_record;
pub mod primary;
pub mod supplementary;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;
use log::{debug, warn};

use crate::directory::record::DirectoryRecord;
use crate::directory::DirectoryEntry;
use crate::error::{Iso9660Error, Result};
use crate::extensions::{rock_ridge, susp};
use crate::types::{MountOptions, SECTOR_SIZE, VOLUME_DESCRIPTOR_START};
use crate::utils::endian::both_u32;
use crate::utils::{field, string};

use boot_record::BootRecord;
use primary::VolumeDescriptorTable;
use supplementary::SupplementaryVolumeDescriptor;

/// Safety cap on the descriptor set scan
const MAX_DESCRIPTORS: u64 = 100;

/// Volume Descriptor header (first 7 bytes of each descriptor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDescriptorHeader {
    /// Type code (0=boot, 1=primary, 2=supplementary, 3=partition, 255=terminator)
    pub type_code: u8,

    /// Standard identifier "CD001"
    pub identifier: [u8; 5],

    /// Version (1, or 2 for enhanced descriptors)
    pub version: u8,
}

impl VolumeDescriptorHeader {
    /// CD001 magic bytes
    pub const MAGIC: &'static [u8; 5] = b"CD001";

    /// Decode the header from the start of a descriptor sector
    pub fn parse(sector: &[u8]) -> Result<Self> {
        if sector.len() < 7 {
            return Err(Iso9660Error::NotAnIso9660Image);
        }
        Ok(Self {
            type_code: sector[0],
            identifier: field(sector, 1, Iso9660Error::NotAnIso9660Image)?,
            version: sector[6],
        })
    }

    /// Check the standard identifier
    pub fn is_valid(&self) -> bool {
        &self.identifier == Self::MAGIC
    }
}

/// Volume Partition descriptor (type 3)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDescriptor {
    /// System identifier
    pub system_identifier: String,

    /// Partition identifier
    pub volume_partition_identifier: String,

    /// First logical block of the partition
    pub partition_location: u32,

    /// Partition size in logical blocks
    pub partition_size: u32,
}

impl PartitionDescriptor {
    fn parse(data: &[u8]) -> Result<Self> {
        let short = Iso9660Error::NotAnIso9660Image;
        if data.len() < 88 {
            return Err(short);
        }
        Ok(Self {
            system_identifier: string::decode_text(&data[8..40]),
            volume_partition_identifier: string::decode_text(&data[40..72]),
            partition_location: both_u32(field(data, 72, short)?)?,
            partition_size: both_u32(field(data, 80, short)?)?,
        })
    }
}

/// One classified volume descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeDescriptor {
    /// Boot Record (type 0)
    Boot(BootRecord),

    /// Primary Volume Descriptor (type 1)
    Primary(VolumeDescriptorTable),

    /// Supplementary Volume Descriptor (type 2)
    Supplementary(SupplementaryVolumeDescriptor),

    /// Volume Partition descriptor (type 3)
    Partition(PartitionDescriptor),

    /// Volume Descriptor Set Terminator (type 255)
    Terminator,
}

impl VolumeDescriptor {
    /// The descriptor's type code byte
    pub fn type_code(&self) -> u8 {
        match self {
            Self::Boot(_) => 0,
            Self::Primary(_) => 1,
            Self::Supplementary(_) => 2,
            Self::Partition(_) => 3,
            Self::Terminator => 255,
        }
    }
}

/// Read and classify the volume descriptor set.
///
/// Scans one sector at a time from sector 16 until the set terminator. The
/// returned list is in on-disc order and ends with the terminator.
pub fn read_descriptor_set<B: BlockIo>(
    block_io: &mut B,
    start_lba: u64,
) -> Result<Vec<VolumeDescriptor>> {
    let blocks = block_io.num_blocks().map_err(|_| Iso9660Error::Io)?;
    if blocks.saturating_sub(start_lba) <= VOLUME_DESCRIPTOR_START {
        return Err(Iso9660Error::SourceTooSmall);
    }

    let mut buffer = [0u8; SECTOR_SIZE];
    let mut descriptors = Vec::new();
    let mut sector = VOLUME_DESCRIPTOR_START;
    loop {
        if start_lba + sector >= blocks || sector - VOLUME_DESCRIPTOR_START >= MAX_DESCRIPTORS {
            return Err(Iso9660Error::MissingTerminator);
        }
        block_io
            .read_blocks(Lba(start_lba + sector), &mut buffer)
            .map_err(|_| Iso9660Error::Io)?;

        let header = VolumeDescriptorHeader::parse(&buffer)?;
        if !header.is_valid() {
            return Err(Iso9660Error::NotAnIso9660Image);
        }

        match header.type_code {
            0 => descriptors.push(VolumeDescriptor::Boot(boot_record::parse(&buffer)?)),
            1 => descriptors.push(VolumeDescriptor::Primary(primary::parse(&buffer)?)),
            2 => descriptors.push(VolumeDescriptor::Supplementary(supplementary::parse(
                &buffer,
            )?)),
            3 => descriptors.push(VolumeDescriptor::Partition(PartitionDescriptor::parse(
                &buffer,
            )?)),
            255 => {
                descriptors.push(VolumeDescriptor::Terminator);
                break;
            }
            other => {
                debug!("skipping reserved descriptor type {other}");
            }
        }
        sector += 1;
    }
    Ok(descriptors)
}

/// A mounted ISO9660 volume
///
/// Holds the parsed descriptor set and the selected hierarchy. The byte
/// source is not retained; every navigation call borrows it again, so the
/// source must outlive the volume only in the caller's hands.
#[derive(Debug, Clone)]
pub struct Volume {
    start_lba: u64,
    options: MountOptions,
    descriptors: Vec<VolumeDescriptor>,
    primary: VolumeDescriptorTable,
    supplementary: Option<SupplementaryVolumeDescriptor>,
    has_el_torito: bool,
    rock_ridge: bool,
    susp_skip: u8,
}

impl Volume {
    /// The full descriptor set, in on-disc order
    pub fn descriptors(&self) -> &[VolumeDescriptor] {
        &self.descriptors
    }

    /// The Primary Volume Descriptor's field table
    pub fn primary(&self) -> &VolumeDescriptorTable {
        &self.primary
    }

    /// The Joliet Supplementary Volume Descriptor, when one exists
    pub fn supplementary(&self) -> Option<&SupplementaryVolumeDescriptor> {
        self.supplementary.as_ref()
    }

    /// Does the image carry a Joliet hierarchy?
    pub fn has_joliet(&self) -> bool {
        self.supplementary.is_some()
    }

    /// Did the primary hierarchy's root carry SUSP/Rock Ridge entries?
    ///
    /// Only probed when Rock Ridge interpretation is enabled in the options.
    pub fn has_rock_ridge(&self) -> bool {
        self.rock_ridge
    }

    /// Does the image announce an El Torito boot catalog?
    pub fn has_el_torito(&self) -> bool {
        self.has_el_torito
    }

    /// Is the Joliet hierarchy the active one?
    pub fn uses_joliet(&self) -> bool {
        self.options.joliet && self.supplementary.is_some()
    }

    /// Are Rock Ridge names and attributes applied to listings?
    pub fn uses_rock_ridge(&self) -> bool {
        self.rock_ridge && !self.uses_joliet()
    }

    /// The options this volume was mounted with
    pub fn options(&self) -> MountOptions {
        self.options
    }

    /// A fresh handle on the root directory of the active hierarchy
    pub fn root(&self) -> DirectoryEntry {
        DirectoryEntry::root(self.active_table().root_record.clone())
    }

    pub(crate) fn active_table(&self) -> &VolumeDescriptorTable {
        match (&self.supplementary, self.options.joliet) {
            (Some(svd), true) => &svd.table,
            _ => &self.primary,
        }
    }

    pub(crate) fn start_lba(&self) -> u64 {
        self.start_lba
    }

    pub(crate) fn susp_skip(&self) -> u8 {
        self.susp_skip
    }
}

/// Mount an ISO9660 volume with default options
///
/// Reads volume descriptors starting at sector 16 and selects the active
/// hierarchy. This is the entry point for all ISO9660 operations.
///
/// # Arguments
/// * `block_io` - Block device containing the ISO; its block size must be
///   the 2048-byte ISO9660 logical sector
/// * `start_lba` - Starting sector of the ISO (0 if raw ISO file)
///
/// # Example
/// ```ignore
/// use isofs::mount;
///
/// let volume = mount(&mut block_io, 0)?;
/// println!("Volume: {}", volume.primary().volume_identifier);
/// ```
pub fn mount<B: BlockIo>(block_io: &mut B, start_lba: u64) -> Result<Volume> {
    mount_with_options(block_io, start_lba, MountOptions::default())
}

/// Mount an ISO9660 volume with explicit options
pub fn mount_with_options<B: BlockIo>(
    block_io: &mut B,
    start_lba: u64,
    options: MountOptions,
) -> Result<Volume> {
    let descriptors = read_descriptor_set(block_io, start_lba)?;

    let mut primary: Option<VolumeDescriptorTable> = None;
    let mut supplementary: Option<SupplementaryVolumeDescriptor> = None;
    let mut has_el_torito = false;
    for descriptor in &descriptors {
        match descriptor {
            VolumeDescriptor::Primary(table) => {
                if primary.is_some() {
                    warn!("multiple primary volume descriptors; keeping the first");
                } else {
                    primary = Some(table.clone());
                }
            }
            VolumeDescriptor::Supplementary(svd) => {
                if svd.joliet_level.is_some() && supplementary.is_none() {
                    supplementary = Some(svd.clone());
                }
            }
            VolumeDescriptor::Boot(boot) => {
                has_el_torito |= boot.is_el_torito();
            }
            _ => {}
        }
    }
    let primary = primary.ok_or(Iso9660Error::NotAnIso9660Image)?;

    let mut rock_ridge = false;
    let mut susp_skip = 0;
    if options.rock_ridge {
        (rock_ridge, susp_skip) = probe_rock_ridge(block_io, start_lba, &primary.root_record)?;
    }

    Ok(Volume {
        start_lba,
        options,
        descriptors,
        primary,
        supplementary,
        has_el_torito,
        rock_ridge,
        susp_skip,
    })
}

/// Inspect the primary root's own record for SUSP/Rock Ridge markers.
///
/// The `.` entry of the root directory carries the `SP` indicator (and
/// usually the `ER` reference) when the hierarchy uses SUSP.
fn probe_rock_ridge<B: BlockIo>(
    block_io: &mut B,
    start_lba: u64,
    root: &DirectoryRecord,
) -> Result<(bool, u8)> {
    let mut buffer = vec![0u8; SECTOR_SIZE];
    block_io
        .read_blocks(Lba(start_lba + root.data_lba() as u64), &mut buffer)
        .map_err(|_| Iso9660Error::Io)?;
    if root.data_length == 0 || buffer[0] == 0 {
        return Ok((false, 0));
    }

    let record = DirectoryRecord::parse(&buffer, false)?;
    if record.system_use.is_empty() {
        return Ok((false, 0));
    }
    let entries = susp::parse_system_use(block_io, start_lba, &record.system_use, 0)?;
    let skip = entries
        .iter()
        .find_map(|entry| match entry {
            susp::SystemUseEntry::SuspIndicator { skip } => Some(*skip),
            _ => None,
        })
        .unwrap_or(0);
    Ok((rock_ridge::is_rock_ridge(&entries), skip))
}
