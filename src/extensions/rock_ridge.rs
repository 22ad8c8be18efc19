//! Rock Ridge extension support
//!
//! Rock Ridge adds POSIX filesystem semantics (long names, permissions,
//! timestamps, symlinks) on top of the system-use entries of a directory
//! record. Interpretation is per-record: when present, Rock Ridge metadata
//! supersedes the plain ISO9660 name, mode, and timestamps, but never the
//! extent location or data length.

use alloc::string::String;
use alloc::vec::Vec;

use bitflags::bitflags;
use log::warn;

use crate::error::{Iso9660Error, Result};
use crate::extensions::susp::SystemUseEntry;
use crate::utils::datetime::{RecordDateTime, VolumeDateTime};
use crate::utils::endian::both_u32;
use crate::utils::field;

/// Extension identifier registered by Rock Ridge 1.09/1.10 hierarchies
pub const RRIP_1991A: &str = "RRIP_1991A";

/// One reference from an `ER` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRef {
    /// Registered extension identifier (e.g. `RRIP_1991A`)
    pub identifier: String,

    /// Human-readable description
    pub descriptor: String,

    /// Specification source
    pub source: String,

    /// Extension version
    pub version: u8,
}

bitflags! {
    /// Flag byte of an `NM` entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AlternateNameFlags: u8 {
        /// Name continues in the next `NM` entry
        const CONTINUE = 1 << 0;
        /// Record names the current directory
        const CURRENT = 1 << 1;
        /// Record names the parent directory
        const PARENT = 1 << 2;
        /// Name is the host name (networked systems)
        const HOST = 1 << 5;
    }
}

/// Alternate name (`NM` entry), possibly one part of several
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateName {
    /// Continuation and special-directory flags
    pub flags: AlternateNameFlags,

    /// Name part carried by this entry
    pub name: String,
}

impl AlternateName {
    pub(crate) fn parse(payload: &[u8]) -> Result<Self> {
        let (&flag_byte, name_bytes) = payload
            .split_first()
            .ok_or(Iso9660Error::TruncatedSuspEntry)?;
        Ok(Self {
            flags: AlternateNameFlags::from_bits_truncate(flag_byte),
            name: String::from_utf8_lossy(name_bytes).into_owned(),
        })
    }
}

bitflags! {
    /// POSIX file mode bits from a `PX` entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PosixFileMode: u32 {
        /// Socket file type
        const TYPE_SOCKET = 0o140000;
        /// Symbolic link file type
        const TYPE_SYMLINK = 0o120000;
        /// Regular file type
        const TYPE_FILE = 0o100000;
        /// Block device file type
        const TYPE_BLOCK_DEV = 0o060000;
        /// Directory file type
        const TYPE_DIRECTORY = 0o040000;
        /// Character device file type
        const TYPE_CHAR_DEV = 0o020000;
        /// Named pipe file type
        const TYPE_PIPE = 0o010000;
        /// Set-user-id on execution
        const SET_UID = 0o004000;
        /// Set-group-id on execution
        const SET_GID = 0o002000;
        /// Sticky bit
        const STICKY = 0o001000;
        /// Owner read
        const OWN_READ = 0o000400;
        /// Owner write
        const OWN_WRITE = 0o000200;
        /// Owner execute
        const OWN_EXEC = 0o000100;
        /// Group read
        const GROUP_READ = 0o000040;
        /// Group write
        const GROUP_WRITE = 0o000020;
        /// Group execute
        const GROUP_EXEC = 0o000010;
        /// World read
        const WORLD_READ = 0o000004;
        /// World write
        const WORLD_WRITE = 0o000002;
        /// World execute
        const WORLD_EXEC = 0o000001;
    }
}

/// POSIX file-type mask
const TYPE_MASK: u32 = 0o170000;

impl PosixFileMode {
    /// Is the file-type field a directory?
    pub fn is_directory(self) -> bool {
        self.bits() & TYPE_MASK == Self::TYPE_DIRECTORY.bits()
    }

    /// Is the file-type field a regular file?
    pub fn is_regular_file(self) -> bool {
        self.bits() & TYPE_MASK == Self::TYPE_FILE.bits()
    }

    /// Is the file-type field a symbolic link?
    pub fn is_symlink(self) -> bool {
        self.bits() & TYPE_MASK == Self::TYPE_SYMLINK.bits()
    }

    /// The permission bits (mode & 0o7777)
    pub fn permissions(self) -> u32 {
        self.bits() & 0o7777
    }
}

/// POSIX file attributes (`PX` entry)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PosixAttributes {
    /// File mode (type and permission bits)
    pub mode: PosixFileMode,

    /// Number of links
    pub links: u32,

    /// User id
    pub uid: u32,

    /// Group id
    pub gid: u32,

    /// Serial number (inode); present from Rock Ridge 1.12 on
    pub serial: Option<u32>,
}

impl PosixAttributes {
    pub(crate) fn parse(payload: &[u8]) -> Result<Self> {
        let mode = both_u32(field(payload, 0, Iso9660Error::TruncatedSuspEntry)?)?;
        let links = both_u32(field(payload, 8, Iso9660Error::TruncatedSuspEntry)?)?;
        let uid = both_u32(field(payload, 16, Iso9660Error::TruncatedSuspEntry)?)?;
        let gid = both_u32(field(payload, 24, Iso9660Error::TruncatedSuspEntry)?)?;
        let serial = if payload.len() >= 40 {
            Some(both_u32(field(payload, 32, Iso9660Error::TruncatedSuspEntry)?)?)
        } else {
            None
        };
        Ok(Self {
            mode: PosixFileMode::from_bits_retain(mode),
            links,
            uid,
            gid,
            serial,
        })
    }
}

bitflags! {
    /// Flag byte of a `TF` entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TimestampFlags: u8 {
        /// Creation time recorded
        const CREATION = 1 << 0;
        /// Modification time recorded
        const MODIFY = 1 << 1;
        /// Access time recorded
        const ACCESS = 1 << 2;
        /// Attribute-change time recorded
        const ATTRIBUTES = 1 << 3;
        /// Backup time recorded
        const BACKUP = 1 << 4;
        /// Expiration time recorded
        const EXPIRATION = 1 << 5;
        /// Effective time recorded
        const EFFECTIVE = 1 << 6;
        /// Timestamps use the 17-byte long form
        const LONG_FORM = 1 << 7;
    }
}

/// One timestamp from a `TF` entry, in whichever form the entry uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampValue {
    /// 7-byte directory form
    Short(RecordDateTime),
    /// 17-byte ASCII form
    Long(VolumeDateTime),
}

/// Timestamps from a `TF` entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampsEntry {
    /// File creation time
    pub creation: Option<TimestampValue>,

    /// Content modification time (POSIX `st_mtime`)
    pub modify: Option<TimestampValue>,

    /// Last access time (POSIX `st_atime`)
    pub access: Option<TimestampValue>,

    /// Attribute change time (POSIX `st_ctime`)
    pub attributes: Option<TimestampValue>,

    /// Backup time
    pub backup: Option<TimestampValue>,

    /// Expiration time
    pub expiration: Option<TimestampValue>,

    /// Effective time
    pub effective: Option<TimestampValue>,
}

impl TimestampsEntry {
    pub(crate) fn parse(payload: &[u8]) -> Result<Self> {
        let (&flag_byte, mut rest) = payload
            .split_first()
            .ok_or(Iso9660Error::TruncatedSuspEntry)?;
        let flags = TimestampFlags::from_bits_truncate(flag_byte);
        let long_form = flags.contains(TimestampFlags::LONG_FORM);

        let mut take = |wanted: TimestampFlags| -> Result<Option<TimestampValue>> {
            if !flags.contains(wanted) {
                return Ok(None);
            }
            if long_form {
                let bytes: [u8; 17] = field(rest, 0, Iso9660Error::TruncatedSuspEntry)?;
                rest = &rest[17..];
                Ok(VolumeDateTime::from_bytes(&bytes)?.map(TimestampValue::Long))
            } else {
                let bytes: [u8; 7] = field(rest, 0, Iso9660Error::TruncatedSuspEntry)?;
                rest = &rest[7..];
                Ok(RecordDateTime::from_bytes_opt(&bytes)?.map(TimestampValue::Short))
            }
        };

        Ok(Self {
            creation: take(TimestampFlags::CREATION)?,
            modify: take(TimestampFlags::MODIFY)?,
            access: take(TimestampFlags::ACCESS)?,
            attributes: take(TimestampFlags::ATTRIBUTES)?,
            backup: take(TimestampFlags::BACKUP)?,
            expiration: take(TimestampFlags::EXPIRATION)?,
            effective: take(TimestampFlags::EFFECTIVE)?,
        })
    }
}

bitflags! {
    /// Flag byte of an `SL` component record
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SymlinkComponentFlags: u8 {
        /// Component continues in the next record
        const CONTINUE = 1 << 0;
        /// Component is `.`
        const CURRENT = 1 << 1;
        /// Component is `..`
        const PARENT = 1 << 2;
        /// Component is the filesystem root
        const ROOT = 1 << 3;
    }
}

/// One component record of an `SL` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkComponent {
    /// Component flags
    pub flags: SymlinkComponentFlags,

    /// Component content
    pub name: String,
}

/// Symbolic link target (`SL` entry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicLink {
    /// Target continues in the next `SL` entry
    pub continues: bool,

    /// Target path components carried by this entry
    pub components: Vec<SymlinkComponent>,
}

impl SymbolicLink {
    pub(crate) fn parse(payload: &[u8]) -> Result<Self> {
        let (&flag_byte, mut rest) = payload
            .split_first()
            .ok_or(Iso9660Error::TruncatedSuspEntry)?;
        let mut components = Vec::new();
        while !rest.is_empty() {
            if rest.len() < 2 {
                return Err(Iso9660Error::TruncatedSuspEntry);
            }
            let flags = SymlinkComponentFlags::from_bits_truncate(rest[0]);
            let len = rest[1] as usize;
            if 2 + len > rest.len() {
                return Err(Iso9660Error::TruncatedSuspEntry);
            }
            components.push(SymlinkComponent {
                flags,
                name: String::from_utf8_lossy(&rest[2..2 + len]).into_owned(),
            });
            rest = &rest[2 + len..];
        }
        Ok(Self {
            continues: flag_byte & 0x01 != 0,
            components,
        })
    }
}

/// Interpreted Rock Ridge metadata for one directory record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RockRidge {
    /// Alternate name assembled from `NM` entries
    pub name: Option<String>,

    /// POSIX attributes from `PX`
    pub attributes: Option<PosixAttributes>,

    /// Timestamps from `TF`
    pub timestamps: Option<TimestampsEntry>,

    /// Symbolic link target assembled from `SL` entries
    pub symlink_target: Option<String>,

    /// Extent of the relocated child directory (`CL`)
    pub child_link: Option<u32>,

    /// Extent of the real parent directory (`PL`)
    pub parent_link: Option<u32>,

    /// Record is a relocated directory (`RE`) and should be hidden
    pub relocated: bool,
}

/// Does this entry list mark the record as Rock-Ridge-enabled?
///
/// Either an `ER` reference to `RRIP_1991A` version 1, or the presence of
/// any Rock Ridge entry tag.
pub fn is_rock_ridge(entries: &[SystemUseEntry]) -> bool {
    entries.iter().any(|entry| match entry {
        SystemUseEntry::ExtensionsReference(refs) => refs
            .iter()
            .any(|r| r.identifier == RRIP_1991A && r.version == 1),
        SystemUseEntry::AlternateName(_)
        | SystemUseEntry::PosixAttributes(_)
        | SystemUseEntry::Timestamps(_)
        | SystemUseEntry::SymbolicLink(_)
        | SystemUseEntry::ChildLink(_)
        | SystemUseEntry::ParentLink(_)
        | SystemUseEntry::RelocatedDirectory => true,
        _ => false,
    })
}

/// Interpret the Rock Ridge entries of one record.
///
/// Returns `None` when the record carries no Rock Ridge entry at all.
pub fn interpret(entries: &[SystemUseEntry]) -> Option<RockRidge> {
    let mut rr = RockRidge::default();
    let mut found = false;
    let mut name = String::new();
    let mut name_done = false;
    let mut target = String::new();
    let mut component_open = false;

    for entry in entries {
        match entry {
            SystemUseEntry::AlternateName(nm) => {
                found = true;
                if name_done {
                    warn!("NM entry after a finished alternate name; ignoring");
                    continue;
                }
                if nm.flags.contains(AlternateNameFlags::CURRENT) {
                    name.push('.');
                } else if nm.flags.contains(AlternateNameFlags::PARENT) {
                    name.push_str("..");
                } else {
                    name.push_str(&nm.name);
                }
                if !nm.flags.contains(AlternateNameFlags::CONTINUE) {
                    name_done = true;
                }
            }
            SystemUseEntry::PosixAttributes(px) => {
                found = true;
                rr.attributes = Some(*px);
            }
            SystemUseEntry::Timestamps(tf) => {
                found = true;
                rr.timestamps = Some(*tf);
            }
            SystemUseEntry::SymbolicLink(sl) => {
                found = true;
                for component in &sl.components {
                    let flags = component.flags;
                    if flags.contains(SymlinkComponentFlags::ROOT) {
                        target.clear();
                        target.push('/');
                        component_open = false;
                        continue;
                    }
                    if !target.is_empty() && !target.ends_with('/') && !component_open {
                        target.push('/');
                    }
                    if flags.contains(SymlinkComponentFlags::CURRENT) {
                        target.push('.');
                    } else if flags.contains(SymlinkComponentFlags::PARENT) {
                        target.push_str("..");
                    } else {
                        target.push_str(&component.name);
                    }
                    component_open = flags.contains(SymlinkComponentFlags::CONTINUE);
                }
            }
            SystemUseEntry::ChildLink(lba) => {
                found = true;
                rr.child_link = Some(*lba);
            }
            SystemUseEntry::ParentLink(lba) => {
                found = true;
                rr.parent_link = Some(*lba);
            }
            SystemUseEntry::RelocatedDirectory => {
                found = true;
                rr.relocated = true;
            }
            SystemUseEntry::ExtensionsReference(refs) => {
                if refs
                    .iter()
                    .any(|r| r.identifier == RRIP_1991A && r.version == 1)
                {
                    found = true;
                }
            }
            SystemUseEntry::RockRidgeIndicator(_) => found = true,
            _ => {}
        }
    }

    if !name.is_empty() {
        rr.name = Some(name);
    }
    if !target.is_empty() {
        rr.symlink_target = Some(target);
    }
    found.then_some(rr)
}
