//! Common types and constants for ISO9660

/// ISO9660 sector size (always 2048 bytes)
pub const SECTOR_SIZE: usize = 2048;

/// Volume descriptor set starts at sector 16
pub const VOLUME_DESCRIPTOR_START: u64 = 16;

/// Maximum path length
pub const MAX_PATH_LENGTH: usize = 255;

/// Maximum directory depth
pub const MAX_DIRECTORY_DEPTH: usize = 8;

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VolumeDescriptorType {
    /// Boot Record (El Torito)
    BootRecord = 0,
    /// Primary Volume Descriptor
    Primary = 1,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary = 2,
    /// Volume Partition Descriptor
    Partition = 3,
    /// Volume Descriptor Set Terminator
    Terminator = 255,
}

/// Per-mount configuration
///
/// Controls which extensions are interpreted when the image is opened and
/// how plain ISO9660 names are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountOptions {
    /// Interpret SUSP/Rock Ridge entries on the primary hierarchy
    pub rock_ridge: bool,

    /// Prefer a Joliet hierarchy when a matching supplementary descriptor exists
    pub joliet: bool,

    /// Strip the trailing `";1"` version suffix from plain ISO9660 names
    pub strip_version: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            rock_ridge: true,
            joliet: true,
            strip_version: false,
        }
    }
}
