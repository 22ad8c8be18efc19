//! ISO9660 Filesystem Reader
//!
//! A `no_std` reader for ISO9660 (ECMA-119) filesystem images, with Joliet
//! and Rock Ridge extension support.
//!
//! # Overview
//!
//! ISO9660 is the standard filesystem for CD-ROMs and DVDs. This crate
//! parses an image into an immutable metadata view:
//! - Volume descriptor scanning and classification (Primary, Supplementary,
//!   Boot Record, Partition, Terminator)
//! - Directory tree navigation with cycle-guarded traversal
//! - File reading from extent-based storage
//! - Joliet (UCS-2 Unicode names) via the supplementary descriptor's escape
//!   sequences
//! - Rock Ridge (long names, POSIX attributes, timestamps, symlinks) via the
//!   SUSP entries of each directory record, including continuation areas
//!
//! # Architecture
//!
//! The implementation is layered:
//! 1. **Volume layer** - Parses volume descriptors from sectors 16+
//! 2. **Directory layer** - Materialises directory records, path tables and
//!    extended attribute records
//! 3. **Extensions layer** - SUSP entry parsing and Rock Ridge interpretation
//! 4. **File layer** - Reads file data from extents
//!
//! All structures are decoded into owned values; nothing aliases the I/O
//! buffers. Dual-endian integer fields are cross-checked, and every
//! variable-length structure is bounds-checked against its container.
//!
//! # Usage
//!
//! ```ignore
//! use isofs::{mount, find_file, read_file_vec};
//!
//! // Mount ISO from a block device at a given start sector
//! let volume = mount(&mut block_io, 0)?;
//!
//! // Find a file by path
//! let file = find_file(&mut block_io, &volume, "/isolinux/vmlinuz")?;
//!
//! // Read its contents
//! let data = read_file_vec(&mut block_io, &volume, &file)?;
//! ```
//!
//! # Extensions
//!
//! Joliet preference, Rock Ridge interpretation, and version-suffix
//! stripping are per-mount switches:
//!
//! ```ignore
//! use isofs::{mount_with_options, MountOptions};
//!
//! let options = MountOptions { joliet: false, ..MountOptions::default() };
//! let volume = mount_with_options(&mut block_io, 0, options)?;
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

pub mod directory;
pub mod error;
pub mod extensions;
pub mod file;
pub mod types;
pub mod utils;
pub mod volume;

pub use error::{Iso9660Error, Result};
pub use types::{MountOptions, VolumeDescriptorType, SECTOR_SIZE};

// High-level API exports
pub use directory::ext_attr::{read_extended_attr, ExtendedAttributeRecord};
pub use directory::path_table::{read_path_table, PathTableKind, PathTableRecord};
pub use directory::{find_file, read_children, walk, DirectoryEntry};
pub use file::reader::FileReader;
pub use file::{read_file, read_file_vec};
pub use volume::{mount, mount_with_options, Volume, VolumeDescriptor};
