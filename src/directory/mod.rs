//! Directory tree navigation
//!
//! Directory extents are materialised into [`DirectoryEntry`] values: owned,
//! walk-friendly views that carry the parent path, interpreted Rock Ridge
//! metadata, and a lazily-filled children cache. Traversal is preorder, in
//! on-disk order, guarded by a set of visited extent blocks.

pub mod ext_attr;
pub mod flags;
pub mod iterator;
pub mod path_table;
pub mod record;

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use log::warn;

use crate::error::{Iso9660Error, Result};
use crate::extensions::rock_ridge::{self, RockRidge, TimestampsEntry};
use crate::extensions::susp;
use crate::types::MAX_DIRECTORY_DEPTH;
use crate::utils::datetime::RecordDateTime;
use crate::utils::string::strip_version;
use crate::volume::Volume;

use iterator::DirectoryIterator;
use record::DirectoryRecord;

/// A materialised directory entry
///
/// Children are read on demand through [`DirectoryEntry::children`] and then
/// cached; entries borrow nothing from their parents or from the I/O buffers
/// they were decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    record: DirectoryRecord,
    name: String,
    parent_path: String,
    rock_ridge: Option<RockRidge>,
    children: Option<Vec<DirectoryEntry>>,
}

impl DirectoryEntry {
    pub(crate) fn root(record: DirectoryRecord) -> Self {
        Self {
            record,
            name: String::new(),
            parent_path: String::new(),
            rock_ridge: None,
            children: None,
        }
    }

    /// The presented name: Rock Ridge alternate name when active, otherwise
    /// the hierarchy's identifier (version-stripped when so configured)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of this entry, `/`-separated from the hierarchy root
    pub fn path(&self) -> String {
        if self.name.is_empty() {
            return String::from("/");
        }
        if self.parent_path.ends_with('/') {
            let mut path = self.parent_path.clone();
            path.push_str(&self.name);
            path
        } else {
            let mut path = self.parent_path.clone();
            path.push('/');
            path.push_str(&self.name);
            path
        }
    }

    /// Is this entry a directory?
    ///
    /// A Rock Ridge `PX` mode takes precedence over the ISO9660 flag bit.
    pub fn is_dir(&self) -> bool {
        if let Some(attrs) = self.rock_ridge.as_ref().and_then(|rr| rr.attributes) {
            return attrs.mode.is_directory();
        }
        self.record.is_directory()
    }

    /// Content size in bytes
    pub fn size(&self) -> u64 {
        self.record.data_length as u64
    }

    /// POSIX mode bits, when a Rock Ridge `PX` entry is present
    pub fn mode(&self) -> Option<u32> {
        self.posix().map(|attrs| attrs.mode.bits())
    }

    /// POSIX user id from Rock Ridge
    pub fn uid(&self) -> Option<u32> {
        self.posix().map(|attrs| attrs.uid)
    }

    /// POSIX group id from Rock Ridge
    pub fn gid(&self) -> Option<u32> {
        self.posix().map(|attrs| attrs.gid)
    }

    /// POSIX link count from Rock Ridge
    pub fn nlink(&self) -> Option<u32> {
        self.posix().map(|attrs| attrs.links)
    }

    /// Recording timestamp of the directory record
    pub fn recorded_at(&self) -> Result<Option<RecordDateTime>> {
        self.record.recording_time()
    }

    /// Rock Ridge timestamps (`TF`), when present
    pub fn timestamps(&self) -> Option<&TimestampsEntry> {
        self.rock_ridge.as_ref()?.timestamps.as_ref()
    }

    /// Interpreted Rock Ridge metadata, when present
    pub fn rock_ridge(&self) -> Option<&RockRidge> {
        self.rock_ridge.as_ref()
    }

    /// The underlying directory record
    pub fn record(&self) -> &DirectoryRecord {
        &self.record
    }

    /// Children of this directory, read on first call and cached
    pub fn children<B: BlockIo>(
        &mut self,
        block_io: &mut B,
        volume: &Volume,
    ) -> Result<&[DirectoryEntry]> {
        if self.children.is_none() {
            let children = read_children(block_io, volume, self)?;
            self.children = Some(children);
        }
        Ok(self.children.as_deref().unwrap_or(&[]))
    }

    fn posix(&self) -> Option<rock_ridge::PosixAttributes> {
        self.rock_ridge.as_ref()?.attributes
    }
}

/// Build an entry from a decoded record, or `None` for records a listing
/// must not surface (`.`/`..` and relocated directories).
fn entry_from_record<B: BlockIo>(
    block_io: &mut B,
    volume: &Volume,
    mut record: DirectoryRecord,
    parent_path: &str,
) -> Result<Option<DirectoryEntry>> {
    if record.identifier.is_special() {
        return Ok(None);
    }

    let mut rock_ridge = None;
    if volume.uses_rock_ridge() && !record.system_use.is_empty() {
        let entries = susp::parse_system_use(
            block_io,
            volume.start_lba(),
            &record.system_use,
            volume.susp_skip() as usize,
        )?;
        rock_ridge = rock_ridge::interpret(&entries);
    }

    if let Some(rr) = &rock_ridge {
        if rr.relocated {
            return Ok(None);
        }
        if let Some(child_extent) = rr.child_link {
            // deep-tree relocation: the real directory lives behind the child link
            record.extent_lba = child_extent;
        }
    }

    let mut name = record.identifier.as_str().to_string();
    if !volume.uses_joliet() && volume.options().strip_version {
        name = strip_version(&name).to_string();
    }
    if let Some(alt) = rock_ridge.as_ref().and_then(|rr| rr.name.clone()) {
        name = alt;
    }

    Ok(Some(DirectoryEntry {
        record,
        name,
        parent_path: parent_path.to_string(),
        rock_ridge,
        children: None,
    }))
}

/// Read the children of a directory entry, in on-disk order.
///
/// `.` and `..` are never emitted. Decode failures are reported against the
/// directory's path.
pub fn read_children<B: BlockIo>(
    block_io: &mut B,
    volume: &Volume,
    dir: &DirectoryEntry,
) -> Result<Vec<DirectoryEntry>> {
    if !dir.is_dir() {
        return Err(Iso9660Error::InvalidPath);
    }
    let dir_path = dir.path();
    let mut children = Vec::new();
    let records = DirectoryIterator::new(block_io, volume, dir.record())?;
    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!("bad directory record under {dir_path}: {err}");
                return Err(err);
            }
        };
        if let Some(entry) = entry_from_record(block_io, volume, record, &dir_path)? {
            children.push(entry);
        }
    }
    Ok(children)
}

/// Enumerate every entry of the active hierarchy in preorder.
///
/// The root entry comes first; within a directory, children appear in
/// on-disk order. Each directory extent is visited at most once, so
/// malformed self-referential trees terminate.
pub fn walk<B: BlockIo>(block_io: &mut B, volume: &Volume) -> Result<Vec<DirectoryEntry>> {
    let root = volume.root();
    let mut visited = BTreeSet::new();
    visited.insert(root.record().extent_lba);
    let mut entries = Vec::new();
    entries.push(root.clone());
    walk_into(block_io, volume, &root, &mut visited, &mut entries)?;
    Ok(entries)
}

fn walk_into<B: BlockIo>(
    block_io: &mut B,
    volume: &Volume,
    dir: &DirectoryEntry,
    visited: &mut BTreeSet<u32>,
    entries: &mut Vec<DirectoryEntry>,
) -> Result<()> {
    for child in read_children(block_io, volume, dir)? {
        entries.push(child.clone());
        if child.is_dir() {
            if !visited.insert(child.record().extent_lba) {
                // already walked; malformed images may loop back
                continue;
            }
            walk_into(block_io, volume, &child, visited, entries)?;
        }
    }
    Ok(())
}

/// Find a file or directory by path
///
/// Navigates the active hierarchy from the root. Plain ISO9660 names match
/// case-insensitively, with or without the `";1"` version suffix; Joliet and
/// Rock Ridge names match exactly. Both `/` and `\` separate components.
///
/// # Example
/// ```ignore
/// use isofs::{mount, find_file};
///
/// let volume = mount(&mut block_io, 0)?;
/// let file = find_file(&mut block_io, &volume, "/boot/vmlinuz")?;
/// println!("File size: {} bytes", file.size());
/// ```
pub fn find_file<B: BlockIo>(
    block_io: &mut B,
    volume: &Volume,
    path: &str,
) -> Result<DirectoryEntry> {
    let components: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    if components.iter().any(|c| *c == "..") {
        return Err(Iso9660Error::InvalidPath);
    }
    if components.len() > MAX_DIRECTORY_DEPTH {
        return Err(Iso9660Error::PathTooLong);
    }

    let mut current = volume.root();
    if components.is_empty() {
        return Ok(current);
    }

    for (depth, component) in components.iter().enumerate() {
        let is_last = depth == components.len() - 1;
        let children = read_children(block_io, volume, &current)?;
        let found = children
            .into_iter()
            .find(|entry| name_matches(volume, entry.name(), component));
        match found {
            Some(entry) => {
                if is_last {
                    return Ok(entry);
                }
                if !entry.is_dir() {
                    return Err(Iso9660Error::NotFound);
                }
                current = entry;
            }
            None => return Err(Iso9660Error::NotFound),
        }
    }
    Err(Iso9660Error::NotFound)
}

fn name_matches(volume: &Volume, entry_name: &str, component: &str) -> bool {
    if entry_name == component {
        return true;
    }
    if volume.uses_joliet() || volume.uses_rock_ridge() {
        return false;
    }
    entry_name.eq_ignore_ascii_case(component)
        || strip_version(entry_name).eq_ignore_ascii_case(component)
}
