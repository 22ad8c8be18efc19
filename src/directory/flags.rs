//! Directory record file flags

use bitflags::bitflags;

bitflags! {
    /// File flags byte of a directory record
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileFlags: u8 {
        /// Entry should be hidden from the user
        const EXISTENCE = 1 << 0;
        /// Entry is a directory
        const DIRECTORY = 1 << 1;
        /// Entry is an associated file
        const ASSOCIATED = 1 << 2;
        /// Record format is described by the extended attribute record
        const RECORD = 1 << 3;
        /// Permissions are recorded in the extended attribute record
        const PROTECTION = 1 << 4;
        /// Not the final record for this file's data
        const MULTI_EXTENT = 1 << 7;
    }
}

impl FileFlags {
    /// Is the directory bit set?
    pub fn is_directory(self) -> bool {
        self.contains(Self::DIRECTORY)
    }

    /// Is the existence (hidden) bit set?
    pub fn is_hidden(self) -> bool {
        self.contains(Self::EXISTENCE)
    }

    /// Is this an associated file?
    pub fn is_associated(self) -> bool {
        self.contains(Self::ASSOCIATED)
    }

    /// Does the file's data continue in another record?
    pub fn is_multi_extent(self) -> bool {
        self.contains(Self::MULTI_EXTENT)
    }
}
