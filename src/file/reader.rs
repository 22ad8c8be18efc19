//! Positioned file reading

use gpt_disk_io::BlockIo;

use crate::directory::DirectoryEntry;
use crate::error::{Iso9660Error, Result};
use crate::file::extent::Extent;
use crate::types::SECTOR_SIZE;
use crate::volume::Volume;

/// Reader with a seekable position over one file's extent
pub struct FileReader<'a, B: BlockIo> {
    block_io: &'a mut B,
    start_lba: u64,
    extent: Extent,
    position: u64,
}

impl<'a, B: BlockIo> FileReader<'a, B> {
    /// Create a reader over `file`'s extent
    pub fn new(block_io: &'a mut B, volume: &Volume, file: &DirectoryEntry) -> Self {
        Self {
            block_io,
            start_lba: volume.start_lba(),
            extent: file.extent(),
            position: 0,
        }
    }

    /// Read bytes from the current position, advancing it.
    ///
    /// Returns the number of bytes read; 0 at end of file.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let remaining = (self.extent.length as u64).saturating_sub(self.position);
        let wanted = core::cmp::min(buffer.len() as u64, remaining) as usize;
        if wanted == 0 {
            return Ok(0);
        }

        let mut copied = 0usize;
        let mut bounce = [0u8; SECTOR_SIZE];
        while copied < wanted {
            let pos = self.position + copied as u64;
            let sector = (pos / SECTOR_SIZE as u64) as u32;
            let in_sector = (pos % SECTOR_SIZE as u64) as usize;
            let chunk = core::cmp::min(SECTOR_SIZE - in_sector, wanted - copied);

            self.block_io
                .read_blocks(self.extent.device_lba(self.start_lba, sector), &mut bounce)
                .map_err(|_| Iso9660Error::Io)?;
            buffer[copied..copied + chunk].copy_from_slice(&bounce[in_sector..in_sector + chunk]);
            copied += chunk;
        }

        self.position += copied as u64;
        Ok(copied)
    }

    /// Seek to an absolute position within the file
    pub fn seek(&mut self, pos: u64) {
        self.position = pos;
    }

    /// Get current position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Get file size
    pub fn size(&self) -> u64 {
        self.extent.length as u64
    }
}
