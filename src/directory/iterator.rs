//! Directory iteration
//!
//! Iterates the raw records of one directory extent. The extent is read up
//! front so iteration itself never touches the device.

use alloc::vec;
use alloc::vec::Vec;

use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;
use crate::utils::sector::sectors_for_bytes;
use crate::volume::Volume;

/// Iterator over the directory records of one extent
///
/// Yields every record, including the `.` and `..` specials.
pub struct DirectoryIterator {
    buffer: Vec<u8>,
    limit: usize,
    offset: usize,
    joliet: bool,
}

impl DirectoryIterator {
    /// Read `dir`'s extent and create an iterator over its records
    pub fn new<B: BlockIo>(
        block_io: &mut B,
        volume: &Volume,
        dir: &DirectoryRecord,
    ) -> Result<Self> {
        let sectors = sectors_for_bytes(dir.data_length) as usize;
        let mut buffer = vec![0u8; sectors * SECTOR_SIZE];
        if sectors > 0 {
            block_io
                .read_blocks(Lba(volume.start_lba() + dir.data_lba() as u64), &mut buffer)
                .map_err(|_| Iso9660Error::Io)?;
        }
        Ok(Self {
            buffer,
            limit: dir.data_length as usize,
            offset: 0,
            joliet: volume.uses_joliet(),
        })
    }
}

impl Iterator for DirectoryIterator {
    type Item = Result<DirectoryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.offset < self.limit {
            if self.buffer[self.offset] == 0 {
                // records never span sectors; the rest of this sector is padding
                self.offset = (self.offset / SECTOR_SIZE + 1) * SECTOR_SIZE;
                continue;
            }
            let sector_end = ((self.offset / SECTOR_SIZE + 1) * SECTOR_SIZE).min(self.limit);
            return match DirectoryRecord::parse(&self.buffer[self.offset..sector_end], self.joliet)
            {
                Ok(record) => {
                    self.offset += record.length as usize;
                    Some(Ok(record))
                }
                Err(err) => {
                    self.offset = self.limit;
                    Some(Err(err))
                }
            };
        }
        None
    }
}
