//! File reading from extent-based storage

pub mod extent;
pub mod reader;

use alloc::vec;

use gpt_disk_io::BlockIo;

use crate::directory::DirectoryEntry;
use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;
use crate::volume::Volume;

use extent::Extent;

/// Maximum sectors to read in a single I/O operation
/// 512 sectors = 1MB per read, sized for large payloads like kernel images
const MAX_SECTORS_PER_READ: usize = 512;

impl DirectoryEntry {
    /// The entry's data extent.
    ///
    /// Starts past any extended attribute record; Rock Ridge never changes
    /// the location or length.
    pub fn extent(&self) -> Extent {
        Extent::new(self.record().data_lba(), self.record().data_length)
    }
}

/// Read file contents into a buffer
///
/// Reads file data from the block device into the provided buffer.
/// Returns the number of bytes actually read (may be less if the file is
/// smaller than the buffer). Uses bulk reads for large files.
///
/// # Example
/// ```ignore
/// use isofs::{mount, find_file, read_file};
///
/// let volume = mount(&mut block_io, 0)?;
/// let file = find_file(&mut block_io, &volume, "/boot/vmlinuz")?;
/// let mut buffer = vec![0u8; file.size() as usize];
/// read_file(&mut block_io, &volume, &file, &mut buffer)?;
/// ```
pub fn read_file<B: BlockIo>(
    block_io: &mut B,
    volume: &Volume,
    file: &DirectoryEntry,
    buffer: &mut [u8],
) -> Result<usize> {
    let extent = file.extent();
    let bytes_to_read = core::cmp::min(buffer.len(), extent.length as usize);
    if bytes_to_read == 0 {
        return Ok(0);
    }

    let total_sectors = bytes_to_read.div_ceil(SECTOR_SIZE);

    // Read in chunks of MAX_SECTORS_PER_READ for efficiency
    let mut sectors_read = 0usize;
    while sectors_read < total_sectors {
        let remaining_sectors = total_sectors - sectors_read;
        let chunk_sectors = core::cmp::min(remaining_sectors, MAX_SECTORS_PER_READ);
        let chunk_bytes = chunk_sectors * SECTOR_SIZE;

        let buf_offset = sectors_read * SECTOR_SIZE;
        let buf_end = core::cmp::min(buf_offset + chunk_bytes, bytes_to_read);
        let remaining_buf = buf_end - buf_offset;

        let lba = extent.device_lba(volume.start_lba(), sectors_read as u32);
        if remaining_buf >= chunk_bytes {
            // Can read directly into the caller's buffer
            block_io
                .read_blocks(lba, &mut buffer[buf_offset..buf_offset + chunk_bytes])
                .map_err(|_| Iso9660Error::Io)?;
        } else {
            // Last partial chunk needs a bounce buffer for the full sectors
            let mut temp = vec![0u8; chunk_bytes];
            block_io
                .read_blocks(lba, &mut temp)
                .map_err(|_| Iso9660Error::Io)?;
            buffer[buf_offset..buf_end].copy_from_slice(&temp[..remaining_buf]);
        }

        sectors_read += chunk_sectors;
    }

    Ok(bytes_to_read)
}

/// Read file into a new Vec (convenience function)
///
/// Allocates a Vec sized to the file and reads all contents.
pub fn read_file_vec<B: BlockIo>(
    block_io: &mut B,
    volume: &Volume,
    file: &DirectoryEntry,
) -> Result<alloc::vec::Vec<u8>> {
    let mut buffer = vec![0u8; file.size() as usize];
    read_file(block_io, volume, file, &mut buffer)?;
    Ok(buffer)
}
