//! Low-level decoding utilities

pub mod datetime;
pub mod endian;
pub mod sector;
pub mod string;

use crate::error::{Iso9660Error, Result};

/// Copy a fixed-size field out of `data` at `offset`.
///
/// Returns `short` when the field extends past the buffer. Parsed structures
/// never borrow from the I/O buffer they were decoded from.
pub(crate) fn field<const N: usize>(
    data: &[u8],
    offset: usize,
    short: Iso9660Error,
) -> Result<[u8; N]> {
    let end = offset.checked_add(N).ok_or(short)?;
    let slice = data.get(offset..end).ok_or(short)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}
