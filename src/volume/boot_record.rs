//! Boot Record volume descriptor
//!
//! Only presence is interpreted here: an El Torito boot record announces
//! itself through its boot system identifier. Catalog parsing is a consumer
//! concern.

use alloc::string::String;

use crate::error::{Iso9660Error, Result};
use crate::utils::string;

/// System identifier written by El Torito boot records
pub const EL_TORITO_SYSTEM_ID: &str = "EL TORITO SPECIFICATION";

/// Boot Record volume descriptor (type 0)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootRecord {
    /// Descriptor version byte
    pub version: u8,

    /// Boot system identifier (bytes 7..39)
    pub boot_system_identifier: String,

    /// Boot identifier (bytes 39..71)
    pub boot_identifier: String,
}

impl BootRecord {
    /// Does this boot record announce an El Torito boot catalog?
    pub fn is_el_torito(&self) -> bool {
        self.boot_system_identifier == EL_TORITO_SYSTEM_ID
    }
}

/// Parse a Boot Record descriptor from one 2048-byte sector
pub fn parse(data: &[u8]) -> Result<BootRecord> {
    if data.len() < 71 {
        return Err(Iso9660Error::NotAnIso9660Image);
    }
    Ok(BootRecord {
        version: data[6],
        boot_system_identifier: string::decode_text(string::trim_trailing_nuls(&data[7..39])),
        boot_identifier: string::decode_text(string::trim_trailing_nuls(&data[39..71])),
    })
}
