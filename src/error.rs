//! Error types for ISO9660 operations

use core::fmt;

/// Result type for ISO9660 operations
pub type Result<T> = core::result::Result<T, Iso9660Error>;

/// Errors that can occur while reading an ISO9660 image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iso9660Error {
    /// Byte source is smaller than the system area plus one descriptor
    SourceTooSmall,

    /// No valid ISO9660 descriptor at sector 16
    NotAnIso9660Image,

    /// Descriptor set ended without a set terminator
    MissingTerminator,

    /// LSB and MSB copies of a dual-endian integer disagree
    EncodingMismatch,

    /// Timestamp field out of range
    InvalidTimestamp,

    /// Directory record extends past its container
    ShortRecord,

    /// Path table record extends past the table
    ShortPathRecord,

    /// Extended attribute record extends past its buffer
    ShortExtendedAttr,

    /// System-use entry extends past its area
    TruncatedSuspEntry,

    /// Malformed `ER` extension reference
    InvalidErRecord,

    /// Joliet identifier is not valid UCS-2 or uses a forbidden character
    InvalidJolietName,

    /// File identifier contains a control byte
    InvalidIdentifierChar,

    /// SUSP continuation chain revisits a block
    CircularContinuation,

    /// File or directory not found
    NotFound,

    /// Path exceeds the maximum directory depth
    PathTooLong,

    /// Invalid path format
    InvalidPath,

    /// I/O error reading from the byte source
    Io,
}

impl fmt::Display for Iso9660Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceTooSmall => write!(f, "byte source too small for an ISO9660 image"),
            Self::NotAnIso9660Image => write!(f, "no ISO9660 volume descriptor at sector 16"),
            Self::MissingTerminator => write!(f, "volume descriptor set terminator missing"),
            Self::EncodingMismatch => write!(f, "dual-endian integer copies disagree"),
            Self::InvalidTimestamp => write!(f, "timestamp field out of range"),
            Self::ShortRecord => write!(f, "directory record truncated"),
            Self::ShortPathRecord => write!(f, "path table record truncated"),
            Self::ShortExtendedAttr => write!(f, "extended attribute record truncated"),
            Self::TruncatedSuspEntry => write!(f, "system-use entry truncated"),
            Self::InvalidErRecord => write!(f, "malformed ER extension reference"),
            Self::InvalidJolietName => write!(f, "invalid Joliet file identifier"),
            Self::InvalidIdentifierChar => write!(f, "invalid character in file identifier"),
            Self::CircularContinuation => write!(f, "circular SUSP continuation chain"),
            Self::NotFound => write!(f, "file or directory not found"),
            Self::PathTooLong => write!(f, "path exceeds maximum depth"),
            Self::InvalidPath => write!(f, "invalid path format"),
            Self::Io => write!(f, "I/O error reading byte source"),
        }
    }
}
