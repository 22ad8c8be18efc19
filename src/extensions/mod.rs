//! ISO9660 extension support
//!
//! The SUSP framework carries tagged entries in each directory record's
//! system-use area; Rock Ridge interprets a subset of those entries.

pub mod rock_ridge;
pub mod susp;
