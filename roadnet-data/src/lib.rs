//! Format converters for the roadnet map store.
//!
//! Responsibilities:
//! - Load and write the line-oriented text dump format.
//! - Project vendor JSON exports into the store's three entity kinds.
//!
//! Boundaries:
//! - No query or mutation semantics (live in `roadnet-core`).
//! - Converters build a complete [`roadnet_core::MapData`] or fail on the
//!   first malformed record; there is no partial-load recovery.

#![forbid(unsafe_code)]

pub mod dump;
mod fs;
pub mod vendor;

pub use dump::{DumpError, load_dump, parse_dump, render_dump, write_dump};
pub use vendor::{
    VendorError, VendorNodeInfo, VendorRecord, convert_vendor_file, convert_vendor_records,
    parse_vendor_json,
};
