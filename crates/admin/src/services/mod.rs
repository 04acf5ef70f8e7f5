//! Business logic services for admin.
//!
//! # Services
//!
//! - `csv_export` - CSV downloads of backend listings
//! - `flash` - One-shot toast notifications carried in the session

pub mod csv_export;
pub mod flash;

pub use csv_export::{CsvRow, ExportError, csv_download, to_csv};
pub use flash::{Flash, FlashKind, set_flash, take_flash};
