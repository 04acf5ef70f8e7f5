//! Session-held models for admin.

pub mod session;

pub use ayucan_core::AdminRole;
pub use session::{CurrentAdmin, keys as session_keys};
