//! Core types for Ayucan.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod money;
pub mod status;

pub use contact::{ContactError, Email, Phone};
pub use id::*;
pub use money::Money;
pub use status::*;
