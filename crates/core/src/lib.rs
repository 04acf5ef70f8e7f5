//! Ayucan Core - Shared types library.
//!
//! This crate provides the types and the few numeric routines shared by the
//! Ayucan admin components:
//! - `admin` - Server-rendered administration dashboard
//! - `integration-tests` - End-to-end tests against a fake backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Everything authoritative lives in the remote backend; the two
//! routines computed locally are the offline-invoice totals and the
//! amount-in-words conversion printed on invoices.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, statuses and contact details
//! - [`invoice`] - GST invoice totals and Indian-numbering amount in words

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod invoice;
pub mod types;

pub use types::*;
