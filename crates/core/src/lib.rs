//! Shopfront Core - Shared types library.
//!
//! This crate provides the domain types used by the Shopfront client crates:
//! - `client` - Client-side data layer (reactive store, catalog cache, cart)
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and phone numbers, plus the
//!   catalog and order records returned by the store backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
