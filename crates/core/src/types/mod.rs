//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod customer;
pub mod id;
pub mod order;
pub mod phone;
pub mod price;
pub mod status;

pub use catalog::{Brand, CatalogEntity, Collection, EntityKind, Pack, PackItem, Product, StoreProfile};
pub use customer::Customer;
pub use id::*;
pub use order::{NewOrder, NewOrderLine, Order, OrderLine};
pub use phone::{Phone, PhoneError};
pub use price::{CurrencyCode, Price};
pub use status::*;
