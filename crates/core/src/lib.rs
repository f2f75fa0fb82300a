//! Prime Fix Core - Shared types library.
//!
//! This crate provides common types used across the Prime Fix components:
//! - `storefront` - Cart, wishlist, pricing and checkout engine
//! - `cli` - Terminal client driving the storefront engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, products and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
