//! Autorithm Core - Shared types library.
//!
//! This crate provides common types used across all Autorithm components:
//! - `auth` - Authentication layer (credential store, session context, guards)
//! - integration tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
