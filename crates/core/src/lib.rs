//! Ethical AI Knowledge Base Core - Shared types library.
//!
//! This crate provides the types shared by every Knowledge Base component:
//! - `gateway` - Edge access-control service (CORS, route gating, identity)
//! - `cli` - Operator tooling for role management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Role claims and validated subject identifiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
