//! Core types for the Knowledge Base.
//!
//! This module provides type-safe wrappers for identity concepts.

pub mod role;
pub mod uid;

pub use role::{Role, RoleError};
pub use uid::{Uid, UidError};
