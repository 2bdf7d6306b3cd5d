//! Bastion Types - Shared domain types
//!
//! This crate contains domain types used across Bastion crates:
//! - Principal identity
//! - Roles and permissions (authorities)

pub mod authority;
pub mod principal;

pub use authority::*;
pub use principal::*;
