//! Blockbridge Common - Shared types and status codes
//!
//! This crate provides the engine-facing integer status codes and the core
//! type aliases used across all blockbridge components.

pub mod code;
pub mod types;

pub use types::{BlockAddr, ConfigId};
