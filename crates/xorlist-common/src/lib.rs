//! xorlist common types, errors, and configuration.
//!
//! This crate provides shared definitions used across all xorlist components.

pub mod address;
pub mod config;
pub mod error;

pub use address::{combine, Address};
pub use config::{ListConfig, DEFAULT_BLOCK_SIZE, DEFAULT_GROWTH_RATE};
pub use error::{Result, XorListError};
