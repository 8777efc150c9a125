//! # brokkr-core
//!
//! Core library for Brokkr providing:
//! - Plugin spec input shapes and canonical record types
//! - Activation state and trigger declarations
//! - The shared error taxonomy

pub mod error;
pub mod types;

pub use error::{Error, Result};
