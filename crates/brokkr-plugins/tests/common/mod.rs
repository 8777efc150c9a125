//! Common test utilities for brokkr-plugins
//!
//! This module provides shared test infrastructure including:
//! - Spec builders for creating plugin entries
//! - Recording doubles for the trigger sink and package installer

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod mocks;

pub use builders::*;
pub use mocks::*;
