//! Package installer adapters
//!
//! The registry core owns no fetch behavior; these adapters supply it
//! through the installer capability.

mod git;

pub use git::GitInstaller;
