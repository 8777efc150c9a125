//! Type definitions for Brokkr plugin specs and registry records

mod action_types;
mod installer_types;
mod plugin_types;
mod trigger_types;

pub use action_types::*;
pub use installer_types::*;
pub use plugin_types::*;
pub use trigger_types::*;
