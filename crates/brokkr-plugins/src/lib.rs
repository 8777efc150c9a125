//! Plugin management for Brokkr
//!
//! This crate handles:
//! - Spec normalization into canonical registry records
//! - Dependency resolution
//! - Eager and trigger-driven (lazy) activation
//! - Lifecycle hooks and events
//! - Package installer orchestration

mod activation;

pub mod events;
pub mod hooks;
pub mod installer;
pub mod manager;
pub mod normalize;
pub mod registry;
pub mod resolver;
pub mod triggers;

pub use events::{EventEnvelope, EventSink, PluginEvent};
pub use hooks::{HookPayload, HookPhase, Hooks};
pub use installer::PackageInstaller;
pub use manager::{AddOptions, AddPhase, AddReport, FailedPlugin, PluginManager, SyncReport};
pub use registry::PluginRegistry;
pub use resolver::DependencyResolver;
pub use triggers::{TriggerBinding, TriggerRegistrar, TriggerSink};
