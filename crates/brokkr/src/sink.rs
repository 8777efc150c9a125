//! Host trigger sink for one-shot CLI runs
//!
//! The CLI has no long-lived event loop, so trigger registrations are
//! logged rather than wired to live signal sources. Handles stay unique
//! for the life of the process, which keeps sibling deregistration in
//! the registrar honest.

use brokkr_core::types::{KeyBinding, ReplayAction, TriggerHandle};
use brokkr_core::Result;
use brokkr_plugins::TriggerSink;
use tracing::{debug, info};

/// Trigger sink that records registrations in the log only
pub struct LoggingSink {
    next_handle: u64,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self { next_handle: 0 }
    }

    fn issue(&mut self, plugin: &str, what: String) -> Result<TriggerHandle> {
        self.next_handle += 1;
        let handle = TriggerHandle(self.next_handle);
        debug!("'{}' registered {} as trigger {}", plugin, what, handle);
        Ok(handle)
    }
}

impl Default for LoggingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerSink for LoggingSink {
    fn register_event(&mut self, plugin: &str, pattern: &str) -> Result<TriggerHandle> {
        self.issue(plugin, format!("event '{}'", pattern))
    }

    fn register_command(&mut self, plugin: &str, name: &str) -> Result<TriggerHandle> {
        self.issue(plugin, format!("command '{}'", name))
    }

    fn register_filetype(&mut self, plugin: &str, filetype: &str) -> Result<TriggerHandle> {
        self.issue(plugin, format!("filetype '{}'", filetype))
    }

    fn register_keys(&mut self, plugin: &str, sequence: &str) -> Result<TriggerHandle> {
        self.issue(plugin, format!("keys '{}'", sequence))
    }

    fn register_ready(&mut self, plugin: &str) -> Result<TriggerHandle> {
        self.issue(plugin, "the readiness signal".to_string())
    }

    fn deregister(&mut self, handle: TriggerHandle) -> Result<()> {
        debug!("Deregistered trigger {}", handle);
        Ok(())
    }

    fn apply_keymap(&mut self, plugin: &str, binding: &KeyBinding) -> Result<()> {
        debug!(
            "'{}' bound keys '{}' to '{}'",
            plugin, binding.keys, binding.action
        );
        Ok(())
    }

    fn apply_setup(&mut self, plugin: &str, _payload: &serde_json::Value) -> Result<()> {
        debug!("'{}' received its setup payload", plugin);
        Ok(())
    }

    fn schedule(&mut self, action: ReplayAction) -> Result<()> {
        info!("Queued replay {:?} for the next host turn", action);
        Ok(())
    }
}
