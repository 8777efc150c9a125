//! Lazy-load trigger registration
//!
//! The host environment owns the actual signal sources (events, user
//! commands, content-type detection, key maps). This module talks to them
//! through the [`TriggerSink`] seam and keeps the handle bookkeeping that
//! gives every lazy plugin at-most-once firing: the first signal consumes
//! the fired registration and all of its siblings before activation runs.

use brokkr_core::types::{
    FireContext, KeyBinding, LazyTrigger, PluginRecord, ReplayAction, TriggerHandle, TriggerKind,
};
use brokkr_core::Result;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Host seam for trigger registration and deferred work
///
/// The registry holds only opaque handles; the host supplies the concrete
/// wiring. `schedule` queues work for a later turn of the host loop, which
/// is how replays stay ordered after activation's side effects.
pub trait TriggerSink: Send + Sync {
    /// Register an event-triggered callback
    fn register_event(&mut self, plugin: &str, pattern: &str) -> Result<TriggerHandle>;

    /// Register a command-triggered callback
    fn register_command(&mut self, plugin: &str, name: &str) -> Result<TriggerHandle>;

    /// Register a content-type-triggered callback
    fn register_filetype(&mut self, plugin: &str, filetype: &str) -> Result<TriggerHandle>;

    /// Register a key-sequence-triggered callback
    fn register_keys(&mut self, plugin: &str, sequence: &str) -> Result<TriggerHandle>;

    /// Register a callback fired once the host reports readiness
    fn register_ready(&mut self, plugin: &str) -> Result<TriggerHandle>;

    /// Deregister a previously issued handle
    fn deregister(&mut self, handle: TriggerHandle) -> Result<()>;

    /// Register a post-activation key binding
    fn apply_keymap(&mut self, plugin: &str, binding: &KeyBinding) -> Result<()>;

    /// Deliver a structured setup payload to a plugin's configuration
    /// entry point
    fn apply_setup(&mut self, plugin: &str, payload: &serde_json::Value) -> Result<()>;

    /// Queue an action to run on a later turn of the host loop
    fn schedule(&mut self, action: ReplayAction) -> Result<()>;
}

/// Live binding between one issued handle and its plugin trigger
#[derive(Debug, Clone)]
pub struct TriggerBinding {
    /// Plugin the trigger belongs to
    pub plugin: String,

    /// The trigger declaration that was registered
    pub trigger: LazyTrigger,
}

/// Handle bookkeeping for registered lazy triggers
pub struct TriggerRegistrar {
    /// Live bindings by handle
    bindings: HashMap<TriggerHandle, TriggerBinding>,

    /// Handles per plugin, for sibling deregistration
    by_plugin: HashMap<String, Vec<TriggerHandle>>,
}

impl TriggerRegistrar {
    /// Create an empty registrar
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            by_plugin: HashMap::new(),
        }
    }

    /// Register one handler per declared trigger of a lazy plugin
    ///
    /// Returns the number of registrations issued.
    pub fn register_lazy(
        &mut self,
        sink: &mut dyn TriggerSink,
        record: &PluginRecord,
    ) -> Result<usize> {
        let plugin = record.spec.id.as_str();
        let mut count = 0;

        for trigger in &record.metadata.triggers {
            let handle = match &trigger.on {
                TriggerKind::Event(pattern) => sink.register_event(plugin, pattern)?,
                TriggerKind::Command(name) => sink.register_command(plugin, name)?,
                TriggerKind::Filetype(filetype) => sink.register_filetype(plugin, filetype)?,
                TriggerKind::Keys(sequence) => sink.register_keys(plugin, sequence)?,
                TriggerKind::Ready => sink.register_ready(plugin)?,
            };

            debug!("Registered {} for '{}' as {}", trigger.on, plugin, handle);
            self.bindings.insert(
                handle,
                TriggerBinding {
                    plugin: plugin.to_string(),
                    trigger: trigger.clone(),
                },
            );
            self.by_plugin
                .entry(plugin.to_string())
                .or_default()
                .push(handle);
            count += 1;
        }

        Ok(count)
    }

    /// Whether a plugin currently has live trigger registrations
    pub fn has_bindings(&self, plugin: &str) -> bool {
        self.by_plugin
            .get(plugin)
            .is_some_and(|handles| !handles.is_empty())
    }

    /// Consume a fired handle
    ///
    /// Returns the binding plus every sibling handle of the same plugin
    /// (the fired one included), all removed from the tables. A handle that
    /// is no longer live returns None, which makes late double-fires
    /// harmless.
    pub fn take_fired(
        &mut self,
        handle: TriggerHandle,
    ) -> Option<(TriggerBinding, Vec<TriggerHandle>)> {
        let binding = self.bindings.remove(&handle)?;
        let siblings = self.remove_plugin(&binding.plugin);
        Some((binding, siblings))
    }

    /// Remove every live handle of a plugin from the tables
    ///
    /// Used when a plugin is activated manually while still waiting on its
    /// triggers. Returns the removed handles so the caller can deregister
    /// them at the sink.
    pub fn remove_plugin(&mut self, plugin: &str) -> Vec<TriggerHandle> {
        let handles = self.by_plugin.remove(plugin).unwrap_or_default();
        for handle in &handles {
            self.bindings.remove(handle);
        }
        handles
    }

    /// Handles registered for the ready category, across all plugins
    pub fn ready_handles(&self) -> Vec<TriggerHandle> {
        let mut handles: Vec<TriggerHandle> = self
            .bindings
            .iter()
            .filter(|(_, binding)| binding.trigger.on == TriggerKind::Ready)
            .map(|(handle, _)| *handle)
            .collect();
        handles.sort();
        handles
    }

    /// Deregister handles at the sink, logging failures without aborting
    pub fn deregister_all(&self, sink: &mut dyn TriggerSink, handles: &[TriggerHandle]) {
        for handle in handles {
            if let Err(e) = sink.deregister(*handle) {
                warn!("Failed to deregister trigger {}: {}", handle, e);
            }
        }
    }
}

impl Default for TriggerRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

/// Replay to re-issue after a successful trigger-driven activation
///
/// An explicit replay attached to the trigger wins; otherwise command and
/// key fires replay themselves and the remaining categories replay nothing.
pub fn replay_for(binding: &TriggerBinding, fire: &FireContext) -> Option<ReplayAction> {
    binding
        .trigger
        .replay
        .clone()
        .or_else(|| fire.default_replay())
}
