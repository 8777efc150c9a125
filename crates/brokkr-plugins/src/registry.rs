//! Plugin registry management
//!
//! The registry is the single owned table of plugin records for a host
//! session. It is pure in-memory state: records are created by the spec
//! normalizer, mutated in place by the activation state machine, and
//! never deleted while the session lives. Registration order is kept
//! because resolution breaks priority ties with it.

use brokkr_core::types::{PluginRecord, PluginState, RegistrySnapshot};
use std::collections::HashMap;
use tracing::debug;

/// In-memory plugin registry with stable registration order
pub struct PluginRegistry {
    /// Records keyed by plugin id
    records: HashMap<String, PluginRecord>,

    /// Plugin ids in first-registration order
    order: Vec<String>,
}

impl PluginRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Insert a record, replacing any prior record with the same id
    ///
    /// Last write wins. A replaced plugin keeps its original position in
    /// the registration order so tie-breaking stays stable across
    /// re-registration. Returns true when an existing record was replaced.
    pub fn insert(&mut self, record: PluginRecord) -> bool {
        let id = record.spec.id.clone();
        let replaced = self.records.insert(id.clone(), record).is_some();
        if replaced {
            debug!("Replaced existing registry record for '{}'", id);
        } else {
            self.order.push(id);
        }
        replaced
    }

    /// Get a record by id
    pub fn get(&self, id: &str) -> Option<&PluginRecord> {
        self.records.get(id)
    }

    /// Get a mutable record by id
    pub fn get_mut(&mut self, id: &str) -> Option<&mut PluginRecord> {
        self.records.get_mut(id)
    }

    /// Check if a plugin is registered
    pub fn has(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Number of registered plugins
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Plugin ids in registration order
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Position of a plugin in the registration order
    pub fn registration_index(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|known| known == id)
    }

    /// Iterate records in registration order
    pub fn records(&self) -> impl Iterator<Item = &PluginRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Ids of enabled plugins, in registration order
    pub fn enabled_ids(&self) -> Vec<String> {
        self.records()
            .filter(|record| record.metadata.enabled)
            .map(|record| record.spec.id.clone())
            .collect()
    }

    /// Declared dependencies of a plugin, raw (ids or locators)
    pub fn dependencies_of(&self, id: &str) -> Vec<String> {
        self.records
            .get(id)
            .map(|record| record.metadata.dependencies.clone())
            .unwrap_or_default()
    }

    /// Current state of a plugin
    pub fn state_of(&self, id: &str) -> Option<PluginState> {
        self.records.get(id).map(|record| record.state)
    }

    /// Set the state of a plugin, clearing any stale error on non-failed
    /// states
    pub fn set_state(&mut self, id: &str, state: PluginState) {
        if let Some(record) = self.records.get_mut(id) {
            record.state = state;
            if state != PluginState::Failed {
                record.error = None;
            }
        }
    }

    /// Record a failed activation with its captured error
    pub fn set_failed(&mut self, id: &str, error: impl Into<String>) {
        if let Some(record) = self.records.get_mut(id) {
            record.state = PluginState::Failed;
            record.error = Some(error.into());
        }
    }

    /// Read-only snapshot in registration order
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            plugins: self.records().map(|record| record.into()).collect(),
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
