//! Spec entry builders for creating test fixtures

#![allow(dead_code)]

use brokkr_core::types::{
    Action, KeyBinding, LazyTrigger, SpecFields, SpecInput, TriggerKind,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Builder for table-shaped plugin entries
pub struct PluginBuilder {
    fields: SpecFields,
}

impl PluginBuilder {
    /// Start from a source locator
    pub fn new(src: &str) -> Self {
        Self {
            fields: SpecFields {
                src: Some(src.to_string()),
                ..SpecFields::default()
            },
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.fields.name = Some(name.to_string());
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.fields.version = Some(version.to_string());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.fields.priority = Some(priority);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.fields.enabled = false;
        self
    }

    pub fn lazy(mut self) -> Self {
        self.fields.lazy = true;
        self
    }

    pub fn depends_on(mut self, deps: &[&str]) -> Self {
        self.fields.dependencies = deps.iter().map(|dep| dep.to_string()).collect();
        self
    }

    pub fn on_event(mut self, pattern: &str) -> Self {
        self.fields.events.push(pattern.to_string());
        self
    }

    pub fn on_command(mut self, name: &str) -> Self {
        self.fields.commands.push(name.to_string());
        self
    }

    pub fn on_filetype(mut self, filetype: &str) -> Self {
        self.fields.filetypes.push(filetype.to_string());
        self
    }

    pub fn on_keys(mut self, sequence: &str) -> Self {
        self.fields.keys.push(sequence.to_string());
        self
    }

    pub fn on_ready(mut self) -> Self {
        self.fields.ready = true;
        self
    }

    pub fn trigger(mut self, trigger: LazyTrigger) -> Self {
        self.fields.triggers.push(trigger);
        self
    }

    pub fn build_step(mut self, action: Action) -> Self {
        self.fields.build = Some(action);
        self
    }

    pub fn configure_step(mut self, action: Action) -> Self {
        self.fields.configure = Some(action);
        self
    }

    pub fn setup_data(mut self, payload: serde_json::Value) -> Self {
        self.fields.setup = Some(brokkr_core::types::SetupPayload::Data(payload));
        self
    }

    pub fn keymap(mut self, keys: &str, action: &str) -> Self {
        self.fields.keymaps.push(KeyBinding {
            keys: keys.to_string(),
            action: action.to_string(),
            mode: None,
        });
        self
    }

    pub fn build(self) -> SpecInput {
        SpecInput::Table(self.fields)
    }
}

/// Trigger with no explicit replay
pub fn command_trigger(name: &str) -> LazyTrigger {
    LazyTrigger::new(TriggerKind::Command(name.to_string()))
}

/// Callback action that always fails with the message
pub fn failing_action(message: &str) -> Action {
    let message = message.to_string();
    Action::Func(Arc::new(move || Err(anyhow::anyhow!(message.clone()))))
}

/// Callback action that bumps a shared counter
pub fn counting_action(counter: &Arc<AtomicUsize>) -> Action {
    let counter = Arc::clone(counter);
    Action::Func(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }))
}

/// Parse an entry the way a manifest would deliver it
pub fn yaml_entry(yaml: &str) -> SpecInput {
    serde_yaml_ng::from_str(yaml).unwrap_or_else(|e| panic!("bad test entry {:?}: {}", yaml, e))
}
