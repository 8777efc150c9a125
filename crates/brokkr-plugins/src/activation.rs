//! Plugin activation
//!
//! Walks one plugin and its dependency closure through the
//! registered/lazy-pending -> loading -> configured|failed transitions.
//! Dependency failures are recorded but never escalated to the dependent,
//! so one broken plugin cannot take the rest of the registry down with it.

use crate::events::{EventEnvelope, EventSink, PluginEvent};
use crate::hooks::{HookPayload, HookPhase, Hooks};
use crate::normalize::dependency_id;
use crate::registry::PluginRegistry;
use crate::triggers::TriggerSink;
use brokkr_core::types::{Action, ActionFn, PluginState, SetupPayload};
use brokkr_core::{Error, Result};
use camino::Utf8Path;
use std::collections::HashSet;
use std::process::Command;
use std::time::Instant;
use tracing::{debug, warn};

/// Single-activation engine borrowed out of the manager for one call
pub(crate) struct Activator<'a> {
    registry: &'a mut PluginRegistry,
    hooks: &'a Hooks,
    sink: &'a mut dyn TriggerSink,
    events: Option<&'a EventSink>,
    loading: &'a mut HashSet<String>,
    store_dir: Option<&'a Utf8Path>,
}

impl<'a> Activator<'a> {
    pub(crate) fn new(
        registry: &'a mut PluginRegistry,
        hooks: &'a Hooks,
        sink: &'a mut dyn TriggerSink,
        events: Option<&'a EventSink>,
        loading: &'a mut HashSet<String>,
        store_dir: Option<&'a Utf8Path>,
    ) -> Self {
        Self {
            registry,
            hooks,
            sink,
            events,
            loading,
            store_dir,
        }
    }

    /// Activate a plugin, dependencies first
    ///
    /// Already-configured plugins and plugins whose activation previously
    /// failed are no-ops. The loading set cuts re-entrant calls, so
    /// dependency cycles that slipped past resolution cannot recurse
    /// forever.
    pub(crate) fn activate(&mut self, id: &str) -> Result<()> {
        let record = self.registry.get(id).ok_or_else(|| Error::not_found(id))?;

        match record.state {
            PluginState::Configured => {
                debug!("Plugin '{}' is already configured", id);
                return Ok(());
            }
            PluginState::Failed => {
                debug!("Plugin '{}' previously failed, not retrying", id);
                return Ok(());
            }
            PluginState::Registered | PluginState::LazyPending | PluginState::Loading => {}
        }

        if self.loading.contains(id) {
            return Ok(());
        }

        if !record.metadata.enabled {
            debug!("Plugin '{}' is disabled, skipping activation", id);
            return Ok(());
        }

        let state_before = record.state;
        let spec = record.spec.clone();
        let dependencies = record.metadata.dependencies.clone();

        self.loading.insert(id.to_string());
        self.registry.set_state(id, PluginState::Loading);
        self.publish(
            Some(state_before),
            Some(PluginState::Loading),
            PluginEvent::ActivationStarted {
                plugin: id.to_string(),
            },
        );

        for dep in &dependencies {
            let dep_id = dependency_id(dep);
            if let Err(e) = self.activate(&dep_id) {
                warn!("Dependency '{}' of '{}' failed: {}", dep_id, id, e);
            }
        }

        self.hooks.dispatch(&HookPayload::new(
            HookPhase::PreActivation,
            vec![id.to_string()],
            vec![spec.clone()],
        ));

        let started = Instant::now();
        let result = self.configure_plugin(id);
        self.loading.remove(id);

        match result {
            Ok(()) => {
                self.registry.set_state(id, PluginState::Configured);
                self.publish(
                    Some(PluginState::Loading),
                    Some(PluginState::Configured),
                    PluginEvent::ActivationCompleted {
                        plugin: id.to_string(),
                        duration_ms: started.elapsed().as_millis() as u64,
                    },
                );
                self.hooks.dispatch(&HookPayload::new(
                    HookPhase::PostActivation,
                    vec![id.to_string()],
                    vec![spec],
                ));
                debug!("Plugin '{}' configured", id);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.registry.set_failed(id, &message);
                warn!("Activation of '{}' failed: {}", id, message);
                self.publish(
                    Some(PluginState::Loading),
                    Some(PluginState::Failed),
                    PluginEvent::ActivationFailed {
                        plugin: id.to_string(),
                        error_message: message,
                    },
                );
                Err(e)
            }
        }
    }

    /// Run the build, setup, configure, and keymap steps in order
    fn configure_plugin(&mut self, id: &str) -> Result<()> {
        let metadata = match self.registry.get(id) {
            Some(record) => record.metadata.clone(),
            None => return Err(Error::not_found(id)),
        };

        if let Some(build) = &metadata.build {
            self.run_action(id, "build", build)?;
        }

        match &metadata.setup {
            Some(SetupPayload::Data(value)) => self.sink.apply_setup(id, value)?,
            Some(SetupPayload::Func(callback)) => run_callback(id, "setup", callback)?,
            None => {}
        }

        if let Some(configure) = &metadata.configure {
            self.run_action(id, "configure", configure)?;
        }

        for binding in &metadata.keymaps {
            self.sink.apply_keymap(id, binding)?;
        }

        Ok(())
    }

    fn run_action(&self, plugin: &str, step: &str, action: &Action) -> Result<()> {
        match action {
            Action::Shell(command) => {
                debug!("Running {} step for '{}': {}", step, plugin, command);

                let mut shell = Command::new("sh");
                shell.arg("-c").arg(command);

                // Shell steps run inside the plugin's install directory
                // when the store knows one
                if let Some(dir) = self.store_dir {
                    let plugin_dir = dir.join(plugin);
                    if plugin_dir.is_dir() {
                        shell.current_dir(&plugin_dir);
                    }
                }

                let output = shell.output().map_err(|e| {
                    Error::configuration(plugin, format!("failed to run {} step: {}", step, e))
                })?;

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(Error::configuration(
                        plugin,
                        format!("{} step failed: {}", step, stderr.trim()),
                    ));
                }

                debug!(
                    "{} step output: {}",
                    step,
                    String::from_utf8_lossy(&output.stdout).trim()
                );
                Ok(())
            }
            Action::Func(callback) => run_callback(plugin, step, callback),
        }
    }

    fn publish(
        &self,
        state_before: Option<PluginState>,
        state_after: Option<PluginState>,
        event: PluginEvent,
    ) {
        if let Some(sink) = self.events {
            sink(&EventEnvelope::new(state_before, state_after, event));
        }
    }
}

fn run_callback(plugin: &str, step: &str, callback: &ActionFn) -> Result<()> {
    callback().map_err(|e| Error::configuration(plugin, format!("{} step failed: {}", step, e)))
}
