//! Recording doubles for testing
//!
//! Stand-ins for the host trigger sink and the package installer that
//! record every call instead of touching an editor loop, the filesystem,
//! or the network.

#![allow(dead_code)]

use async_trait::async_trait;
use brokkr_core::types::{
    InstallOptions, InstalledPlugin, KeyBinding, PluginSpec, ReplayAction, TriggerHandle,
};
use brokkr_core::{Error, Result};
use brokkr_plugins::{PackageInstaller, TriggerSink};
use std::sync::{Arc, Mutex};

/// One registration the sink handed a handle out for
#[derive(Clone, Debug)]
pub struct RegisteredTrigger {
    pub handle: TriggerHandle,
    pub plugin: String,
    pub description: String,
}

/// Everything the recording sink observed
#[derive(Default)]
pub struct SinkLog {
    pub registered: Vec<RegisteredTrigger>,
    pub deregistered: Vec<TriggerHandle>,
    pub scheduled: Vec<ReplayAction>,
    pub keymaps: Vec<(String, KeyBinding)>,
    pub setups: Vec<(String, serde_json::Value)>,
}

impl SinkLog {
    /// Handle of a still-live registration matching a plugin and a
    /// description prefix such as `command:` or `ready`
    pub fn live_handle(&self, plugin: &str, prefix: &str) -> Option<TriggerHandle> {
        self.registered
            .iter()
            .filter(|trigger| trigger.plugin == plugin)
            .filter(|trigger| trigger.description.starts_with(prefix))
            .map(|trigger| trigger.handle)
            .find(|handle| !self.deregistered.contains(handle))
    }

    /// Handles still registered for a plugin
    pub fn live_handles(&self, plugin: &str) -> Vec<TriggerHandle> {
        self.registered
            .iter()
            .filter(|trigger| trigger.plugin == plugin)
            .map(|trigger| trigger.handle)
            .filter(|handle| !self.deregistered.contains(handle))
            .collect()
    }
}

/// Trigger sink that records registrations and issues sequential handles
pub struct RecordingSink {
    next_handle: u64,
    reject_registrations: bool,
    log: Arc<Mutex<SinkLog>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<SinkLog>>) {
        let log = Arc::new(Mutex::new(SinkLog::default()));
        (
            Self {
                next_handle: 0,
                reject_registrations: false,
                log: Arc::clone(&log),
            },
            log,
        )
    }

    /// Sink whose register calls all fail
    pub fn rejecting() -> (Self, Arc<Mutex<SinkLog>>) {
        let (mut sink, log) = Self::new();
        sink.reject_registrations = true;
        (sink, log)
    }

    fn issue(&mut self, plugin: &str, description: String) -> Result<TriggerHandle> {
        if self.reject_registrations {
            return Err(Error::configuration(plugin, "sink rejected registration"));
        }
        let handle = TriggerHandle(self.next_handle);
        self.next_handle += 1;
        self.log.lock().unwrap().registered.push(RegisteredTrigger {
            handle,
            plugin: plugin.to_string(),
            description,
        });
        Ok(handle)
    }
}

impl TriggerSink for RecordingSink {
    fn register_event(&mut self, plugin: &str, pattern: &str) -> Result<TriggerHandle> {
        self.issue(plugin, format!("event:{}", pattern))
    }

    fn register_command(&mut self, plugin: &str, name: &str) -> Result<TriggerHandle> {
        self.issue(plugin, format!("command:{}", name))
    }

    fn register_filetype(&mut self, plugin: &str, filetype: &str) -> Result<TriggerHandle> {
        self.issue(plugin, format!("filetype:{}", filetype))
    }

    fn register_keys(&mut self, plugin: &str, sequence: &str) -> Result<TriggerHandle> {
        self.issue(plugin, format!("keys:{}", sequence))
    }

    fn register_ready(&mut self, plugin: &str) -> Result<TriggerHandle> {
        self.issue(plugin, "ready".to_string())
    }

    fn deregister(&mut self, handle: TriggerHandle) -> Result<()> {
        self.log.lock().unwrap().deregistered.push(handle);
        Ok(())
    }

    fn apply_keymap(&mut self, plugin: &str, binding: &KeyBinding) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .keymaps
            .push((plugin.to_string(), binding.clone()));
        Ok(())
    }

    fn apply_setup(&mut self, plugin: &str, payload: &serde_json::Value) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .setups
            .push((plugin.to_string(), payload.clone()));
        Ok(())
    }

    fn schedule(&mut self, action: ReplayAction) -> Result<()> {
        self.log.lock().unwrap().scheduled.push(action);
        Ok(())
    }
}

/// Calls the recording installer observed
#[derive(Default)]
pub struct InstallerLog {
    pub installed: Vec<PluginSpec>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

/// Package installer backed by an in-memory store
pub struct RecordingInstaller {
    store: Arc<Mutex<Vec<InstalledPlugin>>>,
    log: Arc<Mutex<InstallerLog>>,
    fail_with: Option<String>,
}

impl RecordingInstaller {
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(Vec::new())),
            log: Arc::new(Mutex::new(InstallerLog::default())),
            fail_with: None,
        }
    }

    /// Installer whose store already holds the given plugins
    pub fn with_installed(plugins: Vec<InstalledPlugin>) -> Self {
        let installer = Self::new();
        *installer.store.lock().unwrap() = plugins;
        installer
    }

    /// Installer whose mutating operations all fail with the message
    pub fn failing(message: &str) -> Self {
        let mut installer = Self::new();
        installer.fail_with = Some(message.to_string());
        installer
    }

    pub fn log(&self) -> Arc<Mutex<InstallerLog>> {
        Arc::clone(&self.log)
    }

    pub fn store(&self) -> Arc<Mutex<Vec<InstalledPlugin>>> {
        Arc::clone(&self.store)
    }

    fn check_failure(&self) -> Result<()> {
        match &self.fail_with {
            Some(message) => Err(Error::installer(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for RecordingInstaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageInstaller for RecordingInstaller {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn install(&self, specs: &[PluginSpec], _options: &InstallOptions) -> Result<()> {
        self.check_failure()?;
        let mut store = self.store.lock().unwrap();
        for spec in specs {
            store.push(InstalledPlugin {
                id: spec.id.clone(),
                source: spec.source.clone(),
            });
        }
        self.log.lock().unwrap().installed.extend_from_slice(specs);
        Ok(())
    }

    async fn update(&self, ids: &[String], _options: &InstallOptions) -> Result<()> {
        self.check_failure()?;
        self.log.lock().unwrap().updated.extend_from_slice(ids);
        Ok(())
    }

    async fn list_installed(&self) -> Result<Vec<InstalledPlugin>> {
        Ok(self.store.lock().unwrap().clone())
    }

    async fn remove(&self, ids: &[String]) -> Result<()> {
        self.check_failure()?;
        self.store
            .lock()
            .unwrap()
            .retain(|plugin| !ids.contains(&plugin.id));
        self.log.lock().unwrap().removed.extend_from_slice(ids);
        Ok(())
    }
}
