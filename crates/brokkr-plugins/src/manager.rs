//! Plugin manager
//!
//! Owns the registry, the trigger bookkeeping, and the installer handle,
//! and drives the add/activate/install lifecycle end to end. All methods
//! run on the host loop's single thread; the installer boundary is the
//! only async seam.

use crate::activation::Activator;
use crate::events::{EventEnvelope, EventSink, PluginEvent};
use crate::hooks::{HookPayload, HookPhase, Hooks};
use crate::installer::PackageInstaller;
use crate::normalize;
use crate::registry::PluginRegistry;
use crate::resolver::DependencyResolver;
use crate::triggers::{replay_for, TriggerRegistrar, TriggerSink};
use brokkr_core::types::{
    FireContext, InstallOptions, PluginSpec, PluginState, RegistrySnapshot, SpecInput,
    TriggerHandle,
};
use brokkr_core::{Error, Result};
use camino::Utf8PathBuf;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Phase an entry failed in during an add batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddPhase {
    Normalize,
    Activate,
    TriggerRegistration,
}

impl fmt::Display for AddPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddPhase::Normalize => write!(f, "normalize"),
            AddPhase::Activate => write!(f, "activate"),
            AddPhase::TriggerRegistration => write!(f, "trigger registration"),
        }
    }
}

/// One entry that failed during an add batch
#[derive(Debug, Clone, Serialize)]
pub struct FailedPlugin {
    /// Plugin id, or the entry position when normalization never produced
    /// an id
    pub id: String,

    /// Error message
    pub error: String,

    /// Phase the failure happened in
    pub phase: AddPhase,
}

/// Outcome of one add batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddReport {
    /// Plugins activated eagerly, in activation order
    pub activated: Vec<String>,

    /// Plugins parked as lazy-pending behind their triggers
    pub lazy: Vec<String>,

    /// Entries that failed, with the phase they failed in
    pub failed: Vec<FailedPlugin>,

    /// Number of entries in the batch
    pub total: usize,
}

impl AddReport {
    /// Whether every entry in the batch succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether some entries succeeded and some failed
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty() && (!self.activated.is_empty() || !self.lazy.is_empty())
    }
}

/// Options for an add batch
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Normalize, register, and resolve only; leave every plugin in
    /// `Registered` instead of walking the activation order
    ///
    /// One-shot tooling uses this to work against the registry before
    /// any sources exist on disk.
    pub skip_activation: bool,
}

/// Outcome of a full synchronization pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Plugins installed because they were missing
    pub installed: Vec<String>,

    /// Plugins handed to the installer for updating
    pub updated: Vec<String>,
}

/// Registry, trigger table, and installer under one roof
pub struct PluginManager {
    registry: PluginRegistry,
    registrar: TriggerRegistrar,
    hooks: Hooks,
    sink: Box<dyn TriggerSink>,
    installer: Option<Box<dyn PackageInstaller>>,
    events: Option<EventSink>,
    loading: HashSet<String>,
    store_dir: Option<Utf8PathBuf>,
}

impl PluginManager {
    /// Create a manager wired to a host trigger sink
    pub fn new(sink: Box<dyn TriggerSink>) -> Self {
        Self {
            registry: PluginRegistry::new(),
            registrar: TriggerRegistrar::new(),
            hooks: Hooks::new(),
            sink,
            installer: None,
            events: None,
            loading: HashSet::new(),
            store_dir: None,
        }
    }

    /// Attach a package installer
    pub fn with_installer(mut self, installer: Box<dyn PackageInstaller>) -> Self {
        self.installer = Some(installer);
        self
    }

    /// Attach lifecycle hooks
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Attach an event sink for lifecycle events
    pub fn with_event_sink(mut self, events: EventSink) -> Self {
        self.events = Some(events);
        self
    }

    /// Set the directory plugin sources are installed under
    ///
    /// Shell build and configure steps run inside the plugin's directory
    /// when it exists.
    pub fn with_store_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    /// The current registry
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Point-in-time view of every registered plugin
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    /// Dependency-consistent activation order over the current registry
    ///
    /// Recomputed from scratch on every call, so it always reflects the
    /// latest adds.
    pub fn resolution_order(&self) -> Result<Vec<String>> {
        DependencyResolver::new(&self.registry).resolve_all()
    }

    /// Normalize, register, and activate a batch of plugin entries
    ///
    /// Entries that fail to normalize or activate are reported, not
    /// fatal; a dependency cycle is fatal for the whole batch. Lazy
    /// plugins are parked behind their triggers instead of activating.
    pub fn add_plugins(&mut self, entries: &[SpecInput]) -> Result<AddReport> {
        self.add_plugins_with(entries, &AddOptions::default())
    }

    /// [`add_plugins`](Self::add_plugins) with explicit batch options
    pub fn add_plugins_with(
        &mut self,
        entries: &[SpecInput],
        options: &AddOptions,
    ) -> Result<AddReport> {
        let mut report = AddReport {
            total: entries.len(),
            ..AddReport::default()
        };

        for (index, entry) in entries.iter().enumerate() {
            match normalize::add_to_registry(&mut self.registry, entry) {
                Ok(id) => {
                    // Re-adding an id drops whatever triggers the old
                    // record still had registered
                    let stale = self.registrar.remove_plugin(&id);
                    self.registrar.deregister_all(self.sink.as_mut(), &stale);

                    if let Some(record) = self.registry.get(&id) {
                        self.publish(
                            None,
                            Some(PluginState::Registered),
                            PluginEvent::PluginAdded {
                                plugin: id,
                                source: record.spec.source.clone(),
                                lazy: record.metadata.lazy,
                            },
                        );
                    }
                }
                Err(e) => {
                    warn!("Entry {} rejected: {}", index + 1, e);
                    report.failed.push(FailedPlugin {
                        id: format!("entry {}", index + 1),
                        error: e.to_string(),
                        phase: AddPhase::Normalize,
                    });
                }
            }
        }

        let order = self.resolution_order()?;
        if options.skip_activation {
            debug!("Activation skipped for this batch");
            return Ok(report);
        }

        for id in &order {
            let (state, lazy) = match self.registry.get(id) {
                Some(record) => (record.state, record.metadata.lazy),
                None => continue,
            };
            if state != PluginState::Registered {
                continue;
            }

            if lazy {
                match self.register_lazy(id) {
                    Ok(count) => {
                        debug!("Parked '{}' behind {} trigger(s)", id, count);
                        self.registry.set_state(id, PluginState::LazyPending);
                        report.lazy.push(id.clone());
                    }
                    Err(e) => {
                        warn!("Trigger registration for '{}' failed: {}", id, e);
                        report.failed.push(FailedPlugin {
                            id: id.clone(),
                            error: e.to_string(),
                            phase: AddPhase::TriggerRegistration,
                        });
                    }
                }
            } else {
                match self.activate_plugin(id) {
                    Ok(()) => report.activated.push(id.clone()),
                    Err(e) => report.failed.push(FailedPlugin {
                        id: id.clone(),
                        error: e.to_string(),
                        phase: AddPhase::Activate,
                    }),
                }
            }
        }

        // An eager dependent may have pulled a lazy plugin in with it
        for id in report.lazy.clone() {
            if self.registry.state_of(&id) == Some(PluginState::Configured) {
                report.lazy.retain(|lazy_id| *lazy_id != id);
                report.activated.push(id);
            }
        }
        self.sweep_stale_triggers();

        Ok(report)
    }

    /// Activate one plugin by id, dependencies first
    ///
    /// A lazy-pending plugin activated this way has its triggers
    /// deregistered first; no replay is scheduled.
    pub fn activate(&mut self, id: &str) -> Result<()> {
        if !self.registry.has(id) {
            return Err(Error::not_found(id));
        }

        let pending = self.registrar.remove_plugin(id);
        self.registrar.deregister_all(self.sink.as_mut(), &pending);

        let result = self.activate_plugin(id);
        self.sweep_stale_triggers();
        result
    }

    /// React to a trigger firing in the host
    ///
    /// The first fire wins: the binding and all its siblings are consumed
    /// and deregistered before activation runs, so a second fire of any of
    /// them is a stale no-op. The replay, when one applies, is scheduled
    /// only after successful activation and runs on a later host-loop
    /// turn.
    pub fn trigger_fired(&mut self, handle: TriggerHandle, fire: &FireContext) -> Result<()> {
        let (binding, siblings) = match self.registrar.take_fired(handle) {
            Some(consumed) => consumed,
            None => {
                debug!("Stale trigger fire {}", handle);
                return Ok(());
            }
        };
        self.registrar.deregister_all(self.sink.as_mut(), &siblings);

        self.publish(
            None,
            None,
            PluginEvent::TriggerFired {
                plugin: binding.plugin.clone(),
                trigger: binding.trigger.on.to_string(),
            },
        );

        let result = self.activate_plugin(&binding.plugin);
        if result.is_ok() {
            if let Some(replay) = replay_for(&binding, fire) {
                self.sink.schedule(replay)?;
            }
        }
        self.sweep_stale_triggers();
        result
    }

    /// Fire every ready-category trigger
    ///
    /// Called once by the host when it finishes starting up. Failures are
    /// logged per plugin and do not stop the rest.
    pub fn host_ready(&mut self) {
        for handle in self.registrar.ready_handles() {
            if let Err(e) = self.trigger_fired(handle, &FireContext::Ready) {
                warn!("Ready trigger {} failed: {}", handle, e);
            }
        }
    }

    /// Install every registered plugin the installer does not have yet
    ///
    /// Returns the ids handed to the installer.
    pub async fn install_missing(&self, options: &InstallOptions) -> Result<Vec<String>> {
        let installer = self.package_installer()?;

        let installed: HashSet<String> = installer
            .list_installed()
            .await?
            .into_iter()
            .map(|plugin| plugin.id)
            .collect();

        let missing: Vec<PluginSpec> = self
            .registry
            .records()
            .filter(|record| record.metadata.enabled)
            .filter(|record| !installed.contains(&record.spec.id))
            .map(|record| record.spec.clone())
            .collect();

        if missing.is_empty() {
            debug!("No plugins missing from the store");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = missing.iter().map(|spec| spec.id.clone()).collect();
        self.hooks.dispatch(&HookPayload::new(
            HookPhase::PreInstall,
            ids.clone(),
            missing.clone(),
        ));
        self.publish(
            None,
            None,
            PluginEvent::InstallStarted {
                plugins: ids.clone(),
            },
        );

        match installer.install(&missing, options).await {
            Ok(()) => {
                self.publish(
                    None,
                    None,
                    PluginEvent::InstallCompleted {
                        plugins: ids.clone(),
                    },
                );
                self.hooks
                    .dispatch(&HookPayload::new(HookPhase::PostInstall, ids.clone(), missing));
                Ok(ids)
            }
            Err(e) => {
                self.publish(
                    None,
                    None,
                    PluginEvent::InstallFailed {
                        error_message: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    /// Update installed plugin sources
    ///
    /// With explicit ids every id must be registered; without, every
    /// enabled plugin is updated.
    pub async fn update_plugins(
        &self,
        ids: Option<&[String]>,
        options: &InstallOptions,
    ) -> Result<Vec<String>> {
        let installer = self.package_installer()?;

        let targets: Vec<String> = match ids {
            Some(explicit) => {
                for id in explicit {
                    if !self.registry.has(id) {
                        return Err(Error::not_found(id));
                    }
                }
                explicit.to_vec()
            }
            None => self.registry.enabled_ids(),
        };

        if targets.is_empty() {
            debug!("Nothing to update");
            return Ok(Vec::new());
        }

        let specs: Vec<PluginSpec> = targets
            .iter()
            .filter_map(|id| self.registry.get(id))
            .map(|record| record.spec.clone())
            .collect();

        self.hooks.dispatch(&HookPayload::new(
            HookPhase::PreUpdate,
            targets.clone(),
            specs.clone(),
        ));
        self.publish(
            None,
            None,
            PluginEvent::UpdateStarted {
                plugins: targets.clone(),
            },
        );

        match installer.update(&targets, options).await {
            Ok(()) => {
                self.publish(
                    None,
                    None,
                    PluginEvent::UpdateCompleted {
                        plugins: targets.clone(),
                    },
                );
                self.hooks
                    .dispatch(&HookPayload::new(HookPhase::PostUpdate, targets.clone(), specs));
                Ok(targets)
            }
            Err(e) => {
                self.publish(
                    None,
                    None,
                    PluginEvent::UpdateFailed {
                        error_message: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }

    /// Install missing plugins, then update everything enabled
    pub async fn sync_all(&self, options: &InstallOptions) -> Result<SyncReport> {
        let installed = self.install_missing(options).await?;
        let updated = self.update_plugins(None, options).await?;
        Ok(SyncReport { installed, updated })
    }

    /// Remove installed plugins that no registered plugin claims
    ///
    /// The registry itself is untouched; only the installer's store
    /// shrinks.
    pub async fn remove_unused(&self) -> Result<Vec<String>> {
        let installer = self.package_installer()?;

        let unused: Vec<String> = installer
            .list_installed()
            .await?
            .into_iter()
            .map(|plugin| plugin.id)
            .filter(|id| !self.registry.has(id))
            .collect();

        if unused.is_empty() {
            debug!("Store has no unused plugins");
            return Ok(Vec::new());
        }

        installer.remove(&unused).await?;
        self.publish(
            None,
            None,
            PluginEvent::RemoveCompleted {
                plugins: unused.clone(),
            },
        );
        Ok(unused)
    }

    fn package_installer(&self) -> Result<&dyn PackageInstaller> {
        self.installer
            .as_deref()
            .ok_or_else(|| Error::installer("no package installer configured"))
    }

    fn register_lazy(&mut self, id: &str) -> Result<usize> {
        let record = self.registry.get(id).ok_or_else(|| Error::not_found(id))?;
        self.registrar.register_lazy(self.sink.as_mut(), record)
    }

    fn activate_plugin(&mut self, id: &str) -> Result<()> {
        let mut activator = Activator::new(
            &mut self.registry,
            &self.hooks,
            self.sink.as_mut(),
            self.events.as_ref(),
            &mut self.loading,
            self.store_dir.as_deref(),
        );
        activator.activate(id)
    }

    /// Drop trigger registrations for plugins that got configured anyway,
    /// typically by being pulled in as a dependency of an eager plugin
    fn sweep_stale_triggers(&mut self) {
        let stale: Vec<String> = self
            .registry
            .records()
            .filter(|record| record.state == PluginState::Configured)
            .map(|record| record.spec.id.clone())
            .filter(|id| self.registrar.has_bindings(id))
            .collect();

        for id in stale {
            debug!("Dropping stale triggers for configured plugin '{}'", id);
            let handles = self.registrar.remove_plugin(&id);
            self.registrar.deregister_all(self.sink.as_mut(), &handles);
        }
    }

    fn publish(
        &self,
        state_before: Option<PluginState>,
        state_after: Option<PluginState>,
        event: PluginEvent,
    ) {
        if let Some(sink) = &self.events {
            sink(&EventEnvelope::new(state_before, state_after, event));
        }
    }
}
