//! Lifecycle hook dispatch
//!
//! Hooks are optional user-supplied callbacks invoked synchronously around
//! install, update, and activation. A hook that fails is logged and never
//! aborts the surrounding operation.

use brokkr_core::types::PluginSpec;
use std::sync::Arc;
use tracing::{debug, warn};

/// Callback type for lifecycle hooks
pub type HookFn = Arc<dyn Fn(&HookPayload) -> anyhow::Result<()> + Send + Sync>;

/// Point in the lifecycle a hook fires at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    PreInstall,
    PostInstall,
    PreUpdate,
    PostUpdate,
    PreActivation,
    PostActivation,
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookPhase::PreInstall => write!(f, "pre-install"),
            HookPhase::PostInstall => write!(f, "post-install"),
            HookPhase::PreUpdate => write!(f, "pre-update"),
            HookPhase::PostUpdate => write!(f, "post-update"),
            HookPhase::PreActivation => write!(f, "pre-activation"),
            HookPhase::PostActivation => write!(f, "post-activation"),
        }
    }
}

/// Structured payload handed to every hook invocation
#[derive(Debug, Clone)]
pub struct HookPayload {
    /// Lifecycle point
    pub phase: HookPhase,

    /// Affected plugin ids
    pub plugins: Vec<String>,

    /// Spec data for the affected plugins, where available
    pub specs: Vec<PluginSpec>,
}

impl HookPayload {
    pub fn new(phase: HookPhase, plugins: Vec<String>, specs: Vec<PluginSpec>) -> Self {
        Self {
            phase,
            plugins,
            specs,
        }
    }
}

/// Optional lifecycle callbacks
///
/// Absent hooks are no-ops. Registration is builder-style so embedders can
/// chain only the hooks they care about.
#[derive(Clone, Default)]
pub struct Hooks {
    pre_install: Option<HookFn>,
    post_install: Option<HookFn>,
    pre_update: Option<HookFn>,
    post_update: Option<HookFn>,
    pre_activation: Option<HookFn>,
    post_activation: Option<HookFn>,
}

impl Hooks {
    /// Create an empty hook set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the pre-install hook
    pub fn on_pre_install<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HookPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_install = Some(Arc::new(hook));
        self
    }

    /// Register the post-install hook
    pub fn on_post_install<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HookPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_install = Some(Arc::new(hook));
        self
    }

    /// Register the pre-update hook
    pub fn on_pre_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HookPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_update = Some(Arc::new(hook));
        self
    }

    /// Register the post-update hook
    pub fn on_post_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HookPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_update = Some(Arc::new(hook));
        self
    }

    /// Register the pre-activation hook
    pub fn on_pre_activation<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HookPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_activation = Some(Arc::new(hook));
        self
    }

    /// Register the post-activation hook
    pub fn on_post_activation<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HookPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_activation = Some(Arc::new(hook));
        self
    }

    /// Invoke the hook registered for the payload's phase
    ///
    /// Hook failures are logged and swallowed so they stay local to the
    /// hook invocation.
    pub fn dispatch(&self, payload: &HookPayload) {
        let hook = match payload.phase {
            HookPhase::PreInstall => &self.pre_install,
            HookPhase::PostInstall => &self.post_install,
            HookPhase::PreUpdate => &self.pre_update,
            HookPhase::PostUpdate => &self.post_update,
            HookPhase::PreActivation => &self.pre_activation,
            HookPhase::PostActivation => &self.post_activation,
        };

        if let Some(hook) = hook {
            debug!("Running {} hook for {:?}", payload.phase, payload.plugins);
            if let Err(e) = hook(payload) {
                warn!("{} hook failed: {} (continuing)", payload.phase, e);
            }
        }
    }
}
