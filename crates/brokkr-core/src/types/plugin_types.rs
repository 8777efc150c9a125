//! Plugin spec, metadata, and registry record types

use crate::types::action_types::{Action, SetupPayload};
use crate::types::trigger_types::{KeyBinding, LazyTrigger};
use serde::{Deserialize, Serialize};

fn default_priority() -> i32 {
    50
}

fn default_enabled() -> bool {
    true
}

/// Canonical plugin spec, produced by normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSpec {
    /// Unique plugin id, derived from the source locator unless named
    pub id: String,

    /// Fully qualified source locator
    pub source: String,

    /// Version ref (tag, branch, or commit)
    #[serde(default)]
    pub version: Option<String>,

    /// Ordering weight among independent plugins (higher loads earlier)
    #[serde(default = "default_priority")]
    pub priority: i32,
}

/// Declarative plugin input, one of three accepted shapes
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SpecInput {
    /// Bare locator string
    Locator(String),

    /// Table with a `src` field plus optional overrides
    Table(SpecFields),

    /// Positional entry whose first element is the locator, optionally
    /// followed by a field table
    Positional(Vec<PositionalField>),
}

/// Element of a positional spec entry
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PositionalField {
    /// Locator string
    Locator(String),
    /// Field table
    Fields(SpecFields),
}

/// Field table accepted in table and positional spec shapes
#[derive(Debug, Clone, Deserialize)]
pub struct SpecFields {
    /// Source locator ("owner/name" short form or fully qualified)
    #[serde(default)]
    pub src: Option<String>,

    /// Explicit plugin id, overriding derivation from the locator
    #[serde(default)]
    pub name: Option<String>,

    /// Version ref (tag, branch, or commit)
    #[serde(default)]
    pub version: Option<String>,

    /// Ordering weight among independent plugins
    #[serde(default)]
    pub priority: Option<i32>,

    /// Whether the plugin participates in resolution and activation
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Defer activation until a trigger fires
    #[serde(default)]
    pub lazy: bool,

    /// Dependencies, as plugin ids or raw locators
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Host events that lazy-load the plugin
    #[serde(default)]
    pub events: Vec<String>,

    /// User commands that lazy-load the plugin
    #[serde(default)]
    pub commands: Vec<String>,

    /// Content types that lazy-load the plugin
    #[serde(default)]
    pub filetypes: Vec<String>,

    /// Key sequences that lazy-load the plugin
    #[serde(default)]
    pub keys: Vec<String>,

    /// Lazy-load once the host reports readiness
    #[serde(default)]
    pub ready: bool,

    /// Full-fidelity trigger declarations, merged with the flat fields
    #[serde(default)]
    pub triggers: Vec<LazyTrigger>,

    /// Build step run during activation
    #[serde(default)]
    pub build: Option<Action>,

    /// Setup payload applied before configure
    #[serde(default)]
    pub setup: Option<SetupPayload>,

    /// Configure step run during activation
    #[serde(default)]
    pub configure: Option<Action>,

    /// Key bindings registered after activation
    #[serde(default)]
    pub keymaps: Vec<KeyBinding>,
}

impl Default for SpecFields {
    fn default() -> Self {
        Self {
            src: None,
            name: None,
            version: None,
            priority: None,
            enabled: true,
            lazy: false,
            dependencies: Vec::new(),
            events: Vec::new(),
            commands: Vec::new(),
            filetypes: Vec::new(),
            keys: Vec::new(),
            ready: false,
            triggers: Vec::new(),
            build: None,
            setup: None,
            configure: None,
            keymaps: Vec::new(),
        }
    }
}

/// Activation-relevant plugin metadata
#[derive(Debug, Clone)]
pub struct PluginMetadata {
    /// Dependencies in declaration order, as ids or raw locators
    pub dependencies: Vec<String>,

    /// Whether the plugin participates in resolution and activation
    pub enabled: bool,

    /// Defer activation until a trigger fires
    pub lazy: bool,

    /// Lazy-load triggers
    pub triggers: Vec<LazyTrigger>,

    /// Build step
    pub build: Option<Action>,

    /// Setup payload
    pub setup: Option<SetupPayload>,

    /// Configure step
    pub configure: Option<Action>,

    /// Post-activation key bindings
    pub keymaps: Vec<KeyBinding>,
}

impl Default for PluginMetadata {
    fn default() -> Self {
        Self {
            dependencies: Vec::new(),
            enabled: true,
            lazy: false,
            triggers: Vec::new(),
            build: None,
            setup: None,
            configure: None,
            keymaps: Vec::new(),
        }
    }
}

/// Plugin activation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
    /// Added to the registry, not yet scheduled
    #[default]
    Registered,
    /// Waiting for a lazy trigger to fire
    LazyPending,
    /// Activation in progress
    Loading,
    /// Activated and configured
    Configured,
    /// Activation failed
    Failed,
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginState::Registered => write!(f, "registered"),
            PluginState::LazyPending => write!(f, "lazy pending"),
            PluginState::Loading => write!(f, "loading"),
            PluginState::Configured => write!(f, "configured"),
            PluginState::Failed => write!(f, "failed"),
        }
    }
}

/// Live registry entry for one plugin
#[derive(Debug, Clone)]
pub struct PluginRecord {
    /// Canonical spec
    pub spec: PluginSpec,

    /// Activation metadata
    pub metadata: PluginMetadata,

    /// Current state
    pub state: PluginState,

    /// Captured error message, present only in the failed state
    pub error: Option<String>,
}

impl PluginRecord {
    /// Create a freshly registered record
    pub fn new(spec: PluginSpec, metadata: PluginMetadata) -> Self {
        Self {
            spec,
            metadata,
            state: PluginState::Registered,
            error: None,
        }
    }
}

/// Read-only status view of one plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginStatus {
    /// Plugin id
    pub id: String,

    /// Source locator
    pub source: String,

    /// Version ref
    pub version: Option<String>,

    /// Ordering weight
    pub priority: i32,

    /// Whether activation is deferred to a trigger
    pub lazy: bool,

    /// Current state
    pub state: PluginState,

    /// Captured error message, present only in the failed state
    pub error: Option<String>,
}

impl From<&PluginRecord> for PluginStatus {
    fn from(record: &PluginRecord) -> Self {
        Self {
            id: record.spec.id.clone(),
            source: record.spec.source.clone(),
            version: record.spec.version.clone(),
            priority: record.spec.priority,
            lazy: record.metadata.lazy,
            state: record.state,
            error: record.error.clone(),
        }
    }
}

/// Read-only snapshot of the whole registry, in registration order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Per-plugin status entries
    pub plugins: Vec<PluginStatus>,
}

impl RegistrySnapshot {
    /// Number of plugins in the snapshot
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Entries currently in the failed state
    pub fn failed(&self) -> Vec<&PluginStatus> {
        self.plugins
            .iter()
            .filter(|status| status.state == PluginState::Failed)
            .collect()
    }
}
