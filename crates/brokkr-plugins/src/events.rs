use brokkr_core::types::PluginState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Plugin lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PluginEvent {
    /// Plugin spec normalized and added to the registry
    PluginAdded {
        plugin: String,
        source: String,
        lazy: bool,
    },

    /// Activation started
    ActivationStarted { plugin: String },

    /// Activation completed successfully
    ActivationCompleted { plugin: String, duration_ms: u64 },

    /// Activation failed
    ActivationFailed {
        plugin: String,
        error_message: String,
    },

    /// A lazy trigger fired for a plugin
    TriggerFired { plugin: String, trigger: String },

    /// Installer started fetching missing plugins
    InstallStarted { plugins: Vec<String> },

    /// Installer finished fetching missing plugins
    InstallCompleted { plugins: Vec<String> },

    /// Installer failed
    InstallFailed { error_message: String },

    /// Update started
    UpdateStarted { plugins: Vec<String> },

    /// Update completed
    UpdateCompleted { plugins: Vec<String> },

    /// Update failed
    UpdateFailed { error_message: String },

    /// Unused artifacts removed from storage
    RemoveCompleted { plugins: Vec<String> },
}

/// Event metadata envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID (UUID v4)
    pub event_id: String,

    /// Event timestamp (UTC)
    pub timestamp: DateTime<Utc>,

    /// Library version that published the event
    pub core_version: String,

    /// State before the event, for per-plugin events
    pub state_before: Option<PluginState>,

    /// State after the event, for per-plugin events
    pub state_after: Option<PluginState>,

    /// The actual event payload
    pub event: PluginEvent,
}

impl EventEnvelope {
    pub fn new(
        state_before: Option<PluginState>,
        state_after: Option<PluginState>,
        event: PluginEvent,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            core_version: env!("CARGO_PKG_VERSION").to_string(),
            state_before,
            state_after,
            event,
        }
    }
}

/// Callback receiving every published event envelope
pub type EventSink = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;
