//! Trigger and key-binding types for lazy activation

use crate::types::action_types::ActionFn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal category a lazy plugin can be bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Named host event (autocommand-style)
    Event(String),
    /// User command invocation
    Command(String),
    /// Content type detected by the host
    Filetype(String),
    /// Key sequence
    Keys(String),
    /// Host finished initial rendering
    Ready,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Event(name) => write!(f, "event {}", name),
            TriggerKind::Command(name) => write!(f, "command {}", name),
            TriggerKind::Filetype(name) => write!(f, "filetype {}", name),
            TriggerKind::Keys(seq) => write!(f, "keys {}", seq),
            TriggerKind::Ready => write!(f, "ready"),
        }
    }
}

/// One lazy-load trigger declaration
#[derive(Debug, Clone, Deserialize)]
pub struct LazyTrigger {
    /// Signal the trigger listens for
    pub on: TriggerKind,

    /// Action re-issued after activation completes, overriding the
    /// default derived from the firing signal
    #[serde(default)]
    pub replay: Option<ReplayAction>,
}

impl LazyTrigger {
    /// Trigger with no explicit replay attached
    pub fn new(on: TriggerKind) -> Self {
        Self { on, replay: None }
    }
}

/// Action replayed on a later host-loop turn once activation has finished
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum ReplayAction {
    /// Re-issue a command invocation
    Command {
        name: String,
        #[serde(default)]
        args: Vec<String>,
    },

    /// Feed the literal key sequence back to the host
    Keys { sequence: String },

    /// In-process callback, only attachable programmatically
    #[serde(skip)]
    Func(ActionFn),
}

impl fmt::Debug for ReplayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayAction::Command { name, args } => f
                .debug_struct("Command")
                .field("name", name)
                .field("args", args)
                .finish(),
            ReplayAction::Keys { sequence } => f
                .debug_struct("Keys")
                .field("sequence", sequence)
                .finish(),
            ReplayAction::Func(_) => write!(f, "Func(..)"),
        }
    }
}

/// Runtime context passed by the host when a trigger fires
#[derive(Debug, Clone)]
pub enum FireContext {
    /// An event trigger fired
    Event { pattern: String },
    /// A command trigger fired with the arguments of the invocation
    Command { name: String, args: Vec<String> },
    /// A filetype trigger fired
    Filetype { filetype: String },
    /// A key trigger fired
    Keys { sequence: String },
    /// The host readiness signal fired
    Ready,
}

impl FireContext {
    /// Default replay derived from the firing signal
    ///
    /// Command invocations and key sequences are replayable; the other
    /// categories carry nothing to re-issue.
    pub fn default_replay(&self) -> Option<ReplayAction> {
        match self {
            FireContext::Command { name, args } => Some(ReplayAction::Command {
                name: name.clone(),
                args: args.clone(),
            }),
            FireContext::Keys { sequence } => Some(ReplayAction::Keys {
                sequence: sequence.clone(),
            }),
            FireContext::Event { .. } | FireContext::Filetype { .. } | FireContext::Ready => None,
        }
    }
}

/// Opaque identifier for one trigger registration issued by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerHandle(pub u64);

impl fmt::Display for TriggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Post-activation key binding, distinct from lazy key triggers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Key sequence to bind
    pub keys: String,

    /// Host command executed when the sequence is pressed
    pub action: String,

    /// Host input mode the binding applies to
    #[serde(default)]
    pub mode: Option<String>,
}
