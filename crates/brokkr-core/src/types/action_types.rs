//! Action types shared by build, setup, and configure steps

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Zero-argument callback invoked during activation
pub type ActionFn = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// A runnable activation step
///
/// Build, setup, and configure steps are all dispatched through this one
/// shape so the activation routine treats them uniformly.
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum Action {
    /// Shell command, run with `sh -c` in the plugin's install directory
    /// when one is known
    Shell(String),

    /// In-process callback, only attachable programmatically
    #[serde(skip)]
    Func(ActionFn),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shell(cmd) => f.debug_tuple("Shell").field(cmd).finish(),
            Action::Func(_) => write!(f, "Func(..)"),
        }
    }
}

/// Setup payload delivered before the configure step
#[derive(Clone, Deserialize)]
#[serde(untagged)]
pub enum SetupPayload {
    /// Structured payload, handed to the plugin's configuration entry point
    /// through the host
    Data(serde_json::Value),

    /// In-process callback, only attachable programmatically
    #[serde(skip)]
    Func(ActionFn),
}

impl fmt::Debug for SetupPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupPayload::Data(value) => f.debug_tuple("Data").field(value).finish(),
            SetupPayload::Func(_) => write!(f, "Func(..)"),
        }
    }
}
