// Worker lifecycle state.
// Tracks where the worker is between install and activation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Service worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServiceWorkerState {
    /// Created, no install attempted yet.
    #[default]
    Parsed,
    Installing,
    /// Install finished (successfully or not) and waiting to activate.
    Installed,
    /// Active and eligible to intercept fetches.
    Activated,
    /// Replaced or discarded.
    Redundant,
}

impl ServiceWorkerState {
    pub fn can_activate(&self) -> bool {
        matches!(self, Self::Installed)
    }

    /// States an install moves through Installing to Installed.
    /// An active or retired worker keeps its state across a reinstall.
    pub fn resets_on_install(&self) -> bool {
        matches!(self, Self::Parsed | Self::Installing | Self::Installed)
    }
}

impl fmt::Display for ServiceWorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}
