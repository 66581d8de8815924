use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the process boundary this process is on. Fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessRole {
    /// Hosts the UI and orchestrates browsers (the engine's browser process).
    Controller,
    /// Runs page script (the engine's renderer process).
    ScriptExecutor,
}

impl ProcessRole {
    /// The role on the other side of the boundary.
    pub fn peer(self) -> Self {
        match self {
            Self::Controller => Self::ScriptExecutor,
            Self::ScriptExecutor => Self::Controller,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::ScriptExecutor => "script-executor",
        }
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_is_involutive() {
        for role in [ProcessRole::Controller, ProcessRole::ScriptExecutor] {
            assert_ne!(role.peer(), role);
            assert_eq!(role.peer().peer(), role);
        }
    }

    #[test]
    fn serializes_kebab_case() {
        let json = serde_json::to_string(&ProcessRole::ScriptExecutor).unwrap();
        assert_eq!(json, "\"script-executor\"");
        assert_eq!(ProcessRole::Controller.to_string(), "controller");
    }
}
