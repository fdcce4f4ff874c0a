use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of emulators the orchestrator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmulatorKind {
    Database,
    Firestore,
    Functions,
    Hosting,
}

impl EmulatorKind {
    /// Every kind, in the order used for listings.
    pub const ALL: [EmulatorKind; 4] = [
        EmulatorKind::Database,
        EmulatorKind::Firestore,
        EmulatorKind::Functions,
        EmulatorKind::Hosting,
    ];

    /// Startup dependency order. Functions goes first so its address can be
    /// cross-wired into the database emulator; hosting has no peers and goes
    /// last.
    pub const START_ORDER: [EmulatorKind; 4] = [
        EmulatorKind::Functions,
        EmulatorKind::Firestore,
        EmulatorKind::Database,
        EmulatorKind::Hosting,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EmulatorKind::Database => "database",
            EmulatorKind::Firestore => "firestore",
            EmulatorKind::Functions => "functions",
            EmulatorKind::Hosting => "hosting",
        }
    }
}

impl fmt::Display for EmulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmulatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "database" => Ok(EmulatorKind::Database),
            "firestore" => Ok(EmulatorKind::Firestore),
            "functions" => Ok(EmulatorKind::Functions),
            "hosting" => Ok(EmulatorKind::Hosting),
            other => Err(format!("unknown emulator: {other:?}")),
        }
    }
}
