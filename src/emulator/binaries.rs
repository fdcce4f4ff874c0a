//! Versioned jar binaries backing the database and firestore emulators.

use std::path::PathBuf;

use super::kind::EmulatorKind;
use crate::paths;

#[derive(Debug, Clone, Copy)]
pub struct JarSpec {
    pub kind: EmulatorKind,
    pub name_prefix: &'static str,
    pub version: &'static str,
    pub remote_url: &'static str,
}

pub const DATABASE_JAR: JarSpec = JarSpec {
    kind: EmulatorKind::Database,
    name_prefix: "firebase-database-emulator",
    version: "4.4.1",
    remote_url: "https://storage.googleapis.com/firebase-preview-drop/emulator/firebase-database-emulator-v4.4.1.jar",
};

pub const FIRESTORE_JAR: JarSpec = JarSpec {
    kind: EmulatorKind::Firestore,
    name_prefix: "cloud-firestore-emulator",
    version: "1.11.7",
    remote_url: "https://storage.googleapis.com/firebase-preview-drop/emulator/cloud-firestore-emulator-v1.11.7.jar",
};

impl JarSpec {
    pub fn file_name(&self) -> String {
        format!("{}-v{}.jar", self.name_prefix, self.version)
    }

    /// Expected location in the local cache.
    pub fn local_path(&self) -> PathBuf {
        paths::emulator_cache_dir().join(self.file_name())
    }
}

/// The jar spec for a kind, or `None` for the in-process/non-jar emulators.
pub fn spec_for(kind: EmulatorKind) -> Option<JarSpec> {
    match kind {
        EmulatorKind::Database => Some(DATABASE_JAR),
        EmulatorKind::Firestore => Some(FIRESTORE_JAR),
        EmulatorKind::Functions | EmulatorKind::Hosting => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jar_specs_exist_for_java_emulators() {
        assert!(spec_for(EmulatorKind::Database).is_some());
        assert!(spec_for(EmulatorKind::Firestore).is_some());
        assert!(spec_for(EmulatorKind::Functions).is_none());
        assert!(spec_for(EmulatorKind::Hosting).is_none());
    }

    #[test]
    fn test_file_name_includes_version() {
        let spec = spec_for(EmulatorKind::Database).unwrap();
        assert_eq!(
            spec.file_name(),
            format!("firebase-database-emulator-v{}.jar", spec.version)
        );
        assert!(spec.remote_url.ends_with(&spec.file_name()));
    }
}
