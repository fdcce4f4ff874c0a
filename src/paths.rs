use std::path::PathBuf;

/// Base directory for all emuctl data
pub fn base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join("emuctl")
}

/// Directory for cached emulator jar binaries
pub fn emulator_cache_dir() -> PathBuf {
    base_dir().join("emulators")
}
