use std::path::PathBuf;

/// Returns the root vitrine directory path.
///
/// Resolution order:
/// 1. `VITRINE_ROOT` environment variable (if set)
/// 2. Current working directory + `.vitrine`
pub fn vitrine_root() -> PathBuf {
    if let Ok(root) = std::env::var("VITRINE_ROOT")
        && !root.is_empty()
    {
        PathBuf::from(root)
    } else {
        PathBuf::from(".vitrine")
    }
}

/// Returns the path to the config file.
pub fn config_path() -> PathBuf {
    vitrine_root().join("config.yaml")
}
