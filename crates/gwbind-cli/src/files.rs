//! Binding and state files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use gwbind_core::{Binding, BindingState};

/// Reads a binding declaration from a `.json` or `.toml` file.
pub fn load_binding(path: &Path) -> Result<Binding> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read binding file {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid binding JSON in {}", path.display())),
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid binding TOML in {}", path.display())),
        _ => bail!(
            "Unsupported binding file {}: expected .json or .toml",
            path.display()
        ),
    }
}

pub fn load_state(path: &Path) -> Result<BindingState> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid state JSON in {}", path.display()))
}

/// Writes state as pretty JSON. The file holds certificate secrets.
pub fn save_state(path: &Path, state: &BindingState) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write state file {}", path.display()))?;
    Ok(())
}

/// Deletes a state file once the binding it describes is gone.
pub fn remove_state(path: &Path) -> Result<()> {
    fs::remove_file(path)
        .with_context(|| format!("Failed to remove state file {}", path.display()))
}
