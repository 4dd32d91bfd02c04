//! Configuration file editor command.

use std::process::Command;

use crate::config::{file::config_path, ReflectifyConfig};

/// Opens the configuration file in the user's preferred editor.
///
/// Tries `$EDITOR`, then nano, then vi. The file is created with
/// defaults first if it does not exist yet.
///
/// # Errors
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    // Make sure there is a file to edit.
    ReflectifyConfig::load_or_init()?;
    let path = config_path()?;

    let editor = find_editor()?;
    tracing::info!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status().map_err(|e| {
        anyhow::anyhow!("Failed to open editor '{editor}': {e}")
    })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    Ok(())
}

fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    for editor in &["nano", "vi"] {
        let available = Command::new("which")
            .arg(editor)
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        if available {
            return Ok(editor.to_string());
        }
    }

    Err(anyhow::anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}
