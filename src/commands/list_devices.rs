//! List available audio input devices.

use crate::media::{MediaProvider, SystemMediaProvider};

/// Prints the device inventory.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> anyhow::Result<()> {
    let provider = SystemMediaProvider::new();
    let devices = provider.list_input_devices()?;

    if devices.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    println!();
    println!("Available audio input devices:");
    println!();
    for device in &devices {
        let default_indicator = if device.is_default { " [DEFAULT]" } else { "" };
        let config_info = device
            .native_config
            .clone()
            .unwrap_or_else(|| "configuration unavailable".to_string());
        println!("  ID: {}", device.id);
        println!("    Name: {}{}", device.label, default_indicator);
        println!("    Config: ({config_info})");
        println!();
    }
    println!("Select a device by id or name in reflectify.toml, or with");
    println!("'reflectify record --device <ID>'. \"default\" uses the system default.");

    Ok(())
}
