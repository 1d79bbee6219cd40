//! Formats command implementation

use anyhow::Result;
use libris_core::formats::ZIP_SUFFIX;
use libris_core::PluginRegistry;

/// List the supported file types with their zipped forms
pub fn formats() -> Result<()> {
    let registry = PluginRegistry::with_builtin_plugins();

    for file_type in registry.supported_types() {
        let Some(plugin) = registry.plugin_for_type(&file_type) else {
            continue;
        };
        println!(
            "{:<6} {:<10} {:<11} {}",
            file_type,
            format!("{}{}", file_type, ZIP_SUFFIX),
            plugin.plugin_type().to_string(),
            plugin.supported_encodings().names().join(", ")
        );
    }

    Ok(())
}
