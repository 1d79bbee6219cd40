//! Lookup table from file types to plugins

use super::{EpubPlugin, Fb2Plugin, FormatPlugin, TxtPlugin, ZipDecoratorPlugin, ZIP_SUFFIX};
use crate::fs::BookFile;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Plugins by file type, plus the zip decorators built for them on demand
///
/// Built once at startup and shared; decorator construction is guarded so
/// that each base type gets exactly one decorator even under concurrent
/// lookups.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn FormatPlugin>>,
    decorators: RwLock<HashMap<String, Arc<dyn FormatPlugin>>>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every reader shipped in this crate
    pub fn with_builtin_plugins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Fb2Plugin::new()));
        registry.register(Arc::new(EpubPlugin::new()));
        registry.register(Arc::new(TxtPlugin::new()));
        registry
    }

    /// Add a plugin, replacing any previous one for the same file type
    pub fn register(&mut self, plugin: Arc<dyn FormatPlugin>) {
        let file_type = plugin.supported_file_type().to_lowercase();
        self.decorators
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&file_type);
        self.plugins.insert(file_type, plugin);
    }

    /// Plugin for a file type ("fb2") or its zipped form ("fb2.zip")
    pub fn plugin_for_type(&self, file_type: &str) -> Option<Arc<dyn FormatPlugin>> {
        let file_type = file_type.to_lowercase();
        if let Some(plugin) = self.plugins.get(&file_type) {
            return Some(plugin.clone());
        }

        let base = file_type.strip_suffix(ZIP_SUFFIX)?;
        let inner = self.plugins.get(base)?;

        if let Some(decorator) = self
            .decorators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(base)
        {
            return Some(decorator.clone());
        }

        let mut decorators = self
            .decorators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let decorator = decorators.entry(base.to_string()).or_insert_with(|| {
            tracing::debug!("Creating zip decorator for {}", base);
            let decorator: Arc<dyn FormatPlugin> =
                Arc::new(ZipDecoratorPlugin::new(inner.clone()));
            decorator
        });
        Some(decorator.clone())
    }

    /// File type of a book file, used as the lookup key
    ///
    /// Plain files use their extension. A zip archive named
    /// `name.<type>.zip` has type `<type>.zip`; other archives have none.
    pub fn file_type(file: &BookFile) -> Option<String> {
        let extension = file.extension();
        if extension.is_empty() {
            return None;
        }
        if !file.is_archive() {
            return Some(extension);
        }

        let name = file.short_name().to_lowercase();
        let stem = name.strip_suffix(ZIP_SUFFIX)?;
        let (_, base) = stem.rsplit_once('.')?;
        if base.is_empty() {
            return None;
        }
        Some(format!("{}{}", base, ZIP_SUFFIX))
    }

    /// Plugin able to read the given file
    pub fn plugin_for_file(&self, file: &BookFile) -> Option<Arc<dyn FormatPlugin>> {
        Self::file_type(file).and_then(|t| self.plugin_for_type(&t))
    }

    /// Registered base file types, sorted
    pub fn supported_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.plugins.keys().cloned().collect();
        types.sort();
        types
    }
}
