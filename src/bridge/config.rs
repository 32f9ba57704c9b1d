//! Interpreter configuration with builder pattern.

use std::sync::Arc;

use crate::bridge::import_hook::DEFAULT_PREFIXES;
use crate::bridge::loader::ClassLoader;

/// Configuration for an interpreter handle.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Whether `eval` buffers incomplete statements (REPL-like input)
    /// instead of requiring complete blocks.
    pub interactive: bool,
    /// The class-loading policy, or `None` for the permissive default.
    pub class_loader: Option<Arc<dyn ClassLoader>>,
    /// Namespace prefixes the import hook intercepts.
    pub import_prefixes: Vec<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            interactive: false,
            class_loader: None,
            import_prefixes: DEFAULT_PREFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl InterpreterConfig {
    /// Create a new builder for InterpreterConfig.
    pub fn builder() -> InterpreterConfigBuilder {
        InterpreterConfigBuilder::default()
    }
}

/// Builder for creating InterpreterConfig instances.
#[derive(Debug, Clone, Default)]
pub struct InterpreterConfigBuilder {
    interactive: Option<bool>,
    class_loader: Option<Arc<dyn ClassLoader>>,
    import_prefixes: Option<Vec<String>>,
}

impl InterpreterConfigBuilder {
    /// Set interactive mode.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = Some(interactive);
        self
    }

    /// Set the class-loading policy.
    pub fn class_loader(mut self, loader: Arc<dyn ClassLoader>) -> Self {
        self.class_loader = Some(loader);
        self
    }

    /// Set the namespace prefixes the import hook intercepts.
    pub fn import_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.import_prefixes = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// Build the InterpreterConfig.
    pub fn build(self) -> InterpreterConfig {
        let default = InterpreterConfig::default();
        InterpreterConfig {
            interactive: self.interactive.unwrap_or(default.interactive),
            class_loader: self.class_loader.or(default.class_loader),
            import_prefixes: self.import_prefixes.unwrap_or(default.import_prefixes),
        }
    }
}
