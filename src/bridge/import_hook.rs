//! The import hook: dotted-path imports and lazy module proxies.
//!
//! [`Importer`] intercepts dotted paths whose root matches a registered
//! managed namespace prefix (`java.*`, `jep.*`, ...) and produces
//! [`ModuleProxy`] objects. Attribute resolution on a proxy is lazy:
//! accessing `Integer` on a `java.lang` proxy resolves
//! `java.lang.Integer` at access time, never at import time.
//!
//! Each proxy keeps a cache of resolved attributes, keyed by name and
//! populated on first successful access, so repeated lookups skip the
//! resolver.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::bridge::loader::{ClassLoader, LoadOutcome, SystemClassLoader};
use crate::bridge::registry::{self, ClassRef, ClassRegistry};
use crate::bridge::value::Value;
use crate::error::{BridgeError, Result};

/// Namespace prefixes recognized by default.
pub const DEFAULT_PREFIXES: &[&str] = &["java", "javax", "jep"];

/// Resolves dotted import paths to managed packages.
#[derive(Debug, Clone)]
pub struct Importer {
    registry: Arc<ClassRegistry>,
    loader: Arc<dyn ClassLoader>,
    prefixes: Vec<String>,
}

impl Importer {
    /// Create an importer over the ambient registry with the permissive
    /// system loader and the default namespace prefixes.
    pub fn new() -> Self {
        Self::with_policy(
            registry::ambient_registry(),
            Arc::new(SystemClassLoader),
            DEFAULT_PREFIXES.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create an importer bound to a specific registry, policy and
    /// namespace prefixes. This is how an interpreter handle routes its
    /// imports through its own class-loading policy.
    pub fn with_policy(
        registry: Arc<ClassRegistry>,
        loader: Arc<dyn ClassLoader>,
        prefixes: Vec<String>,
    ) -> Self {
        Self {
            registry,
            loader,
            prefixes,
        }
    }

    /// Import a managed package by dotted path.
    ///
    /// Fails with [`BridgeError::ModuleNotFound`] when the root prefix is
    /// not a registered managed namespace or when no such package exists.
    pub fn load_module(&self, dotted: &str) -> Result<ModuleProxy> {
        let root = dotted.split('.').next().unwrap_or("");
        if root.is_empty() || !self.prefixes.iter().any(|p| p == root) {
            return Err(BridgeError::ModuleNotFound(dotted.to_string()));
        }
        if !self.registry.is_package(dotted) {
            return Err(BridgeError::ModuleNotFound(dotted.to_string()));
        }
        trace!(module = dotted, "import hook resolved package");
        Ok(ModuleProxy::new(
            dotted.to_string(),
            Arc::clone(&self.registry),
            Arc::clone(&self.loader),
        ))
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}

/// An attribute resolved on a module proxy: either a loadable class or a
/// nested package.
#[derive(Debug, Clone)]
pub enum ProxyAttr {
    /// A managed class.
    Class(ClassRef),
    /// A nested package, itself a lazily resolved proxy.
    Package(ModuleProxy),
}

impl From<ProxyAttr> for Value {
    fn from(attr: ProxyAttr) -> Self {
        match attr {
            ProxyAttr::Class(c) => Value::Class(c),
            ProxyAttr::Package(p) => Value::Module(p),
        }
    }
}

/// A host-visible stand-in for a managed package.
///
/// Attribute lookups resolve on demand through the owning policy; results
/// are cached per proxy. Cloning a proxy shares its cache.
#[derive(Debug, Clone)]
pub struct ModuleProxy {
    path: String,
    registry: Arc<ClassRegistry>,
    loader: Arc<dyn ClassLoader>,
    cache: Arc<RwLock<HashMap<String, ProxyAttr>>>,
}

impl ModuleProxy {
    fn new(path: String, registry: Arc<ClassRegistry>, loader: Arc<dyn ClassLoader>) -> Self {
        Self {
            path,
            registry,
            loader,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The dotted path of the package this proxy stands for.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolve an attribute of this package.
    ///
    /// A name that is neither a known subpackage nor a loadable class
    /// fails with [`BridgeError::AttributeError`], distinct from the
    /// module-not-found error raised at import time.
    pub fn attr(&self, name: &str) -> Result<ProxyAttr> {
        // Fast path: already resolved on this proxy.
        {
            let cache = self.cache.read().unwrap();
            if let Some(attr) = cache.get(name) {
                trace!(module = %self.path, attr = name, "proxy cache hit");
                return Ok(attr.clone());
            }
        }

        let resolved = self.resolve(name)?;

        // Double-check pattern: another thread may have resolved the same
        // attribute while we were.
        let mut cache = self.cache.write().unwrap();
        if let Some(existing) = cache.get(name) {
            return Ok(existing.clone());
        }
        cache.insert(name.to_string(), resolved.clone());
        Ok(resolved)
    }

    fn resolve(&self, name: &str) -> Result<ProxyAttr> {
        let candidate = format!("{}.{}", self.path, name);

        if self.registry.is_package(&candidate) {
            return Ok(ProxyAttr::Package(ModuleProxy::new(
                candidate,
                Arc::clone(&self.registry),
                Arc::clone(&self.loader),
            )));
        }

        match self.loader.load_or_reject(&self.registry, &candidate) {
            LoadOutcome::Loaded(class) => Ok(ProxyAttr::Class(class)),
            LoadOutcome::Rejected { class_name, reason } => {
                Err(BridgeError::ClassLoadRejected { class_name, reason })
            }
            LoadOutcome::NotFound => Err(BridgeError::AttributeError {
                module: self.path.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Number of attributes resolved and cached on this proxy.
    pub fn cached_attrs(&self) -> usize {
        self.cache.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_known_package() {
        let importer = Importer::new();
        let module = importer.load_module("java.lang").unwrap();
        assert_eq!(module.path(), "java.lang");
    }

    #[test]
    fn test_unknown_package_is_module_not_found() {
        let importer = Importer::new();
        let err = importer.load_module("java.nosuch").unwrap_err();
        assert!(matches!(err, BridgeError::ModuleNotFound(_)));
    }

    #[test]
    fn test_unregistered_prefix_is_module_not_found() {
        let importer = Importer::new();
        let err = importer.load_module("com.example").unwrap_err();
        assert!(matches!(err, BridgeError::ModuleNotFound(_)));
    }

    #[test]
    fn test_attr_resolves_class_lazily() {
        let importer = Importer::new();
        let module = importer.load_module("java.lang").unwrap();
        assert_eq!(module.cached_attrs(), 0);

        let attr = module.attr("Integer").unwrap();
        match attr {
            ProxyAttr::Class(c) => assert_eq!(c.name(), "java.lang.Integer"),
            other => panic!("expected class, got {other:?}"),
        }
        assert_eq!(module.cached_attrs(), 1);
    }

    #[test]
    fn test_missing_attr_is_attribute_error() {
        let importer = Importer::new();
        let module = importer.load_module("java.lang").unwrap();
        module.attr("Integer").unwrap();

        let err = module.attr("asdf").unwrap_err();
        match err {
            BridgeError::AttributeError { module, name } => {
                assert_eq!(module, "java.lang");
                assert_eq!(name, "asdf");
            }
            other => panic!("expected attribute error, got {other:?}"),
        }
        // Failures are not cached.
        assert_eq!(module.cached_attrs(), 1);
    }

    #[test]
    fn test_attr_resolves_nested_package() {
        let importer = Importer::new();
        let module = importer.load_module("java").unwrap();
        let attr = module.attr("io").unwrap();
        match attr {
            ProxyAttr::Package(p) => {
                assert_eq!(p.path(), "java.io");
                match p.attr("File").unwrap() {
                    ProxyAttr::Class(c) => assert_eq!(c.name(), "java.io.File"),
                    other => panic!("expected class, got {other:?}"),
                }
            }
            other => panic!("expected package, got {other:?}"),
        }
    }

    #[test]
    fn test_cache_returns_same_resolution() {
        let importer = Importer::new();
        let module = importer.load_module("java.lang").unwrap();
        let first = module.attr("Integer").unwrap();
        let second = module.attr("Integer").unwrap();
        match (first, second) {
            (ProxyAttr::Class(a), ProxyAttr::Class(b)) => assert_eq!(a.name(), b.name()),
            other => panic!("expected classes, got {other:?}"),
        }
        assert_eq!(module.cached_attrs(), 1);
    }

    #[test]
    fn test_restricted_policy_flows_through_proxy() {
        use crate::bridge::loader::RestrictedClassLoader;

        let importer = Importer::with_policy(
            registry::ambient_registry(),
            Arc::new(RestrictedClassLoader::forbidding(["java.io.Serializable"])),
            vec!["java".to_string()],
        );
        let module = importer.load_module("java.io").unwrap();

        // File is not denied, so lazy resolution succeeds.
        assert!(module.attr("File").is_ok());

        // The denied interface itself is a rejection, not an attribute miss.
        let err = module.attr("Serializable").unwrap_err();
        assert!(err.is_rejection());
        assert!(err.to_string().contains("restricted class: java.io.Serializable"));
    }
}
