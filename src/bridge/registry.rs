//! The embedded platform's class universe and the ambient registry.
//!
//! The registry is the bridge's view of what the managed runtime can load:
//! fully qualified class names, the interfaces each class structurally
//! requires, and static members exposed to the host. A process-scoped
//! ambient registry backs [`find_class`], created on first use and live for
//! the rest of the process; it is immutable after construction, so there is
//! nothing to tear down.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::bridge::loader::{self, RestrictedClassLoader, SystemClassLoader};
use crate::bridge::value::Value;
use crate::error::{BridgeError, Result};

/// Whether a class definition is a concrete class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// A concrete, instantiable class.
    Class,
    /// An interface; cannot be instantiated.
    Interface,
}

/// Definition of a single managed class.
#[derive(Debug)]
pub struct ClassDef {
    name: String,
    kind: ClassKind,
    interfaces: Vec<String>,
    statics: HashMap<String, Value>,
}

/// An opaque, cheaply cloneable handle to a loaded managed class.
#[derive(Clone, Debug)]
pub struct ClassRef {
    inner: Arc<ClassDef>,
}

impl ClassRef {
    fn new(def: ClassDef) -> Self {
        Self {
            inner: Arc::new(def),
        }
    }

    /// The fully qualified class name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The class name without its package (e.g. "File").
    pub fn simple_name(&self) -> &str {
        match self.inner.name.rfind('.') {
            Some(idx) => &self.inner.name[idx + 1..],
            None => &self.inner.name,
        }
    }

    /// The package the class lives in (e.g. "java.io").
    pub fn package(&self) -> &str {
        match self.inner.name.rfind('.') {
            Some(idx) => &self.inner.name[..idx],
            None => "",
        }
    }

    /// Whether this class is an interface.
    pub fn is_interface(&self) -> bool {
        self.inner.kind == ClassKind::Interface
    }

    /// The fully qualified names of the interfaces this class
    /// structurally requires.
    pub fn interfaces(&self) -> &[String] {
        &self.inner.interfaces
    }

    /// Fetch a static member of this class.
    ///
    /// Used for well-known fixture members such as
    /// `jep.Test.restrictedClassLoader`.
    pub fn get_static(&self, name: &str) -> Result<Value> {
        self.inner.statics.get(name).cloned().ok_or_else(|| {
            BridgeError::AttributeError {
                module: self.inner.name.clone(),
                name: name.to_string(),
            }
        })
    }
}

/// The set of classes and packages the embedded runtime can load.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassRef>,
    packages: HashSet<String>,
}

impl ClassRegistry {
    /// Build the registry of classes the bridge ships with.
    ///
    /// This covers the `java.*` subset the bridge exposes plus the `jep.*`
    /// support classes used to configure interpreters from host code.
    pub fn builtin() -> Self {
        let mut registry = ClassRegistry::default();

        // Marker and functional interfaces first, so transitive
        // requirements below always resolve.
        registry.add_interface("java.io.Serializable", &[]);
        registry.add_interface("java.lang.Comparable", &[]);
        registry.add_interface("java.lang.CharSequence", &[]);
        registry.add_interface("java.lang.AutoCloseable", &[]);
        registry.add_interface("java.lang.Iterable", &[]);
        registry.add_interface("java.util.List", &["java.lang.Iterable"]);
        registry.add_interface("java.util.Map", &[]);
        registry.add_interface("java.sql.Connection", &["java.lang.AutoCloseable"]);

        registry.add_class("java.lang.Object", &[]);
        registry.add_class(
            "java.lang.String",
            &[
                "java.io.Serializable",
                "java.lang.Comparable",
                "java.lang.CharSequence",
            ],
        );
        registry.add_class(
            "java.lang.Integer",
            &["java.io.Serializable", "java.lang.Comparable"],
        );
        registry.add_class(
            "java.lang.Long",
            &["java.io.Serializable", "java.lang.Comparable"],
        );
        registry.add_class(
            "java.lang.Double",
            &["java.io.Serializable", "java.lang.Comparable"],
        );
        registry.add_class(
            "java.lang.Boolean",
            &["java.io.Serializable", "java.lang.Comparable"],
        );
        registry.add_class(
            "java.lang.StringBuilder",
            &["java.io.Serializable", "java.lang.CharSequence"],
        );
        registry.add_class("java.lang.Exception", &["java.io.Serializable"]);
        registry.add_class("java.lang.RuntimeException", &["java.io.Serializable"]);

        registry.add_class(
            "java.io.File",
            &["java.io.Serializable", "java.lang.Comparable"],
        );
        registry.add_class("java.io.IOException", &["java.io.Serializable"]);
        registry.add_class("java.io.FileInputStream", &["java.lang.AutoCloseable"]);

        registry.add_class("java.sql.DriverManager", &[]);
        registry.add_class("java.sql.SQLException", &["java.io.Serializable"]);

        registry.add_class("java.util.ArrayList", &["java.util.List", "java.io.Serializable"]);
        registry.add_class("java.util.HashMap", &["java.util.Map", "java.io.Serializable"]);
        registry.add_class(
            "java.util.Date",
            &["java.io.Serializable", "java.lang.Comparable"],
        );

        // Bridge support classes.
        registry.add_class("jep.Jep", &["java.lang.AutoCloseable"]);
        registry.add_class_with_statics(
            "jep.Test",
            &[],
            [(
                "restrictedClassLoader",
                Value::Loader(Arc::new(RestrictedClassLoader::forbidding([
                    "java.io.Serializable",
                ]))),
            )],
        );

        registry
    }

    fn add_class(&mut self, name: &str, interfaces: &[&str]) {
        self.insert(name, ClassKind::Class, interfaces, HashMap::new());
    }

    fn add_interface(&mut self, name: &str, interfaces: &[&str]) {
        self.insert(name, ClassKind::Interface, interfaces, HashMap::new());
    }

    fn add_class_with_statics<const N: usize>(
        &mut self,
        name: &str,
        interfaces: &[&str],
        statics: [(&str, Value); N],
    ) {
        let statics = statics
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        self.insert(name, ClassKind::Class, interfaces, statics);
    }

    fn insert(
        &mut self,
        name: &str,
        kind: ClassKind,
        interfaces: &[&str],
        statics: HashMap<String, Value>,
    ) {
        // Register every package prefix so dotted imports can be
        // distinguished from missing modules.
        for (idx, ch) in name.char_indices() {
            if ch == '.' {
                self.packages.insert(name[..idx].to_string());
            }
        }

        let def = ClassDef {
            name: name.to_string(),
            kind,
            interfaces: interfaces.iter().map(|s| s.to_string()).collect(),
            statics,
        };
        self.classes.insert(name.to_string(), ClassRef::new(def));
    }

    /// Look up a class by fully qualified name.
    pub fn lookup(&self, fqn: &str) -> Option<ClassRef> {
        self.classes.get(fqn).cloned()
    }

    /// Check whether a dotted path names a known package.
    pub fn is_package(&self, path: &str) -> bool {
        self.packages.contains(path)
    }

    /// Number of classes in the registry.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// The process-scoped ambient registry, created on first use.
static AMBIENT: Lazy<Arc<ClassRegistry>> = Lazy::new(|| Arc::new(ClassRegistry::builtin()));

/// Get the ambient class registry shared by default interpreters and
/// [`find_class`].
pub fn ambient_registry() -> Arc<ClassRegistry> {
    Arc::clone(&AMBIENT)
}

/// Resolve a well-known managed class independent of any interpreter
/// handle, against the ambient registry with the permissive system loader.
pub fn find_class(fqn: &str) -> Result<ClassRef> {
    let registry = ambient_registry();
    loader::resolve(&SystemClassLoader, &registry, fqn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_class() {
        let registry = ClassRegistry::builtin();
        let class = registry.lookup("java.io.File").unwrap();
        assert_eq!(class.name(), "java.io.File");
        assert_eq!(class.simple_name(), "File");
        assert_eq!(class.package(), "java.io");
        assert!(!class.is_interface());
        assert!(class
            .interfaces()
            .contains(&"java.io.Serializable".to_string()));
    }

    #[test]
    fn test_lookup_unknown_class() {
        let registry = ClassRegistry::builtin();
        assert!(registry.lookup("java.lang.Nope").is_none());
    }

    #[test]
    fn test_builtin_registry_is_populated() {
        let registry = ClassRegistry::builtin();
        assert!(!registry.is_empty());
        assert!(registry.len() > 10);
    }

    #[test]
    fn test_packages_derived_from_class_names() {
        let registry = ClassRegistry::builtin();
        assert!(registry.is_package("java"));
        assert!(registry.is_package("java.lang"));
        assert!(registry.is_package("java.sql"));
        assert!(registry.is_package("jep"));
        assert!(!registry.is_package("java.nosuch"));
        assert!(!registry.is_package("java.io.File"));
    }

    #[test]
    fn test_find_class_against_ambient_registry() {
        let jep = find_class("jep.Jep").unwrap();
        assert_eq!(jep.name(), "jep.Jep");

        let err = find_class("jep.Nope").unwrap_err();
        assert!(matches!(err, BridgeError::ClassNotFound(_)));
    }

    #[test]
    fn test_fixture_static_loader() {
        let test_class = find_class("jep.Test").unwrap();
        let value = test_class.get_static("restrictedClassLoader").unwrap();
        assert!(value.as_loader().is_some());

        let err = test_class.get_static("nope").unwrap_err();
        assert!(matches!(err, BridgeError::AttributeError { .. }));
    }

    #[test]
    fn test_interface_is_not_instantiable_kind() {
        let registry = ClassRegistry::builtin();
        let serializable = registry.lookup("java.io.Serializable").unwrap();
        assert!(serializable.is_interface());
    }
}
