//! Class-loading policies and the class resolver.
//!
//! Every interpreter handle carries a [`ClassLoader`] policy deciding which
//! managed classes may be loaded. The default [`SystemClassLoader`] loads
//! anything the registry knows; a [`RestrictedClassLoader`] refuses classes
//! on a deny-list with a descriptive reason string.
//!
//! Instantiation additionally resolves the interfaces a class structurally
//! requires through the same policy, so a rejection may name a transitively
//! required interface rather than the class being constructed. Importing
//! `java.io.File` under a policy that forbids `java.io.Serializable`
//! succeeds; constructing a `File` fails with
//! `restricted class: java.io.Serializable`.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, trace};

use crate::bridge::registry::{ClassRef, ClassRegistry};
use crate::error::{BridgeError, Result};

/// The outcome of asking a policy to load one class.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The class was loaded.
    Loaded(ClassRef),
    /// The policy refused to load the class.
    Rejected {
        /// The refused class.
        class_name: String,
        /// The reason string produced by the policy.
        reason: String,
    },
    /// No such class exists.
    NotFound,
}

/// A pluggable class-loading policy.
///
/// Policies are installed per interpreter handle and consulted for every
/// class resolution performed on that handle; installing a policy on one
/// handle never affects another.
pub trait ClassLoader: fmt::Debug + Send + Sync {
    /// Attempt to load the class with the given fully qualified name.
    fn load_or_reject(&self, registry: &ClassRegistry, class_name: &str) -> LoadOutcome;
}

/// The default, permissive policy: loads any class the registry knows.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClassLoader;

impl ClassLoader for SystemClassLoader {
    fn load_or_reject(&self, registry: &ClassRegistry, class_name: &str) -> LoadOutcome {
        match registry.lookup(class_name) {
            Some(class) => {
                trace!(class = class_name, "system loader resolved class");
                LoadOutcome::Loaded(class)
            }
            None => LoadOutcome::NotFound,
        }
    }
}

/// A restrictive policy that refuses classes on a deny-list and delegates
/// everything else to the system loader.
#[derive(Debug, Clone)]
pub struct RestrictedClassLoader {
    denied: HashSet<String>,
}

impl RestrictedClassLoader {
    /// Create a policy forbidding the given fully qualified class names.
    pub fn forbidding<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            denied: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a class name is on the deny-list.
    pub fn denies(&self, class_name: &str) -> bool {
        self.denied.contains(class_name)
    }
}

impl ClassLoader for RestrictedClassLoader {
    fn load_or_reject(&self, registry: &ClassRegistry, class_name: &str) -> LoadOutcome {
        if self.denies(class_name) {
            let reason = format!("restricted class: {}", class_name);
            debug!(class = class_name, "restricted loader rejected class");
            return LoadOutcome::Rejected {
                class_name: class_name.to_string(),
                reason,
            };
        }
        SystemClassLoader.load_or_reject(registry, class_name)
    }
}

/// Resolve a class through a policy, mapping the outcome to errors.
///
/// A policy rejection is a [`BridgeError::ClassLoadRejected`]; a class that
/// simply does not exist is a [`BridgeError::ClassNotFound`], never a
/// rejection.
pub fn resolve(
    loader: &dyn ClassLoader,
    registry: &ClassRegistry,
    class_name: &str,
) -> Result<ClassRef> {
    match loader.load_or_reject(registry, class_name) {
        LoadOutcome::Loaded(class) => Ok(class),
        LoadOutcome::Rejected { class_name, reason } => {
            Err(BridgeError::ClassLoadRejected { class_name, reason })
        }
        LoadOutcome::NotFound => Err(BridgeError::ClassNotFound(class_name.to_string())),
    }
}

/// Verify that a class can be instantiated under a policy.
///
/// Walks the interfaces the class structurally requires, loading each one
/// (and its super-interfaces) through the policy. The first refusal aborts
/// the walk, so the resulting error names the interface that was refused.
pub fn check_instantiable(
    loader: &dyn ClassLoader,
    registry: &ClassRegistry,
    class: &ClassRef,
) -> Result<()> {
    if class.is_interface() {
        return Err(BridgeError::java_exception(
            "java.lang.InstantiationException",
            class.name(),
        ));
    }

    let mut pending: Vec<String> = class.interfaces().to_vec();
    let mut visited: HashSet<String> = HashSet::new();

    while let Some(name) = pending.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        let iface = resolve(loader, registry, &name)?;
        pending.extend(iface.interfaces().iter().cloned());
    }

    Ok(())
}
