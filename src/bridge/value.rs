//! Value marshaling between the host and the embedded runtime.
//!
//! Everything that crosses the boundary is represented as a [`Value`].
//! Object references keep identity through a shared handle, so two host-side
//! copies of the same managed object compare equal and proxy the same
//! remote state.

use std::fmt;
use std::sync::Arc;

use crate::bridge::import_hook::ModuleProxy;
use crate::bridge::loader::ClassLoader;
use crate::bridge::registry::ClassRef;

/// A value marshaled across the host/managed boundary.
#[derive(Clone, Debug)]
pub enum Value {
    /// The managed null / host None.
    None,
    /// A boolean.
    Bool(bool),
    /// An integer (covers the managed byte/short/int/long range).
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// A reference to a managed class.
    Class(ClassRef),
    /// A reference to a managed object instance.
    Object(ObjectRef),
    /// A module proxy bound by an import statement.
    Module(ModuleProxy),
    /// A class-loading policy object (used for fixture statics such as
    /// `jep.Test.restrictedClassLoader`).
    Loader(Arc<dyn ClassLoader>),
}

impl Value {
    /// A short name for the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Class(_) => "class",
            Value::Object(_) => "object",
            Value::Module(_) => "module",
            Value::Loader(_) => "classloader",
        }
    }

    /// Get the class reference if this value is a class.
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Value::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Get the object reference if this value is an object.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Get the class-loading policy if this value holds one.
    pub fn as_loader(&self) -> Option<Arc<dyn ClassLoader>> {
        match self {
            Value::Loader(l) => Some(Arc::clone(l)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a.name() == b.name(),
            // Object equality is identity, as on the managed side.
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Module(a), Value::Module(b)) => a.path() == b.path(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Class(c) => write!(f, "<class '{}'>", c.name()),
            Value::Object(o) => write!(f, "{}", o),
            Value::Module(m) => write!(f, "<module '{}'>", m.path()),
            Value::Loader(l) => write!(f, "<classloader {:?}>", l),
        }
    }
}

/// A host-side handle to a managed object instance.
///
/// Cloning the handle clones the reference, not the object; identity is
/// preserved so subsequent calls through any copy act on the same
/// managed-side instance.
#[derive(Clone, Debug)]
pub struct ObjectRef {
    inner: Arc<Instance>,
}

#[derive(Debug)]
struct Instance {
    class: ClassRef,
    ctor_args: Vec<Value>,
}

impl ObjectRef {
    /// Create a new instance of the given class.
    pub fn new(class: ClassRef, ctor_args: Vec<Value>) -> Self {
        Self {
            inner: Arc::new(Instance { class, ctor_args }),
        }
    }

    /// The class of this instance.
    pub fn class(&self) -> &ClassRef {
        &self.inner.class
    }

    /// The fully qualified class name of this instance.
    pub fn class_name(&self) -> &str {
        self.inner.class.name()
    }

    /// The arguments the instance was constructed with.
    pub fn ctor_args(&self) -> &[Value] {
        &self.inner.ctor_args
    }

    /// Check whether two references point at the same managed instance.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object>", self.class_name())
    }
}
