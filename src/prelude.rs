//! Prelude module for convenient imports.

pub use crate::bridge::{
    config::InterpreterConfig,
    import_hook::{Importer, ModuleProxy, ProxyAttr},
    interpreter::Interpreter,
    loader::{ClassLoader, RestrictedClassLoader, SystemClassLoader},
    registry::find_class,
    value::Value,
};
pub use crate::error::{BridgeError, Result};
