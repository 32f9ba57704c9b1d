//! # JVM Bridge
//!
//! An in-process bridge to an embedded, class-based managed runtime.
//!
//! Host code creates [`Interpreter`] handles, imports managed packages
//! through dotted paths, constructs managed objects and reads values back.
//! The crate provides:
//!
//! - **Import hook**: dotted imports (`java.lang`, `java.sql`, ...) resolve
//!   to lazily populated module proxies; members resolve at access time and
//!   are cached per proxy
//! - **Pluggable class loading**: each handle carries its own policy; a
//!   restrictive policy can deny classes (and, transitively, the interfaces
//!   a class structurally requires) with a descriptive reason
//! - **Exception bridging**: managed-side failures surface as host errors
//!   that preserve the original exception type and message text
//! - **Independent handles**: any number of interpreters may coexist in one
//!   process, each with its own namespace and policy
//!
//! ## Example
//!
//! ```rust
//! use jvm_bridge_rs::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut vm = Interpreter::with_defaults()?;
//!     vm.eval("from java.io import File")?;
//!     vm.eval("f = File(\"notes.txt\")")?;
//!
//!     let f = vm.get_value("f")?;
//!     assert_eq!(f.as_object().unwrap().class_name(), "java.io.File");
//!
//!     vm.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Class-loading policies
//!
//! A policy decides, per class, whether the embedded runtime may load it.
//! Rejections carry a reason string naming the refused class, which may be
//! an interface the requested class requires rather than the requested
//! class itself:
//!
//! ```rust
//! use std::sync::Arc;
//! use jvm_bridge_rs::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut vm = Interpreter::with_defaults()?;
//!     vm.set_class_loader(Arc::new(RestrictedClassLoader::forbidding([
//!         "java.io.Serializable",
//!     ])))?;
//!
//!     vm.eval("from java.io import File")?; // lazy: still fine
//!     let err = vm.eval("f = File(\"failed.txt\")").unwrap_err();
//!     assert!(err.to_string().contains("restricted class: java.io.Serializable"));
//!
//!     vm.close()?;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod error;
pub mod prelude;

// Re-export main types at crate root for convenience
pub use bridge::config::{InterpreterConfig, InterpreterConfigBuilder};
pub use bridge::import_hook::{Importer, ModuleProxy, ProxyAttr};
pub use bridge::interpreter::Interpreter;
pub use bridge::loader::{ClassLoader, LoadOutcome, RestrictedClassLoader, SystemClassLoader};
pub use bridge::registry::{ambient_registry, find_class, ClassRef, ClassRegistry};
pub use bridge::value::{ObjectRef, Value};
pub use error::{BridgeError, Result};
