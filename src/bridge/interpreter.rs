//! The interpreter handle: one embedded execution context per instance.
//!
//! Each [`Interpreter`] owns an independent global namespace and a
//! class-loading policy; contexts are never shared between handles, so a
//! policy installed on one handle cannot affect resolution on another.
//! Calls on a handle are sequential (`&mut self`); closing releases the
//! context and is safe to repeat.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::bridge::config::InterpreterConfig;
use crate::bridge::import_hook::Importer;
use crate::bridge::loader::{self, ClassLoader, SystemClassLoader};
use crate::bridge::registry::{self, ClassRef, ClassRegistry};
use crate::bridge::statement::{self, Expr, Literal, Statement};
use crate::bridge::value::{ObjectRef, Value};
use crate::error::{BridgeError, Result};

/// A handle to an embedded managed execution context.
pub struct Interpreter {
    interactive: bool,
    loader: Arc<dyn ClassLoader>,
    registry: Arc<ClassRegistry>,
    import_prefixes: Vec<String>,
    namespace: HashMap<String, Value>,
    /// Buffered interactive input awaiting completion.
    buffer: Option<String>,
    closed: bool,
}

impl Interpreter {
    /// Create a new interpreter with the given configuration.
    pub fn new(config: InterpreterConfig) -> Result<Self> {
        if config.import_prefixes.is_empty() {
            return Err(BridgeError::Config(
                "at least one import prefix is required".to_string(),
            ));
        }
        for prefix in &config.import_prefixes {
            if prefix.is_empty() || prefix.contains('.') {
                return Err(BridgeError::Config(format!(
                    "invalid import prefix '{}'",
                    prefix
                )));
            }
        }

        let registry = registry::ambient_registry();
        if registry.is_empty() {
            return Err(BridgeError::RuntimeInit(anyhow::anyhow!(
                "class registry is empty"
            )));
        }

        let loader: Arc<dyn ClassLoader> = match config.class_loader {
            Some(loader) => loader,
            None => Arc::new(SystemClassLoader),
        };

        Ok(Self {
            interactive: config.interactive,
            loader,
            registry,
            import_prefixes: config.import_prefixes,
            namespace: HashMap::new(),
            buffer: None,
            closed: false,
        })
    }

    /// Create a new interpreter with the default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(InterpreterConfig::default())
    }

    /// Toggle interactive mode.
    ///
    /// In interactive mode `eval` buffers statements that do not form a
    /// complete unit of input and executes them when the buffer is
    /// flushed; in batch mode every statement must be complete.
    pub fn set_interactive(&mut self, interactive: bool) -> Result<()> {
        self.ensure_open()?;
        self.interactive = interactive;
        Ok(())
    }

    /// Whether this interpreter is in interactive mode.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Install a class-loading policy for all subsequent resolutions on
    /// this handle, replacing any previous policy.
    ///
    /// Module proxies imported before the change keep the policy that was
    /// active when they were created; install the policy before the first
    /// import that should honor it.
    pub fn set_class_loader(&mut self, loader: Arc<dyn ClassLoader>) -> Result<()> {
        self.ensure_open()?;
        debug!(loader = ?loader, "class-loading policy replaced");
        self.loader = loader;
        Ok(())
    }

    /// Evaluate one unit of source in the embedded context.
    ///
    /// Returns `true` when the statement was executed, `false` when
    /// interactive mode buffered it as incomplete input. An empty source
    /// flushes the buffer in interactive mode, mirroring the classic
    /// flush-on-null convention.
    pub fn eval(&mut self, source: &str) -> Result<bool> {
        self.ensure_open()?;

        // trim windows line endings
        let source = source.replace('\r', "");
        if source.trim().is_empty() {
            if !self.interactive {
                return Ok(false);
            }
            if self.buffer.is_none() {
                return Ok(true); // nothing to eval
            }
            self.flush()?;
            return Ok(true);
        }

        // complete statements execute immediately; everything else
        // appends to the interactive buffer until flushed
        if !self.interactive || (self.buffer.is_none() && statement::is_complete(&source)) {
            return match self.exec_source(source.trim()) {
                Ok(()) => Ok(true),
                Err(err) => {
                    self.buffer = None;
                    Err(err)
                }
            };
        }

        if let Some(buf) = self.buffer.as_mut() {
            buf.push('\n');
            buf.push_str(&source);
        } else {
            self.buffer = Some(source);
        }
        Ok(false)
    }

    /// Execute any buffered interactive input.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        let Some(buffered) = self.buffer.take() else {
            return Ok(());
        };
        self.exec_source(&buffered)
    }

    /// Bind a value in the interpreter's global namespace.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.ensure_open()?;
        self.namespace.insert(name.to_string(), value);
        Ok(())
    }

    /// Retrieve a value from the interpreter's global namespace.
    ///
    /// Dotted names walk module proxies and class statics
    /// (`java.sql.DriverManager`, `jep.Test.restrictedClassLoader`).
    pub fn get_value(&self, name: &str) -> Result<Value> {
        self.ensure_open()?;
        self.resolve_name(name)
    }

    /// Invoke a bound class constructor by name.
    pub fn invoke(&mut self, name: &str, args: Vec<Value>) -> Result<Value> {
        self.ensure_open()?;
        if name.trim().is_empty() {
            return Err(BridgeError::Config("invalid function name".to_string()));
        }
        let callee = self.resolve_name(name)?;
        self.call_value(&callee, args).map_err(BridgeError::into_eval_error)
    }

    /// Release the embedded execution context.
    ///
    /// Safe to call from cleanup paths after failed calls; calling it a
    /// second time is a no-op. Every other operation on a closed handle
    /// fails with [`BridgeError::Closed`].
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        // don't attempt teardown twice if something goes wrong below
        self.closed = true;
        self.namespace.clear();
        self.buffer = None;
        debug!("interpreter closed");
        Ok(())
    }

    /// Whether this interpreter has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(BridgeError::Closed);
        }
        Ok(())
    }

    fn importer(&self) -> Importer {
        Importer::with_policy(
            Arc::clone(&self.registry),
            Arc::clone(&self.loader),
            self.import_prefixes.clone(),
        )
    }

    fn exec_source(&mut self, source: &str) -> Result<()> {
        trace!(source, "eval");
        let stmt = statement::parse(source)?;
        self.exec_statement(stmt).map_err(BridgeError::into_eval_error)
    }

    fn exec_statement(&mut self, stmt: Statement) -> Result<()> {
        match stmt {
            Statement::Import { path } => {
                let proxy = self.importer().load_module(&path)?;
                self.namespace.insert(path, Value::Module(proxy));
                Ok(())
            }
            Statement::FromImport { module, names } => {
                let proxy = self.importer().load_module(&module)?;
                for name in names {
                    let attr = proxy.attr(&name)?;
                    self.namespace.insert(name, attr.into());
                }
                Ok(())
            }
            Statement::Assign { target, value } => {
                let value = self.eval_expr(&value)?;
                self.namespace.insert(target, value);
                Ok(())
            }
            Statement::Expr(expr) => {
                self.eval_expr(&expr)?;
                Ok(())
            }
        }
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),
            Expr::Name(name) => self.resolve_name(name),
            Expr::Call { func, args } => {
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.eval_expr(arg)?);
                }
                let callee = self.resolve_name(func)?;
                self.call_value(&callee, evaluated)
            }
        }
    }

    fn call_value(&self, callee: &Value, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Class(class) => self.instantiate(class, args),
            other => Err(BridgeError::java_exception(
                "java.lang.UnsupportedOperationException",
                format!("'{}' object is not callable", other.type_name()),
            )),
        }
    }

    /// Instantiate a class through the active policy.
    ///
    /// The interfaces the class structurally requires are resolved here,
    /// not at import time, so a restrictive policy surfaces its rejection
    /// at the construction call.
    fn instantiate(&self, class: &ClassRef, args: Vec<Value>) -> Result<Value> {
        loader::check_instantiable(self.loader.as_ref(), &self.registry, class)?;
        Ok(Value::Object(ObjectRef::new(class.clone(), args)))
    }

    fn resolve_name(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.namespace.get(name) {
            return Ok(value.clone());
        }
        if name.contains('.') {
            let segments: Vec<&str> = name.split('.').collect();
            // walk from the longest bound prefix
            for split in (1..segments.len()).rev() {
                let prefix = segments[..split].join(".");
                if let Some(value) = self.namespace.get(&prefix) {
                    return walk_attrs(value.clone(), &segments[split..]);
                }
            }
        }
        Err(BridgeError::ClassNotFound(name.to_string()))
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.close();
        }
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("interactive", &self.interactive)
            .field("loader", &self.loader)
            .field("closed", &self.closed)
            .field("bindings", &self.namespace.len())
            .finish()
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(x) => Value::Float(*x),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::None => Value::None,
    }
}

fn walk_attrs(mut value: Value, segments: &[&str]) -> Result<Value> {
    for segment in segments {
        value = match value {
            Value::Module(proxy) => proxy.attr(segment)?.into(),
            Value::Class(class) => class.get_static(segment)?,
            other => {
                return Err(BridgeError::AttributeError {
                    module: other.type_name().to_string(),
                    name: segment.to_string(),
                })
            }
        };
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::loader::RestrictedClassLoader;

    #[test]
    fn test_set_and_get_roundtrip() {
        let mut vm = Interpreter::with_defaults().unwrap();
        vm.set("answer", Value::Int(42)).unwrap();
        assert_eq!(vm.get_value("answer").unwrap(), Value::Int(42));
        vm.close().unwrap();
    }

    #[test]
    fn test_eval_import_and_construct() {
        let mut vm = Interpreter::with_defaults().unwrap();
        assert!(vm.eval("from java.io import File").unwrap());
        assert!(vm.eval("f = File(\"notes.txt\")").unwrap());

        let f = vm.get_value("f").unwrap();
        let obj = f.as_object().expect("expected object");
        assert_eq!(obj.class_name(), "java.io.File");
        assert_eq!(obj.ctor_args(), &[Value::Str("notes.txt".to_string())]);
        vm.close().unwrap();
    }

    #[test]
    fn test_import_binds_module_for_dotted_lookup() {
        let mut vm = Interpreter::with_defaults().unwrap();
        vm.eval("import java.sql").unwrap();
        let value = vm.get_value("java.sql.DriverManager").unwrap();
        assert!(value.as_class().is_some());
        vm.close().unwrap();
    }

    #[test]
    fn test_unbound_name_is_not_found() {
        let mut vm = Interpreter::with_defaults().unwrap();
        let err = vm.eval("f = File(\"x\")").unwrap_err();
        assert!(matches!(err, BridgeError::ClassNotFound(_)));
        vm.close().unwrap();
    }

    #[test]
    fn test_calling_a_non_class_is_a_bridged_error() {
        let mut vm = Interpreter::with_defaults().unwrap();
        vm.set("n", Value::Int(1)).unwrap();
        let err = vm.eval("x = n()").unwrap_err();
        assert!(err.is_java_exception());
        assert!(err.to_string().contains("not callable"));
        vm.close().unwrap();
    }

    #[test]
    fn test_interactive_buffering_and_flush() {
        let mut vm = Interpreter::with_defaults().unwrap();
        vm.set_interactive(true).unwrap();

        assert!(!vm.eval("x = (").unwrap());
        assert!(!vm.eval("42)").unwrap());
        vm.flush().unwrap();
        assert_eq!(vm.get_value("x").unwrap(), Value::Int(42));
        vm.close().unwrap();
    }

    #[test]
    fn test_empty_eval_flushes_in_interactive_mode() {
        let mut vm = Interpreter::with_defaults().unwrap();
        vm.set_interactive(true).unwrap();

        assert!(!vm.eval("x = (").unwrap());
        assert!(!vm.eval("7)").unwrap());
        assert!(vm.eval("").unwrap());
        assert_eq!(vm.get_value("x").unwrap(), Value::Int(7));
        vm.close().unwrap();
    }

    #[test]
    fn test_batch_mode_rejects_incomplete_input() {
        let mut vm = Interpreter::with_defaults().unwrap();
        let err = vm.eval("x = (").unwrap_err();
        assert!(matches!(err, BridgeError::Syntax(_)));
        vm.close().unwrap();
    }

    #[test]
    fn test_buffer_cleared_after_failed_flush() {
        let mut vm = Interpreter::with_defaults().unwrap();
        vm.set_interactive(true).unwrap();

        assert!(!vm.eval("if True:").unwrap());
        assert!(vm.flush().is_err());
        // the failed buffer must not poison the next statement
        assert!(vm.eval("x = 1").unwrap());
        assert_eq!(vm.get_value("x").unwrap(), Value::Int(1));
        vm.close().unwrap();
    }

    #[test]
    fn test_invoke_constructor_by_name() {
        let mut vm = Interpreter::with_defaults().unwrap();
        vm.eval("from java.io import File").unwrap();
        let value = vm
            .invoke("File", vec![Value::Str("a.txt".to_string())])
            .unwrap();
        assert_eq!(value.as_object().unwrap().class_name(), "java.io.File");

        let err = vm.invoke("  ", vec![]).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
        vm.close().unwrap();
    }

    #[test]
    fn test_close_is_idempotent_and_fences_other_calls() {
        let mut vm = Interpreter::with_defaults().unwrap();
        vm.close().unwrap();
        vm.close().unwrap(); // second close is a no-op

        assert!(matches!(vm.eval("x = 1"), Err(BridgeError::Closed)));
        assert!(matches!(
            vm.set("x", Value::Int(1)),
            Err(BridgeError::Closed)
        ));
        assert!(matches!(vm.get_value("x"), Err(BridgeError::Closed)));
        assert!(matches!(vm.set_interactive(true), Err(BridgeError::Closed)));
        assert!(matches!(
            vm.set_class_loader(Arc::new(SystemClassLoader)),
            Err(BridgeError::Closed)
        ));
        assert!(matches!(vm.flush(), Err(BridgeError::Closed)));
    }

    #[test]
    fn test_restricted_policy_applies_at_construction() {
        let mut vm = Interpreter::with_defaults().unwrap();
        vm.set_class_loader(Arc::new(RestrictedClassLoader::forbidding([
            "java.io.Serializable",
        ])))
        .unwrap();

        // the import succeeds; only construction touches the interface
        assert!(vm.eval("from java.io import File").unwrap());
        let err = vm.eval("f = File(\"failed.txt\")").unwrap_err();
        assert!(err.is_java_exception());
        assert!(err
            .to_string()
            .contains("restricted class: java.io.Serializable"));
        vm.close().unwrap();
    }

    #[test]
    fn test_config_rejects_bad_prefixes() {
        let config = InterpreterConfig::builder()
            .import_prefixes(Vec::<String>::new())
            .build();
        assert!(matches!(
            Interpreter::new(config),
            Err(BridgeError::Config(_))
        ));

        let config = InterpreterConfig::builder()
            .import_prefixes(["java.lang"])
            .build();
        assert!(matches!(
            Interpreter::new(config),
            Err(BridgeError::Config(_))
        ));
    }
}
