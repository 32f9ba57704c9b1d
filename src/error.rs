//! Error types for the JVM bridge.

use thiserror::Error;

/// Errors that can occur on the boundary between the host and the
/// embedded managed runtime.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// An exception raised on the managed side escaped an `eval`.
    ///
    /// The message text is preserved verbatim from the originating
    /// exception so that failures stay diagnosable across the boundary.
    #[error("{exception_type}: {message}")]
    JavaException {
        /// Fully qualified type of the originating exception
        /// (e.g., "java.lang.ClassNotFoundException").
        exception_type: String,
        /// The original exception message.
        message: String,
        /// The managed-side stack trace, if available.
        stack: Option<String>,
    },

    /// The active class-loading policy refused to load a class.
    ///
    /// The rejected class may be one that the requested class
    /// structurally requires, not the requested class itself.
    #[error("{reason}")]
    ClassLoadRejected {
        /// The class the policy refused (possibly a required interface).
        class_name: String,
        /// The reason string produced by the policy.
        reason: String,
    },

    /// No class with the given fully qualified name exists.
    #[error("class not found: {0}")]
    ClassNotFound(String),

    /// The dotted path does not correspond to any managed package.
    #[error("module not found: {0}")]
    ModuleNotFound(String),

    /// A module proxy has no member with the given name.
    #[error("module '{module}' has no attribute '{name}'")]
    AttributeError {
        /// The dotted path of the module proxy.
        module: String,
        /// The attribute that failed to resolve.
        name: String,
    },

    /// The source passed to `eval` could not be parsed.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// An operation was invoked on a closed interpreter.
    #[error("interpreter has been closed")]
    Closed,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to initialize the embedded runtime.
    #[error("failed to initialize runtime: {0}")]
    RuntimeInit(#[source] anyhow::Error),
}

impl BridgeError {
    /// Create a bridged exception carrying the managed side's type and message.
    pub fn java_exception(exception_type: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::JavaException {
            exception_type: exception_type.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Check if this error is a bridged managed-side exception.
    pub fn is_java_exception(&self) -> bool {
        matches!(self, BridgeError::JavaException { .. })
    }

    /// Check if this error is a class-load rejection by the active policy.
    pub fn is_rejection(&self) -> bool {
        matches!(self, BridgeError::ClassLoadRejected { .. })
    }

    /// Check if this error is a missing module, class or attribute.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BridgeError::ClassNotFound(_)
                | BridgeError::ModuleNotFound(_)
                | BridgeError::AttributeError { .. }
        )
    }

    /// Check if this error is a use-after-close.
    pub fn is_closed(&self) -> bool {
        matches!(self, BridgeError::Closed)
    }

    /// Convert a resolver-level error into the form it takes when it
    /// escapes an `eval` boundary.
    ///
    /// Class-load rejections surface to host code as a bridged
    /// `ClassNotFoundException` whose message carries the policy's reason
    /// string verbatim, matching what the managed side actually throws.
    /// All other errors pass through unchanged.
    pub fn into_eval_error(self) -> Self {
        match self {
            BridgeError::ClassLoadRejected { reason, .. } => {
                BridgeError::java_exception("java.lang.ClassNotFoundException", reason)
            }
            other => other,
        }
    }
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
