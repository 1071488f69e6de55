use std::fmt;

/// Named resolution-failure conditions.
///
/// These are the only errors the core itself raises. Scalar coercion never
/// fails (bad text degrades to `0` / empty text), so everything here is a
/// lookup that came up empty or a package-stack misuse. All of them are
/// recoverable at the call site; none poison the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// No namespace registered under this key.
    UnknownNamespace(String),
    /// The namespace exists but its active layer has no such function.
    UnknownFunction { namespace: String, function: String },
    /// Method receiver resolved neither as an object name nor as an identity.
    UnknownReceiver(String),
    /// Parent call issued outside any dispatched call frame.
    ParentCallWithoutContext,
    /// Deactivation with no active packages.
    PackageStackEmpty,
    /// Deactivation of a package that is not the top of the stack.
    PackageNotTop { requested: String, top: String },
    /// Activation of a package that is already on the stack.
    PackageAlreadyActive(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnknownNamespace(ns) => {
                write!(f, "cannot find namespace '{}'", display_ns(ns))
            }
            RuntimeError::UnknownFunction { namespace, function } => {
                write!(f, "cannot find function '{}' in namespace '{}'", function, display_ns(namespace))
            }
            RuntimeError::UnknownReceiver(text) => {
                write!(f, "cannot find object or record by name or id '{}'", text)
            }
            RuntimeError::ParentCallWithoutContext => {
                write!(f, "parent call outside of any executing function")
            }
            RuntimeError::PackageStackEmpty => write!(f, "no active package to deactivate"),
            RuntimeError::PackageNotTop { requested, top } => {
                write!(f, "cannot deactivate package '{}': '{}' is on top", requested, top)
            }
            RuntimeError::PackageAlreadyActive(name) => {
                write!(f, "package '{}' is already active", name)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

fn display_ns(key: &str) -> &str {
    if key.is_empty() { "<global>" } else { key }
}
