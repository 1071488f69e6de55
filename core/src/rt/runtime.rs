//! The dispatcher: resolves call requests against the namespace table and
//! invokes the bound function.
//!
//! One `Runtime` value owns the namespace table, the package stack and the
//! object registry, so independent runtime instances coexist and "restart"
//! is just dropping one and building another. The layer a function executes
//! in travels as an explicit [`CallFrame`] parameter rather than a mutable
//! current-namespace slot, which makes nested and recursive parent calls
//! correct with nothing to save or restore.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tracing::{trace, warn};

use crate::error::RuntimeError;
use crate::ns::{Callable, NamespaceTable, PackageDef, PackageStack, Resolved, ns_key};
use crate::obj::ObjectRegistry;
use crate::val::ValueCell;

use super::builtins;
use super::console::{ConsoleSink, LogConsole};

/// How a call request addresses its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// By function name in a namespace given directly (empty = global).
    Plain,
    /// Through a receiver object; resolves in the receiver's class
    /// namespace, with the receiver as implicit argument zero.
    Method,
    /// To the layer beneath the one currently executing, same namespace.
    Parent,
}

/// The resolution context of an executing function: the namespace it was
/// found in and the layer that owns it. Parent calls chain from here.
#[derive(Debug, Clone)]
pub struct CallFrame {
    pub namespace: Arc<str>,
    pub layer: usize,
}

pub struct Runtime {
    pub namespaces: NamespaceTable,
    pub packages: PackageStack,
    pub objects: ObjectRegistry,
    console: Box<dyn ConsoleSink>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("namespaces", &self.namespaces)
            .field("packages", &self.packages)
            .field("objects", &self.objects)
            .finish_non_exhaustive()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// A fresh runtime with the core built-ins bound and console output
    /// routed to tracing.
    pub fn new() -> Self {
        Self::with_console(Box::new(LogConsole::default()))
    }

    pub fn with_console(console: Box<dyn ConsoleSink>) -> Self {
        let mut rt = Self {
            namespaces: NamespaceTable::new(),
            packages: PackageStack::new(),
            objects: ObjectRegistry::new(),
            console,
        };
        builtins::install_core_builtins(&mut rt);
        rt
    }

    /// Bind a host function into a namespace's base layer.
    pub fn bind_base(&mut self, namespace: &str, func_name: &str, func: Callable) {
        self.namespaces.bind_base(namespace, func_name, func);
    }

    pub fn activate_package(&mut self, def: PackageDef) -> Result<(), RuntimeError> {
        self.packages.activate(&mut self.namespaces, def)
    }

    pub fn deactivate_package(&mut self, name: &str) -> Result<(), RuntimeError> {
        self.packages.deactivate(&mut self.namespaces, name)
    }

    pub fn deactivate_top_package(&mut self) -> Result<String, RuntimeError> {
        self.packages.deactivate_top(&mut self.namespaces)
    }

    /// Emit a console fragment on behalf of a reporting primitive.
    pub fn console_write(&mut self, text: &str, line_complete: bool) {
        self.console.emit(text, line_complete);
    }

    /// Dispatch a top-level call request (no surrounding call frame).
    pub fn invoke(
        &mut self,
        kind: CallKind,
        receiver: &str,
        func_name: &str,
        args: &[&str],
    ) -> Result<Option<ValueCell>> {
        self.invoke_in(None, kind, receiver, func_name, args)
    }

    /// Dispatch a call request from inside an executing function. `frame` is
    /// the caller's own frame and is required for parent calls.
    ///
    /// Resolution failures are reported, not fatal: the call is abandoned
    /// with a [`RuntimeError`] and the runtime stays usable.
    pub fn invoke_in(
        &mut self,
        frame: Option<&CallFrame>,
        kind: CallKind,
        receiver: &str,
        func_name: &str,
        args: &[&str],
    ) -> Result<Option<ValueCell>> {
        let resolved = self.resolve_request(frame, kind, receiver, func_name)?;

        let mut cells: Vec<ValueCell> = Vec::with_capacity(args.len() + 1);
        if kind == CallKind::Method {
            // The receiver is conventionally argument zero.
            cells.push(ValueCell::from_text(receiver));
        }
        cells.extend(args.iter().map(|arg| ValueCell::from_text(*arg)));

        let callee_frame = CallFrame {
            namespace: resolved.binding.namespace.clone(),
            layer: resolved.layer,
        };
        trace!(
            namespace = %callee_frame.namespace,
            function = %resolved.binding.name,
            package = %resolved.binding.package,
            layer = callee_frame.layer,
            "dispatch"
        );
        let func = resolved.binding.func.clone();
        (*func)(self, &callee_frame, &mut cells)
    }

    fn resolve_request(
        &self,
        frame: Option<&CallFrame>,
        kind: CallKind,
        receiver: &str,
        func_name: &str,
    ) -> Result<Resolved> {
        match kind {
            CallKind::Plain => self.resolve_in_namespace(receiver, func_name),
            CallKind::Method => {
                let Some(id) = self.objects.resolve_ident(receiver) else {
                    warn!(receiver, "cannot find receiver object or record");
                    return Err(RuntimeError::UnknownReceiver(receiver.to_string()).into());
                };
                let class = self
                    .objects
                    .entry(id)
                    .map(|entry| entry.class_name().to_string())
                    .unwrap_or_default();
                self.resolve_in_namespace(&class, func_name)
            }
            CallKind::Parent => {
                let Some(frame) = frame else {
                    warn!(function = func_name, "parent call without an executing frame");
                    return Err(RuntimeError::ParentCallWithoutContext.into());
                };
                match self.namespaces.resolve_parent(&frame.namespace, frame.layer, func_name) {
                    Some(resolved) => Ok(resolved),
                    None => {
                        warn!(
                            namespace = %frame.namespace,
                            function = func_name,
                            below_layer = frame.layer,
                            "cannot find parent function"
                        );
                        Err(RuntimeError::UnknownFunction {
                            namespace: frame.namespace.to_string(),
                            function: func_name.to_string(),
                        }
                        .into())
                    }
                }
            }
        }
    }

    fn resolve_in_namespace(&self, namespace: &str, func_name: &str) -> Result<Resolved> {
        if let Some(resolved) = self.namespaces.resolve(namespace, func_name) {
            return Ok(resolved);
        }
        let err = if self.namespaces.has_namespace(namespace) {
            RuntimeError::UnknownFunction {
                namespace: ns_key(namespace),
                function: func_name.to_string(),
            }
        } else {
            RuntimeError::UnknownNamespace(ns_key(namespace))
        };
        warn!(namespace = %ns_key(namespace), function = func_name, "call abandoned: {}", err);
        Err(err.into())
    }
}
