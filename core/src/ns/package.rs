//! LIFO activation stack of package override layers.
//!
//! Activating a package pushes one new top layer onto every namespace the
//! package binds into; the shadowed predecessor stays reachable via parent
//! call. Deactivation is strictly LIFO and pops exactly the layers the
//! package pushed, restoring each touched namespace's previous top.

use std::sync::Arc;

use tracing::debug;

use crate::error::RuntimeError;
use crate::util::key;

use super::table::{Callable, NamespaceTable, ns_key};

/// A package definition as delivered by the loader: a name plus function
/// bindings grouped by namespace.
pub struct PackageDef {
    name: String,
    bindings: Vec<(String, String, Callable)>,
}

impl PackageDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    /// Add one function binding; `namespace` empty means global.
    pub fn bind(mut self, namespace: &str, func_name: &str, func: Callable) -> Self {
        self.bindings.push((namespace.to_string(), func_name.to_string(), func));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
struct ActivePackage {
    name: String,
    /// Namespace keys this package pushed a layer onto, in push order.
    touched: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PackageStack {
    active: Vec<ActivePackage>,
}

impl PackageStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the most recently activated package.
    pub fn top(&self) -> Option<&str> {
        self.active.last().map(|pkg| pkg.name.as_str())
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|pkg| key::eq_folded(&pkg.name, name))
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Push the package's bindings as new top layers. A package with no
    /// bindings for a namespace leaves that namespace untouched, so parent
    /// calls skip it cleanly there.
    pub fn activate(&mut self, table: &mut NamespaceTable, def: PackageDef) -> Result<(), RuntimeError> {
        if self.is_active(&def.name) {
            return Err(RuntimeError::PackageAlreadyActive(def.name));
        }

        // Group by namespace, preserving first-appearance order.
        let mut grouped: Vec<(String, Vec<(String, Callable)>)> = Vec::new();
        for (namespace, func_name, func) in def.bindings {
            let ns = ns_key(&namespace);
            match grouped.iter_mut().find(|(existing, _)| *existing == ns) {
                Some((_, funcs)) => funcs.push((func_name, func)),
                None => grouped.push((ns, vec![(func_name, func)])),
            }
        }

        let package: Arc<str> = Arc::from(def.name.as_str());
        let mut touched = Vec::with_capacity(grouped.len());
        for (ns, funcs) in grouped {
            table.push_layer(&ns, package.clone(), funcs);
            touched.push(ns);
        }

        debug!(package = %def.name, namespaces = touched.len(), "package activated");
        self.active.push(ActivePackage {
            name: def.name,
            touched,
        });
        Ok(())
    }

    /// Deactivate by name. Only the top of the stack may be deactivated; a
    /// failed attempt alters no namespace.
    pub fn deactivate(&mut self, table: &mut NamespaceTable, name: &str) -> Result<(), RuntimeError> {
        match self.top() {
            None => Err(RuntimeError::PackageStackEmpty),
            Some(top) if !key::eq_folded(top, name) => Err(RuntimeError::PackageNotTop {
                requested: name.to_string(),
                top: top.to_string(),
            }),
            Some(_) => {
                self.pop(table);
                Ok(())
            }
        }
    }

    /// Deactivate whatever is on top, returning its name.
    pub fn deactivate_top(&mut self, table: &mut NamespaceTable) -> Result<String, RuntimeError> {
        self.pop(table).ok_or(RuntimeError::PackageStackEmpty)
    }

    fn pop(&mut self, table: &mut NamespaceTable) -> Option<String> {
        let pkg = self.active.pop()?;
        for ns in &pkg.touched {
            table.pop_layer(ns);
        }
        debug!(package = %pkg.name, "package deactivated");
        Some(pkg.name)
    }
}
